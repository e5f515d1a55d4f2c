//! Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default `info`
/// filter. Call once, from `main`.
pub fn init_logger(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Masks all but the first four characters of a secret.
pub fn redact(value: &str) -> String {
    match value.char_indices().nth(4) {
        Some((idx, _)) => format!("{}****", &value[..idx]),
        None => "****".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_long_secret() {
        assert_eq!(redact("sk_live_1234567890"), "sk_l****");
    }

    #[test]
    fn test_redact_short_secret() {
        assert_eq!(redact("abcd"), "****");
        assert_eq!(redact(""), "****");
    }
}
