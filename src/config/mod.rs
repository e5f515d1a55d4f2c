pub mod database;

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::http::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub weather: ProviderConfig,
    pub routing: ProviderConfig,
    pub external_api_timeout_seconds: u64,
    pub retry: RetryPolicy,
    pub shortage: ShortageThresholds,
    pub ration: RationPolicy,
    /// Skip creating a disruption or alert when an active one already exists
    /// for the same route or region.
    pub dedupe_side_effects: bool,
    pub log_json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Days-of-supply thresholds used when raising shortage alerts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ShortageThresholds {
    pub warning_days: f64,
    pub imminent_days: f64,
    pub critical_days: f64,
}

impl Default for ShortageThresholds {
    fn default() -> Self {
        Self {
            warning_days: 30.0,
            imminent_days: 15.0,
            critical_days: 7.0,
        }
    }
}

/// Emergency ration sizing for crisis distribution plans.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RationPolicy {
    pub kg_per_person_per_day: f64,
    pub plan_days: u32,
}

impl Default for RationPolicy {
    fn default() -> Self {
        Self {
            kg_per_person_per_day: 0.6,
            plan_days: 7,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_max_connections: 20,
            weather: ProviderConfig {
                api_key: None,
                base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            },
            routing: ProviderConfig {
                api_key: None,
                base_url: "https://maps.googleapis.com/maps/api".to_string(),
            },
            external_api_timeout_seconds: 30,
            retry: RetryPolicy::default(),
            shortage: ShortageThresholds::default(),
            ration: RationPolicy::default(),
            dedupe_side_effects: false,
            log_json: false,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment, reading a `.env` file first
    /// when one is present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,

            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,

            weather: ProviderConfig {
                api_key: optional_var("WEATHER_API_KEY"),
                base_url: env::var("WEATHER_API_URL").unwrap_or(defaults.weather.base_url),
            },

            routing: ProviderConfig {
                api_key: optional_var("GOOGLE_MAPS_API_KEY"),
                base_url: env::var("GOOGLE_MAPS_BASE_URL").unwrap_or(defaults.routing.base_url),
            },

            external_api_timeout_seconds: parse_var(
                "EXTERNAL_API_TIMEOUT_SECONDS",
                defaults.external_api_timeout_seconds,
            )?,

            retry: RetryPolicy {
                max_attempts: parse_var("EXTERNAL_API_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                ..defaults.retry
            },

            shortage: ShortageThresholds {
                warning_days: parse_var("SHORTAGE_WARNING_DAYS", defaults.shortage.warning_days)?,
                imminent_days: parse_var("SHORTAGE_IMMINENT_DAYS", defaults.shortage.imminent_days)?,
                critical_days: parse_var("SHORTAGE_CRITICAL_DAYS", defaults.shortage.critical_days)?,
            },

            ration: RationPolicy {
                kg_per_person_per_day: parse_var(
                    "RATION_KG_PER_PERSON_DAY",
                    defaults.ration.kg_per_person_per_day,
                )?,
                plan_days: parse_var("EMERGENCY_PLAN_DAYS", defaults.ration.plan_days)?,
            },

            dedupe_side_effects: parse_var("DEDUPE_SIDE_EFFECTS", defaults.dedupe_side_effects)?,
            log_json: parse_var("LOG_JSON", defaults.log_json)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.shortage;
        if !(s.critical_days <= s.imminent_days && s.imminent_days <= s.warning_days) {
            anyhow::bail!(
                "shortage thresholds must satisfy critical <= imminent <= warning (got {} / {} / {})",
                s.critical_days,
                s.imminent_days,
                s.warning_days
            );
        }
        if self.retry.max_attempts == 0 {
            anyhow::bail!("EXTERNAL_API_MAX_ATTEMPTS must be at least 1");
        }
        let kg = self.ration.kg_per_person_per_day;
        if !(kg.is_finite() && kg > 0.0) || self.ration.plan_days == 0 {
            anyhow::bail!("ration policy must be positive");
        }
        Ok(())
    }

    pub fn external_api_timeout(&self) -> Duration {
        Duration::from_secs(self.external_api_timeout_seconds)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {} value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}
