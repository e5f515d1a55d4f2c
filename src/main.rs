use anyhow::Context;
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use harvestguard::config::{self, Config};
use harvestguard::logger::{init_logger, redact};
use harvestguard::models::FireDisasterRequest;
use harvestguard::repository::PgRepository;
use harvestguard::services::{GoogleMapsClient, OpenWeatherClient};
use harvestguard::FireDisasterService;

#[derive(Parser, Debug)]
#[command(name = "harvestguard")]
#[command(about = "Run a fire disaster scenario against the food security database")]
#[command(version)]
struct Args {
    /// Scenario JSON file; read from stdin when omitted
    request: Option<PathBuf>,

    /// Emit logs as JSON (overrides LOG_JSON)
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;
    init_logger(args.json_logs || config.log_json);

    tracing::info!(
        weather_key = %config.weather.api_key.as_deref().map(redact).unwrap_or_default(),
        routing_key = %config.routing.api_key.as_deref().map(redact).unwrap_or_default(),
        dedupe = config.dedupe_side_effects,
        "Configuration loaded"
    );

    let request = read_request(args.request.as_deref())?;

    let pool = config::database::create_pool(&config).await?;
    let repo = PgRepository::new(pool);
    repo.ensure_schema().await.context("schema bootstrap failed")?;

    let weather = OpenWeatherClient::new(
        &config.weather.base_url,
        config.weather.api_key.clone(),
        config.external_api_timeout(),
        config.retry.clone(),
    )?;
    let routing = GoogleMapsClient::new(
        &config.routing.base_url,
        config.routing.api_key.clone(),
        config.external_api_timeout(),
        config.retry.clone(),
    )?;

    let service = FireDisasterService::new(
        Arc::new(repo),
        Arc::new(weather),
        Arc::new(routing),
        config,
    );

    match service.simulate(&request).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) if e.is_client_error() => Err(anyhow::anyhow!("rejected: {}", e)),
        Err(e) => Err(anyhow::Error::new(e).context("fire disaster pipeline failed")),
    }
}

fn read_request(path: Option<&Path>) -> anyhow::Result<FireDisasterRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("request is not a valid fire scenario")
}
