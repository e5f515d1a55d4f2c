//! Fire disaster response pipeline.
//!
//! A scenario runs eight stages strictly in order. Each stage reads what it
//! needs from the repository, writes its side effects, and hands a typed
//! result to the stages after it:
//!
//! 1. weather check at the fire origin ([`risk`])
//! 2. flag affected zones ([`zones`])
//! 3. disrupt routes touching those zones ([`disruptions`])
//! 4. displace population to safe regions ([`displacement`])
//! 5. recalculate days of supply ([`supply`])
//! 6. raise shortage alerts ([`alerts`])
//! 7. create alternates for blocked routes ([`reroute`])
//! 8. draft emergency distribution plans ([`distribution`])

pub mod alerts;
pub mod displacement;
pub mod disruptions;
pub mod distribution;
pub mod reroute;
pub mod risk;
pub mod supply;
pub mod validation;
pub mod zones;

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::models::{FireDisasterRequest, FireDisasterResponse, FireLocation, ScenarioSummary};
use crate::repository::FoodSecurityRepository;
use crate::services::{RoutingService, WeatherService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Started,
    WeatherCheck,
    FlagZones,
    CreateDisruptions,
    DisplacePopulation,
    RecalculateSupply,
    GenerateAlerts,
    Reroute,
    OptimizeDistribution,
    Completed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Started => "started",
            PipelineStage::WeatherCheck => "weather_check",
            PipelineStage::FlagZones => "flag_zones",
            PipelineStage::CreateDisruptions => "create_disruptions",
            PipelineStage::DisplacePopulation => "displace_population",
            PipelineStage::RecalculateSupply => "recalculate_supply",
            PipelineStage::GenerateAlerts => "generate_alerts",
            PipelineStage::Reroute => "reroute",
            PipelineStage::OptimizeDistribution => "optimize_distribution",
            PipelineStage::Completed => "completed",
        }
    }

    /// The only legal transition out of this stage. `None` once completed.
    pub fn next(self) -> Option<PipelineStage> {
        use PipelineStage::*;
        match self {
            Started => Some(WeatherCheck),
            WeatherCheck => Some(FlagZones),
            FlagZones => Some(CreateDisruptions),
            CreateDisruptions => Some(DisplacePopulation),
            DisplacePopulation => Some(RecalculateSupply),
            RecalculateSupply => Some(GenerateAlerts),
            GenerateAlerts => Some(Reroute),
            Reroute => Some(OptimizeDistribution),
            OptimizeDistribution => Some(Completed),
            Completed => None,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks where a running scenario is and tags failures with that stage.
struct StageCursor<'a> {
    scenario_id: &'a str,
    current: PipelineStage,
}

impl<'a> StageCursor<'a> {
    fn new(scenario_id: &'a str) -> Self {
        Self {
            scenario_id,
            current: PipelineStage::Started,
        }
    }

    fn advance(&mut self) -> PipelineStage {
        if let Some(next) = self.current.next() {
            debug!(scenario_id = %self.scenario_id, from = %self.current, to = %next, "Stage transition");
            self.current = next;
        }
        self.current
    }

    fn fail(&self, err: PipelineError) -> PipelineError {
        error!(scenario_id = %self.scenario_id, stage = %self.current, error = %err, "Pipeline aborted");
        err.at_stage(self.current)
    }
}

/// Runs fire disaster scenarios against shared repository state.
///
/// Scenarios submitted to the same service run one at a time.
pub struct FireDisasterService {
    repo: Arc<dyn FoodSecurityRepository>,
    weather: Arc<dyn WeatherService>,
    routing: Arc<dyn RoutingService>,
    config: Config,
    run_lock: Mutex<()>,
}

impl FireDisasterService {
    pub fn new(
        repo: Arc<dyn FoodSecurityRepository>,
        weather: Arc<dyn WeatherService>,
        routing: Arc<dyn RoutingService>,
        config: Config,
    ) -> Self {
        Self {
            repo,
            weather,
            routing,
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn simulate(&self, req: &FireDisasterRequest) -> Result<FireDisasterResponse> {
        validation::validate_request(req)?;

        let _guard = self.run_lock.lock().await;

        let scenario_id = new_scenario_id();
        let started_at = Utc::now();
        let clock = Instant::now();
        let repo = self.repo.as_ref();
        let mut cursor = StageCursor::new(&scenario_id);

        info!(
            scenario_id = %scenario_id,
            latitude = req.latitude,
            longitude = req.longitude,
            radius_km = req.radius_km,
            store = repo.name(),
            "Pipeline started"
        );

        cursor.advance();
        let weather = risk::check_weather(self.weather.as_ref(), req)
            .await
            .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, risk = %weather.fire_weather_risk, score = weather.risk_score, "Weather checked");

        cursor.advance();
        let zones = zones::flag_zones(repo, req, &weather)
            .await
            .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, zones = zones.affected_zones.len(), scanned = zones.total_regions_scanned, "Zones flagged");

        cursor.advance();
        let disruptions =
            disruptions::create_disruptions(repo, &scenario_id, &zones, self.config.dedupe_side_effects)
                .await
                .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, created = disruptions.disruptions_created, "Disruptions created");

        cursor.advance();
        let displacement = displacement::displace_population(repo, req, &zones)
            .await
            .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, displaced = displacement.total_displaced, "Population displaced");

        cursor.advance();
        let supply = supply::recalculate_supply(repo, &zones, &displacement)
            .await
            .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, regions = supply.regions_updated, "Supply recalculated");

        cursor.advance();
        let alerts = alerts::generate_alerts(
            repo,
            &scenario_id,
            &zones,
            &supply,
            &self.config.shortage,
            self.config.dedupe_side_effects,
        )
        .await
        .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, alerts = alerts.alerts_generated, "Alerts generated");

        cursor.advance();
        let reroute = reroute::reroute(repo, self.routing.as_ref(), &scenario_id, &zones)
            .await
            .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, alternatives = reroute.alternative_routes_created, "Rerouting done");

        cursor.advance();
        let distribution = distribution::optimize_distribution(
            repo,
            &scenario_id,
            &zones,
            &displacement,
            &self.config.ration,
        )
        .await
        .map_err(|e| cursor.fail(e))?;
        info!(scenario_id = %scenario_id, plans = distribution.plans_created, "Distribution plans drafted");

        cursor.advance();
        let completed_at = Utc::now();
        let duration_seconds = round_to(clock.elapsed().as_secs_f64(), 2);

        let summary = ScenarioSummary {
            scenario_id: scenario_id.clone(),
            fire_weather_risk: weather.fire_weather_risk,
            regions_affected: zones.affected_zones.len(),
            population_in_affected_zones: zones.population_in_zones(),
            total_displaced: displacement.total_displaced,
            routes_disrupted: disruptions.disruptions_created,
            alerts_raised: alerts.alerts_generated,
            alternative_routes: reroute.alternative_routes_created,
            distribution_plans: distribution.plans_created,
            pipeline_duration_seconds: duration_seconds,
        };

        info!(scenario_id = %scenario_id, duration_seconds, "Pipeline completed");

        Ok(FireDisasterResponse {
            scenario_id,
            fire_location: FireLocation {
                latitude: req.latitude,
                longitude: req.longitude,
            },
            started_at,
            completed_at,
            duration_seconds,
            weather,
            zones,
            disruptions,
            displacement,
            supply,
            alerts,
            reroute,
            distribution,
            summary,
        })
    }
}

/// `FIRE-` followed by ten upper-case hex digits.
fn new_scenario_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("FIRE-{}", hex[..10].to_uppercase())
}

/// Last six characters of a scenario id, used in generated record codes.
pub(crate) fn scenario_suffix(scenario_id: &str) -> &str {
    let start = scenario_id
        .char_indices()
        .rev()
        .nth(5)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &scenario_id[start..]
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
