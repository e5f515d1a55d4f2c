//! Stage 6: one shortage alert per affected zone.

use tracing::debug;
use uuid::Uuid;

use crate::config::ShortageThresholds;
use crate::error::Result;
use crate::models::{
    AffectedZone, AlertLevel, AlertRecord, AlertType, FlagZonesResult, GenerateAlertsResult,
    NewShortageAlert, RecalculateSupplyResult, RecommendedAction, ZoneSeverity,
};
use crate::repository::FoodSecurityRepository;

pub const MODEL_NAME: &str = "fire_disaster_pipeline_v1";
const CONFIDENCE: f64 = 0.85;

const ACTIONS: [&str; 3] = [
    "Activate emergency food reserves",
    "Begin evacuation-corridor supply staging",
    "Deploy mobile distribution units",
];

/// Level implied by the zone's severity, raised (never lowered) when the
/// recalculated days of supply fall under a threshold.
pub fn alert_level(
    severity: ZoneSeverity,
    days_of_supply: Option<f64>,
    thresholds: &ShortageThresholds,
) -> AlertLevel {
    let base = severity.base_alert_level();
    let from_supply = match days_of_supply {
        Some(days) if days < thresholds.critical_days => AlertLevel::Critical,
        Some(days) if days < thresholds.imminent_days => AlertLevel::Imminent,
        _ => AlertLevel::Normal,
    };
    base.max(from_supply)
}

pub fn recommended_actions() -> Vec<RecommendedAction> {
    ACTIONS
        .iter()
        .zip(1u8..)
        .map(|(action, priority)| RecommendedAction {
            action: action.to_string(),
            priority,
        })
        .collect()
}

fn alert_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("SA-{}", hex[..8].to_uppercase())
}

fn new_alert(
    scenario_id: &str,
    zone: &AffectedZone,
    level: AlertLevel,
    days: Option<f64>,
) -> NewShortageAlert {
    NewShortageAlert {
        region_id: zone.region_id,
        alert_code: alert_code(),
        alert_type: AlertType::Weather,
        alert_level: level,
        title: format!(
            "[{}] Fire disaster — {} ({})",
            scenario_id, zone.region_name, zone.severity
        ),
        description: format!(
            "Fire disaster scenario {}. Region {} is affected with {} severity \
             ({} km from fire origin). Wind-exposed: {}.",
            scenario_id, zone.region_name, zone.severity, zone.distance_km, zone.wind_exposed
        ),
        population_affected: zone.population,
        days_until_shortage: days.filter(|d| *d > 0.0).map(|d| d.trunc() as i64),
        current_days_supply: days,
        confidence_score: CONFIDENCE,
        model_name: MODEL_NAME.to_string(),
        recommended_actions: recommended_actions(),
    }
}

pub async fn generate_alerts(
    repo: &dyn FoodSecurityRepository,
    scenario_id: &str,
    zones: &FlagZonesResult,
    supply: &RecalculateSupplyResult,
    thresholds: &ShortageThresholds,
    dedupe: bool,
) -> Result<GenerateAlertsResult> {
    let mut alerts = Vec::new();

    for zone in &zones.affected_zones {
        if dedupe && repo.has_active_alert(zone.region_id).await? {
            debug!(region_id = zone.region_id, "Region already has an active alert, skipping");
            continue;
        }

        let days = supply.days_for(zone.region_id);
        let level = alert_level(zone.severity, days, thresholds);

        let created = repo
            .create_alert(new_alert(scenario_id, zone, level, days))
            .await?;

        alerts.push(AlertRecord {
            alert_id: created.id,
            alert_code: created.alert_code,
            region_id: zone.region_id,
            region_name: zone.region_name.clone(),
            level,
            title: created.title,
        });
    }

    Ok(GenerateAlertsResult {
        alerts_generated: alerts.len(),
        alerts,
    })
}
