//! Request, per-stage results and the assembled response of one fire scenario.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::AlertLevel;
use super::route::{DisruptionSeverity, OperationalStatus};

fn default_radius_km() -> f64 {
    50.0
}

fn default_fire_intensity() -> f64 {
    0.7
}

fn default_displacement_pct() -> f64 {
    0.4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireDisasterRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// 0.1 = minor, 1.0 = catastrophic
    #[serde(default = "default_fire_intensity")]
    pub fire_intensity: f64,
    /// Fraction of the population in affected zones that leaves.
    #[serde(default = "default_displacement_pct")]
    pub displacement_pct: f64,
}

impl FireDisasterRequest {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km: default_radius_km(),
            fire_intensity: default_fire_intensity(),
            displacement_pct: default_displacement_pct(),
        }
    }
}

/// How hard a region is hit by the fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneSeverity {
    Moderate,
    High,
    Critical,
}

impl ZoneSeverity {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.6 {
            ZoneSeverity::Critical
        } else if score >= 0.3 {
            ZoneSeverity::High
        } else {
            ZoneSeverity::Moderate
        }
    }

    /// One step worse; critical stays critical.
    pub fn escalate(self) -> Self {
        match self {
            ZoneSeverity::Moderate => ZoneSeverity::High,
            ZoneSeverity::High | ZoneSeverity::Critical => ZoneSeverity::Critical,
        }
    }

    pub fn rank(severity: Option<ZoneSeverity>) -> u8 {
        match severity {
            Some(ZoneSeverity::Critical) => 3,
            Some(ZoneSeverity::High) => 2,
            Some(ZoneSeverity::Moderate) => 1,
            None => 0,
        }
    }

    /// The worse of two optional severities; ties keep `a`.
    pub fn worst(a: Option<ZoneSeverity>, b: Option<ZoneSeverity>) -> Option<ZoneSeverity> {
        if Self::rank(a) >= Self::rank(b) {
            a
        } else {
            b
        }
    }

    pub fn disruption_severity(self) -> DisruptionSeverity {
        match self {
            ZoneSeverity::Critical => DisruptionSeverity::Critical,
            ZoneSeverity::High => DisruptionSeverity::High,
            ZoneSeverity::Moderate => DisruptionSeverity::Medium,
        }
    }

    pub fn capacity_reduction_pct(self) -> f64 {
        match self {
            ZoneSeverity::Critical => 100.0,
            ZoneSeverity::High => 70.0,
            ZoneSeverity::Moderate => 40.0,
        }
    }

    pub fn route_status(self) -> OperationalStatus {
        match self {
            ZoneSeverity::Critical => OperationalStatus::Blocked,
            ZoneSeverity::High => OperationalStatus::Restricted,
            ZoneSeverity::Moderate => OperationalStatus::Impaired,
        }
    }

    pub fn base_alert_level(self) -> AlertLevel {
        match self {
            ZoneSeverity::Critical => AlertLevel::Critical,
            ZoneSeverity::High => AlertLevel::Imminent,
            ZoneSeverity::Moderate => AlertLevel::Warning,
        }
    }

    /// Share of a zone's population that leaves.
    pub fn displacement_multiplier(self) -> f64 {
        match self {
            ZoneSeverity::Critical => 1.0,
            ZoneSeverity::High => 0.7,
            ZoneSeverity::Moderate => 0.3,
        }
    }

    /// Share of a zone's population assumed to stay behind after evacuation.
    pub fn residual_fraction(self) -> f64 {
        match self {
            ZoneSeverity::Critical => 0.0,
            ZoneSeverity::High => 0.3,
            ZoneSeverity::Moderate => 0.7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneSeverity::Moderate => "moderate",
            ZoneSeverity::High => "high",
            ZoneSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ZoneSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireWeatherRisk {
    Low,
    Moderate,
    High,
    Extreme,
}

impl FireWeatherRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            FireWeatherRisk::Low => "low",
            FireWeatherRisk::Moderate => "moderate",
            FireWeatherRisk::High => "high",
            FireWeatherRisk::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for FireWeatherRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stage 1

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCheckResult {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction: Option<String>,
    pub rainfall_mm: Option<f64>,
    pub description: String,
    pub risk_score: u8,
    pub fire_weather_risk: FireWeatherRisk,
    pub is_drought: bool,
    pub is_heatwave: bool,
}

// Stage 2

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedZone {
    pub region_id: i64,
    pub region_name: String,
    pub distance_km: f64,
    pub severity: ZoneSeverity,
    pub population: Option<i64>,
    pub wind_exposed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagZonesResult {
    pub total_regions_scanned: usize,
    /// Closest first.
    pub affected_zones: Vec<AffectedZone>,
}

impl FlagZonesResult {
    pub fn contains(&self, region_id: i64) -> bool {
        self.affected_zones.iter().any(|z| z.region_id == region_id)
    }

    pub fn severity_of(&self, region_id: i64) -> Option<ZoneSeverity> {
        self.affected_zones
            .iter()
            .find(|z| z.region_id == region_id)
            .map(|z| z.severity)
    }

    pub fn population_in_zones(&self) -> i64 {
        self.affected_zones
            .iter()
            .map(|z| z.population.unwrap_or(0).max(0))
            .sum()
    }
}

// Stage 3

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisruptionRecord {
    pub disruption_id: i64,
    pub route_id: i64,
    pub route_name: String,
    pub severity: ZoneSeverity,
    pub db_severity: DisruptionSeverity,
    pub capacity_reduction_percentage: f64,
    pub status: OperationalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDisruptionsResult {
    pub routes_scanned: usize,
    pub disruptions_created: usize,
    pub disruptions: Vec<DisruptionRecord>,
}

// Stage 4

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacementEntry {
    pub from_region_id: i64,
    pub from_region_name: String,
    pub to_region_id: i64,
    pub to_region_name: String,
    pub displaced_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplacePopulationResult {
    pub total_displaced: i64,
    /// True when every active region was affected and the least-affected zones
    /// were used as receivers.
    pub used_fallback_receivers: bool,
    pub entries: Vec<DisplacementEntry>,
}

// Stage 5

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyRecalcEntry {
    pub region_id: i64,
    pub region_name: String,
    pub original_population: i64,
    pub effective_population: i64,
    pub demand_multiplier: f64,
    pub estimated_days_of_supply: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculateSupplyResult {
    pub regions_updated: usize,
    pub entries: Vec<SupplyRecalcEntry>,
}

impl RecalculateSupplyResult {
    pub fn days_for(&self, region_id: i64) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.region_id == region_id)
            .and_then(|e| e.estimated_days_of_supply)
    }
}

// Stage 6

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub alert_id: i64,
    pub alert_code: String,
    pub region_id: i64,
    pub region_name: String,
    pub level: AlertLevel,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateAlertsResult {
    pub alerts_generated: usize,
    pub alerts: Vec<AlertRecord>,
}

// Stage 7

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerouteEntry {
    pub route_id: i64,
    pub route_code: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerouteResult {
    pub blocked_routes: usize,
    pub alternative_routes_created: usize,
    pub alternatives: Vec<RerouteEntry>,
}

// Stage 8

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPlanSummary {
    pub plan_id: i64,
    pub plan_code: String,
    pub region_id: i64,
    pub region_name: String,
    pub population_covered: i64,
    pub food_allocated_tonnes: f64,
    pub distribution_points: i64,
    pub priority_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeDistributionResult {
    pub plans_created: usize,
    pub plans: Vec<DistributionPlanSummary>,
}

// Response

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario_id: String,
    pub fire_weather_risk: FireWeatherRisk,
    pub regions_affected: usize,
    pub population_in_affected_zones: i64,
    pub total_displaced: i64,
    pub routes_disrupted: usize,
    pub alerts_raised: usize,
    pub alternative_routes: usize,
    pub distribution_plans: usize,
    pub pipeline_duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireDisasterResponse {
    pub scenario_id: String,
    pub fire_location: FireLocation,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub weather: WeatherCheckResult,
    pub zones: FlagZonesResult,
    pub disruptions: CreateDisruptionsResult,
    pub displacement: DisplacePopulationResult,
    pub supply: RecalculateSupplyResult,
    pub alerts: GenerateAlertsResult,
    pub reroute: RerouteResult,
    pub distribution: OptimizeDistributionResult,
    pub summary: ScenarioSummary,
}
