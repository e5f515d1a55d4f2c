use serde::{Deserialize, Serialize};

use super::string_enum;

string_enum! {
    /// Operational state shared by transport routes and distribution centers.
    OperationalStatus {
        Operational => "operational",
        Impaired => "impaired",
        Restricted => "restricted",
        Blocked => "blocked",
        Maintenance => "maintenance",
    }
}

impl OperationalStatus {
    /// Routes in these states get an alternate during rerouting.
    pub const NEEDS_ALTERNATE: [OperationalStatus; 2] =
        [OperationalStatus::Blocked, OperationalStatus::Restricted];
}

string_enum! {
    DisruptionSeverity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

string_enum! {
    DisruptionType {
        Weather => "weather",
        Infrastructure => "infrastructure",
        Conflict => "conflict",
        Strike => "strike",
        Other => "other",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportRoute {
    pub id: i64,
    pub route_code: String,
    pub name: String,
    pub origin_region_id: Option<i64>,
    pub destination_region_id: Option<i64>,
    pub origin_center_id: Option<i64>,
    pub destination_center_id: Option<i64>,
    pub distance_km: Option<f64>,
    pub estimated_time_hours: Option<f64>,
    pub path_polyline: Option<String>,
    pub operational_status: OperationalStatus,
    pub is_active: bool,
}

impl TransportRoute {
    pub fn touches_region(&self, region_id: i64) -> bool {
        self.origin_region_id == Some(region_id) || self.destination_region_id == Some(region_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransportRoute {
    pub route_code: String,
    pub name: String,
    pub origin_region_id: Option<i64>,
    pub destination_region_id: Option<i64>,
    pub origin_center_id: Option<i64>,
    pub destination_center_id: Option<i64>,
    pub distance_km: Option<f64>,
    pub estimated_time_hours: Option<f64>,
    pub path_polyline: Option<String>,
    pub operational_status: OperationalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDisruption {
    pub id: i64,
    pub route_id: i64,
    pub region_id: Option<i64>,
    pub disruption_type: DisruptionType,
    pub severity: DisruptionSeverity,
    pub title: String,
    pub description: String,
    pub capacity_reduction_percentage: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRouteDisruption {
    pub route_id: i64,
    pub region_id: Option<i64>,
    pub disruption_type: DisruptionType,
    pub severity: DisruptionSeverity,
    pub title: String,
    pub description: String,
    pub capacity_reduction_percentage: f64,
}
