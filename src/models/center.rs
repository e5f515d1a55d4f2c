use serde::{Deserialize, Serialize};

use super::route::OperationalStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionCenter {
    pub id: i64,
    pub center_code: String,
    pub name: String,
    pub region_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub operational_status: OperationalStatus,
    pub is_active: bool,
}

impl DistributionCenter {
    pub fn is_available(&self) -> bool {
        self.is_active && self.operational_status == OperationalStatus::Operational
    }
}
