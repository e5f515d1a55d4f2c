use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inventory snapshot for a region and food category. The pipeline only ever
/// reads the most recent row per region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodInventory {
    pub id: i64,
    pub region_id: i64,
    pub category_id: i64,
    pub recorded_at: DateTime<Utc>,
    pub quantity_tonnes: f64,
    pub consumption_rate_tonnes_per_day: Option<f64>,
    pub days_of_supply: Option<f64>,
}
