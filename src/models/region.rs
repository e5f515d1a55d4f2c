use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    pub region_code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: Option<i64>,
    pub is_active: bool,
}

impl Region {
    /// Population with unknown counted as zero.
    pub fn population_or_zero(&self) -> i64 {
        self.population.unwrap_or(0).max(0)
    }

    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}
