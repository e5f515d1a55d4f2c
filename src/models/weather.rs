use serde::{Deserialize, Serialize};

const DROUGHT_HUMIDITY_PCT: f64 = 20.0;
const HEATWAVE_TEMP_C: f64 = 40.0;
const FROST_TEMP_C: f64 = 0.0;
const FLOOD_RAINFALL_MM: f64 = 50.0;

/// Current conditions at a coordinate. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    /// 8-point compass code (N, NE, ... NW)
    pub wind_direction: Option<String>,
    pub rainfall_mm: Option<f64>,
    pub description: String,
}

impl WeatherObservation {
    pub fn is_drought(&self) -> bool {
        self.humidity_pct.is_some_and(|h| h < DROUGHT_HUMIDITY_PCT)
    }

    pub fn is_heatwave(&self) -> bool {
        self.temperature_c.is_some_and(|t| t >= HEATWAVE_TEMP_C)
    }

    pub fn is_frost(&self) -> bool {
        self.temperature_c.is_some_and(|t| t <= FROST_TEMP_C)
    }

    pub fn is_flood(&self) -> bool {
        self.rainfall_mm.is_some_and(|r| r >= FLOOD_RAINFALL_MM)
    }
}

/// Driving directions between two coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directions {
    pub distance_km: f64,
    pub duration_hours: f64,
    pub polyline: String,
}
