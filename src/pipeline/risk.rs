//! Stage 1: weather at the fire origin and the fire-weather risk rating.

use crate::error::Result;
use crate::models::{FireDisasterRequest, FireWeatherRisk, WeatherCheckResult};
use crate::services::WeatherService;

/// Points for one reading: the first threshold it clears, scanning from most severe.
fn points_above(value: f64, thresholds: [f64; 3]) -> u8 {
    match thresholds.iter().position(|t| value > *t) {
        Some(idx) => 3 - idx as u8,
        None => 0,
    }
}

fn points_below(value: f64, thresholds: [f64; 3]) -> u8 {
    match thresholds.iter().position(|t| value < *t) {
        Some(idx) => 3 - idx as u8,
        None => 0,
    }
}

/// Additive rule table over temperature (°C), relative humidity (%) and wind (km/h).
pub fn risk_score(temperature_c: f64, humidity_pct: f64, wind_speed_kmh: f64) -> u8 {
    points_above(temperature_c, [35.0, 28.0, 20.0])
        + points_below(humidity_pct, [20.0, 35.0, 50.0])
        + points_above(wind_speed_kmh, [40.0, 25.0, 10.0])
}

pub fn classify(score: u8) -> FireWeatherRisk {
    match score {
        s if s >= 7 => FireWeatherRisk::Extreme,
        s if s >= 5 => FireWeatherRisk::High,
        s if s >= 3 => FireWeatherRisk::Moderate,
        _ => FireWeatherRisk::Low,
    }
}

/// A weather lookup failure aborts the scenario.
pub async fn check_weather(
    weather: &dyn WeatherService,
    req: &FireDisasterRequest,
) -> Result<WeatherCheckResult> {
    let obs = weather.current(req.latitude, req.longitude).await?;

    let score = risk_score(
        obs.temperature_c.unwrap_or(0.0),
        obs.humidity_pct.unwrap_or(100.0),
        obs.wind_speed_kmh.unwrap_or(0.0),
    );

    Ok(WeatherCheckResult {
        is_drought: obs.is_drought(),
        is_heatwave: obs.is_heatwave(),
        temperature_c: obs.temperature_c,
        humidity_pct: obs.humidity_pct,
        wind_speed_kmh: obs.wind_speed_kmh,
        wind_direction: obs.wind_direction,
        rainfall_mm: obs.rainfall_mm,
        description: obs.description,
        risk_score: score,
        fire_weather_risk: classify(score),
    })
}
