//! Request validation. Runs before any stage touches the repository.

use crate::error::{PipelineError, Result};
use crate::models::FireDisasterRequest;

pub const MIN_RADIUS_KM: f64 = 5.0;
pub const MAX_RADIUS_KM: f64 = 500.0;
pub const MIN_FIRE_INTENSITY: f64 = 0.1;
pub const MAX_FIRE_INTENSITY: f64 = 1.0;

/// Rejects the first out-of-range field, naming it. NaN fails every range check.
pub fn validate_request(req: &FireDisasterRequest) -> Result<()> {
    check_range("latitude", req.latitude, -90.0, 90.0)?;
    check_range("longitude", req.longitude, -180.0, 180.0)?;
    check_range("radius_km", req.radius_km, MIN_RADIUS_KM, MAX_RADIUS_KM)?;
    check_range(
        "fire_intensity",
        req.fire_intensity,
        MIN_FIRE_INTENSITY,
        MAX_FIRE_INTENSITY,
    )?;
    check_range("displacement_pct", req.displacement_pct, 0.0, 1.0)?;
    Ok(())
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(PipelineError::invalid(format!(
            "{} must be within [{}, {}], got {}",
            field, min, max, value
        )))
    }
}
