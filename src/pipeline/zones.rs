//! Stage 2: which active regions sit inside the fire radius, and how badly.

use tracing::debug;

use super::round_to;
use crate::error::Result;
use crate::geo::{self, WIND_CONE_HALF_ANGLE};
use crate::models::{
    AffectedZone, FireDisasterRequest, FlagZonesResult, Region, WeatherCheckResult, ZoneSeverity,
};
use crate::repository::FoodSecurityRepository;

/// `(1 - distance / radius) * intensity`: 0 at the edge, `intensity` at the epicenter.
pub fn severity_score(distance_km: f64, radius_km: f64, fire_intensity: f64) -> f64 {
    (1.0 - distance_km / radius_km) * fire_intensity
}

/// Zone for `region`, or `None` when it lies outside the radius.
pub fn assess_region(
    req: &FireDisasterRequest,
    region: &Region,
    wind_bearing: Option<f64>,
) -> Option<AffectedZone> {
    let distance = geo::distance_km(req.latitude, req.longitude, region.latitude, region.longitude);
    if distance > req.radius_km {
        return None;
    }

    let mut severity = ZoneSeverity::from_score(severity_score(distance, req.radius_km, req.fire_intensity));

    let wind_exposed = wind_bearing.is_some_and(|wind| {
        let bearing = geo::bearing_deg(req.latitude, req.longitude, region.latitude, region.longitude);
        geo::is_within_cone(bearing, wind, WIND_CONE_HALF_ANGLE)
    });
    if wind_exposed {
        severity = severity.escalate();
    }

    Some(AffectedZone {
        region_id: region.id,
        region_name: region.name.clone(),
        distance_km: round_to(distance, 1),
        severity,
        population: region.population,
        wind_exposed,
    })
}

pub async fn flag_zones(
    repo: &dyn FoodSecurityRepository,
    req: &FireDisasterRequest,
    weather: &WeatherCheckResult,
) -> Result<FlagZonesResult> {
    let regions = repo.list_active_regions().await?;
    let wind_bearing = weather.wind_direction.as_deref().and_then(geo::wind_bearing);

    let mut affected_zones: Vec<AffectedZone> = regions
        .iter()
        .filter(|r| {
            let valid = r.has_valid_coordinates();
            if !valid {
                debug!(region_id = r.id, "Skipping region with invalid coordinates");
            }
            valid
        })
        .filter_map(|r| assess_region(req, r, wind_bearing))
        .collect();

    // stable: equal distances keep repository (id) order
    affected_zones.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    Ok(FlagZonesResult {
        total_regions_scanned: regions.len(),
        affected_zones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: i64, latitude: f64, longitude: f64) -> Region {
        Region {
            id,
            region_code: format!("R{}", id),
            name: format!("Region {}", id),
            latitude,
            longitude,
            population: Some(1_000),
            is_active: true,
        }
    }

    fn request(intensity: f64) -> FireDisasterRequest {
        FireDisasterRequest {
            fire_intensity: intensity,
            ..FireDisasterRequest::new(10.0, 20.0)
        }
    }

    #[test]
    fn test_epicenter_is_critical() {
        let zone = assess_region(&request(1.0), &region(1, 10.0, 20.0), None).unwrap();
        assert_eq!(zone.severity, ZoneSeverity::Critical);
        assert_eq!(zone.distance_km, 0.0);
        assert!(!zone.wind_exposed);
    }

    #[test]
    fn test_outside_radius_is_skipped() {
        // roughly 111 km north
        assert!(assess_region(&request(1.0), &region(1, 11.0, 20.0), None).is_none());
    }

    #[test]
    fn test_downwind_region_escalates() {
        // ~22 km north of a 50 km fire at intensity 0.6: score ~0.33, high
        let r = region(1, 10.2, 20.0);
        let calm = assess_region(&request(0.6), &r, None).unwrap();
        let windy = assess_region(&request(0.6), &r, Some(0.0)).unwrap();
        assert_eq!(calm.severity, ZoneSeverity::High);
        assert_eq!(windy.severity, ZoneSeverity::Critical);
        assert!(windy.wind_exposed);
    }

    #[test]
    fn test_upwind_region_not_exposed() {
        let zone = assess_region(&request(0.6), &region(1, 9.8, 20.0), Some(0.0)).unwrap();
        assert!(!zone.wind_exposed);
    }

    #[test]
    fn test_score_non_increasing_with_distance() {
        let mut last = f64::INFINITY;
        for step in 0..=50 {
            let score = severity_score(step as f64, 50.0, 0.8);
            assert!(score <= last);
            last = score;
        }
    }
}
