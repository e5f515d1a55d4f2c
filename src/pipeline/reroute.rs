//! Stage 7: alternate routes between safe distribution centers for every
//! blocked or restricted route.

use std::collections::HashSet;
use tracing::{debug, warn};

use super::scenario_suffix;
use crate::error::Result;
use crate::geo;
use crate::models::{
    DistributionCenter, FlagZonesResult, NewTransportRoute, OperationalStatus, Region,
    RerouteEntry, RerouteResult,
};
use crate::repository::FoodSecurityRepository;
use crate::services::RoutingService;

/// Closest center to `target` (first wins on ties). Without a target region the
/// first center is used.
pub fn nearest_center<'a>(
    target: Option<&Region>,
    centers: &'a [DistributionCenter],
) -> Option<&'a DistributionCenter> {
    let Some(region) = target else {
        return centers.first();
    };

    let mut best: Option<(&DistributionCenter, f64)> = None;
    for center in centers {
        let d = geo::distance_km(region.latitude, region.longitude, center.latitude, center.longitude);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((center, d));
        }
    }
    best.map(|(c, _)| c)
}

async fn endpoint_region(
    repo: &dyn FoodSecurityRepository,
    region_id: Option<i64>,
) -> Result<Option<Region>> {
    match region_id {
        Some(id) => Ok(repo.get_region(id).await?),
        None => Ok(None),
    }
}

pub async fn reroute(
    repo: &dyn FoodSecurityRepository,
    routing: &dyn RoutingService,
    scenario_id: &str,
    zones: &FlagZonesResult,
) -> Result<RerouteResult> {
    let blocked = repo.list_routes_with_status(&OperationalStatus::NEEDS_ALTERNATE).await?;
    if blocked.is_empty() {
        return Ok(RerouteResult {
            blocked_routes: 0,
            alternative_routes_created: 0,
            alternatives: Vec::new(),
        });
    }

    let affected_ids: Vec<i64> = zones.affected_zones.iter().map(|z| z.region_id).collect();
    let safe_centers = repo.list_available_centers_outside(&affected_ids).await?;

    let mut seen_pairs: HashSet<(i64, i64)> = HashSet::new();
    let mut alternatives = Vec::new();

    for route in &blocked {
        let origin_region = endpoint_region(repo, route.origin_region_id).await?;
        let dest_region = endpoint_region(repo, route.destination_region_id).await?;

        let (Some(origin), Some(dest)) = (
            nearest_center(origin_region.as_ref(), &safe_centers),
            nearest_center(dest_region.as_ref(), &safe_centers),
        ) else {
            debug!(route_id = route.id, "No safe centers for route");
            continue;
        };

        if origin.id == dest.id || !seen_pairs.insert((origin.id, dest.id)) {
            continue;
        }

        if repo
            .find_operational_route_between_centers(origin.id, dest.id)
            .await?
            .is_some()
        {
            debug!(origin = %origin.center_code, destination = %dest.center_code, "Alternate already exists");
            continue;
        }

        let directions = match routing
            .directions(origin.latitude, origin.longitude, dest.latitude, dest.longitude)
            .await
        {
            Ok(d) => d,
            Err(e) => {
                warn!(
                    scenario_id = %scenario_id,
                    origin = %origin.center_code,
                    destination = %dest.center_code,
                    error = %e,
                    "Alternate route lookup failed, skipping"
                );
                continue;
            }
        };

        let created = repo
            .create_route(NewTransportRoute {
                route_code: format!(
                    "ALT-{}-{}-{}",
                    scenario_suffix(scenario_id),
                    origin.center_code,
                    dest.center_code
                ),
                name: format!("[ALT] {} -> {}", origin.name, dest.name),
                origin_region_id: Some(origin.region_id),
                destination_region_id: Some(dest.region_id),
                origin_center_id: Some(origin.id),
                destination_center_id: Some(dest.id),
                distance_km: Some(directions.distance_km),
                estimated_time_hours: Some(directions.duration_hours),
                path_polyline: Some(directions.polyline),
                operational_status: OperationalStatus::Operational,
            })
            .await?;

        alternatives.push(RerouteEntry {
            route_id: created.id,
            route_code: created.route_code,
            origin: origin.name.clone(),
            destination: dest.name.clone(),
            distance_km: directions.distance_km,
            duration_hours: directions.duration_hours,
        });
    }

    Ok(RerouteResult {
        blocked_routes: blocked.len(),
        alternative_routes_created: alternatives.len(),
        alternatives,
    })
}
