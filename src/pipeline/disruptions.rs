//! Stage 3: disrupt every operational route that touches an affected zone.

use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    CreateDisruptionsResult, DisruptionRecord, DisruptionType, FlagZonesResult, NewRouteDisruption,
    TransportRoute, ZoneSeverity,
};
use crate::repository::FoodSecurityRepository;

/// Worse of the two endpoint severities; origin wins ties.
pub fn route_severity(
    route: &TransportRoute,
    severities: &HashMap<i64, ZoneSeverity>,
) -> Option<ZoneSeverity> {
    let lookup = |id: Option<i64>| id.and_then(|id| severities.get(&id).copied());
    ZoneSeverity::worst(
        lookup(route.origin_region_id),
        lookup(route.destination_region_id),
    )
}

pub async fn create_disruptions(
    repo: &dyn FoodSecurityRepository,
    scenario_id: &str,
    zones: &FlagZonesResult,
    dedupe: bool,
) -> Result<CreateDisruptionsResult> {
    if zones.affected_zones.is_empty() {
        return Ok(CreateDisruptionsResult {
            routes_scanned: 0,
            disruptions_created: 0,
            disruptions: Vec::new(),
        });
    }

    let severities: HashMap<i64, ZoneSeverity> = zones
        .affected_zones
        .iter()
        .map(|z| (z.region_id, z.severity))
        .collect();
    let affected_ids: Vec<i64> = zones.affected_zones.iter().map(|z| z.region_id).collect();

    let routes = repo.list_operational_routes_touching(&affected_ids).await?;
    let mut disruptions = Vec::new();

    for route in &routes {
        let Some(severity) = route_severity(route, &severities) else {
            continue;
        };

        if dedupe && repo.has_active_disruption(route.id).await? {
            debug!(route_id = route.id, "Route already disrupted, skipping");
            continue;
        }

        let created = repo
            .create_disruption(NewRouteDisruption {
                route_id: route.id,
                region_id: route.origin_region_id.or(route.destination_region_id),
                disruption_type: DisruptionType::Weather,
                severity: severity.disruption_severity(),
                title: format!("[{}] Fire disruption on {}", scenario_id, route.name),
                description: format!("Route affected by fire disaster scenario {}", scenario_id),
                capacity_reduction_percentage: severity.capacity_reduction_pct(),
            })
            .await?;

        let status = severity.route_status();
        repo.update_route_status(route.id, status).await?;

        debug!(route_id = route.id, severity = %severity, status = %status, "Route disrupted");

        disruptions.push(DisruptionRecord {
            disruption_id: created.id,
            route_id: route.id,
            route_name: route.name.clone(),
            severity,
            db_severity: created.severity,
            capacity_reduction_percentage: created.capacity_reduction_percentage,
            status,
        });
    }

    Ok(CreateDisruptionsResult {
        routes_scanned: routes.len(),
        disruptions_created: disruptions.len(),
        disruptions,
    })
}
