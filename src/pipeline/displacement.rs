//! Stage 4: move people out of affected zones into the nearest safe regions.

use tracing::{debug, warn};

use crate::error::Result;
use crate::geo;
use crate::models::{
    AffectedZone, DisplacePopulationResult, DisplacementEntry, FireDisasterRequest,
    FlagZonesResult, Region,
};
use crate::repository::FoodSecurityRepository;

/// Least-affected zones used as receivers when no region is safe.
const FALLBACK_RECEIVERS: usize = 3;

pub fn displaced_count(zone: &AffectedZone, displacement_pct: f64) -> i64 {
    let population = zone.population.unwrap_or(0).max(0) as f64;
    (population * displacement_pct * zone.severity.displacement_multiplier()).floor() as i64
}

/// Splits `total` over `candidates` receivers, closest first. Each receiver
/// takes `max(1, remaining / receivers_left)`, so the last one absorbs the
/// remainder and the shares always sum to `total`. Trailing zero shares are
/// dropped.
pub fn allocate_shares(total: i64, candidates: usize) -> Vec<i64> {
    let mut shares = Vec::new();
    let mut remaining = total;

    for i in 0..candidates {
        if remaining <= 0 {
            break;
        }
        let left = (candidates - i) as i64;
        let share = (remaining / left).max(1).min(remaining);
        shares.push(share);
        remaining -= share;
    }

    shares
}

/// Active regions outside the affected set; if there are none, the three
/// affected zones farthest from the fire, sources included.
async fn find_receivers(
    repo: &dyn FoodSecurityRepository,
    zones: &FlagZonesResult,
) -> Result<(Vec<Region>, bool)> {
    let safe: Vec<Region> = repo
        .list_active_regions()
        .await?
        .into_iter()
        .filter(|r| !zones.contains(r.id))
        .collect();

    if !safe.is_empty() {
        return Ok((safe, false));
    }

    let mut farthest: Vec<&AffectedZone> = zones.affected_zones.iter().collect();
    farthest.sort_by(|a, b| b.distance_km.total_cmp(&a.distance_km));
    let ids: Vec<i64> = farthest
        .iter()
        .take(FALLBACK_RECEIVERS)
        .map(|z| z.region_id)
        .collect();

    Ok((repo.get_regions(&ids).await?, true))
}

pub async fn displace_population(
    repo: &dyn FoodSecurityRepository,
    req: &FireDisasterRequest,
    zones: &FlagZonesResult,
) -> Result<DisplacePopulationResult> {
    if zones.affected_zones.is_empty() {
        return Ok(DisplacePopulationResult {
            total_displaced: 0,
            used_fallback_receivers: false,
            entries: Vec::new(),
        });
    }

    let (receivers, used_fallback_receivers) = find_receivers(repo, zones).await?;
    let mut entries = Vec::new();
    let mut total_displaced = 0;

    for zone in &zones.affected_zones {
        let displaced = displaced_count(zone, req.displacement_pct);
        if displaced == 0 {
            continue;
        }

        let Some(source) = repo.get_region(zone.region_id).await? else {
            warn!(region_id = zone.region_id, "Source region vanished, skipping its displacement");
            continue;
        };

        // in fallback mode a zone may be its own receiver; its share nets to zero
        let mut candidates: Vec<(&Region, f64)> = receivers
            .iter()
            .map(|r| {
                let d = geo::distance_km(source.latitude, source.longitude, r.latitude, r.longitude);
                (r, d)
            })
            .collect();
        if candidates.is_empty() {
            debug!(region_id = zone.region_id, "No receivers for zone");
            continue;
        }
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let shares = allocate_shares(displaced, candidates.len());
        for ((receiver, _), share) in candidates.iter().zip(shares) {
            entries.push(DisplacementEntry {
                from_region_id: zone.region_id,
                from_region_name: zone.region_name.clone(),
                to_region_id: receiver.id,
                to_region_name: receiver.name.clone(),
                displaced_count: share,
            });
        }

        total_displaced += displaced;
    }

    Ok(DisplacePopulationResult {
        total_displaced,
        used_fallback_receivers,
        entries,
    })
}
