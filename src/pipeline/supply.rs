//! Stage 5: days of supply after displacement changes each region's demand.

use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::round_to;
use crate::error::Result;
use crate::models::{
    DisplacePopulationResult, FlagZonesResult, FoodInventory, RecalculateSupplyResult,
    SupplyRecalcEntry,
};
use crate::repository::FoodSecurityRepository;

/// Net population change per region, in processing order: affected zones
/// first, then other regions in the order displacement first touched them.
pub fn population_deltas(
    zones: &FlagZonesResult,
    displacement: &DisplacePopulationResult,
) -> Vec<(i64, i64)> {
    let mut order: Vec<i64> = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();
    let mut deltas: HashMap<i64, i64> = HashMap::new();

    for zone in &zones.affected_zones {
        if seen.insert(zone.region_id) {
            order.push(zone.region_id);
        }
    }

    for entry in &displacement.entries {
        for (region_id, change) in [
            (entry.from_region_id, -entry.displaced_count),
            (entry.to_region_id, entry.displaced_count),
        ] {
            *deltas.entry(region_id).or_insert(0) += change;
            if seen.insert(region_id) {
                order.push(region_id);
            }
        }
    }

    order
        .into_iter()
        .map(|id| (id, deltas.get(&id).copied().unwrap_or(0)))
        .collect()
}

/// Effective over original population; 1.0 when the original is unknown or zero.
pub fn demand_multiplier(original_population: i64, effective_population: i64) -> f64 {
    if original_population > 0 {
        effective_population as f64 / original_population as f64
    } else {
        1.0
    }
}

/// Days of supply under the new demand, to one decimal. Prefers the recorded
/// consumption rate; falls back to scaling the recorded days of supply. `None`
/// when there is no inventory or the estimate would divide by zero.
pub fn estimate_days_of_supply(inventory: Option<&FoodInventory>, multiplier: f64) -> Option<f64> {
    let inv = inventory?;

    match inv.consumption_rate_tonnes_per_day {
        Some(rate) if rate > 0.0 => {
            let adjusted = rate * multiplier;
            (adjusted > 0.0).then(|| round_to(inv.quantity_tonnes / adjusted, 1))
        }
        _ => {
            let days = inv.days_of_supply?;
            (multiplier > 0.0).then(|| round_to(days / multiplier, 1))
        }
    }
}

pub async fn recalculate_supply(
    repo: &dyn FoodSecurityRepository,
    zones: &FlagZonesResult,
    displacement: &DisplacePopulationResult,
) -> Result<RecalculateSupplyResult> {
    let mut entries = Vec::new();

    for (region_id, delta) in population_deltas(zones, displacement) {
        let Some(region) = repo.get_region(region_id).await? else {
            warn!(region_id, "Region not found during supply recalculation, skipping");
            continue;
        };

        let original_population = region.population_or_zero();
        let effective_population = original_population.saturating_add(delta).max(0);
        let multiplier = demand_multiplier(original_population, effective_population);

        let inventory = repo.latest_inventory(region_id).await?;

        entries.push(SupplyRecalcEntry {
            region_id,
            region_name: region.name,
            original_population,
            effective_population,
            demand_multiplier: round_to(multiplier, 2),
            estimated_days_of_supply: estimate_days_of_supply(inventory.as_ref(), multiplier),
        });
    }

    Ok(RecalculateSupplyResult {
        regions_updated: entries.len(),
        entries,
    })
}
