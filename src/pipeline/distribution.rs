//! Stage 8: emergency distribution plans for every region with people to feed.

use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use super::{round_to, scenario_suffix};
use crate::config::RationPolicy;
use crate::error::Result;
use crate::models::{
    DisplacePopulationResult, DistributionPlanSummary, FlagZonesResult, NewDistributionPlan,
    OptimizeDistributionResult, PopulationType,
};
use crate::repository::FoodSecurityRepository;

const FOOD_SPLIT: [(&str, f64); 5] = [
    ("rice", 0.40),
    ("wheat", 0.20),
    ("legumes", 0.15),
    ("oil", 0.05),
    ("vegetables", 0.20),
];

const PRIORITY_WEIGHTS: [(PopulationType, f64); 5] = [
    (PopulationType::Elderly, 1.0),
    (PopulationType::Children, 1.0),
    (PopulationType::Pregnant, 1.0),
    (PopulationType::HealthcareWorker, 0.9),
    (PopulationType::General, 0.7),
];

/// People each region must feed: displaced arrivals, plus the residual
/// population of zones that received nobody. A region that is both a zone and
/// a receiver is counted once, from its arrivals.
pub fn receiving_population(
    zones: &FlagZonesResult,
    displacement: &DisplacePopulationResult,
) -> Vec<(i64, i64)> {
    let mut order: Vec<i64> = Vec::new();
    let mut totals: HashMap<i64, i64> = HashMap::new();

    for entry in &displacement.entries {
        let total = totals.entry(entry.to_region_id).or_insert_with(|| {
            order.push(entry.to_region_id);
            0
        });
        *total += entry.displaced_count;
    }

    for zone in &zones.affected_zones {
        let population = zone.population.unwrap_or(0);
        if population <= 0 || totals.contains_key(&zone.region_id) {
            continue;
        }
        let residual = (population as f64 * zone.severity.residual_fraction()).trunc() as i64;
        if residual > 0 {
            order.push(zone.region_id);
            totals.insert(zone.region_id, residual);
        }
    }

    order
        .into_iter()
        .filter_map(|id| totals.get(&id).map(|p| (id, *p)))
        .filter(|(_, p)| *p > 0)
        .collect()
}

pub fn food_tonnes(population: i64, ration: &RationPolicy) -> f64 {
    round_to(
        population as f64 * ration.kg_per_person_per_day * ration.plan_days as f64 / 1000.0,
        2,
    )
}

pub fn food_allocation(total_tonnes: f64) -> BTreeMap<String, f64> {
    FOOD_SPLIT
        .iter()
        .map(|(item, share)| (item.to_string(), round_to(total_tonnes * share, 2)))
        .collect()
}

pub fn priority_weights() -> BTreeMap<String, f64> {
    PRIORITY_WEIGHTS
        .iter()
        .map(|(group, weight)| (group.as_str().to_string(), *weight))
        .collect()
}

pub async fn optimize_distribution(
    repo: &dyn FoodSecurityRepository,
    scenario_id: &str,
    zones: &FlagZonesResult,
    displacement: &DisplacePopulationResult,
    ration: &RationPolicy,
) -> Result<OptimizeDistributionResult> {
    let mut plans = Vec::new();

    for (region_id, population) in receiving_population(zones, displacement) {
        let Some(region) = repo.get_region(region_id).await? else {
            warn!(region_id, "Receiving region not found, no plan drafted");
            continue;
        };

        let tonnes = food_tonnes(population, ration);
        let centers = repo.count_active_centers_in_region(region_id).await?;
        let plan_code = format!("DP-{}-{}", scenario_suffix(scenario_id), region.region_code);

        let created = repo
            .create_plan(NewDistributionPlan {
                plan_code,
                plan_name: format!("[{}] Emergency plan for {}", scenario_id, region.name),
                region_id,
                trigger_reason: format!("Fire disaster {}", scenario_id),
                population_covered: population,
                total_food_tonnes: tonnes,
                duration_days: ration.plan_days,
                distribution_centers_count: centers,
                food_allocation: food_allocation(tonnes),
                priority_weights: priority_weights(),
            })
            .await?;

        plans.push(DistributionPlanSummary {
            plan_id: created.id,
            plan_code: created.plan_code,
            region_id,
            region_name: region.name,
            population_covered: population,
            food_allocated_tonnes: tonnes,
            distribution_points: centers.max(1),
            priority_groups: PRIORITY_WEIGHTS
                .iter()
                .map(|(group, _)| group.as_str().to_string())
                .collect(),
        });
    }

    Ok(OptimizeDistributionResult {
        plans_created: plans.len(),
        plans,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AffectedZone, DisplacementEntry, ZoneSeverity};

    fn zone(region_id: i64, population: i64, severity: ZoneSeverity) -> AffectedZone {
        AffectedZone {
            region_id,
            region_name: format!("Zone {}", region_id),
            distance_km: 1.0,
            severity,
            population: Some(population),
            wind_exposed: false,
        }
    }

    fn entry(from: i64, to: i64, count: i64) -> DisplacementEntry {
        DisplacementEntry {
            from_region_id: from,
            from_region_name: String::new(),
            to_region_id: to,
            to_region_name: String::new(),
            displaced_count: count,
        }
    }

    #[test]
    fn test_food_for_a_week() {
        let ration = RationPolicy::default();
        assert_eq!(food_tonnes(50_000, &ration), 210.0);
        assert_eq!(food_tonnes(1, &ration), 0.0);
    }

    #[test]
    fn test_allocation_split() {
        let split = food_allocation(210.0);
        assert_eq!(split["rice"], 84.0);
        assert_eq!(split["wheat"], 42.0);
        assert_eq!(split["legumes"], 31.5);
        assert_eq!(split["oil"], 10.5);
        assert_eq!(split["vegetables"], 42.0);
    }

    #[test]
    fn test_weights_cover_every_group() {
        let weights = priority_weights();
        assert_eq!(weights.len(), 5);
        assert_eq!(weights["healthcare_worker"], 0.9);
        assert!(weights.values().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn test_receivers_and_residuals() {
        let zones = FlagZonesResult {
            total_regions_scanned: 4,
            affected_zones: vec![
                zone(1, 1_000, ZoneSeverity::Critical),
                zone(2, 1_000, ZoneSeverity::Moderate),
            ],
        };
        let displacement = DisplacePopulationResult {
            total_displaced: 600,
            used_fallback_receivers: false,
            entries: vec![entry(1, 3, 400), entry(1, 4, 200), entry(2, 3, 0)],
        };

        // critical zone keeps nobody, moderate zone keeps 70%
        assert_eq!(
            receiving_population(&zones, &displacement),
            vec![(3, 400), (4, 200), (2, 700)]
        );
    }

    #[test]
    fn test_zone_that_also_receives_counted_once() {
        let zones = FlagZonesResult {
            total_regions_scanned: 2,
            affected_zones: vec![
                zone(1, 1_000, ZoneSeverity::Critical),
                zone(2, 1_000, ZoneSeverity::Moderate),
            ],
        };
        let displacement = DisplacePopulationResult {
            total_displaced: 500,
            used_fallback_receivers: true,
            entries: vec![entry(1, 2, 500)],
        };

        assert_eq!(receiving_population(&zones, &displacement), vec![(2, 500)]);
    }
}
