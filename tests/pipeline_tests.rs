//! End-to-end runs of the fire disaster pipeline against the in-memory
//! repository and deterministic provider stand-ins.

mod common;

use common::*;
use harvestguard::models::{
    AlertLevel, DisruptionSeverity, DisruptionType, FireDisasterRequest, FireWeatherRisk,
    NewRouteDisruption, OperationalStatus, PlanStatus, WeatherObservation, ZoneSeverity,
};
use harvestguard::pipeline::displacement::displaced_count;
use harvestguard::repository::{FoodSecurityRepository, MemoryRepository};
use harvestguard::{Config, PipelineStage};
use std::collections::HashSet;

fn request(latitude: f64, longitude: f64, radius_km: f64, intensity: f64, displacement: f64) -> FireDisasterRequest {
    FireDisasterRequest {
        latitude,
        longitude,
        radius_km,
        fire_intensity: intensity,
        displacement_pct: displacement,
    }
}

fn two_region_world() -> MemoryRepository {
    let repo = MemoryRepository::new();
    repo.insert_region(region(1, 10.0, 20.0, Some(100_000)));
    repo.insert_region(region(2, 11.8, 20.0, Some(50_000)));
    repo
}

#[tokio::test]
async fn test_epicenter_region_displaces_into_single_safe_region() {
    let h = harness(two_region_world(), StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert_eq!(resp.zones.total_regions_scanned, 2);
    assert_eq!(resp.zones.affected_zones.len(), 1);
    let zone = &resp.zones.affected_zones[0];
    assert_eq!(zone.region_id, 1);
    assert_eq!(zone.severity, ZoneSeverity::Critical);
    assert_eq!(zone.distance_km, 0.0);

    assert_eq!(resp.displacement.total_displaced, 50_000);
    assert!(!resp.displacement.used_fallback_receivers);
    assert_eq!(resp.displacement.entries.len(), 1);
    assert_eq!(resp.displacement.entries[0].to_region_id, 2);
    assert_eq!(resp.displacement.entries[0].displaced_count, 50_000);

    let source = &resp.supply.entries[0];
    assert_eq!(source.region_id, 1);
    assert_eq!(source.effective_population, 50_000);
    assert_eq!(source.demand_multiplier, 0.5);
    let receiver = &resp.supply.entries[1];
    assert_eq!(receiver.region_id, 2);
    assert_eq!(receiver.effective_population, 100_000);
    assert_eq!(receiver.demand_multiplier, 2.0);

    assert_eq!(resp.alerts.alerts_generated, 1);
    assert_eq!(resp.alerts.alerts[0].level, AlertLevel::Critical);

    // critical zones keep nobody behind, so only the receiver gets a plan
    assert_eq!(resp.distribution.plans_created, 1);
    let plan = &resp.distribution.plans[0];
    assert_eq!(plan.region_id, 2);
    assert_eq!(plan.population_covered, 50_000);
    assert_eq!(plan.food_allocated_tonnes, 210.0);
    assert_eq!(plan.distribution_points, 1);
    assert!(plan.plan_code.starts_with("DP-"));
    assert!(plan.plan_code.ends_with("-R02"));

    assert_eq!(resp.summary.regions_affected, 1);
    assert_eq!(resp.summary.population_in_affected_zones, 100_000);
    assert_eq!(resp.summary.total_displaced, 50_000);
    assert_eq!(resp.summary.scenario_id, resp.scenario_id);
    assert!(resp.completed_at >= resp.started_at);
}

#[tokio::test]
async fn test_no_inventory_gives_no_estimate() {
    let h = harness(two_region_world(), StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert!(resp
        .supply
        .entries
        .iter()
        .all(|e| e.estimated_days_of_supply.is_none()));

    let alert = &h.repo.alerts()[0];
    assert_eq!(alert.current_days_supply, None);
    assert_eq!(alert.days_until_shortage, None);
}

#[tokio::test]
async fn test_zero_population_receiver_keeps_unit_multiplier() {
    let repo = MemoryRepository::new();
    repo.insert_region(region(1, 10.0, 20.0, Some(100_000)));
    repo.insert_region(region(2, 11.8, 20.0, Some(0)));
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    let receiver = resp.supply.entries.iter().find(|e| e.region_id == 2).unwrap();
    assert_eq!(receiver.original_population, 0);
    assert_eq!(receiver.effective_population, 50_000);
    assert_eq!(receiver.demand_multiplier, 1.0);
}

#[tokio::test]
async fn test_downwind_region_escalated() {
    let world = || {
        let repo = MemoryRepository::new();
        repo.insert_region(region(1, 10.2, 20.0, Some(10_000)));
        repo.insert_region(region(2, 12.0, 20.0, Some(10_000)));
        repo
    };
    let req = request(10.0, 20.0, 50.0, 0.5, 0.4);

    let calm = harness(world(), StubWeather::calm(), StubRouting::ok());
    let resp = calm.service.simulate(&req).await.unwrap();
    assert_eq!(resp.zones.affected_zones[0].severity, ZoneSeverity::Moderate);
    assert!(!resp.zones.affected_zones[0].wind_exposed);

    let northerly = StubWeather::with(WeatherObservation {
        wind_direction: Some("N".into()),
        ..WeatherObservation::default()
    });
    let windy = harness(world(), northerly, StubRouting::ok());
    let resp = windy.service.simulate(&req).await.unwrap();
    assert_eq!(resp.zones.affected_zones[0].severity, ZoneSeverity::High);
    assert!(resp.zones.affected_zones[0].wind_exposed);
}

#[tokio::test]
async fn test_hot_dry_windy_weather_is_extreme() {
    let weather = StubWeather::with(WeatherObservation {
        temperature_c: Some(36.0),
        humidity_pct: Some(15.0),
        wind_speed_kmh: Some(45.0),
        wind_direction: Some("SW".into()),
        rainfall_mm: Some(0.0),
        description: "haze".into(),
    });
    let h = harness(two_region_world(), weather, StubRouting::ok());

    let resp = h
        .service
        .simulate(&FireDisasterRequest::new(10.0, 20.0))
        .await
        .unwrap();

    assert_eq!(resp.weather.risk_score, 9);
    assert_eq!(resp.weather.fire_weather_risk, FireWeatherRisk::Extreme);
    assert!(resp.weather.is_drought);
    assert!(!resp.weather.is_heatwave);
    assert_eq!(resp.summary.fire_weather_risk, FireWeatherRisk::Extreme);
}

#[tokio::test]
async fn test_no_blocked_routes_skips_routing_lookups() {
    let h = harness(two_region_world(), StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert_eq!(resp.reroute.blocked_routes, 0);
    assert_eq!(resp.reroute.alternative_routes_created, 0);
    assert!(resp.reroute.alternatives.is_empty());
    assert_eq!(h.routing.calls(), 0);
}

#[tokio::test]
async fn test_blocked_route_gets_alternate_between_safe_centers() {
    let h = harness(epicenter_world(), StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert_eq!(resp.disruptions.routes_scanned, 1);
    assert_eq!(resp.disruptions.disruptions_created, 1);
    let record = &resp.disruptions.disruptions[0];
    assert_eq!(record.route_id, 21);
    assert_eq!(record.severity, ZoneSeverity::Critical);
    assert_eq!(record.db_severity, DisruptionSeverity::Critical);
    assert_eq!(record.capacity_reduction_percentage, 100.0);
    assert_eq!(record.status, OperationalStatus::Blocked);
    assert_eq!(h.repo.route(21).unwrap().operational_status, OperationalStatus::Blocked);

    let stored = &h.repo.disruptions()[0];
    assert_eq!(stored.disruption_type, DisruptionType::Weather);
    assert_eq!(stored.region_id, Some(1));
    assert_eq!(
        stored.title,
        format!("[{}] Fire disruption on Route 1-2", resp.scenario_id)
    );

    // origin side resolves to the eastern center (closer than the northern one)
    assert_eq!(resp.reroute.blocked_routes, 1);
    assert_eq!(resp.reroute.alternative_routes_created, 1);
    assert_eq!(h.routing.calls(), 1);
    let alt = &resp.reroute.alternatives[0];
    assert_eq!(alt.origin, "Center 13");
    assert_eq!(alt.destination, "Center 12");
    assert_eq!(alt.distance_km, 250.0);
    assert_eq!(alt.duration_hours, 4.5);
    assert_eq!(
        alt.route_code,
        format!("ALT-{}-DC13-DC12", &resp.scenario_id[resp.scenario_id.len() - 6..])
    );

    let created = h.repo.route(alt.route_id).unwrap();
    assert_eq!(created.name, "[ALT] Center 13 -> Center 12");
    assert_eq!(created.operational_status, OperationalStatus::Operational);
    assert_eq!(created.origin_center_id, Some(13));
    assert_eq!(created.destination_center_id, Some(12));
    assert_eq!(created.path_polyline.as_deref(), Some("_p~iF~ps|U"));
}

#[tokio::test]
async fn test_routing_failure_is_not_fatal() {
    let h = harness(epicenter_world(), StubWeather::calm(), StubRouting::failing());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert_eq!(h.routing.calls(), 1);
    assert_eq!(resp.reroute.blocked_routes, 1);
    assert_eq!(resp.reroute.alternative_routes_created, 0);
    assert!(resp.distribution.plans_created > 0);
}

#[tokio::test]
async fn test_weather_failure_aborts_before_any_writes() {
    let h = harness(epicenter_world(), StubWeather::failing(), StubRouting::ok());

    let err = h
        .service
        .simulate(&FireDisasterRequest::new(10.0, 20.0))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::WeatherCheck));
    assert!(!err.is_client_error());
    assert!(h.repo.disruptions().is_empty());
    assert!(h.repo.alerts().is_empty());
    assert!(h.repo.plans().is_empty());
}

#[tokio::test]
async fn test_invalid_request_rejected_up_front() {
    let h = harness(epicenter_world(), StubWeather::calm(), StubRouting::ok());

    let err = h
        .service
        .simulate(&request(10.0, 20.0, 1_000.0, 0.7, 0.4))
        .await
        .unwrap_err();

    assert!(err.is_client_error());
    assert_eq!(err.stage(), None);
    assert!(err.to_string().contains("radius_km"));
    assert!(h.repo.alerts().is_empty());
}

#[tokio::test]
async fn test_low_supply_raises_moderate_zone_to_critical() {
    let repo = MemoryRepository::new();
    repo.insert_region(region(1, 10.0, 20.0, Some(1_000)));
    repo.insert_region(region(2, 12.0, 20.0, Some(1_000)));
    repo.insert_inventory(inventory(31, 1, 50.0, Some(10.0)));
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    // intensity 0.2 at the epicenter scores 0.2: moderate
    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 0.2, 0.0))
        .await
        .unwrap();

    assert_eq!(resp.zones.affected_zones[0].severity, ZoneSeverity::Moderate);
    assert_eq!(resp.supply.days_for(1), Some(5.0));
    assert_eq!(resp.alerts.alerts[0].level, AlertLevel::Critical);

    let alert = &h.repo.alerts()[0];
    assert_eq!(alert.days_until_shortage, Some(5));
    assert_eq!(alert.confidence_score, 0.85);
    assert_eq!(alert.model_name, "fire_disaster_pipeline_v1");
    assert_eq!(alert.recommended_actions.len(), 3);
    assert!(alert.alert_code.starts_with("SA-"));
}

#[tokio::test]
async fn test_alert_levels_never_below_zone_severity() {
    let repo = MemoryRepository::new();
    for (i, lon) in [20.0, 20.1, 20.2, 20.3].iter().enumerate() {
        let id = i as i64 + 1;
        repo.insert_region(region(id, 10.0, *lon, Some(5_000)));
        repo.insert_inventory(inventory(100 + id, id, 1_000.0, Some(1.0)));
    }
    repo.insert_region(region(9, 14.0, 20.0, Some(5_000)));
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 60.0, 0.9, 0.4))
        .await
        .unwrap();

    assert_eq!(resp.alerts.alerts.len(), resp.zones.affected_zones.len());
    for alert in &resp.alerts.alerts {
        let severity = resp.zones.severity_of(alert.region_id).unwrap();
        assert!(alert.level >= severity.base_alert_level());
    }
}

#[tokio::test]
async fn test_displacement_conserved_per_zone() {
    let repo = MemoryRepository::new();
    repo.insert_region(region(1, 0.0, 0.0, Some(80_001)));
    repo.insert_region(region(2, 0.0, 0.3, Some(40_003)));
    repo.insert_region(region(3, 0.4, 0.0, Some(12_345)));
    repo.insert_region(region(4, 0.0, 2.0, Some(1_000)));
    repo.insert_region(region(5, 2.0, 0.0, Some(1_000)));
    repo.insert_region(region(6, -2.0, -2.0, Some(1_000)));
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    let req = request(0.0, 0.0, 100.0, 0.8, 0.6);
    let resp = h.service.simulate(&req).await.unwrap();

    assert_eq!(resp.zones.affected_zones.len(), 3);
    let mut total = 0;
    for zone in &resp.zones.affected_zones {
        let sent: i64 = resp
            .displacement
            .entries
            .iter()
            .filter(|e| e.from_region_id == zone.region_id)
            .map(|e| e.displaced_count)
            .sum();
        assert_eq!(sent, displaced_count(zone, req.displacement_pct));
        total += sent;
    }
    assert_eq!(total, resp.displacement.total_displaced);
    assert!(resp.displacement.entries.iter().all(|e| e.displaced_count > 0));
    assert!(resp
        .supply
        .entries
        .iter()
        .all(|e| e.effective_population >= 0 && e.demand_multiplier >= 0.0));
}

#[tokio::test]
async fn test_fallback_receivers_when_every_region_burns() {
    let repo = MemoryRepository::new();
    for (i, lon) in [0.0, 0.3, 0.6, 0.9].iter().enumerate() {
        repo.insert_region(region(i as i64 + 1, 0.0, *lon, Some(10_000)));
    }
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(0.0, 0.0, 200.0, 0.5, 0.5))
        .await
        .unwrap();

    assert_eq!(resp.zones.affected_zones.len(), 4);
    assert!(resp.displacement.used_fallback_receivers);

    // the three zones farthest from the fire receive, the epicenter does not
    assert!(resp
        .displacement
        .entries
        .iter()
        .all(|e| [2, 3, 4].contains(&e.to_region_id)));

    // a receiving zone keeps its own closest share
    assert!(resp
        .displacement
        .entries
        .iter()
        .any(|e| e.from_region_id == 2 && e.to_region_id == 2));

    let expected: i64 = resp
        .zones
        .affected_zones
        .iter()
        .map(|z| displaced_count(z, 0.5))
        .sum();
    let moved: i64 = resp.displacement.entries.iter().map(|e| e.displaced_count).sum();
    assert!(expected > 0);
    assert_eq!(resp.displacement.total_displaced, expected);
    assert_eq!(moved, expected);

    let plan_regions: Vec<i64> = resp.distribution.plans.iter().map(|p| p.region_id).collect();
    let unique: HashSet<i64> = plan_regions.iter().copied().collect();
    assert_eq!(plan_regions.len(), unique.len());

    // receivers are fed from their arrivals only, never arrivals plus residual
    for plan in &resp.distribution.plans {
        let arrivals: i64 = resp
            .displacement
            .entries
            .iter()
            .filter(|e| e.to_region_id == plan.region_id)
            .map(|e| e.displaced_count)
            .sum();
        if arrivals > 0 {
            assert_eq!(plan.population_covered, arrivals);
        }
    }

    let supply_regions: HashSet<i64> = resp.supply.entries.iter().map(|e| e.region_id).collect();
    assert_eq!(supply_regions.len(), resp.supply.entries.len());
    assert!(resp.supply.entries.iter().all(|e| e.effective_population >= 0));
}

#[tokio::test]
async fn test_lone_burning_region_shelters_its_own_evacuees() {
    let repo = MemoryRepository::new();
    repo.insert_region(region(1, 10.0, 20.0, Some(100_000)));
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert!(resp.displacement.used_fallback_receivers);
    assert_eq!(resp.displacement.total_displaced, 50_000);
    assert_eq!(resp.displacement.entries.len(), 1);
    let entry = &resp.displacement.entries[0];
    assert_eq!((entry.from_region_id, entry.to_region_id), (1, 1));
    assert_eq!(entry.displaced_count, 50_000);

    let supply = &resp.supply.entries[0];
    assert_eq!(supply.effective_population, 100_000);
    assert_eq!(supply.demand_multiplier, 1.0);

    assert_eq!(resp.distribution.plans_created, 1);
    let plan = &resp.distribution.plans[0];
    assert_eq!(plan.region_id, 1);
    assert_eq!(plan.population_covered, 50_000);
    assert_eq!(plan.food_allocated_tonnes, 210.0);
}

#[tokio::test]
async fn test_parallel_blocked_routes_share_one_alternate() {
    let repo = epicenter_world();
    repo.insert_route(route(22, 1, 2));
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert_eq!(resp.disruptions.disruptions_created, 2);
    assert_eq!(resp.reroute.blocked_routes, 2);
    assert_eq!(resp.reroute.alternative_routes_created, 1);
    assert_eq!(h.routing.calls(), 1);
}

#[tokio::test]
async fn test_single_safe_center_makes_no_alternate() {
    let repo = MemoryRepository::new();
    let burning = region(1, 10.0, 20.0, Some(100_000));
    let north = region(2, 11.8, 20.0, Some(50_000));
    repo.insert_center(center(11, &burning));
    repo.insert_center(center(12, &north));
    repo.insert_region(burning);
    repo.insert_region(north);
    repo.insert_route(route(21, 1, 2));
    let h = harness(repo, StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    // both ends resolve to the northern center
    assert_eq!(resp.reroute.blocked_routes, 1);
    assert_eq!(resp.reroute.alternative_routes_created, 0);
    assert_eq!(h.routing.calls(), 0);
}

#[tokio::test]
async fn test_rerun_duplicates_alerts_and_plans() {
    let h = harness(epicenter_world(), StubWeather::calm(), StubRouting::ok());
    let req = request(10.0, 20.0, 50.0, 1.0, 0.5);

    let first = h.service.simulate(&req).await.unwrap();
    let second = h.service.simulate(&req).await.unwrap();

    assert_ne!(first.scenario_id, second.scenario_id);
    assert_eq!(h.repo.alerts().len(), 2);
    assert_eq!(
        h.repo.plans().len(),
        first.distribution.plans_created + second.distribution.plans_created
    );
    assert!(h.repo.plans().iter().all(|p| p.status == PlanStatus::Draft));

    // the road stays blocked, and its alternate already exists
    assert_eq!(second.disruptions.disruptions_created, 0);
    assert_eq!(second.reroute.blocked_routes, 1);
    assert_eq!(second.reroute.alternative_routes_created, 0);
    assert_eq!(h.routing.calls(), 1);
}

#[tokio::test]
async fn test_dedupe_skips_existing_alerts_and_disruptions() {
    let config = Config {
        dedupe_side_effects: true,
        ..Config::default()
    };
    let h = harness_with_config(epicenter_world(), StubWeather::calm(), StubRouting::ok(), config);

    h.repo
        .create_disruption(NewRouteDisruption {
            route_id: 21,
            region_id: Some(1),
            disruption_type: DisruptionType::Infrastructure,
            severity: DisruptionSeverity::Low,
            title: "Bridge works".into(),
            description: String::new(),
            capacity_reduction_percentage: 10.0,
        })
        .await
        .unwrap();

    let req = request(10.0, 20.0, 50.0, 1.0, 0.5);
    let first = h.service.simulate(&req).await.unwrap();
    assert_eq!(first.disruptions.routes_scanned, 1);
    assert_eq!(first.disruptions.disruptions_created, 0);
    assert_eq!(h.repo.route(21).unwrap().operational_status, OperationalStatus::Operational);
    assert_eq!(first.alerts.alerts_generated, 1);

    let second = h.service.simulate(&req).await.unwrap();
    assert_eq!(second.alerts.alerts_generated, 0);
    assert_eq!(h.repo.alerts().len(), 1);
}

#[tokio::test]
async fn test_fire_far_from_everything_changes_nothing() {
    let h = harness(epicenter_world(), StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(-40.0, -60.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();

    assert_eq!(resp.zones.total_regions_scanned, 3);
    assert!(resp.zones.affected_zones.is_empty());
    assert_eq!(resp.disruptions.disruptions_created, 0);
    assert_eq!(resp.displacement.total_displaced, 0);
    assert_eq!(resp.supply.regions_updated, 0);
    assert_eq!(resp.alerts.alerts_generated, 0);
    assert_eq!(resp.distribution.plans_created, 0);
    assert_eq!(h.routing.calls(), 0);
}

#[tokio::test]
async fn test_response_serializes_lowercase_labels() {
    let h = harness(two_region_world(), StubWeather::calm(), StubRouting::ok());

    let resp = h
        .service
        .simulate(&request(10.0, 20.0, 50.0, 1.0, 0.5))
        .await
        .unwrap();
    let json = serde_json::to_value(&resp).unwrap();

    assert_eq!(json["summary"]["fire_weather_risk"], "low");
    assert_eq!(json["zones"]["affected_zones"][0]["severity"], "critical");
    assert_eq!(json["alerts"]["alerts"][0]["level"], "critical");
    assert_eq!(json["fire_location"]["latitude"], 10.0);
}
