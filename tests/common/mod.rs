//! Shared fixtures: seeded regions/routes/centers and deterministic stand-ins
//! for the weather and routing providers.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use harvestguard::models::{
    Directions, DistributionCenter, FoodInventory, OperationalStatus, Region, TransportRoute,
    WeatherObservation,
};
use harvestguard::repository::MemoryRepository;
use harvestguard::services::{RoutingService, WeatherService};
use harvestguard::{Config, FireDisasterService, ServiceError};

pub fn region(id: i64, latitude: f64, longitude: f64, population: Option<i64>) -> Region {
    Region {
        id,
        region_code: format!("R{:02}", id),
        name: format!("Region {}", id),
        latitude,
        longitude,
        population,
        is_active: true,
    }
}

pub fn route(id: i64, origin: i64, destination: i64) -> TransportRoute {
    TransportRoute {
        id,
        route_code: format!("RT-{}", id),
        name: format!("Route {}-{}", origin, destination),
        origin_region_id: Some(origin),
        destination_region_id: Some(destination),
        origin_center_id: None,
        destination_center_id: None,
        distance_km: Some(100.0),
        estimated_time_hours: Some(2.0),
        path_polyline: None,
        operational_status: OperationalStatus::Operational,
        is_active: true,
    }
}

pub fn center(id: i64, region: &Region) -> DistributionCenter {
    DistributionCenter {
        id,
        center_code: format!("DC{}", id),
        name: format!("Center {}", id),
        region_id: region.id,
        latitude: region.latitude,
        longitude: region.longitude,
        operational_status: OperationalStatus::Operational,
        is_active: true,
    }
}

pub fn inventory(id: i64, region_id: i64, quantity: f64, rate: Option<f64>) -> FoodInventory {
    FoodInventory {
        id,
        region_id,
        category_id: 1,
        recorded_at: Utc::now(),
        quantity_tonnes: quantity,
        consumption_rate_tonnes_per_day: rate,
        days_of_supply: None,
    }
}

/// Returns the same observation, or fails, every time.
pub struct StubWeather {
    observation: Option<WeatherObservation>,
}

impl StubWeather {
    pub fn calm() -> Self {
        Self::with(WeatherObservation {
            temperature_c: Some(22.0),
            humidity_pct: Some(60.0),
            wind_speed_kmh: Some(5.0),
            wind_direction: None,
            rainfall_mm: Some(0.0),
            description: "clear sky".into(),
        })
    }

    pub fn with(observation: WeatherObservation) -> Self {
        Self {
            observation: Some(observation),
        }
    }

    pub fn failing() -> Self {
        Self { observation: None }
    }
}

#[async_trait]
impl WeatherService for StubWeather {
    async fn current(&self, _lat: f64, _lon: f64) -> Result<WeatherObservation, ServiceError> {
        self.observation.clone().ok_or(ServiceError::Timeout)
    }
}

/// Counts lookups and records the endpoints it was asked about.
pub struct StubRouting {
    calls: AtomicUsize,
    fail: bool,
    requests: Mutex<Vec<(f64, f64, f64, f64)>>,
}

impl StubRouting {
    pub fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingService for StubRouting {
    async fn directions(
        &self,
        origin_lat: f64,
        origin_lon: f64,
        dest_lat: f64,
        dest_lon: f64,
    ) -> Result<Directions, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .push((origin_lat, origin_lon, dest_lat, dest_lon));

        if self.fail {
            return Err(ServiceError::NoRoute);
        }
        Ok(Directions {
            distance_km: 250.0,
            duration_hours: 4.5,
            polyline: "_p~iF~ps|U".into(),
        })
    }
}

pub struct Harness {
    pub repo: Arc<MemoryRepository>,
    pub routing: Arc<StubRouting>,
    pub service: FireDisasterService,
}

pub fn harness(repo: MemoryRepository, weather: StubWeather, routing: StubRouting) -> Harness {
    harness_with_config(repo, weather, routing, Config::default())
}

pub fn harness_with_config(
    repo: MemoryRepository,
    weather: StubWeather,
    routing: StubRouting,
    config: Config,
) -> Harness {
    let repo = Arc::new(repo);
    let routing = Arc::new(routing);
    let service = FireDisasterService::new(
        repo.clone(),
        Arc::new(weather),
        routing.clone(),
        config,
    );
    Harness {
        repo,
        routing,
        service,
    }
}

/// Fire at (10, 20): one region at the epicenter, one ~200 km north, and one
/// ~164 km east, each with a distribution center, plus a road from the
/// epicenter region to the northern one.
pub fn epicenter_world() -> MemoryRepository {
    let repo = MemoryRepository::new();

    let burning = region(1, 10.0, 20.0, Some(100_000));
    let north = region(2, 11.8, 20.0, Some(50_000));
    let east = region(3, 10.0, 21.5, Some(20_000));

    repo.insert_center(center(11, &burning));
    repo.insert_center(center(12, &north));
    repo.insert_center(center(13, &east));
    repo.insert_region(burning);
    repo.insert_region(north);
    repo.insert_region(east);
    repo.insert_route(route(21, 1, 2));

    repo
}
