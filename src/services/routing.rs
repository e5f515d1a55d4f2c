//! Driving directions from the Google Maps Directions API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::http::{HttpClient, RetryPolicy};
use crate::error::ServiceError;
use crate::models::Directions;

#[async_trait]
pub trait RoutingService: Send + Sync {
    async fn directions(
        &self,
        origin_lat: f64,
        origin_lon: f64,
        dest_lat: f64,
        dest_lon: f64,
    ) -> Result<Directions, ServiceError>;
}

pub struct GoogleMapsClient {
    http: HttpClient,
    api_key: Option<String>,
}

impl GoogleMapsClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout, retry)?,
            api_key,
        })
    }
}

#[async_trait]
impl RoutingService for GoogleMapsClient {
    async fn directions(
        &self,
        origin_lat: f64,
        origin_lon: f64,
        dest_lat: f64,
        dest_lon: f64,
    ) -> Result<Directions, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::NotConfigured("Google Maps"))?;

        let query = [
            ("origin", format!("{},{}", origin_lat, origin_lon)),
            ("destination", format!("{},{}", dest_lat, dest_lon)),
            ("mode", "driving".to_string()),
            ("key", api_key.to_string()),
        ];

        let body: DirectionsResponse = self.http.get_json("directions/json", &query).await?;
        body.into_directions()
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
    #[serde(default)]
    overview_polyline: Option<Polyline>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Measure,
    duration: Measure,
}

/// Meters for distance, seconds for duration.
#[derive(Debug, Deserialize)]
struct Measure {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    #[serde(default)]
    points: String,
}

impl DirectionsResponse {
    fn into_directions(self) -> Result<Directions, ServiceError> {
        match self.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => {
                return Err(ServiceError::Upstream(match self.error_message {
                    Some(msg) => format!("{}: {}", other, msg),
                    None => other.to_string(),
                }))
            }
        }

        let route = self.routes.into_iter().next().ok_or(ServiceError::NoRoute)?;

        let meters: f64 = route.legs.iter().map(|l| l.distance.value).sum();
        let seconds: f64 = route.legs.iter().map(|l| l.duration.value).sum();

        Ok(Directions {
            distance_km: round2(meters / 1000.0),
            duration_hours: round2(seconds / 3600.0),
            polyline: route.overview_polyline.map(|p| p.points).unwrap_or_default(),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
