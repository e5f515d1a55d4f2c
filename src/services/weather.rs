//! Current-conditions lookup against the OpenWeatherMap API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::http::{HttpClient, RetryPolicy};
use crate::error::ServiceError;
use crate::geo::compass_point;
use crate::models::WeatherObservation;

const MS_TO_KMH: f64 = 3.6;

#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64)
        -> Result<WeatherObservation, ServiceError>;
}

pub struct OpenWeatherClient {
    http: HttpClient,
    api_key: Option<String>,
}

impl OpenWeatherClient {
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
impl WeatherService for OpenWeatherClient {
    async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherObservation, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::NotConfigured("OpenWeatherMap"))?;

        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("appid", api_key.to_string()),
            ("units", "metric".to_string()),
        ];

        let body: CurrentWeather = self.http.get_json("weather", &query).await?;
        body.into_observation()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    /// Numeric on success, sometimes a string on error payloads.
    #[serde(default)]
    cod: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    main: Option<MainBlock>,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    rain: Option<RainBlock>,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    description: String,
}

impl CurrentWeather {
    fn into_observation(self) -> Result<WeatherObservation, ServiceError> {
        if let Some(cod) = &self.cod {
            let code = match cod {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if code != "200" {
                return Err(ServiceError::Upstream(
                    self.message.unwrap_or_else(|| format!("cod {}", code)),
                ));
            }
        }

        let (temperature_c, humidity_pct) = match self.main {
            Some(main) => (main.temp, main.humidity),
            None => (None, None),
        };

        let (wind_speed_kmh, wind_direction) = match self.wind {
            Some(wind) => (
                wind.speed.map(|s| round1(s * MS_TO_KMH)),
                wind.deg.map(|d| compass_point(d).to_string()),
            ),
            None => (None, None),
        };

        let rainfall_mm = Some(
            self.rain
                .and_then(|r| r.one_hour.or(r.three_hours))
                .unwrap_or(0.0),
        );

        let description = self
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default();

        Ok(WeatherObservation {
            temperature_c,
            humidity_pct,
            wind_speed_kmh,
            wind_direction,
            rainfall_mm,
            description,
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
