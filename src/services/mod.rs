//! External providers the pipeline depends on.
//!
//! - **WeatherService**: current conditions at a coordinate (OpenWeatherMap)
//! - **RoutingService**: driving directions between two coordinates (Google Maps)

pub mod http;
pub mod routing;
pub mod weather;

pub use http::{HttpClient, RetryPolicy};
pub use routing::{GoogleMapsClient, RoutingService};
pub use weather::{OpenWeatherClient, WeatherService};
