pub mod alert;
pub mod center;
pub mod inventory;
pub mod plan;
pub mod region;
pub mod route;
pub mod scenario;
pub mod weather;

pub use alert::{AlertLevel, AlertStatus, AlertType, NewShortageAlert, RecommendedAction, ShortageAlert};
pub use center::DistributionCenter;
pub use inventory::FoodInventory;
pub use plan::{DistributionPlan, NewDistributionPlan, PlanStatus, PopulationType};
pub use region::Region;
pub use route::{
    DisruptionSeverity, DisruptionType, NewRouteDisruption, NewTransportRoute, RouteDisruption,
    OperationalStatus, TransportRoute,
};
pub use scenario::*;
pub use weather::{Directions, WeatherObservation};

/// Declares a string-backed enum with `as_str`, `Display` and `FromStr`, the
/// representation used for status columns.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} {:?}", stringify!($name), other)),
                }
            }
        }
    };
}

pub(crate) use string_enum;
