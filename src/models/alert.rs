use serde::{Deserialize, Serialize};

use super::string_enum;

/// Shortage alert levels, ordered by urgency so escalation can use `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Normal,
    Warning,
    Imminent,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Normal => "normal",
            AlertLevel::Warning => "warning",
            AlertLevel::Imminent => "imminent",
            AlertLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(AlertLevel::Normal),
            "warning" => Ok(AlertLevel::Warning),
            "imminent" => Ok(AlertLevel::Imminent),
            "critical" => Ok(AlertLevel::Critical),
            other => Err(format!("unknown AlertLevel {:?}", other)),
        }
    }
}

string_enum! {
    AlertStatus {
        Active => "active",
        Acknowledged => "acknowledged",
        Resolved => "resolved",
        Expired => "expired",
    }
}

string_enum! {
    AlertType {
        Inventory => "inventory",
        Production => "production",
        Import => "import",
        Distribution => "distribution",
        Weather => "weather",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub action: String,
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortageAlert {
    pub id: i64,
    pub region_id: i64,
    pub alert_code: String,
    pub alert_type: AlertType,
    pub alert_level: AlertLevel,
    pub status: AlertStatus,
    pub title: String,
    pub description: String,
    pub population_affected: Option<i64>,
    pub days_until_shortage: Option<i64>,
    pub current_days_supply: Option<f64>,
    pub confidence_score: f64,
    pub model_name: String,
    pub recommended_actions: Vec<RecommendedAction>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShortageAlert {
    pub region_id: i64,
    pub alert_code: String,
    pub alert_type: AlertType,
    pub alert_level: AlertLevel,
    pub title: String,
    pub description: String,
    pub population_affected: Option<i64>,
    pub days_until_shortage: Option<i64>,
    pub current_days_supply: Option<f64>,
    pub confidence_score: f64,
    pub model_name: String,
    pub recommended_actions: Vec<RecommendedAction>,
}
