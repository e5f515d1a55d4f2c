use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::string_enum;

string_enum! {
    PlanStatus {
        Draft => "draft",
        Approved => "approved",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

string_enum! {
    PopulationType {
        Elderly => "elderly",
        Children => "children",
        Pregnant => "pregnant",
        HealthcareWorker => "healthcare_worker",
        General => "general",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPlan {
    pub id: i64,
    pub plan_code: String,
    pub plan_name: String,
    pub region_id: i64,
    pub trigger_reason: String,
    pub status: PlanStatus,
    pub population_covered: i64,
    pub total_food_tonnes: f64,
    pub duration_days: u32,
    pub distribution_centers_count: i64,
    /// food item -> tonnes
    pub food_allocation: BTreeMap<String, f64>,
    /// population type -> weight in [0, 1]
    pub priority_weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDistributionPlan {
    pub plan_code: String,
    pub plan_name: String,
    pub region_id: i64,
    pub trigger_reason: String,
    pub population_covered: i64,
    pub total_food_tonnes: f64,
    pub duration_days: u32,
    pub distribution_centers_count: i64,
    pub food_allocation: BTreeMap<String, f64>,
    pub priority_weights: BTreeMap<String, f64>,
}
