use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PREDICT_PATH: &str = "/predict";
pub const OPTIONS_PATH: &str = "/options";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub machine_name: String,
    pub workout_day: String,
    pub workout_plan: String,
    pub muscle_group: String,
    pub start_hour: u8,
    pub duration_min: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Absent means failure.
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crowd_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_plans: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_groups: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Absent means the model is not ready.
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
