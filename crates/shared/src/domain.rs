use std::fmt;

use serde::{Deserialize, Serialize};

/// Days accepted by the prediction service for `workout_day`.
pub const WORKOUT_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Prefix of the style class attached to a rendered crowd level.
pub const CROWD_LEVEL_CLASS_PREFIX: &str = "crowd-level";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionField {
    Machine,
    WorkoutPlan,
    MuscleGroup,
}

impl OptionField {
    pub const ALL: [OptionField; 3] = [
        OptionField::Machine,
        OptionField::WorkoutPlan,
        OptionField::MuscleGroup,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OptionField::Machine => "Machine",
            OptionField::WorkoutPlan => "Workout plan",
            OptionField::MuscleGroup => "Muscle group",
        }
    }
}

/// Crowd level as classified by the server.
///
/// The server owns the vocabulary; labels outside the known three are kept
/// verbatim so they still render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
    Other(String),
}

impl CrowdLevel {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => CrowdLevel::Low,
            "medium" => CrowdLevel::Medium,
            "high" => CrowdLevel::High,
            _ => CrowdLevel::Other(label.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CrowdLevel::Other(_))
    }
}

impl fmt::Display for CrowdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrowdLevel::Low => f.write_str("Low"),
            CrowdLevel::Medium => f.write_str("Medium"),
            CrowdLevel::High => f.write_str("High"),
            CrowdLevel::Other(label) => f.write_str(label),
        }
    }
}
