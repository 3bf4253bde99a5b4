//! Visible state of the prediction form.

use std::collections::BTreeMap;

use shared::domain::{CrowdLevel, OptionField, CROWD_LEVEL_CLASS_PREFIX};

#[derive(Debug, Clone, PartialEq)]
pub struct CrowdReport {
    pub crowd_level: String,
    pub suggestion: String,
    pub probabilities: BTreeMap<String, f64>,
}

impl CrowdReport {
    pub fn level(&self) -> CrowdLevel {
        CrowdLevel::from_label(&self.crowd_level)
    }

    /// Style class for the crowd-level badge, e.g. `crowd-level High`.
    pub fn style_class(&self) -> String {
        format!("{CROWD_LEVEL_CLASS_PREFIX} {}", self.crowd_level)
    }
}

/// At most one of the result and error panels is visible, and the submit
/// control is locked only while a request is in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormState {
    #[default]
    Idle,
    Loading,
    Result(CrowdReport),
    Error(String),
}

impl FormState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FormState::Loading)
    }

    pub fn submit_enabled(&self) -> bool {
        !self.is_loading()
    }

    pub fn shows_spinner(&self) -> bool {
        self.is_loading()
    }

    pub fn result(&self) -> Option<&CrowdReport> {
        match self {
            FormState::Result(report) => Some(report),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FormState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Entries of the three option-backed selection controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormOptions {
    pub machines: Vec<String>,
    pub workout_plans: Vec<String>,
    pub muscle_groups: Vec<String>,
}

impl FormOptions {
    pub fn entries(&self, field: OptionField) -> &[String] {
        match field {
            OptionField::Machine => &self.machines,
            OptionField::WorkoutPlan => &self.workout_plans,
            OptionField::MuscleGroup => &self.muscle_groups,
        }
    }

    pub fn append(&mut self, field: OptionField, items: &[String]) {
        let target = match field {
            OptionField::Machine => &mut self.machines,
            OptionField::WorkoutPlan => &mut self.workout_plans,
            OptionField::MuscleGroup => &mut self.muscle_groups,
        };
        target.extend(items.iter().cloned());
    }
}
