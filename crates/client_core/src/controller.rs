//! Form controller: validation, prediction round trip, option loading and the
//! startup health check.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{domain::OptionField, protocol::PredictionResponse};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    api::PredictionApi,
    form::{validate_form, FormInput, ValidationError},
    state::{CrowdReport, FormOptions, FormState},
};

pub const PREDICTION_FAILED_MESSAGE: &str = "Prediction failed. Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check if the server is running.";
pub const MODEL_NOT_LOADED_WARNING: &str =
    "Warning: Model not loaded. Please ensure the model is trained.";
pub const SERVER_UNREACHABLE_WARNING: &str =
    "Warning: Unable to connect to server. Please ensure the prediction server is running.";

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    StateChanged {
        state: FormState,
        /// Set when a panel was just revealed and the host should bring it into view.
        scroll_into_view: bool,
    },
    OptionsAppended {
        field: OptionField,
        items: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A submission was already in flight.
    Ignored,
    Rejected(ValidationError),
    Predicted(CrowdReport),
    Failed(String),
}

pub struct FormController {
    api: Arc<dyn PredictionApi>,
    state: Mutex<FormState>,
    options: Mutex<FormOptions>,
    events: broadcast::Sender<FormEvent>,
}

/// Releases the loading lock when a submission future is dropped mid-request.
/// Completed submissions disarm it before rendering, since a newer submission
/// may own the loading state by the time this guard drops.
struct LoadingGuard<'a> {
    controller: &'a FormController,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(controller: &'a FormController) -> Self {
        Self {
            controller,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller.set_loading(false);
        }
    }
}

impl FormController {
    pub fn new(api: Arc<dyn PredictionApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            state: Mutex::new(FormState::Idle),
            options: Mutex::new(FormOptions::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> FormState {
        self.lock_state().clone()
    }

    pub fn options(&self) -> FormOptions {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, state: &mut FormState, next: FormState, scroll_into_view: bool) {
        *state = next.clone();
        let _ = self.events.send(FormEvent::StateChanged {
            state: next,
            scroll_into_view,
        });
    }

    pub fn display_result(&self, report: CrowdReport) {
        let mut state = self.lock_state();
        debug!(style_class = %report.style_class(), "showing prediction result");
        self.transition(&mut state, FormState::Result(report), true);
    }

    pub fn display_error(&self, message: impl Into<String>) {
        let mut state = self.lock_state();
        self.transition(&mut state, FormState::Error(message.into()), true);
    }

    /// `true` locks the submit control; `false` only unlocks it, leaving any
    /// result or error that replaced the loading state in place.
    pub fn set_loading(&self, loading: bool) {
        let mut state = self.lock_state();
        match (loading, state.is_loading()) {
            (true, false) => self.transition(&mut state, FormState::Loading, false),
            (false, true) => self.transition(&mut state, FormState::Idle, false),
            _ => {}
        }
    }

    /// Handles one form submission from the host.
    pub async fn handle_submit(&self, input: &FormInput) -> SubmitOutcome {
        let request = {
            let mut state = self.lock_state();
            if state.is_loading() {
                debug!("ignoring submit while a prediction is in flight");
                return SubmitOutcome::Ignored;
            }
            self.transition(&mut state, FormState::Idle, false);

            match validate_form(&input.to_candidate()) {
                Ok(request) => {
                    self.transition(&mut state, FormState::Loading, false);
                    request
                }
                Err(err) => {
                    debug!(%err, "form validation failed");
                    self.transition(&mut state, FormState::Error(err.to_string()), true);
                    return SubmitOutcome::Rejected(err);
                }
            }
        };

        let mut loading = LoadingGuard::new(self);
        let reply = self.api.predict(&request).await;
        loading.disarm();

        match reply {
            Ok(response) => match report_from_response(response) {
                Ok(report) => {
                    info!(
                        machine = %request.machine_name,
                        crowd_level = %report.crowd_level,
                        "prediction received"
                    );
                    self.display_result(report.clone());
                    SubmitOutcome::Predicted(report)
                }
                Err(message) => {
                    warn!(%message, "prediction service reported a failure");
                    self.display_error(message.clone());
                    SubmitOutcome::Failed(message)
                }
            },
            Err(err) => {
                error!(%err, "prediction request failed");
                self.display_error(NETWORK_ERROR_MESSAGE);
                SubmitOutcome::Failed(NETWORK_ERROR_MESSAGE.to_string())
            }
        }
    }

    /// Appends the served option lists to the selection controls. Failures are
    /// logged only; the controls stay as they were.
    pub async fn load_options(&self) {
        let response = match self.api.options().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "failed to load form options");
                return;
            }
        };
        if !response.success {
            warn!("options endpoint reported failure; leaving selections empty");
            return;
        }

        let lists = [
            (OptionField::Machine, response.machines),
            (OptionField::WorkoutPlan, response.workout_plans),
            (OptionField::MuscleGroup, response.muscle_groups),
        ];
        for (field, items) in lists {
            let Some(items) = items else {
                warn!(field = field.label(), "options response is missing a list");
                continue;
            };
            self.options
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .append(field, &items);
            let _ = self.events.send(FormEvent::OptionsAppended { field, items });
        }
    }

    /// Loads options, then checks service health and surfaces a warning when
    /// the model is not ready or the service is unreachable.
    pub async fn startup(&self) {
        self.load_options().await;

        match self.api.health().await {
            Ok(health) if !health.model_loaded => {
                warn!(status = ?health.status, "prediction model is not loaded");
                self.show_startup_warning(MODEL_NOT_LOADED_WARNING);
            }
            Ok(health) => {
                info!(status = ?health.status, timestamp = ?health.timestamp, "prediction service healthy");
            }
            Err(err) => {
                error!(%err, "health check failed");
                self.show_startup_warning(SERVER_UNREACHABLE_WARNING);
            }
        }
    }

    fn show_startup_warning(&self, message: &str) {
        let mut state = self.lock_state();
        if state.is_loading() {
            debug!(warning = message, "prediction in flight; dropping startup warning");
            return;
        }
        self.transition(&mut state, FormState::Error(message.to_string()), true);
    }
}

fn report_from_response(response: PredictionResponse) -> Result<CrowdReport, String> {
    if !response.success {
        return Err(response
            .error
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| PREDICTION_FAILED_MESSAGE.to_string()));
    }
    let Some(crowd_level) = response.crowd_level else {
        return Err(PREDICTION_FAILED_MESSAGE.to_string());
    };
    Ok(CrowdReport {
        crowd_level,
        suggestion: response.suggestion.unwrap_or_default(),
        probabilities: response.probabilities.unwrap_or_default(),
    })
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
