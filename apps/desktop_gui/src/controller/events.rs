//! UI/backend events for the desktop GUI.

use client_core::FormEvent;

pub enum UiEvent {
    Form(FormEvent),
    /// The backend worker could not start; nothing will be processed.
    BackendFailed(String),
}

pub fn classify_backend_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("invalid api base url") {
        format!("Prediction server address is invalid; fix it and relaunch. ({message})")
    } else if lower.contains("failed to build runtime") {
        "Backend worker startup failure; verify local app environment and relaunch.".to_string()
    } else {
        format!("Backend error: {message}")
    }
}
