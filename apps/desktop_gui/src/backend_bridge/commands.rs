//! Backend commands queued from UI to backend worker.

use client_core::FormInput;

pub enum BackendCommand {
    /// Load selectable options, then check service health.
    Startup,
    Submit { input: FormInput },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Startup => "startup",
            BackendCommand::Submit { .. } => "submit",
        }
    }
}
