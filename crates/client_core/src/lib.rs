//! Client side of the gym crowd predictor: HTTP access to the prediction
//! service and the form controller that front-ends drive.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod state;

pub use api::{HttpPredictionApi, PredictionApi};
pub use config::{load_settings, ClientSettings};
pub use controller::{FormController, FormEvent, SubmitOutcome};
pub use error::ApiClientError;
pub use form::{FormInput, ValidationError};
pub use state::{CrowdReport, FormOptions, FormState};
