//! UI layer for desktop GUI: the prediction form window.

pub mod app;

pub use app::PredictorApp;
