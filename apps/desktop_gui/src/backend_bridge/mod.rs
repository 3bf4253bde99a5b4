//! Bridge between the egui thread and the async form controller.

pub mod commands;
pub mod runtime;
