use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    load_settings, ClientSettings, FormController, FormInput, FormOptions, FormState,
    HttpPredictionApi,
};
use shared::domain::{OptionField, WORKOUT_DAYS};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crowd", about = "Predict how busy a gym machine will be")]
struct Args {
    /// Prediction API base, e.g. http://127.0.0.1:5000/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Per-request timeout in seconds; 0 waits indefinitely.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the form fields and request a crowd-level prediction.
    Predict(PredictArgs),
    /// List the selectable machines, workout plans and muscle groups.
    Options,
    /// Run the start-up sequence: load options, then check service health.
    Startup,
}

/// Fields are taken as typed so the controller reports validation problems.
#[derive(ClapArgs, Debug)]
struct PredictArgs {
    #[arg(long, default_value = "")]
    machine: String,
    #[arg(long, default_value = "")]
    day: String,
    #[arg(long, default_value = "")]
    plan: String,
    #[arg(long, default_value = "")]
    muscle: String,
    #[arg(long, default_value = "")]
    start_hour: String,
    #[arg(long, default_value = "")]
    duration: String,
}

impl From<PredictArgs> for FormInput {
    fn from(args: PredictArgs) -> Self {
        FormInput {
            machine_name: args.machine,
            workout_day: args.day,
            workout_plan: args.plan,
            muscle_group: args.muscle,
            start_hour: args.start_hour,
            duration_min: args.duration,
        }
    }
}

fn resolve_settings(args: &Args) -> ClientSettings {
    let mut settings = load_settings();
    if let Some(url) = &args.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        settings.request_timeout_secs = timeout;
    }
    settings
}

fn render_state(state: &FormState) -> String {
    match state {
        FormState::Idle => "No prediction yet.".to_string(),
        FormState::Loading => "Predicting...".to_string(),
        FormState::Result(report) => {
            let mut out = format!(
                "Crowd level: {}\nSuggestion: {}",
                report.crowd_level, report.suggestion
            );
            if !report.probabilities.is_empty() {
                out.push_str("\nProbabilities:");
                for (label, probability) in &report.probabilities {
                    out.push_str(&format!("\n  {label:<8} {:>5.1}%", probability * 100.0));
                }
            }
            out
        }
        FormState::Error(message) => format!("Error: {message}"),
    }
}

fn render_options(options: &FormOptions) -> String {
    let mut out = String::new();
    for field in OptionField::ALL {
        out.push_str(&format!("{}:\n", field.label()));
        for entry in options.entries(field) {
            out.push_str(&format!("  {entry}\n"));
        }
    }
    out.push_str("Workout day:\n");
    for day in WORKOUT_DAYS {
        out.push_str(&format!("  {day}\n"));
    }
    out
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    let settings = resolve_settings(&args);
    let api = HttpPredictionApi::from_settings(&settings)
        .with_context(|| format!("cannot use API base '{}'", settings.api_base_url))?;
    debug!(api = %api.base_url(), "using prediction api");
    let controller = FormController::new(Arc::new(api));

    match args.command {
        Command::Predict(fields) => {
            controller.handle_submit(&fields.into()).await;
        }
        Command::Options => {
            controller.load_options().await;
            print!("{}", render_options(&controller.options()));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Startup => {
            controller.startup().await;
            print!("{}", render_options(&controller.options()));
            if controller.state() == FormState::Idle {
                println!("Prediction service is healthy and the model is loaded.");
            }
        }
    }

    let state = controller.state();
    if state != FormState::Idle {
        println!("{}", render_state(&state));
    }
    Ok(if state.error_message().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use client_core::CrowdReport;

    use super::*;

    #[test]
    fn renders_result_with_probabilities() {
        let state = FormState::Result(CrowdReport {
            crowd_level: "High".to_string(),
            suggestion: "Busy - return after 30-45 minutes".to_string(),
            probabilities: BTreeMap::from([("High".to_string(), 0.75), ("Low".to_string(), 0.25)]),
        });
        let text = render_state(&state);
        assert!(text.starts_with("Crowd level: High\nSuggestion: Busy"));
        assert!(text.contains("High      75.0%"));
        assert!(text.contains("Low       25.0%"));
    }

    #[test]
    fn renders_error_state() {
        let state = FormState::Error("Machine name is required.".to_string());
        assert_eq!(render_state(&state), "Error: Machine name is required.");
    }

    #[test]
    fn predict_args_map_onto_form_fields() {
        let args = Args::parse_from([
            "crowd",
            "predict",
            "--machine",
            "Treadmill",
            "--day",
            "Monday",
            "--plan",
            "Cardio",
            "--muscle",
            "Legs",
            "--start-hour",
            "18",
            "--duration",
            "30",
        ]);
        let Command::Predict(fields) = args.command else {
            panic!("expected predict command");
        };
        let input = FormInput::from(fields);
        assert_eq!(input.machine_name, "Treadmill");
        assert_eq!(input.start_hour, "18");
        assert_eq!(input.duration_min, "30");
    }

    #[test]
    fn cli_flags_override_loaded_settings() {
        let args = Args::parse_from([
            "crowd",
            "--api-url",
            "http://gym.local/api",
            "--timeout-secs",
            "0",
            "startup",
        ]);
        let settings = resolve_settings(&args);
        assert_eq!(settings.api_base_url, "http://gym.local/api");
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn options_listing_includes_fixed_weekdays() {
        let mut options = FormOptions::default();
        options.append(OptionField::Machine, &["Leg Press".to_string()]);
        let text = render_options(&options);
        assert!(text.contains("Machine:\n  Leg Press\n"));
        assert!(text.contains("Workout day:\n  Monday\n"));
        assert!(text.ends_with("  Sunday\n"));
    }
}
