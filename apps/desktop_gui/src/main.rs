mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, ClientSettings};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::PredictorApp;

#[derive(Parser, Debug)]
#[command(name = "desktop_gui", about = "Gym crowd predictor desktop app")]
struct Args {
    /// Prediction API base, e.g. http://127.0.0.1:5000/api
    #[arg(long)]
    api_url: Option<String>,
    /// Per-request timeout in seconds; 0 waits indefinitely.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn apply(&self, mut settings: ClientSettings) -> ClientSettings {
        if let Some(url) = &self.api_url {
            settings.api_base_url = url.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            settings.request_timeout_secs = timeout;
        }
        settings
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();
    let settings = args.apply(load_settings());

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gym Crowd Predictor")
            .with_inner_size([560.0, 640.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Gym Crowd Predictor",
        options,
        Box::new(|_cc| Ok(Box::new(PredictorApp::new(cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run desktop app: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_settings() {
        let args = Args::parse_from(["desktop_gui", "--api-url", "http://gym.local:8080/api"]);
        let settings = args.apply(ClientSettings::default());
        assert_eq!(settings.api_base_url, "http://gym.local:8080/api");
        assert_eq!(settings.request_timeout_secs, 30);
    }
}
