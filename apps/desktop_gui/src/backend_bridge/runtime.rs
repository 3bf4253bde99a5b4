//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{ClientSettings, FormController, HttpPredictionApi};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let api = match HttpPredictionApi::from_settings(&settings) {
                Ok(api) => api,
                Err(err) => {
                    tracing::error!(%err, "invalid prediction api settings");
                    let _ = ui_tx.try_send(UiEvent::BackendFailed(err.to_string()));
                    return;
                }
            };
            tracing::info!(api = %api.base_url(), "backend worker ready");
            let controller = FormController::new(Arc::new(api));

            let mut events = controller.subscribe_events();
            let event_tx = ui_tx.clone();
            thread::spawn(move || loop {
                match events.blocking_recv() {
                    Ok(event) => {
                        if event_tx.send(UiEvent::Form(event)).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "ui lagged behind form events");
                    }
                    Err(RecvError::Closed) => break,
                }
            });

            while let Ok(cmd) = cmd_rx.recv() {
                let controller = controller.clone();
                match cmd {
                    BackendCommand::Startup => {
                        tokio::spawn(async move { controller.startup().await });
                    }
                    BackendCommand::Submit { input } => {
                        tokio::spawn(async move {
                            let outcome = controller.handle_submit(&input).await;
                            tracing::debug!(?outcome, "submit finished");
                        });
                    }
                }
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}
