//! Prediction form window.

use client_core::{CrowdReport, FormEvent, FormInput, FormOptions, FormState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{CrowdLevel, OptionField, WORKOUT_DAYS};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{classify_backend_failure, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub struct PredictorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    input: FormInput,
    options: FormOptions,
    form_state: FormState,
    scroll_pending: bool,
    status: String,
}

pub fn crowd_level_color(level: &CrowdLevel) -> Option<egui::Color32> {
    match level {
        CrowdLevel::Low => Some(egui::Color32::from_rgb(46, 160, 67)),
        CrowdLevel::Medium => Some(egui::Color32::from_rgb(219, 154, 4)),
        CrowdLevel::High => Some(egui::Color32::from_rgb(207, 34, 46)),
        CrowdLevel::Other(_) => None,
    }
}

impl PredictorApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut status = "Loading options...".to_string();
        dispatch_backend_command(&cmd_tx, BackendCommand::Startup, &mut status);
        Self {
            cmd_tx,
            ui_rx,
            input: FormInput::default(),
            options: FormOptions::default(),
            form_state: FormState::Idle,
            scroll_pending: false,
            status,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Form(FormEvent::StateChanged {
                    state,
                    scroll_into_view,
                }) => {
                    self.status = match &state {
                        FormState::Loading => "Predicting...".to_string(),
                        _ => "Ready".to_string(),
                    };
                    self.form_state = state;
                    self.scroll_pending = scroll_into_view;
                }
                UiEvent::Form(FormEvent::OptionsAppended { field, items }) => {
                    self.options.append(field, &items);
                    self.status = "Ready".to_string();
                }
                UiEvent::BackendFailed(message) => {
                    self.status = classify_backend_failure(&message);
                }
            }
        }
    }

    fn submit(&mut self) {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Submit {
                input: self.input.clone(),
            },
            &mut self.status,
        );
    }

    fn option_field(ui: &mut egui::Ui, field: OptionField, value: &mut String, entries: &[String]) {
        ui.label(field.label());
        // Without served options the field accepts free text.
        if entries.is_empty() {
            let hint = format!("Type a {}", field.label().to_ascii_lowercase());
            ui.add(egui::TextEdit::singleline(value).hint_text(hint));
            return;
        }
        let selected = if value.is_empty() {
            format!("Select {}", field.label().to_ascii_lowercase())
        } else {
            value.clone()
        };
        egui::ComboBox::from_id_salt(field.label())
            .selected_text(selected)
            .width(240.0)
            .show_ui(ui, |ui| {
                for entry in entries {
                    ui.selectable_value(value, entry.clone(), entry.as_str());
                }
            });
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("prediction_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                Self::option_field(
                    ui,
                    OptionField::Machine,
                    &mut self.input.machine_name,
                    &self.options.machines,
                );
                ui.end_row();

                ui.label("Workout day");
                let selected = if self.input.workout_day.is_empty() {
                    "Select day".to_string()
                } else {
                    self.input.workout_day.clone()
                };
                egui::ComboBox::from_id_salt("workout_day")
                    .selected_text(selected)
                    .width(240.0)
                    .show_ui(ui, |ui| {
                        for day in WORKOUT_DAYS {
                            ui.selectable_value(&mut self.input.workout_day, day.to_string(), day);
                        }
                    });
                ui.end_row();

                Self::option_field(
                    ui,
                    OptionField::WorkoutPlan,
                    &mut self.input.workout_plan,
                    &self.options.workout_plans,
                );
                ui.end_row();

                Self::option_field(
                    ui,
                    OptionField::MuscleGroup,
                    &mut self.input.muscle_group,
                    &self.options.muscle_groups,
                );
                ui.end_row();

                ui.label("Start hour (0-23)");
                ui.add(egui::TextEdit::singleline(&mut self.input.start_hour).hint_text("18"));
                ui.end_row();

                ui.label("Duration (minutes)");
                ui.add(egui::TextEdit::singleline(&mut self.input.duration_min).hint_text("30"));
                ui.end_row();
            });

        ui.add_space(10.0);

        let loading = self.form_state.shows_spinner();
        let label = if loading { "" } else { "Predict crowd level" };
        let btn = egui::Button::new(egui::RichText::new(label).strong())
            .min_size(egui::vec2(180.0, 36.0));
        let response = ui.add_enabled(self.form_state.submit_enabled(), btn);
        if loading {
            ui.put(response.rect, egui::Spinner::new());
        } else if response.clicked() {
            self.submit();
        }
    }

    fn show_result(ui: &mut egui::Ui, report: &CrowdReport) -> egui::Response {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Crowd level:");
                let text = egui::RichText::new(&report.crowd_level).strong().size(20.0);
                match crowd_level_color(&report.level()) {
                    Some(color) => ui.colored_label(color, text),
                    None => ui.label(text),
                }
                .on_hover_text(report.style_class());
            });
            ui.label(report.suggestion.as_str());
            if !report.probabilities.is_empty() {
                ui.add_space(4.0);
                for (label, probability) in &report.probabilities {
                    ui.add(
                        egui::ProgressBar::new(*probability as f32)
                            .text(format!("{label}: {:.0}%", probability * 100.0)),
                    );
                }
            }
        })
        .response
    }

    fn show_error(ui: &mut egui::Ui, message: &str) -> egui::Response {
        ui.group(|ui| {
            ui.colored_label(ui.visuals().error_fg_color, message);
        })
        .response
    }
}

impl eframe::App for PredictorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.status).weak());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Gym Crowd Predictor");
                ui.weak("Check how busy a machine will be before you go.");
                ui.add_space(8.0);

                self.show_form(ui);
                ui.add_space(12.0);

                let panel = match &self.form_state {
                    FormState::Result(report) => Some(Self::show_result(ui, report)),
                    FormState::Error(message) => Some(Self::show_error(ui, message)),
                    FormState::Idle | FormState::Loading => None,
                };
                if let Some(panel) = panel {
                    if std::mem::take(&mut self.scroll_pending) {
                        panel.scroll_to_me(Some(egui::Align::Center));
                    }
                }
            });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
