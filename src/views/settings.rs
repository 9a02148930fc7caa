use backup_panel_core::api::parse_limit;
use backup_panel_core::config::{Config, Style};
use backup_panel_core::service::BackupService;
use eframe::egui::{self, RichText};
use strum::IntoEnumIterator;
use tracing::error;

use super::ui_helpers::{ui_show_error, ViewResponse};
use super::View;

#[derive(Default)]
pub struct Settings {
    /// Edited copy, only applied on save
    draft: Option<Config>,
    default_limit: String,
    error: Option<String>,
}
impl Settings {
    fn ensure_draft(&mut self, service: &BackupService) {
        if self.draft.is_none() {
            self.default_limit = service
                .config
                .default_limit
                .map(|l| l.to_string())
                .unwrap_or_default();
            self.draft = Some(service.config.clone());
        }
    }

    fn save(&mut self, service: &mut BackupService) -> ViewResponse {
        let Some(mut config) = self.draft.clone() else {
            return ViewResponse::None;
        };
        config.default_limit = parse_limit(&self.default_limit);
        let result = service
            .reconfigure(config)
            .and_then(|_| service.save_config());
        match result {
            Ok(()) => {
                self.error = None;
                self.draft = None;
                ViewResponse::ConfigChanged
            }
            Err(e) => {
                error!("Unable to save settings: {e}");
                self.error = Some(e.to_string());
                ViewResponse::None
            }
        }
    }
}
impl View for Settings {
    fn ui(
        &mut self,
        _ctx: &egui::Context,
        ui: &mut egui::Ui,
        service: &mut BackupService,
    ) -> ViewResponse {
        self.ensure_draft(service);
        if let Some(config) = self.draft.as_mut() {
            ui_show_form(ui, config, &mut self.default_limit);
        }
        ui.separator();

        let mut response = ViewResponse::None;
        ui.horizontal(|ui| {
            if ui.button(RichText::new("Save").heading()).clicked() {
                response = self.save(service);
            }
            if ui.button("Discard").clicked() {
                self.draft = None;
                self.error = None;
            }
        });
        if let Some(e) = &self.error {
            ui_show_error(ui, e);
        }
        response
    }
}

fn ui_show_form(ui: &mut egui::Ui, config: &mut Config, default_limit: &mut String) {
    egui::Grid::new("settings_grid")
        .num_columns(2)
        .spacing([10.0, 8.0])
        .show(ui, |ui| {
            ui.label("Server API URL");
            ui.add(egui::TextEdit::singleline(&mut config.base_url).desired_width(420.0));
            ui.end_row();

            ui.label("");
            ui.checkbox(
                &mut config.accept_invalid_certs,
                "Accept self-signed certificates",
            );
            ui.end_row();

            ui.label("Default backup limit");
            ui.add(
                egui::TextEdit::singleline(default_limit)
                    .hint_text("server default")
                    .desired_width(60.0),
            );
            ui.end_row();

            ui.label("Typing speed (ms/char)");
            ui.add(egui::DragValue::new(&mut config.typing_speed_ms).range(0..=500));
            ui.end_row();

            ui.label("Hide status after (s)");
            ui.add(egui::DragValue::new(&mut config.status_hide_secs).range(1..=3600));
            ui.end_row();

            ui.label("Theme");
            egui::ComboBox::from_id_salt("style")
                .selected_text(config.style.to_string())
                .show_ui(ui, |ui| {
                    for style in Style::iter() {
                        ui.selectable_value(&mut config.style, style, style.to_string());
                    }
                });
            ui.end_row();
        });
}
