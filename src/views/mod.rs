use backup_panel_core::service::BackupService;
use eframe::egui;

use ui_helpers::ViewResponse;

pub mod backups;
pub mod settings;
pub mod ui_helpers;

pub trait View {
    fn ui(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        service: &mut BackupService,
    ) -> ViewResponse;
}
