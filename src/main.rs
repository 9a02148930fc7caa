use backup_panel_core::config::{Config, Style};
use backup_panel_core::service::BackupService;
use dotenv::dotenv;
use eframe::egui;
use views::View;

mod views;

use views::backups::Backups;
use views::settings::Settings;
use views::ui_helpers::{ViewOpt, ViewResponse};

const APP_NAME: &str = "Stationeers Backup Manager";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::load()?;
    let service = BackupService::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([720.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(|cc| Ok(Box::new(BpApp::new(&cc.egui_ctx, service)))),
    )?;
    Ok(())
}

struct BpApp {
    view: ViewOpt,
    backups: Backups,
    settings: Settings,
    service: BackupService,
}
impl BpApp {
    fn new(ctx: &egui::Context, service: BackupService) -> Self {
        apply_style(ctx, service.config.style);
        BpApp {
            view: ViewOpt::Backups,
            backups: Backups::new(&service),
            settings: Settings::default(),
            service,
        }
    }
}

fn apply_style(ctx: &egui::Context, style: Style) {
    let theme = match style {
        Style::Light => egui::ThemePreference::Light,
        Style::Dark => egui::ThemePreference::Dark,
        Style::System => egui::ThemePreference::System,
    };
    ctx.set_theme(theme);
}

impl eframe::App for BpApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.view, ViewOpt::Backups, "Backups");
                ui.selectable_value(&mut self.view, ViewOpt::Settings, "Settings");
            });
            ui.separator();

            let response = match self.view {
                ViewOpt::Backups => self.backups.ui(ctx, ui, &mut self.service),
                ViewOpt::Settings => self.settings.ui(ctx, ui, &mut self.service),
            };
            if response == ViewResponse::ConfigChanged {
                apply_style(ctx, self.service.config.style);
                self.backups.apply_settings(&self.service);
            }
        });
    }
}
