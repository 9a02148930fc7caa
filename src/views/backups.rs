use std::time::{Duration, Instant};

use backup_panel_core::api::{parse_limit, Listing};
use backup_panel_core::panel::{
    BackupItem, BackupPanel, Entrance, ListState, PanelSettings, NO_BACKUPS,
};
use backup_panel_core::service::BackupService;
use eframe::egui::{self, Layout, RichText};
use egui_extras::{Column, TableBuilder};

use super::ui_helpers::{ui_show_badge, ui_show_error, PendingRequest, ViewResponse};
use super::View;

const FADE_SECS: f32 = 0.3;
/// How often to look at requests in flight.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Backups {
    panel: BackupPanel,
    started: Instant,
    limit_input: String,
    listing: PendingRequest<Listing>,
    restores: Vec<(i64, PendingRequest<String>)>,
    /// Bumped on each load so fade ids from an older list are not reused
    generation: u64,
    init: bool,
}

impl Backups {
    pub fn new(service: &BackupService) -> Self {
        Self {
            panel: BackupPanel::new(PanelSettings::from(&service.config)),
            started: Instant::now(),
            limit_input: service
                .config
                .default_limit
                .map(|l| l.to_string())
                .unwrap_or_default(),
            listing: PendingRequest::default(),
            restores: vec![],
            generation: 0,
            init: true,
        }
    }

    pub fn apply_settings(&mut self, service: &BackupService) {
        self.panel.settings = PanelSettings::from(&service.config);
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn show_init(&mut self) -> bool {
        let init = self.init;
        if self.init {
            self.init = false;
        }
        init
    }

    fn load_backups(&mut self, service: &BackupService) {
        let limit = parse_limit(&self.limit_input);
        self.generation += 1;
        self.panel.begin_load(self.now());
        self.listing.set(service.list_backups(limit));
    }

    fn restore_backup(&mut self, index: i64, service: &BackupService) {
        let request = PendingRequest::new(service.restore_backup(index));
        self.restores.push((index, request));
    }

    fn poll(&mut self) {
        let now = self.now();
        if let Some(result) = self.listing.poll() {
            self.panel.apply_listing(now, result);
        }
        let mut finished = vec![];
        for (index, request) in self.restores.iter_mut() {
            if let Some(result) = request.poll() {
                finished.push((*index, result));
            }
        }
        self.restores.retain(|(_, request)| request.is_polling());
        for (index, result) in finished {
            self.panel.apply_restore(now, index, result);
        }
        self.panel.advance(now);
    }

    fn schedule_repaint(&self, ctx: &egui::Context) {
        if self.listing.is_polling() || !self.restores.is_empty() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
        if let Some(deadline) = self.panel.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_sub(self.now()));
        }
    }

    fn item_opacity(&self, ctx: &egui::Context, item: &BackupItem) -> f32 {
        let id = egui::Id::new(("backup-item", self.generation, item.index));
        match item.entrance {
            Entrance::Static => 1.0,
            Entrance::Pending => ctx.animate_bool_with_time(id, false, FADE_SECS),
            Entrance::AnimatedIn => ctx.animate_bool_with_time(id, true, FADE_SECS),
        }
    }

    fn ui_show_items(
        &self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        items: &[BackupItem],
    ) -> Option<i64> {
        let mut restore = None;
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::remainder().clip(true))
            .column(Column::auto())
            .body(|body| {
                body.rows(44.0, items.len(), |mut row| {
                    let item = &items[row.index()];
                    let opacity = self.item_opacity(ctx, item);

                    row.col(|ui| {
                        ui.set_opacity(opacity);
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(&item.label).strong());
                                ui_show_badge(ui, &item.badge_class, &item.kind.to_string());
                            });
                            ui.label(RichText::new(&item.date_label).weak());
                        });
                    });
                    row.col(|ui| {
                        ui.set_opacity(opacity);
                        if ui.button("Restore").clicked() {
                            restore = Some(item.index);
                        }
                    });
                });
            });
        restore
    }
}

impl View for Backups {
    fn ui(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        service: &mut BackupService,
    ) -> ViewResponse {
        if self.show_init() {
            self.load_backups(service);
        }
        self.poll();

        ui.horizontal(|ui| {
            ui.heading("Backups");
            ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                let refresh = ui.add_enabled(!self.listing.is_polling(), egui::Button::new("Refresh"));
                let limit = ui.add(
                    egui::TextEdit::singleline(&mut self.limit_input)
                        .hint_text("default")
                        .desired_width(60.0),
                );
                ui.label("Limit:");
                let submitted =
                    limit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if refresh.clicked() || (submitted && !self.listing.is_polling()) {
                    self.load_backups(service);
                }
            });
        });

        if self.panel.status_visible() {
            ui.add_space(4.0);
            ui.label(RichText::new(self.panel.status_text()).monospace());
        }
        ui.separator();

        let mut restore = None;
        match self.panel.list() {
            ListState::Idle => {}
            ListState::Loading => {
                ui.spinner();
            }
            ListState::Error(text) => ui_show_error(ui, text),
            ListState::Empty => {
                ui.label(NO_BACKUPS);
            }
            ListState::Items(items) => {
                restore = self.ui_show_items(ctx, ui, items);
            }
        }
        if let Some(index) = restore {
            self.restore_backup(index, service);
        }

        self.schedule_repaint(ctx);
        ViewResponse::None
    }
}
