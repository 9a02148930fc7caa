//! State of the backup panel: the rendered list, the status line and every
//! timer that animates them. No I/O happens here; request results and the
//! clock are fed in by the frontend.

use std::fmt::Display;
use std::time::Duration;

use tracing::{error, info};

use crate::api::Listing;
use crate::backups::{BackupKind, BackupRecord};
use crate::config::Config;
use crate::schedule::{Scheduler, TimerId};
use crate::typing::{RevealTick, Revealer};

pub const STAGGER_STEP: Duration = Duration::from_millis(50);
/// Items past this ordinal show up without an entrance animation.
pub const STAGGER_LIMIT: usize = 20;

pub const LOAD_FAILED: &str = "Failed to load backups";
pub const NO_BACKUPS: &str = "No valid backup files found.";

/// Text areas driven by the revealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    AnimateIn { ordinal: usize },
    Reveal(RevealTick<Target>),
    RevealDone(Target),
    HideStatus,
}
impl From<RevealTick<Target>> for PanelEvent {
    fn from(tick: RevealTick<Target>) -> Self {
        PanelEvent::Reveal(tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entrance {
    /// Waiting for its stagger slot
    Pending,
    AnimatedIn,
    /// Beyond the stagger cap, shown as is
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackupItem {
    pub index: i64,
    pub label: String,
    pub kind: BackupKind,
    pub badge_class: String,
    pub date_label: String,
    pub entrance: Entrance,
}
impl BackupItem {
    fn new(record: &BackupRecord, staggered: bool) -> Self {
        let kind = record.kind();
        Self {
            index: record.index,
            label: record.label(),
            kind,
            badge_class: kind.css_class(),
            date_label: record.date_label(),
            entrance: if staggered {
                Entrance::Pending
            } else {
                Entrance::Static
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Empty,
    Items(Vec<BackupItem>),
}
impl ListState {
    /// Backup indexes that have a restore button, in display order.
    pub fn restore_targets(&self) -> Vec<i64> {
        match self {
            ListState::Items(items) => items.iter().map(|i| i.index).collect(),
            _ => vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSettings {
    pub typing_speed: Duration,
    pub status_hide_delay: Duration,
}
impl Default for PanelSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}
impl From<&Config> for PanelSettings {
    fn from(config: &Config) -> Self {
        Self {
            typing_speed: config.typing_speed(),
            status_hide_delay: config.status_hide_delay(),
        }
    }
}

#[derive(Debug)]
pub struct BackupPanel {
    pub settings: PanelSettings,
    list: ListState,
    stagger_timers: Vec<TimerId>,
    status_hidden: bool,
    hide_timer: Option<TimerId>,
    scheduler: Scheduler<PanelEvent>,
    revealer: Revealer<Target, PanelEvent>,
}

impl Default for BackupPanel {
    fn default() -> Self {
        Self::new(PanelSettings::default())
    }
}

impl BackupPanel {
    pub fn new(settings: PanelSettings) -> Self {
        Self {
            settings,
            list: ListState::default(),
            stagger_timers: vec![],
            status_hidden: true,
            hide_timer: None,
            scheduler: Scheduler::new(),
            revealer: Revealer::new(),
        }
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn status_visible(&self) -> bool {
        !self.status_hidden
    }

    pub fn status_text(&self) -> &str {
        self.revealer.text(Target::Status).unwrap_or_default()
    }

    pub fn is_typing(&self) -> bool {
        self.revealer.is_typing(Target::Status)
    }

    /// When the frontend has to wake up next to keep animations running.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Fire every timer due by `now`.
    pub fn advance(&mut self, now: Duration) {
        while let Some(event) = self.scheduler.pop_due(now) {
            self.handle(event);
        }
        self.scheduler.advance_to(now);
    }

    pub fn begin_load(&mut self, now: Duration) {
        self.advance(now);
        self.cancel_stagger();
        self.list = ListState::Loading;
    }

    pub fn apply_listing<E: Display>(&mut self, now: Duration, result: Result<Listing, E>) {
        self.advance(now);
        self.cancel_stagger();
        self.list = match result {
            Ok(listing) => self.render_listing(listing),
            Err(e) => {
                error!("Failed to fetch backups: {e}");
                ListState::Error(LOAD_FAILED.to_string())
            }
        };
    }

    fn render_listing(&mut self, listing: Listing) -> ListState {
        let records = match listing {
            Listing::Text { ok, text } if !ok || !text.is_empty() => {
                let text = if text.is_empty() {
                    LOAD_FAILED.to_string()
                } else {
                    text
                };
                return ListState::Error(text);
            }
            Listing::Text { .. } => vec![],
            Listing::Records { ok: false, .. } => {
                return ListState::Error(LOAD_FAILED.to_string());
            }
            Listing::Records { records, .. } => records,
        };
        if records.is_empty() {
            return ListState::Empty;
        }

        info!("Showing {} backups", records.len());
        let items = records
            .iter()
            .enumerate()
            .map(|(ordinal, record)| {
                let staggered = ordinal < STAGGER_LIMIT;
                if staggered {
                    let delay = STAGGER_STEP * ordinal as u32;
                    let timer = self
                        .scheduler
                        .schedule(delay, PanelEvent::AnimateIn { ordinal });
                    self.stagger_timers.push(timer);
                }
                BackupItem::new(record, staggered)
            })
            .collect();
        ListState::Items(items)
    }

    /// Show the outcome of a restore request. Transport failures are only
    /// logged, the status line keeps whatever it showed before.
    pub fn apply_restore<E: Display>(&mut self, now: Duration, index: i64, result: Result<String, E>) {
        self.advance(now);
        match result {
            Ok(text) => {
                info!("Restore of backup {index} answered");
                self.status_hidden = false;
                if let Some(timer) = self.hide_timer.take() {
                    self.scheduler.cancel(timer);
                }
                self.revealer.reveal(
                    &mut self.scheduler,
                    Target::Status,
                    &text,
                    self.settings.typing_speed,
                    Some(PanelEvent::RevealDone(Target::Status)),
                );
            }
            Err(e) => error!("Failed to restore backup {index}: {e}"),
        }
    }

    fn handle(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::AnimateIn { ordinal } => {
                if let ListState::Items(items) = &mut self.list {
                    if let Some(item) = items.get_mut(ordinal) {
                        item.entrance = Entrance::AnimatedIn;
                    }
                }
            }
            PanelEvent::Reveal(tick) => self.revealer.tick(&mut self.scheduler, tick),
            PanelEvent::RevealDone(Target::Status) => {
                // a newer reveal owns the status line now
                if self.is_typing() {
                    return;
                }
                if let Some(timer) = self.hide_timer.take() {
                    self.scheduler.cancel(timer);
                }
                self.hide_timer = Some(
                    self.scheduler
                        .schedule(self.settings.status_hide_delay, PanelEvent::HideStatus),
                );
            }
            PanelEvent::HideStatus => {
                self.hide_timer = None;
                self.status_hidden = true;
            }
        }
    }

    fn cancel_stagger(&mut self) {
        for timer in self.stagger_timers.drain(..) {
            self.scheduler.cancel(timer);
        }
    }
}
