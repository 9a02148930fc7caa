use eframe::{
    egui::{self, RichText},
    epaint::Color32,
};
use lazy_async_promise::{ImmediateValuePromise, ImmediateValueState};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum ViewOpt {
    #[default]
    Backups,
    Settings,
}

#[derive(PartialEq, Default)]
pub enum ViewResponse {
    #[default]
    None,
    /// Settings were saved and the service rebuilt
    ConfigChanged,
}

/// A request in flight. Unlike a cached value it hands its result out exactly
/// once, failures included, so the caller can render them.
pub struct PendingRequest<T: Send + 'static> {
    promise: Option<ImmediateValuePromise<T>>,
}
impl<T: Send + 'static> Default for PendingRequest<T> {
    fn default() -> Self {
        Self { promise: None }
    }
}
impl<T: Send + Clone + 'static> PendingRequest<T> {
    pub fn new(promise: ImmediateValuePromise<T>) -> Self {
        Self {
            promise: Some(promise),
        }
    }
    pub fn set(&mut self, promise: ImmediateValuePromise<T>) {
        self.promise = Some(promise);
    }
    pub fn is_polling(&self) -> bool {
        self.promise.is_some()
    }
    pub fn poll(&mut self) -> Option<Result<T, String>> {
        let promise = self.promise.as_mut()?;
        let result = match promise.poll_state() {
            ImmediateValueState::Success(value) => Ok(value.clone()), // copy out of promise
            ImmediateValueState::Error(e) => Err(format!("{}", **e)),
            _ => return None,
        };
        self.promise = None;
        Some(result)
    }
}

/// Colors for a backup type badge, keyed by its style class.
fn badge_colors(class: &str) -> (Color32, Color32) {
    match class {
        "preterrain-trio" => (Color32::from_rgb(20, 60, 30), Color32::from_rgb(120, 220, 140)),
        "dotsave" => (Color32::from_rgb(20, 40, 70), Color32::from_rgb(130, 180, 250)),
        _ => (Color32::from_gray(50), Color32::from_gray(180)),
    }
}

pub fn ui_show_badge(ui: &mut egui::Ui, class: &str, text: &str) {
    let (bg, fg) = badge_colors(class);
    ui.label(RichText::new(format!(" {text} ")).small().color(fg).background_color(bg));
}

pub fn ui_show_error(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).color(Color32::LIGHT_RED));
}
