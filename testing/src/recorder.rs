use std::sync::{Mutex, MutexGuard};

use gpsview_location::{LocationDelegate, LocationEvent};
use gpsview_presenter::{Dialog, Field, ScreenView};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Delegate that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    events: Mutex<Vec<LocationEvent>>,
}

impl RecordingDelegate {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<LocationEvent> {
        lock(&self.events).clone()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl LocationDelegate for RecordingDelegate {
    fn on_event(&self, event: LocationEvent) {
        lock(&self.events).push(event);
    }
}

/// One call made on a [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    /// `render_field`
    Field(Field, String),
    /// `render_status`
    Status(String),
    /// `render_buttons`
    Buttons {
        /// Start button enabled.
        start: bool,
        /// Stop button enabled.
        stop: bool,
    },
    /// `show_dialog`
    Dialog(Dialog),
    /// `show_toast`
    Toast(String),
}

/// View that records every call.
#[derive(Debug, Default)]
pub struct RecordingView {
    calls: Mutex<Vec<ViewCall>>,
}

impl RecordingView {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ViewCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    /// Most recent text of `field`.
    #[must_use]
    pub fn field(&self, field: Field) -> Option<String> {
        lock(&self.calls).iter().rev().find_map(|call| match call {
            ViewCall::Field(f, text) if *f == field => Some(text.clone()),
            _ => None,
        })
    }

    /// Most recent status line.
    #[must_use]
    pub fn status(&self) -> Option<String> {
        lock(&self.calls).iter().rev().find_map(|call| match call {
            ViewCall::Status(text) => Some(text.clone()),
            _ => None,
        })
    }

    /// Most recent button state as `(start, stop)`.
    #[must_use]
    pub fn buttons(&self) -> Option<(bool, bool)> {
        lock(&self.calls).iter().rev().find_map(|call| match call {
            ViewCall::Buttons { start, stop } => Some((*start, *stop)),
            _ => None,
        })
    }

    /// Every dialog shown, in order.
    #[must_use]
    pub fn dialogs(&self) -> Vec<Dialog> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ViewCall::Dialog(dialog) => Some(*dialog),
                _ => None,
            })
            .collect()
    }

    /// Every toast shown, in order.
    #[must_use]
    pub fn toasts(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ViewCall::Toast(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ScreenView for RecordingView {
    fn render_field(&self, field: Field, text: &str) {
        lock(&self.calls).push(ViewCall::Field(field, text.to_owned()));
    }

    fn render_status(&self, text: &str) {
        lock(&self.calls).push(ViewCall::Status(text.to_owned()));
    }

    fn render_buttons(&self, start_enabled: bool, stop_enabled: bool) {
        lock(&self.calls).push(ViewCall::Buttons {
            start: start_enabled,
            stop: stop_enabled,
        });
    }

    fn show_dialog(&self, dialog: Dialog) {
        lock(&self.calls).push(ViewCall::Dialog(dialog));
    }

    fn show_toast(&self, text: &str) {
        lock(&self.calls).push(ViewCall::Toast(text.to_owned()));
    }
}
