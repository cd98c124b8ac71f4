//! Headless presenter for the location screen.
//!
//! [`LocationScreen`] composes the permission gate and the location session
//! and drives a [`ScreenView`]: six readout fields, a status line, start/stop
//! buttons, two dialogs and toasts. The widgets themselves live in the host
//! application. Every view mutation goes through a [`UiThread`] so that
//! location callbacks arriving on platform threads never touch widgets
//! directly.

#![warn(missing_docs)]

mod format;
mod screen;
mod ui_thread;
mod view;

pub use format::{
    format_accuracy, format_altitude, format_bearing, format_fix, format_latitude,
    format_longitude, format_speed, format_status,
};
pub use screen::{LocationScreen, messages};
pub use ui_thread::{InlineUiThread, QueuedUiThread, UiTask, UiThread};
pub use view::{Dialog, Field, ScreenView};
