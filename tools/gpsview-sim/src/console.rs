use std::fmt::Write as _;
use std::sync::Mutex;

use gpsview_presenter::{Dialog, Field, ScreenView};
use owo_colors::OwoColorize;

#[derive(Debug, Default)]
struct Widgets {
    fields: [Option<String>; 6],
    status: Option<String>,
    buttons: (bool, bool),
}

/// Prints every view call and keeps the resulting widget state.
#[derive(Debug, Default)]
pub struct ConsoleView {
    widgets: Mutex<Widgets>,
}

impl ConsoleView {
    fn widgets(&self) -> std::sync::MutexGuard<'_, Widgets> {
        match self.widgets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Render the current widget state as a small panel.
    pub fn snapshot(&self) -> String {
        let widgets = self.widgets();
        let mut out = String::new();
        for field in Field::ALL {
            let value = widgets.fields[field_slot(field)]
                .as_deref()
                .unwrap_or("--");
            let _ = writeln!(out, "  {:<10} {value}", field.label());
        }
        let status = widgets.status.as_deref().unwrap_or("");
        let _ = writeln!(out, "  {status}");
        let (start, stop) = widgets.buttons;
        let _ = writeln!(
            out,
            "  [{}] [{}]",
            button("Start", start),
            button("Stop", stop)
        );
        out
    }
}

fn field_slot(field: Field) -> usize {
    usize::try_from(field.index()).unwrap_or(0)
}

fn button(label: &str, enabled: bool) -> String {
    if enabled {
        label.green().to_string()
    } else {
        label.dimmed().to_string()
    }
}

impl ScreenView for ConsoleView {
    fn render_field(&self, field: Field, text: &str) {
        println!("    {} {} = {text}", "field".cyan(), field.label());
        self.widgets().fields[field_slot(field)] = Some(text.to_owned());
    }

    fn render_status(&self, text: &str) {
        println!("    {} {text}", "status".blue());
        self.widgets().status = Some(text.to_owned());
    }

    fn render_buttons(&self, start_enabled: bool, stop_enabled: bool) {
        println!(
            "    {} start={start_enabled} stop={stop_enabled}",
            "buttons".magenta()
        );
        self.widgets().buttons = (start_enabled, stop_enabled);
    }

    fn show_dialog(&self, dialog: Dialog) {
        println!(
            "    {} {}: {} [{}]",
            "dialog".yellow().bold(),
            dialog.title(),
            dialog.message(),
            dialog.confirm_label()
        );
    }

    fn show_toast(&self, text: &str) {
        println!("    {} {text}", "toast".yellow());
    }
}
