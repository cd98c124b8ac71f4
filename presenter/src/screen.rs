use std::fmt;
use std::sync::Arc;

use gpsview_location::{
    LocationBackend, LocationDelegate, LocationError, LocationEvent, LocationSession,
};
use gpsview_permission::{GrantResult, PermissionGate, REQUEST_CODE_LOCATION_SETTINGS};
use log::{debug, error};

use crate::{Dialog, ScreenView, UiThread, format_fix, format_status};

/// User-visible status and toast texts.
pub mod messages {
    /// Session started.
    pub const STARTED: &str = "GPS location started";
    /// Session failed to start.
    pub const START_FAILED: &str = "Failed to start GPS";
    /// Neither provider is on.
    pub const NO_PROVIDER: &str = "Location service is off";
    /// Session stopped.
    pub const STOPPED: &str = "GPS stopped";
    /// A provider was switched on.
    pub const PROVIDER_ENABLED: &str = "GPS enabled";
    /// A provider was switched off.
    pub const PROVIDER_DISABLED: &str = "GPS disabled";
    /// Toast when a provider is switched off.
    pub const GPS_OFF: &str = "GPS is off";
    /// Toast when the permission request is refused.
    pub const PERMISSION_DENIED: &str = "Permission denied";
    /// Toast when the settings screen cannot be opened.
    pub const SETTINGS_UNAVAILABLE: &str = "Cannot open location settings";
}

/// Posts view updates through the UI thread.
#[derive(Clone)]
struct ViewPoster {
    view: Arc<dyn ScreenView>,
    ui: Arc<dyn UiThread>,
}

impl ViewPoster {
    fn post(&self, update: impl FnOnce(&dyn ScreenView) + Send + 'static) {
        let view = self.view.clone();
        self.ui.run_on_ui_thread(Box::new(move || update(view.as_ref())));
    }

    fn status(&self, message: &str) {
        let text = format_status(message);
        self.post(move |view| view.render_status(&text));
    }

    fn toast(&self, message: &'static str) {
        self.post(move |view| view.show_toast(message));
    }

    fn buttons(&self, running: bool) {
        self.post(move |view| view.render_buttons(!running, running));
    }

    fn dialog(&self, dialog: Dialog) {
        self.post(move |view| view.show_dialog(dialog));
    }
}

/// Turns location events into view updates.
struct ScreenDelegate {
    poster: ViewPoster,
}

impl LocationDelegate for ScreenDelegate {
    fn on_event(&self, event: LocationEvent) {
        match event {
            LocationEvent::FixReceived(fix) => {
                let texts = format_fix(&fix);
                self.poster.post(move |view| {
                    for (field, text) in &texts {
                        view.render_field(*field, text);
                    }
                });
            }
            LocationEvent::StatusChanged { provider, status } => {
                self.poster.status(&format!("GPS status: {provider} - {status}"));
            }
            LocationEvent::ProviderEnabled(_) => {
                self.poster.status(messages::PROVIDER_ENABLED);
                self.poster.toast(messages::PROVIDER_ENABLED);
            }
            LocationEvent::ProviderDisabled(_) => {
                self.poster.status(messages::PROVIDER_DISABLED);
                self.poster.toast(messages::GPS_OFF);
            }
        }
    }
}

/// The live GPS screen.
///
/// Host lifecycle and widget callbacks map one-to-one onto the `on_*`
/// methods.
pub struct LocationScreen {
    permissions: PermissionGate,
    session: LocationSession,
    poster: ViewPoster,
}

impl fmt::Debug for LocationScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationScreen")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl LocationScreen {
    /// Build the screen. `backend` is `None` when the host has no location
    /// manager.
    pub fn new(
        permissions: PermissionGate,
        backend: Option<Arc<dyn LocationBackend>>,
        view: Arc<dyn ScreenView>,
        ui: Arc<dyn UiThread>,
    ) -> Self {
        let poster = ViewPoster { view, ui };
        let delegate = Arc::new(ScreenDelegate {
            poster: poster.clone(),
        });
        let session = LocationSession::new(permissions.clone(), backend, delegate);

        Self {
            permissions,
            session,
            poster,
        }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &LocationSession {
        &self.session
    }

    /// Mutable access to the underlying session.
    pub const fn session_mut(&mut self) -> &mut LocationSession {
        &mut self.session
    }

    /// Screen created: try to start right away.
    pub fn on_create(&mut self) {
        self.start_location();
    }

    /// Start button pressed.
    pub fn on_start_clicked(&mut self) {
        self.start_location();
    }

    /// Stop button pressed.
    pub fn on_stop_clicked(&mut self) {
        self.session.stop();
        self.poster.status(messages::STOPPED);
        self.poster.buttons(false);
    }

    /// Screen destroyed: release the registration.
    pub fn on_destroy(&mut self) {
        self.session.stop();
    }

    /// Result of a permission request.
    pub fn on_permission_result(&mut self, request_code: i32, grant_results: &[GrantResult]) {
        if self
            .permissions
            .handle_permission_result(request_code, grant_results)
        {
            self.start_location();
        } else {
            debug!("permission result {request_code} not granted: {grant_results:?}");
            self.poster.toast(messages::PERMISSION_DENIED);
        }
    }

    /// A screen launched for a result has returned.
    pub fn on_activity_result(&mut self, request_code: i32) {
        if request_code == REQUEST_CODE_LOCATION_SETTINGS {
            debug!("returned from location settings, retrying");
            self.start_location();
        }
    }

    /// The confirm button of `dialog` was pressed.
    pub fn on_dialog_confirmed(&mut self, dialog: Dialog) {
        match dialog {
            Dialog::PermissionRationale => {
                if let Err(err) = self.permissions.request_location_permission() {
                    error!("failed to request location permission: {err}");
                    self.poster.toast(messages::PERMISSION_DENIED);
                }
            }
            Dialog::GpsDisabled => {
                if let Err(err) = self.permissions.open_location_settings() {
                    error!("failed to open location settings: {err}");
                    self.poster.toast(messages::SETTINGS_UNAVAILABLE);
                }
            }
        }
    }

    fn start_location(&mut self) {
        if !self.permissions.has_location_permission() {
            if self.permissions.should_show_rationale() {
                self.poster.dialog(Dialog::PermissionRationale);
            } else if let Err(err) = self.permissions.request_location_permission() {
                error!("failed to request location permission: {err}");
                self.poster.toast(messages::PERMISSION_DENIED);
            }
            return;
        }

        match self.session.start() {
            Ok(provider) => {
                debug!("screen started on {provider}");
                self.poster.status(messages::STARTED);
                self.poster.buttons(true);
            }
            Err(LocationError::ProviderUnavailable) => {
                self.poster.status(messages::NO_PROVIDER);
                self.poster.dialog(Dialog::GpsDisabled);
            }
            Err(err) => {
                error!("failed to start location session: {err}");
                self.poster.status(messages::START_FAILED);
            }
        }
    }
}
