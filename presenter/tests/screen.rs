use std::sync::Arc;

use gpsview_location::{LocationBackend, LocationError, LocationEvent, Provider};
use gpsview_permission::{
    GrantResult, Permission, PermissionGate, REQUEST_CODE_LOCATION_PERMISSION,
    REQUEST_CODE_LOCATION_SETTINGS,
};
use gpsview_presenter::{
    Dialog, Field, InlineUiThread, LocationScreen, QueuedUiThread, UiThread, messages,
};
use gpsview_testing::{
    FakeLocationBackend, FakePermissionHost, RecordingView, ViewCall, reference_fix,
};

struct Harness {
    host: Arc<FakePermissionHost>,
    backend: Arc<FakeLocationBackend>,
    view: Arc<RecordingView>,
    screen: LocationScreen,
}

fn harness_with_ui(host: FakePermissionHost, ui: Arc<dyn UiThread>) -> Harness {
    let host = Arc::new(host);
    let backend = Arc::new(FakeLocationBackend::new());
    let view = Arc::new(RecordingView::new());
    let screen = LocationScreen::new(
        PermissionGate::new(host.clone()),
        Some(backend.clone() as Arc<dyn LocationBackend>),
        view.clone(),
        ui,
    );
    Harness {
        host,
        backend,
        view,
        screen,
    }
}

fn harness(host: FakePermissionHost) -> Harness {
    harness_with_ui(host, Arc::new(InlineUiThread))
}

fn status(message: &str) -> String {
    format!("Status: {message}")
}

#[test]
fn create_renders_last_known_fix() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.set_last_known(Provider::Gps, Some(reference_fix()));

    h.screen.on_create();

    assert!(h.screen.session().is_running());
    assert_eq!(h.view.field(Field::Latitude).as_deref(), Some("37.421000°"));
    assert_eq!(h.view.field(Field::Longitude).as_deref(), Some("-122.084000°"));
    assert_eq!(h.view.field(Field::Altitude).as_deref(), Some("30.00 meters"));
    assert_eq!(h.view.field(Field::Accuracy).as_deref(), Some("5.00 meters"));
    assert_eq!(h.view.field(Field::Speed).as_deref(), Some("0.00 m/s"));
    assert_eq!(h.view.field(Field::Bearing).as_deref(), Some("0.00°"));
    assert_eq!(h.view.status(), Some(status(messages::STARTED)));
    assert_eq!(h.view.buttons(), Some((false, true)));
}

#[test]
fn missing_permission_requests_it() {
    let mut h = harness(FakePermissionHost::new());

    h.screen.on_create();

    assert!(!h.screen.session().is_running());
    assert_eq!(
        h.host.requests(),
        vec![(Permission::LOCATION.to_vec(), REQUEST_CODE_LOCATION_PERMISSION)]
    );
    assert!(h.view.dialogs().is_empty());
}

#[test]
fn rationale_dialog_then_request() {
    let host = FakePermissionHost::new();
    host.set_rationale(true);
    let mut h = harness(host);

    h.screen.on_start_clicked();
    assert_eq!(h.view.dialogs(), vec![Dialog::PermissionRationale]);
    assert!(h.host.requests().is_empty());

    h.screen.on_dialog_confirmed(Dialog::PermissionRationale);
    assert_eq!(h.host.requests().len(), 1);
}

#[test]
fn granted_permission_result_starts_session() {
    let mut h = harness(FakePermissionHost::new());
    h.backend.set_provider_enabled(Provider::Network, true);
    h.screen.on_create();

    h.host.grant_all();
    h.screen.on_permission_result(
        REQUEST_CODE_LOCATION_PERMISSION,
        &[GrantResult::Granted, GrantResult::Granted],
    );

    assert_eq!(h.screen.session().active_provider(), Some(Provider::Network));
    assert_eq!(h.view.status(), Some(status(messages::STARTED)));
}

#[test]
fn denied_permission_result_toasts() {
    let mut h = harness(FakePermissionHost::new());

    h.screen.on_permission_result(
        REQUEST_CODE_LOCATION_PERMISSION,
        &[GrantResult::Granted, GrantResult::Denied],
    );

    assert!(!h.screen.session().is_running());
    assert_eq!(h.view.toasts(), vec![messages::PERMISSION_DENIED.to_owned()]);
}

#[test]
fn no_provider_shows_gps_dialog_and_settings() {
    let mut h = harness(FakePermissionHost::granted());

    h.screen.on_create();
    assert_eq!(h.view.status(), Some(status(messages::NO_PROVIDER)));
    assert_eq!(h.view.dialogs(), vec![Dialog::GpsDisabled]);

    h.screen.on_dialog_confirmed(Dialog::GpsDisabled);
    assert_eq!(h.host.settings_launches(), vec![REQUEST_CODE_LOCATION_SETTINGS]);

    h.backend.set_provider_enabled(Provider::Gps, true);
    h.screen.on_activity_result(REQUEST_CODE_LOCATION_SETTINGS);
    assert_eq!(h.screen.session().active_provider(), Some(Provider::Gps));
}

#[test]
fn settings_failure_toasts() {
    let host = FakePermissionHost::granted();
    host.set_fail_requests(true);
    let mut h = harness(host);

    h.screen.on_dialog_confirmed(Dialog::GpsDisabled);
    assert_eq!(h.view.toasts(), vec![messages::SETTINGS_UNAVAILABLE.to_owned()]);
}

#[test]
fn unrelated_activity_result_is_ignored() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);

    h.screen.on_activity_result(42);
    assert!(!h.screen.session().is_running());
    assert!(h.view.calls().is_empty());
}

#[test]
fn security_fault_reports_start_failure() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.fail_registration(Some(LocationError::SecurityFault {
        message: "revoked".into(),
    }));

    h.screen.on_start_clicked();

    assert!(!h.screen.session().is_running());
    assert_eq!(h.view.status(), Some(status(messages::START_FAILED)));
    assert_eq!(h.view.buttons(), None);
}

#[test]
fn stop_updates_buttons() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.screen.on_create();

    h.screen.on_stop_clicked();

    assert!(!h.screen.session().is_running());
    assert_eq!(h.view.status(), Some(status(messages::STOPPED)));
    assert_eq!(h.view.buttons(), Some((true, false)));
    assert!(h.backend.active_requests().is_empty());
}

#[test]
fn provider_callbacks_update_status() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.screen.on_create();
    h.view.clear();

    h.backend.emit(&LocationEvent::StatusChanged {
        provider: "gps".into(),
        status: 1,
    });
    assert_eq!(h.view.status(), Some(status("GPS status: gps - 1")));

    h.backend.emit(&LocationEvent::ProviderDisabled("gps".into()));
    assert_eq!(h.view.status(), Some(status(messages::PROVIDER_DISABLED)));

    h.backend.emit(&LocationEvent::ProviderEnabled("gps".into()));
    assert_eq!(h.view.status(), Some(status(messages::PROVIDER_ENABLED)));
    assert_eq!(
        h.view.toasts(),
        vec![messages::GPS_OFF.to_owned(), messages::PROVIDER_ENABLED.to_owned()]
    );
}

#[test]
fn view_is_only_touched_on_ui_thread() {
    let ui = Arc::new(QueuedUiThread::new());
    let mut h = harness_with_ui(FakePermissionHost::granted(), ui.clone());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.set_last_known(Provider::Gps, Some(reference_fix()));

    h.screen.on_create();
    let backend = h.backend.clone();
    std::thread::spawn(move || backend.emit_fix(reference_fix())).join().unwrap();

    assert!(h.view.calls().is_empty());
    assert!(ui.pending() > 0);

    ui.drain();
    let calls = h.view.calls();
    assert_eq!(
        calls
            .iter()
            .filter(|call| matches!(call, ViewCall::Field(Field::Latitude, _)))
            .count(),
        2
    );
    assert_eq!(h.view.buttons(), Some((false, true)));
}

#[test]
fn destroy_stops_session() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.screen.on_create();

    h.screen.on_destroy();

    assert!(!h.screen.session().is_running());
    assert!(h.backend.active_requests().is_empty());
}
