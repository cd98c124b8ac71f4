use std::sync::Arc;

use gpsview_location::{
    LocationBackend, LocationError, LocationEvent, LocationSession, PermissionGate, Provider,
    SessionState, UpdateParameters, channel,
};
use gpsview_testing::{
    FakeLocationBackend, FakePermissionHost, RecordingDelegate, UpdateRequest, reference_fix,
};

struct Harness {
    host: Arc<FakePermissionHost>,
    backend: Arc<FakeLocationBackend>,
    delegate: Arc<RecordingDelegate>,
    session: LocationSession,
}

fn harness(host: FakePermissionHost) -> Harness {
    let host = Arc::new(host);
    let backend = Arc::new(FakeLocationBackend::new());
    let delegate = Arc::new(RecordingDelegate::new());
    let session = LocationSession::new(
        PermissionGate::new(host.clone()),
        Some(backend.clone() as Arc<dyn LocationBackend>),
        delegate.clone(),
    );
    Harness {
        host,
        backend,
        delegate,
        session,
    }
}

fn security_fault() -> LocationError {
    LocationError::SecurityFault {
        message: "permission revoked".into(),
    }
}

#[test]
fn start_without_permission_registers_nothing() {
    let mut h = harness(FakePermissionHost::new());
    h.backend.set_provider_enabled(Provider::Gps, true);

    assert_eq!(h.session.start(), Err(LocationError::PermissionDenied));
    assert_eq!(h.session.state(), SessionState::Stopped);
    assert!(h.backend.requests().is_empty());
}

#[test]
fn start_requires_both_permissions() {
    let host = FakePermissionHost::new();
    host.set_granted(true, false);
    let mut h = harness(host);
    h.backend.set_provider_enabled(Provider::Gps, true);

    assert_eq!(h.session.start(), Err(LocationError::PermissionDenied));
    assert!(!h.session.is_running());
}

#[test]
fn start_without_manager_fails() {
    let delegate = Arc::new(RecordingDelegate::new());
    let mut session = LocationSession::new(
        PermissionGate::new(Arc::new(FakePermissionHost::granted())),
        None,
        delegate,
    );

    assert_eq!(session.start(), Err(LocationError::ManagerUnavailable));
    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(
        session.current_location(),
        Err(LocationError::ManagerUnavailable)
    );
}

#[test]
fn gps_preferred_and_last_fix_emitted_before_return() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.set_provider_enabled(Provider::Network, true);
    h.backend.set_last_known(Provider::Gps, Some(reference_fix()));

    assert_eq!(h.session.start(), Ok(Provider::Gps));

    assert_eq!(h.session.state(), SessionState::Running(Provider::Gps));
    assert_eq!(
        h.delegate.events(),
        vec![LocationEvent::FixReceived(reference_fix())]
    );
    assert_eq!(
        h.backend.requests(),
        vec![UpdateRequest {
            provider: Provider::Gps,
            params: UpdateParameters {
                min_interval_ms: 1000,
                min_distance_m: 1.0,
            },
        }]
    );
}

#[test]
fn network_fallback_without_cached_fix() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Network, true);

    assert_eq!(h.session.start(), Ok(Provider::Network));

    assert_eq!(h.session.state(), SessionState::Running(Provider::Network));
    assert_eq!(h.session.active_provider(), Some(Provider::Network));
    assert!(h.delegate.events().is_empty());

    h.backend.emit_fix(reference_fix());
    assert_eq!(
        h.delegate.events(),
        vec![LocationEvent::FixReceived(reference_fix())]
    );
}

#[test]
fn no_provider_available() {
    let mut h = harness(FakePermissionHost::granted());

    assert_eq!(h.session.start(), Err(LocationError::ProviderUnavailable));
    assert_eq!(h.session.state(), SessionState::Stopped);
    assert!(h.backend.requests().is_empty());
}

#[test]
fn registration_security_fault_leaves_session_stopped() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.fail_registration(Some(security_fault()));

    assert_eq!(h.session.start(), Err(security_fault()));
    assert_eq!(h.session.state(), SessionState::Stopped);
    assert!(h.backend.active_requests().is_empty());
}

#[test]
fn last_known_security_fault_unregisters() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.fail_last_known(Some(security_fault()));

    assert_eq!(h.session.start(), Err(security_fault()));
    assert_eq!(h.session.state(), SessionState::Stopped);
    assert_eq!(h.backend.requests().len(), 1);
    assert!(h.backend.active_requests().is_empty());
    assert_eq!(h.backend.removals(), 1);
}

#[test]
fn start_and_stop_are_idempotent() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);

    h.session.stop();
    assert_eq!(h.session.state(), SessionState::Stopped);
    assert_eq!(h.backend.removals(), 0);

    assert_eq!(h.session.start(), Ok(Provider::Gps));
    assert_eq!(h.session.start(), Ok(Provider::Gps));
    assert_eq!(h.backend.requests().len(), 1);
    assert!(h.session.is_running());

    h.session.stop();
    h.session.stop();
    assert!(!h.session.is_running());
    assert_eq!(h.backend.removals(), 1);
    assert!(h.backend.active_requests().is_empty());
}

#[test]
fn running_state_tracks_latest_call() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Network, true);

    let script: [(bool, bool); 6] = [
        (true, true),
        (false, false),
        (false, false),
        (true, true),
        (true, true),
        (false, false),
    ];
    for (start, expect_running) in script {
        if start {
            assert!(h.session.start().is_ok());
        } else {
            h.session.stop();
        }
        assert_eq!(h.session.is_running(), expect_running);
    }
}

#[test]
fn no_events_after_stop() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.session.start().unwrap();
    h.session.stop();

    h.backend.emit_to_retired(&LocationEvent::ProviderDisabled("gps".into()));
    assert_eq!(h.backend.emit_fix(reference_fix()), 0);
    assert!(h.delegate.events().is_empty());
}

#[test]
fn revoked_permission_blocks_restart() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.session.start().unwrap();

    h.host.revoke_all();
    assert!(h.session.is_running());

    h.session.stop();
    assert_eq!(h.session.start(), Err(LocationError::PermissionDenied));
    assert_eq!(h.backend.requests().len(), 1);
}

#[test]
fn revoked_permission_fails_start_while_running() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.session.start().unwrap();

    h.host.revoke_all();

    assert_eq!(h.session.start(), Err(LocationError::PermissionDenied));
    assert_eq!(h.session.state(), SessionState::Running(Provider::Gps));
    assert_eq!(h.backend.requests().len(), 1);
}

#[test]
fn stop_survives_unregistration_fault() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.session.start().unwrap();
    h.backend.fail_removal(Some(LocationError::Platform {
        message: "listener not registered".into(),
    }));

    h.session.stop();

    assert_eq!(h.session.state(), SessionState::Stopped);
    assert_eq!(h.backend.removals(), 0);
    assert_eq!(h.backend.emit_fix(reference_fix()), 1);
    assert!(h.delegate.events().is_empty());

    assert_eq!(h.session.start(), Ok(Provider::Gps));
    assert_eq!(h.backend.requests().len(), 2);
    h.backend.emit_fix(reference_fix());
    assert_eq!(
        h.delegate.events(),
        vec![LocationEvent::FixReceived(reference_fix())]
    );
}

#[test]
fn current_location_reports_cache_fault() {
    let h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.fail_last_known(Some(security_fault()));

    assert_eq!(h.session.current_location(), Err(security_fault()));
}

#[test]
fn legacy_host_needs_no_grant() {
    let host = FakePermissionHost::new();
    host.set_legacy(true);
    let mut h = harness(host);
    h.backend.set_provider_enabled(Provider::Gps, true);

    assert_eq!(h.session.start(), Ok(Provider::Gps));
}

#[test]
fn current_location_prefers_gps_cache() {
    let h = harness(FakePermissionHost::granted());
    let network_fix = gpsview_location::LocationFix {
        latitude: 48.858,
        longitude: 2.294,
        ..reference_fix()
    };
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.set_provider_enabled(Provider::Network, true);
    h.backend.set_last_known(Provider::Network, Some(network_fix));

    assert_eq!(h.session.current_location(), Ok(Some(network_fix)));

    h.backend.set_last_known(Provider::Gps, Some(reference_fix()));
    assert_eq!(h.session.current_location(), Ok(Some(reference_fix())));

    h.backend.set_last_known(Provider::Gps, None);
    h.backend.set_last_known(Provider::Network, None);
    assert_eq!(h.session.current_location(), Ok(None));
}

#[test]
fn current_location_skips_disabled_providers() {
    let h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Network, true);
    h.backend.set_last_known(Provider::Gps, Some(reference_fix()));

    assert_eq!(h.session.current_location(), Ok(None));
}

#[test]
fn current_location_needs_permission() {
    let h = harness(FakePermissionHost::new());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.backend.set_last_known(Provider::Gps, Some(reference_fix()));

    assert_eq!(
        h.session.current_location(),
        Err(LocationError::PermissionDenied)
    );
}

#[test]
fn update_parameters_restart_running_session() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    h.session.start().unwrap();

    let params = UpdateParameters {
        min_interval_ms: 5000,
        min_distance_m: 10.0,
    };
    h.session.set_update_parameters(params).unwrap();

    assert!(h.session.is_running());
    assert_eq!(h.session.update_parameters(), params);
    assert_eq!(h.backend.removals(), 1);
    assert_eq!(
        h.backend.active_requests(),
        vec![UpdateRequest {
            provider: Provider::Gps,
            params,
        }]
    );
}

#[test]
fn update_parameters_on_stopped_session_only_stores() {
    let mut h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);

    let params = UpdateParameters {
        min_interval_ms: 250,
        min_distance_m: 0.0,
    };
    h.session.set_update_parameters(params).unwrap();

    assert!(!h.session.is_running());
    assert!(h.backend.requests().is_empty());

    h.session.start().unwrap();
    assert_eq!(h.backend.requests()[0].params, params);
}

#[test]
fn dropping_session_unregisters() {
    let h = harness(FakePermissionHost::granted());
    h.backend.set_provider_enabled(Provider::Gps, true);
    let Harness {
        backend,
        mut session,
        ..
    } = h;
    session.start().unwrap();

    drop(session);
    assert!(backend.active_requests().is_empty());
}

#[tokio::test]
async fn channel_delegate_carries_events_across_threads() {
    let host = Arc::new(FakePermissionHost::granted());
    let backend = Arc::new(FakeLocationBackend::new());
    backend.set_provider_enabled(Provider::Gps, true);
    let (delegate, events) = channel();
    let mut session = LocationSession::new(
        PermissionGate::new(host),
        Some(backend.clone() as Arc<dyn LocationBackend>),
        delegate,
    );
    session.start().unwrap();

    let platform = {
        let backend = backend.clone();
        std::thread::spawn(move || {
            backend.emit(&LocationEvent::StatusChanged {
                provider: "gps".into(),
                status: 2,
            });
            backend.emit_fix(reference_fix());
        })
    };
    platform.join().unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        LocationEvent::StatusChanged {
            provider: "gps".into(),
            status: 2,
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        LocationEvent::FixReceived(reference_fix())
    );
}
