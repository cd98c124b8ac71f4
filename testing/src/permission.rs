use std::sync::{Mutex, MutexGuard};

use gpsview_permission::{GrantResult, Permission, PermissionError, PermissionHost};

#[derive(Debug, Default)]
struct State {
    legacy: bool,
    fine: bool,
    coarse: bool,
    rationale: bool,
    gps_enabled: bool,
    fail_requests: bool,
    requests: Vec<(Vec<Permission>, i32)>,
    settings_launches: Vec<i32>,
}

/// Permission host whose answers are set by the test.
#[derive(Debug, Default)]
pub struct FakePermissionHost {
    state: Mutex<State>,
}

impl FakePermissionHost {
    /// A runtime-permission host with nothing granted and GPS off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime-permission host with both permissions granted and GPS on.
    #[must_use]
    pub fn granted() -> Self {
        let host = Self::new();
        host.grant_all();
        host.set_gps_enabled(true);
        host
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Grant both permissions.
    pub fn grant_all(&self) {
        self.set_granted(true, true);
    }

    /// Revoke both permissions.
    pub fn revoke_all(&self) {
        self.set_granted(false, false);
    }

    /// Set each permission individually.
    pub fn set_granted(&self, fine: bool, coarse: bool) {
        let mut state = self.state();
        state.fine = fine;
        state.coarse = coarse;
    }

    /// Behave like a host predating runtime permissions.
    pub fn set_legacy(&self, legacy: bool) {
        self.state().legacy = legacy;
    }

    /// Whether the host recommends a rationale.
    pub fn set_rationale(&self, rationale: bool) {
        self.state().rationale = rationale;
    }

    /// Flip the GPS toggle reported by the host.
    pub fn set_gps_enabled(&self, enabled: bool) {
        self.state().gps_enabled = enabled;
    }

    /// Make request and settings launches fail.
    pub fn set_fail_requests(&self, fail: bool) {
        self.state().fail_requests = fail;
    }

    /// Every permission request made so far.
    #[must_use]
    pub fn requests(&self) -> Vec<(Vec<Permission>, i32)> {
        self.state().requests.clone()
    }

    /// Request codes of every settings launch so far.
    #[must_use]
    pub fn settings_launches(&self) -> Vec<i32> {
        self.state().settings_launches.clone()
    }
}

impl PermissionHost for FakePermissionHost {
    fn uses_runtime_permissions(&self) -> bool {
        !self.state().legacy
    }

    fn check_permission(&self, permission: Permission) -> GrantResult {
        let state = self.state();
        let granted = match permission {
            Permission::FineLocation => state.fine,
            Permission::CoarseLocation => state.coarse,
        };
        if granted {
            GrantResult::Granted
        } else {
            GrantResult::Denied
        }
    }

    fn request_permissions(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError> {
        let mut state = self.state();
        if state.fail_requests {
            return Err(PermissionError::Platform("request rejected".into()));
        }
        state.requests.push((permissions.to_vec(), request_code));
        Ok(())
    }

    fn should_show_rationale(&self, _permission: Permission) -> bool {
        self.state().rationale
    }

    fn is_gps_provider_enabled(&self) -> bool {
        self.state().gps_enabled
    }

    fn open_location_settings(&self, request_code: i32) -> Result<(), PermissionError> {
        let mut state = self.state();
        if state.fail_requests {
            return Err(PermissionError::NotSupported);
        }
        state.settings_launches.push(request_code);
        Ok(())
    }
}
