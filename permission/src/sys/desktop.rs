//! Desktop permission host.
//!
//! Desktop systems have no runtime permission prompt for location, so this
//! host behaves like an Android device that predates runtime permissions.

use crate::{GrantResult, Permission, PermissionError, PermissionHost};

/// Host for platforms without runtime permissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopPermissionHost {
    gps_enabled: bool,
}

impl DesktopPermissionHost {
    /// Create a host reporting the given GPS toggle state.
    #[must_use]
    pub const fn new(gps_enabled: bool) -> Self {
        Self { gps_enabled }
    }
}

impl PermissionHost for DesktopPermissionHost {
    fn uses_runtime_permissions(&self) -> bool {
        false
    }

    fn check_permission(&self, _permission: Permission) -> GrantResult {
        GrantResult::Granted
    }

    fn request_permissions(
        &self,
        _permissions: &[Permission],
        _request_code: i32,
    ) -> Result<(), PermissionError> {
        Ok(())
    }

    fn should_show_rationale(&self, _permission: Permission) -> bool {
        false
    }

    fn is_gps_provider_enabled(&self) -> bool {
        self.gps_enabled
    }

    fn open_location_settings(&self, _request_code: i32) -> Result<(), PermissionError> {
        Err(PermissionError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{GrantResult, PermissionGate, REQUEST_CODE_LOCATION_PERMISSION};

    #[test]
    fn gate_is_granted_without_prompt() {
        let gate = PermissionGate::new(Arc::new(DesktopPermissionHost::new(true)));

        assert!(gate.has_location_permission());
        assert!(gate.status().all_granted());
        assert!(!gate.should_show_rationale());
        assert!(gate.request_location_permission().is_ok());
        assert!(gate.is_location_service_enabled());
        assert!(gate.handle_permission_result(
            REQUEST_CODE_LOCATION_PERMISSION,
            &[GrantResult::Granted, GrantResult::Granted],
        ));
    }

    #[test]
    fn settings_screen_is_unsupported() {
        let gate = PermissionGate::new(Arc::new(DesktopPermissionHost::new(false)));

        assert!(!gate.is_location_service_enabled());
        assert!(matches!(
            gate.open_location_settings(),
            Err(PermissionError::NotSupported)
        ));
    }
}
