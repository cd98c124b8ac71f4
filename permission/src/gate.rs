use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::{
    GrantResult, Permission, PermissionError, PermissionHost, PermissionStatus,
    REQUEST_CODE_LOCATION_PERMISSION, REQUEST_CODE_LOCATION_SETTINGS,
};

/// Queries and requests the two location permissions.
#[derive(Clone)]
pub struct PermissionGate {
    host: Arc<dyn PermissionHost>,
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate").finish_non_exhaustive()
    }
}

impl PermissionGate {
    /// Creates a gate over the given host.
    pub fn new(host: Arc<dyn PermissionHost>) -> Self {
        Self { host }
    }

    /// Live grant state of both location permissions.
    #[must_use]
    pub fn status(&self) -> PermissionStatus {
        if !self.host.uses_runtime_permissions() {
            return PermissionStatus {
                fine_location_granted: true,
                coarse_location_granted: true,
            };
        }

        PermissionStatus {
            fine_location_granted: self
                .host
                .check_permission(Permission::FineLocation)
                .is_granted(),
            coarse_location_granted: self
                .host
                .check_permission(Permission::CoarseLocation)
                .is_granted(),
        }
    }

    /// Returns `true` iff both fine and coarse location are granted.
    #[must_use]
    pub fn has_location_permission(&self) -> bool {
        self.status().all_granted()
    }

    /// Ask the host for both location permissions.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the host could not start the request.
    pub fn request_location_permission(&self) -> Result<(), PermissionError> {
        if !self.host.uses_runtime_permissions() {
            return Ok(());
        }

        debug!("requesting location permissions");
        self.host
            .request_permissions(&Permission::LOCATION, REQUEST_CODE_LOCATION_PERMISSION)
    }

    /// Whether the host recommends explaining the permission need first.
    #[must_use]
    pub fn should_show_rationale(&self) -> bool {
        self.host.uses_runtime_permissions()
            && Permission::LOCATION
                .iter()
                .any(|permission| self.host.should_show_rationale(*permission))
    }

    /// Whether the device GPS toggle is on.
    #[must_use]
    pub fn is_location_service_enabled(&self) -> bool {
        self.host.is_gps_provider_enabled()
    }

    /// Launch the location settings screen.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the screen could not be launched.
    pub fn open_location_settings(&self) -> Result<(), PermissionError> {
        debug!("opening location settings");
        self.host.open_location_settings(REQUEST_CODE_LOCATION_SETTINGS)
    }

    /// Interpret a permission-request result.
    ///
    /// Returns `true` iff `request_code` is the location request code and
    /// every requested permission was granted.
    #[must_use]
    pub fn handle_permission_result(
        &self,
        request_code: i32,
        grant_results: &[GrantResult],
    ) -> bool {
        request_code == REQUEST_CODE_LOCATION_PERMISSION
            && !grant_results.is_empty()
            && grant_results.iter().all(|result| result.is_granted())
    }
}
