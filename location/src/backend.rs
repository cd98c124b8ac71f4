use std::sync::Arc;

use crate::{LocationFix, LocationResult, LocationSource, Provider, UpdateParameters};

/// The platform location manager.
///
/// Implementations map platform authorization failures to
/// [`LocationError::SecurityFault`](crate::LocationError::SecurityFault).
pub trait LocationBackend: Send + Sync {
    /// Whether `provider` is currently switched on.
    fn is_provider_enabled(&self, provider: Provider) -> bool;

    /// Register `source` for updates from `provider`.
    ///
    /// # Errors
    /// Returns an error if the platform rejects the registration.
    fn request_updates(
        &self,
        provider: Provider,
        params: UpdateParameters,
        source: Arc<LocationSource>,
    ) -> LocationResult<()>;

    /// Remove every registration made for `source`. Must not return before
    /// the platform has dropped the listener.
    ///
    /// # Errors
    /// Returns an error if the platform fails to unregister.
    fn remove_updates(&self, source: &Arc<LocationSource>) -> LocationResult<()>;

    /// The most recent fix cached by `provider`, if any.
    ///
    /// # Errors
    /// Returns an error if the platform refuses the read.
    fn last_known_fix(&self, provider: Provider) -> LocationResult<Option<LocationFix>>;
}
