use std::fmt;
use std::sync::Arc;

use gpsview_permission::PermissionGate;
use log::{debug, error, warn};

use crate::{
    LocationBackend, LocationDelegate, LocationError, LocationFix, LocationResult,
    LocationSource, Provider, UpdateParameters,
};

/// Whether a session holds a provider registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No registration.
    #[default]
    Stopped,
    /// Registered with the given provider.
    Running(Provider),
}

/// Start/stop state machine over one platform location manager.
///
/// At most one registration exists per session. Dropping the session stops it.
pub struct LocationSession {
    permissions: PermissionGate,
    backend: Option<Arc<dyn LocationBackend>>,
    delegate: Arc<dyn LocationDelegate>,
    params: UpdateParameters,
    state: SessionState,
    source: Option<Arc<LocationSource>>,
}

impl fmt::Debug for LocationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationSession")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("has_backend", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}

impl LocationSession {
    /// Creates a stopped session.
    ///
    /// `backend` is `None` when the platform location manager could not be
    /// obtained; every start then fails with
    /// [`LocationError::ManagerUnavailable`].
    pub fn new(
        permissions: PermissionGate,
        backend: Option<Arc<dyn LocationBackend>>,
        delegate: Arc<dyn LocationDelegate>,
    ) -> Self {
        Self {
            permissions,
            backend,
            delegate,
            params: UpdateParameters::default(),
            state: SessionState::Stopped,
            source: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a provider is registered.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running(_))
    }

    /// The registered provider, if running.
    #[must_use]
    pub const fn active_provider(&self) -> Option<Provider> {
        match self.state {
            SessionState::Running(provider) => Some(provider),
            SessionState::Stopped => None,
        }
    }

    /// Update cadence used for the next registration.
    #[must_use]
    pub const fn update_parameters(&self) -> UpdateParameters {
        self.params
    }

    /// Register for updates, preferring GPS over network.
    ///
    /// On success the last known fix of the chosen provider, if any, has been
    /// delivered to the delegate before this returns. Calling `start` while
    /// running keeps the current registration once permission is confirmed.
    ///
    /// # Errors
    /// - [`LocationError::PermissionDenied`] if location permission is missing.
    /// - [`LocationError::ManagerUnavailable`] if there is no location manager.
    /// - [`LocationError::ProviderUnavailable`] if both providers are off.
    /// - [`LocationError::SecurityFault`] or [`LocationError::Platform`] if the
    ///   platform rejects the registration or the last-known read.
    ///
    /// A permission or manager error leaves the state unchanged; every other
    /// error leaves the session stopped.
    pub fn start(&mut self) -> LocationResult<Provider> {
        if !self.permissions.has_location_permission() {
            warn!("cannot start location session without permission");
            return Err(LocationError::PermissionDenied);
        }

        let Some(backend) = self.backend.clone() else {
            error!("cannot start location session without a location manager");
            return Err(LocationError::ManagerUnavailable);
        };

        if let SessionState::Running(provider) = self.state {
            debug!("start ignored, already running on {provider}");
            return Ok(provider);
        }

        let Some(provider) = Provider::PREFERENCE
            .into_iter()
            .find(|provider| backend.is_provider_enabled(*provider))
        else {
            error!("neither gps nor network provider is enabled");
            return Err(LocationError::ProviderUnavailable);
        };

        let source = Arc::new(LocationSource::new(self.delegate.clone()));
        debug!(
            "requesting {provider} updates every {}ms / {}m",
            self.params.min_interval_ms, self.params.min_distance_m
        );
        if let Err(err) = backend.request_updates(provider, self.params, source.clone()) {
            error!("failed to register for {provider} updates: {err}");
            source.detach();
            return Err(err);
        }

        self.source = Some(source.clone());
        self.state = SessionState::Running(provider);
        debug!("location session running on {provider}");

        match backend.last_known_fix(provider) {
            Ok(Some(fix)) => source.on_location_changed(Some(fix)),
            Ok(None) => debug!("no last known {provider} fix, waiting for live updates"),
            Err(err) => {
                error!("failed to read last known {provider} fix: {err}");
                self.stop();
                return Err(err);
            }
        }

        Ok(provider)
    }

    /// Unregister and stop. Does nothing when already stopped.
    ///
    /// No event reaches the delegate after this returns.
    pub fn stop(&mut self) {
        let Some(source) = self.source.take() else {
            self.state = SessionState::Stopped;
            return;
        };

        source.detach();
        if let Some(backend) = &self.backend {
            if let Err(err) = backend.remove_updates(&source) {
                error!("failed to remove location updates: {err}");
            }
        }

        self.state = SessionState::Stopped;
        debug!("location session stopped");
    }

    /// Read the cached fix without waiting for an update.
    ///
    /// Prefers the GPS cache and falls back to the network cache. Returns
    /// `Ok(None)` when neither holds a fix.
    ///
    /// # Errors
    /// - [`LocationError::PermissionDenied`] if location permission is missing.
    /// - [`LocationError::ManagerUnavailable`] if there is no location manager.
    /// - Any error the platform raises while reading the cache.
    pub fn current_location(&self) -> LocationResult<Option<LocationFix>> {
        if !self.permissions.has_location_permission() {
            warn!("cannot read location without permission");
            return Err(LocationError::PermissionDenied);
        }

        let backend = self
            .backend
            .as_ref()
            .ok_or(LocationError::ManagerUnavailable)?;

        for provider in Provider::PREFERENCE {
            if !backend.is_provider_enabled(provider) {
                continue;
            }
            match backend.last_known_fix(provider) {
                Ok(Some(fix)) => return Ok(Some(fix)),
                Ok(None) => {}
                Err(err) => {
                    error!("failed to read last known {provider} fix: {err}");
                    return Err(err);
                }
            }
        }

        Ok(None)
    }

    /// Change the update cadence.
    ///
    /// The session is stopped, and restarted with `params` if it was running.
    ///
    /// # Errors
    /// Returns the restart error, see [`start`](Self::start).
    pub fn set_update_parameters(&mut self, params: UpdateParameters) -> LocationResult<()> {
        let was_running = self.is_running();
        self.stop();
        self.params = params;

        if was_running {
            self.start()?;
        }
        Ok(())
    }
}

impl Drop for LocationSession {
    fn drop(&mut self) {
        self.stop();
    }
}
