use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use gpsview_location::{
    LocationBackend, LocationError, LocationEvent, LocationFix, LocationResult, LocationSource,
    Provider, UpdateParameters,
};
use log::debug;

/// One call to [`LocationBackend::request_updates`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRequest {
    /// Provider asked for.
    pub provider: Provider,
    /// Cadence asked for.
    pub params: UpdateParameters,
}

#[derive(Default)]
struct State {
    enabled: HashMap<Provider, bool>,
    last_known: HashMap<Provider, LocationFix>,
    registration_fault: Option<LocationError>,
    last_known_fault: Option<LocationError>,
    removal_fault: Option<LocationError>,
    requests: Vec<UpdateRequest>,
    active: Vec<(UpdateRequest, Arc<LocationSource>)>,
    retired: Vec<Arc<LocationSource>>,
    removals: usize,
}

/// Location manager whose providers and caches are set by the test.
#[derive(Default)]
pub struct FakeLocationBackend {
    state: Mutex<State>,
}

impl std::fmt::Debug for FakeLocationBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("FakeLocationBackend")
            .field("enabled", &state.enabled)
            .field("active", &state.active.len())
            .finish_non_exhaustive()
    }
}

impl FakeLocationBackend {
    /// A backend with every provider off and empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Flip a provider toggle.
    pub fn set_provider_enabled(&self, provider: Provider, enabled: bool) {
        self.state().enabled.insert(provider, enabled);
    }

    /// Set or clear the cached fix of a provider.
    pub fn set_last_known(&self, provider: Provider, fix: Option<LocationFix>) {
        let mut state = self.state();
        match fix {
            Some(fix) => state.last_known.insert(provider, fix),
            None => state.last_known.remove(&provider),
        };
    }

    /// Make every registration fail with `fault`.
    pub fn fail_registration(&self, fault: Option<LocationError>) {
        self.state().registration_fault = fault;
    }

    /// Make every last-known read fail with `fault`.
    pub fn fail_last_known(&self, fault: Option<LocationError>) {
        self.state().last_known_fault = fault;
    }

    /// Make every unregistration fail with `fault`, leaving the listener
    /// registered.
    pub fn fail_removal(&self, fault: Option<LocationError>) {
        self.state().removal_fault = fault;
    }

    /// Every successful registration, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.state().requests.clone()
    }

    /// Registrations that have not been removed.
    #[must_use]
    pub fn active_requests(&self) -> Vec<UpdateRequest> {
        self.state()
            .active
            .iter()
            .map(|(request, _)| *request)
            .collect()
    }

    /// Number of `remove_updates` calls that removed a registration.
    #[must_use]
    pub fn removals(&self) -> usize {
        self.state().removals
    }

    /// Deliver `event` to every active listener, as the platform would.
    ///
    /// Returns the number of listeners reached.
    pub fn emit(&self, event: &LocationEvent) -> usize {
        let sources: Vec<Arc<LocationSource>> = self
            .state()
            .active
            .iter()
            .map(|(_, source)| source.clone())
            .collect();
        for source in &sources {
            source.dispatch(event.clone());
        }
        sources.len()
    }

    /// Deliver a live fix to every active listener.
    pub fn emit_fix(&self, fix: LocationFix) -> usize {
        self.emit(&LocationEvent::FixReceived(fix))
    }

    /// Deliver `event` to listeners that were already removed, simulating a
    /// callback racing with unregistration.
    pub fn emit_to_retired(&self, event: &LocationEvent) {
        let retired = self.state().retired.clone();
        for source in retired {
            source.dispatch(event.clone());
        }
    }
}

impl LocationBackend for FakeLocationBackend {
    fn is_provider_enabled(&self, provider: Provider) -> bool {
        self.state().enabled.get(&provider).copied().unwrap_or(false)
    }

    fn request_updates(
        &self,
        provider: Provider,
        params: UpdateParameters,
        source: Arc<LocationSource>,
    ) -> LocationResult<()> {
        let mut state = self.state();
        if let Some(fault) = state.registration_fault.clone() {
            return Err(fault);
        }

        let request = UpdateRequest { provider, params };
        debug!("fake backend registered {request:?}");
        state.requests.push(request);
        state.active.push((request, source));
        Ok(())
    }

    fn remove_updates(&self, source: &Arc<LocationSource>) -> LocationResult<()> {
        let mut state = self.state();
        if let Some(fault) = state.removal_fault.clone() {
            return Err(fault);
        }
        let before = state.active.len();
        let (removed, kept): (Vec<_>, Vec<_>) = state
            .active
            .drain(..)
            .partition(|(_, active)| Arc::ptr_eq(active, source));
        state.active = kept;
        state
            .retired
            .extend(removed.into_iter().map(|(_, source)| source));
        if state.active.len() < before {
            state.removals += 1;
        }
        Ok(())
    }

    fn last_known_fix(&self, provider: Provider) -> LocationResult<Option<LocationFix>> {
        let state = self.state();
        if let Some(fault) = state.last_known_fault.clone() {
            return Err(fault);
        }
        Ok(state.last_known.get(&provider).copied())
    }
}
