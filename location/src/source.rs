use std::fmt;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::{LocationDelegate, LocationEvent, LocationFix};

/// Listener handed to the platform for one registration.
///
/// Raw provider callbacks are turned into [`LocationEvent`]s and passed to the
/// delegate unchanged. Once [`detach`](Self::detach) is called the source
/// drops everything it receives, so a late callback from the platform can no
/// longer reach the delegate.
pub struct LocationSource {
    delegate: Mutex<Option<Arc<dyn LocationDelegate>>>,
}

impl fmt::Debug for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationSource")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl LocationSource {
    /// Creates a source forwarding to `delegate`.
    pub fn new(delegate: Arc<dyn LocationDelegate>) -> Self {
        Self {
            delegate: Mutex::new(Some(delegate)),
        }
    }

    /// Whether events still reach the delegate.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.delegate.lock().is_ok_and(|guard| guard.is_some())
    }

    /// Stop forwarding events.
    pub fn detach(&self) {
        match self.delegate.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    /// A provider reported a new position. `None` is ignored.
    pub fn on_location_changed(&self, fix: Option<LocationFix>) {
        let Some(fix) = fix else {
            return;
        };

        debug!(
            "location update: lat {}, lon {}, accuracy {}m, speed {}m/s",
            fix.latitude, fix.longitude, fix.accuracy, fix.speed
        );
        self.dispatch(LocationEvent::FixReceived(fix));
    }

    /// A provider changed status.
    pub fn on_status_changed(&self, provider: &str, status: i32) {
        debug!("provider {provider} status changed to {status}");
        self.dispatch(LocationEvent::StatusChanged {
            provider: provider.to_owned(),
            status,
        });
    }

    /// A provider was switched on.
    pub fn on_provider_enabled(&self, provider: &str) {
        debug!("provider {provider} enabled");
        self.dispatch(LocationEvent::ProviderEnabled(provider.to_owned()));
    }

    /// A provider was switched off.
    pub fn on_provider_disabled(&self, provider: &str) {
        debug!("provider {provider} disabled");
        self.dispatch(LocationEvent::ProviderDisabled(provider.to_owned()));
    }

    /// Decode a JSON event from the platform bridge and forward it.
    ///
    /// Malformed payloads are logged and dropped.
    pub fn dispatch_json(&self, json: &str) {
        match serde_json::from_str::<LocationEvent>(json) {
            Ok(LocationEvent::FixReceived(fix)) => self.on_location_changed(Some(fix)),
            Ok(LocationEvent::StatusChanged { provider, status }) => {
                self.on_status_changed(&provider, status);
            }
            Ok(LocationEvent::ProviderEnabled(provider)) => self.on_provider_enabled(&provider),
            Ok(LocationEvent::ProviderDisabled(provider)) => self.on_provider_disabled(&provider),
            Err(err) => warn!("dropping malformed location event: {err}"),
        }
    }

    /// Forward an already normalized event.
    pub fn dispatch(&self, event: LocationEvent) {
        let delegate = match self.delegate.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        match delegate {
            Some(delegate) => delegate.on_event(event),
            None => debug!("source detached, dropping {event:?}"),
        }
    }
}
