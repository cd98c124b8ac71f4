//! Location acquisition for the GPS screen.
//!
//! The crate is split into three layers:
//!
//! - [`LocationBackend`] is the platform location manager (provider toggles,
//!   update registration, last-known cache).
//! - [`LocationSource`] normalizes raw provider callbacks into
//!   [`LocationEvent`]s for a single [`LocationDelegate`].
//! - [`LocationSession`] is the start/stop state machine that picks a
//!   provider (GPS first, network as fallback) and owns the registration.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use gpsview_location::{LocationSession, channel};
//!
//! let (delegate, events) = channel();
//! let mut session = LocationSession::new(gate, Some(backend), delegate);
//! let provider = session.start()?;
//! println!("running on {provider}");
//! ```

#![warn(missing_docs)]

mod backend;
mod channel;
mod event;
mod session;
mod source;

/// Platform-specific implementations.
pub mod sys;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use backend::LocationBackend;
pub use channel::{ChannelDelegate, channel};
pub use event::{LocationDelegate, LocationEvent};
pub use gpsview_permission::{PermissionGate, PermissionStatus};
pub use session::{LocationSession, SessionState};
pub use source::LocationSource;

/// One position sample reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters above the WGS84 ellipsoid.
    pub altitude: f64,
    /// Estimated horizontal accuracy radius in meters.
    pub accuracy: f32,
    /// Ground speed in meters per second.
    pub speed: f32,
    /// Bearing in degrees.
    pub bearing: f32,
}

/// A named source of position fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Satellite positioning.
    Gps,
    /// Cell and Wi-Fi based positioning.
    Network,
}

impl Provider {
    /// Providers in selection order.
    pub const PREFERENCE: [Self; 2] = [Self::Gps, Self::Network];

    /// Platform name of the provider.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gps => "gps",
            Self::Network => "network",
        }
    }

    /// Look up a provider by its platform name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::PREFERENCE
            .into_iter()
            .find(|provider| provider.name() == name)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cadence of location updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateParameters {
    /// Minimum time between updates, in milliseconds.
    pub min_interval_ms: u64,
    /// Minimum movement between updates, in meters.
    pub min_distance_m: f32,
}

impl UpdateParameters {
    /// Default minimum update interval.
    pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;
    /// Default minimum movement threshold.
    pub const DEFAULT_MIN_DISTANCE_M: f32 = 1.0;
}

impl Default for UpdateParameters {
    fn default() -> Self {
        Self {
            min_interval_ms: Self::DEFAULT_MIN_INTERVAL_MS,
            min_distance_m: Self::DEFAULT_MIN_DISTANCE_M,
        }
    }
}

/// Errors that can occur while acquiring location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// Location permission is not granted.
    #[error("location permission denied")]
    PermissionDenied,
    /// Neither the GPS nor the network provider is enabled.
    #[error("no location provider available")]
    ProviderUnavailable,
    /// The platform location manager could not be obtained.
    #[error("location manager unavailable")]
    ManagerUnavailable,
    /// The platform refused access despite an apparent grant.
    #[error("security fault: {message}")]
    SecurityFault {
        /// Platform-provided message.
        message: String,
    },
    /// The platform reported an error.
    #[error("platform error: {message}")]
    Platform {
        /// Platform-provided message.
        message: String,
    },
    /// A bridge payload could not be encoded or decoded.
    #[error("serialization error: {message}")]
    Serialization {
        /// Serializer message.
        message: String,
    },
}

/// Convenience result type for location operations.
pub type LocationResult<T> = Result<T, LocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names() {
        assert_eq!(Provider::Gps.name(), "gps");
        assert_eq!(Provider::Network.to_string(), "network");
        assert_eq!(Provider::from_name("network"), Some(Provider::Network));
        assert_eq!(Provider::from_name("fused"), None);
    }

    #[test]
    fn default_update_parameters() {
        let params = UpdateParameters::default();
        assert_eq!(params.min_interval_ms, 1000);
        assert!((params.min_distance_m - 1.0).abs() < f32::EPSILON);
    }
}
