//! In-memory stand-ins for the host platform.
//!
//! The fakes record every call made to them and let a test or the simulator
//! flip provider toggles, grant or revoke permissions, inject security faults
//! and push provider callbacks as if they came from the platform.

#![warn(missing_docs)]

mod location;
mod permission;
mod recorder;

pub use location::{FakeLocationBackend, UpdateRequest};
pub use permission::FakePermissionHost;
pub use recorder::{RecordingDelegate, RecordingView, ViewCall};

use gpsview_location::LocationFix;

/// The reference fix used across tests: a point in Mountain View.
#[must_use]
pub const fn reference_fix() -> LocationFix {
    LocationFix {
        latitude: 37.421,
        longitude: -122.084,
        altitude: 30.0,
        accuracy: 5.0,
        speed: 0.0,
        bearing: 0.0,
    }
}
