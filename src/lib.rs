//! # gpsview
//!
//! A live GPS readout for Android, split so that everything except the
//! platform glue runs and is tested on the desktop.
//!
//! ## Features
//!
//! - `permission`: location permission gate and platform permission hosts.
//! - `location`: the location session state machine (implies `permission`).
//! - `presenter`: the headless screen presenter (implies `location`).
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! gpsview = { version = "0.1", features = ["location"] }
//! ```
//!
//! ```rust,ignore
//! use gpsview::location::{LocationSession, PermissionGate, channel};
//!
//! let (delegate, events) = channel();
//! let mut session = LocationSession::new(PermissionGate::new(host), Some(backend), delegate);
//! let provider = session.start()?;
//! ```

#[cfg(feature = "permission")]
pub use gpsview_permission as permission;

#[cfg(feature = "location")]
pub use gpsview_location as location;

#[cfg(feature = "presenter")]
pub use gpsview_presenter as presenter;
