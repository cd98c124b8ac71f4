//! Platform-specific permission hosts.

/// Android platform implementation.
#[cfg(target_os = "android")]
pub mod android;

pub mod desktop;
