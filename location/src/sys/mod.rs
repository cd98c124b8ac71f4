//! Platform-specific location backends.

/// Android platform implementation.
#[cfg(target_os = "android")]
pub mod android;
