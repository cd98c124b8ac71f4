//! Location permission gate.
//!
//! This crate answers one question for the location screen: may we read the
//! device position right now? It wraps the host platform's runtime permission
//! system behind [`PermissionHost`] so the rest of the workspace can be driven
//! by an in-memory host in tests.

#![warn(missing_docs)]

mod gate;

/// Platform-specific implementations.
pub mod sys;

pub use gate::PermissionGate;

/// Request code used when asking for both location permissions.
pub const REQUEST_CODE_LOCATION_PERMISSION: i32 = 1001;

/// Request code used when launching the location settings screen.
pub const REQUEST_CODE_LOCATION_SETTINGS: i32 = 1002;

/// Permissions the location screen needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Precise location (GPS).
    FineLocation,
    /// Approximate location (network).
    CoarseLocation,
}

impl Permission {
    /// Both location permissions, in the order they are requested.
    pub const LOCATION: [Self; 2] = [Self::FineLocation, Self::CoarseLocation];

    /// Platform identifier of the permission.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
        }
    }
}

/// Outcome of a single permission check or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantResult {
    /// The permission is granted.
    Granted,
    /// The permission is denied.
    Denied,
}

impl GrantResult {
    /// Platform code for a granted permission.
    pub const GRANTED_CODE: i32 = 0;

    /// Convert a raw platform grant code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        if code == Self::GRANTED_CODE {
            Self::Granted
        } else {
            Self::Denied
        }
    }

    /// Returns `true` if granted.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Live state of both location permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionStatus {
    /// Whether precise location is granted.
    pub fine_location_granted: bool,
    /// Whether approximate location is granted.
    pub coarse_location_granted: bool,
}

impl PermissionStatus {
    /// Returns `true` if both permissions are granted.
    #[must_use]
    pub const fn all_granted(self) -> bool {
        self.fine_location_granted && self.coarse_location_granted
    }
}

/// Errors that can occur while talking to the host permission system.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PermissionError {
    /// The host cannot perform this operation.
    #[error("operation not supported on this platform")]
    NotSupported,
    /// The host reported an error.
    #[error("platform error: {0}")]
    Platform(String),
}

/// The host platform's permission system.
///
/// Implementations read state live on every call; nothing is cached.
pub trait PermissionHost: Send + Sync {
    /// Whether the host grants permissions at runtime. Hosts that predate
    /// runtime permissions grant everything declared at install time.
    fn uses_runtime_permissions(&self) -> bool;

    /// Current grant state of `permission`.
    fn check_permission(&self, permission: Permission) -> GrantResult;

    /// Start the asynchronous request flow. The result comes back through
    /// the host's permission-result callback tagged with `request_code`.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the host could not start the flow.
    fn request_permissions(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError>;

    /// Whether the host recommends explaining `permission` before asking again.
    fn should_show_rationale(&self, permission: Permission) -> bool;

    /// Whether the GPS provider toggle is on.
    fn is_gps_provider_enabled(&self) -> bool;

    /// Launch the location settings screen, tagged with `request_code`.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the screen could not be launched.
    fn open_location_settings(&self, request_code: i32) -> Result<(), PermissionError>;
}
