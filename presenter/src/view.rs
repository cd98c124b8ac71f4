/// Readout fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Latitude in degrees.
    Latitude,
    /// Longitude in degrees.
    Longitude,
    /// Altitude in meters.
    Altitude,
    /// Accuracy radius in meters.
    Accuracy,
    /// Speed in meters per second.
    Speed,
    /// Bearing in degrees.
    Bearing,
}

impl Field {
    /// All fields in display order.
    pub const ALL: [Self; 6] = [
        Self::Latitude,
        Self::Longitude,
        Self::Altitude,
        Self::Accuracy,
        Self::Speed,
        Self::Bearing,
    ];

    /// Stable index shared with the host widget table.
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            Self::Latitude => 0,
            Self::Longitude => 1,
            Self::Altitude => 2,
            Self::Accuracy => 3,
            Self::Speed => 4,
            Self::Bearing => 5,
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::Altitude => "Altitude",
            Self::Accuracy => "Accuracy",
            Self::Speed => "Speed",
            Self::Bearing => "Bearing",
        }
    }
}

/// Modal dialogs the screen can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialog {
    /// Explains why location permission is needed; confirming re-requests it.
    PermissionRationale,
    /// Location service is off; confirming opens the location settings.
    GpsDisabled,
}

impl Dialog {
    /// Stable index shared with the host.
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            Self::PermissionRationale => 0,
            Self::GpsDisabled => 1,
        }
    }

    /// Look up a dialog by its host index.
    #[must_use]
    pub const fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::PermissionRationale),
            1 => Some(Self::GpsDisabled),
            _ => None,
        }
    }

    /// Dialog title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::PermissionRationale => "Location permission required",
            Self::GpsDisabled => "GPS is disabled",
        }
    }

    /// Dialog body.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PermissionRationale => "Allow location access to enable GPS",
            Self::GpsDisabled => "Turn on GPS to use live positioning",
        }
    }

    /// Label of the confirming button.
    #[must_use]
    pub const fn confirm_label(self) -> &'static str {
        match self {
            Self::PermissionRationale => "OK",
            Self::GpsDisabled => "Open settings",
        }
    }
}

/// The widget surface of the screen.
///
/// Methods are only ever called from the UI thread.
pub trait ScreenView: Send + Sync {
    /// Replace the text of a readout field.
    fn render_field(&self, field: Field, text: &str);

    /// Replace the status line.
    fn render_status(&self, text: &str);

    /// Enable or disable the start and stop buttons.
    fn render_buttons(&self, start_enabled: bool, stop_enabled: bool);

    /// Show a modal dialog with a confirm and a cancel button.
    fn show_dialog(&self, dialog: Dialog);

    /// Show a short transient message.
    fn show_toast(&self, text: &str);
}
