use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use gpsview_location::{LocationEvent, LocationFix, PermissionGate, Provider, UpdateParameters};
use gpsview_permission::sys::desktop::DesktopPermissionHost;
use gpsview_presenter::Dialog;
use gpsview_testing::{FakeLocationBackend, FakePermissionHost};
use serde::Deserialize;

/// Initial platform state plus a script of user actions and callbacks.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Host predates runtime permissions.
    #[serde(default)]
    pub legacy: bool,
    /// Use the desktop permission host instead of the scripted one.
    /// Permission steps then have no effect on the gate.
    #[serde(default)]
    pub desktop: bool,
    #[serde(default)]
    pub permissions: Grants,
    /// Host recommends a rationale before asking.
    #[serde(default)]
    pub rationale: bool,
    #[serde(default)]
    pub providers: Toggles,
    #[serde(default)]
    pub last_known: LastKnown,
    #[serde(default)]
    pub update_parameters: Option<UpdateParameters>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grants {
    #[serde(default)]
    pub fine: bool,
    #[serde(default)]
    pub coarse: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Toggles {
    #[serde(default)]
    pub gps: bool,
    #[serde(default)]
    pub network: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LastKnown {
    #[serde(default)]
    pub gps: Option<LocationFix>,
    #[serde(default)]
    pub network: Option<LocationFix>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogName {
    PermissionRationale,
    GpsDisabled,
}

impl From<DialogName> for Dialog {
    fn from(name: DialogName) -> Self {
        match name {
            DialogName::PermissionRationale => Self::PermissionRationale,
            DialogName::GpsDisabled => Self::GpsDisabled,
        }
    }
}

/// One scripted action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Create,
    StartClicked,
    StopClicked,
    Destroy,
    /// The user answers the permission prompt.
    PermissionResult { granted: bool },
    /// The user comes back from a screen launched for a result.
    ActivityResult { request_code: i32 },
    ConfirmDialog { dialog: DialogName },
    /// Flip a provider toggle without emitting a callback.
    SetProvider { provider: Provider, enabled: bool },
    /// Deliver a callback to every registered listener.
    Event { event: LocationEvent },
    /// Read the cached fix without starting updates.
    CurrentLocation,
    SetUpdateParameters { parameters: UpdateParameters },
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the fakes in the scenario's initial state.
    pub fn platform(&self) -> (FakePermissionHost, FakeLocationBackend) {
        let host = FakePermissionHost::new();
        host.set_legacy(self.legacy);
        host.set_granted(self.permissions.fine, self.permissions.coarse);
        host.set_rationale(self.rationale);
        host.set_gps_enabled(self.providers.gps);

        let backend = FakeLocationBackend::new();
        backend.set_provider_enabled(Provider::Gps, self.providers.gps);
        backend.set_provider_enabled(Provider::Network, self.providers.network);
        backend.set_last_known(Provider::Gps, self.last_known.gps);
        backend.set_last_known(Provider::Network, self.last_known.network);

        (host, backend)
    }

    /// The gate the screen checks: the desktop host, or the scripted `fake`.
    pub fn permission_gate(&self, fake: Arc<FakePermissionHost>) -> PermissionGate {
        if self.desktop {
            PermissionGate::new(Arc::new(DesktopPermissionHost::new(self.providers.gps)))
        } else {
            PermissionGate::new(fake)
        }
    }
}
