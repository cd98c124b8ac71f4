use serde::{Deserialize, Serialize};

use crate::LocationFix;

/// Normalized provider callback.
///
/// Provider names are passed through as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum LocationEvent {
    /// A new position sample.
    FixReceived(LocationFix),
    /// A provider changed status.
    StatusChanged {
        /// Provider name.
        provider: String,
        /// Raw platform status code.
        status: i32,
    },
    /// A provider was switched on.
    ProviderEnabled(String),
    /// A provider was switched off.
    ProviderDisabled(String),
}

/// Receives location events.
///
/// Events may be delivered on any thread.
pub trait LocationDelegate: Send + Sync {
    /// Called for every event.
    fn on_event(&self, event: LocationEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bridge_payloads() {
        let fix: LocationEvent = serde_json::from_str(
            r#"{"kind":"fix_received","data":{"latitude":37.421,"longitude":-122.084,"altitude":30.0,"accuracy":5.0,"speed":0.0,"bearing":0.0}}"#,
        )
        .unwrap();
        assert_eq!(
            fix,
            LocationEvent::FixReceived(LocationFix {
                latitude: 37.421,
                longitude: -122.084,
                altitude: 30.0,
                accuracy: 5.0,
                speed: 0.0,
                bearing: 0.0,
            })
        );

        let status: LocationEvent = serde_json::from_str(
            r#"{"kind":"status_changed","data":{"provider":"gps","status":2}}"#,
        )
        .unwrap();
        assert_eq!(
            status,
            LocationEvent::StatusChanged {
                provider: "gps".into(),
                status: 2,
            }
        );

        let disabled: LocationEvent =
            serde_json::from_str(r#"{"kind":"provider_disabled","data":"network"}"#).unwrap();
        assert_eq!(disabled, LocationEvent::ProviderDisabled("network".into()));
    }
}
