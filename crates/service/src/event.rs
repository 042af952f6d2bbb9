//! Host signals as serializable events.

use devactions_host::CallState;
use devactions_observers::LifecycleCoordinator;
use serde::{Deserialize, Serialize};

/// One notification from the host platform.
///
/// Serialized with a `type` tag, e.g.
/// `{"type": "preference", "key": "pick_up", "enabled": false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    ScreenOn,
    ScreenOff,
    /// A desk clock broadcast by action name.
    Alarm { action: String },
    CallState { state: CallState },
    /// Raw storage key; keys the core does not own are ignored.
    Preference { key: String, enabled: bool },
}

impl HostEvent {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Deliver this event to the coordinator.
    pub fn apply(&self, coordinator: &LifecycleCoordinator) {
        match self {
            HostEvent::ScreenOn => coordinator.screen_turned_on(),
            HostEvent::ScreenOff => coordinator.screen_turned_off(),
            HostEvent::Alarm { action } => coordinator.alarm_broadcast(action),
            HostEvent::CallState { state } => coordinator.call_state_changed(*state),
            HostEvent::Preference { key, enabled } => {
                coordinator.preference_changed_str(key, *enabled);
            }
        }
    }
}
