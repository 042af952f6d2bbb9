//! Feature preference keys and their initial values.

use crate::config::ConfigError;
use devactions_host::PreferenceStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One boolean feature switch owned by the host's preference storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceKey {
    /// IR approach wakes the ambient display.
    #[serde(rename = "gesture_ir")]
    GestureIr,
    /// IR swipe silences a ringing call or snoozes an alarm.
    #[serde(rename = "gesture_ir_silence")]
    GestureIrSilence,
    /// Keep the screen on while something is in front of it.
    #[serde(rename = "gesture_attentive_display")]
    AttentiveDisplay,
    /// Picking the device up pulses the ambient display.
    #[serde(rename = "pick_up")]
    PickUp,
    /// Chop-chop toggles the flashlight.
    #[serde(rename = "gesture_flashlight")]
    Flashlight,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 5] = [
        PreferenceKey::GestureIr,
        PreferenceKey::GestureIrSilence,
        PreferenceKey::AttentiveDisplay,
        PreferenceKey::PickUp,
        PreferenceKey::Flashlight,
    ];

    /// Storage key of this preference.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::GestureIr => "gesture_ir",
            PreferenceKey::GestureIrSilence => "gesture_ir_silence",
            PreferenceKey::AttentiveDisplay => "gesture_attentive_display",
            PreferenceKey::PickUp => "pick_up",
            PreferenceKey::Flashlight => "gesture_flashlight",
        }
    }

    /// Value used when the store has no entry.
    pub fn default_value(&self) -> bool {
        !matches!(self, PreferenceKey::AttentiveDisplay)
    }
}

impl std::fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownPreference(s.to_string()))
    }
}

/// Snapshot of every feature switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub gesture_ir: bool,
    pub gesture_ir_silence: bool,
    pub gesture_attentive_display: bool,
    pub pick_up: bool,
    pub gesture_flashlight: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            gesture_ir: PreferenceKey::GestureIr.default_value(),
            gesture_ir_silence: PreferenceKey::GestureIrSilence.default_value(),
            gesture_attentive_display: PreferenceKey::AttentiveDisplay.default_value(),
            pick_up: PreferenceKey::PickUp.default_value(),
            gesture_flashlight: PreferenceKey::Flashlight.default_value(),
        }
    }
}

impl Preferences {
    /// Read every key from the host store, falling back to per-key defaults.
    pub fn from_store(store: &dyn PreferenceStore) -> Self {
        Self::default().overlay(store)
    }

    /// Values stored by the host win; keys it has no entry for keep `self`.
    pub fn overlay(mut self, store: &dyn PreferenceStore) -> Self {
        for key in PreferenceKey::ALL {
            self.set(key, store.get_bool(key.as_str(), self.get(key)));
        }
        self
    }

    pub fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::GestureIr => self.gesture_ir,
            PreferenceKey::GestureIrSilence => self.gesture_ir_silence,
            PreferenceKey::AttentiveDisplay => self.gesture_attentive_display,
            PreferenceKey::PickUp => self.pick_up,
            PreferenceKey::Flashlight => self.gesture_flashlight,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, enabled: bool) {
        let slot = match key {
            PreferenceKey::GestureIr => &mut self.gesture_ir,
            PreferenceKey::GestureIrSilence => &mut self.gesture_ir_silence,
            PreferenceKey::AttentiveDisplay => &mut self.gesture_attentive_display,
            PreferenceKey::PickUp => &mut self.pick_up,
            PreferenceKey::Flashlight => &mut self.gesture_flashlight,
        };
        *slot = enabled;
    }
}
