//! Fire-and-forget side effects: telephony, broadcasts, torch, vibrator.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Telephony call state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    #[default]
    Idle,
    Ringing,
    OffHook,
}

/// Telecom service.
pub trait Telecom: Send + Sync {
    /// Silence the ringer of the incoming call, if any.
    fn silence_ringer(&self);
}

pub type TelecomRef = Arc<dyn Telecom>;

/// Intent broadcast substrate.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, action: &str);
}

pub type BroadcasterRef = Arc<dyn Broadcaster>;

pub trait Torch: Send + Sync {
    fn toggle(&self);
}

pub type TorchRef = Arc<dyn Torch>;

pub trait Vibrator: Send + Sync {
    fn vibrate(&self, duration: Duration);
}

pub type VibratorRef = Arc<dyn Vibrator>;

/// Counts ringer silences.
#[derive(Default)]
pub struct InMemoryTelecom {
    silenced: AtomicUsize,
}

impl InMemoryTelecom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn silence_count(&self) -> usize {
        self.silenced.load(Ordering::SeqCst)
    }
}

impl Telecom for InMemoryTelecom {
    fn silence_ringer(&self) {
        self.silenced.fetch_add(1, Ordering::SeqCst);
    }
}

/// Captures broadcast action names.
#[derive(Default)]
pub struct InMemoryBroadcaster {
    actions: Mutex<Vec<String>>,
}

impl InMemoryBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn count_of(&self, action: &str) -> usize {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.as_str() == action)
            .count()
    }

    pub fn clear(&self) {
        self.actions.lock().unwrap().clear();
    }
}

impl Broadcaster for InMemoryBroadcaster {
    fn broadcast(&self, action: &str) {
        self.actions.lock().unwrap().push(action.to_string());
    }
}

/// Torch double that tracks its on/off state.
#[derive(Default)]
pub struct InMemoryTorch {
    on: AtomicBool,
    toggles: AtomicUsize,
}

impl InMemoryTorch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    pub fn toggle_count(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }
}

impl Torch for InMemoryTorch {
    fn toggle(&self) {
        self.on.fetch_xor(true, Ordering::SeqCst);
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }
}

/// Captures vibration durations.
#[derive(Default)]
pub struct InMemoryVibrator {
    pulses: Mutex<Vec<Duration>>,
}

impl InMemoryVibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> Vec<Duration> {
        self.pulses.lock().unwrap().clone()
    }
}

impl Vibrator for InMemoryVibrator {
    fn vibrate(&self, duration: Duration) {
        self.pulses.lock().unwrap().push(duration);
    }
}
