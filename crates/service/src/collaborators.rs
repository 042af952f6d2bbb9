//! The platform services the device actions core is built on.

use devactions_host::{
    BroadcasterRef, ClockRef, InMemoryBroadcaster, InMemoryPower, InMemoryPreferenceStore,
    InMemorySensorHub, InMemoryTelecom, InMemoryTorch, InMemoryVibrator, ManualClock,
    PowerManagerRef, PreferenceStoreRef, SensorHubRef, TelecomRef, TorchRef, VibratorRef,
};
use devactions_vote::{GestureHardwareRef, InMemoryGestureHardware};
use std::sync::Arc;

/// Every host boundary the service talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub sensors: SensorHubRef,
    pub hardware: GestureHardwareRef,
    pub power: PowerManagerRef,
    pub telecom: TelecomRef,
    pub broadcaster: BroadcasterRef,
    pub torch: TorchRef,
    pub vibrator: VibratorRef,
    pub preferences: PreferenceStoreRef,
    pub clock: ClockRef,
}

/// In-memory host for tests and simulation.
///
/// Keeps the concrete doubles so callers can drive sensors and the clock and
/// inspect what the core asked for.
#[derive(Clone)]
pub struct InMemoryHost {
    pub sensors: Arc<InMemorySensorHub>,
    pub hardware: Arc<InMemoryGestureHardware>,
    pub power: Arc<InMemoryPower>,
    pub telecom: Arc<InMemoryTelecom>,
    pub broadcaster: Arc<InMemoryBroadcaster>,
    pub torch: Arc<InMemoryTorch>,
    pub vibrator: Arc<InMemoryVibrator>,
    pub preferences: Arc<InMemoryPreferenceStore>,
    pub clock: Arc<ManualClock>,
}

impl InMemoryHost {
    pub fn new(start_ms: i64) -> Self {
        Self::with_preferences(start_ms, InMemoryPreferenceStore::default())
    }

    pub fn with_preferences(start_ms: i64, preferences: InMemoryPreferenceStore) -> Self {
        Self {
            sensors: Arc::new(InMemorySensorHub::new()),
            hardware: Arc::new(InMemoryGestureHardware::new()),
            power: Arc::new(InMemoryPower::new()),
            telecom: Arc::new(InMemoryTelecom::new()),
            broadcaster: Arc::new(InMemoryBroadcaster::new()),
            torch: Arc::new(InMemoryTorch::new()),
            vibrator: Arc::new(InMemoryVibrator::new()),
            preferences: Arc::new(preferences),
            clock: Arc::new(ManualClock::new(start_ms)),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            sensors: self.sensors.clone(),
            hardware: self.hardware.clone(),
            power: self.power.clone(),
            telecom: self.telecom.clone(),
            broadcaster: self.broadcaster.clone(),
            torch: self.torch.clone(),
            vibrator: self.vibrator.clone(),
            preferences: self.preferences.clone(),
            clock: self.clock.clone(),
        }
    }
}
