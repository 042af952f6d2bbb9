//! Action sinks fired by the observers.

use crate::observers::ScreenStateObserver;
use crate::preferences::PreferenceKey;
use devactions_host::{BroadcasterRef, ClockRef, Timestamp, TorchRef, VibratorRef};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Broadcast that asks the system UI for an ambient display pulse.
pub const DOZE_PULSE_ACTION: &str = "com.android.systemui.doze.pulse";

/// A triggerable side effect.
pub trait SensorAction: Send + Sync {
    fn action(&self);

    /// Sinks that own a feature switch override this.
    fn preference_changed(&self, _key: PreferenceKey, _enabled: bool) {}
}

pub type SensorActionRef = Arc<dyn SensorAction>;

/// Screen power state shared between the coordinator and the sinks.
#[derive(Debug, Default)]
pub struct DeviceState {
    // 0 = unknown, 1 = on, 2 = off
    screen: AtomicU8,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_screen_on(&self, on: bool) {
        self.screen.store(if on { 1 } else { 2 }, Ordering::SeqCst);
    }

    /// `None` until the first screen notification.
    pub fn screen_on(&self) -> Option<bool> {
        match self.screen.load(Ordering::SeqCst) {
            1 => Some(true),
            2 => Some(false),
            _ => None,
        }
    }

    pub fn is_screen_on(&self) -> bool {
        self.screen_on() == Some(true)
    }
}

/// Vibrates and toggles the torch when the flashlight gesture is enabled.
pub struct FlashlightAction {
    torch: TorchRef,
    vibrator: VibratorRef,
    vibrate_for: Duration,
    enabled: AtomicBool,
}

impl FlashlightAction {
    pub fn new(torch: TorchRef, vibrator: VibratorRef, vibrate_for: Duration, enabled: bool) -> Self {
        Self {
            torch,
            vibrator,
            vibrate_for,
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl SensorAction for FlashlightAction {
    fn action(&self) {
        if !self.is_enabled() {
            tracing::debug!("flashlight gesture disabled, ignoring");
            return;
        }
        self.vibrator.vibrate(self.vibrate_for);
        self.torch.toggle();
    }

    fn preference_changed(&self, key: PreferenceKey, enabled: bool) {
        if key == PreferenceKey::Flashlight {
            self.enabled.store(enabled, Ordering::Relaxed);
        }
    }
}

#[derive(Debug)]
struct PulseState {
    last_pulse: Timestamp,
    screen_off: bool,
}

/// Requests an ambient display pulse, at most once per interval and only
/// while the screen is off.
pub struct DozePulseAction {
    broadcaster: BroadcasterRef,
    clock: ClockRef,
    device: Arc<DeviceState>,
    interval: Duration,
    state: Mutex<PulseState>,
}

impl DozePulseAction {
    pub fn new(
        broadcaster: BroadcasterRef,
        clock: ClockRef,
        device: Arc<DeviceState>,
        interval: Duration,
    ) -> Self {
        Self {
            broadcaster,
            clock,
            device,
            interval,
            state: Mutex::new(PulseState {
                last_pulse: Timestamp::MIN,
                screen_off: false,
            }),
        }
    }

    fn may_pulse(&self) -> bool {
        if self.device.is_screen_on() {
            return false;
        }
        let now = self.clock.now_ms();
        let Ok(mut state) = self.state.lock() else {
            tracing::warn!("doze pulse state poisoned");
            return false;
        };
        let interval = i64::try_from(self.interval.as_millis()).unwrap_or(i64::MAX);
        if now.saturating_sub(state.last_pulse) > interval {
            state.last_pulse = now;
            true
        } else {
            false
        }
    }
}

impl SensorAction for DozePulseAction {
    fn action(&self) {
        if self.may_pulse() {
            tracing::debug!("requesting doze pulse");
            self.broadcaster.broadcast(DOZE_PULSE_ACTION);
        } else {
            tracing::debug!("doze pulse suppressed");
        }
    }
}

impl ScreenStateObserver for DozePulseAction {
    fn name(&self) -> &'static str {
        "doze_pulse"
    }

    fn screen_turned_on(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.screen_off = false;
        }
    }

    /// On a real on-to-off transition the first pulse waits a full
    /// interval. Repeated screen-off notifications leave the throttle alone.
    fn screen_turned_off(&self) {
        let Ok(mut state) = self.state.lock() else {
            tracing::warn!("doze pulse state poisoned");
            return;
        };
        if !state.screen_off {
            state.screen_off = true;
            state.last_pulse = self.clock.now_ms();
        }
    }

    fn preference_changed(&self, _key: PreferenceKey, _enabled: bool) {}
}
