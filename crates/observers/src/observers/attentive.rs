use super::{listener_of, lock_state, ScreenStateObserver};
use crate::config::{AttentiveMode, Timings};
use crate::preferences::PreferenceKey;
use crate::proximity::ProximityState;
use crate::screen_lock::ScreenLock;
use devactions_host::{
    ClockRef, PowerManagerRef, SensorEvent, SensorHubRef, SensorKind, SensorListener, Timestamp,
};
use devactions_vote::{CapabilityMask, Gesture, VoteHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

const NAME: &str = "attentive_display";

struct AttentiveState {
    armed: bool,
    screen_on: bool,
    proximity: ProximityState,
    lock: ScreenLock,
    stow_listening: bool,
    stow_done: bool,
}

/// Keeps the screen on while something is in front of the IR detector.
///
/// Arms on screen on. Two algorithms are available:
///
/// - [`AttentiveMode::Simple`] listens to the stow sensor only while the
///   lock is held, and only honors stow events for a fixed window after
///   arming. The first stow that unlocks, or any stow event past the window,
///   tears the stow listener down until the next arm.
/// - [`AttentiveMode::StateMerge`] listens to both sensors for the whole
///   session and recomputes lock or unlock from both readings on every
///   event. Unlocking takes a timed dim hold.
pub struct AttentiveDisplay {
    this: Weak<Self>,
    sensors: SensorHubRef,
    votes: VoteHandle,
    clock: ClockRef,
    mode: AttentiveMode,
    stow_window: Duration,
    enabled: AtomicBool,
    state: Mutex<AttentiveState>,
}

impl AttentiveDisplay {
    pub fn new(
        sensors: SensorHubRef,
        votes: VoteHandle,
        power: PowerManagerRef,
        clock: ClockRef,
        mode: AttentiveMode,
        timings: &Timings,
        enabled: bool,
    ) -> Arc<Self> {
        let dim_hold = match mode {
            AttentiveMode::Simple => None,
            AttentiveMode::StateMerge => Some(timings.dim_hold()),
        };
        votes.vote_for_state(false, CapabilityMask::EMPTY);
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            sensors,
            votes,
            clock,
            mode,
            stow_window: timings.stow_window(),
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(AttentiveState {
                armed: false,
                screen_on: false,
                proximity: ProximityState::default(),
                lock: ScreenLock::new(power, dim_hold),
                stow_listening: false,
                stow_done: false,
            }),
        })
    }

    pub fn mode(&self) -> AttentiveMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn is_armed(&self) -> bool {
        lock_state(NAME, &self.state).is_some_and(|state| state.armed)
    }

    pub fn is_locked(&self) -> bool {
        lock_state(NAME, &self.state).is_some_and(|state| state.lock.is_locked())
    }

    /// Snapshot of the debounced proximity state.
    pub fn proximity(&self) -> Option<ProximityState> {
        lock_state(NAME, &self.state).map(|state| state.proximity)
    }

    fn arm(&self, state: &mut AttentiveState) {
        if state.armed {
            return;
        }
        let Some(listener) = listener_of(&self.this) else {
            return;
        };
        state.proximity.arm(self.clock.now_ms());
        state.stow_done = false;
        self.sensors.register_listener(SensorKind::IrGesture, listener.clone());
        match self.mode {
            AttentiveMode::Simple => {
                // Proximity transitions are reported without any gesture bits.
                self.votes.vote_for_state(true, CapabilityMask::EMPTY);
            }
            AttentiveMode::StateMerge => {
                self.sensors.register_listener(SensorKind::Stow, listener);
                state.stow_listening = true;
                self.votes.vote_for_sensors(
                    CapabilityMask::of(Gesture::ObjectDetected) | Gesture::ObjectNotDetected,
                );
            }
        }
        state.armed = true;
        tracing::info!(observer = NAME, mode = ?self.mode, "armed");
    }

    /// Unregister everything, revoke the vote and drop the lock without a
    /// dim hold.
    fn disarm(&self, state: &mut AttentiveState) {
        if state.armed {
            if let Some(listener) = listener_of(&self.this) {
                self.sensors.unregister_listener(SensorKind::IrGesture, &listener);
                if state.stow_listening {
                    self.sensors.unregister_listener(SensorKind::Stow, &listener);
                }
            }
            state.stow_listening = false;
            self.votes.vote_for_state(false, CapabilityMask::EMPTY);
            state.armed = false;
            tracing::info!(observer = NAME, "disarmed");
        }
        state.lock.release_now();
    }

    fn start_stow_listener(&self, state: &mut AttentiveState) {
        if state.stow_listening || state.stow_done {
            return;
        }
        if let Some(listener) = listener_of(&self.this) {
            self.sensors.register_listener(SensorKind::Stow, listener);
            state.stow_listening = true;
        }
    }

    fn stop_stow_listener(&self, state: &mut AttentiveState) {
        if !state.stow_listening {
            return;
        }
        if let Some(listener) = listener_of(&self.this) {
            self.sensors.unregister_listener(SensorKind::Stow, &listener);
        }
        state.stow_listening = false;
    }

    fn simple_gesture(&self, state: &mut AttentiveState, gesture: Gesture, now: Timestamp) {
        match gesture {
            Gesture::ObjectDetected if self.is_enabled() => {
                state.proximity.set_object_detected(true, now);
                if state.lock.lock(now) {
                    self.start_stow_listener(state);
                }
            }
            Gesture::ObjectNotDetected => {
                tracing::debug!(observer = NAME, "object is gone");
                state.proximity.set_object_detected(false, now);
                state.lock.unlock(now);
                self.stop_stow_listener(state);
            }
            _ => {}
        }
    }

    fn simple_stow(&self, state: &mut AttentiveState, stowed: bool, now: Timestamp) {
        if !state.stow_listening {
            return;
        }
        if !state.proximity.is_within_window(now, self.stow_window) {
            tracing::debug!(
                observer = NAME,
                deadline = state.proximity.validity_deadline(self.stow_window),
                now,
                "ignoring stow sensor past its window"
            );
            self.stop_stow_listener(state);
            state.stow_done = true;
            return;
        }
        state.proximity.set_stowed(stowed, now);
        if stowed {
            tracing::debug!(observer = NAME, "stowed");
            state.lock.unlock(now);
            self.stop_stow_listener(state);
            state.stow_done = true;
        }
    }

    fn merged_update(&self, state: &mut AttentiveState, now: Timestamp) {
        if state.proximity.screen_should_lock() {
            state.lock.lock(now);
        } else {
            state.lock.unlock(now);
        }
    }

    fn merged_gesture(&self, state: &mut AttentiveState, gesture: Gesture, now: Timestamp) {
        let detected = match gesture {
            Gesture::ObjectDetected if self.is_enabled() => true,
            Gesture::ObjectNotDetected => false,
            _ => return,
        };
        tracing::debug!(observer = NAME, detected, "ir object");
        state.proximity.set_object_detected(detected, now);
        self.merged_update(state, now);
    }

    fn merged_stow(&self, state: &mut AttentiveState, stowed: bool, now: Timestamp) {
        tracing::debug!(observer = NAME, stowed, "stow");
        state.proximity.set_stowed(stowed, now);
        self.merged_update(state, now);
    }
}

impl ScreenStateObserver for AttentiveDisplay {
    fn name(&self) -> &'static str {
        NAME
    }

    fn screen_turned_on(&self) {
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        state.screen_on = true;
        if self.is_enabled() {
            self.arm(&mut state);
        } else {
            self.disarm(&mut state);
        }
    }

    fn screen_turned_off(&self) {
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        state.screen_on = false;
        self.disarm(&mut state);
    }

    fn preference_changed(&self, key: PreferenceKey, enabled: bool) {
        if key != PreferenceKey::AttentiveDisplay {
            return;
        }
        self.enabled.store(enabled, Ordering::Relaxed);
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        if !enabled {
            self.disarm(&mut state);
        } else if state.screen_on {
            self.arm(&mut state);
        }
    }
}

impl SensorListener for AttentiveDisplay {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        let now = self.clock.now_ms();
        let Some(mut guard) = lock_state(NAME, &self.state) else {
            return;
        };
        let state = &mut *guard;
        if !state.armed {
            return;
        }
        match event.sensor {
            SensorKind::IrGesture => {
                let Some(gesture) = event.gesture_code().and_then(Gesture::from_code) else {
                    return;
                };
                match self.mode {
                    AttentiveMode::Simple => self.simple_gesture(state, gesture, now),
                    AttentiveMode::StateMerge => self.merged_gesture(state, gesture, now),
                }
            }
            SensorKind::Stow => {
                let Some(stowed) = event.flag() else {
                    return;
                };
                match self.mode {
                    AttentiveMode::Simple => self.simple_stow(state, stowed, now),
                    AttentiveMode::StateMerge => self.merged_stow(state, stowed, now),
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devactions_host::{InMemoryPower, InMemorySensorHub, ManualClock, WakeResource};
    use devactions_vote::{CapabilityVoteAggregator, InMemoryGestureHardware};

    struct Fixture {
        hub: Arc<InMemorySensorHub>,
        hardware: Arc<InMemoryGestureHardware>,
        power: Arc<InMemoryPower>,
        clock: Arc<ManualClock>,
        display: Arc<AttentiveDisplay>,
    }

    fn fixture(mode: AttentiveMode) -> Fixture {
        let hub = Arc::new(InMemorySensorHub::new());
        let hardware = Arc::new(InMemoryGestureHardware::new());
        let aggregator = Arc::new(CapabilityVoteAggregator::new(hardware.clone()));
        let power = Arc::new(InMemoryPower::new());
        let clock = Arc::new(ManualClock::new(10_000));
        let display = AttentiveDisplay::new(
            hub.clone(),
            aggregator.handle(),
            power.clone(),
            clock.clone(),
            mode,
            &Timings::default(),
            true,
        );
        Fixture {
            hub,
            hardware,
            power,
            clock,
            display,
        }
    }

    #[test]
    fn test_arms_on_screen_on() {
        let fx = fixture(AttentiveMode::StateMerge);
        fx.display.screen_turned_off();
        assert!(!fx.display.is_armed());

        fx.display.screen_turned_on();
        assert!(fx.display.is_armed());
        assert!(fx.hub.is_registered(SensorKind::IrGesture));
        assert!(fx.hub.is_registered(SensorKind::Stow));

        let config = fx.hardware.current();
        assert!(config.active);
        assert!(config.mask.contains(Gesture::ObjectDetected));
        assert!(config.mask.contains(Gesture::ObjectNotDetected));
    }

    #[test]
    fn test_simple_registers_stow_only_after_lock() {
        let fx = fixture(AttentiveMode::Simple);
        fx.display.screen_turned_on();
        assert!(fx.hardware.current().active);
        assert!(fx.hardware.current().mask.is_empty());
        assert!(!fx.hub.is_registered(SensorKind::Stow));

        fx.hub.emit_gesture(Gesture::ObjectDetected.code());
        assert!(fx.display.is_locked());
        assert!(fx.hub.is_registered(SensorKind::Stow));

        fx.hub.emit_gesture(Gesture::ObjectNotDetected.code());
        assert!(!fx.display.is_locked());
        assert!(!fx.hub.is_registered(SensorKind::Stow));
        assert_eq!(fx.power.timed_acquire_count(WakeResource::ScreenDim), 0);
    }

    #[test]
    fn test_simple_expired_stow_stays_torn_down() {
        let fx = fixture(AttentiveMode::Simple);
        fx.display.screen_turned_on();
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());

        fx.clock.advance_ms(6_000);
        fx.hub.emit_flag(SensorKind::Stow, true);
        assert!(fx.display.is_locked());
        assert!(!fx.hub.is_registered(SensorKind::Stow));

        // Re-locking in the same session does not bring the listener back.
        fx.hub.emit_gesture(Gesture::ObjectNotDetected.code());
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());
        assert!(fx.display.is_locked());
        assert!(!fx.hub.is_registered(SensorKind::Stow));

        // A new session does.
        fx.display.screen_turned_off();
        fx.display.screen_turned_on();
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());
        assert!(fx.hub.is_registered(SensorKind::Stow));
    }

    #[test]
    fn test_simple_stow_in_window_retires_listener() {
        let fx = fixture(AttentiveMode::Simple);
        fx.display.screen_turned_on();
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());

        fx.clock.advance_ms(1_000);
        fx.hub.emit_flag(SensorKind::Stow, true);
        assert!(!fx.display.is_locked());
        assert!(!fx.hub.is_registered(SensorKind::Stow));

        fx.hub.emit_gesture(Gesture::ObjectNotDetected.code());
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());
        assert!(fx.display.is_locked());
        assert!(!fx.hub.is_registered(SensorKind::Stow));

        fx.display.screen_turned_off();
        fx.display.screen_turned_on();
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());
        assert!(fx.hub.is_registered(SensorKind::Stow));
    }

    #[test]
    fn test_merge_unlock_takes_dim_hold() {
        let fx = fixture(AttentiveMode::StateMerge);
        fx.display.screen_turned_on();

        fx.hub.emit_gesture(Gesture::ObjectDetected.code());
        assert!(fx.power.is_held(WakeResource::ScreenBright));

        fx.hub.emit_flag(SensorKind::Stow, true);
        assert!(!fx.display.is_locked());
        assert_eq!(fx.power.timed_acquire_count(WakeResource::ScreenDim), 1);
    }

    #[test]
    fn test_detected_ignored_when_disabled_but_gone_still_unlocks() {
        let fx = fixture(AttentiveMode::StateMerge);
        fx.display.screen_turned_on();
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());

        fx.display.enabled.store(false, Ordering::Relaxed);
        fx.hub.emit_gesture(Gesture::ObjectNotDetected.code());
        assert!(!fx.display.is_locked());

        fx.hub.emit_gesture(Gesture::ObjectDetected.code());
        assert!(!fx.display.is_locked());
    }

    #[test]
    fn test_screen_off_releases_without_dim_hold() {
        let fx = fixture(AttentiveMode::StateMerge);
        fx.display.screen_turned_on();
        fx.hub.emit_gesture(Gesture::ObjectDetected.code());

        fx.display.screen_turned_off();
        assert!(!fx.display.is_armed());
        assert!(!fx.power.is_held(WakeResource::ScreenBright));
        assert_eq!(fx.power.timed_acquire_count(WakeResource::ScreenDim), 0);
        assert_eq!(fx.hub.total_registrations(), 0);
        assert!(!fx.hardware.current().active);
    }

    #[test]
    fn test_events_while_disarmed_are_ignored() {
        let fx = fixture(AttentiveMode::StateMerge);
        let listener: devactions_host::SensorListenerRef = fx.display.clone();
        listener.on_sensor_changed(&SensorEvent::new(
            SensorKind::IrGesture,
            vec![0.0, Gesture::ObjectDetected.code() as f32, 0.0],
        ));
        assert!(!fx.display.is_locked());
        assert!(fx.power.calls().is_empty());
    }
}
