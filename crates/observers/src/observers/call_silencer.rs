use super::{listener_of, lock_state};
use crate::preferences::PreferenceKey;
use crate::proximity::TimingGuard;
use devactions_host::{
    CallState, ClockRef, SensorEvent, SensorHubRef, SensorKind, SensorListener, TelecomRef,
};
use devactions_vote::{CapabilityMask, Gesture, VoteHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

const NAME: &str = "call_silencer";

#[derive(Debug)]
struct CallSilencerState {
    call_state: CallState,
    ringing: bool,
    guard: TimingGuard,
}

/// Silences the ringer on an IR swipe while a call is ringing.
///
/// Call state and gestures arrive on different callback threads; both are
/// serialized on one mutex so "is ringing" and "delay elapsed" are read
/// together.
pub struct CallSilencer {
    this: Weak<Self>,
    sensors: SensorHubRef,
    votes: VoteHandle,
    telecom: TelecomRef,
    clock: ClockRef,
    enabled: AtomicBool,
    state: Mutex<CallSilencerState>,
}

impl CallSilencer {
    pub fn new(
        sensors: SensorHubRef,
        votes: VoteHandle,
        telecom: TelecomRef,
        clock: ClockRef,
        silence_delay: Duration,
        enabled: bool,
    ) -> Arc<Self> {
        votes.vote_for_sensors(CapabilityMask::EMPTY);
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            sensors,
            votes,
            telecom,
            clock,
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(CallSilencerState {
                call_state: CallState::Idle,
                ringing: false,
                guard: TimingGuard::new(silence_delay),
            }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Armed for the current ring.
    pub fn is_armed(&self) -> bool {
        lock_state(NAME, &self.state).is_some_and(|state| state.ringing)
    }

    pub fn call_state_changed(&self, call_state: CallState) {
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        state.call_state = call_state;
        if call_state == CallState::Ringing && !state.ringing && self.is_enabled() {
            tracing::info!(observer = NAME, "ringing started");
            self.arm(&mut state);
        } else if call_state != CallState::Ringing && state.ringing {
            tracing::info!(observer = NAME, ?call_state, "ringing stopped");
            self.disarm(&mut state);
        }
    }

    pub fn preference_changed(&self, key: PreferenceKey, enabled: bool) {
        if key != PreferenceKey::GestureIrSilence {
            return;
        }
        self.enabled.store(enabled, Ordering::Relaxed);
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        if !enabled {
            self.disarm(&mut state);
        } else if state.call_state == CallState::Ringing {
            self.arm(&mut state);
        }
    }

    fn arm(&self, state: &mut CallSilencerState) {
        if state.ringing {
            return;
        }
        let Some(listener) = listener_of(&self.this) else {
            return;
        };
        self.sensors.register_listener(SensorKind::IrGesture, listener);
        self.votes.vote_for_sensors(CapabilityMask::of(Gesture::Swipe));
        state.guard.arm(self.clock.now_ms());
        state.ringing = true;
    }

    fn disarm(&self, state: &mut CallSilencerState) {
        if !state.ringing {
            return;
        }
        if let Some(listener) = listener_of(&self.this) {
            self.sensors.unregister_listener(SensorKind::IrGesture, &listener);
        }
        self.votes.vote_for_sensors(CapabilityMask::EMPTY);
        state.ringing = false;
    }
}

impl SensorListener for CallSilencer {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        if event.sensor != SensorKind::IrGesture {
            return;
        }
        if event.gesture_code().and_then(Gesture::from_code) != Some(Gesture::Swipe) {
            return;
        }
        let now = self.clock.now_ms();
        let silence = {
            let Some(state) = lock_state(NAME, &self.state) else {
                return;
            };
            if !state.ringing || !self.is_enabled() {
                return;
            }
            tracing::debug!(observer = NAME, values = ?event.values, "swipe while ringing");
            let allowed = state.guard.allows(now);
            if !allowed {
                tracing::debug!(
                    observer = NAME,
                    now,
                    ring_started = state.guard.armed_at(),
                    delay = ?state.guard.min_delay(),
                    "ignoring silence gesture too close to ring start"
                );
            }
            allowed
        };
        if silence {
            tracing::debug!(observer = NAME, "silencing ringer");
            self.telecom.silence_ringer();
        }
    }
}
