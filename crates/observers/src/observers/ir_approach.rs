use super::{listener_of, lock_state, ScreenStateObserver};
use crate::actions::SensorActionRef;
use crate::preferences::PreferenceKey;
use devactions_host::{SensorEvent, SensorHubRef, SensorKind, SensorListener};
use devactions_vote::{CapabilityMask, Gesture, VoteHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

const NAME: &str = "ir_approach";

#[derive(Debug, Default)]
struct ApproachState {
    armed: bool,
    screen_off: bool,
}

/// Wakes the ambient display when a hand approaches the IR detector while
/// the screen is off.
pub struct IrApproachSensor {
    this: Weak<Self>,
    sensors: SensorHubRef,
    votes: VoteHandle,
    action: SensorActionRef,
    enabled: AtomicBool,
    state: Mutex<ApproachState>,
}

impl IrApproachSensor {
    pub fn new(
        sensors: SensorHubRef,
        votes: VoteHandle,
        action: SensorActionRef,
        enabled: bool,
    ) -> Arc<Self> {
        votes.vote_for_state(false, CapabilityMask::EMPTY);
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            sensors,
            votes,
            action,
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(ApproachState::default()),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn is_armed(&self) -> bool {
        lock_state(NAME, &self.state).is_some_and(|state| state.armed)
    }

    fn arm(&self, state: &mut ApproachState) {
        if state.armed {
            return;
        }
        let Some(listener) = listener_of(&self.this) else {
            return;
        };
        self.sensors.register_listener(SensorKind::IrGesture, listener);
        self.votes.vote_for_state(true, CapabilityMask::of(Gesture::Approach));
        state.armed = true;
        tracing::info!(observer = NAME, client = %self.votes.client(), "armed");
    }

    fn disarm(&self, state: &mut ApproachState) {
        if !state.armed {
            return;
        }
        if let Some(listener) = listener_of(&self.this) {
            self.sensors.unregister_listener(SensorKind::IrGesture, &listener);
        }
        self.votes.vote_for_state(false, CapabilityMask::EMPTY);
        state.armed = false;
        tracing::info!(observer = NAME, "disarmed");
    }
}

impl ScreenStateObserver for IrApproachSensor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn screen_turned_on(&self) {
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        state.screen_off = false;
        self.disarm(&mut state);
    }

    fn screen_turned_off(&self) {
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        state.screen_off = true;
        if self.is_enabled() {
            self.arm(&mut state);
        } else {
            self.disarm(&mut state);
        }
    }

    fn preference_changed(&self, key: PreferenceKey, enabled: bool) {
        if key != PreferenceKey::GestureIr {
            return;
        }
        self.enabled.store(enabled, Ordering::Relaxed);
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        if !enabled {
            self.disarm(&mut state);
        } else if state.screen_off {
            self.arm(&mut state);
        }
    }
}

impl SensorListener for IrApproachSensor {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        if event.sensor != SensorKind::IrGesture {
            return;
        }
        let gesture = event.gesture_code().and_then(Gesture::from_code);
        let fire = {
            let Some(state) = lock_state(NAME, &self.state) else {
                return;
            };
            state.armed && gesture == Some(Gesture::Approach) && self.is_enabled()
        };
        if fire {
            tracing::debug!(observer = NAME, values = ?event.values, "approach gesture");
            self.action.action();
        }
    }
}
