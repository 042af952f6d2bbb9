use super::{listener_of, lock_state};
use crate::preferences::PreferenceKey;
use crate::proximity::TimingGuard;
use devactions_host::{
    BroadcasterRef, ClockRef, SensorEvent, SensorHubRef, SensorKind, SensorListener,
};
use devactions_vote::{CapabilityMask, Gesture, VoteHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

const NAME: &str = "alarm_silencer";

pub const ALARM_ALERT_ACTION: &str = "com.android.deskclock.ALARM_ALERT";
pub const ALARM_SNOOZE_ACTION: &str = "com.android.deskclock.ALARM_SNOOZE";
pub const ALARM_DISMISS_ACTION: &str = "com.android.deskclock.ALARM_DISMISS";
pub const ALARM_DONE_ACTION: &str = "com.android.deskclock.ALARM_DONE";

/// Desk clock broadcasts the alarm silencer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmBroadcast {
    Alert,
    Snooze,
    Dismiss,
    Done,
}

impl AlarmBroadcast {
    /// `None` for any other action name.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            ALARM_ALERT_ACTION => Some(AlarmBroadcast::Alert),
            ALARM_SNOOZE_ACTION => Some(AlarmBroadcast::Snooze),
            ALARM_DISMISS_ACTION => Some(AlarmBroadcast::Dismiss),
            ALARM_DONE_ACTION => Some(AlarmBroadcast::Done),
            _ => None,
        }
    }

    pub fn is_ringing(&self) -> bool {
        matches!(self, AlarmBroadcast::Alert)
    }
}

#[derive(Debug)]
struct AlarmState {
    armed: bool,
    ringing: bool,
    guard: TimingGuard,
}

/// Snoozes a ringing alarm on an IR swipe.
///
/// Swipes arriving before the silence delay has elapsed since the alarm
/// started are ignored.
pub struct AlarmSilencer {
    this: Weak<Self>,
    sensors: SensorHubRef,
    votes: VoteHandle,
    broadcaster: BroadcasterRef,
    clock: ClockRef,
    enabled: AtomicBool,
    state: Mutex<AlarmState>,
}

impl AlarmSilencer {
    pub fn new(
        sensors: SensorHubRef,
        votes: VoteHandle,
        broadcaster: BroadcasterRef,
        clock: ClockRef,
        silence_delay: Duration,
        enabled: bool,
    ) -> Arc<Self> {
        votes.vote_for_sensors(CapabilityMask::EMPTY);
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            sensors,
            votes,
            broadcaster,
            clock,
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(AlarmState {
                armed: false,
                ringing: false,
                guard: TimingGuard::new(silence_delay),
            }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn is_armed(&self) -> bool {
        lock_state(NAME, &self.state).is_some_and(|state| state.armed)
    }

    pub fn alarm_state_on(&self) {
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        state.ringing = true;
        if self.is_enabled() {
            tracing::info!(observer = NAME, "alarm started");
            self.arm(&mut state);
        } else {
            self.disarm(&mut state);
        }
    }

    pub fn alarm_state_off(&self) {
        let Some(mut state) = lock_state(NAME, &self.state) else {
            return;
        };
        state.ringing = false;
        tracing::info!(observer = NAME, "alarm stopped");
        self.disarm(&mut state);
    }

    /// Route a desk clock broadcast. Unknown actions are ignored.
    pub fn alarm_broadcast(&self, action: &str) {
        match AlarmBroadcast::parse(action) {
            Some(broadcast) if broadcast.is_ringing() => self.alarm_state_on(),
            Some(_) => self.alarm_state_off(),
            None => tracing::debug!(observer = NAME, action, "ignoring unknown alarm broadcast"),
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
        } else if state.ringing {
            self.arm(&mut state);
        }
    }

    fn arm(&self, state: &mut AlarmState) {
        if state.armed {
            return;
        }
        let Some(listener) = listener_of(&self.this) else {
            return;
        };
        self.sensors.register_listener(SensorKind::IrGesture, listener);
        self.votes.vote_for_sensors(CapabilityMask::of(Gesture::Swipe));
        state.guard.arm(self.clock.now_ms());
        state.armed = true;
    }

    fn disarm(&self, state: &mut AlarmState) {
        if !state.armed {
            return;
        }
        if let Some(listener) = listener_of(&self.this) {
            self.sensors.unregister_listener(SensorKind::IrGesture, &listener);
        }
        self.votes.vote_for_sensors(CapabilityMask::EMPTY);
        state.armed = false;
    }
}

impl SensorListener for AlarmSilencer {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        if event.sensor != SensorKind::IrGesture {
            return;
        }
        if event.gesture_code().and_then(Gesture::from_code) != Some(Gesture::Swipe) {
            return;
        }
        let now = self.clock.now_ms();
        let snooze = {
            let Some(state) = lock_state(NAME, &self.state) else {
                return;
            };
            if !state.armed || !self.is_enabled() {
                return;
            }
            let allowed = state.guard.allows(now);
            if !allowed {
                tracing::debug!(
                    observer = NAME,
                    now,
                    armed_at = state.guard.armed_at(),
                    delay = ?state.guard.min_delay(),
                    "ignoring swipe too close to alarm start"
                );
            }
            allowed
        };
        if snooze {
            tracing::debug!(observer = NAME, "sending alarm snooze");
            self.broadcaster.broadcast(ALARM_SNOOZE_ACTION);
        }
    }
}
