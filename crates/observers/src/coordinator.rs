//! Fan-out of host signals to the observers.

use crate::actions::DeviceState;
use crate::observers::{AlarmSilencer, CallSilencer, ScreenStateObserverRef};
use crate::preferences::PreferenceKey;
use devactions_host::CallState;
use std::sync::Arc;

/// Delivers screen, alarm, call and preference signals.
///
/// Screen transitions go to every registered observer in registration
/// order. Alarm and call signals go only to the matching silencer.
/// Observers are idempotent, so repeated signals are passed through as is.
pub struct LifecycleCoordinator {
    device: Arc<DeviceState>,
    observers: Vec<ScreenStateObserverRef>,
    alarm_silencer: Option<Arc<AlarmSilencer>>,
    call_silencer: Option<Arc<CallSilencer>>,
}

impl LifecycleCoordinator {
    pub fn new(device: Arc<DeviceState>) -> Self {
        Self {
            device,
            observers: Vec::new(),
            alarm_silencer: None,
            call_silencer: None,
        }
    }

    pub fn with_observer(mut self, observer: ScreenStateObserverRef) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_alarm_silencer(mut self, silencer: Arc<AlarmSilencer>) -> Self {
        self.alarm_silencer = Some(silencer);
        self
    }

    pub fn with_call_silencer(mut self, silencer: Arc<CallSilencer>) -> Self {
        self.call_silencer = Some(silencer);
        self
    }

    pub fn device(&self) -> &Arc<DeviceState> {
        &self.device
    }

    pub fn observer_names(&self) -> Vec<&'static str> {
        self.observers.iter().map(|observer| observer.name()).collect()
    }

    pub fn screen_turned_on(&self) {
        tracing::info!(observers = self.observers.len(), "screen turned on");
        self.device.set_screen_on(true);
        for observer in &self.observers {
            observer.screen_turned_on();
        }
    }

    pub fn screen_turned_off(&self) {
        tracing::info!(observers = self.observers.len(), "screen turned off");
        self.device.set_screen_on(false);
        for observer in &self.observers {
            observer.screen_turned_off();
        }
    }

    pub fn alarm_state_on(&self) {
        if let Some(silencer) = &self.alarm_silencer {
            silencer.alarm_state_on();
        }
    }

    pub fn alarm_state_off(&self) {
        if let Some(silencer) = &self.alarm_silencer {
            silencer.alarm_state_off();
        }
    }

    pub fn alarm_broadcast(&self, action: &str) {
        if let Some(silencer) = &self.alarm_silencer {
            silencer.alarm_broadcast(action);
        }
    }

    pub fn call_state_changed(&self, state: CallState) {
        if let Some(silencer) = &self.call_silencer {
            silencer.call_state_changed(state);
        }
    }

    /// Forward a preference change to everything that may own the key.
    pub fn preference_changed(&self, key: PreferenceKey, enabled: bool) {
        tracing::debug!(%key, enabled, "preference changed");
        for observer in &self.observers {
            observer.preference_changed(key, enabled);
        }
        if let Some(silencer) = &self.alarm_silencer {
            silencer.preference_changed(key, enabled);
        }
        if let Some(silencer) = &self.call_silencer {
            silencer.preference_changed(key, enabled);
        }
    }

    /// Like [`preference_changed`](Self::preference_changed) for a raw
    /// storage key. Returns `false` if the key is not one of ours.
    pub fn preference_changed_str(&self, key: &str, enabled: bool) -> bool {
        match key.parse::<PreferenceKey>() {
            Ok(key) => {
                self.preference_changed(key, enabled);
                true
            }
            Err(err) => {
                tracing::debug!(%err, "ignoring preference change");
                false
            }
        }
    }
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("observers", &self.observer_names())
            .field("alarm_silencer", &self.alarm_silencer.is_some())
            .field("call_silencer", &self.call_silencer.is_some())
            .finish_non_exhaustive()
    }
}
