use super::{listener_of, lock_state, ScreenStateObserver};
use crate::actions::SensorActionRef;
use crate::preferences::PreferenceKey;
use crate::proximity::FallingEdge;
use devactions_host::{SensorEvent, SensorHubRef, SensorKind, SensorListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

const NAME: &str = "stow_pickup";

#[derive(Debug, Default)]
struct StowState {
    armed: bool,
    screen_off: bool,
    stowed: FallingEdge,
}

/// Fires when the device is taken out of a pocket while the screen is off.
pub struct StowPickupSensor {
    this: Weak<Self>,
    sensors: SensorHubRef,
    action: SensorActionRef,
    enabled: AtomicBool,
    state: Mutex<StowState>,
}

impl StowPickupSensor {
    pub fn new(sensors: SensorHubRef, action: SensorActionRef, enabled: bool) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            sensors,
            action,
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(StowState::default()),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn is_armed(&self) -> bool {
        lock_state(NAME, &self.state).is_some_and(|state| state.armed)
    }

    fn arm(&self, state: &mut StowState) {
        if state.armed {
            return;
        }
        let Some(listener) = listener_of(&self.this) else {
            return;
        };
        state.stowed.reset();
        self.sensors.register_listener(SensorKind::Stow, listener);
        state.armed = true;
        tracing::info!(observer = NAME, "armed");
    }

    fn disarm(&self, state: &mut StowState) {
        if !state.armed {
            return;
        }
        if let Some(listener) = listener_of(&self.this) {
            self.sensors.unregister_listener(SensorKind::Stow, &listener);
        }
        state.armed = false;
        tracing::info!(observer = NAME, "disarmed");
    }
}

impl ScreenStateObserver for StowPickupSensor {
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
        if key != PreferenceKey::PickUp {
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

impl SensorListener for StowPickupSensor {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        let fire = {
            let Some(mut state) = lock_state(NAME, &self.state) else {
                return;
            };
            if !state.armed {
                return;
            }
            match (event.sensor, event.flag()) {
                (SensorKind::Stow, Some(stowed)) => {
                    tracing::debug!(observer = NAME, stowed, "stow event");
                    state.stowed.update(stowed) && self.is_enabled()
                }
                _ => false,
            }
        };
        if fire {
            tracing::debug!(observer = NAME, "device unstowed");
            self.action.action();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SensorAction;
    use devactions_host::InMemorySensorHub;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingAction(AtomicUsize);

    impl SensorAction for CountingAction {
        fn action(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_fires_on_unstow_only() {
        let hub = Arc::new(InMemorySensorHub::new());
        let action = Arc::new(CountingAction::default());
        let sensor = StowPickupSensor::new(hub.clone(), action.clone(), true);
        sensor.screen_turned_off();

        hub.emit_flag(SensorKind::Stow, false);
        hub.emit_flag(SensorKind::Stow, true);
        hub.emit_flag(SensorKind::Stow, true);
        assert_eq!(action.0.load(Ordering::SeqCst), 0);

        hub.emit_flag(SensorKind::Stow, false);
        hub.emit_flag(SensorKind::Stow, false);
        assert_eq!(action.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_tracks_edge_without_firing() {
        let hub = Arc::new(InMemorySensorHub::new());
        let action = Arc::new(CountingAction::default());
        let sensor = StowPickupSensor::new(hub.clone(), action.clone(), true);
        sensor.screen_turned_off();

        hub.emit_flag(SensorKind::Stow, true);
        sensor.preference_changed(PreferenceKey::PickUp, false);
        assert!(!hub.is_registered(SensorKind::Stow));

        hub.emit_flag(SensorKind::Stow, false);
        assert_eq!(action.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_screen_on_disarms() {
        let hub = Arc::new(InMemorySensorHub::new());
        let action = Arc::new(CountingAction::default());
        let sensor = StowPickupSensor::new(hub.clone(), action, true);
        sensor.screen_turned_off();
        sensor.screen_turned_on();
        assert!(!sensor.is_armed());
        assert_eq!(hub.unregister_calls(), vec![SensorKind::Stow]);
    }
}
