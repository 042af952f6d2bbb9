use super::{listener_of, lock_state, ScreenStateObserver};
use crate::actions::SensorActionRef;
use crate::preferences::PreferenceKey;
use crate::proximity::PickupEdge;
use devactions_host::{SensorEvent, SensorHubRef, SensorKind, SensorListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

const NAME: &str = "pickup";

#[derive(Debug, Default)]
struct PickupState {
    armed: bool,
    screen_off: bool,
    edge: PickupEdge,
}

/// Fires when the device is lifted off a flat surface while the screen is
/// off. The stow sensor suppresses the trigger while the device is pocketed.
pub struct PickupSensor {
    this: Weak<Self>,
    sensors: SensorHubRef,
    action: SensorActionRef,
    enabled: AtomicBool,
    state: Mutex<PickupState>,
}

impl PickupSensor {
    pub fn new(sensors: SensorHubRef, action: SensorActionRef, enabled: bool) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            sensors,
            action,
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(PickupState::default()),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn is_armed(&self) -> bool {
        lock_state(NAME, &self.state).is_some_and(|state| state.armed)
    }

    fn arm(&self, state: &mut PickupState) {
        if state.armed {
            return;
        }
        let Some(listener) = listener_of(&self.this) else {
            return;
        };
        state.edge.reset();
        self.sensors.register_listener(SensorKind::FlatUp, listener.clone());
        self.sensors.register_listener(SensorKind::Stow, listener);
        state.armed = true;
        tracing::info!(observer = NAME, "armed");
    }

    fn disarm(&self, state: &mut PickupState) {
        if !state.armed {
            return;
        }
        if let Some(listener) = listener_of(&self.this) {
            self.sensors.unregister_listener(SensorKind::FlatUp, &listener);
            self.sensors.unregister_listener(SensorKind::Stow, &listener);
        }
        state.armed = false;
        tracing::info!(observer = NAME, "disarmed");
    }
}

impl ScreenStateObserver for PickupSensor {
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

impl SensorListener for PickupSensor {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        let Some(value) = event.flag() else {
            tracing::debug!(observer = NAME, sensor = %event.sensor, "event without a reading");
            return;
        };
        let fire = {
            let Some(mut state) = lock_state(NAME, &self.state) else {
                return;
            };
            if !state.armed {
                return;
            }
            match event.sensor {
                SensorKind::FlatUp => {
                    tracing::debug!(
                        observer = NAME,
                        flat = value,
                        last_flat = state.edge.last_flat(),
                        stowed = state.edge.is_stowed(),
                        "flat-up event"
                    );
                    state.edge.evaluate(value, self.is_enabled())
                }
                SensorKind::Stow => {
                    state.edge.set_stowed(value);
                    false
                }
                _ => false,
            }
        };
        if fire {
            tracing::debug!(observer = NAME, "device picked up");
            self.action.action();
        }
    }
}
