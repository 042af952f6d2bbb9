use super::ScreenStateObserver;
use crate::actions::SensorActionRef;
use crate::preferences::PreferenceKey;
use devactions_host::{SensorEvent, SensorHubRef, SensorKind, SensorListener, SensorListenerRef};
use std::sync::Arc;

const NAME: &str = "flashlight";

/// Chop-chop listener, registered once at construction and never disarmed.
///
/// The feature switch lives in the action sink; preference changes are
/// forwarded to it.
pub struct FlashlightSensor {
    action: SensorActionRef,
}

impl FlashlightSensor {
    pub fn new(sensors: &SensorHubRef, action: SensorActionRef) -> Arc<Self> {
        let sensor = Arc::new(Self { action });
        tracing::info!(observer = NAME, "listening for chop-chop");
        sensors.register_listener(SensorKind::ChopChop, Arc::clone(&sensor) as SensorListenerRef);
        sensor
    }
}

impl ScreenStateObserver for FlashlightSensor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn screen_turned_on(&self) {}

    fn screen_turned_off(&self) {}

    fn preference_changed(&self, key: PreferenceKey, enabled: bool) {
        self.action.preference_changed(key, enabled);
    }
}

impl SensorListener for FlashlightSensor {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        if event.sensor != SensorKind::ChopChop {
            return;
        }
        tracing::debug!(observer = NAME, "activate flashlight");
        self.action.action();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::FlashlightAction;
    use devactions_host::{InMemorySensorHub, InMemoryTorch, InMemoryVibrator};
    use std::time::Duration;

    #[test]
    fn test_chop_toggles_torch_regardless_of_screen() {
        let hub = Arc::new(InMemorySensorHub::new());
        let torch = Arc::new(InMemoryTorch::new());
        let action = Arc::new(FlashlightAction::new(
            torch.clone(),
            Arc::new(InMemoryVibrator::new()),
            Duration::from_millis(250),
            true,
        ));
        let sensors: SensorHubRef = hub.clone();
        let sensor = FlashlightSensor::new(&sensors, action);

        sensor.screen_turned_off();
        hub.emit_flag(SensorKind::ChopChop, true);
        sensor.screen_turned_on();
        hub.emit_flag(SensorKind::ChopChop, true);

        assert_eq!(torch.toggle_count(), 2);
        assert_eq!(hub.listener_count(SensorKind::ChopChop), 1);
    }

    #[test]
    fn test_preference_reaches_action() {
        let hub = Arc::new(InMemorySensorHub::new());
        let torch = Arc::new(InMemoryTorch::new());
        let action = Arc::new(FlashlightAction::new(
            torch.clone(),
            Arc::new(InMemoryVibrator::new()),
            Duration::from_millis(250),
            true,
        ));
        let sensors: SensorHubRef = hub.clone();
        let sensor = FlashlightSensor::new(&sensors, action.clone());

        sensor.preference_changed(PreferenceKey::Flashlight, false);
        hub.emit_flag(SensorKind::ChopChop, true);

        assert!(!action.is_enabled());
        assert_eq!(torch.toggle_count(), 0);
        // Still registered; the switch is checked in the sink.
        assert!(hub.is_registered(SensorKind::ChopChop));
    }
}
