//! Sensor registration and raw event delivery.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Sensors the device actions core listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// IR gesture detector; axis 1 carries the gesture code.
    IrGesture,
    /// Device stowed in a pocket or bag; axis 0 non-zero when stowed.
    Stow,
    /// Device lying flat face up; axis 0 non-zero when flat.
    FlatUp,
    /// Chop-chop motion gesture; any event is a trigger.
    ChopChop,
}

impl SensorKind {
    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::IrGesture => "ir_gesture",
            SensorKind::Stow => "stow",
            SensorKind::FlatUp => "flat_up",
            SensorKind::ChopChop => "chop_chop",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One raw reading delivered by the sensor substrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub sensor: SensorKind,
    pub values: Vec<f32>,
}

impl SensorEvent {
    pub fn new(sensor: SensorKind, values: impl Into<Vec<f32>>) -> Self {
        Self {
            sensor,
            values: values.into(),
        }
    }

    /// Value of one axis, `None` when the event is shorter than that.
    pub fn axis(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Boolean reading of axis 0 (non-zero is true).
    pub fn flag(&self) -> Option<bool> {
        self.axis(0).map(|v| v != 0.0)
    }

    /// Gesture code carried in axis 1, truncated to an integer.
    pub fn gesture_code(&self) -> Option<i32> {
        self.axis(1).filter(|v| v.is_finite()).map(|v| v as i32)
    }
}

/// Receiver of raw sensor events.
pub trait SensorListener: Send + Sync {
    fn on_sensor_changed(&self, event: &SensorEvent);
}

pub type SensorListenerRef = Arc<dyn SensorListener>;

/// Sensor registration substrate.
///
/// A listener is identified by its allocation; registering the same listener
/// twice for one sensor is a no-op, and unregistering a listener that is not
/// registered is a no-op.
pub trait SensorHub: Send + Sync {
    fn register_listener(&self, sensor: SensorKind, listener: SensorListenerRef);
    fn unregister_listener(&self, sensor: SensorKind, listener: &SensorListenerRef);
}

pub type SensorHubRef = Arc<dyn SensorHub>;

fn same_listener(a: &SensorListenerRef, b: &SensorListenerRef) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// In-memory sensor substrate for testing and simulation.
///
/// Keeps the live registrations and delivers events pushed through
/// [`InMemorySensorHub::emit`] to every listener registered for that sensor.
#[derive(Default)]
pub struct InMemorySensorHub {
    registrations: Mutex<Vec<(SensorKind, SensorListenerRef)>>,
    register_calls: Mutex<Vec<SensorKind>>,
    unregister_calls: Mutex<Vec<SensorKind>>,
}

impl InMemorySensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every listener currently registered for `sensor`.
    ///
    /// Returns how many listeners received it.
    pub fn emit(&self, sensor: SensorKind, values: &[f32]) -> usize {
        let event = SensorEvent::new(sensor, values);

        // Listeners may (un)register from inside the callback.
        let targets: Vec<SensorListenerRef> = self
            .registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _)| *kind == sensor)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::trace!(%sensor, listeners = targets.len(), "delivering sensor event");
        for listener in &targets {
            listener.on_sensor_changed(&event);
        }
        targets.len()
    }

    /// Convenience for flag sensors: emits `1.0` or `0.0` on axis 0.
    pub fn emit_flag(&self, sensor: SensorKind, value: bool) -> usize {
        self.emit(sensor, &[if value { 1.0 } else { 0.0 }])
    }

    /// Convenience for the IR detector: emits the gesture code on axis 1.
    pub fn emit_gesture(&self, code: i32) -> usize {
        self.emit(SensorKind::IrGesture, &[0.0, code as f32, 0.0])
    }

    pub fn listener_count(&self, sensor: SensorKind) -> usize {
        self.registrations
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _)| *kind == sensor)
            .count()
    }

    pub fn is_registered(&self, sensor: SensorKind) -> bool {
        self.listener_count(sensor) > 0
    }

    /// Total live registrations across all sensors.
    pub fn total_registrations(&self) -> usize {
        self.registrations.lock().unwrap().len()
    }

    /// Sensors passed to `register_listener`, in call order.
    pub fn register_calls(&self) -> Vec<SensorKind> {
        self.register_calls.lock().unwrap().clone()
    }

    /// Sensors passed to `unregister_listener`, in call order.
    pub fn unregister_calls(&self) -> Vec<SensorKind> {
        self.unregister_calls.lock().unwrap().clone()
    }
}

impl SensorHub for InMemorySensorHub {
    fn register_listener(&self, sensor: SensorKind, listener: SensorListenerRef) {
        self.register_calls.lock().unwrap().push(sensor);
        let mut registrations = self.registrations.lock().unwrap();
        let exists = registrations
            .iter()
            .any(|(kind, existing)| *kind == sensor && same_listener(existing, &listener));
        if !exists {
            registrations.push((sensor, listener));
        }
    }

    fn unregister_listener(&self, sensor: SensorKind, listener: &SensorListenerRef) {
        self.unregister_calls.lock().unwrap().push(sensor);
        self.registrations
            .lock()
            .unwrap()
            .retain(|(kind, existing)| !(*kind == sensor && same_listener(existing, listener)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        seen: AtomicUsize,
    }

    impl SensorListener for Counter {
        fn on_sensor_changed(&self, _event: &SensorEvent) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_event_axis_decoding() {
        let event = SensorEvent::new(SensorKind::IrGesture, vec![0.0, 9.0, 0.0]);
        assert_eq!(event.gesture_code(), Some(9));
        assert_eq!(event.flag(), Some(false));

        let short = SensorEvent::new(SensorKind::Stow, vec![1.0]);
        assert_eq!(short.flag(), Some(true));
        assert_eq!(short.gesture_code(), None);

        let empty = SensorEvent::new(SensorKind::Stow, Vec::new());
        assert_eq!(empty.flag(), None);

        let nan = SensorEvent::new(SensorKind::IrGesture, vec![0.0, f32::NAN]);
        assert_eq!(nan.gesture_code(), None);
    }

    #[test]
    fn test_register_is_idempotent_per_sensor() {
        let hub = InMemorySensorHub::new();
        let counter = Arc::new(Counter::default());
        let listener: SensorListenerRef = counter.clone();

        hub.register_listener(SensorKind::Stow, listener.clone());
        hub.register_listener(SensorKind::Stow, listener.clone());
        assert_eq!(hub.listener_count(SensorKind::Stow), 1);

        assert_eq!(hub.emit_flag(SensorKind::Stow, true), 1);
        assert_eq!(counter.seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_is_per_sensor() {
        let hub = InMemorySensorHub::new();
        let listener: SensorListenerRef = Arc::new(Counter::default());

        hub.register_listener(SensorKind::Stow, listener.clone());
        hub.register_listener(SensorKind::IrGesture, listener.clone());
        hub.unregister_listener(SensorKind::Stow, &listener);

        assert!(!hub.is_registered(SensorKind::Stow));
        assert!(hub.is_registered(SensorKind::IrGesture));
        assert_eq!(hub.unregister_calls(), vec![SensorKind::Stow]);

        // Not registered any more: harmless.
        hub.unregister_listener(SensorKind::Stow, &listener);
        assert_eq!(hub.total_registrations(), 1);
    }

    #[test]
    fn test_emit_without_listeners() {
        let hub = InMemorySensorHub::new();
        assert_eq!(hub.emit_gesture(1), 0);
    }
}
