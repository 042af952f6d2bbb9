//! Gesture observers.
//!
//! Every observer is a two-state machine (disarmed, armed) driven by an
//! external arming signal and gated by one feature preference. While armed it
//! holds its sensor registrations and, for the IR observers, a live vote in
//! the shared [`CapabilityVoteAggregator`](devactions_vote::CapabilityVoteAggregator).
//!
//! Observers build themselves with [`Arc::new_cyclic`] and keep a weak
//! reference to themselves so they can hand the sensor hub a
//! [`SensorListenerRef`] from inside `&self` callbacks. Raw events are routed
//! by a `match` on [`SensorKind`](devactions_host::SensorKind); anything that
//! does not match is dropped.

mod alarm_silencer;
mod attentive;
mod call_silencer;
mod flashlight;
mod ir_approach;
mod pickup;
mod stow;

pub use alarm_silencer::{
    AlarmBroadcast, AlarmSilencer, ALARM_ALERT_ACTION, ALARM_DISMISS_ACTION, ALARM_DONE_ACTION,
    ALARM_SNOOZE_ACTION,
};
pub use attentive::AttentiveDisplay;
pub use call_silencer::CallSilencer;
pub use flashlight::FlashlightSensor;
pub use ir_approach::IrApproachSensor;
pub use pickup::PickupSensor;
pub use stow::StowPickupSensor;

use crate::preferences::PreferenceKey;
use devactions_host::{SensorListener, SensorListenerRef};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Receives screen power transitions and preference changes.
pub trait ScreenStateObserver: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
    fn screen_turned_on(&self);
    fn screen_turned_off(&self);
    fn preference_changed(&self, key: PreferenceKey, enabled: bool);
}

pub type ScreenStateObserverRef = Arc<dyn ScreenStateObserver>;

/// Lock an observer's state, skipping the caller's work on a poisoned lock.
pub(crate) fn lock_state<'a, T>(
    observer: &'static str,
    state: &'a Mutex<T>,
) -> Option<MutexGuard<'a, T>> {
    match state.lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
            tracing::warn!(observer, "observer state poisoned, skipping");
            None
        }
    }
}

/// Upgrade an observer's self reference into a listener for the sensor hub.
///
/// `None` only while the observer is being dropped.
pub(crate) fn listener_of<T>(this: &Weak<T>) -> Option<SensorListenerRef>
where
    T: SensorListener + 'static,
{
    this.upgrade().map(|observer| observer as SensorListenerRef)
}
