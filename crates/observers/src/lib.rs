//! Gesture observers for device actions.
//!
//! Each observer arms on a host signal (screen off, screen on, alarm or
//! call ringing), registers its sensors, votes for the IR detector
//! capabilities it needs, and fires an action sink when its trigger rule
//! matches. The lifecycle coordinator fans host signals out to all of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                            │
//! │  proximity.rs   - debounce state, timing guard, edges       │
//! │  screen_lock.rs - acquire-once wake lock with dim hold      │
//! │  config.rs      - timings, attentive mode, ConfigError      │
//! │  preferences.rs - feature keys and their defaults           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Observer Layer                           │
//! │  observers/  - pickup, stow, flashlight, IR approach,       │
//! │                attentive display, alarm and call silencers  │
//! │  actions.rs  - flashlight and doze pulse sinks              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                          │
//! │  coordinator.rs - screen/alarm/call/preference fan-out      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use devactions_host::{InMemoryBroadcaster, InMemorySensorHub, ManualClock, SensorKind};
//! use devactions_observers::{
//!     DeviceState, DozePulseAction, LifecycleCoordinator, PickupSensor, DOZE_PULSE_ACTION,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let hub = Arc::new(InMemorySensorHub::new());
//! let broadcaster = Arc::new(InMemoryBroadcaster::new());
//! let device = Arc::new(DeviceState::new());
//! let doze = Arc::new(DozePulseAction::new(
//!     broadcaster.clone(),
//!     Arc::new(ManualClock::new(0)),
//!     device.clone(),
//!     Duration::from_millis(1500),
//! ));
//! let pickup = PickupSensor::new(hub.clone(), doze, true);
//!
//! let coordinator = LifecycleCoordinator::new(device).with_observer(pickup);
//! coordinator.screen_turned_off();
//!
//! hub.emit_flag(SensorKind::FlatUp, true);
//! hub.emit_flag(SensorKind::FlatUp, false);
//! assert_eq!(broadcaster.count_of(DOZE_PULSE_ACTION), 1);
//! ```

mod actions;
pub mod config;
mod coordinator;
pub mod observers;
mod preferences;
pub mod proximity;
mod screen_lock;

pub use actions::{
    DeviceState, DozePulseAction, FlashlightAction, SensorAction, SensorActionRef,
    DOZE_PULSE_ACTION,
};
pub use config::{ActionsConfig, AttentiveMode, ConfigError, Result, Timings};
pub use coordinator::LifecycleCoordinator;
pub use observers::{
    AlarmBroadcast, AlarmSilencer, AttentiveDisplay, CallSilencer, FlashlightSensor,
    IrApproachSensor, PickupSensor, ScreenStateObserver, ScreenStateObserverRef,
    StowPickupSensor,
};
pub use preferences::{PreferenceKey, Preferences};
pub use proximity::{FallingEdge, PickupEdge, ProximityState, TimingGuard};
pub use screen_lock::ScreenLock;
