//! Host collaborator boundaries for device actions.
//!
//! Everything the gesture core needs from the platform is expressed as a
//! small trait here: sensor registration and delivery, wake resources,
//! telephony, intent broadcasts, the torch and vibrator, preferences and the
//! clock. Each trait has an in-memory implementation that records what it
//! was asked to do, so the core can be exercised without a device.

mod clock;
mod outputs;
mod power;
mod preferences;
mod sensor;

pub use clock::{Clock, ClockRef, ManualClock, SystemClock, Timestamp};
pub use outputs::{
    Broadcaster, BroadcasterRef, CallState, InMemoryBroadcaster, InMemoryTelecom, InMemoryTorch,
    InMemoryVibrator, Telecom, TelecomRef, Torch, TorchRef, Vibrator, VibratorRef,
};
pub use power::{InMemoryPower, PowerCall, PowerManager, PowerManagerRef, WakeResource};
pub use preferences::{InMemoryPreferenceStore, PreferenceStore, PreferenceStoreRef};
pub use sensor::{
    InMemorySensorHub, SensorEvent, SensorHub, SensorHubRef, SensorKind, SensorListener,
    SensorListenerRef,
};
