//! Wake resources.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Screen wake resources the core can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeResource {
    /// Keeps the screen on at full brightness.
    ScreenBright,
    /// Keeps the screen on, dimmed.
    ScreenDim,
}

/// Power substrate.
///
/// Acquisition is assumed to succeed. A timed acquisition expires on its own
/// and never needs a matching `release`.
pub trait PowerManager: Send + Sync {
    fn acquire(&self, resource: WakeResource);
    fn acquire_for(&self, resource: WakeResource, duration: Duration);
    fn release(&self, resource: WakeResource);
}

pub type PowerManagerRef = Arc<dyn PowerManager>;

/// A call made against [`InMemoryPower`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCall {
    Acquire(WakeResource),
    AcquireFor(WakeResource, Duration),
    Release(WakeResource),
}

/// In-memory power substrate that records every call.
#[derive(Default)]
pub struct InMemoryPower {
    calls: Mutex<Vec<PowerCall>>,
}

impl InMemoryPower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PowerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether an untimed hold on `resource` is currently outstanding.
    pub fn is_held(&self, resource: WakeResource) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .fold(false, |held, call| match *call {
                PowerCall::Acquire(r) if r == resource => true,
                PowerCall::Release(r) if r == resource => false,
                _ => held,
            })
    }

    /// Number of untimed acquisitions of `resource`.
    pub fn acquire_count(&self, resource: WakeResource) -> usize {
        self.count(|call| *call == PowerCall::Acquire(resource))
    }

    pub fn release_count(&self, resource: WakeResource) -> usize {
        self.count(|call| *call == PowerCall::Release(resource))
    }

    /// Number of timed acquisitions of `resource`.
    pub fn timed_acquire_count(&self, resource: WakeResource) -> usize {
        self.count(|call| matches!(call, PowerCall::AcquireFor(r, _) if *r == resource))
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn count(&self, pred: impl Fn(&PowerCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(*c)).count()
    }
}

impl PowerManager for InMemoryPower {
    fn acquire(&self, resource: WakeResource) {
        self.calls.lock().unwrap().push(PowerCall::Acquire(resource));
    }

    fn acquire_for(&self, resource: WakeResource, duration: Duration) {
        self.calls
            .lock()
            .unwrap()
            .push(PowerCall::AcquireFor(resource, duration));
    }

    fn release(&self, resource: WakeResource) {
        self.calls.lock().unwrap().push(PowerCall::Release(resource));
    }
}
