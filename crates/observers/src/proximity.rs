//! Debounce state shared by the observers.
//!
//! Pure state - no I/O, no locking. Each observer owns its own instances
//! behind its own mutex.

use devactions_host::Timestamp;
use std::time::Duration;

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Proximity and stow state tracked by the attentive display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProximityState {
    pub is_object_detected: bool,
    pub is_stowed: bool,
    pub last_state_change_time: Timestamp,
    pub armed_since: Timestamp,
}

impl ProximityState {
    /// Start a fresh session: nothing detected, not stowed.
    pub fn arm(&mut self, now: Timestamp) {
        *self = Self {
            is_object_detected: false,
            is_stowed: false,
            last_state_change_time: now,
            armed_since: now,
        };
    }

    /// Returns `true` if the value changed.
    pub fn set_object_detected(&mut self, detected: bool, now: Timestamp) -> bool {
        let changed = self.is_object_detected != detected;
        self.is_object_detected = detected;
        if changed {
            self.last_state_change_time = now;
        }
        changed
    }

    /// Returns `true` if the value changed.
    pub fn set_stowed(&mut self, stowed: bool, now: Timestamp) -> bool {
        let changed = self.is_stowed != stowed;
        self.is_stowed = stowed;
        if changed {
            self.last_state_change_time = now;
        }
        changed
    }

    pub fn screen_should_lock(&self) -> bool {
        self.is_object_detected && !self.is_stowed
    }

    /// Last instant at which a reading is still honored.
    pub fn validity_deadline(&self, window: Duration) -> Timestamp {
        self.armed_since.saturating_add(millis(window))
    }

    /// The deadline itself is still inside the window.
    pub fn is_within_window(&self, now: Timestamp, window: Duration) -> bool {
        now <= self.validity_deadline(window)
    }
}

/// Ignores gestures that arrive too soon after arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingGuard {
    armed_at: Timestamp,
    min_delay: Duration,
}

impl TimingGuard {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            armed_at: 0,
            min_delay,
        }
    }

    pub fn arm(&mut self, now: Timestamp) {
        self.armed_at = now;
    }

    pub fn armed_at(&self) -> Timestamp {
        self.armed_at
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// A gesture at exactly `armed_at + min_delay` is allowed.
    pub fn allows(&self, now: Timestamp) -> bool {
        now.saturating_sub(self.armed_at) >= millis(self.min_delay)
    }
}

/// Detects a true-to-false transition of a boolean reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallingEdge {
    last: bool,
}

impl FallingEdge {
    /// Record `current`; returns `true` iff the previous reading was `true`
    /// and this one is `false`.
    pub fn update(&mut self, current: bool) -> bool {
        let fell = self.last && !current;
        self.last = current;
        fell
    }

    pub fn last(&self) -> bool {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = false;
    }
}

/// Pick-up detection from the flat-up and stow sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickupEdge {
    flat: FallingEdge,
    is_stowed: bool,
}

impl PickupEdge {
    pub fn set_stowed(&mut self, stowed: bool) {
        self.is_stowed = stowed;
    }

    pub fn is_stowed(&self) -> bool {
        self.is_stowed
    }

    pub fn last_flat(&self) -> bool {
        self.flat.last()
    }

    /// Record a flat-up reading; returns `true` when the device was just
    /// lifted off a flat surface while not stowed and the feature is on.
    pub fn evaluate(&mut self, flat: bool, enabled: bool) -> bool {
        let lifted = self.flat.update(flat);
        lifted && !self.is_stowed && enabled
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
