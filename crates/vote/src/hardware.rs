//! Hardware configuration boundary.
//!
//! The aggregator never talks to a driver directly; it pushes the folded
//! configuration through [`GestureHardware`], which keeps the voting logic
//! testable without a device.

use crate::mask::CapabilityMask;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Detector configuration pushed to the hardware boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Whether the detector should be registered at all.
    pub active: bool,
    /// Gestures the detector should recognize. Always empty while inactive.
    pub mask: CapabilityMask,
}

impl DetectorConfig {
    pub const INACTIVE: DetectorConfig = DetectorConfig {
        active: false,
        mask: CapabilityMask::EMPTY,
    };
}

/// Boundary to the gesture detector driver.
pub trait GestureHardware: Send + Sync {
    /// Apply a new detector configuration.
    ///
    /// Only called when the configuration differs from the previous one.
    fn configure(&self, config: DetectorConfig);
}

/// Type alias for a shared hardware boundary.
pub type GestureHardwareRef = Arc<dyn GestureHardware>;

/// In-memory hardware boundary for testing.
///
/// Captures every configuration it receives for later inspection.
#[derive(Default)]
pub struct InMemoryGestureHardware {
    configs: Mutex<Vec<DetectorConfig>>,
}

impl InMemoryGestureHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// All configurations received, oldest first.
    pub fn configs(&self) -> Vec<DetectorConfig> {
        self.configs.lock().unwrap().clone()
    }

    /// Most recent configuration, or inactive if nothing was pushed yet.
    pub fn current(&self) -> DetectorConfig {
        self.configs
            .lock()
            .unwrap()
            .last()
            .copied()
            .unwrap_or(DetectorConfig::INACTIVE)
    }

    /// Number of configure calls.
    pub fn call_count(&self) -> usize {
        self.configs.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.configs.lock().unwrap().clear();
    }
}

impl GestureHardware for InMemoryGestureHardware {
    fn configure(&self, config: DetectorConfig) {
        self.configs.lock().unwrap().push(config);
    }
}

/// Hardware boundary that discards every configuration.
pub struct NullGestureHardware;

impl GestureHardware for NullGestureHardware {
    fn configure(&self, _config: DetectorConfig) {}
}
