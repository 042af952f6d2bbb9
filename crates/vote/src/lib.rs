//! Capability vote aggregation for the shared IR gesture detector.
//!
//! Several independent observers want the same hardware detector running with
//! different gesture capabilities. Each observer casts a vote; the aggregator
//! folds every vote into one detector configuration and pushes it to the
//! hardware boundary only when it actually changes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   vote(active, mask)   ┌────────────────────────────┐
//! │  VoteHandle  │ ─────────────────────▶ │ CapabilityVoteAggregator   │
//! │ (per client) │                        │  votes: ClientId → Vote    │
//! └──────────────┘                        │  published: DetectorConfig │
//!                                         └─────────────┬──────────────┘
//!                                                       │ on change only
//!                                                       ▼
//!                                         ┌────────────────────────────┐
//!                                         │  GestureHardware::configure│
//!                                         └────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use devactions_vote::{CapabilityMask, CapabilityVoteAggregator, Gesture, InMemoryGestureHardware};
//! use std::sync::Arc;
//!
//! let hardware = Arc::new(InMemoryGestureHardware::new());
//! let aggregator = Arc::new(CapabilityVoteAggregator::new(hardware.clone()));
//!
//! let approach = aggregator.handle();
//! let silencer = aggregator.handle();
//!
//! approach.vote_for_state(true, CapabilityMask::of(Gesture::Approach));
//! silencer.vote_for_sensors(CapabilityMask::of(Gesture::Swipe));
//!
//! let config = aggregator.published();
//! assert!(config.active);
//! assert!(config.mask.contains(Gesture::Approach));
//! assert!(config.mask.contains(Gesture::Swipe));
//! ```

mod aggregator;
mod hardware;
mod mask;

pub use aggregator::{CapabilityVoteAggregator, ClientId, Vote, VoteHandle};
pub use hardware::{
    DetectorConfig, GestureHardware, GestureHardwareRef, InMemoryGestureHardware,
    NullGestureHardware,
};
pub use mask::{CapabilityMask, Gesture};
