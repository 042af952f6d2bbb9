//! Per-client vote bookkeeping and the fold into one detector configuration.

use crate::hardware::{DetectorConfig, GestureHardwareRef};
use crate::mask::CapabilityMask;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identity of one voting client. Every observer instance gets its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// One client's latest request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vote {
    pub active: bool,
    pub mask: CapabilityMask,
}

#[derive(Default)]
struct AggregatorState {
    votes: HashMap<ClientId, Vote>,
    published: DetectorConfig,
}

impl AggregatorState {
    /// Fold every vote into one configuration.
    ///
    /// Masks of inactive votes never contribute.
    fn fold(&self) -> DetectorConfig {
        self.votes
            .values()
            .filter(|vote| vote.active)
            .fold(DetectorConfig::INACTIVE, |acc, vote| DetectorConfig {
                active: true,
                mask: acc.mask | vote.mask,
            })
    }
}

/// Collects per-client votes and publishes their union to the hardware.
///
/// Vote, recompute and publish happen under one mutex, so interleaved votes
/// from different sensor threads always leave the hardware holding the fold
/// of the votes observed so far.
pub struct CapabilityVoteAggregator {
    hardware: GestureHardwareRef,
    state: Mutex<AggregatorState>,
    next_client: AtomicU64,
}

impl CapabilityVoteAggregator {
    /// The hardware is assumed to start inactive; nothing is pushed until a
    /// vote changes that.
    pub fn new(hardware: GestureHardwareRef) -> Self {
        Self {
            hardware,
            state: Mutex::new(AggregatorState::default()),
            next_client: AtomicU64::new(1),
        }
    }

    /// Allocate a fresh client identity.
    pub fn register_client(&self) -> ClientId {
        ClientId(self.next_client.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate a client and wrap it in a handle bound to this aggregator.
    pub fn handle(self: &Arc<Self>) -> VoteHandle {
        VoteHandle {
            client: self.register_client(),
            aggregator: Arc::clone(self),
        }
    }

    /// Record `client`'s vote, replacing its previous one.
    ///
    /// Pushes the new configuration to the hardware exactly once if the fold
    /// changed; otherwise the hardware is not touched.
    pub fn vote(&self, client: ClientId, active: bool, mask: CapabilityMask) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!(%client, "vote state poisoned, recovering");
                poisoned.into_inner()
            }
        };

        state.votes.insert(client, Vote { active, mask });

        let next = state.fold();
        if next == state.published {
            tracing::trace!(%client, active, %mask, "vote did not change detector config");
            return;
        }

        tracing::debug!(
            %client,
            active = next.active,
            mask = %next.mask,
            "publishing detector config"
        );
        state.published = next;
        self.hardware.configure(next);
    }

    /// Configuration last pushed to the hardware.
    pub fn published(&self) -> DetectorConfig {
        match self.state.lock() {
            Ok(state) => state.published,
            Err(poisoned) => poisoned.into_inner().published,
        }
    }

    /// Latest vote of `client`, if it ever voted.
    pub fn vote_of(&self, client: ClientId) -> Option<Vote> {
        match self.state.lock() {
            Ok(state) => state.votes.get(&client).copied(),
            Err(poisoned) => poisoned.into_inner().votes.get(&client).copied(),
        }
    }
}

/// One client's voting handle.
///
/// Cloning the handle keeps the same client identity.
#[derive(Clone)]
pub struct VoteHandle {
    client: ClientId,
    aggregator: Arc<CapabilityVoteAggregator>,
}

impl VoteHandle {
    pub fn client(&self) -> ClientId {
        self.client
    }

    /// Vote an explicit activation state and mask.
    pub fn vote_for_state(&self, active: bool, mask: CapabilityMask) {
        self.aggregator.vote(self.client, active, mask);
    }

    /// Vote for a mask; the detector is requested active iff the mask is non-empty.
    pub fn vote_for_sensors(&self, mask: CapabilityMask) {
        self.aggregator.vote(self.client, !mask.is_empty(), mask);
    }

    /// Withdraw any activation request.
    pub fn revoke(&self) {
        self.aggregator.vote(self.client, false, CapabilityMask::EMPTY);
    }

    /// This client's latest vote.
    pub fn current(&self) -> Vote {
        self.aggregator.vote_of(self.client).unwrap_or_default()
    }
}

impl std::fmt::Debug for VoteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteHandle")
            .field("client", &self.client)
            .field("vote", &self.current())
            .finish()
    }
}
