//! Property tests for the vote aggregator.
//!
//! Every vote sequence must leave the hardware holding exactly the union of
//! the active clients' masks, and repeated identical votes must not reach it.

use devactions_vote::{
    CapabilityMask, CapabilityVoteAggregator, DetectorConfig, InMemoryGestureHardware,
};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

const CLIENTS: usize = 4;

#[derive(Debug, Clone)]
struct Op {
    client: usize,
    active: bool,
    bits: u32,
}

fn arb_op() -> impl Strategy<Value = Op> {
    (0..CLIENTS, any::<bool>(), 0u32..(1 << 11)).prop_map(|(client, active, bits)| Op {
        client,
        active,
        bits: bits & !1,
    })
}

fn expected(model: &HashMap<usize, (bool, u32)>) -> DetectorConfig {
    let active: Vec<_> = model.values().filter(|(active, _)| *active).collect();
    if active.is_empty() {
        return DetectorConfig::INACTIVE;
    }
    DetectorConfig {
        active: true,
        mask: CapabilityMask::from_bits(active.iter().fold(0u32, |acc, (_, bits)| acc | *bits)),
    }
}

proptest! {
    /// After every single vote the published config equals the fold of the model.
    #[test]
    fn published_mask_is_union_of_active_votes(ops in prop::collection::vec(arb_op(), 1..64)) {
        let hardware = Arc::new(InMemoryGestureHardware::new());
        let aggregator = Arc::new(CapabilityVoteAggregator::new(hardware.clone()));
        let handles: Vec<_> = (0..CLIENTS).map(|_| aggregator.handle()).collect();
        let mut model = HashMap::new();

        for op in ops {
            handles[op.client].vote_for_state(op.active, CapabilityMask::from_bits(op.bits));
            model.insert(op.client, (op.active, op.bits));

            let want = expected(&model);
            prop_assert_eq!(aggregator.published(), want);
            prop_assert_eq!(hardware.current(), want);
        }
    }

    /// Consecutive hardware calls always differ, so a repeated vote never reaches it.
    #[test]
    fn hardware_never_sees_duplicate_configs(ops in prop::collection::vec(arb_op(), 1..64)) {
        let hardware = Arc::new(InMemoryGestureHardware::new());
        let aggregator = Arc::new(CapabilityVoteAggregator::new(hardware.clone()));
        let handles: Vec<_> = (0..CLIENTS).map(|_| aggregator.handle()).collect();

        for op in ops {
            let before = hardware.call_count();
            handles[op.client].vote_for_state(op.active, CapabilityMask::from_bits(op.bits));
            handles[op.client].vote_for_state(op.active, CapabilityMask::from_bits(op.bits));
            prop_assert!(hardware.call_count() <= before + 1);
        }

        let configs = hardware.configs();
        prop_assert_ne!(configs.first().copied(), Some(DetectorConfig::INACTIVE));
        for pair in configs.windows(2) {
            prop_assert_ne!(pair[0], pair[1]);
        }
    }
}
