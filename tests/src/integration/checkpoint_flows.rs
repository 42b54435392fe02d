//! Checkpoint flows over a realistic chain length and the default 2016-block
//! confirmation window.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;
    use qc_18_checkpoints::test_utils::{coinbase, nonstandard_script, ChainBuilder};
    use qc_18_checkpoints::{
        CandidateVerdict, ChainStore, CheckpointApi, CheckpointConfig, CheckpointError,
        CheckpointService, InMemoryChainStore, SharedChainState, StandardScriptClassifier,
        CHECKPOINT_CONFIRMATIONS,
    };
    use shared_types::{hash_to_hex, Block, TxOut};

    use crate::init_tracing;

    type Service = CheckpointService<InMemoryChainStore, SharedChainState, StandardScriptClassifier>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Node-side wiring: the chain manager owns the store and the tip and
    /// hands both to the checkpoint service.
    struct Node {
        service: Service,
        store: Arc<InMemoryChainStore>,
        tip: Arc<SharedChainState>,
    }

    impl Node {
        fn new(config: &CheckpointConfig) -> Self {
            init_tracing();
            let store = Arc::new(InMemoryChainStore::new());
            let tip = Arc::new(SharedChainState::default());
            let service = CheckpointService::new(
                config,
                Arc::clone(&store),
                Arc::clone(&tip),
                Arc::new(StandardScriptClassifier),
            )
            .unwrap();
            Self {
                service,
                store,
                tip,
            }
        }

        /// Connect blocks in order, moving the tip after each.
        fn connect(&self, blocks: &[Block]) {
            for block in blocks {
                self.store.connect_block(block.clone());
                self.tip.set_tip(block.height, block.hash());
            }
        }
    }

    fn config_json(pins: &[&Block]) -> String {
        let entries: Vec<String> = pins
            .iter()
            .map(|b| {
                format!(
                    r#"{{"height": {}, "hash": "{}"}}"#,
                    b.height,
                    hash_to_hex(&b.hash())
                )
            })
            .collect();
        format!(r#"{{"checkpoints": [{}]}}"#, entries.join(", "))
    }

    fn config_pinning(pins: &[&Block]) -> CheckpointConfig {
        CheckpointConfig::from_json(&config_json(pins)).unwrap()
    }

    // =============================================================================
    // ANCHOR RESOLUTION
    // =============================================================================

    #[test]
    fn test_empty_set_never_anchors_or_pins() {
        let blocks = ChainBuilder::new().build(100);
        let node = Node::new(&CheckpointConfig::default());
        node.connect(&blocks);

        assert!(!node.service.has_checkpoints());
        assert!(node.service.resolve_anchor(100).unwrap().is_none());
        assert!(node.service.resolve_anchor(1_000_000).unwrap().is_none());
        for block in &blocks {
            assert!(node.service.verify_pinned_hash(block.height, &[0xEE; 32]));
        }
    }

    #[test]
    fn test_cold_resolve_at_single_checkpoint() {
        let blocks = ChainBuilder::new().build(10_000);
        let node = Node::new(&config_pinning(&[&blocks[10_000]]));
        node.connect(&blocks);

        let anchor = node.service.resolve_anchor(10_000).unwrap().unwrap();
        assert_eq!(anchor.hash(), blocks[10_000].hash());
        assert_eq!(anchor.height, 10_000);
        assert!(node.service.latest_configured().is_some());
    }

    #[test]
    fn test_warm_anchor_waits_then_advances() {
        let blocks = ChainBuilder::new().build(20_000);
        let node = Node::new(&config_pinning(&[&blocks[10_000], &blocks[20_000]]));
        node.connect(&blocks[..=19_999]);

        let first = node.service.resolve_anchor(10_000).unwrap().unwrap();
        assert_eq!(first.height, 10_000);

        // Not yet due.
        let waiting = node.service.resolve_anchor(19_999).unwrap().unwrap();
        assert_eq!(waiting.hash(), blocks[10_000].hash());

        node.connect(&blocks[20_000..]);
        let advanced = node.service.resolve_anchor(20_000).unwrap().unwrap();
        assert_eq!(advanced.hash(), blocks[20_000].hash());
        assert_eq!(node.service.cached_anchor().unwrap().height, 20_000);

        // Fully advanced: store is no longer consulted.
        node.store.fail_reads(true);
        assert_eq!(
            node.service.resolve_anchor(25_000).unwrap().unwrap().height,
            20_000
        );
    }

    #[test]
    fn test_restart_rebuilds_anchor_from_store() {
        let blocks = ChainBuilder::new().build(300);
        let config = config_pinning(&[&blocks[100], &blocks[200], &blocks[300]]);
        let node = Node::new(&config);
        node.connect(&blocks[..=250]);
        assert_eq!(node.service.current_anchor().unwrap().unwrap().height, 200);

        // A fresh service over the same store starts cold.
        let restarted = CheckpointService::new(
            &config,
            Arc::clone(&node.store),
            Arc::clone(&node.tip),
            Arc::new(StandardScriptClassifier),
        )
        .unwrap();
        assert!(restarted.cached_anchor().is_none());
        assert_eq!(restarted.current_anchor().unwrap().unwrap().height, 200);
    }

    #[test]
    fn test_due_checkpoint_missing_from_store_is_fatal() {
        let blocks = ChainBuilder::new().build(200);
        let other = ChainBuilder::new().salt(7).build(200);
        let node = Node::new(&config_pinning(&[&blocks[100], &blocks[200]]));
        node.connect(&blocks[..=150]);
        node.service.current_anchor().unwrap();

        // The chain reaches 200 on a history that never contained the pin.
        node.connect(&other[151..]);
        let err = node.service.current_anchor().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(node.service.cached_anchor().unwrap().height, 100);
    }

    // =============================================================================
    // PINNING AND FORK GUARD
    // =============================================================================

    #[test]
    fn test_block_acceptance_rejects_rewritten_history() {
        let blocks = ChainBuilder::new().build(500);
        let rival = ChainBuilder::new().salt(1).build(500);
        let node = Node::new(&config_pinning(&[&blocks[250]]));
        node.connect(&blocks);

        assert!(node.service.verify_pinned_hash(250, &blocks[250].hash()));
        assert!(!node.service.verify_pinned_hash(250, &rival[250].hash()));
        assert!(node.service.verify_pinned_hash(251, &rival[251].hash()));
    }

    #[test]
    fn test_reorg_below_anchor_is_rejected() {
        let blocks = ChainBuilder::new().build(500);
        let node = Node::new(&config_pinning(&[&blocks[250]]));
        node.connect(&blocks);

        let err = node.service.check_fork_point(249).unwrap_err();
        assert_eq!(
            err,
            CheckpointError::ForkBelowCheckpoint {
                fork_height: 249,
                checkpoint_height: 250
            }
        );
        assert!(node.service.check_fork_point(250).is_ok());
        assert!(node.service.check_fork_point(499).is_ok());
    }

    // =============================================================================
    // CANDIDATE EVALUATION
    // =============================================================================

    #[test]
    fn test_deep_standard_block_is_candidate() {
        let blocks = ChainBuilder::new().build(10_000);
        let node = Node::new(&CheckpointConfig::default());
        node.connect(&blocks);

        assert_eq!(node.service.confirmations(), CHECKPOINT_CONFIRMATIONS);
        assert!(node.service.evaluate_candidate(&blocks[5_000], 10_000).unwrap());
        assert!(node.service.is_checkpoint_candidate(&blocks[5_000]).unwrap());
    }

    #[test]
    fn test_next_timestamp_before_candidate_rejects() {
        let blocks = ChainBuilder::new()
            .timestamp_at(5_001, 1_000)
            .build(10_000);
        let node = Node::new(&CheckpointConfig::default());
        node.connect(&blocks);

        assert!(!node.service.evaluate_candidate(&blocks[5_000], 10_000).unwrap());
        assert_eq!(
            node.service
                .evaluate_candidate_verdict(&blocks[5_000], 10_000)
                .unwrap(),
            CandidateVerdict::TimestampsOutOfOrder
        );
    }

    #[test]
    fn test_confirmation_window_boundary() {
        let blocks = ChainBuilder::new().build(3_000);
        let node = Node::new(&CheckpointConfig::default());
        node.connect(&blocks);

        let edge = 3_000 - CHECKPOINT_CONFIRMATIONS;
        assert!(node
            .service
            .evaluate_candidate(&blocks[edge as usize], 3_000)
            .unwrap());
        assert!(!node
            .service
            .evaluate_candidate(&blocks[edge as usize + 1], 3_000)
            .unwrap());
        assert!(!node.service.evaluate_candidate(&blocks[0], 2_000).unwrap());
    }

    #[test]
    fn test_nonstandard_output_rejects_otherwise_good_block() {
        let mut tx = coinbase(500);
        tx.outputs.push(TxOut {
            value: 1,
            pk_script: nonstandard_script(),
        });
        let blocks = ChainBuilder::new().transactions_at(500, vec![tx]).build(3_000);
        let node = Node::new(&CheckpointConfig::default());
        node.connect(&blocks);

        assert!(!node.service.evaluate_candidate(&blocks[500], 3_000).unwrap());
        assert!(node.service.evaluate_candidate(&blocks[501], 3_000).unwrap());
    }

    #[test]
    fn test_orphaned_block_is_soft_miss() {
        let blocks = ChainBuilder::new().build(3_000);
        let rival = ChainBuilder::new().salt(3).build(600);
        let node = Node::new(&CheckpointConfig::default());
        node.connect(&blocks);
        node.store.store_side_block(rival[600].clone());

        assert_eq!(
            node.service
                .evaluate_candidate_verdict(&rival[600], 3_000)
                .unwrap(),
            CandidateVerdict::NotInMainChain
        );
    }

    #[test]
    fn test_mismatched_height_is_caller_bug() {
        let blocks = ChainBuilder::new().build(3_000);
        let node = Node::new(&CheckpointConfig::default());
        node.connect(&blocks);

        let mut block = blocks[400].clone();
        block.height = 401;
        let err = node.service.evaluate_candidate(&block, 3_000).unwrap_err();
        assert!(err.is_caller_bug());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_find_candidates_above_latest_checkpoint() {
        let blocks = ChainBuilder::new().build(3_000);
        let node = Node::new(&config_pinning(&[&blocks[980]]));
        node.connect(&blocks);

        let found = node.service.find_candidates(50).unwrap();
        let heights: Vec<u64> = found.iter().map(|c| c.height).collect();
        assert_eq!(heights, (981..=984).rev().collect::<Vec<u64>>());
        for checkpoint in &found {
            assert_eq!(checkpoint.hash, blocks[checkpoint.height as usize].hash());
        }

        // A found candidate drops straight into a network config.
        let next = config_pinning(&[&blocks[980]]).with_checkpoint(&found[0]);
        assert_eq!(next.build_set().unwrap().len(), 2);
    }

    #[test]
    fn test_store_outage_propagates() {
        let blocks = ChainBuilder::new().build(3_000);
        let node = Node::new(&config_pinning(&[&blocks[100]]));
        node.connect(&blocks);
        node.store.fail_reads(true);

        assert!(node.service.current_anchor().unwrap_err().is_fatal());
        assert!(node
            .service
            .evaluate_candidate(&blocks[100], 3_000)
            .unwrap_err()
            .is_fatal());
        assert!(node.store.view().is_err());
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[test]
    fn test_concurrent_resolvers_see_monotonic_anchors() {
        let blocks = ChainBuilder::new().build(400);
        let pins: Vec<&Block> = (1..=8).map(|i| &blocks[i * 50]).collect();
        let node = Arc::new(Node::new(&config_pinning(&pins)));
        node.connect(&blocks[..=10]);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let node = Arc::clone(&node);
                thread::spawn(move || {
                    let mut last = None;
                    for _ in 0..500 {
                        let anchor = node.service.current_anchor().unwrap().map(|b| b.height);
                        assert!(anchor >= last);
                        last = anchor;
                    }
                    last
                })
            })
            .collect();

        let writer = {
            let node = Arc::clone(&node);
            let tail = blocks[11..].to_vec();
            thread::spawn(move || node.connect(&tail))
        };

        writer.join().unwrap();
        for reader in readers {
            let last = reader.join().unwrap();
            assert!(last.unwrap_or(0) <= 400);
        }
        assert_eq!(node.service.current_anchor().unwrap().unwrap().height, 400);
    }

    #[test]
    fn test_concurrent_candidate_evaluations_agree() {
        let blocks = Arc::new(ChainBuilder::new().build(2_500));
        let node = Arc::new(Node::new(&CheckpointConfig::default()));
        node.connect(&blocks);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let node = Arc::clone(&node);
                let blocks = Arc::clone(&blocks);
                thread::spawn(move || {
                    (0..100)
                        .map(|h| i * 100 + h)
                        .filter(|h| {
                            node.service
                                .evaluate_candidate(&blocks[*h as usize], 2_500)
                                .unwrap()
                        })
                        .count()
                })
            })
            .collect();

        let passed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(passed, 400);
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_resolve_is_idempotent(best in 0u64..=120) {
            let blocks = ChainBuilder::new().build(120);
            let node = Node::new(&config_pinning(&[&blocks[30], &blocks[60], &blocks[90]]));
            node.connect(&blocks[..=best as usize]);

            let first = node.service.resolve_anchor(best).unwrap().map(|b| b.hash());
            let second = node.service.resolve_anchor(best).unwrap().map(|b| b.hash());
            prop_assert_eq!(first, second);
        }
    }
}
