//! # Cross-Shard Execution
//!
//! Calls between contracts owned by different shards, and the guarantee
//! that the shard layout never changes a block's outcome.

#[cfg(test)]
mod tests {
    use crate::harness::{add, call, call_tx, node_config, set, TestNode};
    use proptest::prelude::*;
    use shared_types::{Address, Transaction, TransactionStatus};
    use sl_03_executor::{encode_counter, Op, ShardId};
    use std::time::Duration;

    const A: Address = [0xA1; 20];
    const B: Address = [0xB2; 20];
    const C: Address = [0xC3; 20];

    /// Owners spreading A, B and C over distinct shards when there are
    /// enough of them.
    fn owners(shard_count: u16) -> Vec<(Address, ShardId)> {
        [A, B, C]
            .into_iter()
            .enumerate()
            .map(|(i, contract)| (contract, i as ShardId % shard_count))
            .collect()
    }

    async fn node(shard_count: u16) -> TestNode {
        TestNode::start_with(&node_config(shard_count), &owners(shard_count))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_call_effects_land_on_callee() {
        let node = node(3).await;
        let finalized = node
            .execute(vec![call_tx(
                A,
                &[add(b"calls", 1), call(B, vec![add(b"hits", 1), call(C, vec![add(b"hits", 1)])])],
                0,
            )])
            .await
            .unwrap();

        assert_eq!(finalized.block().receipts[0].status, TransactionStatus::Success);
        assert_eq!(node.counter(A, b"calls"), Some(1));
        assert_eq!(node.counter(B, b"hits"), Some(1));
        assert_eq!(node.counter(C, b"hits"), Some(1));
        node.assert_consistent(1).unwrap();
    }

    #[tokio::test]
    async fn test_remote_revert_discards_caller_effects() {
        let node = node(2).await;
        let reverting = call(B, vec![add(b"hits", 1), Op::Revert { reason: b"no".to_vec() }]);
        let finalized = node
            .execute(vec![call_tx(A, &[add(b"calls", 1), reverting], 0)])
            .await
            .unwrap();

        let receipt = &finalized.block().receipts[0];
        assert_eq!(receipt.status, TransactionStatus::Revert);
        assert!(receipt.gas_used > 0);
        assert_eq!(node.counter(A, b"calls"), None);
        assert_eq!(node.counter(B, b"hits"), None);
    }

    #[tokio::test]
    async fn test_tolerated_remote_failure_keeps_caller_effects() {
        let node = node(2).await;
        let tolerated = Op::Call {
            contract: B,
            ops: vec![add(b"hits", 1), Op::Revert { reason: vec![] }],
            allow_failure: true,
        };
        node.execute(vec![call_tx(A, &[add(b"calls", 1), tolerated], 0)])
            .await
            .unwrap();
        assert_eq!(node.counter(A, b"calls"), Some(1));
        assert_eq!(node.counter(B, b"hits"), None);
    }

    #[tokio::test]
    async fn test_call_depth_limit() {
        let mut config = node_config(3);
        config.scheduler.max_call_depth = 2;
        let node = TestNode::start_with(&config, &owners(3)).await.unwrap();

        let too_deep = call(B, vec![call(C, vec![call(A, vec![add(b"deep", 1)])])]);
        let within = call(B, vec![call(C, vec![add(b"deep", 1)])]);
        let finalized = node
            .execute(vec![call_tx(A, &[too_deep], 0), call_tx(A, &[within], 1)])
            .await
            .unwrap();

        let receipts = &finalized.block().receipts;
        assert_eq!(receipts[0].status, TransactionStatus::CallDepthExceeded);
        assert_eq!(receipts[1].status, TransactionStatus::Success);
        assert_eq!(node.counter(A, b"deep"), None);
        assert_eq!(node.counter(C, b"deep"), Some(1));
    }

    #[tokio::test]
    async fn test_slow_callee_times_out() {
        let mut config = node_config(2);
        config.scheduler.cross_shard_timeout_ms = 50;
        let node = TestNode::start_with(&config, &owners(2)).await.unwrap();
        node.shards[1].set_call_delay(Duration::from_millis(500));

        let finalized = node
            .execute(vec![
                call_tx(A, &[add(b"calls", 1), call(B, vec![add(b"hits", 1)])], 0),
                call_tx(A, &[add(b"other", 1)], 1),
            ])
            .await
            .unwrap();

        let receipts = &finalized.block().receipts;
        assert_eq!(receipts[0].status, TransactionStatus::CrossShardTimeout);
        assert_eq!(receipts[1].status, TransactionStatus::Success);
        assert_eq!(node.counter(A, b"calls"), None);
        assert_eq!(node.counter(B, b"hits"), None);
        assert_eq!(node.counter(A, b"other"), Some(1));
    }

    /// tx i sets `A.k := 1`; tx j (later, other shard) adds 1 to `A.k`
    /// through a call. Any serial order gives 2.
    #[tokio::test]
    async fn test_dependent_transactions_are_serializable() {
        for shard_count in [1u16, 4] {
            let node = node(shard_count).await;
            let txs = vec![
                call_tx(A, &[set(b"k", encode_counter(1))], 0),
                call_tx(B, &[call(A, vec![add(b"k", 1)])], 1),
            ];
            let finalized = node.execute(txs).await.unwrap();
            assert!(finalized.block().receipts.iter().all(|r| r.status.is_success()));
            assert_eq!(node.counter(A, b"k"), Some(2), "{shard_count} shards");
        }
    }

    #[tokio::test]
    async fn test_shard_count_does_not_change_block() {
        let txs: Vec<Transaction> = (0..12u64)
            .map(|i| {
                let target = [A, B, C][i as usize % 3];
                let other = [A, B, C][(i as usize + 1) % 3];
                call_tx(target, &[add(b"n", i), call(other, vec![add(b"n", 1)])], i)
            })
            .collect();

        let single = node(1).await.execute(txs.clone()).await.unwrap();
        for shard_count in [2u16, 3] {
            let sharded = node(shard_count).await.execute(txs.clone()).await.unwrap();
            assert_eq!(sharded.hash(), single.hash(), "{shard_count} shards");
        }
    }

    fn op_strategy() -> impl Strategy<Value = (usize, usize, u64, bool)> {
        (0usize..3, 0usize..3, 1u64..10, any::<bool>())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Random read-modify-write blocks give the same block on one shard
        /// and on three.
        #[test]
        fn test_random_blocks_match_single_shard(ops in proptest::collection::vec(op_strategy(), 1..10)) {
            let contracts = [A, B, C];
            let txs: Vec<Transaction> = ops
                .iter()
                .enumerate()
                .map(|(i, (target, other, amount, remote))| {
                    let mut body = vec![add(b"x", *amount)];
                    if *remote {
                        body.push(call(contracts[*other], vec![add(b"x", 1), Op::Get { key: b"x".to_vec() }]));
                    }
                    call_tx(contracts[*target], &body, i as u64)
                })
                .collect();

            let runtime = tokio::runtime::Runtime::new().unwrap();
            let (single, sharded) = runtime.block_on(async {
                let single = node(1).await.execute(txs.clone()).await.unwrap();
                let sharded = node(3).await.execute(txs).await.unwrap();
                (single, sharded)
            });
            prop_assert_eq!(single.hash(), sharded.hash());
        }
    }
}
