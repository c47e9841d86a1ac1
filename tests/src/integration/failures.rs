//! # Failure Handling
//!
//! Block-level failures leave no trace; transaction-level failures only
//! show up on receipts.

#[cfg(test)]
mod tests {
    use crate::harness::{add, call, call_tx, node_config, set, TestNode};
    use shared_types::{Address, TransactionStatus};
    use sl_03_executor::{encode_counter, ShardId};
    use sl_04_scheduler::{BlockExecutionApi, BlockState, ErrorClass, FailureReason, SchedulerError};
    use std::sync::Arc;
    use std::time::Duration;

    const A: Address = [0xA1; 20];
    const B: Address = [0xB2; 20];
    const OWNERS: [(Address, ShardId); 2] = [(A, 0), (B, 1)];

    async fn wait_for(node: &TestNode, number: u64, state: BlockState) {
        for _ in 0..400 {
            if node.scheduler.state_of(number) == Some(state.clone()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("block {number} never reached {state:?}");
    }

    #[tokio::test]
    async fn test_failed_commit_is_invisible_after_restart() {
        let config = node_config(2);
        let node = TestNode::start_with(&config, &OWNERS).await.unwrap();
        node.execute(vec![call_tx(A, &[add(b"n", 1)], 0)]).await.unwrap();
        let root_before = node.committed_state_root();

        node.storage.fail_next_commit();
        let result = node
            .execute(vec![call_tx(A, &[add(b"n", 1), call(B, vec![add(b"n", 1)])], 1)])
            .await;
        match result {
            Err(e @ SchedulerError::CommitFailed(_)) => assert_eq!(e.class(), ErrorClass::BlockFatal),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(node.storage.open_scopes(), 0);
        assert_eq!(node.committed_state_root(), root_before);
        assert_eq!(node.ledger.contract_shard(&B).unwrap(), Some(1));

        let reopened = TestNode::open(&config, node.storage.clone()).await.unwrap();
        assert_eq!(reopened.ledger.latest_block_number().unwrap(), 1);
        assert_eq!(reopened.counter(A, b"n"), Some(1));
        assert_eq!(reopened.counter(B, b"n"), None);
        reopened.assert_consistent(1).unwrap();
    }

    #[tokio::test]
    async fn test_flaky_shard_is_retried_transparently() {
        let node = TestNode::start_with(&node_config(2), &OWNERS).await.unwrap();
        // Two attempts fail before the block goes through.
        node.shards[1].fail_next(2);

        let finalized = node
            .execute(vec![call_tx(B, &[add(b"n", 1)], 0), call_tx(A, &[call(B, vec![add(b"n", 1)])], 1)])
            .await
            .unwrap();
        assert!(finalized.block().receipts.iter().all(|r| r.status.is_success()));
        assert_eq!(node.counter(B, b"n"), Some(2));
    }

    #[tokio::test]
    async fn test_shard_outage_fails_block_after_retries() {
        let mut config = node_config(2);
        config.scheduler.executor_retry_attempts = 1;
        let node = TestNode::start_with(&config, &OWNERS).await.unwrap();
        node.shards[1].set_down(true);

        let txs = vec![call_tx(A, &[add(b"n", 1), call(B, vec![add(b"n", 1)])], 0)];
        let result = node.execute(txs.clone()).await;
        match result {
            Err(e @ SchedulerError::ExecutorUnavailable { shard: 1, attempts: 2, .. }) => {
                assert_eq!(e.class(), ErrorClass::Transient);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            node.scheduler.state_of(1),
            Some(BlockState::Failed(FailureReason::ExecutorUnavailable(_)))
        ));
        assert_eq!(node.ledger.latest_block_number().unwrap(), 0);

        node.shards[1].set_down(false);
        node.execute(txs).await.unwrap();
        assert_eq!(node.counter(B, b"n"), Some(1));
    }

    #[tokio::test]
    async fn test_cancelled_block_can_be_resubmitted() {
        let node = TestNode::start_with(&node_config(2), &OWNERS).await.unwrap();
        node.shards[0].set_batch_delay(Duration::from_secs(10));

        let txs = vec![call_tx(A, &[add(b"n", 1)], 0)];
        let scheduler = Arc::clone(&node.scheduler);
        let block = node.next_block(txs.clone()).unwrap();
        let running = tokio::spawn(async move { scheduler.execute_block(block).await });

        wait_for(&node, 1, BlockState::Executing).await;
        let api: &dyn BlockExecutionApi = node.scheduler.as_ref();
        api.cancel(1).unwrap();

        assert!(matches!(running.await.unwrap(), Err(SchedulerError::Cancelled(1))));
        assert_eq!(api.state_of(1), Some(BlockState::Failed(FailureReason::Cancelled)));
        assert!(matches!(api.cancel(1), Err(SchedulerError::NotInFlight(1))));
        assert_eq!(node.counter(A, b"n"), None);

        node.shards[0].set_batch_delay(Duration::ZERO);
        node.execute(txs).await.unwrap();
        assert_eq!(node.counter(A, b"n"), Some(1));
    }

    #[tokio::test]
    async fn test_unresolved_conflict_only_fails_transaction() {
        let mut config = node_config(2);
        config.scheduler.max_reexecutions = 0;
        let node = TestNode::start_with(&config, &OWNERS).await.unwrap();

        // tx 0 writes A.k through a call from B's shard; tx 1 on A's shard
        // cannot see that write optimistically and must be re-executed.
        let finalized = node
            .execute(vec![
                call_tx(B, &[call(A, vec![set(b"k", encode_counter(1))])], 0),
                call_tx(A, &[add(b"k", 1), add(b"seen", 1)], 1),
                call_tx(A, &[add(b"other", 1)], 2),
            ])
            .await
            .unwrap();

        let receipts = &finalized.block().receipts;
        assert_eq!(receipts[0].status, TransactionStatus::Success);
        assert_eq!(receipts[1].status, TransactionStatus::ExecutionConflictUnresolved);
        assert_eq!(receipts[1].gas_used, 0);
        assert_eq!(receipts[2].status, TransactionStatus::Success);
        assert_eq!(node.counter(A, b"k"), Some(1));
        assert_eq!(node.counter(A, b"seen"), None);
        assert_eq!(node.counter(A, b"other"), Some(1));
        node.assert_consistent(1).unwrap();
    }

    #[tokio::test]
    async fn test_malformed_sender_rejects_whole_block() {
        let node = TestNode::start(&node_config(1)).await.unwrap();
        let mut bad = call_tx(A, &[add(b"n", 1)], 1);
        bad.sender = vec![0xAB; 33];

        let result = node.execute(vec![call_tx(A, &[add(b"n", 1)], 0), bad]).await;
        assert!(matches!(result, Err(SchedulerError::Planning(_))));
        assert_eq!(node.counter(A, b"n"), None);
        assert_eq!(node.ledger.latest_block_number().unwrap(), 0);
    }
}
