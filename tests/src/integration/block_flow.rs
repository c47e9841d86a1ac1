//! # Block Flow
//!
//! Genesis, then blocks appended one after another on a single node and
//! across independent nodes.

#[cfg(test)]
mod tests {
    use crate::harness::{add, call_tx, create_tx, node_config, set, TestNode};
    use sl_02_ledger::{GenesisConfig, LedgerError};
    use sl_03_executor::{create_address, encode_counter, gas};
    use sl_04_scheduler::NodeConfig;
    use shared_types::{ParentInfo, TransactionStatus, U256};

    const TOKEN: [u8; 20] = [0x70; 20];

    fn transfers() -> Vec<shared_types::Transaction> {
        vec![
            call_tx(TOKEN, &[add(b"alice", 100)], 0),
            call_tx(TOKEN, &[add(b"bob", 40)], 1),
        ]
    }

    #[tokio::test]
    async fn test_two_transfers_finalize_block_one() {
        let node = TestNode::start(&node_config(1)).await.unwrap();
        let genesis_hash = node.ledger.latest_block_hash().unwrap();
        assert_eq!(node.ledger.latest_block_number().unwrap(), 0);

        let finalized = node.execute(transfers()).await.unwrap();
        let block = finalized.block();

        assert_eq!(finalized.number(), 1);
        assert_eq!(block.receipts.len(), 2);
        assert!(block.receipts.iter().all(|r| r.status == TransactionStatus::Success));
        assert_eq!(
            block.header.gas_used(),
            U256::from(2 * (gas::TX_BASE + gas::ADD))
        );
        assert_eq!(
            block.header.parent_info(),
            &[ParentInfo {
                block_number: 0,
                block_hash: genesis_hash
            }]
        );
        assert_eq!(block.header.txs_root(), block.compute_txs_root());
        assert_eq!(block.header.receipts_root(), block.compute_receipts_root());

        assert_eq!(node.counter(TOKEN, b"alice"), Some(100));
        assert_eq!(node.counter(TOKEN, b"bob"), Some(40));
        node.assert_consistent(1).unwrap();

        assert_eq!(node.ledger.block_hash_at(1).unwrap(), finalized.hash());
        assert_eq!(node.ledger.number_of_hash(&finalized.hash()).unwrap(), Some(1));
        assert_eq!(&node.ledger.block_at(1).unwrap(), block);
    }

    #[tokio::test]
    async fn test_identical_nodes_produce_identical_blocks() {
        let config = node_config(2);
        let a = TestNode::start(&config).await.unwrap();
        let b = TestNode::start(&config).await.unwrap();
        assert_eq!(a.ledger.latest_block_hash().unwrap(), b.ledger.latest_block_hash().unwrap());

        for round in 0..3u64 {
            let txs = vec![
                call_tx(TOKEN, &[add(b"alice", round + 1)], round * 2),
                call_tx([0x71; 20], &[set(b"memo", vec![round as u8])], round * 2 + 1),
            ];
            let x = a.execute(txs.clone()).await.unwrap();
            let y = b.execute(txs).await.unwrap();
            assert_eq!(x.hash(), y.hash());
            assert_eq!(x.block().header.state_root(), y.block().header.state_root());
        }
        assert_eq!(a.committed_state_root(), b.committed_state_root());
    }

    #[tokio::test]
    async fn test_blocks_chain_by_parent_hash() {
        let node = TestNode::start(&node_config(2)).await.unwrap();
        let mut parent = node.ledger.latest_block_hash().unwrap();
        for number in 1..=4u64 {
            let finalized = node
                .execute(vec![call_tx(TOKEN, &[add(b"alice", 1)], number)])
                .await
                .unwrap();
            assert_eq!(finalized.block().header.parent_info()[0].block_hash, parent);
            parent = finalized.hash();
            node.assert_consistent(number).unwrap();
        }
        assert_eq!(node.counter(TOKEN, b"alice"), Some(4));
    }

    #[tokio::test]
    async fn test_created_contract_keeps_its_shard() {
        let node = TestNode::start(&node_config(3)).await.unwrap();
        let contract = create_address(&node.suite, &crate::harness::USER, 0);

        let finalized = node
            .execute(vec![create_tx(&[set(b"owner", b"user".to_vec())], 0)])
            .await
            .unwrap();
        let receipt = &finalized.block().receipts[0];
        assert_eq!(receipt.status, TransactionStatus::Success);
        assert_eq!(receipt.contract_address, Some(contract));
        assert_eq!(
            receipt.gas_used,
            gas::TX_BASE + gas::TX_CREATE + gas::SET
        );
        // First creation of the block lands on shard 0.
        assert_eq!(node.ledger.contract_shard(&contract).unwrap(), Some(0));

        node.execute(vec![call_tx(contract, &[set(b"count", encode_counter(7))], 1)])
            .await
            .unwrap();
        assert_eq!(node.counter(contract, b"count"), Some(7));
        assert_eq!(node.value(contract, b"owner"), Some(b"user".to_vec()));
    }

    #[tokio::test]
    async fn test_restart_resumes_from_tip() {
        let config = node_config(2);
        let node = TestNode::start(&config).await.unwrap();
        node.execute(transfers()).await.unwrap();
        let tip = node.ledger.latest_block_hash().unwrap();
        let storage = node.storage.clone();
        drop(node);

        let reopened = TestNode::open(&config, storage).await.unwrap();
        assert_eq!(reopened.ledger.latest_block_number().unwrap(), 1);
        assert_eq!(reopened.ledger.latest_block_hash().unwrap(), tip);

        reopened.execute(transfers()).await.unwrap();
        assert_eq!(reopened.counter(TOKEN, b"alice"), Some(200));
        reopened.assert_consistent(2).unwrap();
    }

    #[tokio::test]
    async fn test_genesis_is_idempotent_and_guarded() {
        let config = node_config(1);
        let node = TestNode::start(&config).await.unwrap();
        let genesis = node.ledger.block_at(0).unwrap();

        let again = node.ledger.build_genesis(&config.genesis).await.unwrap();
        assert_eq!(again.hash(), genesis.hash());

        let other = GenesisConfig::for_testing("2", config.genesis.tx_gas_limit);
        match node.ledger.build_genesis(&other).await {
            Err(LedgerError::GenesisMismatch { stored_hash }) => {
                assert_eq!(stored_hash, hex::encode(genesis.hash()));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let differently_grouped = NodeConfig {
            genesis: other,
            ..config
        };
        assert!(TestNode::open(&differently_grouped, node.storage.clone()).await.is_err());
    }

    #[tokio::test]
    async fn test_national_cipher_chain() {
        let mut config = node_config(2);
        config.crypto.national_cipher = true;
        let sm = TestNode::start(&config).await.unwrap();
        let standard = TestNode::start(&node_config(2)).await.unwrap();

        let x = sm.execute(transfers()).await.unwrap();
        let y = standard.execute(transfers()).await.unwrap();
        assert_ne!(x.hash(), y.hash());
        assert_eq!(sm.counter(TOKEN, b"alice"), standard.counter(TOKEN, b"alice"));
        sm.assert_consistent(1).unwrap();
    }

    #[tokio::test]
    async fn test_block_metrics_are_exported() {
        shardline_telemetry::register_metrics().unwrap();
        let before = shardline_telemetry::metrics::BLOCKS_FINALIZED.get();

        let node = TestNode::start(&node_config(2)).await.unwrap();
        node.execute(transfers()).await.unwrap();

        assert!(shardline_telemetry::metrics::BLOCKS_FINALIZED.get() > before);
        let text = shardline_telemetry::gather_text().unwrap();
        assert!(text.contains("sl_scheduler_block_execution_seconds"));
        assert!(text.contains("sl_ledger_chain_height"));
    }
}
