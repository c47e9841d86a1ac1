//! # Block Execution Benchmarks
//!
//! | Scenario | Shards | Contention |
//! |----------|--------|------------|
//! | `independent` | 1, 4 | none: every transaction owns its slot |
//! | `cross_shard` | 4 | every transaction calls a contract on another shard |
//! | `hot_slot` | 4 | every transaction increments one slot |

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use shared_types::{Address, Transaction};
use sl_tests::harness::{add, call, call_tx, node_config};
use sl_tests::TestNode;
use std::time::Duration;
use tokio::runtime::Runtime;

const CONTRACTS: [Address; 4] = [[0xA0; 20], [0xA1; 20], [0xA2; 20], [0xA3; 20]];

fn independent(count: u64) -> Vec<Transaction> {
    (0..count)
        .map(|i| call_tx(CONTRACTS[i as usize % 4], &[add(&i.to_be_bytes(), 1)], i))
        .collect()
}

fn cross_shard(count: u64) -> Vec<Transaction> {
    (0..count)
        .map(|i| {
            let target = CONTRACTS[i as usize % 4];
            let callee = CONTRACTS[(i as usize + 1) % 4];
            call_tx(target, &[call(callee, vec![add(&i.to_be_bytes(), 1)])], i)
        })
        .collect()
}

fn hot_slot(count: u64) -> Vec<Transaction> {
    (0..count)
        .map(|i| call_tx(CONTRACTS[i as usize % 4], &[call(CONTRACTS[0], vec![add(b"hot", 1)])], i))
        .collect()
}

fn bench_scenario(
    c: &mut Criterion,
    runtime: &Runtime,
    name: &str,
    shard_counts: &[u16],
    build: fn(u64) -> Vec<Transaction>,
) {
    let mut group = c.benchmark_group(format!("sl-04-scheduler/{name}"));
    group.measurement_time(Duration::from_secs(5));
    let owners: Vec<_> = CONTRACTS.iter().enumerate().map(|(i, c)| (*c, i as u16)).collect();

    for &shards in shard_counts {
        for count in [16u64, 128] {
            group.throughput(Throughput::Elements(count));
            group.bench_with_input(BenchmarkId::new(format!("{shards}_shards"), count), &count, |b, &count| {
                b.iter_batched(
                    || {
                        let owners: Vec<_> = owners.iter().map(|(c, s)| (*c, s % shards)).collect();
                        let node = runtime
                            .block_on(TestNode::start_with(&node_config(shards), &owners))
                            .unwrap();
                        (node, build(count))
                    },
                    |(node, txs)| runtime.block_on(node.execute(txs)).unwrap(),
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_block_execution(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    bench_scenario(c, &runtime, "independent", &[1, 4], independent);
    bench_scenario(c, &runtime, "cross_shard", &[4], cross_shard);
    bench_scenario(c, &runtime, "hot_slot", &[4], hot_slot);
}

criterion_group!(benches, bench_block_execution);
criterion_main!(benches);
