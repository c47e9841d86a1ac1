//! Prometheus metrics for the execution core.
//!
//! All metrics follow the naming convention: `sl_<subsystem>_<metric>_<unit>`.
//! No exporter is provided; [`gather_text`] renders the text exposition
//! format for whoever serves it.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SCHEDULER METRICS (Subsystem 4)
    // =========================================================================

    /// Blocks that reached `Finalized`
    pub static ref BLOCKS_FINALIZED: IntCounter = IntCounter::new(
        "sl_scheduler_blocks_finalized_total",
        "Total number of blocks executed and committed"
    ).expect("metric creation failed");

    /// Blocks that ended in `Failed`
    pub static ref BLOCKS_FAILED: IntCounter = IntCounter::new(
        "sl_scheduler_blocks_failed_total",
        "Total number of blocks that failed as a unit"
    ).expect("metric creation failed");

    /// Serial re-executions after a footprint conflict
    pub static ref TX_REEXECUTIONS: IntCounter = IntCounter::new(
        "sl_scheduler_tx_reexecutions_total",
        "Total number of conflict-driven transaction re-executions"
    ).expect("metric creation failed");

    /// Transactions that exhausted their re-execution budget
    pub static ref TX_CONFLICTS_UNRESOLVED: IntCounter = IntCounter::new(
        "sl_scheduler_tx_conflicts_unresolved_total",
        "Total number of transactions failed with an unresolved conflict"
    ).expect("metric creation failed");

    /// Cross-shard calls by outcome
    pub static ref CROSS_SHARD_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("sl_scheduler_cross_shard_calls_total", "Cross-shard calls routed"),
        &["outcome"]  // outcome: success/revert/timeout/depth_exceeded/unavailable
    ).expect("metric creation failed");

    /// Wall time of one block from planning to commit
    pub static ref BLOCK_EXECUTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sl_scheduler_block_execution_seconds",
            "Time spent executing and committing one block"
        ).buckets(exponential_buckets(0.0005, 2.0, 16).unwrap_or_default())
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER METRICS (Subsystem 2)
    // =========================================================================

    /// Latest appended block number
    pub static ref CHAIN_HEIGHT: Gauge = Gauge::new(
        "sl_ledger_chain_height",
        "Number of the latest block appended to the ledger"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered metrics are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Scheduler
        Box::new(BLOCKS_FINALIZED.clone()),
        Box::new(BLOCKS_FAILED.clone()),
        Box::new(TX_REEXECUTIONS.clone()),
        Box::new(TX_CONFLICTS_UNRESOLVED.clone()),
        Box::new(CROSS_SHARD_CALLS.clone()),
        Box::new(BLOCK_EXECUTION_DURATION.clone()),
        // Ledger
        Box::new(CHAIN_HEIGHT.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
