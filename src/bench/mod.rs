//! Benchmark harness
//!
//! Runs parallel Set-then-Get-and-verify cycles against any `ValueStore` and
//! reports wall-clock time. Each worker's own duration is collected in a
//! `ConcurrentSequence` and summarised once all workers are done.

use crate::sequence::{ConcurrentSequence, SequenceItem};
use crate::store::{StoreError, Value, ValueStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio_stream::StreamExt;
use tracing::{debug, info};

/// Seed distance between two workers
const SEED_STRIDE: u64 = 500;

/// Benchmark parameters
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of parallel workers
    pub workers: usize,

    /// Set/Get cycles per worker
    pub iterations: usize,

    /// Keys are drawn from `0..key_space`
    pub key_space: u32,

    /// Base RNG seed; worker `i` uses `seed + i * 500`
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        BenchConfig {
            workers: 10,
            iterations: 100_000,
            key_space: 500,
            seed,
        }
    }
}

impl BenchConfig {
    /// Reject parameters the run cannot use
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.key_space == 0 {
            return Err(BenchError::InvalidConfig("key space must be > 0"));
        }
        Ok(())
    }
}

/// Benchmark errors
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid benchmark config: {0}")]
    InvalidConfig(&'static str),

    /// A Get did not return what the same worker just Set
    #[error("{store}: expected {expected} for key {key}, got {got:?}")]
    Mismatch {
        store: &'static str,
        key: String,
        expected: Value,
        got: Option<Value>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("benchmark worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of one parallel run
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub store: &'static str,
    pub workers: usize,
    pub iterations: usize,
    pub elapsed_ms: f64,
    pub slowest_worker_ms: f64,
    pub mean_worker_ms: f64,
}

/// Run `iterations` Set-then-Get cycles on random keys and verify each read
pub async fn run_cycles(
    store: &dyn ValueStore,
    config: &BenchConfig,
    seed: u64,
) -> Result<Duration, BenchError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();

    for _ in 0..config.iterations {
        let key = rng.gen_range(0..config.key_space).to_string();
        let value = Value::from(format!("The value {}", key));

        store.set(&key, value.clone()).await?;
        let got = store.get(&key).await?;

        if got.as_ref() != Some(&value) {
            return Err(BenchError::Mismatch {
                store: store.name(),
                key,
                expected: value,
                got,
            });
        }
    }

    Ok(start.elapsed())
}

/// Run `config.workers` copies of `run_cycles` in parallel
pub async fn run_in_parallel(
    store: Arc<dyn ValueStore>,
    config: &BenchConfig,
) -> Result<BenchReport, BenchError> {
    config.validate()?;

    debug!(
        store = store.name(),
        workers = config.workers,
        iterations = config.iterations,
        "starting parallel run"
    );

    let durations = Arc::new(ConcurrentSequence::new());
    let start = Instant::now();

    let mut handles = Vec::with_capacity(config.workers);
    for worker in 0..config.workers {
        let store = Arc::clone(&store);
        let durations = Arc::clone(&durations);
        let config = config.clone();
        let seed = worker_seed(config.seed, worker);

        handles.push(tokio::spawn(async move {
            let elapsed = run_cycles(store.as_ref(), &config, seed).await?;
            durations.append(duration_micros(elapsed));
            Ok::<_, BenchError>(())
        }));
    }

    for handle in handles {
        handle.await??;
    }
    let elapsed = start.elapsed();

    let (slowest, mean) = summarize(&durations).await;
    let report = BenchReport {
        store: store.name(),
        workers: config.workers,
        iterations: config.iterations,
        elapsed_ms: as_millis(elapsed),
        slowest_worker_ms: as_millis(slowest),
        mean_worker_ms: as_millis(mean),
    };

    info!(store = report.store, elapsed_ms = report.elapsed_ms, "parallel run finished");
    Ok(report)
}

/// Slowest and mean worker duration
async fn summarize(durations: &ConcurrentSequence) -> (Duration, Duration) {
    let mut items = durations.iter();
    let mut slowest = Duration::ZERO;
    let mut total = Duration::ZERO;
    let mut count = 0u32;

    while let Some(SequenceItem { value, .. }) = items.next().await {
        let micros = value.as_integer().unwrap_or_default().max(0) as u64;
        let duration = Duration::from_micros(micros);
        slowest = slowest.max(duration);
        total += duration;
        count += 1;
    }

    let mean = if count == 0 { Duration::ZERO } else { total / count };
    (slowest, mean)
}

/// RNG seed for worker `worker`, wrapping on overflow
fn worker_seed(base: u64, worker: usize) -> u64 {
    base.wrapping_add((worker as u64).wrapping_mul(SEED_STRIDE))
}

/// Microseconds as stored in the duration sequence, saturating
fn duration_micros(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
