use anyhow::Context;
use clap::{Parser, ValueEnum};
use ferrummap::bench::{self, BenchConfig, BenchReport};
use ferrummap::{ActorStore, LockedStore, MuxActorStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Which stores to benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    All,
    Locked,
    Actor,
    Mux,
}

impl StoreKind {
    fn includes(self, other: StoreKind) -> bool {
        self == StoreKind::All || self == other
    }
}

/// Benchmark the actor stores against the lock-based store
#[derive(Debug, Parser)]
#[command(name = "ferrummap", version)]
struct Args {
    /// Number of parallel workers
    #[arg(long)]
    workers: Option<usize>,

    /// Set/Get cycles per worker
    #[arg(long)]
    iterations: Option<usize>,

    /// Keys are drawn from 0..KEY_SPACE
    #[arg(long)]
    key_space: Option<u32>,

    /// Base RNG seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Store to run
    #[arg(long, value_enum, default_value_t = StoreKind::All)]
    store: StoreKind,

    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> anyhow::Result<BenchConfig> {
        let defaults = BenchConfig::default();
        let config = BenchConfig {
            workers: self.workers.unwrap_or(defaults.workers),
            iterations: self.iterations.unwrap_or(defaults.iterations),
            key_space: self.key_space.unwrap_or(defaults.key_space),
            seed: self.seed.unwrap_or(defaults.seed),
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so that --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // One runtime thread per CPU core
    let cpus = num_cpus::get();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cpus)
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    runtime.block_on(run(args, cpus))
}

async fn run(args: Args, cpus: usize) -> anyhow::Result<()> {
    let config = args.config()?;
    info!(?config, "FerrumMap benchmark starting");

    if !args.json {
        println!("In parallel on {} CPUs with {} workers", cpus, config.workers);
    }

    let mut reports = Vec::new();

    if args.store.includes(StoreKind::Actor) {
        let store = Arc::new(ActorStore::new());
        let report = bench::run_in_parallel(store.clone(), &config).await;
        store.stop().await.context("Failed to stop ActorStore")?;
        reports.push(print_report(report?, args.json));
    }

    if args.store.includes(StoreKind::Mux) {
        let store = Arc::new(MuxActorStore::new());
        let report = bench::run_in_parallel(store.clone(), &config).await;
        store.stop().await.context("Failed to stop MuxActorStore")?;
        reports.push(print_report(report?, args.json));
    }

    if args.store.includes(StoreKind::Locked) {
        let store = Arc::new(LockedStore::new());
        let report = bench::run_in_parallel(store, &config).await?;
        reports.push(print_report(report, args.json));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

fn print_report(report: BenchReport, json: bool) -> BenchReport {
    if !json {
        println!(
            "{:<15} {:>10.2} ms (slowest worker {:.2} ms, mean {:.2} ms)",
            format!("{}:", report.store),
            report.elapsed_ms,
            report.slowest_worker_ms,
            report.mean_worker_ms
        );
    }
    report
}
