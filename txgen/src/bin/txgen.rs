use anyhow::Context as _;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shardbench_core::StoppableService;
use shardbench_txgen::{
    BatchScheduler, DispatchQueue, GeneratorSettings, Keyring, Listener, NetworkConfig,
    PendingCrossTxs, PoolManager, SchedulerTiming, TcpTransport,
};
use std::fs::{self, File};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[clap(version)]
struct Cli {
    /// nodes of the benchmark network
    #[clap(long, value_parser, default_value = "local_config.yaml")]
    config_file: PathBuf,

    /// maximum number of transactions generated per shard and per tick
    #[clap(long, value_parser, default_value_t = GeneratorSettings::DEFAULT_MAX_NUM_TXS_PER_BATCH)]
    max_num_txs_per_batch: usize,

    /// directory of the `txgen.log` file
    #[clap(long, value_parser, default_value = "latest")]
    log_folder: PathBuf,

    #[clap(long, value_parser, default_value_t = GeneratorSettings::DEFAULT_NUM_OF_ADDRESS)]
    num_of_address: u64,

    #[clap(long, value_parser, default_value = "10")]
    warmup_secs: u64,

    #[clap(long, value_parser, default_value = "60")]
    duration_secs: u64,

    #[clap(long, value_parser, default_value = "500")]
    tick_interval_ms: u64,

    /// seed of the random draws, taken from the OS if not set
    #[clap(long, value_parser)]
    seed: Option<u64>,
}

fn init_logging(log_folder: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(log_folder)
        .with_context(|| format!("cannot create log folder {}", log_folder.display()))?;
    let log_path = log_folder.join("txgen.log");
    let log_file = File::create(&log_path)
        .with_context(|| format!("cannot create log file {}", log_path.display()))?;

    let stdout_layer = tracing_subscriber::fmt::layer();
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(stdout_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        config_file,
        max_num_txs_per_batch,
        log_folder,
        num_of_address,
        warmup_secs,
        duration_secs,
        tick_interval_ms,
        seed,
    } = Cli::parse();

    init_logging(&log_folder)?;

    let config = NetworkConfig::from_file(&config_file)?;
    let (leaders, shard_ids) = config.leaders_and_shard_ids();
    let validators = config.validators();
    let settings =
        GeneratorSettings::for_shards(shard_ids.len(), num_of_address, max_num_txs_per_batch);
    let timing = SchedulerTiming {
        warmup: Duration::from_secs(warmup_secs),
        total_duration: Duration::from_secs(duration_secs),
        tick_interval: Duration::from_millis(tick_interval_ms),
    };
    info!(
        shards = shard_ids.len(),
        validators = validators.len(),
        cross_shard = settings.cross_shard,
        num_of_address,
        max_num_txs_per_batch,
        "starting the transaction generator"
    );

    let keyring = Arc::new(Keyring::generate(num_of_address));
    let pools = PoolManager::bootstrap(&shard_ids, &keyring);

    let (listener, pending) = match config.client_port() {
        Some(port) => {
            let pending = PendingCrossTxs::new();
            let address = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = Listener::bind(address, pools.clone(), Some(pending.clone())).await?;
            (Some(listener), Some(pending))
        }
        None => (None, None),
    };

    let dispatch = DispatchQueue::spawn(Arc::new(TcpTransport::default()));
    let mut scheduler =
        BatchScheduler::new(settings, timing, pools, keyring, leaders, validators, dispatch);
    if let Some(pending) = pending.clone() {
        scheduler = scheduler.with_pending(pending);
    }

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = scheduler.run(rng).await?;

    if let Some(listener) = listener {
        listener.stop().await?;
    }
    if let Some(pending) = pending {
        info!(
            pending = pending.len().await,
            "cross shard transactions without proofs"
        );
    }
    info!(
        ticks = report.ticks,
        single_shard = report.single_shard_txs,
        cross_shard = report.cross_shard_txs,
        deliveries = report.dispatch.deliveries,
        failures = report.dispatch.failures,
        "done"
    );

    Ok(())
}
