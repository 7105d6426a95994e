use std::time::Duration;

/// parameters of the transaction generation, immutable for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// number of synthetic addresses, destinations are drawn in `1..=num_of_address`
    pub num_of_address: u64,
    /// whether cross shard transactions are generated
    pub cross_shard: bool,
    /// maximum number of transactions generated per shard and per tick
    pub max_num_txs_per_batch: usize,
}

impl GeneratorSettings {
    pub const DEFAULT_NUM_OF_ADDRESS: u64 = 10_000;
    pub const DEFAULT_MAX_NUM_TXS_PER_BATCH: usize = 100_000;

    /// cross shard transactions are only generated when there is more
    /// than one shard to cross to
    pub fn for_shards(num_shards: usize, num_of_address: u64, max_num_txs_per_batch: usize) -> Self {
        Self {
            num_of_address,
            cross_shard: num_shards > 1,
            max_num_txs_per_batch,
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            num_of_address: Self::DEFAULT_NUM_OF_ADDRESS,
            cross_shard: false,
            max_num_txs_per_batch: Self::DEFAULT_MAX_NUM_TXS_PER_BATCH,
        }
    }
}

/// timing contract of the [`BatchScheduler`](crate::BatchScheduler)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTiming {
    /// delay before the first tick, for the nodes to get ready
    pub warmup: Duration,
    /// how long ticks are produced, from the first tick
    pub total_duration: Duration,
    /// pause between two ticks
    pub tick_interval: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            warmup: Duration::from_secs(10),
            total_duration: Duration::from_secs(60),
            tick_interval: Duration::from_millis(500),
        }
    }
}
