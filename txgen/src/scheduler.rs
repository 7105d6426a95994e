use crate::config::Peer;
use crate::dispatch::{DispatchQueue, DispatchStats};
use crate::generator::{Generator, ShardBatch};
use crate::keys::Keyring;
use crate::message::Message;
use crate::pending::PendingCrossTxs;
use crate::pool::PoolManager;
use crate::settings::{GeneratorSettings, SchedulerTiming};
use rand::Rng;
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    WaitingForWarmup,
    Running,
    Draining,
    Stopped,
}

/// totals of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub ticks: usize,
    pub single_shard_txs: usize,
    pub cross_shard_txs: usize,
    pub skipped: usize,
    pub dispatch: DispatchStats,
}

/// drive the generation for the duration of the benchmark
///
/// after the warmup, every tick produces the batch of each shard in the
/// order of the leaders. Each leader receives the single shard batch of its
/// shard and all the leaders receive the cross shard transactions of the
/// tick. Once the duration is elapsed the stop message goes to every
/// validator and every leader.
pub struct BatchScheduler {
    state: SchedulerState,
    settings: GeneratorSettings,
    timing: SchedulerTiming,
    pools: PoolManager,
    keyring: Arc<Keyring>,
    leaders: Vec<Peer>,
    validators: Vec<Peer>,
    pending: Option<PendingCrossTxs>,
    dispatch: DispatchQueue,
}

impl BatchScheduler {
    /// `leaders` are index aligned with the pools of `pools`
    pub fn new(
        settings: GeneratorSettings,
        timing: SchedulerTiming,
        pools: PoolManager,
        keyring: Arc<Keyring>,
        leaders: Vec<Peer>,
        validators: Vec<Peer>,
        dispatch: DispatchQueue,
    ) -> Self {
        Self {
            state: SchedulerState::WaitingForWarmup,
            settings,
            timing,
            pools,
            keyring,
            leaders,
            validators,
            pending: None,
            dispatch,
        }
    }

    /// register the broadcast cross shard transactions in `pending`
    pub fn with_pending(mut self, pending: PendingCrossTxs) -> Self {
        self.pending = Some(pending);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    fn enter(&mut self, state: SchedulerState) {
        debug!(from = ?self.state, to = ?state, "scheduler state change");
        self.state = state;
    }

    pub async fn run<R: Rng>(mut self, mut rng: R) -> anyhow::Result<RunReport> {
        let mut report = RunReport::default();

        info!(warmup = ?self.timing.warmup, "waiting for the nodes");
        sleep(self.timing.warmup).await;

        self.enter(SchedulerState::Running);
        let start = Instant::now();
        while start.elapsed() < self.timing.total_duration {
            self.tick(&mut rng, &mut report).await;
            report.ticks += 1;
            sleep(self.timing.tick_interval).await;
        }

        self.enter(SchedulerState::Draining);
        let peers = self
            .validators
            .iter()
            .chain(self.leaders.iter())
            .cloned()
            .collect();
        self.dispatch.broadcast(peers, Message::Stop);
        report.dispatch = self.dispatch.shutdown().await?;
        self.state = SchedulerState::Stopped;

        info!(
            elapsed = ?start.elapsed(),
            ticks = report.ticks,
            single_shard = report.single_shard_txs,
            cross_shard = report.cross_shard_txs,
            skipped = report.skipped,
            failed_sends = report.dispatch.failures,
            "benchmark run terminated"
        );

        Ok(report)
    }

    /// one sampling pass over the pool of the shard at `shard_index`
    ///
    /// the pools are locked for the pass only, blocks can be applied
    /// between the passes of two shards.
    async fn generate_shard<R: Rng>(&self, shard_index: usize, rng: &mut R) -> ShardBatch {
        let keyring = self.keyring.as_ref();
        self.pools
            .with_pools(|pools| {
                Generator::new(&self.settings, keyring, keyring)
                    .generate_simulated_transactions(shard_index, pools, rng)
            })
            .await
    }

    async fn tick<R: Rng>(&self, rng: &mut R, report: &mut RunReport) {
        let mut cross_shard = Vec::new();
        for (shard_index, leader) in self.leaders.iter().enumerate() {
            let batch = self.generate_shard(shard_index, rng).await;
            info!(
                %leader,
                single_shard = batch.single_shard.len(),
                cross_shard = batch.cross_shard.len(),
                skipped = batch.skipped,
                "generated transactions"
            );
            report.single_shard_txs += batch.single_shard.len();
            report.cross_shard_txs += batch.cross_shard.len();
            report.skipped += batch.skipped;

            self.dispatch
                .send(leader.clone(), Message::TransactionList(batch.single_shard));
            cross_shard.extend(batch.cross_shard);
        }

        if cross_shard.is_empty() {
            return;
        }

        if let Some(pending) = self.pending.as_ref() {
            pending.insert_all(cross_shard.iter()).await;
        }
        self.dispatch.broadcast(
            self.leaders.clone(),
            Message::TransactionList(cross_shard),
        );
    }
}
