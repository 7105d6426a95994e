use crate::keys::Keyring;
use shardbench_core::{ApplyReport, Block, ShardId, UtxoPool};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// owner of the UTxO pools of every shard
///
/// A single lock guards all the pools: a sampling pass over one shard is
/// serialized against the application of blocks of any shard, so the
/// sampler never observes a pool being modified.
#[derive(Clone, Debug)]
pub struct PoolManager {
    pools: Arc<Mutex<Vec<UtxoPool>>>,
}

impl PoolManager {
    /// the pools, in the order of the shard leaders
    pub fn new(pools: Vec<UtxoPool>) -> Self {
        Self {
            pools: Arc::new(Mutex::new(pools)),
        }
    }

    /// one genesis pool per shard, each address of the keyring owning one
    /// coinbase output in every shard
    pub fn bootstrap(shard_ids: &[ShardId], keyring: &Keyring) -> Self {
        let pools = shard_ids
            .iter()
            .map(|shard_id| UtxoPool::with_testing_addresses(*shard_id, keyring.addresses()))
            .collect();
        Self::new(pools)
    }

    /// run `f` while holding the lock on the pools
    pub async fn with_pools<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&[UtxoPool]) -> T,
    {
        let pools = self.pools.lock().await;
        f(&pools)
    }

    /// copy of the current state of the pools
    pub async fn snapshot(&self) -> Vec<UtxoPool> {
        self.with_pools(|pools| pools.to_vec()).await
    }

    pub async fn num_shards(&self) -> usize {
        self.with_pools(|pools| pools.len()).await
    }

    /// update the pools with the blocks received from the leaders
    ///
    /// each block is applied to the pool of its shard. The lock is taken
    /// for every block so the generator can interleave between blocks.
    pub async fn apply_blocks(&self, blocks: &[Block]) -> ApplyReport {
        let mut total = ApplyReport::default();

        for block in blocks {
            let mut pools = self.pools.lock().await;
            let Some(pool) = pools.iter_mut().find(|pool| pool.shard_id() == block.shard_id) else {
                warn!(shard = %block.shard_id, "received block of an unknown shard");
                continue;
            };

            let mut pool_mut = pool.thaw();
            let report = pool_mut.apply_block(block);
            *pool = pool_mut.freeze();
            drop(pools);

            debug!(
                shard = %block.shard_id,
                transactions = block.transactions.len(),
                added = report.added,
                removed = report.removed,
                missing = report.missing,
                "block applied to the utxo pool"
            );

            total.added += report.added;
            total.removed += report.removed;
            total.missing += report.missing;
            total.duplicated += report.duplicated;
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keyring;
    use shardbench_core::tx::{OutPoint, Transaction, TxInput, TxOutput};
    use shardbench_core::{coinbase_transaction_id, Amount, OutputIndex};

    #[tokio::test]
    async fn bootstrap_seeds_every_shard() {
        let keyring = Keyring::generate(4);
        let manager = PoolManager::bootstrap(&[ShardId::new(0), ShardId::new(1)], &keyring);
        assert_eq!(manager.num_shards().await, 2);
        let pools = manager.snapshot().await;
        assert!(pools.iter().all(|pool| pool.len() == 4));
        assert_eq!(pools[1].shard_id(), ShardId::new(1));
    }

    #[tokio::test]
    async fn apply_blocks_to_matching_shard() {
        let keyring = Keyring::generate(2);
        let manager = PoolManager::bootstrap(&[ShardId::new(0), ShardId::new(1)], &keyring);

        let owner = keyring.address(1);
        let mut transaction = Transaction::new(
            vec![TxInput::new(
                OutPoint::new(
                    coinbase_transaction_id(ShardId::new(1), &owner),
                    OutputIndex::MIN,
                ),
                owner,
                ShardId::new(1),
            )],
            vec![TxOutput {
                amount: Amount::new(1000),
                address: keyring.address(2),
                shard_id: ShardId::new(1),
            }],
        );
        transaction.set_id();

        let blocks = vec![
            Block {
                shard_id: ShardId::new(1),
                transactions: vec![transaction],
            },
            Block {
                shard_id: ShardId::new(7),
                transactions: vec![],
            },
        ];
        let report = manager.apply_blocks(&blocks).await;
        assert_eq!(report.added, 1);
        assert_eq!(report.removed, 1);

        let pools = manager.snapshot().await;
        assert!(pools[0].outputs_of(&owner).is_some());
        assert!(pools[1].outputs_of(&owner).is_none());
        assert_eq!(pools[1].len(), 2);
    }
}
