use serde::{Deserialize, Serialize};
use shardbench_core::tx::{Transaction, TransactionId};
use shardbench_core::ShardId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// finality report of one shard about a cross shard transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossShardProof {
    pub transaction_id: TransactionId,
    pub shard_id: ShardId,
    pub accept: bool,
}

/// a pending transaction every involved shard reported on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub transaction: Transaction,
    /// `true` only if every shard accepted it
    pub accepted: bool,
}

#[derive(Debug)]
struct PendingEntry {
    transaction: Transaction,
    proofs: BTreeMap<ShardId, bool>,
}

impl PendingEntry {
    fn is_complete(&self) -> bool {
        self.transaction
            .input_shards()
            .iter()
            .all(|shard_id| self.proofs.contains_key(shard_id))
    }
}

/// cross shard transactions broadcast and waiting for their proofs
///
/// cloning gives another handle on the same table. The table has its own
/// lock, unrelated to the lock of the pools.
#[derive(Debug, Clone, Default)]
pub struct PendingCrossTxs {
    entries: Arc<Mutex<HashMap<TransactionId, PendingEntry>>>,
}

impl PendingCrossTxs {
    pub fn new() -> Self {
        Self::default()
    }

    /// register the transactions of a broadcast batch, keyed by identifier
    pub async fn insert_all<'a, I>(&self, transactions: I) -> usize
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut entries = self.entries.lock().await;
        let mut inserted = 0;
        for transaction in transactions {
            let previous = entries.insert(
                transaction.id,
                PendingEntry {
                    transaction: transaction.clone(),
                    proofs: BTreeMap::new(),
                },
            );
            if previous.is_some() {
                warn!(transaction = %transaction.id, "cross shard transaction registered twice");
            } else {
                inserted += 1;
            }
        }
        inserted
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn contains(&self, id: &TransactionId) -> bool {
        self.entries.lock().await.contains_key(id)
    }

    pub async fn get(&self, id: &TransactionId) -> Option<Transaction> {
        self.entries
            .lock()
            .await
            .get(id)
            .map(|entry| entry.transaction.clone())
    }

    pub async fn remove(&self, id: &TransactionId) -> Option<Transaction> {
        self.entries
            .lock()
            .await
            .remove(id)
            .map(|entry| entry.transaction)
    }

    /// account for a proof received from the network
    ///
    /// once every shard spent by the transaction has reported, the entry
    /// leaves the table and is returned. Proofs about unknown transactions
    /// or from shards the transaction does not spend from are ignored.
    pub async fn record_proof(&self, proof: CrossShardProof) -> Option<Reconciled> {
        let mut entries = self.entries.lock().await;

        let entry = match entries.get_mut(&proof.transaction_id) {
            Some(entry) => entry,
            None => {
                debug!(transaction = %proof.transaction_id, shard = %proof.shard_id, "proof for unknown transaction");
                return None;
            }
        };
        if !entry.transaction.input_shards().contains(&proof.shard_id) {
            warn!(transaction = %proof.transaction_id, shard = %proof.shard_id, "proof from an unrelated shard");
            return None;
        }
        entry.proofs.insert(proof.shard_id, proof.accept);

        if !entry.is_complete() {
            return None;
        }

        let entry = entries.remove(&proof.transaction_id)?;
        let accepted = entry.proofs.values().all(|accept| *accept);
        Some(Reconciled {
            transaction: entry.transaction,
            accepted,
        })
    }
}
