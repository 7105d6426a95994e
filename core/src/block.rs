use crate::tx::Transaction;
use crate::ShardId;
use serde::{Deserialize, Serialize};

/// block accepted by the leader of `shard_id`
///
/// we only keep what is needed to update the UTxO pools: the validation of
/// the block is the responsibility of the shard.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub shard_id: ShardId,
    pub transactions: Vec<Transaction>,
}
