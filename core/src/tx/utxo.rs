use crate::tx::TransactionId;
use crate::{Address, Amount, OutputIndex, ShardId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points to particular UTxO for some ['TransactionId'].
/// We can have multiple pointers with different indexes for the same transaction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct OutPoint {
    pub transaction_id: TransactionId,
    pub output_index: OutputIndex,
}

impl OutPoint {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{hash}@{index}",
            hash = self.transaction_id,
            index = self.output_index,
        )
    }
}

/// spend of an output, living in the pool of `shard_id`
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct TxInput {
    pub previous_output: OutPoint,
    pub address: Address,
    pub shard_id: ShardId,
}

impl TxInput {
    pub fn new(previous_output: OutPoint, address: Address, shard_id: ShardId) -> Self {
        Self {
            previous_output,
            address,
            shard_id,
        }
    }
}

/// new output, to be added to the pool of `shard_id`
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    pub amount: Amount,
    pub address: Address,
    pub shard_id: ShardId,
}
