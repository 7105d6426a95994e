use crate::tx::{PublicKey, Signature, TransactionId, TxInput, TxOutput};
use crate::{Amount, ShardId};
use cryptoxide::hashing::blake2b_256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// a transaction as sent to the shard leaders
///
/// A transaction is built unsigned (zero identifier, empty public key and
/// no signature). The identifier is then computed from the content and the
/// content is signed.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,

    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,

    pub public_key: PublicKey,
    #[serde(default)]
    pub signature: Option<Signature>,
}

impl Transaction {
    /// create an unsigned transaction
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            id: TransactionId::ZERO,
            inputs,
            outputs,
            public_key: PublicKey::EMPTY,
            signature: None,
        }
    }

    /// canonical encoding of the inputs, the outputs and the public key
    ///
    /// the identifier and the signature are not part of the content. The
    /// number of inputs and of outputs are encoded on 8 bytes.
    pub fn content_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            16 + self.inputs.len() * (32 + 4 + 20 + 4) + self.outputs.len() * (8 + 20 + 4) + 32,
        );

        extend_with_len(&mut bytes, self.inputs.len());
        for input in self.inputs.iter() {
            bytes.extend_from_slice(input.previous_output.transaction_id.as_ref());
            bytes.extend_from_slice(&u32::from(input.previous_output.output_index).to_be_bytes());
            bytes.extend_from_slice(input.address.as_ref());
            bytes.extend_from_slice(&u32::from(input.shard_id).to_be_bytes());
        }

        extend_with_len(&mut bytes, self.outputs.len());
        for output in self.outputs.iter() {
            bytes.extend_from_slice(&output.amount.into_inner().to_be_bytes());
            bytes.extend_from_slice(output.address.as_ref());
            bytes.extend_from_slice(&u32::from(output.shard_id).to_be_bytes());
        }

        bytes.extend_from_slice(self.public_key.as_ref());
        bytes
    }

    /// hash of the [`content_bytes`](Self::content_bytes)
    #[must_use = "This function does not modify the transaction, see `set_id`"]
    pub fn compute_id(&self) -> TransactionId {
        TransactionId::new(blake2b_256(&self.content_bytes()))
    }

    /// assign the content derived identifier to the transaction
    pub fn set_id(&mut self) {
        self.id = self.compute_id();
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// the shards owning the outputs spent by this transaction
    pub fn input_shards(&self) -> BTreeSet<ShardId> {
        self.inputs.iter().map(|input| input.shard_id).collect()
    }

    pub fn output_amount(&self) -> Amount {
        self.outputs.iter().map(|output| output.amount).sum()
    }
}

fn extend_with_len(bytes: &mut Vec<u8>, len: usize) {
    // lossless on every platform with a pointer width up to 64 bits
    let len = u64::try_from(len).unwrap_or(u64::MAX);
    bytes.extend_from_slice(&len.to_be_bytes());
}
