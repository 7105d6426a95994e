use crate::keys::{KeyLookup, PrivateKey};
use shardbench_core::tx::Transaction;
use shardbench_core::Address;
use thiserror::Error;

/// reason a built transaction is not dispatched
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("Failed to look up the corresponding private key from address {address}")]
    UnknownSigningKey { address: Address },
}

/// finalize transactions with the key of their spending address
pub struct Signer<'a> {
    keys: &'a dyn KeyLookup,
}

impl<'a> Signer<'a> {
    pub fn new(keys: &'a dyn KeyLookup) -> Self {
        Self { keys }
    }

    /// sign `transaction` as `spender`
    ///
    /// the public key is set first, then the identifier is computed from
    /// the content and only then the content is signed. Without a key for
    /// `spender` the transaction is given back as a [`SkipReason`].
    pub fn finalize(
        &self,
        mut transaction: Transaction,
        spender: &Address,
    ) -> Result<Transaction, SkipReason> {
        let index = self
            .keys
            .lookup_int_private_key(spender)
            .ok_or(SkipReason::UnknownSigningKey { address: *spender })?;
        let key = PrivateKey::from_index(index);

        transaction.public_key = key.public_key();
        transaction.set_id();
        transaction.signature = Some(key.sign(&transaction.content_bytes()));

        Ok(transaction)
    }
}
