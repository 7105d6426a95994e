use crate::tx::{Transaction, TransactionId};
use crate::{Address, Amount, Block, OutputIndex, ShardId};
use anyhow::anyhow;
use cryptoxide::hashing::blake2b_256;
use imbl::{hashmap::Entry, HashMap};

/// amount given to every testing address in the genesis of each shard
pub const DEFAULT_COINBASE_AMOUNT: Amount = Amount::new(1000);

/// unspent outputs of one transaction, by output index
pub type OutputsByIndex = HashMap<OutputIndex, Amount>;

/// unspent outputs of one address, by hexadecimal transaction identifier
///
/// the identifiers are kept in their string form, as received from the
/// network. They are only parsed when an output is selected to be spent.
pub type OutputsByTransaction = HashMap<String, OutputsByIndex>;

/// store for Unspent Transaction Output of one shard
///
/// Mapping `address -> transaction id -> output index -> amount`. The maps
/// are persistent (Hamt) so cloning a pool to take a snapshot is cheap and
/// shares the memory with the original.
///
/// The pool only reflects the outputs confirmed by the blocks applied to it:
/// spending an output in a generated transaction does not remove it.
#[derive(Default, Clone, Debug)]
pub struct UtxoPool {
    shard_id: ShardId,
    by_address: HashMap<Address, OutputsByTransaction>,
    len: usize,
}

/// mutable state of a [`UtxoPool`], see [`UtxoPool::thaw`]
pub struct UtxoPoolMut {
    shard_id: ShardId,
    by_address: HashMap<Address, OutputsByTransaction>,
    len: usize,
}

/// what happened when a block was applied to a pool
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct ApplyReport {
    pub added: usize,
    pub removed: usize,
    /// spent outputs that were not in the pool
    pub missing: usize,
    /// new outputs that were already in the pool
    pub duplicated: usize,
}

impl UtxoPool {
    /// create a new, empty, pool for the given shard
    #[inline]
    pub fn new(shard_id: ShardId) -> Self {
        Self {
            shard_id,
            ..Self::default()
        }
    }

    /// create the genesis pool of a shard: every address receives one
    /// output of [`DEFAULT_COINBASE_AMOUNT`]
    pub fn with_testing_addresses<I>(shard_id: ShardId, addresses: I) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        let mut pool = Self::new(shard_id).thaw();
        for address in addresses {
            let transaction_id = coinbase_transaction_id(shard_id, &address);
            if let Err(error) = pool.insert(
                address,
                transaction_id.to_string(),
                OutputIndex::MIN,
                DEFAULT_COINBASE_AMOUNT,
            ) {
                // coinbase ids are unique per address: only an address listed
                // twice collides, and it keeps its single coinbase output
                debug_assert!(pool.by_address.contains_key(&address), "{error}");
            }
        }
        pool.freeze()
    }

    #[inline]
    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    /// returns true is the pool does not contains any UTxOs
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// returns the number of UTxO in the pool
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// number of addresses owning at least one UTxO
    #[inline]
    pub fn number_addresses(&self) -> usize {
        self.by_address.len()
    }

    /// get the amount of the given output, if unspent
    pub fn get(
        &self,
        address: &Address,
        transaction_id: &str,
        index: OutputIndex,
    ) -> Option<Amount> {
        self.by_address
            .get(address)?
            .get(transaction_id)?
            .get(&index)
            .copied()
    }

    /// all the UTxOs of the given address in this pool
    #[inline]
    pub fn outputs_of(&self, address: &Address) -> Option<&OutputsByTransaction> {
        self.by_address.get(address)
    }

    /// walk all the UTxOs of the pool
    ///
    /// the order is unspecified and may differ between two pools holding
    /// the same UTxOs.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &str, OutputIndex, Amount)> + '_ {
        self.by_address.iter().flat_map(|(address, transactions)| {
            transactions.iter().flat_map(move |(transaction_id, outputs)| {
                outputs
                    .iter()
                    .map(move |(index, amount)| (address, transaction_id.as_str(), *index, *amount))
            })
        })
    }

    /// sum of all the UTxOs of the pool
    pub fn total_amount(&self) -> Amount {
        self.iter().map(|(_, _, _, amount)| amount).sum()
    }

    #[must_use = "This function does not modify the internal state"]
    pub fn thaw(&self) -> UtxoPoolMut {
        UtxoPoolMut {
            shard_id: self.shard_id,
            by_address: self.by_address.clone(),
            len: self.len,
        }
    }
}

impl UtxoPoolMut {
    /// insert the given UTxO in the mutable state
    pub fn insert(
        &mut self,
        address: Address,
        transaction_id: String,
        index: OutputIndex,
        amount: Amount,
    ) -> anyhow::Result<()> {
        let outputs = self
            .by_address
            .entry(address)
            .or_default()
            .entry(transaction_id)
            .or_default();

        match outputs.entry(index) {
            Entry::Occupied(_) => Err(anyhow!("Utxo {address}@{index} is inserted already")),
            Entry::Vacant(vacant) => {
                vacant.insert(amount);
                self.len += 1;
                Ok(())
            }
        }
    }

    /// remove the given UTxO, returning its amount
    ///
    /// the emptied entries of the address and of the transaction are
    /// removed too.
    pub fn remove(
        &mut self,
        address: &Address,
        transaction_id: &str,
        index: OutputIndex,
    ) -> anyhow::Result<Amount> {
        let transactions = self
            .by_address
            .get_mut(address)
            .ok_or_else(|| anyhow!("Address {address} has no utxo"))?;
        let outputs = transactions
            .get_mut(transaction_id)
            .ok_or_else(|| anyhow!("Utxo is not found {transaction_id}@{index}"))?;
        let amount = outputs
            .remove(&index)
            .ok_or_else(|| anyhow!("Utxo is not found {transaction_id}@{index}"))?;

        if outputs.is_empty() {
            transactions.remove(transaction_id);
        }
        if transactions.is_empty() {
            self.by_address.remove(address);
        }
        self.len -= 1;

        Ok(amount)
    }

    /// update the pool with the content of a block of this shard
    ///
    /// spent outputs owned by this shard are removed and the new outputs
    /// destined to this shard are added under the transaction's identifier.
    /// Blocks of other shards are ignored.
    pub fn apply_block(&mut self, block: &Block) -> ApplyReport {
        let mut report = ApplyReport::default();

        if block.shard_id != self.shard_id {
            return report;
        }

        for transaction in block.transactions.iter() {
            self.apply_transaction(transaction, &mut report);
        }

        report
    }

    fn apply_transaction(&mut self, transaction: &Transaction, report: &mut ApplyReport) {
        let shard_id = self.shard_id;

        for input in transaction
            .inputs
            .iter()
            .filter(|input| input.shard_id == shard_id)
        {
            let pointer = &input.previous_output;
            match self.remove(
                &input.address,
                &pointer.transaction_id.to_string(),
                pointer.output_index,
            ) {
                Ok(_) => report.removed += 1,
                Err(_) => report.missing += 1,
            }
        }

        let transaction_id = transaction.id.to_string();
        for (position, output) in transaction.outputs.iter().enumerate() {
            if output.shard_id != shard_id {
                continue;
            }
            let Ok(index) = OutputIndex::try_from(position) else {
                break;
            };
            match self.insert(output.address, transaction_id.clone(), index, output.amount) {
                Ok(()) => report.added += 1,
                Err(_) => report.duplicated += 1,
            }
        }
    }

    /// consume the mutable state releasing a new state that is immutable
    ///
    /// this function does not modify any other state and the returned value
    /// is the result of the freeze.
    #[must_use = "This function does not modify the internal state"]
    pub fn freeze(self) -> UtxoPool {
        UtxoPool {
            shard_id: self.shard_id,
            by_address: self.by_address,
            len: self.len,
        }
    }
}

/// identifier of the genesis output of `address` in `shard_id`
pub fn coinbase_transaction_id(shard_id: ShardId, address: &Address) -> TransactionId {
    let mut bytes = Vec::with_capacity(4 + Address::SIZE);
    bytes.extend_from_slice(&u32::from(shard_id).to_be_bytes());
    bytes.extend_from_slice(address.as_ref());
    TransactionId::new(blake2b_256(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{OutPoint, TxInput, TxOutput};

    fn address(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn check_add_spend() {
        let store = UtxoPool::new(ShardId::new(0));
        let mut mut_store = store.thaw();

        let first_tx = TransactionId::new([1; 32]).to_string();
        let second_tx = TransactionId::new([2; 32]).to_string();

        assert!(mut_store
            .insert(address(1), first_tx.clone(), OutputIndex::new(0), Amount::new(100))
            .is_ok());
        assert!(mut_store
            .insert(address(1), first_tx.clone(), OutputIndex::new(1), Amount::new(50))
            .is_ok());
        assert!(mut_store
            .insert(address(2), second_tx.clone(), OutputIndex::new(0), Amount::new(10))
            .is_ok());
        assert!(mut_store
            .insert(address(2), second_tx.clone(), OutputIndex::new(0), Amount::new(10))
            .is_err());

        let frozen = mut_store.freeze();
        assert_eq!(frozen.len(), 3);
        assert_eq!(frozen.number_addresses(), 2);
        assert_eq!(frozen.total_amount(), Amount::new(160));
        // the original state is not modified
        assert!(store.is_empty());

        let mut mut_store = frozen.thaw();
        assert_eq!(
            mut_store
                .remove(&address(1), &first_tx, OutputIndex::new(0))
                .unwrap(),
            Amount::new(100)
        );
        assert!(mut_store
            .remove(&address(1), &first_tx, OutputIndex::new(0))
            .is_err());
        assert!(mut_store
            .remove(&address(2), &second_tx, OutputIndex::new(0))
            .is_ok());

        let frozen = mut_store.freeze();
        assert_eq!(frozen.len(), 1);
        assert!(frozen.outputs_of(&address(2)).is_none());
        assert_eq!(
            frozen.get(&address(1), &first_tx, OutputIndex::new(1)),
            Some(Amount::new(50))
        );
    }

    #[test]
    fn iter_visits_every_utxo() {
        let pool = UtxoPool::with_testing_addresses(ShardId::new(3), (1..=10).map(address));
        assert_eq!(pool.len(), 10);
        assert_eq!(pool.iter().count(), 10);
        assert!(pool
            .iter()
            .all(|(_, _, index, amount)| index == OutputIndex::MIN
                && amount == DEFAULT_COINBASE_AMOUNT));
        assert_eq!(pool.total_amount(), Amount::new(10_000));
    }

    #[test]
    fn testing_addresses_listed_twice() {
        let pool = UtxoPool::with_testing_addresses(
            ShardId::new(2),
            [address(1), address(2), address(1)],
        );
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.number_addresses(), 2);
        assert_eq!(
            pool.get(
                &address(1),
                &coinbase_transaction_id(ShardId::new(2), &address(1)).to_string(),
                OutputIndex::MIN
            ),
            Some(DEFAULT_COINBASE_AMOUNT)
        );
    }

    #[test]
    fn coinbase_ids_differ_per_shard() {
        assert_ne!(
            coinbase_transaction_id(ShardId::new(0), &address(1)),
            coinbase_transaction_id(ShardId::new(1), &address(1)),
        );
    }

    #[test]
    fn apply_block() {
        let shard = ShardId::new(0);
        let pool = UtxoPool::with_testing_addresses(shard, [address(1)]);
        let coinbase = coinbase_transaction_id(shard, &address(1));

        let mut transaction = Transaction::new(
            vec![
                TxInput::new(
                    OutPoint::new(coinbase, OutputIndex::MIN),
                    address(1),
                    shard,
                ),
                TxInput::new(
                    OutPoint::new(TransactionId::new([9; 32]), OutputIndex::MIN),
                    address(1),
                    ShardId::new(1),
                ),
            ],
            vec![
                TxOutput {
                    amount: DEFAULT_COINBASE_AMOUNT,
                    address: address(2),
                    shard_id: shard,
                },
                TxOutput {
                    amount: DEFAULT_COINBASE_AMOUNT,
                    address: address(3),
                    shard_id: ShardId::new(1),
                },
            ],
        );
        transaction.set_id();

        let block = Block {
            shard_id: shard,
            transactions: vec![transaction.clone()],
        };

        let mut mut_pool = pool.thaw();
        let report = mut_pool.apply_block(&block);
        assert_eq!(
            report,
            ApplyReport {
                added: 1,
                removed: 1,
                missing: 0,
                duplicated: 0,
            }
        );
        let pool = mut_pool.freeze();
        assert!(pool.outputs_of(&address(1)).is_none());
        assert_eq!(
            pool.get(&address(2), &transaction.id.to_string(), OutputIndex::new(0)),
            Some(DEFAULT_COINBASE_AMOUNT)
        );

        // applying twice: the spend is missing and the output is duplicated
        let mut mut_pool = pool.thaw();
        let report = mut_pool.apply_block(&block);
        assert_eq!(report.missing, 1);
        assert_eq!(report.duplicated, 1);
    }

    #[test]
    fn apply_block_of_another_shard() {
        let pool = UtxoPool::with_testing_addresses(ShardId::new(0), [address(1)]);
        let mut mut_pool = pool.thaw();
        let report = mut_pool.apply_block(&Block {
            shard_id: ShardId::new(1),
            transactions: vec![],
        });
        assert_eq!(report, ApplyReport::default());
        assert_eq!(mut_pool.freeze().len(), 1);
    }
}
