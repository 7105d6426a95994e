use crate::builder::TransactionBuilder;
use crate::keys::{KeyLookup, Keyring};
use crate::sampler::{Route, UtxoSampler};
use crate::settings::GeneratorSettings;
use crate::signer::Signer;
use rand::Rng;
use shardbench_core::tx::Transaction;
use shardbench_core::UtxoPool;
use tracing::error;

/// transactions produced for one shard during one tick
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShardBatch {
    /// to be sent to the leader of the shard
    pub single_shard: Vec<Transaction>,
    /// to be broadcast to every leader
    pub cross_shard: Vec<Transaction>,
    /// built but dropped before signing
    pub skipped: usize,
}

impl ShardBatch {
    /// number of signed transactions, this is what the cap applies to
    pub fn produced(&self) -> usize {
        self.single_shard.len() + self.cross_shard.len()
    }
}

/// sampler, builder and signer chained for a per shard pass
pub struct Generator<'a> {
    settings: GeneratorSettings,
    builder: TransactionBuilder<'a>,
    signer: Signer<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(
        settings: &GeneratorSettings,
        keyring: &'a Keyring,
        keys: &'a dyn KeyLookup,
    ) -> Self {
        Self {
            settings: *settings,
            builder: TransactionBuilder::new(keyring, settings.num_of_address),
            signer: Signer::new(keys),
        }
    }

    /// walk the pool of the shard at `shard_index` and produce its batch
    ///
    /// the walk stops as soon as `max_num_txs_per_batch` transactions are
    /// signed. Cross shard transactions take their second input from the
    /// pool following `shard_index`'s shard.
    pub fn generate_simulated_transactions<R: Rng>(
        &self,
        shard_index: usize,
        pools: &[UtxoPool],
        rng: &mut R,
    ) -> ShardBatch {
        let mut batch = ShardBatch::default();
        let Some(pool) = pools.get(shard_index) else {
            return batch;
        };
        let shard_id = pool.shard_id();
        let cap = self.settings.max_num_txs_per_batch;
        let mut sampler = UtxoSampler::new(pool, self.settings.cross_shard);

        while batch.produced() < cap {
            let Some(candidate) = sampler.next_candidate(rng) else {
                break;
            };

            let transaction = match candidate.route {
                Route::SingleShard => self.builder.single_shard(&candidate, shard_id, rng),
                Route::CrossShard => self.builder.cross_shard(&candidate, shard_id, pools, rng),
            };

            match self.signer.finalize(transaction, &candidate.address) {
                Ok(transaction) => match candidate.route {
                    Route::SingleShard => batch.single_shard.push(transaction),
                    Route::CrossShard => batch.cross_shard.push(transaction),
                },
                Err(reason) => {
                    error!(shard = %shard_id, out_point = %candidate.out_point, %reason, "dropping transaction");
                    batch.skipped += 1;
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::verify;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shardbench_core::tx::TransactionId;
    use shardbench_core::{Address, Amount, OutputIndex, ShardId};

    fn pool_with<I>(shard_id: ShardId, outputs: I) -> UtxoPool
    where
        I: IntoIterator<Item = (Address, u8, u64)>,
    {
        let mut pool = UtxoPool::new(shard_id).thaw();
        for (address, seed, amount) in outputs {
            pool.insert(
                address,
                TransactionId::new([seed; 32]).to_string(),
                OutputIndex::new(0),
                Amount::new(amount),
            )
            .unwrap();
        }
        pool.freeze()
    }

    fn settings(cross_shard: bool, cap: usize) -> GeneratorSettings {
        GeneratorSettings {
            num_of_address: 5,
            cross_shard,
            max_num_txs_per_batch: cap,
        }
    }

    #[test]
    fn single_output_single_shard() {
        let keyring = Keyring::generate(5);
        let settings = settings(false, 10);
        let generator = Generator::new(&settings, &keyring, &keyring);
        let pools = vec![pool_with(ShardId::new(0), [(keyring.address(1), 1, 100)])];

        let batch = generator.generate_simulated_transactions(0, &pools, &mut StepRng::new(0, 0));

        assert!(batch.cross_shard.is_empty());
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.single_shard.len(), 1);
        let tx = &batch.single_shard[0];
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.inputs[0].address, keyring.address(1));
        assert_eq!(tx.output_amount(), Amount::new(100));
        let destinations: Vec<_> = keyring.addresses().collect();
        assert!(destinations.contains(&tx.outputs[0].address));
        assert!(verify(
            &tx.public_key,
            &tx.content_bytes(),
            tx.signature.as_ref().unwrap()
        ));
    }

    #[test]
    fn cross_shard_spends_both_shards() {
        let keyring = Keyring::generate(5);
        let settings = settings(true, 10);
        let generator = Generator::new(&settings, &keyring, &keyring);
        let owner = keyring.address(1);
        let pools = vec![
            pool_with(ShardId::new(0), [(owner, 1, 100)]),
            pool_with(ShardId::new(1), [(owner, 2, 60)]),
        ];

        let batch = generator.generate_simulated_transactions(0, &pools, &mut StepRng::new(0, 0));

        assert!(batch.single_shard.is_empty());
        assert_eq!(batch.cross_shard.len(), 1);
        let tx = &batch.cross_shard[0];
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.inputs[0].shard_id, ShardId::new(0));
        assert_eq!(tx.inputs[1].shard_id, ShardId::new(1));
        assert_eq!(tx.outputs[0].amount, Amount::new(100));
        assert_eq!(tx.outputs[1].amount, Amount::new(60));
        assert_eq!(tx.id, tx.compute_id());
    }

    #[test]
    fn cross_shard_without_neighbor_output() {
        let keyring = Keyring::generate(5);
        let settings = settings(true, 10);
        let generator = Generator::new(&settings, &keyring, &keyring);
        let pools = vec![
            pool_with(ShardId::new(0), [(keyring.address(1), 1, 100)]),
            UtxoPool::new(ShardId::new(1)),
        ];

        let batch = generator.generate_simulated_transactions(0, &pools, &mut StepRng::new(0, 0));

        assert_eq!(batch.cross_shard.len(), 1);
        assert_eq!(batch.cross_shard[0].inputs.len(), 1);
        assert_eq!(batch.cross_shard[0].outputs.len(), 1);
    }

    #[test]
    fn batch_cap_is_respected() {
        let keyring = Keyring::generate(5);
        let pools = vec![UtxoPool::with_testing_addresses(
            ShardId::new(0),
            keyring.addresses(),
        )];

        for cap in [0, 1, 2, 3] {
            let settings = settings(false, cap);
            let generator = Generator::new(&settings, &keyring, &keyring);
            // every draw selects
            let batch =
                generator.generate_simulated_transactions(0, &pools, &mut StepRng::new(0, 0));
            assert_eq!(batch.produced(), cap);
        }
    }

    #[test]
    fn amounts_are_conserved() {
        let keyring = Keyring::generate(50);
        let settings = GeneratorSettings {
            num_of_address: 50,
            cross_shard: true,
            max_num_txs_per_batch: 1_000,
        };
        let generator = Generator::new(&settings, &keyring, &keyring);
        let pools = vec![
            UtxoPool::with_testing_addresses(ShardId::new(0), keyring.addresses()),
            UtxoPool::with_testing_addresses(ShardId::new(1), keyring.addresses()),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let batch = generator.generate_simulated_transactions(1, &pools, &mut rng);

        assert!(batch.produced() > 0);
        for tx in batch.single_shard.iter().chain(batch.cross_shard.iter()) {
            for (input, output) in tx.inputs.iter().zip(tx.outputs.iter()) {
                let pool = pools
                    .iter()
                    .find(|pool| pool.shard_id() == input.shard_id)
                    .unwrap();
                let spent = pool
                    .get(
                        &input.address,
                        &input.previous_output.transaction_id.to_string(),
                        input.previous_output.output_index,
                    )
                    .unwrap();
                assert_eq!(spent, output.amount);
                assert_eq!(input.shard_id, output.shard_id);
            }
        }
        for tx in batch.cross_shard.iter().filter(|tx| tx.inputs.len() == 2) {
            assert_eq!(tx.inputs[0].shard_id, ShardId::new(1));
            assert_eq!(tx.inputs[1].shard_id, ShardId::new(0));
        }
    }

    #[test]
    fn unknown_key_is_dropped() {
        let keyring = Keyring::generate(5);
        let settings = settings(false, 10);
        let generator = Generator::new(&settings, &keyring, &keyring);
        let stranger = Address::new([0xcd; 20]);
        let pools = vec![pool_with(
            ShardId::new(0),
            [(stranger, 1, 100), (keyring.address(2), 2, 50)],
        )];

        let batch = generator.generate_simulated_transactions(0, &pools, &mut StepRng::new(0, 0));

        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.single_shard.len(), 1);
        assert!(batch
            .single_shard
            .iter()
            .all(|tx| tx.inputs.iter().all(|input| input.address != stranger)));
    }

    #[test]
    fn unknown_shard_index_is_empty() {
        let keyring = Keyring::generate(5);
        let settings = settings(false, 10);
        let generator = Generator::new(&settings, &keyring, &keyring);

        let batch = generator.generate_simulated_transactions(3, &[], &mut StepRng::new(0, 0));
        assert_eq!(batch, ShardBatch::default());
    }
}
