use crate::keys::Keyring;
use crate::sampler::Candidate;
use rand::Rng;
use shardbench_core::tx::{OutPoint, Transaction, TransactionId, TxInput, TxOutput};
use shardbench_core::{Address, Amount, ShardId, UtxoPool};

/// turn the selected outputs into unsigned transactions
///
/// every input is spent in full to a random testing address: the amount of
/// each input goes to its own output, in the same shard.
pub struct TransactionBuilder<'a> {
    keyring: &'a Keyring,
    num_of_address: u64,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(keyring: &'a Keyring, num_of_address: u64) -> Self {
        Self {
            keyring,
            num_of_address: num_of_address.max(1),
        }
    }

    /// address drawn uniformly in `1..=num_of_address`
    fn random_destination<R: Rng>(&self, rng: &mut R) -> Address {
        self.keyring.address(rng.gen_range(1..=self.num_of_address))
    }

    fn spend<R: Rng>(
        &self,
        address: Address,
        out_point: OutPoint,
        amount: Amount,
        shard_id: ShardId,
        rng: &mut R,
    ) -> (TxInput, TxOutput) {
        let input = TxInput::new(out_point, address, shard_id);
        let output = TxOutput {
            amount,
            address: self.random_destination(rng),
            shard_id,
        };
        (input, output)
    }

    /// one input, one output, both in `shard_id`
    pub fn single_shard<R: Rng>(
        &self,
        candidate: &Candidate,
        shard_id: ShardId,
        rng: &mut R,
    ) -> Transaction {
        let (input, output) = self.spend(
            candidate.address,
            candidate.out_point,
            candidate.amount,
            shard_id,
            rng,
        );
        Transaction::new(vec![input], vec![output])
    }

    /// spend the candidate of `shard_id` together with an output of the
    /// same address in the neighbor shard `(shard_id + 1) % pools.len()`
    ///
    /// If the address owns nothing in the neighbor shard the transaction
    /// only has the pair of `shard_id`. It is still a cross shard
    /// transaction.
    pub fn cross_shard<R: Rng>(
        &self,
        candidate: &Candidate,
        shard_id: ShardId,
        pools: &[UtxoPool],
        rng: &mut R,
    ) -> Transaction {
        let (input, output) = self.spend(
            candidate.address,
            candidate.out_point,
            candidate.amount,
            shard_id,
            rng,
        );
        let mut inputs = vec![input];
        let mut outputs = vec![output];

        if let Some((neighbor, out_point, amount)) =
            neighbor_output(&candidate.address, shard_id, pools)
        {
            let (input, output) = self.spend(candidate.address, out_point, amount, neighbor, rng);
            inputs.push(input);
            outputs.push(output);
        }

        Transaction::new(inputs, outputs)
    }
}

/// first output of `address` found in the pool of the neighbor shard
fn neighbor_output(
    address: &Address,
    shard_id: ShardId,
    pools: &[UtxoPool],
) -> Option<(ShardId, OutPoint, Amount)> {
    let neighbor = shard_id.neighbor(pools.len())?;
    if neighbor == shard_id {
        return None;
    }

    let pool = pools.iter().find(|pool| pool.shard_id() == neighbor)?;
    pool.outputs_of(address)?
        .iter()
        .find_map(|(transaction_id, outputs)| {
            let transaction_id = transaction_id.parse::<TransactionId>().ok()?;
            let (index, amount) = outputs.iter().next()?;
            Some((neighbor, OutPoint::new(transaction_id, *index), *amount))
        })
}
