//! Probabilistic selection of the UTxOs to spend.
//!
//! Every unspent output gets one draw in `[0, 100)`. Below
//! [`SAMPLE_RATE`] the output is selected. The same draw then decides the
//! kind of transaction: below [`CROSS_SHARD_RATE`] (and if cross shard
//! transactions are enabled) the output goes to a cross shard transaction,
//! which makes about one third of the selected outputs.

use rand::Rng;
use shardbench_core::tx::{OutPoint, TransactionId};
use shardbench_core::{Address, Amount, OutputIndex, UtxoPool};
use tracing::debug;

/// percentage of the UTxOs selected at every pass
pub const SAMPLE_RATE: u32 = 30;

/// percentage of the UTxOs selected for a cross shard transaction
pub const CROSS_SHARD_RATE: u32 = 10;

const DRAW_RANGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SingleShard,
    CrossShard,
}

/// what to do with an output given its draw in `[0, 100)`
///
/// `None` if the output is not selected.
pub fn route_for_draw(draw: u32, cross_shard: bool) -> Option<Route> {
    if draw >= SAMPLE_RATE {
        None
    } else if cross_shard && draw < CROSS_SHARD_RATE {
        Some(Route::CrossShard)
    } else {
        Some(Route::SingleShard)
    }
}

/// an unspent output selected to be spent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub address: Address,
    pub out_point: OutPoint,
    pub amount: Amount,
    pub route: Route,
}

type UtxoIter<'a> = Box<dyn Iterator<Item = (&'a Address, &'a str, OutputIndex, Amount)> + 'a>;

/// walk of one shard's pool yielding the selected outputs
///
/// the walk is lazy and pulled one candidate at a time: dropping the
/// sampler stops it. Outputs whose transaction identifier cannot be parsed
/// are skipped. The order is the pool's iteration order, which is
/// unspecified.
pub struct UtxoSampler<'a> {
    utxos: UtxoIter<'a>,
    cross_shard: bool,
}

impl<'a> UtxoSampler<'a> {
    pub fn new(pool: &'a UtxoPool, cross_shard: bool) -> Self {
        Self {
            utxos: Box::new(pool.iter()),
            cross_shard,
        }
    }

    /// draw for the next outputs of the pool until one is selected
    ///
    /// returns `None` once the pool is exhausted.
    pub fn next_candidate<R>(&mut self, rng: &mut R) -> Option<Candidate>
    where
        R: Rng,
    {
        for (address, transaction_id, index, amount) in self.utxos.by_ref() {
            let transaction_id = match transaction_id.parse::<TransactionId>() {
                Ok(transaction_id) => transaction_id,
                Err(error) => {
                    debug!(%address, %transaction_id, %error, "skipping malformed utxo entry");
                    continue;
                }
            };

            if let Some(route) = route_for_draw(rng.gen_range(0..DRAW_RANGE), self.cross_shard) {
                return Some(Candidate {
                    address: *address,
                    out_point: OutPoint::new(transaction_id, index),
                    amount,
                    route,
                });
            }
        }

        None
    }
}

/// number of UTxOs of the pool with a well formed transaction identifier
pub fn count_utxos(pool: &UtxoPool) -> usize {
    pool.iter()
        .filter(|(_, transaction_id, _, _)| transaction_id.parse::<TransactionId>().is_ok())
        .count()
}
