mod keys;
mod transaction;
mod transaction_id;
mod utxo;

pub use keys::*;
pub use transaction::*;
pub use transaction_id::*;
pub use utxo::*;
