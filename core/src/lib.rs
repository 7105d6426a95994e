mod address;
mod amount;
mod block;
mod bytes;
mod output_index;
mod shard_id;
mod stoppable_service;
pub mod tx;
mod utxo_pool;

pub use address::*;
pub use amount::*;
pub use block::*;
pub use bytes::HexParseError;
pub use output_index::*;
pub use shard_id::*;
pub use stoppable_service::*;
pub use utxo_pool::*;
