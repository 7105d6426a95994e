//! Synthetic load generator for a sharded UTxO ledger.
//!
//! The generator keeps a local copy of the UTxO pool of every shard,
//! selects outputs at random and spends them in signed transactions sent
//! to the shard leaders, for a fixed amount of time.

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod generator;
pub mod keys;
pub mod listener;
pub mod message;
pub mod pending;
pub mod pool;
pub mod sampler;
pub mod scheduler;
pub mod settings;
pub mod signer;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use self::{
    builder::TransactionBuilder,
    config::{ConfigError, NetworkConfig, NodeConfig, Peer, Role},
    dispatch::{DispatchQueue, DispatchStats},
    generator::{Generator, ShardBatch},
    keys::{KeyLookup, Keyring, PrivateKey},
    listener::{Listener, ListenerHandle},
    message::{CodecError, Message},
    pending::{CrossShardProof, PendingCrossTxs, Reconciled},
    pool::PoolManager,
    sampler::{Candidate, Route, UtxoSampler},
    scheduler::{BatchScheduler, RunReport, SchedulerState},
    settings::{GeneratorSettings, SchedulerTiming},
    signer::{Signer, SkipReason},
    transport::{TcpTransport, Transport},
};
