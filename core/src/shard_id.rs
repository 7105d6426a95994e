use serde::{Deserialize, Serialize};
use std::{fmt, num, str};

/// identifier of a shard of the ledger
///
/// each shard keeps its own UTxO pool and is served by its own leader.
#[derive(
    Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShardId(u32);

impl ShardId {
    #[inline(always)]
    pub const fn new(shard_id: u32) -> Self {
        Self(shard_id)
    }

    /// the shard that follows this one in a network of `num_shards` shards
    ///
    /// returns `None` if `num_shards` is zero.
    #[inline]
    pub fn neighbor(self, num_shards: usize) -> Option<Self> {
        let num_shards = u64::try_from(num_shards).ok().filter(|n| *n > 0)?;
        let next = (u64::from(self.0) + 1) % num_shards;
        u32::try_from(next).ok().map(Self)
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl str::FromStr for ShardId {
    type Err = num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u32> for ShardId {
    fn from(shard_id: u32) -> Self {
        Self(shard_id)
    }
}

impl From<ShardId> for u32 {
    fn from(ShardId(shard_id): ShardId) -> Self {
        shard_id
    }
}
