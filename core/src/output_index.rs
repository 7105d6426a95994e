use serde::{Deserialize, Serialize};
use std::{fmt, num, str};

/// index of an output within the transaction that created it
#[derive(
    Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OutputIndex(u32);

impl OutputIndex {
    /// the largest value a [`OutputIndex`] can be
    pub const MAX: Self = Self::new(u32::MAX);

    /// the smallest value a [`OutputIndex`] can be.
    pub const MIN: Self = Self::new(u32::MIN);

    /// wrap the given value into a OutputIndex type
    ///
    #[inline(always)]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Try to increase by `1` the [`OutputIndex`]
    ///
    /// If the addition will overflow, the function will returns `None`.
    #[must_use = "The function does not modify the state, the new value is returned"]
    #[inline]
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for OutputIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl str::FromStr for OutputIndex {
    type Err = num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u32> for OutputIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<OutputIndex> for u32 {
    fn from(OutputIndex(index): OutputIndex) -> Self {
        index
    }
}

impl TryFrom<usize> for OutputIndex {
    type Error = num::TryFromIntError;
    fn try_from(position: usize) -> Result<Self, Self::Error> {
        u32::try_from(position).map(Self)
    }
}
