use serde::{Deserialize, Serialize};
use std::{fmt, iter::Sum, num, str};

/// integer amount of tokens held by an output
///
/// there is no fee model: amounts are only ever moved, never created or
/// burned by the transactions we generate.
#[derive(
    Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self::new(0);

    /// the largest value a [`Amount`] can be
    pub const MAX: Self = Self::new(u64::MAX);

    #[inline(always)]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    #[inline(always)]
    pub fn into_inner(self) -> u64 {
        self.0
    }

    /// Try to add the right hand side (`rhs`) value to the [`Amount`].
    ///
    /// If the addition will overflow, the function will returns `None`.
    #[must_use = "The function does not modify the state, the new value is returned"]
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Add the right hand side (`rhs`) value to the [`Amount`].
    ///
    /// If the addition will overflow we returns the [`Self::MAX`].
    #[must_use = "The function does not modify the state, the new value is returned"]
    #[inline]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl str::FromStr for Amount {
    type Err = num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u64> for Amount {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl From<Amount> for u64 {
    fn from(Amount(amount): Amount) -> Self {
        amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoke::{generator::num, property};
    use smoke_macros::smoketest;

    #[test]
    fn check_add_overflow() {
        assert_eq!(None, Amount::MAX.checked_add(Amount::new(1)))
    }

    #[test]
    fn saturating_add_overflow() {
        assert_eq!(Amount::MAX, Amount::MAX.saturating_add(Amount::new(1)))
    }

    #[test]
    fn sum() {
        let amounts = [Amount::new(100), Amount::new(250), Amount::new(1)];
        assert_eq!(amounts.iter().sum::<Amount>(), Amount::new(351));
        assert_eq!(std::iter::empty::<Amount>().sum::<Amount>(), Amount::ZERO);
    }

    #[smoketest{ a: num::<u64>(), b: num::<u64>() }]
    fn checked_add(a: u64, b: u64) {
        property::equal(a.checked_add(b).map(Amount), Amount(a).checked_add(Amount(b)))
    }

    #[smoketest{ a: num::<u64>(), b: num::<u64>() }]
    fn saturating_add(a: u64, b: u64) {
        property::equal(Amount(a.saturating_add(b)), Amount(a).saturating_add(Amount(b)))
    }
}
