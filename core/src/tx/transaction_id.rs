use crate::bytes::hex_newtype;

hex_newtype!(
    /// transaction identifier
    ///
    /// computed from the content of the transaction (see
    /// [`Transaction::compute_id`](crate::tx::Transaction::compute_id)),
    /// never assigned beforehand. The hexadecimal representation is the one
    /// used as key in the UTxO pools.
    TransactionId,
    32
);

impl TransactionId {
    /// the transaction id that denote the absence of transaction identifier
    ///
    /// ```
    /// use shardbench_core::tx::TransactionId;
    ///
    /// assert_eq!(
    ///   TransactionId::ZERO,
    ///   TransactionId::new([0; 32]),
    /// )
    /// ```
    pub const ZERO: Self = Self::new([0; 32]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_pool_key() {
        let id = TransactionId::new([0x42; 32]);
        assert_eq!(TransactionId::from_str(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn reject_malformed_pool_key() {
        assert!(TransactionId::from_str("not hex at all").is_err());
        assert!(TransactionId::from_str("abcdef").is_err());
    }
}
