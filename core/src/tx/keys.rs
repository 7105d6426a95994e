use crate::bytes::hex_newtype;

hex_newtype!(
    /// public key of the owner of the spent outputs
    PublicKey,
    32
);

hex_newtype!(
    /// signature of a transaction's content
    Signature,
    64
);

impl PublicKey {
    /// placeholder of a transaction that has not been signed yet
    pub const EMPTY: Self = Self::new([0; 32]);
}
