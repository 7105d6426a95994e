use crate::bytes::hex_newtype;
use crate::tx::PublicKey;
use cryptoxide::hashing::blake2b::Blake2b;

hex_newtype!(
    /// on chain address
    ///
    /// 20 bytes, derived from the owner's public key. Displayed and parsed
    /// in hexadecimal.
    Address,
    20
);

impl Address {
    /// derive the [`Address`] owning the given public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let b2b = Blake2b::<{ 20 * 8 }>::new().update(public_key.as_ref());

        let mut out = [0; 20];
        b2b.finalize_at(&mut out);

        Self(out)
    }
}
