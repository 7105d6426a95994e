//! Synthetic key material of the benchmark.
//!
//! Every testing address is owned by an integer-form private key: the
//! integer `i` is hashed into an ed25519 seed. The generator only knows
//! addresses, so signing goes through a [`KeyLookup`] to find back the
//! integer of an address.

use cryptoxide::{ed25519, hashing::blake2b_256};
use shardbench_core::tx::{PublicKey, Signature};
use shardbench_core::Address;
use std::collections::HashMap;
use std::fmt;

/// private key derived from an integer
pub struct PrivateKey {
    index: u64,
    keypair: [u8; 64],
    public_key: PublicKey,
}

impl PrivateKey {
    pub fn from_index(index: u64) -> Self {
        let seed = blake2b_256(&index.to_be_bytes());
        let (keypair, public_key) = ed25519::keypair(&seed);
        Self {
            index,
            keypair,
            public_key: PublicKey::new(public_key),
        }
    }

    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(ed25519::signature(message, &self.keypair))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("index", &self.index)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// check `signature` was produced over `message` by the owner of `public_key`
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    ed25519::verify(message, public_key.as_bytes(), signature.as_bytes())
}

/// address owned by the integer key `index`
pub fn address_from_index(index: u64) -> Address {
    PrivateKey::from_index(index).address()
}

/// find the integer-form private key owning an address
pub trait KeyLookup: Send + Sync {
    fn lookup_int_private_key(&self, address: &Address) -> Option<u64>;
}

/// the testing addresses `1..=n` and their keys
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    addresses: Vec<Address>,
    indices: HashMap<Address, u64>,
}

impl Keyring {
    pub fn generate(num_of_address: u64) -> Self {
        let addresses: Vec<Address> = (1..=num_of_address).map(address_from_index).collect();
        let indices = addresses
            .iter()
            .zip(1..)
            .map(|(address, index)| (*address, index))
            .collect();

        Self { addresses, indices }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// address of the key `index`, starting at `1`
    ///
    /// addresses outside of the generated range are derived on demand.
    pub fn address(&self, index: u64) -> Address {
        usize::try_from(index)
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|position| self.addresses.get(position))
            .copied()
            .unwrap_or_else(|| address_from_index(index))
    }

    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.addresses.iter().copied()
    }
}

impl KeyLookup for Keyring {
    fn lookup_int_private_key(&self, address: &Address) -> Option<u64> {
        self.indices.get(address).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        let key = PrivateKey::from_index(42);
        assert_eq!(key.public_key(), PrivateKey::from_index(42).public_key());
        assert_ne!(key.public_key(), PrivateKey::from_index(43).public_key());
        assert_eq!(key.address(), address_from_index(42));
    }

    #[test]
    fn sign_and_verify() {
        let key = PrivateKey::from_index(7);
        let signature = key.sign(b"hello");
        assert!(verify(&key.public_key(), b"hello", &signature));
        assert!(!verify(&key.public_key(), b"world", &signature));
        assert!(!verify(
            &PrivateKey::from_index(8).public_key(),
            b"hello",
            &signature
        ));
    }

    #[test]
    fn keyring_lookup() {
        let keyring = Keyring::generate(5);
        assert_eq!(keyring.len(), 5);
        for index in 1..=5 {
            let address = keyring.address(index);
            assert_eq!(address, address_from_index(index));
            assert_eq!(keyring.lookup_int_private_key(&address), Some(index));
        }
        assert_eq!(keyring.lookup_int_private_key(&address_from_index(6)), None);
        assert_eq!(keyring.lookup_int_private_key(&Address::new([0; 20])), None);
    }

    #[test]
    fn keyring_address_out_of_range() {
        let keyring = Keyring::generate(2);
        assert_eq!(keyring.address(3), address_from_index(3));
        assert_eq!(keyring.address(0), address_from_index(0));
    }
}
