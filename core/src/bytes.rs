use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HexParseError {
    #[error("invalid hexadecimal value: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// serde helper to encode fixed size byte arrays as hexadecimal strings
///
/// to use with `#[serde(with = "crate::bytes::hex_array")]`
pub(crate) mod hex_array {
    use super::*;

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut out = [0; N];
        hex::decode_to_slice(s, &mut out).map_err(D::Error::custom)?;
        Ok(out)
    }
}

/// define a fixed size byte identifier, displayed and parsed as hexadecimal
macro_rules! hex_newtype {
    ($(#[$meta:meta])* $Type:ident, $SIZE:expr) => {
        $(#[$meta])*
        #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, serde::Serialize, serde::Deserialize)]
        pub struct $Type(#[serde(with = "crate::bytes::hex_array")] [u8; $SIZE]);

        impl $Type {
            pub const SIZE: usize = $SIZE;

            #[inline(always)]
            pub const fn new(bytes: [u8; $SIZE]) -> Self {
                Self(bytes)
            }

            #[inline(always)]
            pub fn as_bytes(&self) -> &[u8; $SIZE] {
                &self.0
            }
        }

        impl AsRef<[u8]> for $Type {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $SIZE]> for $Type {
            fn from(bytes: [u8; $SIZE]) -> Self {
                Self(bytes)
            }
        }

        impl std::fmt::Display for $Type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl std::fmt::Debug for $Type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($Type))
                    .field(&hex::encode(self.0))
                    .finish()
            }
        }

        impl std::str::FromStr for $Type {
            type Err = $crate::bytes::HexParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0; $SIZE];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }
    };
}

pub(crate) use hex_newtype;
