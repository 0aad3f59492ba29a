//! Opaque 32-byte keys used throughout the relay.
//!
//! Every key is displayed and parsed as base58, the same text form the host ledger uses
//! for its addresses. The distinct newtypes keep a mint from being passed where an
//! identity is expected.

use crate::error::{PaymentError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

pub const KEY_LENGTH: usize = 32;

const ASSOCIATED_ACCOUNT_SEED: &[u8] = b"associated-token-account";

fn decode_key(input: &str) -> Result<[u8; KEY_LENGTH]> {
    let invalid = || PaymentError::InvalidAddress(input.to_string());
    let bytes = bs58::decode(input).into_vec().map_err(|_| invalid())?;
    <[u8; KEY_LENGTH]>::try_from(bytes.as_slice()).map_err(|_| invalid())
}

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; KEY_LENGTH]);

        impl $name {
            pub const fn new(bytes: [u8; KEY_LENGTH]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&bs58::encode(self.0).into_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl FromStr for $name {
            type Err = PaymentError;

            fn from_str(s: &str) -> Result<Self> {
                decode_key(s.trim()).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(de::Error::custom)
            }
        }
    };
}

define_key!(
    /// A principal able to sign for actions. The relay only ever compares identities.
    Identity
);

define_key!(
    /// Identifies a token type. A processor accepts exactly one mint.
    Mint
);

define_key!(
    /// Address of a token account on the host ledger.
    TokenAccountAddress
);

impl TokenAccountAddress {
    /// The canonical token account holding `mint` on behalf of `owner`.
    pub fn associated(owner: &Identity, mint: &Mint) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ASSOCIATED_ACCOUNT_SEED);
        hasher.update(owner.as_bytes());
        hasher.update(mint.as_bytes());
        Self(hasher.finalize().into())
    }
}
