//! # Owner Identity
//!
//! An [`OwnerId`] is the handle for whoever is entitled to a vault. It is
//! 32 bytes, the size of an Ed25519 public key, and by the time it reaches
//! the core the signature behind it has already been checked by the caller.
//! We never see keys, signatures, or wallets here.
//!
//! Text forms: base58 (what wallets print) is the canonical `Display`;
//! 64-character hex is accepted on input for scripts and logs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::OWNER_ID_LENGTH;

/// Errors parsing owner ids and vault addresses from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid base58: {0}")]
    Base58(String),

    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Authenticated owner identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId([u8; OWNER_ID_LENGTH]);

impl OwnerId {
    pub const fn new(bytes: [u8; OWNER_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Build from a byte slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentityError> {
        let array: [u8; OWNER_ID_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| IdentityError::InvalidLength {
                    expected: OWNER_ID_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; OWNER_ID_LENGTH] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex-encoded id.
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(s).map_err(|e| IdentityError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Parse a base58-encoded id.
    pub fn from_base58(s: &str) -> Result<Self, IdentityError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| IdentityError::Base58(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl FromStr for OwnerId {
    type Err = IdentityError;

    /// Hex when the input is exactly 64 hex digits, base58 otherwise.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == OWNER_ID_LENGTH * 2 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(s)
        } else {
            Self::from_base58(s)
        }
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.to_base58())
    }
}

impl Serialize for OwnerId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for OwnerId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            OwnerId::from_slice(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

impl From<[u8; OWNER_ID_LENGTH]> for OwnerId {
    fn from(bytes: [u8; OWNER_ID_LENGTH]) -> Self {
        Self(bytes)
    }
}
