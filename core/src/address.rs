//! # Vault Address Derivation
//!
//! A vault address is a pure function of the owner. Nothing maps owners to
//! addresses in storage; the mapping is recomputed whenever it's needed:
//!
//! ```text
//! preimage = u32be(len(domain)) || domain
//!         || u32be(len(tag))    || tag
//!         || owner (32 bytes)
//! address  = BLAKE3(preimage)
//! ```
//!
//! Length prefixes make the preimage injective, so two distinct
//! `(domain, tag, owner)` triples never hash the same bytes. Collision
//! resistance of the addresses themselves is BLAKE3's job.
//!
//! [`AddressCache`] memoizes derivations for hot owners. It is a shortcut,
//! never a source of truth: a miss just derives again.

use std::fmt;
use std::str::FromStr;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::config::{ADDRESS_LENGTH, DEFAULT_DOMAIN, STATE_TAG, VAULT_TAG};
use crate::identity::{IdentityError, OwnerId};

// ---------------------------------------------------------------------------
// VaultAddress
// ---------------------------------------------------------------------------

/// Deterministic vault identifier.
///
/// Ordered bytewise so ledger snapshots and state roots are deterministic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaultAddress([u8; ADDRESS_LENGTH]);

impl VaultAddress {
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Display for VaultAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for VaultAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VaultAddress({})", self.to_base58())
    }
}

impl FromStr for VaultAddress {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| IdentityError::Base58(e.to_string()))?;
        let array: [u8; ADDRESS_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| IdentityError::InvalidLength {
                    expected: ADDRESS_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl Serialize for VaultAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for VaultAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            let array: [u8; ADDRESS_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
                serde::de::Error::custom(format!(
                    "expected {ADDRESS_LENGTH}-byte address, got {}",
                    bytes.len()
                ))
            })?;
            Ok(Self(array))
        }
    }
}

// ---------------------------------------------------------------------------
// AddressDeriver
// ---------------------------------------------------------------------------

/// Derives vault addresses for one deployment domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDeriver {
    domain: Vec<u8>,
}

impl AddressDeriver {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.as_bytes().to_vec(),
        }
    }

    pub fn domain(&self) -> &[u8] {
        &self.domain
    }

    /// Address of the owner's fund-holding vault.
    pub fn derive(&self, owner: &OwnerId) -> VaultAddress {
        self.derive_tagged(VAULT_TAG, owner)
    }

    /// Address of the owner's companion state slot (reserve holder).
    pub fn derive_state(&self, owner: &OwnerId) -> VaultAddress {
        self.derive_tagged(STATE_TAG, owner)
    }

    /// Address for an arbitrary namespace tag.
    pub fn derive_tagged(&self, tag: &[u8], owner: &OwnerId) -> VaultAddress {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.domain.len() as u32).to_be_bytes());
        hasher.update(&self.domain);
        hasher.update(&(tag.len() as u32).to_be_bytes());
        hasher.update(tag);
        hasher.update(owner.as_bytes());
        VaultAddress(*hasher.finalize().as_bytes())
    }
}

impl Default for AddressDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN)
    }
}

// ---------------------------------------------------------------------------
// AddressCache
// ---------------------------------------------------------------------------

/// Upper bound on memoized addresses before the cache is dropped wholesale.
const DEFAULT_CACHE_CAPACITY: usize = 65_536;

/// Concurrent memo of `owner -> vault address`.
#[derive(Debug)]
pub struct AddressCache {
    deriver: AddressDeriver,
    entries: DashMap<OwnerId, VaultAddress>,
    capacity: usize,
}

impl AddressCache {
    pub fn new(deriver: AddressDeriver) -> Self {
        Self::with_capacity(deriver, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(deriver: AddressDeriver, capacity: usize) -> Self {
        Self {
            deriver,
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    /// Vault address for `owner`, from the memo when present.
    pub fn vault_address(&self, owner: &OwnerId) -> VaultAddress {
        if let Some(hit) = self.entries.get(owner) {
            return *hit;
        }

        let address = self.deriver.derive(owner);
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries.insert(*owner, address);
        address
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
