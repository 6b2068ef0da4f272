//! # SledLedger — Persistent Ledger Backend
//!
//! Vault records on disk, built on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree       | Key                   | Value                 |
//! |------------|-----------------------|-----------------------|
//! | `vaults`   | address (32 bytes)    | `bincode(VaultRecord)`|
//! | `metadata` | key (UTF-8)           | value (bytes)         |
//!
//! Addresses are raw bytes, so sled's lexicographic key order is the same
//! order `VaultAddress` sorts in and `records()` comes back sorted for free.
//!
//! ## Profile Pinning
//!
//! The first open writes the policy profile into `metadata`. Reopening the
//! same directory under another profile fails: a ledger full of top-up
//! vaults must never be served by single-shot rules, or the one-deposit
//! invariant would be meaningless.

use std::path::Path;

use sled::{Db, Tree};

use super::{LedgerStore, VaultRecord};
use crate::address::VaultAddress;
use crate::config::{ADDRESS_LENGTH, METADATA_TREE, VAULTS_TREE};
use crate::error::{LedgerError, LedgerResult};
use crate::policy::PolicyProfile;

/// Metadata key for the pinned policy profile.
const META_PROFILE: &[u8] = b"policy_profile";

/// Persistent ledger backend.
///
/// sled trees are safe for concurrent use, so `SledLedger` can be shared
/// across threads (or cloned, which shares the handle).
#[derive(Debug, Clone)]
pub struct SledLedger {
    db: Db,
    vaults: Tree,
    metadata: Tree,
    profile: PolicyProfile,
}

impl SledLedger {
    /// Open or create a ledger at `path` for `profile`.
    pub fn open<P: AsRef<Path>>(path: P, profile: PolicyProfile) -> LedgerResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db, profile)
    }

    /// A throwaway ledger that is deleted when dropped. For tests.
    pub fn open_temporary(profile: PolicyProfile) -> LedgerResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, profile)
    }

    fn from_db(db: Db, profile: PolicyProfile) -> LedgerResult<Self> {
        let vaults = db.open_tree(VAULTS_TREE)?;
        let metadata = db.open_tree(METADATA_TREE)?;

        match metadata.get(META_PROFILE)? {
            Some(stored) => {
                let stored = String::from_utf8_lossy(&stored).into_owned();
                if stored != profile.as_str() {
                    return Err(LedgerError::ProfileMismatch {
                        stored,
                        requested: profile.as_str().to_string(),
                    });
                }
            }
            None => {
                metadata.insert(META_PROFILE, profile.as_str().as_bytes())?;
            }
        }

        tracing::debug!(profile = %profile, records = vaults.len(), "ledger opened");

        Ok(Self {
            db,
            vaults,
            metadata,
            profile,
        })
    }

    /// The profile this ledger is pinned to.
    pub fn profile(&self) -> PolicyProfile {
        self.profile
    }

    /// Read a raw metadata entry.
    pub fn metadata(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.metadata.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn decode(bytes: &[u8]) -> LedgerResult<VaultRecord> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl LedgerStore for SledLedger {
    fn get(&self, address: &VaultAddress) -> LedgerResult<Option<VaultRecord>> {
        match self.vaults.get(address.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, address: &VaultAddress, record: &VaultRecord) -> LedgerResult<()> {
        let bytes = bincode::serialize(record)?;
        self.vaults.insert(address.as_bytes(), bytes)?;
        Ok(())
    }

    fn remove(&self, address: &VaultAddress) -> LedgerResult<Option<VaultRecord>> {
        match self.vaults.remove(address.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn len(&self) -> usize {
        self.vaults.len()
    }

    fn records(&self) -> LedgerResult<Vec<(VaultAddress, VaultRecord)>> {
        let mut all = Vec::with_capacity(self.vaults.len());
        for entry in self.vaults.iter() {
            let (key, value) = entry?;
            let key: [u8; ADDRESS_LENGTH] = key.as_ref().try_into().map_err(|_| {
                LedgerError::Corrupt(format!("vault key of {} bytes", key.len()))
            })?;
            all.push((VaultAddress::from_bytes(key), Self::decode(&value)?));
        }
        Ok(all)
    }

    /// Blocks until every pending write is on disk.
    fn flush(&self) -> LedgerResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
