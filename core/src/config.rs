//! # Vault Configuration & Constants
//!
//! Every magic number in the vault lives here. Floors and reserves follow the
//! account rent-exemption rule of the chain the vault settles on and are
//! computed from that formula.
//!
//! Runtime configuration is a [`VaultConfig`]: a small serde struct that can
//! be read from a JSON file and then overridden field by field (the node
//! binary layers CLI flags and environment variables on top).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::AddressDeriver;
use crate::policy::{DepositGuard, Policy, PolicyProfile};

// ---------------------------------------------------------------------------
// Address Derivation
// ---------------------------------------------------------------------------

/// Namespace tag for the fund-holding vault record.
pub const VAULT_TAG: &[u8] = b"vault";

/// Namespace tag for the companion state slot that carries the reserve
/// under the top-up profile.
pub const STATE_TAG: &[u8] = b"state";

/// Default deployment domain mixed into every address. Two deployments with
/// different domains never share an address for the same owner.
pub const DEFAULT_DOMAIN: &str = "custodial-vault/v1";

/// Length of a vault address in bytes (BLAKE3 output).
pub const ADDRESS_LENGTH: usize = 32;

/// Length of an owner identity in bytes (Ed25519 public key size).
pub const OWNER_ID_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Units & Rent
// ---------------------------------------------------------------------------

/// Smallest units per whole coin.
pub const UNITS_PER_COIN: u64 = 1_000_000_000;

/// Bytes of bookkeeping the host charges for on top of account data.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

/// Rent rate in units per byte-year.
pub const RENT_UNITS_PER_BYTE_YEAR: u64 = 3_480;

/// Years of rent an account must hold up front to be exempt.
pub const RENT_EXEMPTION_YEARS: u64 = 2;

/// Minimum balance that keeps an account with `data_len` bytes alive.
pub const fn rent_exempt_minimum(data_len: u64) -> u64 {
    (ACCOUNT_STORAGE_OVERHEAD + data_len) * RENT_UNITS_PER_BYTE_YEAR * RENT_EXEMPTION_YEARS
}

/// Rent-exempt minimum for a data-less account (890_880 units).
pub const RENT_EXEMPT_MINIMUM_EMPTY: u64 = rent_exempt_minimum(0);

/// Size of the top-up profile's state record: an 8-byte discriminator, no fields.
pub const STATE_RECORD_LEN: u64 = 8;

/// Reserve locked against a top-up vault at creation and released on close.
pub const STATE_RECORD_RESERVE: u64 = rent_exempt_minimum(STATE_RECORD_LEN);

// ---------------------------------------------------------------------------
// Floors
// ---------------------------------------------------------------------------

/// Top-up profile: anything strictly positive.
pub const TOP_UP_MIN_DEPOSIT: u64 = 1;

/// Single-shot profile: the deposit alone must keep the vault account alive,
/// so it has to clear the empty-account rent minimum.
pub const SINGLE_SHOT_MIN_DEPOSIT: u64 = RENT_EXEMPT_MINIMUM_EMPTY + 1;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Default ledger directory used by the node binary.
pub const DEFAULT_DATA_DIR: &str = ".vault";

/// sled tree holding vault records.
pub const VAULTS_TREE: &str = "vaults";

/// sled tree holding ledger metadata.
pub const METADATA_TREE: &str = "metadata";

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Deployment configuration for a vault processor.
///
/// Unset overrides fall back to the profile's defaults in
/// [`Policy::for_profile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// Which behavior profile to run.
    pub profile: PolicyProfile,
    /// Deployment domain mixed into address derivation.
    pub domain: String,
    /// Override for the minimum deposit.
    pub min_deposit: Option<u64>,
    /// Override for the reserve locked at vault creation.
    pub record_reserve: Option<u64>,
    /// Override for the single-deposit guard.
    pub deposit_guard: Option<DepositGuard>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            profile: PolicyProfile::TopUp,
            domain: DEFAULT_DOMAIN.to_string(),
            min_deposit: None,
            record_reserve: None,
            deposit_guard: None,
        }
    }
}

impl VaultConfig {
    /// Default configuration for a given profile.
    pub fn for_profile(profile: PolicyProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Resolve the effective [`Policy`], validating the overrides.
    pub fn policy(&self) -> Result<Policy, ConfigError> {
        let mut policy = Policy::for_profile(self.profile);

        if let Some(min) = self.min_deposit {
            if min == 0 {
                return Err(ConfigError::Invalid(
                    "min_deposit must be at least 1".to_string(),
                ));
            }
            policy.min_deposit = min;
        }

        if let Some(reserve) = self.record_reserve {
            if reserve > 0 && !policy.has_close() {
                // Without a close step the reserve could never be handed back.
                return Err(ConfigError::Invalid(format!(
                    "record_reserve must be 0 under the {} profile",
                    self.profile
                )));
            }
            policy.record_reserve = reserve;
        }

        if let Some(guard) = self.deposit_guard {
            policy.deposit_guard = guard;
        }

        Ok(policy)
    }

    /// Address deriver for this deployment's domain.
    pub fn deriver(&self) -> Result<AddressDeriver, ConfigError> {
        if self.domain.is_empty() {
            return Err(ConfigError::Invalid("domain must not be empty".to_string()));
        }
        Ok(AddressDeriver::new(&self.domain))
    }
}
