//! # Error Taxonomy
//!
//! Every rejection the core can produce, detected locally and returned
//! synchronously. Nothing here is retried internally: if an operation
//! fails, the caller decides whether to retry, change the amount, or walk
//! away. A returned error always means the ledger was left untouched.

use thiserror::Error;

use crate::address::VaultAddress;
use crate::policy::PolicyProfile;

/// Result alias for processor operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Result alias for ledger backend operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// ---------------------------------------------------------------------------
// VaultError
// ---------------------------------------------------------------------------

/// Errors surfaced by the operation processor.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The amount fails a policy-defined bound.
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The amount the caller asked for (0 when none was supplied).
        amount: u64,
        /// Which bound was violated.
        reason: AmountRejection,
    },

    /// A partial withdrawal asked for more than the vault holds.
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Current vault balance.
        available: u64,
        /// Amount requested.
        requested: u64,
    },

    /// Single-deposit profile: the vault already took its one deposit.
    #[error("vault {address} already exists")]
    AlreadyFunded {
        /// The vault that blocked the deposit.
        address: VaultAddress,
    },

    /// Close was attempted while funds remain.
    #[error("vault is not empty: balance {balance}")]
    VaultNotEmpty {
        /// The balance still held.
        balance: u64,
    },

    /// Withdraw or close targeted an owner without a vault.
    #[error("no vault record at {address}")]
    RecordNotFound {
        /// The derived address that was looked up.
        address: VaultAddress,
    },

    /// A deposit would push the balance past `u64::MAX`.
    #[error("balance overflow: current {current}, credit {credit}")]
    Overflow {
        /// Balance before the failed deposit.
        current: u64,
        /// The amount that caused the overflow.
        credit: u64,
    },

    /// The active profile has no such operation.
    #[error("{operation} is not available under the {profile} profile")]
    UnsupportedOperation {
        /// Operation name.
        operation: &'static str,
        /// The profile in force.
        profile: PolicyProfile,
    },

    /// The storage backend failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Why an amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountRejection {
    /// Zero is never a valid amount to move.
    #[error("amount must be greater than zero")]
    Zero,

    /// Deposit below the configured floor.
    #[error("below the minimum deposit of {minimum}")]
    BelowFloor {
        /// The configured floor.
        minimum: u64,
    },

    /// Partial withdraw called without an amount.
    #[error("an explicit amount is required")]
    Missing,

    /// Full-only withdraw on a vault holding nothing.
    #[error("nothing to withdraw")]
    NothingToWithdraw,
}

// ---------------------------------------------------------------------------
// LedgerError
// ---------------------------------------------------------------------------

/// Errors raised by ledger backends.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt ledger entry: {0}")]
    Corrupt(String),

    /// The persistent ledger was created under a different policy profile.
    /// Mixing profiles on one ledger would break the single-deposit invariant.
    #[error("ledger was created for profile '{stored}', refusing to open as '{requested}'")]
    ProfileMismatch { stored: String, requested: String },
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}
