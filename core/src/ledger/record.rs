//! Vault records.
//!
//! A record is the whole observable state of a vault apart from whether it
//! exists. Mutations go through [`VaultRecord::credit`] and
//! [`VaultRecord::debit`], which refuse to wrap or go negative; the processor
//! applies them to a working copy and only writes the copy back once every
//! check has passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::identity::OwnerId;

/// One owner's vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// The owner this vault belongs to. Fixed at creation.
    pub owner: OwnerId,

    /// Funds held, in smallest units.
    pub balance: u64,

    /// Units locked against the record at creation and handed back when it
    /// is closed. Never counted in `balance`.
    pub reserve: u64,

    /// Deposits received since creation.
    pub deposit_count: u32,

    pub created_at: DateTime<Utc>,

    /// Timestamp of the last balance-modifying operation.
    pub updated_at: DateTime<Utc>,
}

impl VaultRecord {
    /// A freshly allocated, empty record.
    pub fn open(owner: OwnerId, reserve: u64) -> Self {
        let now = Utc::now();
        Self {
            owner,
            balance: 0,
            reserve,
            deposit_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.balance == 0
    }

    /// Add `amount` to the balance and count the deposit.
    ///
    /// # Errors
    ///
    /// [`VaultError::Overflow`] if the balance would exceed `u64::MAX`.
    pub fn credit(&mut self, amount: u64) -> VaultResult<u64> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(VaultError::Overflow {
                current: self.balance,
                credit: amount,
            })?;

        self.balance = balance;
        self.deposit_count = self.deposit_count.saturating_add(1);
        self.updated_at = Utc::now();
        Ok(balance)
    }

    /// Subtract `amount` from the balance.
    ///
    /// # Errors
    ///
    /// [`VaultError::InsufficientFunds`] if `amount` exceeds the balance.
    pub fn debit(&mut self, amount: u64) -> VaultResult<u64> {
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientFunds {
                available: self.balance,
                requested: amount,
            })?;

        self.balance = balance;
        self.updated_at = Utc::now();
        Ok(balance)
    }
}
