//! # Operation Processor
//!
//! Deposit, Withdraw and Close against the ledger, under a [`Policy`].
//!
//! ## Transaction Shape
//!
//! Every mutating call runs the same three steps while holding the owner's
//! lock:
//!
//! 1. **Load** — derive the address, read the record (if any).
//! 2. **Validate** — policy and arithmetic checks on a working copy.
//! 3. **Commit** — one `put` or one `remove`.
//!
//! Nothing reaches the store before step 3, so a rejected call leaves the
//! ledger byte-for-byte unchanged.
//!
//! ## Locking
//!
//! One `parking_lot::Mutex` per vault address, handed out from a `DashMap`.
//! Calls for the same owner queue up; calls for different owners never touch
//! the same mutex. Reads skip the lock: backends make single-key writes
//! atomic, so a reader sees the record either before or after a commit.
//!
//! A mutex lives in the map only while some call holds or waits on it. The
//! last caller out removes the entry, so the map is bounded by the number of
//! in-flight operations, not by the number of owners ever seen.
//!
//! ## Lifecycle
//!
//! ```text
//! absent ──▶ live     first deposit (creates the record)
//! live   ──▶ live     deposit (top-up), partial withdraw
//! live   ──▶ absent   close at balance 0 (top-up), full withdraw (single-shot)
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address::{AddressCache, AddressDeriver, VaultAddress};
use crate::error::{AmountRejection, LedgerError, VaultError, VaultResult};
use crate::identity::OwnerId;
use crate::ledger::{self, LedgerStore, VaultRecord};
use crate::policy::{Policy, WithdrawMode};

// ---------------------------------------------------------------------------
// Operations & Receipts
// ---------------------------------------------------------------------------

/// An operation submitted on behalf of an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Deposit {
        amount: u64,
    },
    /// `amount` is required in partial mode and ignored in full-only mode.
    Withdraw {
        #[serde(default)]
        amount: Option<u64>,
    },
    Close,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Deposit { .. } => "deposit",
            Operation::Withdraw { .. } => "withdraw",
            Operation::Close => "close",
        }
    }
}

/// Outcome of a successful deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub address: VaultAddress,
    pub amount: u64,
    /// Balance after the deposit.
    pub balance: u64,
    /// Whether this deposit allocated the record.
    pub created: bool,
    /// Reserve locked by this deposit (non-zero only when `created`).
    pub reserve_locked: u64,
}

/// Outcome of a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub address: VaultAddress,
    /// Amount paid out to the owner.
    pub amount: u64,
    /// Balance after the withdrawal.
    pub balance: u64,
    /// Whether the withdrawal also destroyed the record.
    pub closed: bool,
}

/// Outcome of a successful close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseReceipt {
    pub address: VaultAddress,
    /// Reserve handed back to the owner.
    pub reserve_released: u64,
}

/// Receipt for any [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Receipt {
    Deposit(DepositReceipt),
    Withdraw(WithdrawReceipt),
    Close(CloseReceipt),
}

impl Receipt {
    pub fn address(&self) -> VaultAddress {
        match self {
            Receipt::Deposit(r) => r.address,
            Receipt::Withdraw(r) => r.address,
            Receipt::Close(r) => r.address,
        }
    }

    /// Balance after the operation (0 once the record is gone).
    pub fn balance(&self) -> u64 {
        match self {
            Receipt::Deposit(r) => r.balance,
            Receipt::Withdraw(r) => r.balance,
            Receipt::Close(_) => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// VaultProcessor
// ---------------------------------------------------------------------------

/// The vault state machine over a ledger backend.
#[derive(Debug)]
pub struct VaultProcessor<S: LedgerStore> {
    store: S,
    policy: Policy,
    addresses: AddressCache,
    locks: DashMap<VaultAddress, Arc<Mutex<()>>>,
}

impl<S: LedgerStore> VaultProcessor<S> {
    pub fn new(store: S, policy: Policy, deriver: AddressDeriver) -> Self {
        Self {
            store,
            policy,
            addresses: AddressCache::new(deriver),
            locks: DashMap::new(),
        }
    }

    /// Processor with the default address domain.
    pub fn with_policy(store: S, policy: Policy) -> Self {
        Self::new(store, policy, AddressDeriver::default())
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn deriver(&self) -> &AddressDeriver {
        self.addresses.deriver()
    }

    /// The vault address for `owner`.
    pub fn address_of(&self, owner: &OwnerId) -> VaultAddress {
        self.addresses.vault_address(owner)
    }

    // -- Reads --------------------------------------------------------------

    /// Current balance, 0 when the owner has no vault.
    pub fn balance(&self, owner: &OwnerId) -> VaultResult<u64> {
        Ok(self.record(owner)?.map_or(0, |r| r.balance))
    }

    pub fn record(&self, owner: &OwnerId) -> VaultResult<Option<VaultRecord>> {
        let address = self.address_of(owner);
        self.load(&address, owner)
    }

    pub fn exists(&self, owner: &OwnerId) -> VaultResult<bool> {
        Ok(self.record(owner)?.is_some())
    }

    /// Merkle root over the whole ledger.
    pub fn state_root(&self) -> VaultResult<[u8; 32]> {
        Ok(ledger::state_root(&self.store)?)
    }

    /// Sum of all balances held in custody.
    pub fn total_custody(&self) -> VaultResult<u128> {
        Ok(ledger::total_custody(&self.store)?)
    }

    // -- Operations ---------------------------------------------------------

    /// Dispatch an [`Operation`] for `owner`.
    pub fn apply(&self, owner: &OwnerId, op: Operation) -> VaultResult<Receipt> {
        match op {
            Operation::Deposit { amount } => self.deposit(owner, amount).map(Receipt::Deposit),
            Operation::Withdraw { amount } => self.withdraw(owner, amount).map(Receipt::Withdraw),
            Operation::Close => self.close(owner).map(Receipt::Close),
        }
    }

    /// Move `amount` into the owner's vault, creating the vault if needed.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AlreadyFunded`] under a single-deposit policy when the
    ///   guard sees an existing record.
    /// - [`VaultError::InvalidAmount`] for zero or below-floor amounts.
    /// - [`VaultError::Overflow`] if the balance would wrap.
    pub fn deposit(&self, owner: &OwnerId, amount: u64) -> VaultResult<DepositReceipt> {
        let address = self.address_of(owner);
        self.exclusive(&address, || self.deposit_locked(owner, address, amount))
    }

    fn deposit_locked(
        &self,
        owner: &OwnerId,
        address: VaultAddress,
        amount: u64,
    ) -> VaultResult<DepositReceipt> {
        let existing = self.load(&address, owner)?;

        if let Some(record) = &existing {
            if self.policy.blocks_deposit(record.balance) {
                debug!(%owner, %address, balance = record.balance, "deposit rejected: already funded");
                return Err(VaultError::AlreadyFunded { address });
            }
        }

        if let Err(reason) = self.check_deposit_amount(amount) {
            debug!(%owner, amount, %reason, "deposit rejected");
            return Err(VaultError::InvalidAmount { amount, reason });
        }

        let created = existing.is_none();
        let mut record =
            existing.unwrap_or_else(|| VaultRecord::open(*owner, self.policy.record_reserve));
        let balance = record.credit(amount)?;

        self.store.put(&address, &record)?;

        info!(%owner, %address, amount, balance, created, "deposited into vault");

        Ok(DepositReceipt {
            address,
            amount,
            balance,
            created,
            reserve_locked: if created { record.reserve } else { 0 },
        })
    }

    /// Take funds out of the owner's vault.
    ///
    /// Partial mode debits `amount` and keeps the record. Full-only mode
    /// drains everything, ignores `amount`, and destroys the record in the
    /// same commit.
    ///
    /// # Errors
    ///
    /// - [`VaultError::RecordNotFound`] when the owner has no vault.
    /// - [`VaultError::InvalidAmount`] for a missing/zero amount (partial) or
    ///   an empty vault (full-only).
    /// - [`VaultError::InsufficientFunds`] when `amount` exceeds the balance.
    pub fn withdraw(&self, owner: &OwnerId, amount: Option<u64>) -> VaultResult<WithdrawReceipt> {
        let address = self.address_of(owner);
        self.exclusive(&address, || self.withdraw_locked(owner, address, amount))
    }

    fn withdraw_locked(
        &self,
        owner: &OwnerId,
        address: VaultAddress,
        amount: Option<u64>,
    ) -> VaultResult<WithdrawReceipt> {
        let mut record = self.require(&address, owner)?;

        match self.policy.withdraw_mode() {
            WithdrawMode::Partial => {
                let requested = match amount {
                    None => {
                        return Err(VaultError::InvalidAmount {
                            amount: 0,
                            reason: AmountRejection::Missing,
                        })
                    }
                    Some(0) => {
                        return Err(VaultError::InvalidAmount {
                            amount: 0,
                            reason: AmountRejection::Zero,
                        })
                    }
                    Some(n) => n,
                };

                let balance = match record.debit(requested) {
                    Ok(balance) => balance,
                    Err(e) => {
                        debug!(%owner, requested, available = record.balance, "withdraw rejected");
                        return Err(e);
                    }
                };

                self.store.put(&address, &record)?;

                info!(%owner, %address, amount = requested, balance, "withdrew from vault");

                Ok(WithdrawReceipt {
                    address,
                    amount: requested,
                    balance,
                    closed: false,
                })
            }
            WithdrawMode::FullOnly => {
                if record.is_empty() {
                    return Err(VaultError::InvalidAmount {
                        amount: amount.unwrap_or(0),
                        reason: AmountRejection::NothingToWithdraw,
                    });
                }

                let drained = record.balance;
                self.store.remove(&address)?;

                info!(%owner, %address, amount = drained, "drained and released vault");

                Ok(WithdrawReceipt {
                    address,
                    amount: drained,
                    balance: 0,
                    closed: true,
                })
            }
        }
    }

    /// Destroy an empty vault and release its reserve.
    ///
    /// # Errors
    ///
    /// - [`VaultError::UnsupportedOperation`] when the policy has no close.
    /// - [`VaultError::RecordNotFound`] when the owner has no vault.
    /// - [`VaultError::VaultNotEmpty`] while any balance remains.
    pub fn close(&self, owner: &OwnerId) -> VaultResult<CloseReceipt> {
        if !self.policy.has_close() {
            return Err(VaultError::UnsupportedOperation {
                operation: "close",
                profile: self.policy.profile,
            });
        }

        let address = self.address_of(owner);
        self.exclusive(&address, || self.close_locked(owner, address))
    }

    fn close_locked(&self, owner: &OwnerId, address: VaultAddress) -> VaultResult<CloseReceipt> {
        let record = self.require(&address, owner)?;
        if !record.is_empty() {
            debug!(%owner, balance = record.balance, "close rejected: vault not empty");
            return Err(VaultError::VaultNotEmpty {
                balance: record.balance,
            });
        }

        self.store.remove(&address)?;

        info!(%owner, %address, reserve = record.reserve, "closed vault");

        Ok(CloseReceipt {
            address,
            reserve_released: record.reserve,
        })
    }

    // -- Internals ----------------------------------------------------------

    /// Run `f` holding the lock for `address`.
    fn exclusive<T>(
        &self,
        address: &VaultAddress,
        f: impl FnOnce() -> VaultResult<T>,
    ) -> VaultResult<T> {
        let lock = self.lock_for(address);
        let result = {
            let _guard = lock.lock();
            f()
        };
        drop(lock);

        // Count 1 means only the map holds it. Clones are only handed out
        // under the same shard lock.
        self.locks
            .remove_if(address, |_, m| Arc::strong_count(m) == 1);
        result
    }

    fn lock_for(&self, address: &VaultAddress) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(*address).or_default().value())
    }

    /// Read a record and make sure it belongs to `owner`.
    fn load(&self, address: &VaultAddress, owner: &OwnerId) -> VaultResult<Option<VaultRecord>> {
        match self.store.get(address)? {
            Some(record) if record.owner != *owner => Err(LedgerError::Corrupt(format!(
                "vault {address} is owned by {}, not {owner}",
                record.owner
            ))
            .into()),
            other => Ok(other),
        }
    }

    fn require(&self, address: &VaultAddress, owner: &OwnerId) -> VaultResult<VaultRecord> {
        self.load(address, owner)?.ok_or_else(|| {
            debug!(%owner, %address, "no vault record");
            VaultError::RecordNotFound { address: *address }
        })
    }

    fn check_deposit_amount(&self, amount: u64) -> Result<(), AmountRejection> {
        if amount == 0 {
            return Err(AmountRejection::Zero);
        }
        if amount < self.policy.min_deposit {
            return Err(AmountRejection::BelowFloor {
                minimum: self.policy.min_deposit,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SINGLE_SHOT_MIN_DEPOSIT, STATE_RECORD_RESERVE};
    use crate::ledger::MemoryLedger;
    use crate::policy::DepositGuard;

    const COIN: u64 = 1_000_000_000;

    fn owner(b: u8) -> OwnerId {
        OwnerId::new([b; 32])
    }

    fn top_up() -> VaultProcessor<MemoryLedger> {
        VaultProcessor::with_policy(MemoryLedger::new(), Policy::top_up())
    }

    fn single_shot() -> VaultProcessor<MemoryLedger> {
        VaultProcessor::with_policy(MemoryLedger::new(), Policy::single_shot())
    }

    #[test]
    fn first_deposit_creates_vault() {
        let p = top_up();
        let r = p.deposit(&owner(1), COIN).unwrap();

        assert!(r.created);
        assert_eq!(r.balance, COIN);
        assert_eq!(r.reserve_locked, STATE_RECORD_RESERVE);
        assert_eq!(r.address, p.deriver().derive(&owner(1)));
        assert!(p.exists(&owner(1)).unwrap());
    }

    #[test]
    fn top_up_accumulates() {
        let p = top_up();
        p.deposit(&owner(1), COIN).unwrap();
        let r = p.deposit(&owner(1), COIN / 2).unwrap();

        assert!(!r.created);
        assert_eq!(r.reserve_locked, 0);
        assert_eq!(r.balance, COIN + COIN / 2);
        assert_eq!(p.record(&owner(1)).unwrap().unwrap().deposit_count, 2);
    }

    #[test]
    fn zero_deposit_rejected() {
        let p = top_up();
        let err = p.deposit(&owner(1), 0).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidAmount {
                reason: AmountRejection::Zero,
                ..
            }
        ));
        assert!(!p.exists(&owner(1)).unwrap());
    }

    #[test]
    fn deposit_overflow_rejected_without_mutation() {
        let p = top_up();
        p.deposit(&owner(1), u64::MAX).unwrap();
        let root = p.state_root().unwrap();

        assert!(matches!(
            p.deposit(&owner(1), 1).unwrap_err(),
            VaultError::Overflow { .. }
        ));
        assert_eq!(p.state_root().unwrap(), root);
    }

    #[test]
    fn partial_withdraw_keeps_record_at_zero() {
        let p = top_up();
        p.deposit(&owner(1), 500).unwrap();
        let r = p.withdraw(&owner(1), Some(500)).unwrap();

        assert_eq!(r.balance, 0);
        assert!(!r.closed);
        assert!(p.exists(&owner(1)).unwrap());
    }

    #[test]
    fn partial_withdraw_requires_amount() {
        let p = top_up();
        p.deposit(&owner(1), 500).unwrap();

        assert!(matches!(
            p.withdraw(&owner(1), None).unwrap_err(),
            VaultError::InvalidAmount {
                reason: AmountRejection::Missing,
                ..
            }
        ));
        assert!(matches!(
            p.withdraw(&owner(1), Some(0)).unwrap_err(),
            VaultError::InvalidAmount {
                reason: AmountRejection::Zero,
                ..
            }
        ));
        assert_eq!(p.balance(&owner(1)).unwrap(), 500);
    }

    #[test]
    fn withdraw_without_vault_fails() {
        for p in [top_up(), single_shot()] {
            assert!(matches!(
                p.withdraw(&owner(7), Some(1)).unwrap_err(),
                VaultError::RecordNotFound { .. }
            ));
        }
    }

    #[test]
    fn close_requires_empty_vault() {
        let p = top_up();
        p.deposit(&owner(1), 10).unwrap();

        assert!(matches!(
            p.close(&owner(1)).unwrap_err(),
            VaultError::VaultNotEmpty { balance: 10 }
        ));

        p.withdraw(&owner(1), Some(10)).unwrap();
        let r = p.close(&owner(1)).unwrap();
        assert_eq!(r.reserve_released, STATE_RECORD_RESERVE);
        assert!(!p.exists(&owner(1)).unwrap());
        assert_eq!(p.balance(&owner(1)).unwrap(), 0);
    }

    #[test]
    fn close_without_vault_fails() {
        let p = top_up();
        assert!(matches!(
            p.close(&owner(3)).unwrap_err(),
            VaultError::RecordNotFound { .. }
        ));
    }

    #[test]
    fn closed_slot_can_be_reused() {
        let p = top_up();
        p.deposit(&owner(1), 10).unwrap();
        p.withdraw(&owner(1), Some(10)).unwrap();
        p.close(&owner(1)).unwrap();

        let r = p.deposit(&owner(1), 20).unwrap();
        assert!(r.created);
        assert_eq!(r.balance, 20);
        assert_eq!(p.record(&owner(1)).unwrap().unwrap().deposit_count, 1);
    }

    #[test]
    fn single_shot_rejects_second_deposit() {
        let p = single_shot();
        p.deposit(&owner(1), COIN).unwrap();

        assert!(matches!(
            p.deposit(&owner(1), COIN).unwrap_err(),
            VaultError::AlreadyFunded { .. }
        ));
        assert_eq!(p.balance(&owner(1)).unwrap(), COIN);
    }

    #[test]
    fn single_shot_floor() {
        let p = single_shot();
        assert!(matches!(
            p.deposit(&owner(1), SINGLE_SHOT_MIN_DEPOSIT - 1).unwrap_err(),
            VaultError::InvalidAmount {
                reason: AmountRejection::BelowFloor { .. },
                ..
            }
        ));
        assert!(p.deposit(&owner(1), SINGLE_SHOT_MIN_DEPOSIT).is_ok());
    }

    #[test]
    fn single_shot_withdraw_drains_and_destroys() {
        let p = single_shot();
        p.deposit(&owner(1), COIN).unwrap();

        let r = p.withdraw(&owner(1), Some(1)).unwrap();
        assert_eq!(r.amount, COIN);
        assert!(r.closed);
        assert!(!p.exists(&owner(1)).unwrap());
        assert!(p.store().is_empty());
    }

    #[test]
    fn single_shot_has_no_close() {
        let p = single_shot();
        p.deposit(&owner(1), COIN).unwrap();
        assert!(matches!(
            p.close(&owner(1)).unwrap_err(),
            VaultError::UnsupportedOperation {
                operation: "close",
                ..
            }
        ));
        assert!(p.exists(&owner(1)).unwrap());
    }

    #[test]
    fn nonzero_guard_lets_empty_record_refill() {
        // Single-shot never leaves an empty record behind on its own, so
        // plant one directly to exercise the guard.
        let mut policy = Policy::single_shot();
        policy.deposit_guard = DepositGuard::NonzeroBalance;
        let p = VaultProcessor::with_policy(MemoryLedger::new(), policy);
        let address = p.address_of(&owner(1));
        p.store()
            .put(&address, &VaultRecord::open(owner(1), 0))
            .unwrap();

        let r = p.deposit(&owner(1), COIN).unwrap();
        assert!(!r.created);
        assert_eq!(r.balance, COIN);
        assert!(p.deposit(&owner(1), COIN).is_err());
    }

    #[test]
    fn full_only_on_empty_record_is_invalid_amount() {
        let p = single_shot();
        let address = p.address_of(&owner(1));
        p.store()
            .put(&address, &VaultRecord::open(owner(1), 0))
            .unwrap();

        assert!(matches!(
            p.withdraw(&owner(1), None).unwrap_err(),
            VaultError::InvalidAmount {
                reason: AmountRejection::NothingToWithdraw,
                ..
            }
        ));
    }

    #[test]
    fn foreign_record_at_address_is_corruption() {
        let p = top_up();
        let address = p.address_of(&owner(1));
        p.store()
            .put(&address, &VaultRecord::open(owner(2), 0))
            .unwrap();

        assert!(matches!(
            p.balance(&owner(1)).unwrap_err(),
            VaultError::Ledger(LedgerError::Corrupt(_))
        ));
    }

    #[test]
    fn apply_dispatches() {
        let p = top_up();
        let o = owner(4);

        let r = p.apply(&o, Operation::Deposit { amount: 50 }).unwrap();
        assert_eq!(r.balance(), 50);
        let r = p.apply(&o, Operation::Withdraw { amount: Some(50) }).unwrap();
        assert_eq!(r.balance(), 0);
        let r = p.apply(&o, Operation::Close).unwrap();
        assert!(matches!(r, Receipt::Close(_)));
        assert_eq!(r.address(), p.address_of(&o));
    }

    #[test]
    fn operation_json_shape() {
        let op: Operation = serde_json::from_str(r#"{ "type": "withdraw" }"#).unwrap();
        assert_eq!(op, Operation::Withdraw { amount: None });

        let op: Operation = serde_json::from_str(r#"{ "type": "deposit", "amount": 5 }"#).unwrap();
        assert_eq!(op, Operation::Deposit { amount: 5 });
        assert_eq!(op.name(), "deposit");
    }

    #[test]
    fn lock_map_drains_after_lifecycle() {
        let p = top_up();
        p.deposit(&owner(1), 10).unwrap();
        p.withdraw(&owner(1), Some(10)).unwrap();
        p.close(&owner(1)).unwrap();
        assert_eq!(p.locks.len(), 0);

        let s = single_shot();
        s.deposit(&owner(1), COIN).unwrap();
        s.withdraw(&owner(1), None).unwrap();
        assert_eq!(s.locks.len(), 0);
    }

    #[test]
    fn lock_map_drains_after_rejections_on_absent_owners() {
        let p = top_up();
        for b in 0..=255u8 {
            assert!(p.withdraw(&owner(b), Some(1)).is_err());
            assert!(p.close(&owner(b)).is_err());
            assert!(p.deposit(&owner(b), 0).is_err());
        }

        assert!(p.store().is_empty());
        assert_eq!(p.locks.len(), 0);
    }

    #[test]
    fn concurrent_deposits_on_one_owner_all_land() {
        let p = Arc::new(top_up());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = Arc::clone(&p);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        p.deposit(&owner(1), 3).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(p.balance(&owner(1)).unwrap(), 8 * 100 * 3);
        assert_eq!(p.record(&owner(1)).unwrap().unwrap().deposit_count, 800);
        assert_eq!(p.locks.len(), 0);
    }

    #[test]
    fn concurrent_single_shot_deposits_admit_exactly_one() {
        let p = Arc::new(single_shot());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = Arc::clone(&p);
                std::thread::spawn(move || p.deposit(&owner(1), COIN).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(p.balance(&owner(1)).unwrap(), COIN);
    }
}
