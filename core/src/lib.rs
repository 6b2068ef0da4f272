// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Custodial Vault — Core Library
//!
//! Every owner gets exactly one vault. The vault lives at an address that
//! anyone can re-derive from the owner's identity, holds a balance in the
//! smallest fund unit, and goes through a short, strict lifecycle:
//! created by the first deposit, topped up or drained, and finally destroyed.
//!
//! Balances never go negative, writes are never partial, and a record never
//! outlives its funds. No fees are charged.
//!
//! ## Architecture
//!
//! - **identity** — The authenticated owner handle. Verification happens
//!   upstream; by the time an `OwnerId` reaches us, we trust it.
//! - **address** — Deterministic vault addresses. Pure functions plus an
//!   optional memo cache.
//! - **policy** — The two behavior profiles (top-up vs. single-shot).
//! - **ledger** — The record set and its storage backends (memory, sled).
//! - **processor** — Deposit / Withdraw / Close, validated then applied.
//! - **config** — Constants and runtime configuration.
//! - **error** — The error taxonomy surfaced to callers.
//!
//! ## Ground Rules
//!
//! 1. Validate everything, then mutate once. A rejected operation leaves the
//!    ledger exactly as it found it.
//! 2. All amounts are `u64` smallest units with checked arithmetic.
//! 3. One writer per vault at a time; different vaults never wait on each other.

pub mod address;
pub mod config;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod policy;
pub mod processor;

pub use address::{AddressCache, AddressDeriver, VaultAddress};
pub use config::VaultConfig;
pub use error::{LedgerError, VaultError, VaultResult};
pub use identity::OwnerId;
pub use ledger::{LedgerStore, MemoryLedger, SledLedger, VaultRecord};
pub use policy::{DepositGuard, Policy, PolicyProfile, WithdrawMode};
pub use processor::{
    CloseReceipt, DepositReceipt, Operation, Receipt, VaultProcessor, WithdrawReceipt,
};
