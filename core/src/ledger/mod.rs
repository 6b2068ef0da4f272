//! # Vault Ledger
//!
//! The persistent record set: at most one [`VaultRecord`] per vault address.
//! Allocation and deallocation are the lifecycle. There is no "deleted"
//! flag, so a destroyed vault reads exactly like one that never existed.
//!
//! ## Layout
//!
//! ```text
//! record.rs — VaultRecord and its checked balance arithmetic
//! memory.rs — MemoryLedger, a HashMap behind a RwLock
//! db.rs     — SledLedger, the on-disk backend (bincode values)
//! root.rs   — state root and custody totals over any backend
//! ```
//!
//! Backends only store and fetch. Validation belongs to the processor, which
//! also serializes writers per address; a backend just has to make each
//! single-key `put`/`remove` atomic.

pub mod db;
pub mod memory;
pub mod record;
pub mod root;

pub use db::SledLedger;
pub use memory::MemoryLedger;
pub use record::VaultRecord;
pub use root::{state_root, total_custody};

use crate::address::VaultAddress;
use crate::error::LedgerResult;

/// Keyed store of vault records.
///
/// All methods take `&self`: backends handle their own interior locking so
/// a processor can be shared across threads.
pub trait LedgerStore: Send + Sync {
    /// Fetch the record at `address`, if allocated.
    fn get(&self, address: &VaultAddress) -> LedgerResult<Option<VaultRecord>>;

    /// Allocate or overwrite the record at `address`.
    fn put(&self, address: &VaultAddress, record: &VaultRecord) -> LedgerResult<()>;

    /// Deallocate the record at `address`, returning what was there.
    fn remove(&self, address: &VaultAddress) -> LedgerResult<Option<VaultRecord>>;

    /// Number of live records.
    fn len(&self) -> usize;

    /// All live records, sorted by address.
    fn records(&self) -> LedgerResult<Vec<(VaultAddress, VaultRecord)>>;

    fn contains(&self, address: &VaultAddress) -> LedgerResult<bool> {
        Ok(self.get(address)?.is_some())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make pending writes durable. No-op for volatile backends.
    fn flush(&self) -> LedgerResult<()> {
        Ok(())
    }
}
