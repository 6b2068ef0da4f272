//! In-memory ledger backend.
//!
//! A `HashMap` behind a `parking_lot::RwLock`. Used by tests, benches and
//! anything that doesn't need the ledger to survive a restart.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{LedgerStore, VaultRecord};
use crate::address::VaultAddress;
use crate::error::LedgerResult;

#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<HashMap<VaultAddress, VaultRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedger {
    fn get(&self, address: &VaultAddress) -> LedgerResult<Option<VaultRecord>> {
        Ok(self.records.read().get(address).cloned())
    }

    fn put(&self, address: &VaultAddress, record: &VaultRecord) -> LedgerResult<()> {
        self.records.write().insert(*address, record.clone());
        Ok(())
    }

    fn remove(&self, address: &VaultAddress) -> LedgerResult<Option<VaultRecord>> {
        Ok(self.records.write().remove(address))
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }

    fn records(&self) -> LedgerResult<Vec<(VaultAddress, VaultRecord)>> {
        let mut all: Vec<_> = self
            .records
            .read()
            .iter()
            .map(|(a, r)| (*a, r.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::OwnerId;

    fn address(b: u8) -> VaultAddress {
        VaultAddress::from_bytes([b; 32])
    }

    #[test]
    fn put_get_remove() {
        let ledger = MemoryLedger::new();
        let record = VaultRecord::open(OwnerId::new([1; 32]), 0);

        assert!(ledger.get(&address(1)).unwrap().is_none());
        ledger.put(&address(1), &record).unwrap();
        assert_eq!(ledger.get(&address(1)).unwrap(), Some(record.clone()));
        assert!(ledger.contains(&address(1)).unwrap());

        assert_eq!(ledger.remove(&address(1)).unwrap(), Some(record));
        assert!(ledger.is_empty());
        assert!(ledger.remove(&address(1)).unwrap().is_none());
    }

    #[test]
    fn records_are_sorted() {
        let ledger = MemoryLedger::new();
        for b in [9u8, 2, 5] {
            ledger
                .put(&address(b), &VaultRecord::open(OwnerId::new([b; 32]), 0))
                .unwrap();
        }
        let keys: Vec<_> = ledger.records().unwrap().into_iter().map(|(a, _)| a).collect();
        assert_eq!(keys, vec![address(2), address(5), address(9)]);
    }
}
