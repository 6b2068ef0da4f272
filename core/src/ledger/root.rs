//! Ledger-wide digests.
//!
//! The state root is a binary BLAKE3 Merkle root over the sorted records:
//!
//! ```text
//! leaves = [ BLAKE3(address || bincode(record)) for (address, record) in sorted ledger ]
//! root   = merkle_root(leaves)      // odd node pairs with itself
//! ```
//!
//! Two ledgers with the same records have the same root no matter the
//! insertion order or backend. An empty ledger's root is `[0u8; 32]`.

use super::LedgerStore;
use crate::error::LedgerResult;

/// Merkle root of every record in `store`.
pub fn state_root<S: LedgerStore + ?Sized>(store: &S) -> LedgerResult<[u8; 32]> {
    let records = store.records()?;
    if records.is_empty() {
        return Ok([0u8; 32]);
    }

    let mut level = Vec::with_capacity(records.len());
    for (address, record) in &records {
        let mut hasher = blake3::Hasher::new();
        hasher.update(address.as_bytes());
        hasher.update(&bincode::serialize(record)?);
        level.push(*hasher.finalize().as_bytes());
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for pair in level.chunks(2) {
            let mut hasher = blake3::Hasher::new();
            hasher.update(&pair[0]);
            hasher.update(pair.get(1).unwrap_or(&pair[0]));
            next.push(*hasher.finalize().as_bytes());
        }
        level = next;
    }

    Ok(level[0])
}

/// Sum of all vault balances. `u128` so it can't overflow.
pub fn total_custody<S: LedgerStore + ?Sized>(store: &S) -> LedgerResult<u128> {
    Ok(store
        .records()?
        .iter()
        .map(|(_, record)| record.balance as u128)
        .sum())
}
