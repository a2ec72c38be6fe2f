use std::io;

use lineage_types::{Digest, SourceId};

/// Errors produced by lineage store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store is unavailable or failed mid-operation.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Append attempted with an index other than the next global index.
    #[error("append out of order: expected index {expected}, got {found}")]
    IndexOutOfOrder { expected: u64, found: u64 },

    /// Append attempted with a `prev_hash` that is not the source's chain tip.
    #[error("chain tip mismatch for {source_id}: tip is {}, event links to {}", .expected.short_hex(), .found.short_hex())]
    ChainTipMismatch {
        source_id: SourceId,
        expected: Digest,
        found: Digest,
    },

    #[error("store lock poisoned")]
    LockPoisoned,

    /// A failed append could not be removed from the log; the log must be
    /// reopened before further writes.
    #[error("event log damaged by a failed write at offset {offset}")]
    LogDamaged { offset: u64 },
}

/// Convenience alias used throughout the store crate.
pub type Result<T> = std::result::Result<T, StoreError>;
