//! Append-only lineage store.
//!
//! This crate provides:
//! - the `LineageStore` trait boundary (index allocation, chain-tip lookup,
//!   append, chain read-back)
//! - `InMemoryStore` for tests and embedding
//! - `FileStore`, backed by a CRC-framed event log that survives restarts
//! - `StoreValidator` for store-wide integrity reports
//!
//! Appends are checked at the store boundary: an event is accepted only if
//! its index is the next global index and its `prev_hash` is its source's
//! current chain tip.

pub mod error;
pub mod file;
mod index;
pub mod log;
pub mod memory;
pub mod traits;
pub mod validation;

pub use error::{Result, StoreError};
pub use file::{FileStore, FileStoreConfig};
pub use log::{EventLog, SyncMode};
pub use memory::InMemoryStore;
pub use traits::LineageStore;
pub use validation::{StoreValidator, ValidationReport, Violation, ViolationKind};
