//! Foundation types for event lineage.
//!
//! Every other lineage crate depends on `lineage-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — fixed-width BLAKE3 value, text-encoded as lowercase hex
//! - [`GENESIS`] — the all-zero digest marking "no predecessor"
//! - [`SourceId`] — identifier of an event-producing agent
//! - [`Event`] — one signed, hash-chained record

pub mod digest;
pub mod error;
pub mod event;
pub mod source;

pub use digest::{Digest, GENESIS};
pub use error::TypeError;
pub use event::{canonical_message, Event, CANONICAL_DELIMITER};
pub use source::SourceId;
