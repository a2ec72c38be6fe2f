//! Event production for lineage chains.
//!
//! Event construction is an explicit three-stage pipeline because each
//! stage consumes the previous one's output: the store-assigned index feeds
//! the event hash, and the event hash feeds the signed message.
//!
//! ```text
//! EventBuilder::allocate(source, index, prev_hash)   -> Allocated
//!     .commit(payload, timestamp)                    -> Committed
//!     .sign(&key, SignatureMode)                     -> Event
//! ```
//!
//! [`Producer`] drives the pipeline against a [`LineageStore`](lineage_store::LineageStore)
//! and owns the source's key pair and monotonic clock.

pub mod builder;
pub mod clock;
pub mod producer;

pub use builder::{Allocated, Committed, EventBuilder, SignatureMode};
pub use clock::{Clock, ManualClock, SystemClock};
pub use producer::Producer;
