use lineage_types::{Digest, Event, SourceId};

use crate::error::Result;

/// Append-only store of events grouped by source.
///
/// Index allocation is global across all sources; chain linkage is per
/// source.
pub trait LineageStore: Send + Sync {
    /// Next global index: current maximum plus one, or 0 for an empty store.
    ///
    /// This does not reserve the index. Allocation and the following
    /// `append` must be serialized by the caller; a lost race surfaces as
    /// [`StoreError::IndexOutOfOrder`](crate::StoreError::IndexOutOfOrder).
    fn allocate_next_index(&self) -> Result<u64>;

    /// Chain tip of `source`, or [`GENESIS`](lineage_types::GENESIS).
    fn last_hash(&self, source: &SourceId) -> Result<Digest>;

    /// Persist `event` without reordering or mutating earlier events.
    fn append(&self, event: &Event) -> Result<()>;

    /// Full history of `source`, ascending by index.
    fn read_chain(&self, source: &SourceId) -> Result<Vec<Event>>;

    /// Every event in append order.
    fn read_all(&self) -> Result<Vec<Event>>;

    /// Sources with at least one event, sorted.
    fn sources(&self) -> Result<Vec<SourceId>>;

    /// Total number of stored events.
    fn event_count(&self) -> Result<u64>;
}
