use std::sync::RwLock;

use lineage_types::{Digest, Event, SourceId};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::index::ChainIndex;
use crate::traits::LineageStore;

/// In-memory lineage store for tests, local demos, and embedding.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<ChainIndex>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineageStore for InMemoryStore {
    fn allocate_next_index(&self) -> Result<u64> {
        let index = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.next_index())
    }

    fn last_hash(&self, source: &SourceId) -> Result<Digest> {
        let index = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.tip(source))
    }

    fn append(&self, event: &Event) -> Result<()> {
        let mut index = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        index.check_append(event)?;
        index.insert(event.clone());
        debug!(index = event.index, source = %event.source_id, "event appended");
        Ok(())
    }

    fn read_chain(&self, source: &SourceId) -> Result<Vec<Event>> {
        let index = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.chain(source))
    }

    fn read_all(&self) -> Result<Vec<Event>> {
        let index = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.all())
    }

    fn sources(&self) -> Result<Vec<SourceId>> {
        let index = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.sources())
    }

    fn event_count(&self) -> Result<u64> {
        let index = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.len())
    }
}
