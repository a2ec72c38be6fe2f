use std::path::Path;
use std::sync::RwLock;

use lineage_types::{Digest, Event, SourceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::index::ChainIndex;
use crate::log::{EventLog, SyncMode};
use crate::traits::LineageStore;

/// Configuration for a [`FileStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStoreConfig {
    pub sync_mode: SyncMode,
}

/// Lineage store persisted to an [`EventLog`].
///
/// Opening a store replays the log into memory, so a fresh `FileStore` on
/// the same path observes every previously appended event.
pub struct FileStore {
    log: EventLog,
    inner: RwLock<ChainIndex>,
}

impl FileStore {
    pub fn open(path: &Path, config: FileStoreConfig) -> Result<Self> {
        let log = EventLog::open(path, config.sync_mode)?;
        let mut index = ChainIndex::default();

        for event in log.recover()? {
            if let Err(e) = index.check_append(&event) {
                warn!(index = event.index, source = %event.source_id, error = %e, "replayed event breaks append order");
            }
            index.insert(event);
        }

        info!(
            path = %path.display(),
            events = index.len(),
            bytes = log.offset()?,
            "lineage store opened"
        );
        Ok(Self {
            log,
            inner: RwLock::new(index),
        })
    }
}

impl LineageStore for FileStore {
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
        let offset = self.log.append(event)?;
        index.insert(event.clone());
        debug!(index = event.index, source = %event.source_id, offset, "event persisted");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::tests::{chain_event, push, source};
    use crate::validation::{StoreValidator, ViolationKind};
    use lineage_types::GENESIS;

    #[test]
    fn reopened_store_sees_identical_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.log");

        let written = {
            let store = FileStore::open(&path, FileStoreConfig::default()).unwrap();
            vec![
                push(&store, "A", 10),
                push(&store, "B", 10),
                push(&store, "A", 11),
            ]
        };

        let reopened = FileStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(reopened.event_count().unwrap(), 3);
        assert_eq!(reopened.read_all().unwrap(), written);
        assert_eq!(
            reopened.read_chain(&source("A")).unwrap(),
            vec![written[0].clone(), written[2].clone()]
        );
        assert_eq!(reopened.last_hash(&source("B")).unwrap(), written[1].event_hash);
        assert_eq!(reopened.allocate_next_index().unwrap(), 3);
    }

    #[test]
    fn appends_continue_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.log");
        let first = FileStore::open(&path, FileStoreConfig::default()).unwrap();
        let a0 = push(&first, "A", 1);
        drop(first);

        let second = FileStore::open(&path, FileStoreConfig::default()).unwrap();
        let a1 = push(&second, "A", 2);
        assert_eq!(a1.index, 1);
        assert_eq!(a1.prev_hash, a0.event_hash);
        drop(second);

        let third = FileStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(third.read_chain(&source("A")).unwrap(), vec![a0, a1]);
    }

    #[test]
    fn rejected_append_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.log");
        let store = FileStore::open(&path, FileStoreConfig::default()).unwrap();
        push(&store, "A", 1);

        let fork = chain_event("A", 1, GENESIS, "fork", 2);
        assert!(matches!(
            store.append(&fork),
            Err(StoreError::ChainTipMismatch { .. })
        ));
        drop(store);

        let reopened = FileStore::open(&path, FileStoreConfig::default()).unwrap();
        assert_eq!(reopened.event_count().unwrap(), 1);
    }

    #[test]
    fn reordered_log_reads_back_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reordered.log");
        let a0 = chain_event("A", 0, GENESIS, "A-0", 1);
        let a1 = chain_event("A", 1, a0.event_hash, "A-1", 2);
        {
            let log = EventLog::open(&path, SyncMode::default()).unwrap();
            log.append(&a1).unwrap();
            log.append(&a0).unwrap();
        }

        let store = FileStore::open(&path, FileStoreConfig::default()).unwrap();
        let indices: Vec<u64> = store
            .read_chain(&source("A"))
            .unwrap()
            .iter()
            .map(|e| e.index)
            .collect();
        assert_eq!(indices, [0, 1]);
        assert_eq!(store.last_hash(&source("A")).unwrap(), a1.event_hash);
        assert_eq!(store.read_all().unwrap(), vec![a1, a0]);

        let report = StoreValidator::validate(&store).unwrap();
        assert!(!report.indices_gap_free);
        assert!(report.chains_valid);
        assert!(report
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::IndexGap));
    }

    #[test]
    fn open_fails_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FileStore::open(dir.path(), FileStoreConfig::default()),
            Err(StoreError::Io(_))
        ));
    }
}
