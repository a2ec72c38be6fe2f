use std::collections::HashMap;

use lineage_types::{Digest, Event, SourceId, GENESIS};

use crate::error::{Result, StoreError};

/// Ordered event history plus derived lookups shared by every store.
#[derive(Default)]
pub(crate) struct ChainIndex {
    events: Vec<Event>,
    by_source: HashMap<SourceId, Vec<usize>>,
    tips: HashMap<SourceId, Digest>,
    max_index: Option<u64>,
}

impl ChainIndex {
    pub(crate) fn next_index(&self) -> u64 {
        self.max_index.map_or(0, |max| max + 1)
    }

    pub(crate) fn tip(&self, source: &SourceId) -> Digest {
        self.tips.get(source).copied().unwrap_or(GENESIS)
    }

    /// Append precondition: next global index and current chain tip.
    pub(crate) fn check_append(&self, event: &Event) -> Result<()> {
        let expected = self.next_index();
        if event.index != expected {
            return Err(StoreError::IndexOutOfOrder {
                expected,
                found: event.index,
            });
        }
        let tip = self.tip(&event.source_id);
        if event.prev_hash != tip {
            return Err(StoreError::ChainTipMismatch {
                source_id: event.source_id.clone(),
                expected: tip,
                found: event.prev_hash,
            });
        }
        Ok(())
    }

    /// Record an event without checking it.
    ///
    /// Per-source positions stay sorted by index even when replay delivers
    /// events out of order; the tip is the highest-index event of the source.
    pub(crate) fn insert(&mut self, event: Event) {
        let position = self.events.len();
        self.max_index = Some(self.max_index.map_or(event.index, |m| m.max(event.index)));

        let positions = self.by_source.entry(event.source_id.clone()).or_default();
        let slot = positions.partition_point(|&p| self.events[p].index <= event.index);
        positions.insert(slot, position);
        if slot == positions.len() - 1 {
            self.tips.insert(event.source_id.clone(), event.event_hash);
        }
        self.events.push(event);
    }

    /// Events of `source`, ascending by index.
    pub(crate) fn chain(&self, source: &SourceId) -> Vec<Event> {
        self.by_source
            .get(source)
            .map(|positions| positions.iter().map(|&p| self.events[p].clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn all(&self) -> Vec<Event> {
        self.events.clone()
    }

    pub(crate) fn sources(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> = self.by_source.keys().cloned().collect();
        sources.sort();
        sources
    }

    pub(crate) fn len(&self) -> u64 {
        self.events.len() as u64
    }
}
