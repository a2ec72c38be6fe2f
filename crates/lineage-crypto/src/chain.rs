use lineage_types::{Event, GENESIS};

use crate::hasher::ContentHasher;

/// Structural verifier for one source's chain.
///
/// Needs no key material: checks that the chain starts at GENESIS, that each
/// event links to its predecessor's hash, that each hash and payload
/// commitment is correctly computed, that indices ascend and timestamps
/// strictly increase.
pub struct ChainVerifier;

impl ChainVerifier {
    /// Verify a chain of events belonging to a single source, in index order.
    pub fn verify_chain(events: &[Event]) -> Result<(), ChainError> {
        let Some(first) = events.first() else {
            return Ok(());
        };

        if first.prev_hash != GENESIS {
            return Err(ChainError::MissingGenesis { index: first.index });
        }

        for (position, event) in events.iter().enumerate() {
            if event.source_id != first.source_id {
                return Err(ChainError::ForeignSource { index: event.index });
            }

            if ContentHasher::payload_commitment(&event.payload) != event.payload_commitment {
                return Err(ChainError::CommitmentMismatch { index: event.index });
            }
            let computed = ContentHasher::event_hash(
                &event.source_id,
                event.index,
                &event.prev_hash,
                &event.payload,
                event.timestamp,
            );
            if computed != event.event_hash {
                return Err(ChainError::HashMismatch { index: event.index });
            }

            if position == 0 {
                continue;
            }
            let prev = &events[position - 1];
            if event.prev_hash != prev.event_hash {
                return Err(ChainError::BrokenLink { index: event.index });
            }
            if event.index <= prev.index {
                return Err(ChainError::IndexNotAscending {
                    index: event.index,
                    previous: prev.index,
                });
            }
            if event.timestamp <= prev.timestamp {
                return Err(ChainError::TimestampNotIncreasing { index: event.index });
            }
        }

        Ok(())
    }
}

/// Errors from chain verification. `index` is the event's global index.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("first event {index} does not start from GENESIS")]
    MissingGenesis { index: u64 },

    #[error("event {index} belongs to a different source")]
    ForeignSource { index: u64 },

    #[error("broken link at event {index}: prev_hash does not match")]
    BrokenLink { index: u64 },

    #[error("hash mismatch at event {index}: computed hash differs from stored")]
    HashMismatch { index: u64 },

    #[error("payload commitment mismatch at event {index}")]
    CommitmentMismatch { index: u64 },

    #[error("event {index} does not follow event {previous}")]
    IndexNotAscending { index: u64, previous: u64 },

    #[error("timestamp at event {index} does not increase")]
    TimestampNotIncreasing { index: u64 },
}
