use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::source::SourceId;

/// Field separator of the canonical signing message.
pub const CANONICAL_DELIMITER: char = '|';

/// One signed, hash-chained lineage record.
///
/// Events are immutable once built. Per source, events ordered by `index`
/// form a hash chain: each `prev_hash` is the previous event's `event_hash`,
/// and the first event of a source points at [`GENESIS`](crate::GENESIS).
/// `index` is global across every source sharing a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Producing agent.
    pub source_id: SourceId,
    /// Global, store-assigned position.
    pub index: u64,
    /// Opaque application data.
    pub payload: String,
    /// Digest of `payload` alone.
    pub payload_commitment: Digest,
    /// Digest over `(source_id, index, prev_hash, payload, timestamp)`.
    pub event_hash: Digest,
    /// Chain tip of this source when the event was built.
    pub prev_hash: Digest,
    /// UNIX seconds, strictly increasing per source.
    pub timestamp: u64,
    /// Raw signature bytes over [`Event::canonical_message`].
    #[serde(with = "signature_bytes")]
    pub signature: Vec<u8>,
}

impl Event {
    /// Canonical signing message for this event's fields.
    pub fn canonical_message(&self) -> Vec<u8> {
        canonical_message(
            &self.source_id,
            self.index,
            &self.prev_hash,
            &self.event_hash,
            &self.payload_commitment,
            self.timestamp,
        )
    }

    /// Returns `true` if this is the first event of its source.
    pub fn is_chain_start(&self) -> bool {
        self.prev_hash.is_genesis()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "evt#{:03} {} [{}]",
            self.index,
            self.source_id,
            self.event_hash.short_hex()
        )
    }
}

/// Build the canonical signing message.
///
/// Field order is `source_id, index, prev_hash, event_hash,
/// payload_commitment, timestamp`, which differs from the event-hash input
/// order. Producers and verifiers must both go through this function.
pub fn canonical_message(
    source_id: &SourceId,
    index: u64,
    prev_hash: &Digest,
    event_hash: &Digest,
    payload_commitment: &Digest,
    timestamp: u64,
) -> Vec<u8> {
    let d = CANONICAL_DELIMITER;
    format!("{source_id}{d}{index}{d}{prev_hash}{d}{event_hash}{d}{payload_commitment}{d}{timestamp}")
        .into_bytes()
}

mod signature_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(sig: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(sig)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<u8>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GENESIS;

    fn sample() -> Event {
        Event {
            source_id: SourceId::new("A").unwrap(),
            index: 7,
            payload: "hello".into(),
            payload_commitment: Digest::from_hash([2; 32]),
            event_hash: Digest::from_hash([3; 32]),
            prev_hash: GENESIS,
            timestamp: 1_700_000_000,
            signature: vec![9; 64],
        }
    }

    #[test]
    fn canonical_message_field_order() {
        let e = sample();
        let expected = format!(
            "A|7|{}|{}|{}|1700000000",
            "0".repeat(64),
            "03".repeat(32),
            "02".repeat(32)
        );
        assert_eq!(e.canonical_message(), expected.into_bytes());
    }

    #[test]
    fn canonical_message_ignores_payload_and_signature() {
        let a = sample();
        let mut b = sample();
        b.payload = "something else".into();
        b.signature = vec![0; 64];
        assert_eq!(a.canonical_message(), b.canonical_message());
    }

    #[test]
    fn chain_start_detection() {
        let mut e = sample();
        assert!(e.is_chain_start());
        e.prev_hash = Digest::from_hash([1; 32]);
        assert!(!e.is_chain_start());
    }

    #[test]
    fn display_shows_index_and_source() {
        assert_eq!(sample().to_string(), "evt#007 A [03030303]");
    }

    #[test]
    fn bincode_preserves_every_field() {
        let e = sample();
        let bytes = bincode::serialize(&e).unwrap();
        let back: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, e);
    }
}
