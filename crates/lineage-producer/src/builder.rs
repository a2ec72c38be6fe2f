use lineage_crypto::{ContentHasher, SigningKey};
use lineage_types::{canonical_message, Digest, Event, SourceId};

/// Which message a producer signs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignatureMode {
    /// Sign the canonical message.
    #[default]
    Canonical,
    /// Sign the byte-reversed canonical message.
    ///
    /// Models a key holder emitting structurally inconsistent signatures:
    /// the event keeps an intact hash chain but fails verification.
    Corrupted,
}

/// Entry point of the staged event pipeline.
pub struct EventBuilder;

impl EventBuilder {
    /// Stage 1: fix the event's position.
    pub fn allocate(source_id: SourceId, index: u64, prev_hash: Digest) -> Allocated {
        Allocated {
            source_id,
            index,
            prev_hash,
        }
    }
}

/// Position fixed; content not yet committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocated {
    source_id: SourceId,
    index: u64,
    prev_hash: Digest,
}

impl Allocated {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn prev_hash(&self) -> Digest {
        self.prev_hash
    }

    /// Stage 2: commit payload and timestamp, computing both digests.
    pub fn commit(self, payload: impl Into<String>, timestamp: u64) -> Committed {
        let payload = payload.into();
        let payload_commitment = ContentHasher::payload_commitment(&payload);
        let event_hash = ContentHasher::event_hash(
            &self.source_id,
            self.index,
            &self.prev_hash,
            &payload,
            timestamp,
        );
        Committed {
            source_id: self.source_id,
            index: self.index,
            prev_hash: self.prev_hash,
            payload,
            payload_commitment,
            event_hash,
            timestamp,
        }
    }
}

/// Content committed; awaiting a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committed {
    source_id: SourceId,
    index: u64,
    prev_hash: Digest,
    payload: String,
    payload_commitment: Digest,
    event_hash: Digest,
    timestamp: u64,
}

impl Committed {
    pub fn event_hash(&self) -> Digest {
        self.event_hash
    }

    pub fn payload_commitment(&self) -> Digest {
        self.payload_commitment
    }

    /// The message a canonical signature covers.
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

    /// Stage 3: sign and emit the finished event.
    pub fn sign(self, key: &SigningKey, mode: SignatureMode) -> Event {
        let mut message = self.canonical_message();
        if mode == SignatureMode::Corrupted {
            message.reverse();
        }
        let signature = key.sign(&message).to_vec();

        Event {
            source_id: self.source_id,
            index: self.index,
            payload: self.payload,
            payload_commitment: self.payload_commitment,
            event_hash: self.event_hash,
            prev_hash: self.prev_hash,
            timestamp: self.timestamp,
            signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_crypto::{verify_event, ChainVerifier, EventVerifier, VerifyFailure};
    use lineage_types::GENESIS;

    fn source() -> SourceId {
        SourceId::new("A").unwrap()
    }

    #[test]
    fn stages_carry_position_and_content() {
        let allocated = EventBuilder::allocate(source(), 4, GENESIS);
        assert_eq!(allocated.index(), 4);
        assert_eq!(allocated.prev_hash(), GENESIS);

        let committed = allocated.commit("payload", 1_000);
        assert_eq!(
            committed.payload_commitment(),
            ContentHasher::payload_commitment("payload")
        );
        assert_eq!(
            committed.event_hash(),
            ContentHasher::event_hash(&source(), 4, &GENESIS, "payload", 1_000)
        );

        let key = SigningKey::generate();
        let event = committed.clone().sign(&key, SignatureMode::Canonical);
        assert_eq!(event.index, 4);
        assert_eq!(event.payload, "payload");
        assert_eq!(event.event_hash, committed.event_hash());
        assert_eq!(event.canonical_message(), committed.canonical_message());
    }

    #[test]
    fn index_feeds_the_event_hash() {
        let a = EventBuilder::allocate(source(), 0, GENESIS).commit("p", 1);
        let b = EventBuilder::allocate(source(), 1, GENESIS).commit("p", 1);
        assert_ne!(a.event_hash(), b.event_hash());
        assert_eq!(a.payload_commitment(), b.payload_commitment());
    }

    #[test]
    fn canonical_signature_verifies() {
        let key = SigningKey::generate();
        let event = EventBuilder::allocate(source(), 0, GENESIS)
            .commit("p", 1)
            .sign(&key, SignatureMode::Canonical);
        assert!(verify_event(&event, &key.verifying_key()));
    }

    #[test]
    fn corrupted_signature_fails_but_chain_is_intact() {
        let key = SigningKey::generate();
        let event = EventBuilder::allocate(source(), 0, GENESIS)
            .commit("p", 1)
            .sign(&key, SignatureMode::Corrupted);

        assert!(!verify_event(&event, &key.verifying_key()));
        assert_eq!(
            EventVerifier::default().check(&event, &key.verifying_key()),
            Err(VerifyFailure::BadSignature)
        );
        assert!(ChainVerifier::verify_chain(std::slice::from_ref(&event)).is_ok());
    }
}
