use lineage_types::{Digest, SourceId};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a payload commitment and an event hash over identical
/// bytes never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for payload commitments (content only).
    pub const PAYLOAD: Self = Self {
        domain: "lineage-payload-v1",
    };
    /// Hasher for event hashes (content plus chain position).
    pub const EVENT: Self = Self {
        domain: "lineage-event-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = self.start();
        hasher.update(data);
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    /// Commitment to a payload alone, independent of chain position.
    pub fn payload_commitment(payload: &str) -> Digest {
        Self::PAYLOAD.hash(payload.as_bytes())
    }

    /// History-dependent event hash.
    ///
    /// Input order is fixed: `source_id ∥ index ∥ prev_hash ∥ payload ∥
    /// timestamp`, integers as big-endian `u64`.
    pub fn event_hash(
        source_id: &SourceId,
        index: u64,
        prev_hash: &Digest,
        payload: &str,
        timestamp: u64,
    ) -> Digest {
        let mut hasher = Self::EVENT.start();
        hasher.update(source_id.as_str().as_bytes());
        hasher.update(&index.to_be_bytes());
        hasher.update(prev_hash.as_bytes());
        hasher.update(payload.as_bytes());
        hasher.update(&timestamp.to_be_bytes());
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_types::GENESIS;

    fn source(id: &str) -> SourceId {
        SourceId::new(id).unwrap()
    }

    #[test]
    fn hash_is_deterministic() {
        let a = ContentHasher::PAYLOAD.hash(b"hello world");
        let b = ContentHasher::PAYLOAD.hash(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        assert_ne!(ContentHasher::PAYLOAD.hash(data), ContentHasher::EVENT.hash(data));
    }

    #[test]
    fn verify_detects_tampering() {
        let d = ContentHasher::PAYLOAD.hash(b"original");
        assert!(ContentHasher::PAYLOAD.verify(b"original", &d));
        assert!(!ContentHasher::PAYLOAD.verify(b"tampered", &d));
    }

    #[test]
    fn payload_commitment_is_position_independent() {
        let c = ContentHasher::payload_commitment("data");
        assert_eq!(c, ContentHasher::PAYLOAD.hash(b"data"));
        assert!(!c.is_genesis());
    }

    #[test]
    fn event_hash_depends_on_history() {
        let s = source("A");
        let h1 = ContentHasher::event_hash(&s, 0, &GENESIS, "data", 10);
        let h2 = ContentHasher::event_hash(&s, 0, &h1, "data", 10);
        assert_ne!(h1, h2);
    }

    #[test]
    fn event_hash_covers_every_field() {
        let s = source("A");
        let base = ContentHasher::event_hash(&s, 1, &GENESIS, "p", 10);
        assert_ne!(base, ContentHasher::event_hash(&source("B"), 1, &GENESIS, "p", 10));
        assert_ne!(base, ContentHasher::event_hash(&s, 2, &GENESIS, "p", 10));
        assert_ne!(base, ContentHasher::event_hash(&s, 1, &GENESIS, "q", 10));
        assert_ne!(base, ContentHasher::event_hash(&s, 1, &GENESIS, "p", 11));
    }
}
