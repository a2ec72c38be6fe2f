use lineage_types::Event;
use tracing::debug;

use crate::hasher::ContentHasher;
use crate::signer::{verify_signature, VerifyingKey, SIGNATURE_LEN};

/// How much of an event the verifier re-derives before checking its signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerifyMode {
    /// Recompute `payload_commitment` and `event_hash` from the raw fields,
    /// then check the signature.
    #[default]
    Strict,
    /// Trust the self-reported digests and only check that the signature
    /// covers them.
    SignatureOnly,
}

/// Why an event failed verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum VerifyFailure {
    #[error("payload commitment does not match payload")]
    PayloadCommitmentMismatch,

    #[error("event hash does not match event fields")]
    EventHashMismatch,

    #[error("malformed signature: {0} bytes")]
    MalformedSignature(usize),

    #[error("signature does not cover the canonical message")]
    BadSignature,
}

/// Checks an event against its producer's public key.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventVerifier {
    mode: VerifyMode,
}

impl EventVerifier {
    pub fn new(mode: VerifyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    /// Verify `event`, reporting the first failed check.
    pub fn check(&self, event: &Event, key: &VerifyingKey) -> Result<(), VerifyFailure> {
        if self.mode == VerifyMode::Strict {
            if !ContentHasher::PAYLOAD.verify(event.payload.as_bytes(), &event.payload_commitment) {
                return Err(VerifyFailure::PayloadCommitmentMismatch);
            }
            let recomputed = ContentHasher::event_hash(
                &event.source_id,
                event.index,
                &event.prev_hash,
                &event.payload,
                event.timestamp,
            );
            if recomputed != event.event_hash {
                return Err(VerifyFailure::EventHashMismatch);
            }
        }

        if event.signature.len() != SIGNATURE_LEN {
            return Err(VerifyFailure::MalformedSignature(event.signature.len()));
        }
        if !verify_signature(key, &event.canonical_message(), &event.signature) {
            return Err(VerifyFailure::BadSignature);
        }
        Ok(())
    }

    /// Boolean outcome of [`EventVerifier::check`].
    pub fn verify(&self, event: &Event, key: &VerifyingKey) -> bool {
        match self.check(event, key) {
            Ok(()) => true,
            Err(reason) => {
                debug!(index = event.index, source = %event.source_id, %reason, "event rejected");
                false
            }
        }
    }
}

/// Verify an event with the default (strict) verifier.
pub fn verify_event(event: &Event, key: &VerifyingKey) -> bool {
    EventVerifier::default().verify(event, key)
}
