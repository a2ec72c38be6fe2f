use std::fmt;

/// Length of a raw Ed25519 signature as stored on an event.
pub const SIGNATURE_LEN: usize = 64;

/// A producer's private Ed25519 key.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// A producer's public Ed25519 key, handed to verifiers.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Detached Ed25519 signature over a canonical event message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl SigningKey {
    /// Fresh key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::thread_rng()))
    }

    pub fn from_bytes(secret: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&secret))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.0.sign(message))
    }
}

impl VerifyingKey {
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(message, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }
}

impl Signature {
    /// Parse the raw bytes carried by an event.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let raw: [u8; SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(bytes.len()))?;
        Ok(Self(ed25519_dalek::Signature::from_bytes(&raw)))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }
}

/// Check `signature` over `message` against `key`.
///
/// Never fails: malformed or mismatching signatures yield `false`.
pub fn verify_signature(key: &VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
    Signature::from_slice(signature).is_ok_and(|sig| key.verify(message, &sig).is_ok())
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.0.as_bytes()))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature does not match message")]
    InvalidSignature,
    #[error("signature must be {SIGNATURE_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_types::{canonical_message, Digest, SourceId, GENESIS};

    fn message(index: u64, timestamp: u64) -> Vec<u8> {
        let source = SourceId::new("honest_core").unwrap();
        canonical_message(
            &source,
            index,
            &GENESIS,
            &Digest::from_hash([7; 32]),
            &Digest::from_hash([9; 32]),
            timestamp,
        )
    }

    #[test]
    fn canonical_message_signature_verifies() {
        let sk = SigningKey::generate();
        let msg = message(0, 1_700_000_000);
        let sig = sk.sign(&msg);
        assert!(sk.verifying_key().verify(&msg, &sig).is_ok());
        assert!(verify_signature(&sk.verifying_key(), &msg, &sig.to_vec()));
    }

    #[test]
    fn signature_is_bound_to_index_and_timestamp() {
        let sk = SigningKey::generate();
        let vk = sk.verifying_key();
        let sig = sk.sign(&message(3, 10)).to_vec();
        assert!(!verify_signature(&vk, &message(4, 10), &sig));
        assert!(!verify_signature(&vk, &message(3, 11), &sig));
    }

    #[test]
    fn reversed_message_signature_is_rejected() {
        let sk = SigningKey::generate();
        let msg = message(1, 5);
        let mut reversed = msg.clone();
        reversed.reverse();
        let forged = sk.sign(&reversed).to_vec();
        assert!(!verify_signature(&sk.verifying_key(), &msg, &forged));
    }

    #[test]
    fn other_producers_key_is_rejected() {
        let msg = message(0, 1);
        let sig = SigningKey::generate().sign(&msg);
        assert_eq!(
            SigningKey::generate().verifying_key().verify(&msg, &sig),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn malformed_signature_bytes_are_false_not_errors() {
        let sk = SigningKey::generate();
        let msg = message(0, 1);
        let sig = sk.sign(&msg).to_vec();
        assert!(!verify_signature(&sk.verifying_key(), &msg, &sig[..10]));
        assert!(!verify_signature(&sk.verifying_key(), &msg, &[]));
        assert_eq!(
            Signature::from_slice(&sig[..12]),
            Err(SignatureError::InvalidLength(12))
        );
    }

    #[test]
    fn restored_secret_signs_identically() {
        let sk = SigningKey::generate();
        let restored = SigningKey::from_bytes(*sk.as_bytes());
        let msg = message(2, 2);
        assert_eq!(sk.sign(&msg), restored.sign(&msg));
        assert_eq!(sk.verifying_key(), restored.verifying_key());
    }

    #[test]
    fn debug_redacts_secret() {
        let sk = SigningKey::generate();
        assert_eq!(format!("{sk:?}"), "SigningKey(<redacted>)");
    }
}
