//! Digest and signature service for event lineage.
//!
//! Provides domain-separated BLAKE3 hashing, Ed25519 signing/verification,
//! signature verification of individual events, and structural verification
//! of per-source hash chains.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod chain;
pub mod hasher;
pub mod signer;
pub mod verifier;

pub use chain::{ChainError, ChainVerifier};
pub use hasher::ContentHasher;
pub use signer::{
    verify_signature, Signature, SignatureError, SigningKey, VerifyingKey, SIGNATURE_LEN,
};
pub use verifier::{verify_event, EventVerifier, VerifyFailure, VerifyMode};
