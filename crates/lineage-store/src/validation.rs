use lineage_crypto::ChainVerifier;
use lineage_types::SourceId;

use crate::error::Result;
use crate::traits::LineageStore;

/// Result of store-wide validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub event_count: u64,
    pub sources: Vec<SourceId>,
    pub indices_gap_free: bool,
    pub chains_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub index: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    IndexGap,
    ChainBreak,
}

/// Structural integrity validator. Needs no key material.
pub struct StoreValidator;

impl StoreValidator {
    /// Check that global indices run 0, 1, 2, ... in append order and that
    /// every source's chain verifies.
    pub fn validate<S: LineageStore + ?Sized>(store: &S) -> Result<ValidationReport> {
        let events = store.read_all()?;
        let sources = store.sources()?;
        let mut violations = Vec::new();
        let mut indices_gap_free = true;
        let mut chains_valid = true;

        for (position, event) in events.iter().enumerate() {
            let expected = position as u64;
            if event.index != expected {
                indices_gap_free = false;
                violations.push(Violation {
                    index: event.index,
                    kind: ViolationKind::IndexGap,
                    description: format!("expected index {expected}, got {}", event.index),
                });
            }
        }

        for source in &sources {
            let chain = store.read_chain(source)?;
            if let Err(e) = ChainVerifier::verify_chain(&chain) {
                chains_valid = false;
                violations.push(Violation {
                    index: chain_error_index(&e),
                    kind: ViolationKind::ChainBreak,
                    description: format!("{source}: {e}"),
                });
            }
        }

        Ok(ValidationReport {
            event_count: events.len() as u64,
            sources,
            indices_gap_free,
            chains_valid,
            violations,
        })
    }
}

fn chain_error_index(error: &lineage_crypto::ChainError) -> u64 {
    use lineage_crypto::ChainError::*;
    match *error {
        MissingGenesis { index }
        | ForeignSource { index }
        | BrokenLink { index }
        | HashMismatch { index }
        | CommitmentMismatch { index }
        | IndexNotAscending { index, .. }
        | TimestampNotIncreasing { index } => index,
    }
}
