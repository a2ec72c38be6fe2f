use std::collections::BTreeMap;
use std::fmt;

use lineage_types::SourceId;
use serde::Serialize;
use tracing::debug;

/// Reputation registers of one source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TrustState {
    /// Confidence, in `[0, WEIGHT_MAX]`.
    pub weight: u32,
    /// Caution threshold, in `[THETA_MIN, THETA_MAX]`.
    pub theta: u32,
}

impl TrustState {
    pub const WEIGHT_MAX: u32 = 1000;
    pub const THETA_MIN: u32 = 50;
    pub const THETA_MAX: u32 = 500;

    const VALID_WEIGHT_GAIN: u32 = 30;
    const VALID_THETA_RELIEF: u32 = 8;
    const INVALID_WEIGHT_PENALTY: u32 = 100;
    const INVALID_THETA_RISE: u32 = 30;

    /// State of a source on first observation.
    pub const INITIAL: Self = Self {
        weight: 500,
        theta: 250,
    };

    /// Apply one verification outcome, saturating at the bounds.
    pub fn apply(self, valid: bool) -> Self {
        if valid {
            Self {
                weight: (self.weight + Self::VALID_WEIGHT_GAIN).min(Self::WEIGHT_MAX),
                theta: self
                    .theta
                    .saturating_sub(Self::VALID_THETA_RELIEF)
                    .max(Self::THETA_MIN),
            }
        } else {
            Self {
                weight: self.weight.saturating_sub(Self::INVALID_WEIGHT_PENALTY),
                theta: (self.theta + Self::INVALID_THETA_RISE).min(Self::THETA_MAX),
            }
        }
    }

    /// Weight on a 0.00–1.00 scale.
    pub fn weight_ratio(&self) -> f64 {
        f64::from(self.weight) / 1000.0
    }

    /// Theta on a 0.50–5.00 scale.
    pub fn theta_ratio(&self) -> f64 {
        f64::from(self.theta) / 100.0
    }
}

impl Default for TrustState {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for TrustState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w={:.2}, θ={:.2}", self.weight_ratio(), self.theta_ratio())
    }
}

/// Per-source trust state machine.
///
/// State lives only in this instance: it is never persisted, and a new
/// controller starts every source from [`TrustState::INITIAL`].
#[derive(Clone, Debug, Default)]
pub struct TrustController {
    states: BTreeMap<SourceId, TrustState>,
}

impl TrustController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verification outcome for `source` and return its new state.
    pub fn update(&mut self, source: &SourceId, valid: bool) -> TrustState {
        let state = self.states.entry(source.clone()).or_default();
        *state = state.apply(valid);
        debug!(%source, valid, weight = state.weight, theta = state.theta, "trust updated");
        *state
    }

    /// Current state of `source`, if it has been observed.
    pub fn state(&self, source: &SourceId) -> Option<TrustState> {
        self.states.get(source).copied()
    }

    /// Every observed source and its state, ordered by source.
    pub fn summary(&self) -> &BTreeMap<SourceId, TrustState> {
        &self.states
    }
}
