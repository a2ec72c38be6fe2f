//! Adaptive trust controller.
//!
//! Tracks, per source, a bounded confidence `weight` and a bounded caution
//! threshold `theta`, updated from verification outcomes only. A forged
//! event costs far more weight than one valid event restores, and caution
//! rises faster than it falls.

pub mod controller;

pub use controller::{TrustController, TrustState};
