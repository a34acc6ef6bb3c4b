//! Recommendation Engine
//!
//! Per-deal product suggestions from a static affinity table and a few value
//! and aging thresholds. Output is deterministic for a given deal and date.

mod engine;
mod types;

pub use engine::{affinities, RecommendationEngine};
pub use types::*;
