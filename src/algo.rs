//! Rank "people you may know" for a viewer.
//!
//! # Scoring
//!
//! In descending order of weight:
//!
//! 1. Shared employer (flat +5)
//! 1. Mutual friends (+3 each)
//! 1. Shared skills (+2 each)
//! 1. Shared location (flat +2)
//!
//! Weights are fixed constants rather than configuration so that a given
//! graph snapshot always produces the same ordering. See [`score`] for
//! the exact rules and [`SuggestionRanker`] for candidate selection,
//! exclusion, and caching.

pub mod rank;
pub mod score;

pub use rank::*;
pub use score::*;
