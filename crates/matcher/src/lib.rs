//! # Carbonlens Matcher
//!
//! Fuzzy matching of free-text BIM material names against the verified
//! product catalog.
//!
//! ## Design
//!
//! - [`match_material`] is a pure function over a supplied candidate
//!   slice: no hidden cache, deterministic, trivially testable.
//! - [`BatchMatcher`] owns the caching/prefetch decision: it loads the
//!   catalog once per batch and fans matching out in fixed-size chunks.
//! - "No good match" is a normal `None` result, never an error; a failed
//!   catalog pre-load degrades to an empty candidate set.
//!
//! ## Scoring
//!
//! Weighted multi-field similarity (name 0.5, category 0.3, description
//! 0.2). Matched fields multiply their distance raised to the field
//! weight; the best candidate within the distance threshold (default
//! 0.4) wins and confidence is 1 − distance. Classification order:
//! exact, then strong similarity, then category corroboration.

mod batch;
mod fuzzy;
mod similarity;
mod types;

pub use batch::{BatchMatcher, DEFAULT_CHUNK_SIZE};
pub use fuzzy::{match_material, MatchOptions, DEFAULT_DISTANCE_THRESHOLD};
pub use similarity::{field_similarity, MIN_MATCH_LEN};
pub use types::{MaterialMatch, MaterialQuery};

// Re-export the wire-level match classification for convenience.
pub use carbonlens_protocol::MatchKind;
