//! Lexical track matching between a remote playlist entry and local library
//! candidates.
//!
//! [`normalize`] canonicalizes names, [`scorer`] turns three name pairs and a
//! duration pair into a 0-100 score, and [`matcher`] picks or ranks
//! candidates. Nothing here does I/O.

pub mod matcher;
pub mod normalize;
pub mod scorer;
pub mod similarity;

pub use matcher::{DEFAULT_THRESHOLD, match_one, rank};
pub use normalize::normalize;

/// Read-only view of a local library track that can be matched.
pub trait Candidate {
    fn title(&self) -> &str;
    fn primary_artist(&self) -> &str;
    fn album(&self) -> &str;
    fn duration_ms(&self) -> Option<u64>;
}
