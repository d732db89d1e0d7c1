//! URL handling module
//!
//! This module owns the canonical-URL contract: every link discovered during
//! a crawl is reduced to a canonical absolute URL string before it is used
//! for dedup, traversal, or graph edges.

mod canonical;

pub use canonical::{canonicalize, Canonicalizer};
