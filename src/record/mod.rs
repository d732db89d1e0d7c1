//! Page records and the append-only record store
//!
//! One record exists per distinct URL visited during a run. A record is
//! created when the crawl engine dequeues its URL, mutated exactly once
//! during that URL's single fetch attempt, and immutable afterward except
//! for the incoming-link count, which is set in one post-traversal pass.

mod page;
mod store;

pub use page::{ContentLink, FetchError, PageRecord, ResourceType};
pub use store::PageStore;
