//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageStatus`: visit status of a single frontier page (unvisited, fetched, error)
//! - `Page` / `Layer`: one crawl target, and all targets found at one depth
//! - `Frontier`: the ordered layers plus the set of every identifier ever seen

mod frontier;
mod page_state;

// Re-export main types
pub use frontier::{Frontier, Layer, Page};
pub use page_state::PageStatus;
