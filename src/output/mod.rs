//! Output module for crawl reports
//!
//! This module handles:
//! - Loading per-crawl statistics from the store
//! - Printing them for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
