//! Crawler module for layered channel crawling
//!
//! This module contains the core crawling logic, including:
//! - Crawl id generation
//! - The page visitor seam and the channel visitor behind it
//! - Layer-by-layer coordination with per-page checkpoints

mod coordinator;
mod crawl_id;
mod visitor;

pub use coordinator::{connect_platform, resolve_crawl_id, run_crawl, CrawlReport, Crawler};
pub use crawl_id::generate_crawl_id;
pub use visitor::{ChannelVisitor, PageVisitor};
