//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::PageStatus;
use crate::storage::{CrawlRecord, FrontierStore, StorageResult};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub crawl: CrawlRecord,

    /// Total number of frontier pages
    pub total_pages: u64,

    /// Count of pages by visit status
    pub pages_by_status: HashMap<PageStatus, u64>,

    /// Number of persisted layers
    pub layers: u64,

    /// Size of the seen set
    pub seen: u64,

    /// Number of stored post records
    pub records: u64,

    /// Pages per depth
    pub depth_breakdown: HashMap<u32, usize>,

    /// Records per channel, most productive first
    pub channel_breakdown: Vec<(String, u64)>,
}

impl CrawlStatistics {
    /// Count for one status, zero if absent
    pub fn count(&self, status: PageStatus) -> u64 {
        self.pages_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Loads statistics for one crawl from storage
///
/// # Arguments
///
/// * `store` - The store to query
/// * `crawl_id` - The crawl to summarize
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - The crawl is unknown or a query failed
pub fn load_statistics(store: &dyn FrontierStore, crawl_id: &str) -> StorageResult<CrawlStatistics> {
    let crawl = store.get_crawl(crawl_id)?;

    let mut pages_by_status = HashMap::new();
    for status in PageStatus::all_statuses() {
        let count = store.count_pages_by_status(crawl_id, status)?;
        if count > 0 {
            pages_by_status.insert(status, count);
        }
    }

    Ok(CrawlStatistics {
        crawl,
        total_pages: pages_by_status.values().sum(),
        pages_by_status,
        layers: store.count_layers(crawl_id)?,
        seen: store.count_seen(crawl_id)?,
        records: store.count_records(crawl_id)?,
        depth_breakdown: store.get_depth_breakdown(crawl_id)?,
        channel_breakdown: store.get_channel_breakdown(crawl_id)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Crawl:");
    println!("  Id: {}", stats.crawl.crawl_id);
    println!("  Status: {}", stats.crawl.status.to_db_string());
    println!("  Started: {}", stats.crawl.started_at);
    if let Some(finished) = &stats.crawl.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Config hash: {}", stats.crawl.config_hash);
    println!();

    println!("Overview:");
    println!("  Frontier pages: {}", stats.total_pages);
    println!("  Layers: {}", stats.layers);
    println!("  Seen identifiers: {}", stats.seen);
    println!("  Post records: {}", stats.records);
    println!();

    println!("Pages by Status:");
    for status in PageStatus::all_statuses() {
        let count = stats.count(status);
        let percentage = if stats.total_pages > 0 {
            (count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status.to_db_string(), count, percentage);
    }
    println!();

    if !stats.depth_breakdown.is_empty() {
        println!("Pages by Depth:");
        let mut depths: Vec<_> = stats.depth_breakdown.iter().collect();
        depths.sort_by_key(|(depth, _)| **depth);
        for (depth, count) in depths {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    if !stats.channel_breakdown.is_empty() {
        println!("Records by Channel:");
        for (channel, count) in stats.channel_breakdown.iter().take(20) {
            println!("  {}: {}", channel, count);
        }
        println!();
    }

    let fetched = stats.count(PageStatus::Fetched);
    let success_rate = if stats.total_pages > 0 {
        (fetched as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        success_rate, fetched, stats.total_pages
    );
}
