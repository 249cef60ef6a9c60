//! Configuration module for Channel-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and collecting the seed identifiers a crawl starts from.
//!
//! # Example
//!
//! ```no_run
//! use channel_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Posts before {} are skipped", config.crawler.cutoff_year);
//! ```

mod parser;
pub mod seeds;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, PlatformConfig, StorageConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, hash_content, load_config, load_config_with_hash};
pub use seeds::{collect_seeds, read_seed_file};
pub use validation::validate;
