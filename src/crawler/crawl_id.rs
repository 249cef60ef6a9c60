//! Crawl id generation

use chrono::Utc;

/// Generates a crawl id from the current UTC time, formatted `YYYYMMDDHHMMSS`
pub fn generate_crawl_id() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}
