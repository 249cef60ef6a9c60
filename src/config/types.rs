use serde::Deserialize;

/// Main configuration structure for Channel-Harvest
///
/// Every section has defaults so a crawl can run without a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
}

/// Crawl and extraction behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Messages published before this year are skipped
    #[serde(rename = "cutoff-year", default = "default_cutoff_year")]
    pub cutoff_year: i32,

    /// Upper bound on platform client bootstrap (seconds)
    #[serde(
        rename = "bootstrap-timeout-secs",
        default = "default_bootstrap_timeout_secs"
    )]
    pub bootstrap_timeout_secs: u64,

    /// Upper bound on every individual platform client call (seconds)
    #[serde(rename = "call-timeout-secs", default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            cutoff_year: default_cutoff_year(),
            bootstrap_timeout_secs: default_bootstrap_timeout_secs(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// Where crawl state and media end up
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database holding frontiers and posts
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Root directory of the filesystem blob sink
    #[serde(rename = "blob-root", default = "default_blob_root")]
    pub blob_root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            blob_root: default_blob_root(),
        }
    }
}

/// Platform client settings
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Name reported on every post
    #[serde(rename = "name", default = "default_platform_name")]
    pub name: String,

    /// Directory of channel exports read by the export client
    #[serde(rename = "export-root", default = "default_export_root")]
    pub export_root: String,

    /// Scratch directory that downloaded media is copied into
    #[serde(rename = "download-dir", default = "default_download_dir")]
    pub download_dir: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: default_platform_name(),
            export_root: default_export_root(),
            download_dir: default_download_dir(),
        }
    }
}

fn default_cutoff_year() -> i32 {
    2018
}

fn default_bootstrap_timeout_secs() -> u64 {
    30
}

fn default_call_timeout_secs() -> u64 {
    60
}

fn default_database_path() -> String {
    "./harvest.db".to_string()
}

fn default_blob_root() -> String {
    "./blobs".to_string()
}

fn default_platform_name() -> String {
    "Telegram".to_string()
}

fn default_export_root() -> String {
    "./exports".to_string()
}

fn default_download_dir() -> String {
    "./downloads".to_string()
}
