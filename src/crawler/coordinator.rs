//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the layered crawl loop, including:
//! - Loading or seeding the frontier for a crawl
//! - Walking layers in depth order and pages in insertion order
//! - Isolating each page visit from every other one
//! - Checkpointing the frontier after every page
//! - Stopping cleanly between pages on cancellation

use crate::blob::FilesystemBlobSink;
use crate::config::Config;
use crate::crawler::{generate_crawl_id, ChannelVisitor, PageVisitor};
use crate::extractor::{panic_message, ContentExtractor, ExtractorConfig};
use crate::platform::{with_timeout, PlatformClient, PlatformError};
use crate::state::{Frontier, PageStatus};
use crate::storage::{lock_store, open_store, CrawlStatus, FrontierStore, SharedStore};
use crate::HarvestError;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Outcome of one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub crawl_id: String,

    /// Pages visited in this run
    pub pages_visited: usize,
    pub fetched: usize,
    pub errored: usize,

    /// Identifiers newly added to the frontier in this run
    pub discovered: usize,

    /// Layers in the frontier when the run stopped
    pub layers: usize,

    /// Whether the run stopped on cancellation
    pub cancelled: bool,
}

/// Drives a layered crawl over a frontier store
pub struct Crawler<V: PageVisitor> {
    crawl_id: String,
    store: SharedStore,
    visitor: V,
}

impl<V: PageVisitor> Crawler<V> {
    /// Creates a crawler for a crawl already registered in the store
    pub fn new(crawl_id: impl Into<String>, store: SharedStore, visitor: V) -> Self {
        Self {
            crawl_id: crawl_id.into(),
            store,
            visitor,
        }
    }

    pub fn crawl_id(&self) -> &str {
        &self.crawl_id
    }

    /// Runs the crawl until the frontier is exhausted or cancelled
    ///
    /// On a fresh crawl the seeds become layer 0; on a resumed crawl the
    /// persisted frontier is loaded and the seeds are ignored. Pages left in
    /// `error` by an earlier run are visited again.
    ///
    /// # Arguments
    ///
    /// * `seeds` - Identifiers for layer 0 of a fresh crawl
    /// * `cancel` - Checked between pages
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run ended, completed or cancelled
    /// * `Err(HarvestError)` - The frontier could not be loaded
    pub async fn run(
        &mut self,
        seeds: &[String],
        cancel: &CancellationToken,
    ) -> Result<CrawlReport, HarvestError> {
        let mut frontier = lock_store(&self.store)?.load_or_seed(&self.crawl_id, seeds)?;
        let mut report = CrawlReport {
            crawl_id: self.crawl_id.clone(),
            ..CrawlReport::default()
        };
        let start_time = Instant::now();

        tracing::info!(
            crawl_id = %self.crawl_id,
            layers = frontier.layers().len(),
            pending = frontier.pending_count(),
            "Starting crawl"
        );

        let mut layer_index = 0;
        'layers: while layer_index < frontier.layers().len() {
            let depth = frontier.layers()[layer_index].depth;
            let mut page_index = 0;

            while page_index < frontier.layers()[layer_index].pages.len() {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    break 'layers;
                }

                let needs_visit = frontier
                    .page(layer_index, page_index)
                    .is_some_and(|page| page.status.needs_visit());
                if needs_visit {
                    self.visit_page(&mut frontier, layer_index, page_index, depth, &mut report)
                        .await;
                }
                page_index += 1;
            }

            if let Some(published) = frontier.publish_staged() {
                tracing::info!(
                    crawl_id = %self.crawl_id,
                    depth = published,
                    total_pages = frontier.page_count(),
                    "Published layer"
                );
            }
            layer_index += 1;
        }

        report.layers = frontier.checkpoint_layers().len();

        let status = if report.cancelled {
            tracing::warn!(crawl_id = %self.crawl_id, "Crawl cancelled, progress is checkpointed");
            CrawlStatus::Interrupted
        } else {
            CrawlStatus::Completed
        };
        if let Err(e) =
            lock_store(&self.store).and_then(|mut store| store.finish_crawl(&self.crawl_id, status))
        {
            tracing::error!(crawl_id = %self.crawl_id, error = %e, "Failed to record crawl status");
        }

        tracing::info!(
            crawl_id = %self.crawl_id,
            visited = report.pages_visited,
            fetched = report.fetched,
            errored = report.errored,
            discovered = report.discovered,
            layers = report.layers,
            "Crawl finished in {:?}",
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Visits one page, folds its outlinks and checkpoints the frontier
    async fn visit_page(
        &self,
        frontier: &mut Frontier,
        layer_index: usize,
        page_index: usize,
        depth: u32,
        report: &mut CrawlReport,
    ) {
        let Some(page) = frontier.page_mut(layer_index, page_index) else {
            return;
        };
        page.timestamp = Some(Utc::now());
        let page = page.clone();

        tracing::debug!(crawl_id = %self.crawl_id, url = %page.url, depth, "Visiting page");

        let outcome = match AssertUnwindSafe(self.visitor.visit(&page))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => Err(HarvestError::VisitPanicked {
                url: page.url.clone(),
                message: panic_message(&panic),
            }),
        };

        let status = match outcome {
            Ok(outlinks) => {
                let added = frontier.stage_outlinks(depth, outlinks);
                report.fetched += 1;
                report.discovered += added;
                tracing::debug!(url = %page.url, added, "Page fetched");
                PageStatus::Fetched
            }
            Err(e) => {
                report.errored += 1;
                tracing::error!(crawl_id = %self.crawl_id, url = %page.url, depth, error = %e, "Page visit failed");
                PageStatus::Error
            }
        };
        report.pages_visited += 1;

        if let Some(page) = frontier.page_mut(layer_index, page_index) {
            page.status = status;
        }

        self.checkpoint(frontier);
    }

    /// Persists the frontier; failures are logged and progress kept in memory
    fn checkpoint(&self, frontier: &Frontier) {
        let saved = lock_store(&self.store)
            .and_then(|mut store| store.save_layers(&self.crawl_id, frontier));
        if let Err(e) = saved {
            tracing::error!(crawl_id = %self.crawl_id, error = %e, "Checkpoint failed");
        }
    }
}

/// Connects the platform client within the bootstrap timeout
pub async fn connect_platform(
    client: &dyn PlatformClient,
    timeout: Duration,
) -> Result<(), HarvestError> {
    match with_timeout("connect", timeout, client.connect()).await {
        Ok(()) => {
            tracing::info!(platform = client.platform_name(), "Platform connected");
            Ok(())
        }
        Err(PlatformError::Timeout { .. }) => Err(HarvestError::BootstrapTimeout(timeout.as_secs())),
        Err(e) => Err(e.into()),
    }
}

/// Picks the crawl id for a run
///
/// Without `fresh`, the latest crawl that has not completed is resumed.
/// Otherwise, or when there is nothing to resume, a new id is generated.
pub fn resolve_crawl_id(store: &dyn FrontierStore, fresh: bool) -> Result<String, HarvestError> {
    if !fresh {
        if let Some(crawl) = store.latest_unfinished_crawl()? {
            tracing::info!(
                crawl_id = %crawl.crawl_id,
                status = crawl.status.to_db_string(),
                "Resuming crawl"
            );
            return Ok(crawl.crawl_id);
        }
    }

    let crawl_id = generate_crawl_id();
    tracing::info!(crawl_id = %crawl_id, "Starting new crawl");
    Ok(crawl_id)
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Open the store and pick the crawl id (resume or fresh)
/// 2. Connect the platform client within the bootstrap timeout
/// 3. Build the extractor and blob sink
/// 4. Run the layered crawl
/// 5. Disconnect the platform client
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `config_hash` - Hash of the configuration, stored with the crawl
/// * `seeds` - Identifiers for layer 0 of a fresh crawl
/// * `fresh` - Start a new crawl instead of resuming
/// * `client` - The platform client
/// * `cancel` - Cancellation signal, checked between pages
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    seeds: &[String],
    fresh: bool,
    client: Arc<dyn PlatformClient>,
    cancel: CancellationToken,
) -> Result<CrawlReport, HarvestError> {
    let store = open_store(Path::new(&config.storage.database_path))?;

    let crawl_id = {
        let mut guard = lock_store(&store)?;
        let crawl_id = resolve_crawl_id(&*guard, fresh)?;
        guard.begin_crawl(&crawl_id, config_hash)?;
        crawl_id
    };

    connect_platform(
        client.as_ref(),
        Duration::from_secs(config.crawler.bootstrap_timeout_secs),
    )
    .await?;

    let sink = Arc::new(FilesystemBlobSink::new(&config.storage.blob_root));
    let extractor = ContentExtractor::new(
        Arc::clone(&client),
        sink,
        store.clone(),
        ExtractorConfig::from(&config.crawler),
    );
    let visitor = ChannelVisitor::new(crawl_id.clone(), extractor);

    let mut crawler = Crawler::new(crawl_id, store, visitor);
    let result = crawler.run(seeds, &cancel).await;

    if let Err(e) = client.disconnect().await {
        tracing::warn!(error = %e, "Platform disconnect failed");
    }

    result
}
