//! Integration tests for the crawler
//!
//! These tests write channel exports to a temporary directory and run the
//! full crawl cycle end-to-end: export client, SQLite file store and
//! filesystem blob sink.

use channel_harvest::blob::FilesystemBlobSink;
use channel_harvest::config::{Config, CrawlerConfig, PlatformConfig, StorageConfig};
use channel_harvest::crawler::run_crawl;
use channel_harvest::output::load_statistics;
use channel_harvest::platform::{write_export, ExportClient, PlatformClient};
use channel_harvest::state::PageStatus;
use channel_harvest::storage::{CrawlStatus, FrontierStore, SqliteStore};
use channel_harvest::ContentKind;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Temporary directories backing one test crawl
struct Workspace {
    _dir: TempDir,
    config: Config,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("exports")).unwrap();

        let config = Config {
            crawler: CrawlerConfig {
                call_timeout_secs: 5,
                bootstrap_timeout_secs: 5,
                ..CrawlerConfig::default()
            },
            storage: StorageConfig {
                database_path: path_string(&root.join("harvest.db")),
                blob_root: path_string(&root.join("blobs")),
            },
            platform: PlatformConfig {
                name: "Telegram".to_string(),
                export_root: path_string(&root.join("exports")),
                download_dir: path_string(&root.join("downloads")),
            },
        };

        Self { _dir: dir, config }
    }

    fn export_root(&self) -> &Path {
        Path::new(&self.config.platform.export_root)
    }

    fn client(&self) -> Arc<dyn PlatformClient> {
        Arc::new(ExportClient::new(
            self.config.platform.name.clone(),
            self.config.platform.export_root.clone(),
            self.config.platform.download_dir.clone(),
        ))
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::new(Path::new(&self.config.storage.database_path))
            .expect("Failed to open store")
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// alpha links to beta and forwards from gamma; beta links back to alpha;
/// gamma has no export and fails to load.
fn write_fixtures(root: &Path) {
    std::fs::write(root.join("alpha-photo.jpg"), b"jpeg-bytes").unwrap();

    write_export(
        root,
        "alpha",
        &json!({
            "context": {"chat_id": 10, "title": "Alpha News"},
            "stats": {"member_count": 1200, "post_count": 4, "view_count": 90000},
            "linked_channels": ["beta"],
            "messages": [
                {
                    "id": 1, "chat_id": 10, "date": 1704067200,
                    "permalink": "https://t.me/alpha/1",
                    "content": {"kind": "text", "text": "hello world"},
                    "interaction": {"view_count": 300, "forward_count": 2, "reply_count": 0}
                },
                {
                    "id": 2, "chat_id": 10, "date": 1704070800, "edit_date": 1704074400,
                    "permalink": "https://t.me/alpha/2",
                    "content": {
                        "kind": "photo",
                        "caption": "sunset",
                        "sizes": [{"remote_id": "photo-small", "width": 90, "height": 60}]
                    },
                    "interaction": {
                        "view_count": 800, "forward_count": 7, "reply_count": 1,
                        "reactions": [
                            {"reaction": {"type": "emoji", "emoji": "👍"}, "total_count": 5},
                            {"reaction": {"type": "paid"}, "total_count": 9}
                        ]
                    }
                },
                {
                    "id": 3, "chat_id": 10, "date": 1420070400,
                    "permalink": "https://t.me/alpha/3",
                    "content": {"kind": "text", "text": "too old"}
                },
                {
                    "id": 4, "chat_id": 10, "date": 1704078000,
                    "permalink": "https://t.me/alpha/4",
                    "content": {"kind": "text", "text": "forwarded"},
                    "forwarded_from": "gamma"
                }
            ],
            "comments": {
                "2": [{"author": "dana", "text": "beautiful", "posted_at": "2024-01-01T02:00:00Z"}]
            },
            "files": {"photo-small": "alpha-photo.jpg"}
        }),
    )
    .unwrap();

    write_export(
        root,
        "beta",
        &json!({
            "context": {"chat_id": 20, "title": "Beta"},
            "linked_channels": ["alpha"],
            "messages": [{
                "id": 9, "chat_id": 20, "date": 1704067200,
                "permalink": "https://t.me/beta/9",
                "content": {"kind": "poll", "question": "Tea or coffee?"}
            }]
        }),
    )
    .unwrap();
}

#[tokio::test]
async fn test_full_crawl_over_exports() {
    let ws = Workspace::new();
    write_fixtures(ws.export_root());

    let report = run_crawl(
        &ws.config,
        "hash-1",
        &["alpha".to_string()],
        true,
        ws.client(),
        CancellationToken::new(),
    )
    .await
    .expect("Crawl failed");

    assert!(!report.cancelled);
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.errored, 1);
    assert_eq!(report.layers, 2);

    let store = ws.store();
    let crawl = store.get_crawl(&report.crawl_id).unwrap();
    assert_eq!(crawl.status, CrawlStatus::Completed);
    assert_eq!(crawl.config_hash, "hash-1");

    // Frontier: alpha at depth 0, beta and gamma at depth 1, no re-entry of alpha
    let frontier = {
        let mut store = ws.store();
        store.load_or_seed(&report.crawl_id, &[]).unwrap()
    };
    let layers = frontier.layers();
    assert_eq!(layers.len(), 2);
    let depth1: Vec<(&str, PageStatus)> = layers[1]
        .pages
        .iter()
        .map(|p| (p.url.as_str(), p.status))
        .collect();
    assert_eq!(
        depth1,
        vec![("beta", PageStatus::Fetched), ("gamma", PageStatus::Error)]
    );

    // Records: alpha 1, 2, 4 (3 is before the cutoff) and beta 9
    assert_eq!(store.count_records(&report.crawl_id).unwrap(), 4);
    assert!(store.get_record(&report.crawl_id, "3-alpha").unwrap().is_none());

    let photo = store
        .get_record(&report.crawl_id, "2-alpha")
        .unwrap()
        .expect("photo record");
    assert_eq!(photo.post_type, ContentKind::Photo);
    assert_eq!(photo.description, "sunset");
    assert_eq!(photo.channel_name, "Alpha News");
    assert_eq!(photo.platform_name, "Telegram");
    assert_eq!(photo.view_count, 800);
    assert_eq!(photo.share_count, 7);
    assert_eq!(photo.comment_count, 1);
    assert_eq!(photo.comments[0].author, "dana");
    assert_eq!(photo.reactions.get("👍"), Some(&5));
    assert_eq!(photo.reactions.len(), 1);
    assert!(photo.edited_at.is_some());
    assert_eq!(photo.channel_data.engagement.follower_count, 1200);
    assert_eq!(photo.channel_data.channel_url_external, "https://t.me/c/alpha");

    // The thumbnail moved into the blob sink; the export original is untouched
    let thumb = photo.thumb_url.expect("thumbnail reference");
    let sink = FilesystemBlobSink::new(&ws.config.storage.blob_root);
    assert_eq!(std::fs::read(sink.resolve(&thumb)).unwrap(), b"jpeg-bytes");
    assert!(thumb.starts_with(&format!("{}/alpha/", report.crawl_id)));
    assert!(ws.export_root().join("alpha-photo.jpg").exists());

    // Nothing is left behind in the download directory once the client disconnects
    let leftovers = std::fs::read_dir(&ws.config.platform.download_dir)
        .unwrap()
        .count();
    assert_eq!(leftovers, 0);

    let poll = store.get_record(&report.crawl_id, "9-beta").unwrap().unwrap();
    assert_eq!(poll.post_type, ContentKind::Poll);
    assert_eq!(poll.description, "Tea or coffee?");
    assert!(poll.edited_at.is_none());

    let stats = load_statistics(&store, &report.crawl_id).unwrap();
    assert_eq!(stats.total_pages, 3);
    assert_eq!(stats.count(PageStatus::Fetched), 2);
    assert_eq!(stats.count(PageStatus::Error), 1);
    assert_eq!(stats.layers, 2);
    assert_eq!(stats.seen, 3);
    assert_eq!(stats.records, 4);
}

#[tokio::test]
async fn test_interrupted_crawl_resumes_with_same_id() {
    let ws = Workspace::new();
    write_fixtures(ws.export_root());

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let first = run_crawl(
        &ws.config,
        "hash-1",
        &["beta".to_string()],
        true,
        ws.client(),
        cancelled,
    )
    .await
    .unwrap();

    assert!(first.cancelled);
    assert_eq!(first.pages_visited, 0);
    assert_eq!(
        ws.store().get_crawl(&first.crawl_id).unwrap().status,
        CrawlStatus::Interrupted
    );

    // Seeds of a resumed run are ignored
    let second = run_crawl(
        &ws.config,
        "hash-1",
        &["something-else".to_string()],
        false,
        ws.client(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(second.crawl_id, first.crawl_id);
    assert!(!second.cancelled);
    // beta -> alpha -> gamma
    assert_eq!(second.pages_visited, 3);
    assert_eq!(second.layers, 3);

    let store = ws.store();
    assert_eq!(
        store.get_crawl(&second.crawl_id).unwrap().status,
        CrawlStatus::Completed
    );
    assert_eq!(store.count_records(&second.crawl_id).unwrap(), 4);
}

#[tokio::test]
async fn test_url_channel_keeps_media() {
    let ws = Workspace::new();
    std::fs::write(ws.export_root().join("pic.jpg"), b"jpeg-bytes").unwrap();
    write_export(
        ws.export_root(),
        "t.me_delta",
        &json!({
            "context": {"chat_id": 30, "title": "Delta"},
            "messages": [{
                "id": 5, "chat_id": 30, "date": 1704067200,
                "permalink": "https://t.me/delta/5",
                "content": {"kind": "photo", "sizes": [{"remote_id": "pic"}]}
            }],
            "files": {"pic": "pic.jpg"}
        }),
    )
    .unwrap();

    let report = run_crawl(
        &ws.config,
        "hash-1",
        &["t.me_delta".to_string()],
        true,
        ws.client(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let post = ws
        .store()
        .get_record(&report.crawl_id, "5-t.me_delta")
        .unwrap()
        .expect("photo record");
    let thumb = post.thumb_url.expect("thumbnail reference");
    assert!(thumb.starts_with(&format!("{}/t_me_delta/", report.crawl_id)));
}

#[tokio::test]
async fn test_missing_export_root_fails_bootstrap() {
    let ws = Workspace::new();
    std::fs::remove_dir_all(ws.export_root()).unwrap();

    let result = run_crawl(
        &ws.config,
        "hash-1",
        &["alpha".to_string()],
        true,
        ws.client(),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        result,
        Err(channel_harvest::HarvestError::Platform(_))
    ));
}
