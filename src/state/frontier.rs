//! The layered crawl frontier
//!
//! A frontier is an ordered list of layers, one per discovery depth, plus the
//! set of every identifier ever placed into any layer. Identifiers discovered
//! while a layer is being walked are staged for the next depth and published
//! once the walk of the current layer finishes, so the layer list never grows
//! under an in-progress pass.

use crate::state::PageStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One crawl target plus its visit status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Opaque platform identifier (channel handle, URL, ...)
    pub url: String,

    /// Visit status
    pub status: PageStatus,

    /// Time of the last visit attempt
    pub timestamp: Option<DateTime<Utc>>,
}

impl Page {
    /// Creates an unvisited page
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: PageStatus::Unvisited,
            timestamp: None,
        }
    }
}

/// All pages first discovered at one depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub depth: u32,
    pub pages: Vec<Page>,
}

impl Layer {
    /// Creates an empty layer
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            pages: Vec::new(),
        }
    }

    /// Merges pages into the layer by identifier
    ///
    /// A page whose identifier is already present replaces the existing entry
    /// in place; new identifiers are appended in the given order.
    pub fn merge(&mut self, pages: impl IntoIterator<Item = Page>) {
        let mut index: HashMap<String, usize> = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| (page.url.clone(), i))
            .collect();

        for page in pages {
            match index.get(&page.url) {
                Some(&i) => self.pages[i] = page,
                None => {
                    index.insert(page.url.clone(), self.pages.len());
                    self.pages.push(page);
                }
            }
        }
    }

    /// Number of pages a run still has to visit in this layer
    pub fn pending(&self) -> usize {
        self.pages
            .iter()
            .filter(|page| page.status.needs_visit())
            .count()
    }
}

/// The crawl's working state: layered pages plus the seen set
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    layers: Vec<Layer>,
    seen: HashSet<String>,
    staged: Option<Layer>,
}

impl Frontier {
    /// Builds layer 0 from seed identifiers
    ///
    /// Duplicate seeds collapse to their first occurrence.
    pub fn seeded<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut layer = Layer::new(0);

        for seed in seeds {
            let seed = seed.into();
            if seen.insert(seed.clone()) {
                layer.pages.push(Page::new(seed));
            }
        }

        let layers = if layer.pages.is_empty() {
            Vec::new()
        } else {
            vec![layer]
        };

        Self {
            layers,
            seen,
            staged: None,
        }
    }

    /// Rebuilds a frontier from persisted layers and seen identifiers
    ///
    /// The seen set is widened to cover every identifier in the layers.
    pub fn from_parts(mut layers: Vec<Layer>, mut seen: HashSet<String>) -> Self {
        layers.sort_by_key(|layer| layer.depth);
        for layer in &layers {
            seen.extend(layer.pages.iter().map(|page| page.url.clone()));
        }

        Self {
            layers,
            seen,
            staged: None,
        }
    }

    /// Published layers in increasing depth order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Every identifier ever placed into a layer
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    /// Returns true if the identifier was ever placed into a layer
    pub fn has_seen(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    /// Total number of published pages
    pub fn page_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.pages.len()).sum()
    }

    /// Number of published pages a run still has to visit
    pub fn pending_count(&self) -> usize {
        self.layers.iter().map(Layer::pending).sum()
    }

    /// Depth of the layer holding the identifier, staged pages included
    pub fn depth_of(&self, identifier: &str) -> Option<u32> {
        self.layers
            .iter()
            .chain(self.staged.iter())
            .find(|layer| layer.pages.iter().any(|page| page.url == identifier))
            .map(|layer| layer.depth)
    }

    /// Borrows a page by layer and page position
    pub fn page(&self, layer_index: usize, page_index: usize) -> Option<&Page> {
        self.layers.get(layer_index)?.pages.get(page_index)
    }

    /// Mutably borrows a page by layer and page position
    pub fn page_mut(&mut self, layer_index: usize, page_index: usize) -> Option<&mut Page> {
        self.layers.get_mut(layer_index)?.pages.get_mut(page_index)
    }

    /// Stages outlinks discovered at `from_depth` for layer `from_depth + 1`
    ///
    /// Identifiers already seen (in any layer, or earlier in this batch) are
    /// dropped. Survivors enter the seen set immediately.
    ///
    /// # Returns
    ///
    /// The number of newly staged identifiers
    pub fn stage_outlinks<I, S>(&mut self, from_depth: u32, outlinks: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target_depth = from_depth + 1;
        if self
            .staged
            .as_ref()
            .is_some_and(|staged| staged.depth != target_depth)
        {
            self.publish_staged();
        }

        let staged = self
            .staged
            .get_or_insert_with(|| Layer::new(target_depth));

        let mut added = 0;
        for outlink in outlinks {
            let outlink = outlink.into();
            if self.seen.insert(outlink.clone()) {
                staged.pages.push(Page::new(outlink));
                added += 1;
            } else {
                tracing::debug!(url = %outlink, "Skipping already seen identifier");
            }
        }

        added
    }

    /// Number of staged, not yet published pages
    pub fn staged_count(&self) -> usize {
        self.staged
            .as_ref()
            .map(|layer| layer.pages.len())
            .unwrap_or(0)
    }

    /// Publishes staged pages into their layer
    ///
    /// The target layer is created if it does not exist yet, otherwise the
    /// staged pages are merged into it by identifier.
    ///
    /// # Returns
    ///
    /// The depth published into, or None if nothing was staged
    pub fn publish_staged(&mut self) -> Option<u32> {
        let staged = self.staged.take()?;
        if staged.pages.is_empty() {
            return None;
        }

        let depth = staged.depth;
        merge_layer(&mut self.layers, staged);
        Some(depth)
    }

    /// Layers as they should be persisted, staged pages included
    pub fn checkpoint_layers(&self) -> Vec<Layer> {
        let mut layers = self.layers.clone();
        if let Some(staged) = &self.staged {
            if !staged.pages.is_empty() {
                merge_layer(&mut layers, staged.clone());
            }
        }
        layers
    }
}

fn merge_layer(layers: &mut Vec<Layer>, incoming: Layer) {
    match layers.iter_mut().find(|layer| layer.depth == incoming.depth) {
        Some(existing) => existing.merge(incoming.pages),
        None => {
            layers.push(incoming);
            layers.sort_by_key(|layer| layer.depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(layer: &Layer) -> Vec<&str> {
        layer.pages.iter().map(|page| page.url.as_str()).collect()
    }

    #[test]
    fn test_seeded_collapses_duplicate_seeds() {
        let frontier = Frontier::seeded(["a", "b", "a"]);
        assert_eq!(frontier.layers().len(), 1);
        assert_eq!(urls(&frontier.layers()[0]), vec!["a", "b"]);
        assert!(frontier.has_seen("a"));
        assert!(frontier.has_seen("b"));
    }

    #[test]
    fn test_seeded_empty_has_no_layers() {
        let frontier = Frontier::seeded(Vec::<String>::new());
        assert!(frontier.layers().is_empty());
        assert_eq!(frontier.pending_count(), 0);
    }

    #[test]
    fn test_stage_drops_seen_and_batch_duplicates() {
        let mut frontier = Frontier::seeded(["a"]);

        let added = frontier.stage_outlinks(0, ["b", "a", "b"]);
        assert_eq!(added, 1);
        assert_eq!(frontier.staged_count(), 1);

        // Staged pages are not visible until published
        assert_eq!(frontier.layers().len(), 1);

        assert_eq!(frontier.publish_staged(), Some(1));
        assert_eq!(frontier.layers().len(), 2);
        assert_eq!(urls(&frontier.layers()[1]), vec!["b"]);
    }

    #[test]
    fn test_stage_is_case_sensitive() {
        let mut frontier = Frontier::seeded(["Chan"]);
        let added = frontier.stage_outlinks(0, ["chan", "Chan "]);
        assert_eq!(added, 2);
    }

    #[test]
    fn test_checkpoint_includes_staged_pages() {
        let mut frontier = Frontier::seeded(["a"]);
        frontier.stage_outlinks(0, ["b", "c"]);

        let checkpoint = frontier.checkpoint_layers();
        assert_eq!(checkpoint.len(), 2);
        assert_eq!(urls(&checkpoint[1]), vec!["b", "c"]);
        assert_eq!(frontier.depth_of("c"), Some(1));
    }

    #[test]
    fn test_publish_merges_into_existing_layer() {
        let mut layer1 = Layer::new(1);
        layer1.pages.push(Page::new("b"));
        let layers = vec![
            Layer {
                depth: 0,
                pages: vec![Page::new("a")],
            },
            layer1,
        ];
        let mut frontier = Frontier::from_parts(layers, HashSet::new());
        assert!(frontier.has_seen("b"));

        frontier.stage_outlinks(0, ["c", "b"]);
        assert_eq!(frontier.publish_staged(), Some(1));

        assert_eq!(frontier.layers().len(), 2);
        assert_eq!(urls(&frontier.layers()[1]), vec!["b", "c"]);
    }

    #[test]
    fn test_publish_nothing_staged() {
        let mut frontier = Frontier::seeded(["a"]);
        assert_eq!(frontier.publish_staged(), None);

        frontier.stage_outlinks(0, ["a"]);
        assert_eq!(frontier.publish_staged(), None);
        assert_eq!(frontier.layers().len(), 1);
    }

    #[test]
    fn test_layer_merge_is_idempotent() {
        let mut layer = Layer::new(2);
        layer.merge(vec![Page::new("x"), Page::new("y")]);
        layer.merge(vec![Page::new("y"), Page::new("x")]);
        assert_eq!(urls(&layer), vec!["x", "y"]);
    }

    #[test]
    fn test_layer_merge_last_write_wins() {
        let mut layer = Layer::new(1);
        layer.merge(vec![Page::new("x")]);

        let mut fetched = Page::new("x");
        fetched.status = PageStatus::Fetched;
        layer.merge(vec![fetched]);

        assert_eq!(layer.pages.len(), 1);
        assert_eq!(layer.pages[0].status, PageStatus::Fetched);
    }

    #[test]
    fn test_from_parts_sorts_layers_and_widens_seen() {
        let layers = vec![
            Layer {
                depth: 1,
                pages: vec![Page::new("b")],
            },
            Layer {
                depth: 0,
                pages: vec![Page::new("a")],
            },
        ];
        let frontier = Frontier::from_parts(layers, HashSet::from(["z".to_string()]));

        assert_eq!(frontier.layers()[0].depth, 0);
        assert_eq!(frontier.layers()[1].depth, 1);
        assert_eq!(frontier.seen().len(), 3);
    }

    #[test]
    fn test_pending_count_skips_fetched() {
        let mut frontier = Frontier::seeded(["a", "b", "c"]);
        frontier.page_mut(0, 0).unwrap().status = PageStatus::Fetched;
        frontier.page_mut(0, 1).unwrap().status = PageStatus::Error;

        assert_eq!(frontier.page_count(), 3);
        assert_eq!(frontier.pending_count(), 2);
    }
}
