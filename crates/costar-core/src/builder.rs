//! Full graph rebuild from the catalog, plus the snapshot lifecycle.
//!
//! [`GraphBuilder`] owns the write side of a shared [`GraphStore`]:
//!
//! 1. **Load**: [`GraphBuilder::load_cache`] swaps in a persisted snapshot
//!    if it is present, readable, non-empty and younger than the refresh
//!    interval.
//! 2. **Build**: [`GraphBuilder::build_graph`] clears the store and
//!    re-ingests every catalog item. One bad item is logged and skipped;
//!    only a failure to list the catalog aborts the build.
//! 3. **Save**: after a build the graph is written back as a snapshot.
//!    Save failures are logged, never propagated.
//!
//! There are no incremental updates. Every build replaces the graph.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::cache::{CacheError, GraphSnapshot, read_snapshot, write_snapshot};
use crate::catalog::{Catalog, CatalogItem, KindFilter};
use crate::config::EngineConfig;
use crate::error::ErrorCode;
use crate::model::{Media, Person};
use crate::store::GraphStore;

// ---------------------------------------------------------------------------
// Options / results
// ---------------------------------------------------------------------------

/// Settings the builder needs from [`EngineConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub filter: KindFilter,
    pub refresh_interval: chrono::Duration,
    pub snapshot_path: PathBuf,
}

impl BuildOptions {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            filter: config.catalog.kind_filter(),
            refresh_interval: config.cache.refresh_interval(),
            snapshot_path: config.cache.snapshot_path(),
        }
    }
}

/// Outcome of a successful [`GraphBuilder::build_graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub people_count: usize,
    pub media_count: usize,
    pub connection_count: usize,
    /// Items ingested without error.
    pub items_processed: usize,
    /// Items that failed and were skipped.
    pub items_skipped: usize,
    /// Whether the snapshot was written.
    pub snapshot_saved: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Snapshot freshness as seen by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub last_build: Option<DateTime<Utc>>,
    pub should_rebuild: bool,
    pub refresh_hours: i64,
    pub snapshot_path: PathBuf,
}

/// A build that was aborted. The store is left empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("failed to list catalog items: {0}")]
    Catalog(String),

    #[error("a graph build is already running")]
    InProgress,
}

impl BuildError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Catalog(_) => ErrorCode::CatalogUnavailable,
            Self::InProgress => ErrorCode::BuildFailed,
        }
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Populates a [`GraphStore`] from a [`Catalog`] and persists snapshots.
pub struct GraphBuilder {
    store: Arc<GraphStore>,
    catalog: Arc<dyn Catalog + Send + Sync>,
    options: BuildOptions,
    last_build: Mutex<Option<DateTime<Utc>>>,
    building: Mutex<()>,
}

impl std::fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("options", &self.options)
            .field("last_build", &*self.last_build.lock())
            .finish_non_exhaustive()
    }
}

impl GraphBuilder {
    pub fn new(
        store: Arc<GraphStore>,
        catalog: Arc<dyn Catalog + Send + Sync>,
        options: BuildOptions,
    ) -> Self {
        Self {
            store,
            catalog,
            options,
            last_build: Mutex::new(None),
            building: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    #[must_use]
    pub fn snapshot_path(&self) -> &Path {
        &self.options.snapshot_path
    }

    /// When the graph currently in the store was built.
    #[must_use]
    pub fn last_build(&self) -> Option<DateTime<Utc>> {
        *self.last_build.lock()
    }

    /// Rebuild the graph from scratch.
    ///
    /// An empty catalog is a successful build with zero counts; it still
    /// writes an empty snapshot so an older one cannot be reloaded. Items
    /// whose media cannot be stored or whose credits cannot be read are
    /// skipped.
    /// On success the new graph is saved as a snapshot.
    ///
    /// # Errors
    ///
    /// [`BuildError::Catalog`] if the item list cannot be fetched (the store
    /// is cleared), [`BuildError::InProgress`] if another build holds the
    /// build lock.
    #[instrument(skip(self))]
    pub fn build_graph(&self) -> Result<BuildReport, BuildError> {
        let Some(_guard) = self.building.try_lock() else {
            return Err(BuildError::InProgress);
        };
        let started = Instant::now();
        self.store.clear();

        let items = match self.catalog.items(&self.options.filter) {
            Ok(items) => items,
            Err(e) => {
                self.store.clear();
                error!("graph build aborted: {e:#}");
                return Err(BuildError::Catalog(format!("{e:#}")));
            }
        };

        if items.is_empty() {
            info!("catalog returned no items, graph is empty");
            *self.last_build.lock() = Some(Utc::now());
            // Overwrite any earlier snapshot; an empty one is rejected on load.
            let snapshot_saved = self.save_cache();
            return Ok(BuildReport {
                people_count: 0,
                media_count: 0,
                connection_count: 0,
                items_processed: 0,
                items_skipped: 0,
                snapshot_saved,
                elapsed: started.elapsed(),
            });
        }

        let total = items.len();
        info!(total, "building graph");

        let mut seen_people: HashSet<String> = HashSet::new();
        let mut items_processed = 0usize;
        let mut items_skipped = 0usize;
        let mut last_decile = 0usize;

        for (index, item) in items.iter().enumerate() {
            match self.ingest_item(item, &mut seen_people) {
                Ok(()) => items_processed += 1,
                Err(e) => {
                    items_skipped += 1;
                    warn!(item_id = %item.id, item = %item.name, "skipping item: {e:#}");
                }
            }

            let decile = (index + 1) * 10 / total;
            if decile > last_decile {
                last_decile = decile;
                info!(
                    done = index + 1,
                    total,
                    "graph build {}% complete",
                    decile * 10
                );
            }
        }

        *self.last_build.lock() = Some(Utc::now());
        let snapshot_saved = self.save_cache();

        let report = BuildReport {
            people_count: self.store.people_count(),
            media_count: self.store.media_count(),
            connection_count: self.store.connection_count(),
            items_processed,
            items_skipped,
            snapshot_saved,
            elapsed: started.elapsed(),
        };
        info!(
            people = report.people_count,
            media = report.media_count,
            connections = report.connection_count,
            skipped = report.items_skipped,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "graph build complete"
        );
        Ok(report)
    }

    fn ingest_item(
        &self,
        item: &CatalogItem,
        seen_people: &mut HashSet<String>,
    ) -> anyhow::Result<()> {
        let mut media = Media::new(&item.id, &item.name, item.kind());
        media.year = item.year;
        if item.has_primary_image {
            media.image = Some(item.id.clone());
        }
        self.store.add_media(media)?;

        let credits = self
            .catalog
            .credited_people(&item.id)
            .with_context(|| format!("read credits for {}", item.id))?;

        for credit in credits {
            let person_id = credit.graph_id().trim().to_string();
            if person_id.is_empty() {
                continue;
            }
            if seen_people.insert(person_id.clone()) {
                let mut person = Person::new(&person_id, credit.person_name.trim());
                if credit.has_primary_image {
                    person.image = Some(person_id.clone());
                }
                self.store.add_person(person)?;
            }
            self.store
                .add_connection(&person_id, &item.id, &credit.role)?;
        }
        Ok(())
    }

    /// Replace the store with the persisted snapshot.
    ///
    /// Returns `false` (and logs why) if the snapshot is missing,
    /// unreadable, stale or empty; the store is then left untouched.
    pub fn load_cache(&self) -> bool {
        match self.try_load_cache() {
            Ok(built) => {
                info!(
                    people = self.store.people_count(),
                    media = self.store.media_count(),
                    built = %built,
                    "loaded graph snapshot"
                );
                true
            }
            Err(CacheError::Missing(path)) => {
                info!(path = %path.display(), "no graph snapshot yet");
                false
            }
            Err(e) => {
                warn!(code = %e.code(), "graph snapshot rejected: {e}");
                false
            }
        }
    }

    /// [`Self::load_cache`] with the rejection reason.
    ///
    /// # Errors
    ///
    /// Any [`CacheError`] from reading or validating the snapshot.
    pub fn try_load_cache(&self) -> Result<DateTime<Utc>, CacheError> {
        let snapshot = read_snapshot(&self.options.snapshot_path)?;
        snapshot.validate(Utc::now(), self.options.refresh_interval)?;

        let built = snapshot.build_timestamp;
        self.store.load(snapshot.people, snapshot.media);
        *self.last_build.lock() = Some(built);
        Ok(built)
    }

    /// Persist the current graph. Returns whether the write succeeded.
    pub fn save_cache(&self) -> bool {
        match self.try_save_cache() {
            Ok(bytes) => {
                info!(
                    path = %self.options.snapshot_path.display(),
                    bytes,
                    "saved graph snapshot"
                );
                true
            }
            Err(e) => {
                warn!(code = %e.code(), "failed to save graph snapshot: {e}");
                false
            }
        }
    }

    /// [`Self::save_cache`] with the failure reason.
    ///
    /// Media are collected by walking every person's links, so items with
    /// no credited people are not persisted.
    ///
    /// # Errors
    ///
    /// [`CacheError::Encode`] or [`CacheError::Write`].
    pub fn try_save_cache(&self) -> Result<u64, CacheError> {
        let mut people: Vec<Person> = self
            .store
            .people()
            .into_iter()
            .map(Arc::unwrap_or_clone)
            .collect();
        people.sort_by(|a, b| a.id.cmp(&b.id));

        let mut seen_media: HashSet<&str> = HashSet::new();
        let mut media: Vec<Media> = Vec::new();
        for person in &people {
            for media_id in person.media.keys() {
                if !seen_media.insert(media_id.as_str()) {
                    continue;
                }
                if let Some(item) = self.store.get_media(media_id) {
                    media.push(Arc::unwrap_or_clone(item));
                }
            }
        }

        let snapshot = GraphSnapshot::new(people, media);
        write_snapshot(&self.options.snapshot_path, &snapshot)
    }

    /// `true` if nothing has been built or loaded yet, or the last build is
    /// older than the refresh interval.
    #[must_use]
    pub fn should_rebuild_cache(&self) -> bool {
        self.last_build().is_none_or(|built| {
            Utc::now().signed_duration_since(built) > self.options.refresh_interval
        })
    }

    #[must_use]
    pub fn status(&self) -> CacheStatus {
        CacheStatus {
            last_build: self.last_build(),
            should_rebuild: self.should_rebuild_cache(),
            refresh_hours: self.options.refresh_interval.num_hours(),
            snapshot_path: self.options.snapshot_path.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
