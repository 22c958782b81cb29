//! Thread-safe in-memory store for people, media and their connections.
//!
//! Both entity maps sit behind one [`parking_lot::Mutex`]. A connection is
//! two writes (the person's [`MediaLink`] and the media's [`PersonLink`]) and
//! both happen while the lock is held, so a reader never sees one half
//! without the other.
//!
//! Entities are stored as `Arc`s. Lookups hand out a cheap clone of the
//! `Arc`; writers go through [`Arc::make_mut`], so a traversal that still
//! holds an older handle keeps reading the version it was given.
//!
//! # Write policy
//!
//! - Inserting a person or media whose id already exists is a no-op. The
//!   first insert's fields win.
//! - Re-adding an existing (person, media) pair is a no-op, even with a
//!   different role. The first role wins.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::model::{Media, MediaLink, Person, PersonLink, PersonSummary};

/// Upper bound for [`GraphStore::search_people`] page size.
pub const MAX_SEARCH_LIMIT: usize = 100;
/// Upper bound for [`GraphStore::all_people`] page size.
pub const MAX_LIST_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected store writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An id argument was empty.
    #[error("{field} must not be empty")]
    EmptyId { field: &'static str },
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidInput
    }
}

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Size summary of the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub people_count: usize,
    pub media_count: usize,
    pub connection_count: usize,
    pub average_connections_per_person: f64,
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    people: HashMap<String, Arc<Person>>,
    media: HashMap<String, Arc<Media>>,
    /// Cached sum of every person's link count; `None` when dirty.
    connection_count: Option<usize>,
}

/// Bidirectional people/media adjacency store.
#[derive(Debug, Default)]
pub struct GraphStore {
    inner: Mutex<Inner>,
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a person. Does nothing if a person with the same id exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyId`] if `person.id` is empty.
    pub fn add_person(&self, person: Person) -> Result<(), StoreError> {
        if person.id.is_empty() {
            return Err(StoreError::EmptyId { field: "person id" });
        }
        let mut inner = self.inner.lock();
        inner
            .people
            .entry(person.id.clone())
            .or_insert_with(|| Arc::new(person));
        Ok(())
    }

    /// Insert a media item. Does nothing if an item with the same id exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyId`] if `media.id` is empty.
    pub fn add_media(&self, media: Media) -> Result<(), StoreError> {
        if media.id.is_empty() {
            return Err(StoreError::EmptyId { field: "media id" });
        }
        let mut inner = self.inner.lock();
        inner
            .media
            .entry(media.id.clone())
            .or_insert_with(|| Arc::new(media));
        Ok(())
    }

    /// Connect a person to a media item with `role`.
    ///
    /// Both mirrored links are written under one lock acquisition, copying
    /// each side's current display fields. Unknown endpoints are logged and
    /// skipped. An existing connection is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyId`] if either id is empty.
    pub fn add_connection(
        &self,
        person_id: &str,
        media_id: &str,
        role: &str,
    ) -> Result<(), StoreError> {
        if person_id.is_empty() {
            return Err(StoreError::EmptyId { field: "person id" });
        }
        if media_id.is_empty() {
            return Err(StoreError::EmptyId { field: "media id" });
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let (Some(person), Some(media)) =
            (inner.people.get_mut(person_id), inner.media.get_mut(media_id))
        else {
            warn!(person_id, media_id, "connection endpoint missing, skipping");
            return Ok(());
        };

        if person.media.contains_key(media_id) {
            debug!(person_id, media_id, "connection exists, keeping original role");
            return Ok(());
        }

        let media_link = MediaLink {
            media_id: media.id.clone(),
            name: media.name.clone(),
            kind: media.kind,
            role: role.to_string(),
            year: media.year,
            image: media.image.clone(),
        };
        let person_link = PersonLink {
            person_id: person.id.clone(),
            name: person.name.clone(),
            role: role.to_string(),
            image: person.image.clone(),
        };

        Arc::make_mut(person)
            .media
            .insert(media_id.to_string(), media_link);
        Arc::make_mut(media)
            .people
            .insert(person_id.to_string(), person_link);
        inner.connection_count = None;
        Ok(())
    }

    /// Look up a person. Empty or unknown ids yield `None`.
    #[must_use]
    pub fn get_person(&self, id: &str) -> Option<Arc<Person>> {
        if id.is_empty() {
            return None;
        }
        self.inner.lock().people.get(id).cloned()
    }

    /// Look up a media item. Empty or unknown ids yield `None`.
    #[must_use]
    pub fn get_media(&self, id: &str) -> Option<Arc<Media>> {
        if id.is_empty() {
            return None;
        }
        self.inner.lock().media.get(id).cloned()
    }

    /// Case-insensitive substring search over person names.
    ///
    /// A blank query returns nothing. Results are ordered by name; `limit`
    /// is clamped to `1..=100`.
    #[must_use]
    pub fn search_people(&self, query: &str, limit: usize, offset: usize) -> Vec<PersonSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);

        let inner = self.inner.lock();
        let mut matches: Vec<&Arc<Person>> = inner
            .people
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        page(&mut matches, limit, offset)
    }

    /// Page through every person ordered by name; `limit` is clamped to
    /// `1..=200`.
    #[must_use]
    pub fn all_people(&self, limit: usize, offset: usize) -> Vec<PersonSummary> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let inner = self.inner.lock();
        let mut everyone: Vec<&Arc<Person>> = inner.people.values().collect();
        page(&mut everyone, limit, offset)
    }

    /// Every person currently stored, in no particular order.
    #[must_use]
    pub fn people(&self) -> Vec<Arc<Person>> {
        self.inner.lock().people.values().cloned().collect()
    }

    #[must_use]
    pub fn people_count(&self) -> usize {
        self.inner.lock().people.len()
    }

    #[must_use]
    pub fn media_count(&self) -> usize {
        self.inner.lock().media.len()
    }

    /// Total number of connections, counted from the person side.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        let mut inner = self.inner.lock();
        connection_count_locked(&mut inner)
    }

    /// Remove every entity.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.people.clear();
        inner.media.clear();
        inner.connection_count = None;
    }

    /// Replace the whole graph with previously persisted entities.
    ///
    /// Entities keep the links they were saved with. Empty ids are dropped;
    /// on duplicate ids the first entity wins.
    pub fn load(&self, people: Vec<Person>, media: Vec<Media>) {
        let mut people_map = HashMap::with_capacity(people.len());
        for person in people.into_iter().filter(|p| !p.id.is_empty()) {
            people_map
                .entry(person.id.clone())
                .or_insert_with(|| Arc::new(person));
        }
        let mut media_map = HashMap::with_capacity(media.len());
        for item in media.into_iter().filter(|m| !m.id.is_empty()) {
            media_map
                .entry(item.id.clone())
                .or_insert_with(|| Arc::new(item));
        }

        let mut inner = self.inner.lock();
        inner.people = people_map;
        inner.media = media_map;
        inner.connection_count = None;
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> GraphStats {
        let mut inner = self.inner.lock();
        let people_count = inner.people.len();
        let media_count = inner.media.len();
        let connection_count = connection_count_locked(&mut inner);

        let average_connections_per_person = if people_count == 0 {
            0.0
        } else {
            connection_count as f64 / people_count as f64
        };

        GraphStats {
            people_count,
            media_count,
            connection_count,
            average_connections_per_person,
        }
    }
}

fn connection_count_locked(inner: &mut Inner) -> usize {
    if let Some(count) = inner.connection_count {
        return count;
    }
    let count = inner.people.values().map(|p| p.link_count()).sum();
    inner.connection_count = Some(count);
    count
}

/// Sort by name (id breaks ties) and cut one page.
fn page(people: &mut [&Arc<Person>], limit: usize, offset: usize) -> Vec<PersonSummary> {
    people.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    people
        .iter()
        .skip(offset)
        .take(limit)
        .map(|p| PersonSummary::from(p.as_ref()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
