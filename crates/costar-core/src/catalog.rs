//! The content catalog the graph is built from.
//!
//! [`Catalog`] is the seam between the graph builder and whatever actually
//! knows about media items and their credits. [`MemoryCatalog`] is the
//! bundled implementation: an in-memory item list, loadable from a JSON
//! export shaped like
//!
//! ```json
//! { "items": [
//!     { "id": "m1", "name": "Apollo 13", "year": 1995, "hasPrimaryImage": true,
//!       "itemType": "Movie",
//!       "people": [ { "personId": "p1", "personName": "Kevin Bacon", "role": "Actor" } ] }
//! ] }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::MediaKind;

/// One media item as the catalog reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub has_primary_image: bool,
    /// Catalog type name (`Movie`, `Series`, `MusicAlbum`, ...).
    pub item_type: String,
}

impl CatalogItem {
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_item_type(&self.item_type)
    }
}

/// A person credited on a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditedPerson {
    /// Stable external id. Some catalogs only know a name.
    #[serde(default)]
    pub person_id: Option<String>,
    pub person_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub has_primary_image: bool,
}

impl CreditedPerson {
    /// The id the graph uses: the external id, or the name when there is
    /// none.
    #[must_use]
    pub fn graph_id(&self) -> &str {
        match self.person_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => &self.person_name,
        }
    }
}

/// Which media kinds to pull from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindFilter {
    pub movies: bool,
    pub series: bool,
    pub albums: bool,
}

impl KindFilter {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            movies: true,
            series: true,
            albums: true,
        }
    }

    /// Whether items of `kind` pass the filter. [`MediaKind::Unknown`]
    /// never does.
    #[must_use]
    pub const fn accepts(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Movie => self.movies,
            MediaKind::Series => self.series,
            MediaKind::Album => self.albums,
            MediaKind::Unknown => false,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.movies || self.series || self.albums)
    }
}

impl Default for KindFilter {
    fn default() -> Self {
        Self {
            movies: true,
            series: true,
            albums: false,
        }
    }
}

/// Source of media items and credits.
pub trait Catalog {
    /// Every item whose kind passes `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read at all.
    fn items(&self, filter: &KindFilter) -> Result<Vec<CatalogItem>>;

    /// People credited on one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item's credits cannot be read.
    fn credited_people(&self, item_id: &str) -> Result<Vec<CreditedPerson>>;
}

// ---------------------------------------------------------------------------
// MemoryCatalog
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<CatalogFileItem>,
}

#[derive(Debug, Deserialize)]
struct CatalogFileItem {
    #[serde(flatten)]
    item: CatalogItem,
    #[serde(default)]
    people: Vec<CreditedPerson>,
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    items: Vec<CatalogItem>,
    credits: HashMap<String, Vec<CreditedPerson>>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog export.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid export.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))
    }

    /// Parse a catalog export from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid export.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json).context("decode catalog JSON")?;
        let mut catalog = Self::new();
        for entry in file.items {
            catalog.push(entry.item, entry.people);
        }
        Ok(catalog)
    }

    /// Add an item and its credits. Credits for an id already present are
    /// appended.
    pub fn push(&mut self, item: CatalogItem, people: Vec<CreditedPerson>) {
        self.credits
            .entry(item.id.clone())
            .or_default()
            .extend(people);
        self.items.push(item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn items(&self, filter: &KindFilter) -> Result<Vec<CatalogItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.accepts(item.kind()))
            .cloned()
            .collect())
    }

    fn credited_people(&self, item_id: &str) -> Result<Vec<CreditedPerson>> {
        Ok(self.credits.get(item_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "items": [
            { "id": "m1", "name": "Apollo 13", "year": 1995, "hasPrimaryImage": true,
              "itemType": "Movie",
              "people": [
                { "personId": "p1", "personName": "Kevin Bacon", "role": "Actor" },
                { "personName": "Ron Howard", "role": "Director" }
              ] },
            { "id": "s1", "name": "Band of Brothers", "itemType": "Series" },
            { "id": "a1", "name": "Thriller", "itemType": "MusicAlbum" }
        ]
    }"#;

    #[test]
    fn parses_export_with_credits() {
        let catalog = MemoryCatalog::from_json_str(EXPORT).expect("parse");
        assert_eq!(catalog.len(), 3);

        let credits = catalog.credited_people("m1").expect("credits");
        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].graph_id(), "p1");
        assert_eq!(credits[1].graph_id(), "Ron Howard");
        assert!(catalog.credited_people("s1").expect("credits").is_empty());
        assert!(catalog.credited_people("missing").expect("credits").is_empty());
    }

    #[test]
    fn filter_selects_kinds() {
        let catalog = MemoryCatalog::from_json_str(EXPORT).expect("parse");

        let default_ids: Vec<String> = catalog
            .items(&KindFilter::default())
            .expect("items")
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(default_ids, vec!["m1", "s1"]);

        assert_eq!(catalog.items(&KindFilter::all()).expect("items").len(), 3);

        let none = KindFilter {
            movies: false,
            series: false,
            albums: false,
        };
        assert!(none.is_empty());
        assert!(catalog.items(&none).expect("items").is_empty());
    }

    #[test]
    fn blank_person_id_falls_back_to_name() {
        let credit = CreditedPerson {
            person_id: Some("  ".into()),
            person_name: "Meg Ryan".into(),
            role: "Actor".into(),
            has_primary_image: false,
        };
        assert_eq!(credit.graph_id(), "Meg Ryan");
    }

    #[test]
    fn malformed_export_is_an_error() {
        assert!(MemoryCatalog::from_json_str("{ not json").is_err());
        assert!(MemoryCatalog::from_json_str(r#"{ "items": [ { "id": 1 } ] }"#).is_err());
    }
}
