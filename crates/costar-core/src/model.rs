//! Graph entities: people, media items and the mirrored links between them.
//!
//! A connection between a [`Person`] and a [`Media`] is stored twice: once as
//! a [`MediaLink`] in the person's `media` map and once as a [`PersonLink`] in
//! the media's `people` map. Both halves carry a denormalized copy of the
//! peer's display fields so traversal never needs a second lookup to render a
//! node. [`crate::store::GraphStore`] is the only writer and keeps the two
//! halves in lockstep.
//!
//! Link maps are `BTreeMap`s so iteration order, and therefore which of
//! several equally short paths a search reports, is stable across runs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// What sort of media item a [`Media`] is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Movie,
    Series,
    Album,
    #[default]
    Unknown,
}

impl MediaKind {
    /// Map a catalog item type onto a media kind.
    ///
    /// Matching is case-insensitive. `MusicAlbum` and `Album` both map to
    /// [`MediaKind::Album`]; anything unrecognised is [`MediaKind::Unknown`].
    #[must_use]
    pub fn from_item_type(item_type: &str) -> Self {
        match item_type.trim().to_ascii_lowercase().as_str() {
            "movie" => Self::Movie,
            "series" => Self::Series,
            "musicalbum" | "album" => Self::Album,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Series => "Series",
            Self::Album => "Album",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_item_type(s))
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// A person's view of one media item they are credited on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLink {
    pub media_id: String,
    pub name: String,
    pub kind: MediaKind,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A media item's view of one credited person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonLink {
    pub person_id: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A credited person (actor, director, artist, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Media this person is connected to, keyed by media id.
    #[serde(default)]
    pub media: BTreeMap<String, MediaLink>,
}

impl Person {
    /// Create a person with no connections.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
            media: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Number of media items this person is connected to.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.media.len()
    }
}

/// A media item (movie, series, album).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// People credited on this item, keyed by person id.
    #[serde(default)]
    pub people: BTreeMap<String, PersonLink>,
}

impl Media {
    /// Create a media item with no connections.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            year: None,
            image: None,
            people: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Lightweight listing row returned by people search and paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub connection_count: usize,
}

impl From<&Person> for PersonSummary {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.clone(),
            name: person.name.clone(),
            image: person.image.clone(),
            connection_count: person.link_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_types_map_to_kinds() {
        assert_eq!(MediaKind::from_item_type("Movie"), MediaKind::Movie);
        assert_eq!(MediaKind::from_item_type("series"), MediaKind::Series);
        assert_eq!(MediaKind::from_item_type("MusicAlbum"), MediaKind::Album);
        assert_eq!(MediaKind::from_item_type("Album"), MediaKind::Album);
        assert_eq!(MediaKind::from_item_type("Episode"), MediaKind::Unknown);
        assert_eq!(MediaKind::from_item_type(""), MediaKind::Unknown);
    }

    #[test]
    fn person_serializes_with_camel_case_links() {
        let mut person = Person::new("p1", "Tom Hanks");
        person.media.insert(
            "m1".into(),
            MediaLink {
                media_id: "m1".into(),
                name: "Forrest Gump".into(),
                kind: MediaKind::Movie,
                role: "Actor".into(),
                year: Some(1994),
                image: None,
            },
        );

        let json = serde_json::to_value(&person).expect("serialize");
        assert_eq!(json["media"]["m1"]["mediaId"], "m1");
        assert_eq!(json["media"]["m1"]["kind"], "Movie");
        assert!(json["media"]["m1"].get("image").is_none());

        let back: Person = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, person);
    }

    #[test]
    fn summary_counts_links() {
        let mut person = Person::new("p1", "Tom Hanks");
        assert_eq!(PersonSummary::from(&person).connection_count, 0);
        person.media.insert(
            "m1".into(),
            MediaLink {
                media_id: "m1".into(),
                name: "Big".into(),
                kind: MediaKind::Movie,
                role: "Actor".into(),
                year: None,
                image: None,
            },
        );
        assert_eq!(PersonSummary::from(&person).connection_count, 1);
    }
}
