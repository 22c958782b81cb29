//! Breadth-first queries over the people/media graph.
//!
//! # Hops and degrees
//!
//! One BFS level is a person → media → person hop. A path is reported as the
//! alternating node sequence `[person, media, person, ..., person]`, and its
//! *degree* is the number of steps in that sequence (`len - 1`). Every hop
//! contributes two steps, so degrees are always even and at most
//! `2 * max_depth`.
//!
//! # Neighborhood depths
//!
//! [`PathfindingEngine::neighbors`] records the start person at depth 0. A
//! media node takes the depth of the person it was discovered from, and a
//! person reached through that media gets that depth plus one. Media nodes
//! therefore share a depth with the person on their near side.
//!
//! # Consistency
//!
//! Searches read the store one lookup at a time and never hold its lock for
//! the whole traversal. A rebuild running concurrently can make a search miss
//! or see stale nodes; it cannot corrupt the store.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::ErrorCode;
use crate::model::MediaKind;
use crate::store::GraphStore;

/// Default hop bound for [`PathfindingEngine::shortest_path`].
pub const DEFAULT_MAX_DEPTH: usize = 6;
/// Largest accepted neighborhood degree.
pub const MAX_NEIGHBOR_DEGREE: usize = 6;
/// Default node cap for [`PathfindingEngine::neighbors`].
pub const DEFAULT_MAX_NODES: usize = 500;
/// Largest accepted node cap.
pub const MAX_NEIGHBOR_NODES: usize = 1000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Expected query failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{0} must not be empty")]
    InvalidInput(&'static str),

    #[error("start and target are the same person")]
    SamePerson,

    #[error("start person not found: {0}")]
    FromNotFound(String),

    #[error("target person not found: {0}")]
    ToNotFound(String),

    #[error("person not found: {0}")]
    PersonNotFound(String),

    #[error("no connection found within {max_depth} hops ({nodes_visited} people visited)")]
    NoPath {
        max_depth: usize,
        nodes_visited: usize,
    },

    /// The graph changed under a running search in a way it could not
    /// recover from.
    #[error("search failed: {0}")]
    Search(String),
}

impl QueryError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::SamePerson => ErrorCode::SamePerson,
            Self::FromNotFound(_) | Self::ToNotFound(_) | Self::PersonNotFound(_) => {
                ErrorCode::PersonNotFound
            }
            Self::NoPath { .. } => ErrorCode::NoPath,
            Self::Search(_) => ErrorCode::SearchFailed,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Node type tag used in query output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Person,
    Media,
}

/// One step of a shortest path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<MediaKind>,
    /// For media nodes: `"<role of previous person> / <role of next person>"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A successful shortest-path search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortestPath {
    pub path: Vec<PathNode>,
    pub degrees: usize,
    /// People dequeued before the target was reached.
    pub nodes_visited: usize,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

/// A node in a neighborhood expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub depth: usize,
}

/// A directed edge in a neighborhood expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NeighborEdge {
    pub source: String,
    pub target: String,
    pub role: String,
}

/// Result of [`PathfindingEngine::neighbors`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighborhood {
    pub nodes: Vec<NeighborNode>,
    pub edges: Vec<NeighborEdge>,
    /// `true` when the node cap was reached.
    pub truncated: bool,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    /// Distinct people and media discovered.
    pub nodes_visited: usize,
}

/// How a person was first reached during a shortest-path search.
#[derive(Debug, Clone)]
struct ParentEdge {
    prev_person: String,
    media_id: String,
    media_name: String,
    media_kind: MediaKind,
    media_year: Option<i32>,
    media_image: Option<String>,
    prev_role: String,
    next_role: String,
    person_name: String,
    person_image: Option<String>,
}

// ---------------------------------------------------------------------------
// PathfindingEngine
// ---------------------------------------------------------------------------

/// Read-only query engine over a shared [`GraphStore`].
///
/// Each call keeps its own queue, visited set and parent map, so one engine
/// can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct PathfindingEngine {
    store: Arc<GraphStore>,
}

impl PathfindingEngine {
    #[must_use]
    pub const fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Find the shortest connection between two people.
    ///
    /// Expansion stops at people already `max_depth` hops from the start.
    ///
    /// # Errors
    ///
    /// In order of checking: [`QueryError::InvalidInput`] for empty ids,
    /// [`QueryError::SamePerson`], [`QueryError::FromNotFound`],
    /// [`QueryError::ToNotFound`]. A search that runs dry returns
    /// [`QueryError::NoPath`]; a parent chain broken by a concurrent
    /// rebuild returns [`QueryError::Search`].
    #[instrument(skip(self))]
    pub fn shortest_path(
        &self,
        from_id: &str,
        to_id: &str,
        max_depth: usize,
    ) -> Result<ShortestPath, QueryError> {
        let started = Instant::now();

        if from_id.is_empty() {
            return Err(QueryError::InvalidInput("from id"));
        }
        if to_id.is_empty() {
            return Err(QueryError::InvalidInput("to id"));
        }
        if from_id == to_id {
            return Err(QueryError::SamePerson);
        }
        let Some(from) = self.store.get_person(from_id) else {
            return Err(QueryError::FromNotFound(from_id.to_string()));
        };
        if self.store.get_person(to_id).is_none() {
            return Err(QueryError::ToNotFound(to_id.to_string()));
        }

        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut parents: HashMap<String, ParentEdge> = HashMap::new();
        let mut nodes_visited = 0usize;

        visited.insert(from_id.to_string());
        queue.push_back((from_id.to_string(), 0));

        while let Some((person_id, depth)) = queue.pop_front() {
            nodes_visited += 1;

            if person_id == to_id {
                let path = build_path(&from, to_id, &parents)?;
                let degrees = path.len() - 1;
                debug!(degrees, nodes_visited, "path found");
                return Ok(ShortestPath {
                    path,
                    degrees,
                    nodes_visited,
                    elapsed: started.elapsed(),
                });
            }

            if depth >= max_depth {
                continue;
            }
            let Some(person) = self.store.get_person(&person_id) else {
                continue;
            };

            for media_link in person.media.values() {
                let Some(media) = self.store.get_media(&media_link.media_id) else {
                    continue;
                };
                for person_link in media.people.values() {
                    if !visited.insert(person_link.person_id.clone()) {
                        continue;
                    }
                    parents.insert(
                        person_link.person_id.clone(),
                        ParentEdge {
                            prev_person: person_id.clone(),
                            media_id: media.id.clone(),
                            media_name: media.name.clone(),
                            media_kind: media.kind,
                            media_year: media.year,
                            media_image: media.image.clone(),
                            prev_role: media_link.role.clone(),
                            next_role: person_link.role.clone(),
                            person_name: person_link.name.clone(),
                            person_image: person_link.image.clone(),
                        },
                    );
                    queue.push_back((person_link.person_id.clone(), depth + 1));
                }
            }
        }

        debug!(nodes_visited, max_depth, "no path");
        Err(QueryError::NoPath {
            max_depth,
            nodes_visited,
        })
    }

    /// Expand the neighborhood around one person.
    ///
    /// `degree` is clamped to `1..=6` and `max_nodes` to `1..=1000`. Edges
    /// are reported in both directions (person → media with the person's
    /// role, media → person with the other person's role) and only between
    /// nodes that made it into the result.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidInput`] for an empty id,
    /// [`QueryError::PersonNotFound`] for an unknown one.
    #[instrument(skip(self))]
    pub fn neighbors(
        &self,
        person_id: &str,
        degree: usize,
        max_nodes: usize,
    ) -> Result<Neighborhood, QueryError> {
        let started = Instant::now();

        if person_id.is_empty() {
            return Err(QueryError::InvalidInput("person id"));
        }
        let Some(start) = self.store.get_person(person_id) else {
            return Err(QueryError::PersonNotFound(person_id.to_string()));
        };
        let degree = degree.clamp(1, MAX_NEIGHBOR_DEGREE);
        let max_nodes = max_nodes.clamp(1, MAX_NEIGHBOR_NODES);

        let mut nodes = vec![NeighborNode {
            id: start.id.clone(),
            name: start.name.clone(),
            node_type: NodeType::Person,
            media_kind: None,
            image: start.image.clone(),
            depth: 0,
        }];
        let mut seen_people: HashSet<String> = HashSet::from([start.id.clone()]);
        let mut seen_media: HashSet<String> = HashSet::new();
        let mut edges: Vec<(NodeType, NeighborEdge)> = Vec::new();
        let mut edge_set: HashSet<(NodeType, String, String)> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(start.id.clone(), 0)]);

        'expand: while let Some((current_id, depth)) = queue.pop_front() {
            if nodes.len() >= max_nodes {
                break;
            }
            if depth >= degree {
                continue;
            }
            let Some(person) = self.store.get_person(&current_id) else {
                continue;
            };

            for media_link in person.media.values() {
                if nodes.len() >= max_nodes {
                    break 'expand;
                }
                if seen_media.insert(media_link.media_id.clone()) {
                    nodes.push(NeighborNode {
                        id: media_link.media_id.clone(),
                        name: media_link.name.clone(),
                        node_type: NodeType::Media,
                        media_kind: Some(media_link.kind),
                        image: media_link.image.clone(),
                        depth,
                    });
                }
                push_edge(
                    &mut edges,
                    &mut edge_set,
                    NodeType::Person,
                    &current_id,
                    &media_link.media_id,
                    &media_link.role,
                );

                let Some(media) = self.store.get_media(&media_link.media_id) else {
                    continue;
                };
                for person_link in media.people.values() {
                    if person_link.person_id == current_id {
                        continue;
                    }
                    if seen_people.contains(&person_link.person_id) {
                        push_edge(
                            &mut edges,
                            &mut edge_set,
                            NodeType::Media,
                            &media.id,
                            &person_link.person_id,
                            &person_link.role,
                        );
                        continue;
                    }
                    if nodes.len() >= max_nodes {
                        break 'expand;
                    }
                    seen_people.insert(person_link.person_id.clone());
                    nodes.push(NeighborNode {
                        id: person_link.person_id.clone(),
                        name: person_link.name.clone(),
                        node_type: NodeType::Person,
                        media_kind: None,
                        image: person_link.image.clone(),
                        depth: depth + 1,
                    });
                    push_edge(
                        &mut edges,
                        &mut edge_set,
                        NodeType::Media,
                        &media.id,
                        &person_link.person_id,
                        &person_link.role,
                    );
                    queue.push_back((person_link.person_id.clone(), depth + 1));
                }
            }
        }

        let edges: Vec<NeighborEdge> = edges
            .into_iter()
            .filter(|(source_type, edge)| match source_type {
                NodeType::Person => {
                    seen_people.contains(&edge.source) && seen_media.contains(&edge.target)
                }
                NodeType::Media => {
                    seen_media.contains(&edge.source) && seen_people.contains(&edge.target)
                }
            })
            .map(|(_, edge)| edge)
            .collect();

        let truncated = nodes.len() == max_nodes;
        let nodes_visited = seen_people.len() + seen_media.len();
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            truncated,
            "neighborhood expanded"
        );

        Ok(Neighborhood {
            nodes,
            edges,
            truncated,
            elapsed: started.elapsed(),
            nodes_visited,
        })
    }
}

fn push_edge(
    edges: &mut Vec<(NodeType, NeighborEdge)>,
    edge_set: &mut HashSet<(NodeType, String, String)>,
    source_type: NodeType,
    source: &str,
    target: &str,
    role: &str,
) {
    if edge_set.insert((source_type, source.to_string(), target.to_string())) {
        edges.push((
            source_type,
            NeighborEdge {
                source: source.to_string(),
                target: target.to_string(),
                role: role.to_string(),
            },
        ));
    }
}

/// Walk parent edges from `to_id` back to the start and emit the
/// alternating person/media sequence.
fn build_path(
    from: &crate::model::Person,
    to_id: &str,
    parents: &HashMap<String, ParentEdge>,
) -> Result<Vec<PathNode>, QueryError> {
    let mut hops: Vec<(&str, &ParentEdge)> = Vec::new();
    let mut cursor = to_id;
    while cursor != from.id {
        let Some(edge) = parents.get(cursor) else {
            return Err(QueryError::Search(format!(
                "no parent recorded for {cursor}"
            )));
        };
        if hops.len() > parents.len() {
            return Err(QueryError::Search("parent chain loops".to_string()));
        }
        hops.push((cursor, edge));
        cursor = edge.prev_person.as_str();
    }
    hops.reverse();

    let mut path = Vec::with_capacity(hops.len() * 2 + 1);
    path.push(PathNode {
        id: from.id.clone(),
        name: from.name.clone(),
        node_type: NodeType::Person,
        media_kind: None,
        role: None,
        year: None,
        image: from.image.clone(),
    });
    for (person_id, edge) in hops {
        path.push(PathNode {
            id: edge.media_id.clone(),
            name: edge.media_name.clone(),
            node_type: NodeType::Media,
            media_kind: Some(edge.media_kind),
            role: Some(format!("{} / {}", edge.prev_role, edge.next_role)),
            year: edge.media_year,
            image: edge.media_image.clone(),
        });
        path.push(PathNode {
            id: person_id.to_string(),
            name: edge.person_name.clone(),
            node_type: NodeType::Person,
            media_kind: None,
            role: None,
            year: None,
            image: edge.person_image.clone(),
        });
    }
    Ok(path)
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Media, Person};

    /// Tom Hanks –Forrest Gump– Gary Sinise –Apollo 13– Kevin Bacon
    /// –A Few Good Men– Tom Cruise, plus an unconnected person.
    fn chain() -> PathfindingEngine {
        let store = GraphStore::new();
        for (id, name) in [
            ("hanks", "Tom Hanks"),
            ("sinise", "Gary Sinise"),
            ("bacon", "Kevin Bacon"),
            ("cruise", "Tom Cruise"),
            ("loner", "Lonely Person"),
        ] {
            store.add_person(Person::new(id, name)).expect("person");
        }
        for (id, name, year) in [
            ("gump", "Forrest Gump", 1994),
            ("apollo", "Apollo 13", 1995),
            ("fgm", "A Few Good Men", 1992),
        ] {
            store
                .add_media(Media::new(id, name, MediaKind::Movie).with_year(year))
                .expect("media");
        }
        for (person, media, role) in [
            ("hanks", "gump", "Forrest"),
            ("sinise", "gump", "Lt. Dan"),
            ("sinise", "apollo", "Ken Mattingly"),
            ("bacon", "apollo", "Jack Swigert"),
            ("bacon", "fgm", "Jack Ross"),
            ("cruise", "fgm", "Daniel Kaffee"),
        ] {
            store.add_connection(person, media, role).expect("connect");
        }
        PathfindingEngine::new(Arc::new(store))
    }

    #[test]
    fn one_hop_is_two_degrees() {
        let engine = chain();
        let found = engine.shortest_path("hanks", "sinise", 6).expect("path");
        assert_eq!(found.degrees, 2);
        assert_eq!(found.path.len(), 3);
        assert_eq!(found.path[0].name, "Tom Hanks");
        assert_eq!(found.path[1].name, "Forrest Gump");
        assert_eq!(found.path[1].node_type, NodeType::Media);
        assert_eq!(found.path[1].role.as_deref(), Some("Forrest / Lt. Dan"));
        assert_eq!(found.path[2].name, "Gary Sinise");
    }

    #[test]
    fn longer_chains_count_every_step() {
        let engine = chain();
        assert_eq!(engine.shortest_path("hanks", "bacon", 6).expect("path").degrees, 4);
        let found = engine.shortest_path("hanks", "cruise", 6).expect("path");
        assert_eq!(found.degrees, 6);
        let ids: Vec<&str> = found.path.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            ["hanks", "gump", "sinise", "apollo", "bacon", "fgm", "cruise"]
        );
    }

    #[test]
    fn depth_bound_stops_search() {
        let engine = chain();
        let err = engine.shortest_path("hanks", "bacon", 1).expect_err("too far");
        assert!(matches!(err, QueryError::NoPath { max_depth: 1, .. }));
        assert_eq!(err.code(), ErrorCode::NoPath);
        assert!(engine.shortest_path("hanks", "bacon", 2).is_ok());
    }

    #[test]
    fn unreachable_person_reports_nodes_visited() {
        let engine = chain();
        let err = engine.shortest_path("hanks", "loner", 6).expect_err("isolated");
        assert_eq!(
            err,
            QueryError::NoPath {
                max_depth: 6,
                nodes_visited: 4
            }
        );
    }

    #[test]
    fn validation_order() {
        let engine = chain();
        assert_eq!(
            engine.shortest_path("", "", 6).expect_err("empty"),
            QueryError::InvalidInput("from id")
        );
        assert_eq!(
            engine.shortest_path("ghost", "ghost", 6).expect_err("same"),
            QueryError::SamePerson
        );
        assert_eq!(
            engine.shortest_path("ghost", "hanks", 6).expect_err("from"),
            QueryError::FromNotFound("ghost".into())
        );
        assert_eq!(
            engine.shortest_path("hanks", "ghost", 6).expect_err("to"),
            QueryError::ToNotFound("ghost".into())
        );
    }

    #[test]
    fn isolated_person_neighborhood_is_just_itself() {
        let engine = chain();
        let hood = engine.neighbors("loner", 2, 500).expect("neighbors");
        assert_eq!(hood.nodes.len(), 1);
        assert!(hood.edges.is_empty());
        assert!(!hood.truncated);
        assert_eq!(hood.nodes[0].depth, 0);
    }

    #[test]
    fn media_share_depth_with_their_near_person() {
        let engine = chain();
        let hood = engine.neighbors("hanks", 2, 500).expect("neighbors");
        let depth_of = |id: &str| {
            hood.nodes
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.depth)
        };
        assert_eq!(depth_of("hanks"), Some(0));
        assert_eq!(depth_of("gump"), Some(0));
        assert_eq!(depth_of("sinise"), Some(1));
        assert_eq!(depth_of("apollo"), Some(1));
        assert_eq!(depth_of("bacon"), Some(2));
        assert_eq!(depth_of("fgm"), None);
        assert_eq!(hood.nodes.len(), 5);
        assert!(!hood.truncated);
    }

    #[test]
    fn edges_run_both_directions_with_roles() {
        let engine = chain();
        let hood = engine.neighbors("hanks", 1, 500).expect("neighbors");
        assert!(hood.edges.contains(&NeighborEdge {
            source: "hanks".into(),
            target: "gump".into(),
            role: "Forrest".into(),
        }));
        assert!(hood.edges.contains(&NeighborEdge {
            source: "gump".into(),
            target: "sinise".into(),
            role: "Lt. Dan".into(),
        }));
        assert_eq!(hood.edges.len(), 2);
    }

    #[test]
    fn node_cap_truncates() {
        let engine = chain();
        let hood = engine.neighbors("hanks", 6, 3).expect("neighbors");
        assert_eq!(hood.nodes.len(), 3);
        assert!(hood.truncated);
        let ids: HashSet<&str> = hood.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &hood.edges {
            assert!(ids.contains(edge.source.as_str()));
            assert!(ids.contains(edge.target.as_str()));
        }
    }

    #[test]
    fn neighbor_arguments_are_clamped() {
        let engine = chain();
        let hood = engine.neighbors("hanks", 0, 0).expect("neighbors");
        assert_eq!(hood.nodes.len(), 1);
        assert!(hood.truncated);

        let hood = engine.neighbors("hanks", 99, 5_000).expect("neighbors");
        assert_eq!(hood.nodes.len(), 7);
        assert!(!hood.truncated);
    }

    #[test]
    fn neighbor_validation() {
        let engine = chain();
        assert_eq!(
            engine.neighbors("", 1, 10).expect_err("empty"),
            QueryError::InvalidInput("person id")
        );
        assert_eq!(
            engine.neighbors("ghost", 1, 10).expect_err("unknown"),
            QueryError::PersonNotFound("ghost".into())
        );
    }

    #[test]
    fn path_serializes_with_type_tags() {
        let engine = chain();
        let found = engine.shortest_path("hanks", "sinise", 6).expect("path");
        let json = serde_json::to_value(&found).expect("serialize");
        assert_eq!(json["degrees"], 2);
        assert_eq!(json["path"][0]["type"], "person");
        assert_eq!(json["path"][1]["type"], "media");
        assert_eq!(json["path"][1]["mediaKind"], "Movie");
    }
}
