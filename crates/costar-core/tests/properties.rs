//! Property tests over randomly generated bipartite graphs.

use std::collections::HashSet;
use std::sync::Arc;

use costar_core::model::{Media, MediaKind, Person};
use costar_core::path::{NodeType, PathfindingEngine};
use costar_core::store::GraphStore;
use proptest::prelude::*;

const PEOPLE: usize = 12;
const MEDIA: usize = 8;

fn person_id(i: usize) -> String {
    format!("p{i}")
}

fn media_id(i: usize) -> String {
    format!("m{i}")
}

/// A list of (person, media, role) triples over a fixed id space.
fn arb_links() -> impl Strategy<Value = Vec<(usize, usize, String)>> {
    prop::collection::vec((0..PEOPLE, 0..MEDIA, "[a-z]{1,6}"), 0..40)
}

fn build_store(links: &[(usize, usize, String)]) -> Arc<GraphStore> {
    let store = GraphStore::new();
    for i in 0..PEOPLE {
        store
            .add_person(Person::new(person_id(i), format!("Person {i:02}")))
            .expect("add person");
    }
    for i in 0..MEDIA {
        store
            .add_media(Media::new(media_id(i), format!("Media {i:02}"), MediaKind::Movie))
            .expect("add media");
    }
    for (p, m, role) in links {
        store
            .add_connection(&person_id(*p), &media_id(*m), role)
            .expect("connect");
    }
    Arc::new(store)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn links_are_mirrored_with_first_role(links in arb_links()) {
        let store = build_store(&links);
        let mut first_role = std::collections::HashMap::new();
        for (p, m, role) in &links {
            first_role.entry((*p, *m)).or_insert_with(|| role.clone());
        }

        for ((p, m), role) in &first_role {
            let person = store.get_person(&person_id(*p)).expect("person");
            let media = store.get_media(&media_id(*m)).expect("media");
            prop_assert_eq!(&person.media[&media_id(*m)].role, role);
            prop_assert_eq!(&media.people[&person_id(*p)].role, role);
        }
        prop_assert_eq!(store.connection_count(), first_role.len());
    }

    #[test]
    fn path_degrees_are_even_and_bounded(
        links in arb_links(),
        from in 0..PEOPLE,
        to in 0..PEOPLE,
        max_depth in 1usize..6,
    ) {
        prop_assume!(from != to);
        let engine = PathfindingEngine::new(build_store(&links));

        if let Ok(found) = engine.shortest_path(&person_id(from), &person_id(to), max_depth) {
            prop_assert!(found.degrees > 0);
            prop_assert_eq!(found.degrees % 2, 0);
            prop_assert!(found.degrees <= 2 * max_depth);
            prop_assert_eq!(found.degrees, found.path.len() - 1);
            for (i, node) in found.path.iter().enumerate() {
                let expected = if i % 2 == 0 { NodeType::Person } else { NodeType::Media };
                prop_assert_eq!(node.node_type, expected);
            }
        }
    }

    #[test]
    fn same_person_always_fails(links in arb_links(), who in 0..PEOPLE) {
        let engine = PathfindingEngine::new(build_store(&links));
        prop_assert!(engine.shortest_path(&person_id(who), &person_id(who), 6).is_err());
    }

    #[test]
    fn neighborhoods_respect_degree_and_cap(
        links in arb_links(),
        start in 0..PEOPLE,
        degree in 1usize..=6,
        max_nodes in 1usize..30,
    ) {
        let engine = PathfindingEngine::new(build_store(&links));
        let hood = engine.neighbors(&person_id(start), degree, max_nodes).expect("neighbors");

        prop_assert!(hood.nodes.len() <= max_nodes);
        prop_assert_eq!(hood.truncated, hood.nodes.len() == max_nodes);
        for node in &hood.nodes {
            if node.node_type == NodeType::Person {
                prop_assert!(node.depth <= degree);
            }
        }

        let ids: HashSet<&str> = hood.nodes.iter().map(|n| n.id.as_str()).collect();
        prop_assert_eq!(ids.len(), hood.nodes.len());
        for edge in &hood.edges {
            prop_assert!(ids.contains(edge.source.as_str()));
            prop_assert!(ids.contains(edge.target.as_str()));
        }
    }

    #[test]
    fn listings_are_name_ordered(links in arb_links(), limit in 0usize..300, offset in 0usize..20) {
        let store = build_store(&links);

        let all = store.all_people(limit, offset);
        prop_assert!(all.len() <= limit.clamp(1, 200));
        prop_assert!(all.windows(2).all(|w| w[0].name <= w[1].name));

        let found = store.search_people("person", limit, offset);
        prop_assert!(found.len() <= limit.clamp(1, 100));
        prop_assert!(found.windows(2).all(|w| w[0].name <= w[1].name));
    }
}
