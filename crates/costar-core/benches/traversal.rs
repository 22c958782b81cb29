use std::hint::black_box;
use std::sync::Arc;

use costar_core::model::{Media, MediaKind, Person};
use costar_core::path::PathfindingEngine;
use costar_core::store::GraphStore;
use criterion::{Criterion, criterion_group, criterion_main};

/// A ring of people where each movie links two consecutive people, plus a
/// few shortcut movies so the BFS has real branching.
fn ring(people: usize) -> Arc<GraphStore> {
    let store = GraphStore::new();
    for i in 0..people {
        store
            .add_person(Person::new(format!("p{i}"), format!("Person {i}")))
            .expect("add person");
        store
            .add_media(Media::new(format!("m{i}"), format!("Movie {i}"), MediaKind::Movie))
            .expect("add media");
    }
    for i in 0..people {
        let next = (i + 1) % people;
        store
            .add_connection(&format!("p{i}"), &format!("m{i}"), "Actor")
            .expect("connect");
        store
            .add_connection(&format!("p{next}"), &format!("m{i}"), "Actor")
            .expect("connect");
        if i % 17 == 0 {
            let far = (i * 7 + 3) % people;
            store
                .add_connection(&format!("p{far}"), &format!("m{i}"), "Cameo")
                .expect("connect");
        }
    }
    Arc::new(store)
}

fn bench_traversal(c: &mut Criterion) {
    let engine = PathfindingEngine::new(ring(5_000));

    c.bench_function("shortest_path_ring_5k", |b| {
        b.iter(|| black_box(engine.shortest_path("p0", "p2500", 6)));
    });

    c.bench_function("neighbors_degree3_ring_5k", |b| {
        b.iter(|| black_box(engine.neighbors("p0", 3, 1_000)));
    });
}

criterion_group!(benches, bench_traversal);
criterion_main!(benches);
