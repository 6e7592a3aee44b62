//! Coalescing throughput on buffer sizes the engine sees in practice:
//! tens of thousands of events per flush cycle.

use std::hint::black_box;

use canopy_events::{EventInput, NodeRef, TreeEventBuffer, TreeEventKind};
use canopy_testkit::MockTree;
use criterion::{Criterion, criterion_group, criterion_main};

const EVENTS: usize = 10_000;

fn bench_single_parent_inserts(c: &mut Criterion) {
    let mut tree = MockTree::new();
    tree.node("P");
    let ids: Vec<_> = (0..EVENTS).map(|i| tree.node(&format!("c{i}"))).collect();
    let parent = tree.node_ref("P");

    c.bench_function("coalesce_10k_single_parent_inserts", |b| {
        b.iter(|| {
            let mut buffer = TreeEventBuffer::new();
            for &id in &ids {
                buffer
                    .add(
                        &tree,
                        EventInput::with_parent(
                            TreeEventKind::Inserted,
                            parent,
                            vec![NodeRef::Concrete(id)],
                        ),
                    )
                    .unwrap();
            }
            let coalesced = buffer.consume_and_coalesce(&tree);
            assert_eq!(coalesced.len(), 1);
            black_box(coalesced)
        });
    });
}

fn bench_insert_update_delete_churn(c: &mut Criterion) {
    let mut tree = MockTree::new();
    tree.node("P");
    let ids: Vec<_> = (0..EVENTS / 2)
        .map(|i| tree.node(&format!("c{i}")))
        .collect();
    let parent = tree.node_ref("P");

    c.bench_function("coalesce_10k_insert_update_delete_churn", |b| {
        b.iter(|| {
            let mut buffer = TreeEventBuffer::new();
            for &id in &ids {
                buffer
                    .add(
                        &tree,
                        EventInput::with_parent(
                            TreeEventKind::Inserted,
                            parent,
                            vec![NodeRef::Concrete(id)],
                        ),
                    )
                    .unwrap();
                buffer
                    .add(
                        &tree,
                        EventInput::new(TreeEventKind::Updated, vec![NodeRef::Concrete(id)]),
                    )
                    .unwrap();
            }
            // Half the inserted nodes disappear again within the cycle.
            buffer
                .add(
                    &tree,
                    EventInput::with_parent(
                        TreeEventKind::Deleted,
                        parent,
                        ids[..ids.len() / 2]
                            .iter()
                            .copied()
                            .map(NodeRef::Concrete)
                            .collect(),
                    ),
                )
                .unwrap();
            black_box(buffer.consume_and_coalesce(&tree))
        });
    });
}

criterion_group!(
    benches,
    bench_single_parent_inserts,
    bench_insert_update_delete_churn
);
criterion_main!(benches);
