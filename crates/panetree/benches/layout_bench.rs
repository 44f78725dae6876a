use criterion::{Criterion, black_box, criterion_group, criterion_main};
use panetree::{PaneNode, SplitAxis, build_grid_tree};

fn bench_structural_ops(c: &mut Criterion) {
    let slots: Vec<String> = (0..9).map(|i| format!("pane-{i}")).collect();
    let tree = build_grid_tree(&slots);

    c.bench_function("split_leaf_3x3", |b| {
        b.iter(|| PaneNode::split_leaf(black_box(&tree), "pane-4", "extra", SplitAxis::Vertical));
    });
    c.bench_function("remove_leaf_3x3", |b| {
        b.iter(|| PaneNode::remove_leaf(black_box(&tree), "pane-4"));
    });
    c.bench_function("slot_ids_3x3", |b| {
        b.iter(|| black_box(&tree).slot_ids());
    });
    c.bench_function("state_hash_3x3", |b| {
        b.iter(|| black_box(&tree).state_hash());
    });
}

fn bench_build_grid(c: &mut Criterion) {
    let slots: Vec<String> = (0..9).map(|i| format!("pane-{i}")).collect();
    c.bench_function("build_grid_tree_9", |b| {
        b.iter(|| build_grid_tree(black_box(&slots)));
    });
}

criterion_group!(benches, bench_structural_ops, bench_build_grid);
criterion_main!(benches);
