use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_tree::{AvlTree, Order};

const N: usize = 100_000;

fn build(values: &[i32]) -> AvlTree<i32, i32> {
    values.iter().map(|value| (*value, *value)).collect()
}

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        let mut tree: AvlTree<i32, i32> = AvlTree::new();
        b.iter(|| {
            for value in &values {
                let _ = tree.insert(*value, *value);
            }
        })
    });

    c.bench_function("tree_insert_sorted", |b| {
        b.iter_batched(
            AvlTree::<usize, usize>::new,
            |mut tree| {
                for value in 0..N {
                    let _ = tree.insert(value, value);
                }
                tree
            },
            BatchSize::LargeInput,
        )
    });

    let tree = build(&values);

    c.bench_function("tree_find", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.find(value).ok());
            }
        })
    });

    for (name, order) in [
        ("tree_iter_in_order", Order::InOrder),
        ("tree_iter_pre_order", Order::PreOrder),
        ("tree_iter_post_order", Order::PostOrder),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                for (k, v) in tree.iter(order) {
                    black_box((k, v));
                }
            })
        });
    }

    c.bench_function("tree_delete", |b| {
        b.iter_batched(
            || build(&values),
            |mut tree| {
                for value in &values {
                    let _ = tree.delete(value);
                }
                tree
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
