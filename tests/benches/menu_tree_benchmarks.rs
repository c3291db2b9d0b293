//! Menu tree benchmarks: parsing, flattening and grouping wide and deep
//! trees.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use md_01_menu_tree::{group_consecutive, MenuForest};
use serde_json::{json, Value};

/// `roots` top-level menus, each with `width` sections of `width` leaves.
fn wide_tree(roots: usize, width: usize) -> Value {
    let menus: Vec<Value> = (0..roots)
        .map(|r| {
            let sections: Vec<Value> = (0..width)
                .map(|s| {
                    let leaves: Vec<Value> = (0..width)
                        .map(|l| json!({ "name": format!("leaf-{}-{}-{}", r, s, l) }))
                        .collect();
                    json!({ "name": format!("section-{}-{}", r, s), "items": leaves })
                })
                .collect();
            json!({ "name": format!("menu-{}", r), "items": sections })
        })
        .collect();
    Value::Array(menus)
}

/// A single chain `depth` levels deep.
fn deep_tree(depth: usize) -> Value {
    let mut node = json!({ "name": "leaf" });
    for level in (0..depth - 1).rev() {
        node = json!({ "name": format!("level-{}", level), "items": [node] });
    }
    json!([node])
}

fn bench_parse_and_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("menu_tree/flatten");
    for width in [4usize, 16, 32] {
        let tree = wide_tree(8, width);
        group.bench_with_input(BenchmarkId::new("wide", width), &tree, |b, tree| {
            b.iter(|| {
                let forest = MenuForest::parse(black_box(tree)).expect("valid tree");
                black_box(forest.flatten())
            })
        });
    }

    let deep = deep_tree(60);
    group.bench_function("deep_60", |b| {
        b.iter(|| {
            let forest = MenuForest::parse(black_box(&deep)).expect("valid tree");
            black_box(forest.flatten())
        })
    });
    group.finish();
}

fn bench_string_wrapped(c: &mut Criterion) {
    let wrapped = Value::String(wide_tree(8, 16).to_string());
    c.bench_function("menu_tree/from_stored_string", |b| {
        b.iter(|| MenuForest::from_stored(black_box(&wrapped)).expect("valid tree"))
    });
}

fn bench_grouping(c: &mut Criterion) {
    let pairs = MenuForest::parse(&wide_tree(32, 16))
        .expect("valid tree")
        .flatten();
    c.bench_function("menu_tree/group_consecutive", |b| {
        b.iter(|| group_consecutive(black_box(pairs.clone()), |p| Some(p.first_menu.as_str())))
    });
}

criterion_group!(benches, bench_parse_and_flatten, bench_string_wrapped, bench_grouping);
criterion_main!(benches);
