//! Performance benchmarks for hierarchy reconciliation
//!
//! Run with: `cargo bench -p guacamole-import-core`
//!
//! These benchmarks measure:
//! - Snapshot tree building for parent-first, child-first and shuffled listings
//! - Path resolution of 1000 rows against an in-memory creation port

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use guacamole_import_core::remote::{GroupCreationPort, RemoteError};
use guacamole_import_core::services::{PathResolver, TreeBuilder};
use guacamole_import_core::{GroupTree, SnapshotRecord, ROOT_ID};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Runtime;

/// Snapshot of `sites` sites, each with `racks` racks, listed parent-first
fn generate_snapshot(sites: usize, racks: usize) -> Vec<SnapshotRecord> {
    let mut records = Vec::with_capacity(sites * (racks + 1));
    for s in 0..sites {
        let site_id = format!("s{s}");
        records.push(SnapshotRecord::new(
            site_id.clone(),
            format!("DC{s}"),
            Some(ROOT_ID),
            "ORGANIZATIONAL",
        ));
        for r in 0..racks {
            records.push(SnapshotRecord::new(
                format!("s{s}r{r}"),
                format!("Rack{r}"),
                Some(site_id.as_str()),
                "ORGANIZATIONAL",
            ));
        }
    }
    records
}

/// Deterministic Fisher-Yates shuffle driven by a linear congruential generator
fn shuffle<T>(items: &mut [T], mut seed: u64) {
    for i in (1..items.len()).rev() {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let j = (seed >> 33) as usize % (i + 1);
        items.swap(i, j);
    }
}

/// Creation port that hands out sequential ids without any I/O
#[derive(Default)]
struct CountingPort {
    next: AtomicUsize,
}

#[async_trait]
impl GroupCreationPort for CountingPort {
    async fn create_group(&self, _name: &str, _parent_id: &str) -> Result<String, RemoteError> {
        Ok(format!("n{}", self.next.fetch_add(1, Ordering::Relaxed)))
    }
}

/// Benchmark snapshot tree building
///
/// The builder sorts by identifier before the first pass, so the three
/// listing orders should perform alike.
fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    let parent_first = generate_snapshot(50, 40);
    let mut child_first = parent_first.clone();
    child_first.reverse();
    let mut shuffled = parent_first.clone();
    shuffle(&mut shuffled, 42);

    for (label, records) in [
        ("parent_first", &parent_first),
        ("child_first", &child_first),
        ("shuffled", &shuffled),
    ] {
        group.bench_with_input(BenchmarkId::new(label, records.len()), records, |b, records| {
            let builder = TreeBuilder::default();
            b.iter(|| black_box(builder.build(records.clone(), Vec::new())));
        });
    }

    group.finish();
}

/// Benchmark resolving 1000 site paths whose sites and racks partly exist
fn bench_path_resolution(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let snapshot = TreeBuilder::default().build(generate_snapshot(10, 10), Vec::new());
    let sites: Vec<String> = (0..1000)
        .map(|i| format!("DC{}/Rack{}/Shelf{}", i % 20, i % 10, i % 5))
        .collect();

    let mut group = c.benchmark_group("path_resolution");
    group.sample_size(20);

    group.bench_function("1000_rows", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let mut total = std::time::Duration::ZERO;
                for _ in 0..iters {
                    let port = CountingPort::default();
                    let mut tree: GroupTree = snapshot.tree.clone();

                    let start = std::time::Instant::now();
                    let resolver = PathResolver::new(&port);
                    for site in &sites {
                        black_box(resolver.resolve(&mut tree, site).await.unwrap());
                    }
                    total += start.elapsed();
                }
                total
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tree_build, bench_path_resolution);
criterion_main!(benches);
