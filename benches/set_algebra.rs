use std::hint::black_box;

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tempfile::TempDir;
use venndex::ops::{self, SetOp};
use venndex::{ContentHash, Entry, Store};

fn hash(i: usize) -> ContentHash {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&(i as u64).to_be_bytes());
    ContentHash::from_bytes(bytes)
}

/// Store with indexes `a` and `b` of `size` entries each, overlapping by half
fn generate_store(size: usize) -> (TempDir, Store) {
    let dir = TempDir::new().unwrap();
    let store = Store::initialize(dir.path().join("bench.db")).unwrap();
    store
        .write(|tx| {
            let mut a = tx.namespace("a")?;
            for i in 0..size {
                let entry = Entry::new(1, Utc::now(), "text/plain").with_path(format!("/a/{i}"));
                a.put(&hash(i), &entry)?;
            }
            drop(a);

            let mut b = tx.namespace("b")?;
            for i in size / 2..size + size / 2 {
                let entry = Entry::new(1, Utc::now(), "text/plain").with_path(format!("/b/{i}"));
                b.put(&hash(i), &entry)?;
            }
            Ok(())
        })
        .unwrap();
    (dir, store)
}

fn bench_set_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_algebra");
    group.sample_size(20);

    for size in [1_000, 10_000].iter() {
        let (_dir, store) = generate_store(*size);

        group.throughput(Throughput::Elements(*size as u64 * 2));
        for op in [SetOp::Union, SetOp::Intersection, SetOp::Difference] {
            group.bench_with_input(BenchmarkId::new(op.name(), size), size, |b, _| {
                b.iter(|| {
                    let count = ops::apply(&store, op, "target", "a", "b").unwrap();
                    store.delete("target").unwrap();
                    black_box(count)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_set_ops);
criterion_main!(benches);
