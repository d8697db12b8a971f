//! Benchmarks for FlintKV store operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use flintkv::Store;
use tempfile::TempDir;

const N: usize = 1_000;
const VAL_SIZE: usize = 100;

fn store_set(c: &mut Criterion) {
    c.bench_function("store_set_1k", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let store = Store::open_path(dir.path().join("bench.db")).unwrap();
                (dir, store)
            },
            |(_dir, store)| {
                for i in 0..N {
                    let key = format!("k{:06}", i).into_bytes();
                    store.set(&key, &vec![b'x'; VAL_SIZE]).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn store_get(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let store = Store::open_path(dir.path().join("bench.db")).unwrap();
    for i in 0..N {
        let key = format!("k{:06}", i).into_bytes();
        store.set(&key, &vec![b'x'; VAL_SIZE]).unwrap();
    }

    c.bench_function("store_get_1k", |b| {
        b.iter(|| {
            for i in 0..N {
                let key = format!("k{:06}", i).into_bytes();
                criterion::black_box(store.get(&key).unwrap());
            }
        });
    });
}

fn store_open_replay(c: &mut Criterion) {
    // Open cost is dominated by the full-log replay, so pre-build a log
    // with history: every key written twice, half of them tombstoned.
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bench.db");
    {
        let store = Store::open_path(&path).unwrap();
        for round in 0u8..2 {
            for i in 0..N {
                let key = format!("k{:06}", i).into_bytes();
                store.set(&key, &vec![b'x' + round; VAL_SIZE]).unwrap();
            }
        }
        for i in 0..N / 2 {
            store.delete(format!("k{:06}", i).as_bytes()).unwrap();
        }
        store.close().unwrap();
    }

    c.bench_function("store_open_replay_2k_records", |b| {
        b.iter(|| {
            criterion::black_box(Store::open_path(&path).unwrap());
        });
    });
}

fn store_polish(c: &mut Criterion) {
    c.bench_function("store_polish_1k", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let store = Store::open_path(dir.path().join("bench.db")).unwrap();
                for i in 0..N {
                    let key = format!("k{:06}", i).into_bytes();
                    store.set(&key, &vec![b'x'; VAL_SIZE]).unwrap();
                }
                for i in 0..N / 2 {
                    store.delete(format!("k{:06}", i).as_bytes()).unwrap();
                }
                (dir, store)
            },
            |(_dir, store)| {
                store.polish().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, store_set, store_get, store_open_replay, store_polish);
criterion_main!(benches);
