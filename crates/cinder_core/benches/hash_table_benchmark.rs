//! # Hash Table Benchmark
//!
//! Compares the fixed-bucket table against `std::collections::HashMap`:
//! 1. Insertion through `find_or_add`
//! 2. Lookup of present and absent keys
//! 3. Full traversal
//!
//! The bucket count is swept to show how chain length affects each.

#![allow(missing_docs)]

use std::collections::HashMap;

use cinder_core::containers::{Fnv1aHashFunc, HashTable, SaxHashFunc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const KEY_COUNT: usize = 10_000;
const SEED: u64 = 0x00C1_DE55;

/// Deterministic asset-path style keys in shuffled order.
fn generate_keys(count: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut keys: Vec<String> = (0..count)
        .map(|index| format!("assets/textures/tile_{index:05}.png"))
        .collect();
    keys.shuffle(&mut rng);
    keys
}

fn fill<H: cinder_core::HashFunction<String> + Default>(
    bucket_count: usize,
    keys: &[String],
) -> HashTable<String, usize, H> {
    let mut table = HashTable::new(bucket_count);
    for (index, key) in keys.iter().enumerate() {
        *table.find_or_add(key.clone()) = index;
    }
    table
}

// =============================================================================
// INSERTION
// =============================================================================

fn bench_insert(c: &mut Criterion) {
    let keys = generate_keys(KEY_COUNT);
    let mut group = c.benchmark_group("insert_10k");

    for bucket_count in [256, 4_096, 16_384] {
        group.bench_with_input(
            BenchmarkId::new("fnv1a", bucket_count),
            &bucket_count,
            |b, &bucket_count| {
                b.iter(|| black_box(fill::<Fnv1aHashFunc>(bucket_count, &keys).len()));
            },
        );
    }

    group.bench_function("std_hashmap", |b| {
        b.iter(|| {
            let mut map: HashMap<String, usize> = HashMap::new();
            for (index, key) in keys.iter().enumerate() {
                *map.entry(key.clone()).or_default() = index;
            }
            black_box(map.len())
        });
    });

    group.finish();
}

// =============================================================================
// LOOKUP
// =============================================================================

fn bench_lookup(c: &mut Criterion) {
    let keys = generate_keys(KEY_COUNT);
    let absent: Vec<String> = keys.iter().map(|key| format!("{key}.missing")).collect();
    let mut group = c.benchmark_group("lookup_10k");

    for bucket_count in [256, 4_096, 16_384] {
        let fnv = fill::<Fnv1aHashFunc>(bucket_count, &keys);
        group.bench_with_input(BenchmarkId::new("fnv1a_hit", bucket_count), &fnv, |b, table| {
            b.iter(|| {
                let found = keys.iter().filter(|key| table.contains_key(key.as_str())).count();
                black_box(found)
            });
        });
        group.bench_with_input(BenchmarkId::new("fnv1a_miss", bucket_count), &fnv, |b, table| {
            b.iter(|| {
                let found = absent.iter().filter(|key| table.contains_key(key.as_str())).count();
                black_box(found)
            });
        });
    }

    // SAX clusters similar keys; this shows the cost of a weak hash.
    let sax = fill::<SaxHashFunc>(4_096, &keys);
    group.bench_function("sax_hit/4096", |b| {
        b.iter(|| {
            let found = keys.iter().filter(|key| sax.contains_key(key.as_str())).count();
            black_box(found)
        });
    });

    let map: HashMap<String, usize> = keys.iter().cloned().zip(0..).collect();
    group.bench_function("std_hashmap_hit", |b| {
        b.iter(|| {
            let found = keys.iter().filter(|key| map.contains_key(key.as_str())).count();
            black_box(found)
        });
    });

    group.finish();
}

// =============================================================================
// TRAVERSAL
// =============================================================================

fn bench_traversal(c: &mut Criterion) {
    let keys = generate_keys(KEY_COUNT);
    let mut group = c.benchmark_group("traverse_10k");

    for bucket_count in [256, 16_384, 262_144] {
        let table = fill::<Fnv1aHashFunc>(bucket_count, &keys);
        group.bench_with_input(BenchmarkId::new("iter", bucket_count), &table, |b, table| {
            b.iter(|| black_box(table.values().sum::<usize>()));
        });
        group.bench_with_input(BenchmarkId::new("cursor", bucket_count), &table, |b, table| {
            b.iter(|| {
                let mut total = 0usize;
                let mut cursor = table.begin();
                while cursor != table.end() {
                    total += table.at(cursor).1;
                    cursor = table.advance(cursor);
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_traversal);
criterion_main!(benches);
