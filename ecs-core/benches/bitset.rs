// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks for the bitset primitives behind entity sets and queries
//!
//! These benchmarks measure:
//! - First-set-bit search on sparse and dense sets
//! - In-place AND of equally sized sets
//! - Walking set bits

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ecs_core::collections::DynamicBitset;
use ecs_core::{Entity, EntitySet};

fn bitset_with_stride(len: usize, stride: usize) -> DynamicBitset {
    let mut bits = DynamicBitset::new(len);
    for i in (0..len).step_by(stride) {
        let _ = bits.set(i);
    }
    bits
}

/// Benchmark: ffs when the only set bit is at the far end
fn bench_ffs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitset_ffs");
    for len in [1_000usize, 100_000] {
        let mut bits = DynamicBitset::new(len);
        let _ = bits.set(len - 1);
        group.bench_with_input(BenchmarkId::from_parameter(len), &bits, |b, bits| {
            b.iter(|| black_box(bits.ffs()))
        });
    }
    group.finish();
}

/// Benchmark: bitwise AND of two sets
fn bench_and(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitset_and");
    for len in [1_000usize, 100_000] {
        group.throughput(Throughput::Elements(len as u64));
        let lhs = bitset_with_stride(len, 2);
        let rhs = bitset_with_stride(len, 3);
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(&lhs & &rhs))
        });
    }
    group.finish();
}

/// Benchmark: iterate set bits at varying density
fn bench_iter_ones(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitset_iter_ones");
    for stride in [1usize, 8, 64] {
        let bits = bitset_with_stride(100_000, stride);
        group.throughput(Throughput::Elements(bits.count_ones() as u64));
        group.bench_with_input(BenchmarkId::new("stride", stride), &bits, |b, bits| {
            b.iter(|| black_box(bits.iter_ones().sum::<usize>()))
        });
    }
    group.finish();
}

/// Benchmark: entity set intersection including the generation pass
fn bench_entity_set_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_set_intersection");
    for count in [1_000u32, 100_000] {
        group.throughput(Throughput::Elements(count as u64));
        let lhs: EntitySet = (0..count).map(|slot| Entity::new(slot, 0)).collect();
        let rhs: EntitySet = (0..count)
            .step_by(2)
            .map(|slot| Entity::new(slot, slot % 4 / 2))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(&lhs & &rhs))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ffs,
    bench_and,
    bench_iter_ones,
    bench_entity_set_intersection
);
criterion_main!(benches);
