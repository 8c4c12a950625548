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
//! Benchmarks comparing the three component storage layouts
//!
//! These benchmarks measure:
//! - Insert throughput into an empty storage
//! - Checked random access
//! - Bulk iteration over live payloads
//! - Removal churn followed by re-insertion

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ecs_core::ecs::components::Position;
use ecs_core::ecs::{ComponentStorage, DenseStorage, HashMapStorage, VecStorage};
use ecs_core::Entity;

const SIZES: [usize; 3] = [100, 1000, 10000];

fn filled<S: ComponentStorage<Component = Position> + Default>(count: usize) -> S {
    let mut storage = S::default();
    for i in 0..count {
        let entity = Entity::new(i as u32, 0);
        storage.insert(entity, Position::new(i as f64, i as f64 * 2.0, i as f64 * 3.0));
    }
    storage
}

fn bench_layouts<F>(c: &mut Criterion, group_name: &str, bench: F)
where
    F: Fn(&mut criterion::Bencher<'_>, usize, &str),
{
    let mut group = c.benchmark_group(group_name);
    for &count in SIZES.iter() {
        group.throughput(Throughput::Elements(count as u64));
        for layout in ["Vec", "Dense", "HashMap"] {
            group.bench_with_input(BenchmarkId::new(layout, count), &count, |b, &count| {
                bench(b, count, layout)
            });
        }
    }
    group.finish();
}

/// Benchmark: Insert N entities into storage
fn bench_storage_insert(c: &mut Criterion) {
    fn run<S>(b: &mut criterion::Bencher<'_>, count: usize)
    where
        S: ComponentStorage<Component = Position> + Default,
    {
        b.iter(|| black_box(filled::<S>(count)));
    }

    bench_layouts(c, "storage_insert", |b, count, layout| match layout {
        "Vec" => run::<VecStorage<Position>>(b, count),
        "Dense" => run::<DenseStorage<Position>>(b, count),
        _ => run::<HashMapStorage<Position>>(b, count),
    });
}

/// Benchmark: Checked random access (get) performance
fn bench_storage_random_access(c: &mut Criterion) {
    fn run<S>(b: &mut criterion::Bencher<'_>, count: usize)
    where
        S: ComponentStorage<Component = Position> + Default,
    {
        let storage = filled::<S>(count);
        // Stride through slots so consecutive lookups miss the cache line
        let order: Vec<u32> = (0..count).map(|i| ((i * 7919) % count) as u32).collect();
        b.iter(|| {
            let mut sum = 0.0;
            for &slot in &order {
                if let Ok(pos) = storage.get(Entity::new(slot, 0)) {
                    sum += pos.0.x + pos.0.y + pos.0.z;
                }
            }
            black_box(sum)
        });
    }

    bench_layouts(c, "storage_random_access", |b, count, layout| match layout {
        "Vec" => run::<VecStorage<Position>>(b, count),
        "Dense" => run::<DenseStorage<Position>>(b, count),
        _ => run::<HashMapStorage<Position>>(b, count),
    });
}

/// Benchmark: Sequential iteration over all components
fn bench_storage_iteration(c: &mut Criterion) {
    fn run<S>(b: &mut criterion::Bencher<'_>, count: usize)
    where
        S: ComponentStorage<Component = Position> + Default,
    {
        let storage = filled::<S>(count);
        b.iter(|| {
            let sum: f64 = storage.values().map(|pos| pos.0.x).sum();
            black_box(sum)
        });
    }

    bench_layouts(c, "storage_iteration", |b, count, layout| match layout {
        "Vec" => run::<VecStorage<Position>>(b, count),
        "Dense" => run::<DenseStorage<Position>>(b, count),
        _ => run::<HashMapStorage<Position>>(b, count),
    });
}

/// Benchmark: Remove every other entity, then refill the holes
fn bench_storage_churn(c: &mut Criterion) {
    fn run<S>(b: &mut criterion::Bencher<'_>, count: usize)
    where
        S: ComponentStorage<Component = Position> + Default,
    {
        b.iter_batched(
            || filled::<S>(count),
            |mut storage| {
                for slot in (0..count as u32).step_by(2) {
                    let _ = storage.remove(Entity::new(slot, 0));
                }
                for slot in (0..count as u32).step_by(2) {
                    storage.insert(Entity::new(slot, 1), Position::default());
                }
                black_box(storage)
            },
            criterion::BatchSize::SmallInput,
        );
    }

    bench_layouts(c, "storage_churn", |b, count, layout| match layout {
        "Vec" => run::<VecStorage<Position>>(b, count),
        "Dense" => run::<DenseStorage<Position>>(b, count),
        _ => run::<HashMapStorage<Position>>(b, count),
    });
}

criterion_group!(
    benches,
    bench_storage_insert,
    bench_storage_random_access,
    bench_storage_iteration,
    bench_storage_churn
);
criterion_main!(benches);
