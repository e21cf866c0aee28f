//! # Tick Benchmark
//!
//! Compares the two removal strategies:
//! 1. Count-then-compact - branch-free batched pass, then a bounded compaction
//! 2. Swap-remove - deaths swapped with the tail during the pass
//!
//! Plus the full engine tick at the default spawner count.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use cinder_core::{AliveSet, EngineConfig, ParticleEngine, RemovalStrategy, Vec2};

const PARTICLE_COUNT: usize = 1_000_000;

/// Deterministic lifetimes so roughly `death_percent` of particles die in one
/// 16 ms step.
fn populated(strategy: RemovalStrategy, death_percent: u64) -> AliveSet {
    let mut alive = AliveSet::with_capacity(PARTICLE_COUNT, strategy);
    let mut state = 0x2545_F491_4F6C_DD1Du64;

    for i in 0..PARTICLE_COUNT {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let lifetime = if state % 100 < death_percent { 0.01 } else { 2.0 };
        let f = i as f32;
        alive.spawn_into(Vec2::new(f, f), Vec2::new(1.0, -1.0), lifetime);
    }
    alive
}

// =============================================================================
// ALIVE SET - REMOVAL STRATEGIES
// =============================================================================

fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_1M");
    group.sample_size(20);

    for death_percent in [0u64, 1, 10, 50] {
        for strategy in [RemovalStrategy::CountThenCompact, RemovalStrategy::SwapRemove] {
            let template = populated(strategy, death_percent);
            let id = BenchmarkId::new(format!("{strategy:?}"), format!("{death_percent}%_dying"));
            group.bench_function(id, |b| {
                b.iter_batched_ref(
                    || {
                        let mut alive = AliveSet::with_capacity(template.len(), strategy);
                        for row in template.iter() {
                            alive.spawn_into(Vec2::new(row.x, row.y), Vec2::new(row.vx, row.vy), row.lifetime);
                        }
                        alive
                    },
                    |alive| black_box(alive.integrate(0.016)),
                    BatchSize::LargeInput,
                );
            });
        }
    }
    group.finish();
}

// =============================================================================
// ENGINE - STEADY STATE
// =============================================================================

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");
    group.sample_size(20);

    for strategy in [RemovalStrategy::CountThenCompact, RemovalStrategy::SwapRemove] {
        let config = EngineConfig {
            removal: strategy,
            ..EngineConfig::default()
        };
        let Ok(mut engine) = ParticleEngine::new(&config) else {
            continue;
        };
        // Warm up to a populated steady state before measuring.
        for _ in 0..240 {
            let _ = engine.tick(0.016);
        }

        group.bench_function(format!("{strategy:?}_500k_spawners"), |b| {
            b.iter(|| black_box(engine.tick(black_box(0.016))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_integrate, bench_engine_tick);
criterion_main!(benches);
