//! Benchmark for draw and pull performance.
//!
//! TARGET: 1,000,000 draws per second
//!
//! Run with: cargo bench --package kapsel_core --bench draw_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use kapsel_core::{
    draw_index, Banner, Credits, DrawMode, Item, PlayerAccount, Rarity, RarityWeights,
    RefundFraction,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_pool() -> (Vec<Item>, RarityWeights) {
    let weights = RarityWeights::from_entries([
        (Rarity::Common, 70),
        (Rarity::Rare, 25),
        (Rarity::UltraRare, 5),
    ])
    .expect("weights are valid");

    let mut pool = Vec::new();
    for i in 0..40 {
        pool.push(Item::new(format!("common_{i}"), Rarity::Common));
    }
    for i in 0..15 {
        pool.push(Item::new(format!("rare_{i}"), Rarity::Rare));
    }
    for i in 0..5 {
        pool.push(Item::new(format!("ultra_{i}"), Rarity::UltraRare));
    }
    (pool, weights)
}

fn bench_banner(mode: DrawMode) -> Banner {
    let (pool, weights) = bench_pool();
    let mut banner = Banner::new("bench", Credits::new(1000), RefundFraction::HALF, weights)
        .expect("banner config is valid");
    banner.set_draw_mode(mode);
    for item in pool {
        banner.add_item(item).expect("tier is weighted");
    }
    banner
}

fn benchmark_single_draw(c: &mut Criterion) {
    let (pool, weights) = bench_pool();
    let mut rng = ChaCha8Rng::seed_from_u64(0xBEEF);

    c.bench_function("single_draw_legacy", |b| {
        b.iter(|| {
            black_box(draw_index(
                black_box(&pool),
                black_box(&weights),
                DrawMode::Legacy,
                &mut rng,
            ))
        });
    });

    c.bench_function("single_draw_proportional", |b| {
        b.iter(|| {
            black_box(draw_index(
                black_box(&pool),
                black_box(&weights),
                DrawMode::Proportional,
                &mut rng,
            ))
        });
    });
}

fn benchmark_million_draws(c: &mut Criterion) {
    let (pool, weights) = bench_pool();

    let mut group = c.benchmark_group("million_draws");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_proportional", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(0xFACE);
        b.iter(|| {
            for _ in 0..1_000_000u32 {
                black_box(
                    draw_index(&pool, &weights, DrawMode::Proportional, &mut rng)
                        .expect("pool is populated"),
                );
            }
        });
    });

    group.finish();
}

fn benchmark_full_pull(c: &mut Criterion) {
    let banner = bench_banner(DrawMode::Proportional);
    let mut account = PlayerAccount::new(1, Credits::new(i64::MAX / 2));
    let mut rng = ChaCha8Rng::seed_from_u64(0xD1CE);

    c.bench_function("full_pull_transaction", |b| {
        b.iter(|| {
            black_box(
                banner
                    .pull(&mut account, &mut rng)
                    .expect("pull succeeds"),
            )
        });
    });
}

fn benchmark_simulation(c: &mut Criterion) {
    let banner = bench_banner(DrawMode::Proportional);

    c.bench_function("simulate_100k", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(0xCAFE);
        b.iter(|| {
            black_box(
                banner
                    .simulate(100_000, &mut rng)
                    .expect("pool is populated"),
            )
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_draw,
    benchmark_million_draws,
    benchmark_full_pull,
    benchmark_simulation
);
criterion_main!(benches);
