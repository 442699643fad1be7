use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use trail_sim::{
    diffuse, dissipate, seeded_rng, DiffusionConfig, DissipationConfig, Layer, Sandbox,
    SimulationConfig, TilePos, GRID_CELLS,
};

fn noisy_layer(seed: u64, fill: f64) -> Layer {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut layer = Layer::new();
    for index in 0..GRID_CELLS {
        if rng.gen_bool(fill) {
            if let Some(pos) = TilePos::from_index(index) {
                layer.set(pos, rng.gen());
            }
        }
    }
    layer
}

fn bench_layer_dynamics(c: &mut Criterion) {
    let mut group = c.benchmark_group("layer_dynamics");
    for fill in [0.1, 0.5, 1.0] {
        let layer = noisy_layer(7, fill);
        group.bench_with_input(BenchmarkId::new("diffuse", fill), &layer, |b, layer| {
            let mut rng = seeded_rng(1);
            b.iter_batched(
                || layer.clone(),
                |mut layer| diffuse(&mut layer, &DiffusionConfig::default(), &mut rng),
                BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("dissipate", fill), &layer, |b, layer| {
            b.iter_batched(
                || layer.clone(),
                |mut layer| dissipate(&mut layer, &DissipationConfig::default()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_sandbox_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("sandbox_tick");
    for agents in [10usize, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(agents), &agents, |b, &agents| {
            b.iter_batched(
                || {
                    let mut sandbox = Sandbox::demo(3, agents, SimulationConfig::builtin());
                    for _ in 0..50 {
                        sandbox.step();
                    }
                    sandbox
                },
                |mut sandbox| sandbox.step(),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layer_dynamics, bench_sandbox_tick);
criterion_main!(benches);
