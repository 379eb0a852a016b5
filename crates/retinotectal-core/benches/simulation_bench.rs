use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use retinotectal_core::{build_simulation, ExperimentConfig, SubstrateType};
use std::time::Duration;

fn bench_simulation_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(5));

    let steps: usize = std::env::var("RT_BENCH_STEPS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(32);

    for &cones in &[10_usize, 50, 200] {
        group.bench_function(format!("steps{steps}_cones{cones}"), |b| {
            b.iter_batched(
                || {
                    let mut config = ExperimentConfig::preset(SubstrateType::ContinuousGradients);
                    config.substrate.rows = 200;
                    config.growth_cones.count = cones;
                    config.simulation.num_steps = steps;
                    build_simulation(&config).expect("bench config is valid")
                },
                |mut simulation| {
                    for _ in 0..steps {
                        simulation.step();
                    }
                    simulation
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_simulation_steps);
criterion_main!(benches);
