//! Benchmarks for rule application, system updates and rasterization.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use drift::prelude::*;

fn scattered(count: usize) -> System {
    let mut rng = StdRng::seed_from_u64(7);
    let particles: Vec<(Vector, Vector)> = (0..count)
        .map(|_| {
            (
                Vector::xy(rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0)),
                Vector::xy(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)),
            )
        })
        .collect();

    System::new(
        SystemConfig::new()
            .with_target_count(count)
            .with_spawner(move |i| {
                let (position, velocity) = particles[i % particles.len()];
                Particle::at(position, velocity)
            })
            .with_rule(Rule::gravity(2.0))
            .with_rule(Rule::resistance(0.1))
            .with_rule(Rule::magnet(-1000.0, Vector::xy(320.0, 240.0)))
            .with_rule(Rule::wall_x(0.0))
            .with_rule(Rule::wall_x(640.0))
            .with_rule(Rule::wall_y(0.0))
            .with_rule(Rule::wall_y(480.0)),
    )
}

fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_apply");

    let cases = [
        ("gravity", Rule::gravity(9.8)),
        ("resistance", Rule::resistance(0.1)),
        ("attract_origin", Rule::attract(2.0, Target::Origin)),
        ("magnet", Rule::magnet(-100.0, Vector::xy(10.0, 10.0))),
        ("wall", Rule::wall_y(100.0)),
    ];

    for (name, rule) in cases {
        group.bench_function(name, |b| {
            let mut particle = Particle::at(Vector::xy(50.0, 99.0), Vector::xy(3.0, 40.0));
            b.iter(|| rule.apply(black_box(&mut particle), 0, black_box(1.0 / 60.0)))
        });
    }

    group.finish();
}

fn bench_system_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("system_update");

    for count in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("particles", count), &count, |b, &count| {
            let mut system = scattered(count);
            b.iter(|| system.update(black_box(1.0 / 60.0)))
        });
    }

    group.finish();
}

fn bench_canvas_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas_draw");

    for trail in [0, 10] {
        group.bench_with_input(BenchmarkId::new("trail", trail), &trail, |b, &trail| {
            let mut system = scattered(1_000);
            for particle in system.particles_mut() {
                particle.set_trail_length(trail);
            }
            for _ in 0..trail {
                system.update(1.0 / 60.0);
            }
            let mut canvas = Canvas::new(640, 480).unwrap();
            b.iter(|| {
                canvas.clear();
                system.draw(&mut canvas);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rules, bench_system_update, bench_canvas_draw);
criterion_main!(benches);
