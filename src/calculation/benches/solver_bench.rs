//! Benchmarks for the lifting-line solvers.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use formation_calc::constants::{FormationParams, LiftingLineConfig, RelaxationConfig};
use formation_calc::formation::FormationLiftingLine;
use formation_calc::fourier::{half_span_stations, odd_terms, FourierLiftingLine, WingGeometry};
use formation_calc::relaxation::FormationInterferenceSolver;
use formation_calc::sweep::{build_v_formation, AngleSweepConfig};
use formation_calc::vector::Vec3;
use formation_calc::wing::WingState;

/// Least-squares fit of a single wing at the default and coarse grids
fn bench_wing_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("WingState");

    for (label, config) in [("default", LiftingLineConfig::default()), ("coarse", LiftingLineConfig::coarse())] {
        let wing = WingState::with_config(10.0, 1.0, 5.0, Vec3::zero(), "bench", &config).unwrap();
        let neighbour =
            WingState::with_config(10.0, 1.0, 4.5, Vec3::new(-9.0, 8.0, 0.0), "neighbour", &config).unwrap();

        group.throughput(Throughput::Elements(config.station_count as u64));
        group.bench_function(BenchmarkId::new("fit_coefficients", label), |bencher| {
            bencher.iter(|| wing.fit_coefficients([&neighbour]).unwrap());
        });
    }

    group.finish();
}

/// Gauss-Seidel relaxation of V formations of increasing size
fn bench_relaxation(c: &mut Criterion) {
    let lifting = LiftingLineConfig::coarse();
    let mut group = c.benchmark_group("Relaxation");

    for count in [3usize, 5, 7] {
        let sweep = AngleSweepConfig {
            aircraft_count: count,
            ..AngleSweepConfig::default()
        };
        let wings = build_v_formation(5.0, &sweep, &lifting).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("relax", count), &wings, |bencher, wings| {
            bencher.iter(|| {
                let mut solver = FormationInterferenceSolver::new(wings.clone(), RelaxationConfig::default()).unwrap();
                solver.relax().unwrap()
            });
        });
    }

    group.finish();
}

/// Exact Fourier solve and the sequential formation model built on it
fn bench_fourier(c: &mut Criterion) {
    let geometry = WingGeometry::rectangular(8.0, 10.0, 0.0).unwrap();
    let alpha = 5f64.to_radians();
    let mut group = c.benchmark_group("Fourier");

    for harmonics in [4usize, 8, 16] {
        let stations = half_span_stations(harmonics);
        let terms = odd_terms(harmonics);

        group.bench_function(BenchmarkId::new("solve", harmonics), |bencher| {
            bencher.iter(|| {
                let mut solver = FourierLiftingLine::new(geometry.clone());
                solver.solve(alpha, &stations, &terms).unwrap();
                solver.lift_coefficient().unwrap()
            });
        });
    }

    let stations = half_span_stations(4);
    let terms = odd_terms(4);
    group.bench_function("solve_formation_3", |bencher| {
        bencher.iter(|| {
            let mut formation =
                FormationLiftingLine::new(geometry.clone(), 3, FormationParams::default()).unwrap();
            formation.solve_formation(alpha, &stations, &terms, &[9.0, 9.0]).unwrap();
            formation.results()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_wing_fit, bench_relaxation, bench_fourier);
criterion_main!(benches);
