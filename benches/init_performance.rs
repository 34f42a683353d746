use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use terraflow::init::{
    boundary_shell, cylinder_mask, open_inflow_vent, terrain_boundary, wall_inflow, Heightmap,
};

fn benchmark_boundary_shell(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundary_shell");

    for grid_size in [32usize, 64, 127].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(grid_size),
            grid_size,
            |b, &grid_size| {
                b.iter(|| {
                    let mut mask = boundary_shell(grid_size + 2);
                    open_inflow_vent(&mut mask, grid_size);
                    black_box(mask);
                });
            },
        );
    }
    group.finish();
}

fn benchmark_terrain_boundary(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain_boundary");

    // Synthetic rolling terrain at heightmap resolutions near real inputs.
    let map = Heightmap {
        values: (0..256 * 256)
            .map(|i| {
                let x = (i % 256) as f32 / 256.0;
                let y = (i / 256) as f32 / 256.0;
                0.25 + 0.2 * (x * 12.0).sin() * (y * 9.0).cos()
            })
            .collect(),
        size_x: 256,
        size_y: 256,
    };

    for grid_size in [32usize, 64, 127].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(grid_size),
            grid_size,
            |b, &grid_size| {
                b.iter(|| {
                    let mut mask = terrain_boundary(&map, grid_size);
                    open_inflow_vent(&mut mask, grid_size);
                    black_box(mask);
                });
            },
        );
    }
    group.finish();
}

fn benchmark_field_fills(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_fills");
    let g = 64usize;

    group.bench_function("wall_inflow_64", |b| {
        b.iter(|| black_box(wall_inflow(2.0, g + 1, g, g)));
    });

    group.bench_function("cylinder_mask_64", |b| {
        b.iter(|| black_box(cylinder_mask(1.0, g, g, g, 10)));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_boundary_shell,
    benchmark_terrain_boundary,
    benchmark_field_fills
);
criterion_main!(benches);
