use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hexmap_core::{generate_map, GeneratorConfig, HexGrid, SearchContext};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_map");
    group.sample_size(20);

    for (width, height) in [(40u32, 30u32), (80, 60), (120, 90)] {
        let config = GeneratorConfig {
            seed: Some(119304647),
            ..GeneratorConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::new("size", format!("{width}x{height}")),
            &(width, height),
            |b, &(width, height)| {
                let mut grid = HexGrid::new(1, 1).unwrap();
                let mut ctx = SearchContext::new();
                b.iter(|| {
                    generate_map(&mut grid, &mut ctx, width, height, &config).unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(generate_benches, bench_generate);
criterion_main!(generate_benches);
