use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hexmap_core::{
    find_path, generate_map, visible_cells, GeneratorConfig, HexGrid, SearchContext,
};

fn generated(width: u32, height: u32) -> (HexGrid, SearchContext) {
    let mut grid = HexGrid::new(1, 1).unwrap();
    let mut ctx = SearchContext::new();
    let config = GeneratorConfig {
        seed: Some(7),
        ..GeneratorConfig::default()
    };
    generate_map(&mut grid, &mut ctx, width, height, &config).unwrap();
    (grid, ctx)
}

/// Land cells from opposite corners of the map, so paths cross most of it.
fn far_apart(grid: &HexGrid) -> (usize, usize) {
    let land = |i: &usize| !grid.cell(*i).is_underwater();
    let from = (0..grid.cell_count()).find(land).unwrap_or(0);
    let to = (0..grid.cell_count()).rev().find(land).unwrap_or(0);
    (from, to)
}

fn bench_find_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");
    for (width, height) in [(40u32, 30u32), (80, 60)] {
        let (mut grid, mut ctx) = generated(width, height);
        let (from, to) = far_apart(&grid);
        group.bench_with_input(
            BenchmarkId::new("size", format!("{width}x{height}")),
            &(from, to),
            |b, &(from, to)| b.iter(|| find_path(&mut grid, &mut ctx, from, to, 24)),
        );
    }
    group.finish();
}

fn bench_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_cells");
    let (mut grid, mut ctx) = generated(80, 60);
    let center = grid.index_at_offset(40, 30).unwrap_or(0);
    for range in [3u32, 6, 12] {
        group.bench_with_input(BenchmarkId::new("range", range), &range, |b, &range| {
            b.iter(|| visible_cells(&mut grid, &mut ctx, center, range))
        });
    }
    group.finish();
}

criterion_group!(search_benches, bench_find_path, bench_visibility);
criterion_main!(search_benches);
