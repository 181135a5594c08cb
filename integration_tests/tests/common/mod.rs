use std::path::PathBuf;
use std::sync::Once;

use hexmap_core::{
    generate_map, load_generator_config_from_env, GenerationReport, HexGrid, SearchContext,
};

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_generator_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test generator config at {}",
            config_path.display()
        );

        std::env::set_var(hexmap_core::GENERATOR_CONFIG_ENV, &config_path);
    });
}

/// Generate a map from the fixture config.
pub fn generated_map(width: u32, height: u32) -> (HexGrid, SearchContext, GenerationReport) {
    ensure_test_config();
    let (config, source) = load_generator_config_from_env();
    assert!(source.is_some(), "fixture config should be picked up");

    let mut grid = HexGrid::new(1, 1).expect("grid");
    let mut ctx = SearchContext::new();
    let report =
        generate_map(&mut grid, &mut ctx, width, height, &config).expect("generation succeeds");
    (grid, ctx, report)
}

/// Land cells in index order.
#[allow(dead_code)]
pub fn land_cells(grid: &HexGrid) -> Vec<usize> {
    grid.cells()
        .iter()
        .filter(|cell| !cell.is_underwater())
        .map(|cell| cell.index())
        .collect()
}
