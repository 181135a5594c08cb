//! Procedural map generation.
//!
//! [`generate_map`] rebuilds the grid and runs the stages in a fixed order,
//! each mutating the cell store in place:
//!
//! 1. regions: pick the rectangles land chunks are seeded in
//! 2. land: raise and sink chunks until the land budget is spent
//! 3. erosion: flatten steep cells onto lower neighbors
//! 4. climate: simulate the water cycle to get per-cell moisture
//! 5. rivers: grow rivers downhill from high, wet origins
//! 6. terrain: classify every cell from temperature, moisture and elevation
//!
//! All randomness comes from one ChaCha stream seeded from the config, so a
//! fixed seed, size and parameter set always yields the same map.

mod biomes;
mod climate;
mod erosion;
mod land;
mod noise;
mod regions;
mod rivers;

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;

use crate::generator_config::{ConfigError, GeneratorConfig};
use crate::grid::{GridError, HexGrid, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::search::SearchContext;

pub use climate::{ClimateData, CLIMATE_CYCLES};
pub use erosion::is_erodible;
pub use land::LAND_ROUND_LIMIT;
pub use regions::{create_regions, MapRegion};

#[derive(Debug, Error)]
pub enum MapGenError {
    #[error("unsupported map size {width}x{height}: sides must be positive multiples of 5")]
    UnsupportedDimensions { width: u32, height: u32 },
    #[error("map size {width}x{height} leaves no room for land regions inside the borders")]
    RegionsTooSmall { width: u32, height: u32 },
    #[error("invalid generator config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub regions: usize,
    pub land_cells: usize,
    /// Land cells the budget asked for but the round limit did not place.
    pub land_shortfall: usize,
    pub erosion_steps: usize,
    pub rivers: usize,
    /// River cells the budget asked for but no origin could provide.
    pub river_budget_remaining: usize,
    pub temperature_channel: u32,
}

/// Map dimensions accepted by [`generate_map`].
pub fn supported_dimensions(width: u32, height: u32) -> bool {
    width > 0 && height > 0 && width % CHUNK_SIZE_X == 0 && height % CHUNK_SIZE_Z == 0
}

/// Replace `grid` with a freshly generated `width` x `height` map.
///
/// On error the grid is left untouched. The search context is reset before
/// returning so stale phases from generation never leak into later searches.
pub fn generate_map(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    width: u32,
    height: u32,
    config: &GeneratorConfig,
) -> Result<GenerationReport, MapGenError> {
    if !supported_dimensions(width, height) {
        return Err(MapGenError::UnsupportedDimensions { width, height });
    }
    config.validate()?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let started = Instant::now();

    let regions = create_regions(width, height, config, &mut rng);
    if regions.iter().any(MapRegion::is_empty) {
        return Err(MapGenError::RegionsTooSmall { width, height });
    }

    let mut fresh = HexGrid::new(width, height)?;
    for index in 0..fresh.cell_count() {
        fresh.set_water_level(index, config.water_level);
    }
    *grid = fresh;
    ctx.reset(grid);

    tracing::info!(
        target: "hexmap::mapgen",
        seed,
        width,
        height,
        regions = regions.len(),
        "mapgen.start"
    );

    let land = land::create_land(grid, ctx, config, &regions, &mut rng);
    tracing::debug!(
        target: "hexmap::mapgen",
        land_cells = land.land_cells,
        shortfall = land.shortfall,
        "mapgen.land.done"
    );

    let erosion_steps = erosion::erode_land(grid, config.erosion_percentage, &mut rng);
    tracing::debug!(target: "hexmap::mapgen", erosion_steps, "mapgen.erosion.done");

    let climate = climate::create_climate(grid, config);
    let rivers = rivers::create_rivers(grid, &climate, config, land.land_cells, &mut rng);
    tracing::debug!(
        target: "hexmap::mapgen",
        rivers = rivers.rivers,
        budget_remaining = rivers.budget_remaining,
        "mapgen.rivers.done"
    );

    let temperature_channel = rng.gen_range(0..noise::JITTER_CHANNELS);
    let temperature = biomes::Temperature::new(config, seed, temperature_channel, height);
    biomes::set_terrain_types(grid, &climate, config, &temperature);

    ctx.reset(grid);

    let report = GenerationReport {
        seed,
        width,
        height,
        regions: regions.len(),
        land_cells: land.land_cells,
        land_shortfall: land.shortfall,
        erosion_steps,
        rivers: rivers.rivers,
        river_budget_remaining: rivers.budget_remaining,
        temperature_channel,
    };
    tracing::info!(
        target: "hexmap::mapgen",
        seed,
        land_cells = report.land_cells,
        rivers = report.rivers,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "mapgen.complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_rules() {
        assert!(supported_dimensions(40, 30));
        assert!(!supported_dimensions(0, 30));
        assert!(!supported_dimensions(42, 30));
        assert!(!supported_dimensions(40, 31));
    }

    #[test]
    fn rejected_sizes_leave_grid_untouched() {
        let mut grid = HexGrid::new(5, 5).unwrap();
        grid.set_elevation(3, 4);
        let mut ctx = SearchContext::new();
        let config = GeneratorConfig {
            seed: Some(1),
            ..GeneratorConfig::default()
        };

        let err = generate_map(&mut grid, &mut ctx, 12, 10, &config).unwrap_err();
        assert!(matches!(err, MapGenError::UnsupportedDimensions { .. }));
        let err = generate_map(&mut grid, &mut ctx, 10, 10, &config).unwrap_err();
        assert!(matches!(err, MapGenError::RegionsTooSmall { .. }));

        let bad = GeneratorConfig {
            land_percentage: 99,
            ..config
        };
        let err = generate_map(&mut grid, &mut ctx, 40, 30, &bad).unwrap_err();
        assert!(matches!(err, MapGenError::InvalidConfig(_)));

        assert_eq!((grid.width(), grid.height()), (5, 5));
        assert_eq!(grid.cell(3).elevation(), 4);
    }

    #[test]
    fn small_map_generates() {
        let mut grid = HexGrid::new(1, 1).unwrap();
        let mut ctx = SearchContext::new();
        let config = GeneratorConfig {
            seed: Some(2024),
            ..GeneratorConfig::default()
        };
        let report = generate_map(&mut grid, &mut ctx, 40, 30, &config).unwrap();
        assert_eq!(report.seed, 2024);
        assert_eq!(grid.cell_count(), 1200);
        assert_eq!(ctx.phase(), 0);
        assert!(grid.cells().iter().all(|c| c.search_phase() == 0));
        assert_eq!(grid.find_inconsistent_edge(), None);
    }
}
