//! Land sculpting: grow raised or sunken chunks from random seed cells until
//! the land budget is spent.

use rand::Rng;

use super::regions::MapRegion;
use crate::generator_config::GeneratorConfig;
use crate::grid::HexGrid;
use crate::hex::HexDirection;
use crate::search::{SearchContext, SearchState};

/// Rounds of chunk placement before land creation gives up.
pub const LAND_ROUND_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LandOutcome {
    pub(crate) land_cells: usize,
    pub(crate) shortfall: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sculpt {
    Raise,
    Sink,
}

/// Cells that should end up above water for a grid of `cell_count` cells.
pub(crate) fn land_budget(cell_count: usize, land_percentage: u32) -> usize {
    (cell_count as f32 * land_percentage as f32 * 0.01).round() as usize
}

pub(crate) fn create_land<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    config: &GeneratorConfig,
    regions: &[MapRegion],
    rng: &mut R,
) -> LandOutcome {
    let target = land_budget(grid.cell_count(), config.land_percentage);
    let mut budget = target;

    // Roll order per round: sink, then per region chunk size, seed cell, rise, jitter.
    for _ in 0..LAND_ROUND_LIMIT {
        let sink = rng.gen::<f32>() < config.sink_probability;
        for region in regions {
            let chunk_size = rng.gen_range(
                config.chunk_size_min..(config.chunk_size_max - 1).max(config.chunk_size_min + 1),
            ) as usize;
            if sink {
                budget = sink_terrain(grid, ctx, config, chunk_size, budget, region, rng);
            } else {
                budget = raise_terrain(grid, ctx, config, chunk_size, budget, region, rng);
                if budget == 0 {
                    return LandOutcome {
                        land_cells: target,
                        shortfall: 0,
                    };
                }
            }
        }
    }

    tracing::warn!(
        target: "hexmap::mapgen",
        remaining = budget,
        rounds = LAND_ROUND_LIMIT,
        "land.budget_shortfall"
    );
    LandOutcome {
        land_cells: target.saturating_sub(budget),
        shortfall: budget,
    }
}

/// Raise a chunk of up to `chunk_size` cells. Every cell lifted above the
/// water consumes one unit of `budget`; the remainder is returned.
pub(crate) fn raise_terrain<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    config: &GeneratorConfig,
    chunk_size: usize,
    budget: usize,
    region: &MapRegion,
    rng: &mut R,
) -> usize {
    sculpt(grid, ctx, config, Sculpt::Raise, chunk_size, budget, region, rng)
}

/// Sink a chunk of up to `chunk_size` cells. Every cell drowned returns one
/// unit to `budget`.
pub(crate) fn sink_terrain<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    config: &GeneratorConfig,
    chunk_size: usize,
    budget: usize,
    region: &MapRegion,
    rng: &mut R,
) -> usize {
    sculpt(grid, ctx, config, Sculpt::Sink, chunk_size, budget, region, rng)
}

#[allow(clippy::too_many_arguments)]
fn sculpt<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    config: &GeneratorConfig,
    mode: Sculpt,
    chunk_size: usize,
    mut budget: usize,
    region: &MapRegion,
    rng: &mut R,
) -> usize {
    let phase = ctx.begin(grid);
    let first = region.random_cell(grid, rng);
    {
        let cell = &mut grid.cells_mut()[first];
        cell.search.phase = phase;
        cell.search.distance = 0;
        cell.search.heuristic = 0;
    }
    ctx.frontier_mut().enqueue(grid.cells_mut(), first);

    let center = grid.cell(first).coordinates();
    let step = if rng.gen::<f32>() < config.high_rise_probability {
        2
    } else {
        1
    };
    let water_level = config.water_level;
    let mut size = 0;

    while size < chunk_size {
        let Some(index) = ctx.frontier_mut().dequeue(grid.cells()) else {
            break;
        };
        grid.cells_mut()[index].search.phase = phase + 1;

        let original = grid.cell(index).elevation();
        let elevation = match mode {
            Sculpt::Raise => original + step,
            Sculpt::Sink => original - step,
        };
        if elevation > config.elevation_maximum || elevation < config.elevation_minimum {
            continue;
        }
        grid.set_elevation(index, elevation);

        match mode {
            Sculpt::Raise => {
                if original < water_level && elevation >= water_level {
                    budget = budget.saturating_sub(1);
                    if budget == 0 {
                        break;
                    }
                }
            }
            Sculpt::Sink => {
                if original >= water_level && elevation < water_level {
                    budget += 1;
                }
            }
        }
        size += 1;

        for direction in HexDirection::ALL {
            let Some(neighbor) = grid.neighbor(index, direction) else {
                continue;
            };
            if ctx.state_of(grid.cell(neighbor).search_phase()) != SearchState::Unvisited {
                continue;
            }
            let distance = grid.cell(neighbor).coordinates().distance_to(center);
            let heuristic = u32::from(rng.gen::<f32>() < config.jitter_probability);
            let cell = &mut grid.cells_mut()[neighbor];
            cell.search.phase = phase;
            cell.search.distance = distance;
            cell.search.heuristic = heuristic;
            ctx.frontier_mut().enqueue(grid.cells_mut(), neighbor);
        }
    }

    ctx.frontier_mut().clear();
    budget
}
