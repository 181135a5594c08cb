//! River generation: pick weighted origins on high, wet land and grow each
//! river downhill until it reaches water, merges into another river or ends
//! in a lake.

use rand::Rng;

use super::climate::ClimateData;
use crate::generator_config::GeneratorConfig;
use crate::grid::HexGrid;
use crate::hex::HexDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RiverOutcome {
    pub(crate) rivers: usize,
    pub(crate) budget_remaining: usize,
}

/// Origin pool: each land cell appears up to four times, more often the
/// higher and wetter it is.
pub(crate) fn river_origins(
    grid: &HexGrid,
    climate: &[ClimateData],
    config: &GeneratorConfig,
) -> Vec<usize> {
    let water_level = config.water_level;
    let span = (config.elevation_maximum - water_level) as f32;
    let mut origins = Vec::new();
    for (index, cell) in grid.cells().iter().enumerate() {
        if cell.is_underwater() {
            continue;
        }
        let weight = climate[index].moisture * (cell.elevation() - water_level) as f32 / span;
        if weight > 0.75 {
            origins.push(index);
            origins.push(index);
        }
        if weight > 0.5 {
            origins.push(index);
        }
        if weight > 0.25 {
            origins.push(index);
        }
    }
    origins
}

pub(crate) fn create_rivers<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    climate: &[ClimateData],
    config: &GeneratorConfig,
    land_cells: usize,
    rng: &mut R,
) -> RiverOutcome {
    let mut origins = river_origins(grid, climate, config);
    let mut budget =
        (land_cells as f32 * config.river_percentage as f32 * 0.01).round() as usize;
    let mut rivers = 0;

    while budget > 0 && !origins.is_empty() {
        let origin = origins.swap_remove(rng.gen_range(0..origins.len()));
        if grid.cell(origin).has_river() {
            continue;
        }
        let untouched = grid.neighbors(origin).all(|(_, neighbor)| {
            let cell = grid.cell(neighbor);
            !cell.has_river() && !cell.is_underwater()
        });
        if !untouched {
            continue;
        }
        let length = create_river(grid, config, origin, rng);
        if length > 0 {
            rivers += 1;
        }
        budget = budget.saturating_sub(length);
    }

    if budget > 0 {
        tracing::warn!(
            target: "hexmap::mapgen",
            remaining = budget,
            rivers,
            "rivers.budget_shortfall"
        );
    }

    RiverOutcome {
        rivers,
        budget_remaining: budget,
    }
}

/// Grow one river from `origin`. Returns its length in cells, or zero when
/// the origin has nowhere to flow.
pub(crate) fn create_river<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    config: &GeneratorConfig,
    origin: usize,
    rng: &mut R,
) -> usize {
    let mut length = 1;
    let mut cell = origin;
    let mut direction = HexDirection::NorthEast;
    let mut flow_directions: Vec<HexDirection> = Vec::with_capacity(24);

    while !grid.cell(cell).is_underwater() {
        let elevation = grid.cell(cell).elevation();
        let mut min_neighbor_elevation = i32::MAX;
        flow_directions.clear();

        for d in HexDirection::ALL {
            let Some(neighbor) = grid.neighbor(cell, d) else {
                continue;
            };
            let target = grid.cell(neighbor);
            min_neighbor_elevation = min_neighbor_elevation.min(target.elevation());
            if neighbor == origin || target.has_incoming_river() {
                continue;
            }
            let delta = target.elevation() - elevation;
            if delta > 0 {
                continue;
            }
            if target.has_outgoing_river() {
                grid.set_outgoing_river(cell, d);
                return length;
            }
            if delta < 0 {
                flow_directions.extend([d, d, d]);
            }
            if length == 1 || (d != direction.next2() && d != direction.previous2()) {
                flow_directions.push(d);
            }
            flow_directions.push(d);
        }

        if flow_directions.is_empty() {
            if length == 1 {
                return 0;
            }
            if min_neighbor_elevation >= elevation {
                grid.set_water_level(cell, min_neighbor_elevation);
                if min_neighbor_elevation == elevation {
                    grid.set_elevation(cell, min_neighbor_elevation - 1);
                }
            }
            break;
        }

        direction = flow_directions[rng.gen_range(0..flow_directions.len())];
        grid.set_outgoing_river(cell, direction);
        length += 1;

        if min_neighbor_elevation >= elevation
            && rng.gen::<f32>() < config.extra_lake_probability
            && elevation - 1 >= config.elevation_minimum
        {
            grid.set_water_level(cell, elevation);
            grid.set_elevation(cell, elevation - 1);
        }

        let Some(next) = grid.neighbor(cell, direction) else {
            break;
        };
        cell = next;
    }

    length
}
