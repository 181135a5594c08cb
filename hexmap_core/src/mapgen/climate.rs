//! Water cycle automaton: evaporation, precipitation, wind-driven cloud
//! dispersal, runoff and seepage, run for a fixed number of cycles.

use serde::Serialize;

use crate::generator_config::GeneratorConfig;
use crate::grid::HexGrid;

pub const CLIMATE_CYCLES: usize = 40;

/// Per-cell water state. Moisture stays within `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClimateData {
    pub clouds: f32,
    pub moisture: f32,
}

pub(crate) fn create_climate(grid: &HexGrid, config: &GeneratorConfig) -> Vec<ClimateData> {
    let initial = ClimateData {
        clouds: 0.0,
        moisture: config.starting_moisture,
    };
    let mut current = vec![initial; grid.cell_count()];
    let mut next = vec![ClimateData::default(); grid.cell_count()];

    for _ in 0..CLIMATE_CYCLES {
        for index in 0..grid.cell_count() {
            evolve_climate(grid, config, &mut current, &mut next, index);
        }
        std::mem::swap(&mut current, &mut next);
    }

    current
}

fn evolve_climate(
    grid: &HexGrid,
    config: &GeneratorConfig,
    current: &mut [ClimateData],
    next: &mut [ClimateData],
    index: usize,
) {
    let cell = grid.cell(index);
    let mut climate = current[index];

    if cell.is_underwater() {
        climate.moisture = 1.0;
        climate.clouds += config.evaporation_factor;
    } else {
        let evaporation = climate.moisture * config.evaporation_factor;
        climate.moisture -= evaporation;
        climate.clouds += evaporation;
    }

    let precipitation = climate.clouds * config.precipitation_factor;
    climate.clouds -= precipitation;
    climate.moisture += precipitation;

    let cloud_maximum =
        1.0 - cell.view_elevation() as f32 / (config.elevation_maximum as f32 + 1.0);
    if climate.clouds > cloud_maximum {
        climate.moisture += climate.clouds - cloud_maximum;
        climate.clouds = cloud_maximum;
    }

    let main_dispersal = config.wind_direction.opposite();
    let cloud_dispersal = climate.clouds * (1.0 / (5.0 + config.wind_strength));
    let runoff = climate.moisture * config.runoff_factor * (1.0 / 6.0);
    let seepage = climate.moisture * config.seepage_factor * (1.0 / 6.0);

    for (direction, neighbor) in grid.neighbors(index) {
        let target = &mut next[neighbor];
        if direction == main_dispersal {
            target.clouds += cloud_dispersal * config.wind_strength;
        } else {
            target.clouds += cloud_dispersal;
        }

        let delta = grid.cell(neighbor).view_elevation() - cell.view_elevation();
        if delta < 0 {
            climate.moisture -= runoff;
            target.moisture += runoff;
        } else if delta == 0 {
            climate.moisture -= seepage;
            target.moisture += seepage;
        }
    }

    let own = &mut next[index];
    own.moisture = (own.moisture + climate.moisture).min(1.0);
    current[index] = ClimateData::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexDirection;

    fn island(width: u32, height: u32) -> HexGrid {
        let mut grid = HexGrid::new(width, height).unwrap();
        for index in 0..grid.cell_count() {
            grid.set_water_level(index, 3);
            let (x, z) = grid.offset_of(index);
            if (3..width - 3).contains(&x) && (3..height - 3).contains(&z) {
                grid.set_elevation(index, 4 + (x % 3) as i32);
            }
        }
        grid
    }

    #[test]
    fn water_cells_end_saturated_and_values_stay_bounded() {
        let grid = island(15, 15);
        let config = GeneratorConfig::default();
        let climate = create_climate(&grid, &config);
        assert_eq!(climate.len(), grid.cell_count());

        for (cell, data) in grid.cells().iter().zip(&climate) {
            assert!((0.0..=1.0).contains(&data.moisture), "{data:?}");
            assert!(data.clouds >= 0.0);
            if cell.is_underwater() {
                assert!(data.moisture > 0.5);
            }
        }
    }

    #[test]
    fn windward_coast_is_wetter() {
        let grid = island(20, 10);
        let mut config = GeneratorConfig {
            wind_direction: HexDirection::West,
            wind_strength: 10.0,
            ..GeneratorConfig::default()
        };
        let from_west = create_climate(&grid, &config);
        config.wind_direction = HexDirection::East;
        let from_east = create_climate(&grid, &config);

        let east_coast = grid.index_at_offset(16, 5).unwrap();
        let west_coast = grid.index_at_offset(3, 5).unwrap();
        assert!(!grid.cell(east_coast).is_underwater());
        assert!(!grid.cell(west_coast).is_underwater());
        assert!(from_east[east_coast].moisture > from_west[east_coast].moisture);
        assert!(from_west[west_coast].moisture > from_east[west_coast].moisture);
    }

    #[test]
    fn dry_world_stays_dry() {
        let mut grid = HexGrid::new(10, 10).unwrap();
        for index in 0..grid.cell_count() {
            grid.set_elevation(index, 5);
        }
        let config = GeneratorConfig {
            starting_moisture: 0.0,
            ..GeneratorConfig::default()
        };
        let climate = create_climate(&grid, &config);
        assert!(climate.iter().all(|c| c.moisture == 0.0 && c.clouds == 0.0));
    }
}
