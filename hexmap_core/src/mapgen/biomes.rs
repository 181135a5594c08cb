//! Terrain classification from temperature, moisture and elevation.

use super::climate::ClimateData;
use super::noise::{lerp, JitterField};
use crate::generator_config::{GeneratorConfig, Hemisphere};
use crate::grid::HexGrid;
use crate::terrain::{TerrainKind, MAX_FEATURE_LEVEL};

const TEMPERATURE_BANDS: [f32; 3] = [0.1, 0.3, 0.6];
const MOISTURE_BANDS: [f32; 3] = [0.12, 0.28, 0.85];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Biome {
    terrain: TerrainKind,
    plant: u8,
}

const fn biome(terrain: TerrainKind, plant: u8) -> Biome {
    Biome { terrain, plant }
}

/// Rows are temperature bands (cold to hot), columns moisture bands (dry to
/// wet).
const BIOMES: [Biome; 16] = {
    use TerrainKind::*;
    [
        biome(Sand, 0),
        biome(Snow, 0),
        biome(Snow, 0),
        biome(Snow, 0),
        biome(Sand, 0),
        biome(Mud, 0),
        biome(Mud, 1),
        biome(Mud, 2),
        biome(Sand, 0),
        biome(Grass, 0),
        biome(Grass, 1),
        biome(Grass, 2),
        biome(Sand, 0),
        biome(Grass, 1),
        biome(Grass, 2),
        biome(Grass, 3),
    ]
};

fn band(value: f32, bands: &[f32; 3]) -> usize {
    bands.iter().position(|&limit| value < limit).unwrap_or(bands.len())
}

/// Temperature model for one generation run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Temperature<'a> {
    config: &'a GeneratorConfig,
    jitter: JitterField,
    height: u32,
}

impl<'a> Temperature<'a> {
    pub(crate) fn new(config: &'a GeneratorConfig, seed: u64, channel: u32, height: u32) -> Self {
        Self {
            config,
            jitter: JitterField::new(seed, channel),
            height,
        }
    }

    pub(crate) fn at(&self, grid: &HexGrid, index: usize) -> f32 {
        let config = self.config;
        let cell = grid.cell(index);
        let (x, z) = grid.offset_of(index);

        let mut latitude = z as f32 / self.height as f32;
        match config.hemisphere {
            Hemisphere::Both => {
                latitude *= 2.0;
                if latitude > 1.0 {
                    latitude = 2.0 - latitude;
                }
            }
            Hemisphere::North => latitude = 1.0 - latitude,
            Hemisphere::South => {}
        }

        let mut temperature = lerp(config.low_temperature, config.high_temperature, latitude);
        temperature *= 1.0
            - (cell.view_elevation() - config.water_level) as f32
                / ((config.elevation_maximum - config.water_level) as f32 + 1.0);
        temperature += (self.jitter.sample(x, z) * 2.0 - 1.0) * config.temperature_jitter;
        temperature
    }
}

pub(crate) fn set_terrain_types(
    grid: &mut HexGrid,
    climate: &[ClimateData],
    config: &GeneratorConfig,
    temperature: &Temperature<'_>,
) {
    let water_level = config.water_level;
    let rock_desert_elevation =
        config.elevation_maximum - (config.elevation_maximum - water_level) / 2;

    for index in 0..grid.cell_count() {
        let heat = temperature.at(grid, index);
        let cell = grid.cell(index);

        if !cell.is_underwater() {
            let t = band(heat, &TEMPERATURE_BANDS);
            let m = band(climate[index].moisture, &MOISTURE_BANDS);
            let mut biome = BIOMES[t * 4 + m];

            if cell.elevation() == config.elevation_maximum {
                biome.terrain = TerrainKind::Snow;
            } else if biome.terrain == TerrainKind::Sand && cell.elevation() >= rock_desert_elevation
            {
                biome.terrain = TerrainKind::Stone;
            }
            if biome.terrain == TerrainKind::Snow {
                biome.plant = 0;
            } else if biome.plant < MAX_FEATURE_LEVEL && cell.has_river() {
                biome.plant += 1;
            }

            let cell = grid.cell_mut(index);
            cell.set_terrain(biome.terrain);
            cell.set_plant_level(biome.plant);
        } else {
            let mut terrain = if cell.elevation() == water_level - 1 {
                let mut cliffs = 0;
                let mut slopes = 0;
                for (_, neighbor) in grid.neighbors(index) {
                    let delta = grid.cell(neighbor).elevation() - cell.water_level();
                    if delta == 0 {
                        slopes += 1;
                    } else if delta > 0 {
                        cliffs += 1;
                    }
                }
                if cliffs + slopes > 3 {
                    TerrainKind::Grass
                } else if cliffs > 0 {
                    TerrainKind::Stone
                } else if slopes > 0 {
                    TerrainKind::Sand
                } else {
                    TerrainKind::Grass
                }
            } else if cell.elevation() >= water_level {
                TerrainKind::Grass
            } else if cell.elevation() < 0 {
                TerrainKind::Stone
            } else {
                TerrainKind::Mud
            };

            if terrain == TerrainKind::Grass && heat < TEMPERATURE_BANDS[0] {
                terrain = TerrainKind::Mud;
            }
            grid.cell_mut(index).set_terrain(terrain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexDirection;

    fn flat_config() -> GeneratorConfig {
        GeneratorConfig {
            temperature_jitter: 0.0,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn bands_are_half_open() {
        assert_eq!(band(0.05, &TEMPERATURE_BANDS), 0);
        assert_eq!(band(0.1, &TEMPERATURE_BANDS), 1);
        assert_eq!(band(0.59, &TEMPERATURE_BANDS), 2);
        assert_eq!(band(0.9, &TEMPERATURE_BANDS), 3);
    }

    #[test]
    fn latitude_folds_per_hemisphere() {
        let mut grid = HexGrid::new(5, 10).unwrap();
        for index in 0..grid.cell_count() {
            grid.set_water_level(index, 3);
            grid.set_elevation(index, 3);
        }
        let mut config = flat_config();
        let at = |config: &GeneratorConfig, z: i32| {
            let index = grid.index_at_offset(0, z).unwrap();
            Temperature::new(config, 1, 0, 10).at(&grid, index)
        };

        assert_eq!(at(&config, 0), 0.0);
        assert_eq!(at(&config, 5), 1.0);
        assert!((at(&config, 8) - 0.4).abs() < 1e-5);

        config.hemisphere = Hemisphere::North;
        assert_eq!(at(&config, 0), 1.0);
        config.hemisphere = Hemisphere::South;
        assert!((at(&config, 9) - 0.9).abs() < 1e-5);
    }

    #[test]
    fn altitude_cools() {
        let mut grid = HexGrid::new(5, 10).unwrap();
        for index in 0..grid.cell_count() {
            grid.set_water_level(index, 3);
        }
        let low = grid.index_at_offset(0, 5).unwrap();
        let high = grid.index_at_offset(1, 5).unwrap();
        grid.set_elevation(low, 3);
        grid.set_elevation(high, 8);
        let config = flat_config();
        let temperature = Temperature::new(&config, 1, 0, 10);
        assert!(temperature.at(&grid, high) < temperature.at(&grid, low));
    }

    #[test]
    fn peaks_are_snow_and_rivers_feed_plants() {
        let mut grid = HexGrid::new(5, 10).unwrap();
        for index in 0..grid.cell_count() {
            grid.set_water_level(index, 3);
            grid.set_elevation(index, 4);
        }
        let peak = grid.index_at_offset(2, 5).unwrap();
        grid.set_elevation(peak, 8);
        let source = grid.index_at_offset(1, 5).unwrap();
        let west = grid.neighbor(source, HexDirection::West).unwrap();
        assert!(grid.set_outgoing_river(source, HexDirection::West));

        let climate = vec![
            ClimateData {
                clouds: 0.0,
                moisture: 0.5,
            };
            grid.cell_count()
        ];
        let config = flat_config();
        let temperature = Temperature::new(&config, 1, 0, 10);
        set_terrain_types(&mut grid, &climate, &config, &temperature);

        let peak = grid.cell(peak);
        assert_eq!(peak.terrain(), TerrainKind::Snow);
        assert_eq!(peak.plant_level(), 0);

        let dry_twin = grid.index_at_offset(4, 5).unwrap();
        let base = grid.cell(dry_twin).plant_level();
        assert_eq!(grid.cell(west).plant_level(), (base + 1).min(MAX_FEATURE_LEVEL));
    }

    #[test]
    fn shallow_water_by_shore_shape() {
        let mut grid = HexGrid::new(5, 10).unwrap();
        for index in 0..grid.cell_count() {
            grid.set_water_level(index, 3);
            grid.set_elevation(index, 2);
        }
        let lagoon = grid.index_at_offset(2, 5).unwrap();
        let deep = grid.index_at_offset(0, 0).unwrap();
        grid.set_elevation(deep, -1);
        let cove = grid.index_at_offset(2, 2).unwrap();
        let cliff = grid.neighbor(cove, HexDirection::East).unwrap();
        grid.set_elevation(cliff, 6);

        let climate = vec![ClimateData::default(); grid.cell_count()];
        let config = flat_config();
        let temperature = Temperature::new(&config, 1, 0, 10);
        set_terrain_types(&mut grid, &climate, &config, &temperature);

        // Warm, surrounded by equally shallow water.
        assert_eq!(grid.cell(lagoon).terrain(), TerrainKind::Grass);
        assert_eq!(grid.cell(deep).terrain(), TerrainKind::Stone);
        assert_eq!(grid.cell(cove).terrain(), TerrainKind::Stone);
    }
}
