use rand::Rng;

use crate::generator_config::GeneratorConfig;
use crate::grid::HexGrid;

/// Offset-coordinate rectangle, `min` inclusive and `max` exclusive, from
/// which land chunks pick their seed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub z_min: i32,
    pub z_max: i32,
}

impl MapRegion {
    pub fn is_empty(&self) -> bool {
        self.x_min >= self.x_max || self.z_min >= self.z_max
    }

    pub fn contains_offset(&self, x: i32, z: i32) -> bool {
        (self.x_min..self.x_max).contains(&x) && (self.z_min..self.z_max).contains(&z)
    }

    pub(crate) fn random_cell<R: Rng + ?Sized>(&self, grid: &HexGrid, rng: &mut R) -> usize {
        let x = rng.gen_range(self.x_min..self.x_max);
        let z = rng.gen_range(self.z_min..self.z_max);
        z as usize * grid.width() as usize + x as usize
    }
}

/// Split the map interior into `region_count` rectangles separated by
/// `region_border` cells of guaranteed ocean.
pub fn create_regions<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Vec<MapRegion> {
    let w = width as i32;
    let h = height as i32;
    let border_x = config.map_border_x as i32;
    let border_z = config.map_border_z as i32;
    let gap = config.region_border as i32;

    let full = MapRegion {
        x_min: border_x,
        x_max: w - border_x,
        z_min: border_z,
        z_max: h - border_z,
    };

    match config.region_count {
        2 => {
            if rng.gen::<f32>() < 0.5 {
                vec![
                    MapRegion {
                        x_max: w / 2 - gap,
                        ..full
                    },
                    MapRegion {
                        x_min: w / 2 + gap,
                        ..full
                    },
                ]
            } else {
                vec![
                    MapRegion {
                        z_max: h / 2 - gap,
                        ..full
                    },
                    MapRegion {
                        z_min: h / 2 + gap,
                        ..full
                    },
                ]
            }
        }
        3 => vec![
            MapRegion {
                x_max: w / 3 - gap,
                ..full
            },
            MapRegion {
                x_min: w / 3 + gap,
                x_max: w * 2 / 3 - gap,
                ..full
            },
            MapRegion {
                x_min: w * 2 / 3 + gap,
                ..full
            },
        ],
        4 => {
            let west = MapRegion {
                x_max: w / 2 - gap,
                ..full
            };
            let east = MapRegion {
                x_min: w / 2 + gap,
                ..full
            };
            vec![
                MapRegion {
                    z_max: h / 2 - gap,
                    ..west
                },
                MapRegion {
                    z_max: h / 2 - gap,
                    ..east
                },
                MapRegion {
                    z_min: h / 2 + gap,
                    ..east
                },
                MapRegion {
                    z_min: h / 2 + gap,
                    ..west
                },
            ]
        }
        _ => vec![full],
    }
}
