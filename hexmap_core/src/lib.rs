//! Hex-map generation and grid search.
//!
//! A [`HexGrid`] is a fixed arena of hex cells. [`generate_map`] fills it with
//! a procedurally generated world (land, erosion, climate, rivers, terrain),
//! and [`find_path`] / [`visible_cells`] run searches over it, sharing one
//! [`SearchContext`] so repeated searches never clear per-cell state.
//!
//! ```no_run
//! use hexmap_core::{generate_map, find_path, GeneratorConfig, HexGrid, SearchContext};
//!
//! let mut grid = HexGrid::new(1, 1).unwrap();
//! let mut ctx = SearchContext::new();
//! let config = GeneratorConfig { seed: Some(7), ..GeneratorConfig::default() };
//! generate_map(&mut grid, &mut ctx, 40, 30, &config).unwrap();
//! let last = grid.cell_count() - 1;
//! let _path = find_path(&mut grid, &mut ctx, 0, last, 24);
//! ```

pub mod generator_config;
pub mod grid;
pub mod hashing;
pub mod hex;
pub mod mapgen;
pub mod pathfinding;
pub mod search;
pub mod snapshot;
pub mod terrain;
pub mod visibility;

pub use generator_config::{
    load_generator_config_from_env, ConfigError, GeneratorConfig, Hemisphere,
    BUILTIN_GENERATOR_CONFIG, GENERATOR_CONFIG_ENV,
};
pub use grid::{CellRecord, GridError, HexCell, HexGrid, RoadMask, CHUNK_SIZE_X, CHUNK_SIZE_Z};
pub use hashing::FnvHasher;
pub use hex::{EdgeType, HexCoordinates, HexDirection};
pub use mapgen::{generate_map, supported_dimensions, GenerationReport, MapGenError};
pub use pathfinding::{find_path, find_path_with, move_cost, MovementRules, Path};
pub use search::{BucketNode, CellPriorityQueue, SearchContext, SearchState};
pub use snapshot::{
    decode_snapshot, encode_snapshot, snapshot_digest, SnapshotError, SNAPSHOT_FORMAT_VERSION,
};
pub use terrain::{TerrainKind, MAX_FEATURE_LEVEL};
pub use visibility::{decrease_visibility, increase_visibility, reset_visibility, visible_cells};
