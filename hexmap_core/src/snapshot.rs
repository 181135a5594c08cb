//! Byte-packed map snapshots.
//!
//! Layout, little endian:
//!
//! | bytes | field |
//! |---|---|
//! | 4 | format version (`i32`, currently 5) |
//! | 4 | width (`i32`) |
//! | 4 | height (`i32`) |
//! | 1 | wrapping flag, always 0 |
//! | 12 per cell | terrain, elevation + 127, water level, urban, farm, plant, special, walled, incoming river, outgoing river, road bits, explored |
//!
//! River bytes are `128 + direction` when present and 0 otherwise.

use thiserror::Error;

use crate::grid::{CellRecord, HexGrid, RoadMask};
use crate::hashing::fnv1a64;
use crate::hex::HexDirection;
use crate::terrain::TerrainKind;

pub const SNAPSHOT_FORMAT_VERSION: i32 = 5;

const HEADER_LEN: usize = 13;
const CELL_LEN: usize = 12;
const ELEVATION_OFFSET: i32 = 127;
const RIVER_FLAG: u8 = 0x80;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot truncated: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unsupported snapshot format version {0}")]
    UnsupportedVersion(i32),
    #[error("invalid snapshot dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("wrapping maps are not supported")]
    UnsupportedWrapping,
    #[error("cell {index}: invalid terrain index {value}")]
    InvalidTerrain { index: usize, value: u8 },
    #[error("cell {index}: invalid river byte {value:#04x}")]
    InvalidDirection { index: usize, value: u8 },
    #[error("cell {index}: invalid road bits {value:#04x}")]
    InvalidRoads { index: usize, value: u8 },
    #[error("cell {index}: river or road edge is not mirrored by its neighbor")]
    InconsistentEdges { index: usize },
    #[error("{0} trailing bytes after the last cell")]
    TrailingBytes(usize),
}

fn encode_river(direction: Option<HexDirection>) -> u8 {
    direction.map_or(0, |d| RIVER_FLAG | d.as_u8())
}

fn decode_river(index: usize, value: u8) -> Result<Option<HexDirection>, SnapshotError> {
    if value & RIVER_FLAG == 0 {
        return if value == 0 {
            Ok(None)
        } else {
            Err(SnapshotError::InvalidDirection { index, value })
        };
    }
    HexDirection::from_u8(value & !RIVER_FLAG)
        .map(Some)
        .ok_or(SnapshotError::InvalidDirection { index, value })
}

/// Serialize every persisted cell attribute of `grid`.
///
/// Elevation and water level are stored as single bytes; values outside the
/// representable range are clamped.
pub fn encode_snapshot(grid: &HexGrid) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + grid.cell_count() * CELL_LEN);
    out.extend_from_slice(&SNAPSHOT_FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(grid.width() as i32).to_le_bytes());
    out.extend_from_slice(&(grid.height() as i32).to_le_bytes());
    out.push(0);

    for index in 0..grid.cell_count() {
        let record = grid.record(index);
        out.extend_from_slice(&[
            record.terrain.as_u8(),
            (record.elevation + ELEVATION_OFFSET).clamp(0, 255) as u8,
            record.water_level.clamp(0, 255) as u8,
            record.urban_level,
            record.farm_level,
            record.plant_level,
            record.special_index,
            u8::from(record.walled),
            encode_river(record.incoming_river),
            encode_river(record.outgoing_river),
            record.roads.bits(),
            u8::from(record.explored),
        ]);
    }
    out
}

fn read_i32(bytes: &[u8], at: usize) -> i32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    i32::from_le_bytes(word)
}

/// Rebuild a grid from [`encode_snapshot`] output.
pub fn decode_snapshot(bytes: &[u8]) -> Result<HexGrid, SnapshotError> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::Truncated {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let version = read_i32(bytes, 0);
    if version != SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    let width = read_i32(bytes, 4);
    let height = read_i32(bytes, 8);
    if width <= 0 || height <= 0 {
        return Err(SnapshotError::InvalidDimensions { width, height });
    }
    if bytes[12] != 0 {
        return Err(SnapshotError::UnsupportedWrapping);
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|cells| cells.checked_mul(CELL_LEN))
        .and_then(|body| body.checked_add(HEADER_LEN))
        .ok_or(SnapshotError::InvalidDimensions { width, height })?;
    if bytes.len() < expected {
        return Err(SnapshotError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(SnapshotError::TrailingBytes(bytes.len() - expected));
    }

    let mut grid = HexGrid::new(width as u32, height as u32)
        .map_err(|_| SnapshotError::InvalidDimensions { width, height })?;

    for (index, chunk) in bytes[HEADER_LEN..].chunks_exact(CELL_LEN).enumerate() {
        let terrain = TerrainKind::from_u8(chunk[0]).ok_or(SnapshotError::InvalidTerrain {
            index,
            value: chunk[0],
        })?;
        let roads = RoadMask::from_bits(chunk[10]).ok_or(SnapshotError::InvalidRoads {
            index,
            value: chunk[10],
        })?;
        let record = CellRecord {
            terrain,
            elevation: i32::from(chunk[1]) - ELEVATION_OFFSET,
            water_level: i32::from(chunk[2]),
            urban_level: chunk[3],
            farm_level: chunk[4],
            plant_level: chunk[5],
            special_index: chunk[6],
            walled: chunk[7] != 0,
            incoming_river: decode_river(index, chunk[8])?,
            outgoing_river: decode_river(index, chunk[9])?,
            roads,
            explored: chunk[11] != 0,
        };
        grid.restore(index, &record);
    }

    if let Some(index) = grid.find_inconsistent_edge() {
        return Err(SnapshotError::InconsistentEdges { index });
    }
    Ok(grid)
}

/// Stable 64-bit digest of a grid's snapshot encoding.
pub fn snapshot_digest(grid: &HexGrid) -> u64 {
    fnv1a64(&encode_snapshot(grid))
}
