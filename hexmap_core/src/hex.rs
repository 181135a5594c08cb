//! Hex directions and axial coordinates.
//!
//! Cells are stored row-major in offset coordinates (`x` column, `z` row, odd
//! rows shifted half a cell to the right). Distances and search heuristics use
//! axial coordinates derived from the offset pair.

use serde::{Deserialize, Serialize};

/// One of the six edges of a pointy-top hex cell, clockwise from north-east.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HexDirection {
    NorthEast = 0,
    East = 1,
    SouthEast = 2,
    SouthWest = 3,
    West = 4,
    NorthWest = 5,
}

impl HexDirection {
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NorthEast,
        HexDirection::East,
        HexDirection::SouthEast,
        HexDirection::SouthWest,
        HexDirection::West,
        HexDirection::NorthWest,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Convert from u8, returning `None` for values outside `0..6`.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    fn rotate(self, steps: u8) -> Self {
        Self::ALL[((self as u8 + steps) % 6) as usize]
    }

    pub fn opposite(self) -> Self {
        self.rotate(3)
    }

    pub fn next(self) -> Self {
        self.rotate(1)
    }

    pub fn previous(self) -> Self {
        self.rotate(5)
    }

    pub fn next2(self) -> Self {
        self.rotate(2)
    }

    pub fn previous2(self) -> Self {
        self.rotate(4)
    }
}

/// Axial hex coordinates. `y` is implied as `-x - z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HexCoordinates {
    x: i32,
    z: i32,
}

impl HexCoordinates {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Build axial coordinates from an offset (column, row) pair.
    pub fn from_offset(x: i32, z: i32) -> Self {
        Self::new(x - z.div_euclid(2), z)
    }

    /// Convert back to the offset (column, row) pair.
    pub fn to_offset(self) -> (i32, i32) {
        (self.x + self.z.div_euclid(2), self.z)
    }

    #[inline]
    pub fn x(self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> i32 {
        -self.x - self.z
    }

    #[inline]
    pub fn z(self) -> i32 {
        self.z
    }

    /// Number of cell steps between two coordinates.
    pub fn distance_to(self, other: HexCoordinates) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y() - other.y()).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        (dx + dy + dz) / 2
    }
}

impl std::fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}

/// Shape of the edge between two neighboring cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeType {
    Flat,
    Slope,
    Cliff,
}

impl EdgeType {
    pub fn between(elevation_a: i32, elevation_b: i32) -> Self {
        match (elevation_a - elevation_b).abs() {
            0 => EdgeType::Flat,
            1 => EdgeType::Slope,
            _ => EdgeType::Cliff,
        }
    }
}
