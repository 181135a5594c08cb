use serde::{Deserialize, Serialize};

/// Surface material of a cell, stored as a small index in snapshots.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    #[default]
    Sand = 0,
    Grass = 1,
    Mud = 2,
    Stone = 3,
    Snow = 4,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 5] = [
        TerrainKind::Sand,
        TerrainKind::Grass,
        TerrainKind::Mud,
        TerrainKind::Stone,
        TerrainKind::Snow,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Single character used by text renderings of a map.
    pub fn glyph(self) -> char {
        match self {
            TerrainKind::Sand => '.',
            TerrainKind::Grass => '"',
            TerrainKind::Mud => ',',
            TerrainKind::Stone => '^',
            TerrainKind::Snow => '*',
        }
    }
}

/// Highest urban, farm and plant level a cell can carry.
pub const MAX_FEATURE_LEVEL: u8 = 3;
