//! Cell store: a fixed arena of hex cells addressed by a stable index.
//!
//! Neighbor relations are six index slots per cell, filled symmetrically when
//! the grid is built. Attributes whose invariants involve a neighbor
//! (elevation, water level, rivers, roads, special features) can only be
//! changed through [`HexGrid`], which keeps both sides consistent after every
//! call. Purely local attributes are set on [`HexCell`] directly.

use bitflags::bitflags;
use thiserror::Error;

use crate::hex::{EdgeType, HexCoordinates, HexDirection};
use crate::search::BucketNode;
use crate::terrain::{TerrainKind, MAX_FEATURE_LEVEL};

/// Generated map widths must be a multiple of this many columns.
pub const CHUNK_SIZE_X: u32 = 5;
/// Generated map heights must be a multiple of this many rows.
pub const CHUNK_SIZE_Z: u32 = 5;

bitflags! {
    /// Road presence per edge; bit `i` belongs to `HexDirection` `i`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RoadMask: u8 {
        const NORTH_EAST = 1 << 0;
        const EAST = 1 << 1;
        const SOUTH_EAST = 1 << 2;
        const SOUTH_WEST = 1 << 3;
        const WEST = 1 << 4;
        const NORTH_WEST = 1 << 5;
    }
}

impl RoadMask {
    pub fn from_direction(direction: HexDirection) -> Self {
        Self::from_bits_retain(1 << direction.as_u8())
    }
}

/// Scratch fields written by searches. Only meaningful for the search whose
/// phase matches `phase`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SearchFields {
    pub(crate) distance: u32,
    pub(crate) heuristic: u32,
    pub(crate) phase: u32,
    pub(crate) next_with_same_priority: Option<usize>,
    pub(crate) path_from: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct HexCell {
    index: usize,
    coordinates: HexCoordinates,
    neighbors: [Option<usize>; 6],
    elevation: i32,
    water_level: i32,
    terrain: TerrainKind,
    urban_level: u8,
    farm_level: u8,
    plant_level: u8,
    special_index: u8,
    walled: bool,
    roads: RoadMask,
    incoming_river: Option<HexDirection>,
    outgoing_river: Option<HexDirection>,
    explored: bool,
    explorable: bool,
    visibility: u32,
    pub(crate) search: SearchFields,
}

impl HexCell {
    fn new(index: usize, coordinates: HexCoordinates) -> Self {
        Self {
            index,
            coordinates,
            neighbors: [None; 6],
            elevation: 0,
            water_level: 0,
            terrain: TerrainKind::default(),
            urban_level: 0,
            farm_level: 0,
            plant_level: 0,
            special_index: 0,
            walled: false,
            roads: RoadMask::empty(),
            incoming_river: None,
            outgoing_river: None,
            explored: false,
            explorable: true,
            visibility: 0,
            search: SearchFields::default(),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    #[inline]
    pub fn neighbor(&self, direction: HexDirection) -> Option<usize> {
        self.neighbors[direction as usize]
    }

    #[inline]
    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    #[inline]
    pub fn water_level(&self) -> i32 {
        self.water_level
    }

    /// The higher of elevation and water surface.
    #[inline]
    pub fn view_elevation(&self) -> i32 {
        self.elevation.max(self.water_level)
    }

    #[inline]
    pub fn is_underwater(&self) -> bool {
        self.water_level > self.elevation
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    pub fn set_terrain(&mut self, terrain: TerrainKind) {
        self.terrain = terrain;
    }

    pub fn urban_level(&self) -> u8 {
        self.urban_level
    }

    pub fn set_urban_level(&mut self, level: u8) {
        self.urban_level = level.min(MAX_FEATURE_LEVEL);
    }

    pub fn farm_level(&self) -> u8 {
        self.farm_level
    }

    pub fn set_farm_level(&mut self, level: u8) {
        self.farm_level = level.min(MAX_FEATURE_LEVEL);
    }

    pub fn plant_level(&self) -> u8 {
        self.plant_level
    }

    pub fn set_plant_level(&mut self, level: u8) {
        self.plant_level = level.min(MAX_FEATURE_LEVEL);
    }

    pub fn special_index(&self) -> u8 {
        self.special_index
    }

    pub fn is_special(&self) -> bool {
        self.special_index > 0
    }

    pub fn walled(&self) -> bool {
        self.walled
    }

    pub fn set_walled(&mut self, walled: bool) {
        self.walled = walled;
    }

    pub fn roads(&self) -> RoadMask {
        self.roads
    }

    pub fn has_roads(&self) -> bool {
        !self.roads.is_empty()
    }

    pub fn has_road_through_edge(&self, direction: HexDirection) -> bool {
        self.roads.contains(RoadMask::from_direction(direction))
    }

    pub fn incoming_river(&self) -> Option<HexDirection> {
        self.incoming_river
    }

    pub fn outgoing_river(&self) -> Option<HexDirection> {
        self.outgoing_river
    }

    pub fn has_incoming_river(&self) -> bool {
        self.incoming_river.is_some()
    }

    pub fn has_outgoing_river(&self) -> bool {
        self.outgoing_river.is_some()
    }

    pub fn has_river(&self) -> bool {
        self.incoming_river.is_some() || self.outgoing_river.is_some()
    }

    /// True for river sources and river mouths.
    pub fn has_river_begin_or_end(&self) -> bool {
        self.incoming_river.is_some() != self.outgoing_river.is_some()
    }

    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }

    /// Explored and allowed to be explored at all.
    pub fn is_explored(&self) -> bool {
        self.explored && self.explorable
    }

    pub fn is_explorable(&self) -> bool {
        self.explorable
    }

    pub fn set_explorable(&mut self, explorable: bool) {
        self.explorable = explorable;
    }

    pub fn visibility(&self) -> u32 {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility > 0 && self.explorable
    }

    /// Returns true when the cell went from hidden to visible.
    pub(crate) fn increase_visibility(&mut self) -> bool {
        self.visibility += 1;
        if self.visibility == 1 {
            self.explored = true;
            true
        } else {
            false
        }
    }

    /// Returns true when the cell went from visible to hidden.
    pub(crate) fn decrease_visibility(&mut self) -> bool {
        if self.visibility == 0 {
            return false;
        }
        self.visibility -= 1;
        self.visibility == 0
    }

    pub(crate) fn reset_visibility(&mut self) -> bool {
        let was_visible = self.visibility > 0;
        self.visibility = 0;
        was_visible
    }

    pub fn distance(&self) -> u32 {
        self.search.distance
    }

    pub fn search_heuristic(&self) -> u32 {
        self.search.heuristic
    }

    pub fn search_phase(&self) -> u32 {
        self.search.phase
    }

    pub fn path_from(&self) -> Option<usize> {
        self.search.path_from
    }
}

impl BucketNode for HexCell {
    #[inline]
    fn search_priority(&self) -> usize {
        (self.search.distance + self.search.heuristic) as usize
    }

    #[inline]
    fn next_with_same_priority(&self) -> Option<usize> {
        self.search.next_with_same_priority
    }

    #[inline]
    fn set_next_with_same_priority(&mut self, next: Option<usize>) {
        self.search.next_with_same_priority = next;
    }
}

/// Raw per-cell attributes as persisted in a map snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRecord {
    pub terrain: TerrainKind,
    pub elevation: i32,
    pub water_level: i32,
    pub urban_level: u8,
    pub farm_level: u8,
    pub plant_level: u8,
    pub special_index: u8,
    pub walled: bool,
    pub incoming_river: Option<HexDirection>,
    pub outgoing_river: Option<HexDirection>,
    pub roads: RoadMask,
    pub explored: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

#[derive(Debug, Clone)]
pub struct HexGrid {
    width: u32,
    height: u32,
    cells: Vec<HexCell>,
}

impl HexGrid {
    /// Build a flat grid of `width` columns by `height` rows.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let mut grid = Self {
            width,
            height,
            cells: Vec::with_capacity(width as usize * height as usize),
        };
        for z in 0..height {
            for x in 0..width {
                grid.create_cell(x, z);
            }
        }
        Ok(grid)
    }

    fn create_cell(&mut self, x: u32, z: u32) {
        let index = self.cells.len();
        let width = self.width as usize;
        self.cells.push(HexCell::new(
            index,
            HexCoordinates::from_offset(x as i32, z as i32),
        ));

        if x > 0 {
            self.link(index, HexDirection::West, index - 1);
        }
        if z > 0 {
            if z & 1 == 0 {
                self.link(index, HexDirection::SouthEast, index - width);
                if x > 0 {
                    self.link(index, HexDirection::SouthWest, index - width - 1);
                }
            } else {
                self.link(index, HexDirection::SouthWest, index - width);
                if x + 1 < self.width {
                    self.link(index, HexDirection::SouthEast, index - width + 1);
                }
            }
        }
    }

    fn link(&mut self, from: usize, direction: HexDirection, to: usize) {
        self.cells[from].neighbors[direction as usize] = Some(to);
        self.cells[to].neighbors[direction.opposite() as usize] = Some(from);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [HexCell] {
        &mut self.cells
    }

    /// Cell by index. Panics on an index that did not come from this grid.
    #[inline]
    pub fn cell(&self, index: usize) -> &HexCell {
        &self.cells[index]
    }

    #[inline]
    pub fn cell_mut(&mut self, index: usize) -> &mut HexCell {
        &mut self.cells[index]
    }

    pub fn get(&self, index: usize) -> Option<&HexCell> {
        self.cells.get(index)
    }

    /// Index of the cell at an offset (column, row) position.
    pub fn index_at_offset(&self, x: i32, z: i32) -> Option<usize> {
        if x < 0 || z < 0 || x >= self.width as i32 || z >= self.height as i32 {
            return None;
        }
        Some(z as usize * self.width as usize + x as usize)
    }

    pub fn index_at(&self, coordinates: HexCoordinates) -> Option<usize> {
        let (x, z) = coordinates.to_offset();
        self.index_at_offset(x, z)
    }

    pub fn cell_at(&self, coordinates: HexCoordinates) -> Option<&HexCell> {
        self.index_at(coordinates).map(|index| &self.cells[index])
    }

    /// Offset (column, row) position of a cell.
    pub fn offset_of(&self, index: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }

    #[inline]
    pub fn neighbor(&self, index: usize, direction: HexDirection) -> Option<usize> {
        self.cells[index].neighbor(direction)
    }

    /// Existing neighbors of a cell in direction order.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (HexDirection, usize)> + '_ {
        let cell = &self.cells[index];
        HexDirection::ALL
            .into_iter()
            .filter_map(move |direction| cell.neighbor(direction).map(|n| (direction, n)))
    }

    pub fn edge_type(&self, from: usize, to: usize) -> EdgeType {
        EdgeType::between(self.cells[from].elevation, self.cells[to].elevation)
    }

    fn elevation_difference(&self, index: usize, direction: HexDirection) -> i32 {
        match self.neighbor(index, direction) {
            Some(neighbor) => (self.cells[index].elevation - self.cells[neighbor].elevation).abs(),
            None => 0,
        }
    }

    pub fn set_elevation(&mut self, index: usize, elevation: i32) {
        if self.cells[index].elevation == elevation {
            return;
        }
        self.cells[index].elevation = elevation;
        self.validate_rivers(index);
        for direction in HexDirection::ALL {
            if self.cells[index].has_road_through_edge(direction)
                && self.elevation_difference(index, direction) > 1
            {
                self.set_road(index, direction, false);
            }
        }
    }

    pub fn set_water_level(&mut self, index: usize, water_level: i32) {
        if self.cells[index].water_level == water_level {
            return;
        }
        self.cells[index].water_level = water_level;
        self.validate_rivers(index);
    }

    /// A river may flow from `from` into `to` if it does not climb, or if it
    /// leaves a lake whose surface is level with `to`.
    pub fn is_valid_river_destination(&self, from: usize, to: usize) -> bool {
        let source = &self.cells[from];
        let target = &self.cells[to];
        source.elevation >= target.elevation || source.water_level == target.elevation
    }

    fn validate_rivers(&mut self, index: usize) {
        if let Some(direction) = self.cells[index].outgoing_river {
            let valid = self
                .neighbor(index, direction)
                .is_some_and(|neighbor| self.is_valid_river_destination(index, neighbor));
            if !valid {
                self.remove_outgoing_river(index);
            }
        }
        if let Some(direction) = self.cells[index].incoming_river {
            let valid = self
                .neighbor(index, direction)
                .is_some_and(|neighbor| self.is_valid_river_destination(neighbor, index));
            if !valid {
                self.remove_incoming_river(index);
            }
        }
    }

    /// Route the cell's river out through `direction`. Returns false, leaving
    /// the grid untouched, when the edge would run uphill or the neighbor
    /// already receives a river.
    pub fn set_outgoing_river(&mut self, index: usize, direction: HexDirection) -> bool {
        if self.cells[index].outgoing_river == Some(direction) {
            return true;
        }
        let Some(neighbor) = self.neighbor(index, direction) else {
            return false;
        };
        if !self.is_valid_river_destination(index, neighbor)
            || self.cells[neighbor].incoming_river.is_some()
        {
            return false;
        }

        self.remove_outgoing_river(index);
        if self.cells[index].incoming_river == Some(direction) {
            self.remove_incoming_river(index);
        }

        let cell = &mut self.cells[index];
        cell.outgoing_river = Some(direction);
        cell.special_index = 0;

        let target = &mut self.cells[neighbor];
        target.incoming_river = Some(direction.opposite());
        target.special_index = 0;

        self.set_road(index, direction, false);
        true
    }

    pub fn remove_outgoing_river(&mut self, index: usize) {
        let Some(direction) = self.cells[index].outgoing_river.take() else {
            return;
        };
        if let Some(neighbor) = self.neighbor(index, direction) {
            self.cells[neighbor].incoming_river = None;
        }
    }

    pub fn remove_incoming_river(&mut self, index: usize) {
        let Some(direction) = self.cells[index].incoming_river.take() else {
            return;
        };
        if let Some(neighbor) = self.neighbor(index, direction) {
            self.cells[neighbor].outgoing_river = None;
        }
    }

    pub fn remove_river(&mut self, index: usize) {
        self.remove_outgoing_river(index);
        self.remove_incoming_river(index);
    }

    /// Add a road across one edge. Roads never cross rivers or cliffs and
    /// never touch special features.
    pub fn add_road(&mut self, index: usize, direction: HexDirection) -> bool {
        let Some(neighbor) = self.neighbor(index, direction) else {
            return false;
        };
        let cell = &self.cells[index];
        if cell.has_road_through_edge(direction)
            || cell.has_river_through_edge(direction)
            || cell.is_special()
            || self.cells[neighbor].is_special()
            || self.elevation_difference(index, direction) > 1
        {
            return false;
        }
        self.set_road(index, direction, true);
        true
    }

    pub fn remove_roads(&mut self, index: usize) {
        for direction in HexDirection::ALL {
            if self.cells[index].has_road_through_edge(direction) {
                self.set_road(index, direction, false);
            }
        }
    }

    fn set_road(&mut self, index: usize, direction: HexDirection, present: bool) {
        self.cells[index]
            .roads
            .set(RoadMask::from_direction(direction), present);
        if let Some(neighbor) = self.neighbor(index, direction) {
            self.cells[neighbor]
                .roads
                .set(RoadMask::from_direction(direction.opposite()), present);
        }
    }

    /// Place a special feature. Rejected on cells carrying a river.
    pub fn set_special_index(&mut self, index: usize, special_index: u8) -> bool {
        let cell = &self.cells[index];
        if cell.special_index == special_index {
            return true;
        }
        if cell.has_river() {
            return false;
        }
        self.cells[index].special_index = special_index;
        self.remove_roads(index);
        true
    }

    pub fn record(&self, index: usize) -> CellRecord {
        let cell = &self.cells[index];
        CellRecord {
            terrain: cell.terrain,
            elevation: cell.elevation,
            water_level: cell.water_level,
            urban_level: cell.urban_level,
            farm_level: cell.farm_level,
            plant_level: cell.plant_level,
            special_index: cell.special_index,
            walled: cell.walled,
            incoming_river: cell.incoming_river,
            outgoing_river: cell.outgoing_river,
            roads: cell.roads,
            explored: cell.is_explored(),
        }
    }

    /// Overwrite a cell with persisted attributes, bypassing neighbor upkeep.
    /// Callers restore every cell and then check consistency as a whole.
    pub(crate) fn restore(&mut self, index: usize, record: &CellRecord) {
        let cell = &mut self.cells[index];
        cell.terrain = record.terrain;
        cell.elevation = record.elevation;
        cell.water_level = record.water_level;
        cell.urban_level = record.urban_level.min(MAX_FEATURE_LEVEL);
        cell.farm_level = record.farm_level.min(MAX_FEATURE_LEVEL);
        cell.plant_level = record.plant_level.min(MAX_FEATURE_LEVEL);
        cell.special_index = record.special_index;
        cell.walled = record.walled;
        cell.incoming_river = record.incoming_river;
        cell.outgoing_river = record.outgoing_river;
        cell.roads = record.roads;
        cell.explored = record.explored;
    }

    /// First cell whose river or road edges are not mirrored by its neighbor.
    pub fn find_inconsistent_edge(&self) -> Option<usize> {
        self.cells.iter().position(|cell| {
            let river_ok = |direction: Option<HexDirection>, mirrored: fn(&HexCell) -> Option<HexDirection>| {
                match direction {
                    None => true,
                    Some(direction) => cell.neighbor(direction).is_some_and(|neighbor| {
                        mirrored(&self.cells[neighbor]) == Some(direction.opposite())
                    }),
                }
            };
            let roads_ok = HexDirection::ALL.into_iter().all(|direction| {
                if !cell.has_road_through_edge(direction) {
                    return true;
                }
                cell.neighbor(direction).is_some_and(|neighbor| {
                    self.cells[neighbor].has_road_through_edge(direction.opposite())
                })
            });
            !(river_ok(cell.outgoing_river, HexCell::incoming_river)
                && river_ok(cell.incoming_river, HexCell::outgoing_river)
                && roads_ok)
        })
    }
}
