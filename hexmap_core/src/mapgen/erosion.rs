//! Erosion: move elevation from steep cells onto their lower neighbors until
//! only the configured share of steep cells remains.

use rand::Rng;

use crate::grid::HexGrid;

/// A cell is erodible when some neighbor lies at least two steps lower.
pub fn is_erodible(grid: &HexGrid, index: usize) -> bool {
    let erodible_elevation = grid.cell(index).elevation() - 2;
    grid.neighbors(index)
        .any(|(_, neighbor)| grid.cell(neighbor).elevation() <= erodible_elevation)
}

/// Candidate set with O(1) membership, insertion and removal.
#[derive(Debug)]
struct ErodibleCells {
    cells: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl ErodibleCells {
    fn new(cell_count: usize) -> Self {
        Self {
            cells: Vec::new(),
            slots: vec![None; cell_count],
        }
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn get(&self, slot: usize) -> usize {
        self.cells[slot]
    }

    fn contains(&self, index: usize) -> bool {
        self.slots[index].is_some()
    }

    fn insert(&mut self, index: usize) {
        if self.contains(index) {
            return;
        }
        self.slots[index] = Some(self.cells.len());
        self.cells.push(index);
    }

    fn remove(&mut self, index: usize) {
        let Some(slot) = self.slots[index].take() else {
            return;
        };
        self.cells.swap_remove(slot);
        if let Some(&moved) = self.cells.get(slot) {
            self.slots[moved] = Some(slot);
        }
    }
}

/// Erode the grid in place. Returns the number of single-step moves made.
pub(crate) fn erode_land<R: Rng + ?Sized>(
    grid: &mut HexGrid,
    erosion_percentage: u32,
    rng: &mut R,
) -> usize {
    let mut candidates = ErodibleCells::new(grid.cell_count());
    for index in 0..grid.cell_count() {
        if is_erodible(grid, index) {
            candidates.insert(index);
        }
    }

    let target = (candidates.len() as f32 * (100 - erosion_percentage.min(100)) as f32 * 0.01)
        as usize;
    let mut steps = 0;

    while candidates.len() > target {
        let source = candidates.get(rng.gen_range(0..candidates.len()));
        let destination = erosion_target(grid, source, rng);

        let source_elevation = grid.cell(source).elevation() - 1;
        let destination_elevation = grid.cell(destination).elevation() + 1;
        grid.set_elevation(source, source_elevation);
        grid.set_elevation(destination, destination_elevation);
        steps += 1;

        if !is_erodible(grid, source) {
            candidates.remove(source);
        }
        let newly_steep: Vec<usize> = grid
            .neighbors(source)
            .map(|(_, neighbor)| neighbor)
            .filter(|&neighbor| grid.cell(neighbor).elevation() == source_elevation + 2)
            .collect();
        for neighbor in newly_steep {
            candidates.insert(neighbor);
        }

        if is_erodible(grid, destination) {
            candidates.insert(destination);
        }
        let flattened: Vec<usize> = grid
            .neighbors(destination)
            .map(|(_, neighbor)| neighbor)
            .filter(|&neighbor| {
                neighbor != source
                    && grid.cell(neighbor).elevation() == destination_elevation + 1
                    && !is_erodible(grid, neighbor)
            })
            .collect();
        for neighbor in flattened {
            candidates.remove(neighbor);
        }
    }

    steps
}

fn erosion_target<R: Rng + ?Sized>(grid: &HexGrid, index: usize, rng: &mut R) -> usize {
    let erodible_elevation = grid.cell(index).elevation() - 2;
    let lower: Vec<usize> = grid
        .neighbors(index)
        .map(|(_, neighbor)| neighbor)
        .filter(|&neighbor| grid.cell(neighbor).elevation() <= erodible_elevation)
        .collect();
    lower[rng.gen_range(0..lower.len())]
}
