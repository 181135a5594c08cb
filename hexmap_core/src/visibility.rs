//! Line-of-sight style visibility around a viewer.
//!
//! Sight grows one cell per step from the viewer. A viewer standing high sees
//! farther, and a tall target uses up range: a cell at step `d` is visible
//! when `d + target_view_elevation <= range + viewer_view_elevation`. Detours
//! longer than the straight hex distance do not count, and cells that are not
//! explorable block sight entirely.
//!
//! Every cell keeps a counter of viewers that currently see it, so overlapping
//! viewers can be added and removed independently.

use crate::grid::HexGrid;
use crate::hex::HexDirection;
use crate::search::{SearchContext, SearchState};

/// Cells visible from `from` with sight `range`, viewer first.
pub fn visible_cells(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    from: usize,
    range: u32,
) -> Vec<usize> {
    let mut visible = Vec::new();
    if from >= grid.cell_count() {
        return visible;
    }

    let phase = ctx.begin(grid);
    let range = range as i64 + i64::from(grid.cell(from).view_elevation());
    let origin = grid.cell(from).coordinates();
    {
        let cell = &mut grid.cells_mut()[from];
        cell.search.phase = phase;
        cell.search.distance = 0;
        cell.search.heuristic = 0;
    }
    ctx.frontier_mut().enqueue(grid.cells_mut(), from);

    while let Some(current) = ctx.frontier_mut().dequeue(grid.cells()) {
        grid.cells_mut()[current].search.phase += 1;
        visible.push(current);

        let distance = grid.cell(current).distance() + 1;
        for direction in HexDirection::ALL {
            let Some(neighbor) = grid.neighbor(current, direction) else {
                continue;
            };
            let cell = grid.cell(neighbor);
            if ctx.state_of(cell.search_phase()) == SearchState::Closed || !cell.is_explorable() {
                continue;
            }
            if i64::from(distance) + i64::from(cell.view_elevation()) > range
                || distance > origin.distance_to(cell.coordinates())
            {
                continue;
            }

            let cells = grid.cells_mut();
            if ctx.state_of(cells[neighbor].search.phase) == SearchState::Unvisited {
                let cell = &mut cells[neighbor];
                cell.search.phase = phase;
                cell.search.distance = distance;
                cell.search.heuristic = 0;
                ctx.frontier_mut().enqueue(cells, neighbor);
            } else if distance < cells[neighbor].search.distance {
                let old_priority = cells[neighbor].search.distance as usize;
                cells[neighbor].search.distance = distance;
                ctx.frontier_mut().change(cells, neighbor, old_priority);
            }
        }
    }

    tracing::trace!(
        target: "hexmap::search",
        from,
        range,
        visible = visible.len(),
        "visibility.scan"
    );
    visible
}

/// Add one viewer. Returns the cells that just became visible; each of them
/// is now explored.
pub fn increase_visibility(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    from: usize,
    range: u32,
) -> Vec<usize> {
    visible_cells(grid, ctx, from, range)
        .into_iter()
        .filter(|&index| grid.cell_mut(index).increase_visibility())
        .collect()
}

/// Remove one viewer previously added with the same arguments. Returns the
/// cells that just became hidden.
pub fn decrease_visibility(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    from: usize,
    range: u32,
) -> Vec<usize> {
    visible_cells(grid, ctx, from, range)
        .into_iter()
        .filter(|&index| grid.cell_mut(index).decrease_visibility())
        .collect()
}

/// Drop every viewer. Returns the cells that were visible.
pub fn reset_visibility(grid: &mut HexGrid) -> Vec<usize> {
    (0..grid.cell_count())
        .filter(|&index| grid.cell_mut(index).reset_visibility())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32) -> HexGrid {
        HexGrid::new(width, height).unwrap()
    }

    #[test]
    fn flat_sight_is_a_hexagon() {
        let mut grid = flat(15, 15);
        let mut ctx = SearchContext::new();
        let center = grid.index_at_offset(7, 7).unwrap();
        let visible = visible_cells(&mut grid, &mut ctx, center, 3);
        // 1 + 6 + 12 + 18
        assert_eq!(visible.len(), 37);
        assert_eq!(visible[0], center);
        let origin = grid.cell(center).coordinates();
        assert!(visible
            .iter()
            .all(|&i| grid.cell(i).coordinates().distance_to(origin) <= 3));
    }

    #[test]
    fn zero_range_sees_only_self() {
        let mut grid = flat(5, 5);
        let mut ctx = SearchContext::new();
        assert_eq!(visible_cells(&mut grid, &mut ctx, 12, 0), vec![12]);
    }

    #[test]
    fn height_extends_and_blocks_sight() {
        let mut grid = flat(15, 15);
        let mut ctx = SearchContext::new();
        let center = grid.index_at_offset(7, 7).unwrap();
        grid.set_elevation(center, 2);
        // Standing two steps up turns a range of 1 into a radius of 3.
        assert_eq!(visible_cells(&mut grid, &mut ctx, center, 1).len(), 37);

        // A ridge east of the viewer is too tall to see and hides what lies
        // behind it; the open western side is unaffected.
        let ridge = grid.neighbor(center, HexDirection::East).unwrap();
        let behind = grid.neighbor(ridge, HexDirection::East).unwrap();
        let west = grid.neighbor(center, HexDirection::West).unwrap();
        let far_west = grid.neighbor(west, HexDirection::West).unwrap();
        grid.set_elevation(ridge, 6);
        let visible = visible_cells(&mut grid, &mut ctx, center, 4);
        assert!(!visible.contains(&ridge));
        assert!(!visible.contains(&behind));
        assert!(visible.contains(&far_west));
    }

    #[test]
    fn unexplorable_cells_block() {
        let mut grid = flat(5, 5);
        let mut ctx = SearchContext::new();
        let center = grid.index_at_offset(2, 2).unwrap();
        for (_, neighbor) in grid.neighbors(center).collect::<Vec<_>>() {
            grid.cell_mut(neighbor).set_explorable(false);
        }
        assert_eq!(visible_cells(&mut grid, &mut ctx, center, 3), vec![center]);
    }

    #[test]
    fn counters_track_overlapping_viewers() {
        let mut grid = flat(10, 10);
        let mut ctx = SearchContext::new();
        let a = grid.index_at_offset(3, 4).unwrap();
        let b = grid.index_at_offset(4, 4).unwrap();

        let revealed_a = increase_visibility(&mut grid, &mut ctx, a, 1);
        assert_eq!(revealed_a.len(), 7);
        let revealed_b = increase_visibility(&mut grid, &mut ctx, b, 1);
        // The two hexagons share the viewers and two more cells.
        assert_eq!(revealed_b.len(), 3);
        assert!(revealed_a.iter().all(|&i| grid.cell(i).is_explored()));

        let hidden = decrease_visibility(&mut grid, &mut ctx, a, 1);
        assert_eq!(hidden.len(), 3);
        assert!(grid.cell(a).is_visible());
        assert!(grid.cell(hidden[0]).is_explored());

        let cleared = reset_visibility(&mut grid);
        assert_eq!(cleared.len(), 7);
        assert!(grid.cells().iter().all(|c| !c.is_visible()));
    }
}
