//! Turn-based shortest paths over the hex grid.
//!
//! Costs are per edge: cliffs and wall boundaries block, roads cost 1, other
//! edges cost 5 (flat) or 10 (slope) plus the destination's urban, farm and
//! plant levels. A unit spends at most `speed` per turn and loses whatever it
//! cannot spend, so a step that does not fit into the current turn starts a
//! fresh one.

use serde::Serialize;

use crate::grid::HexGrid;
use crate::hex::{EdgeType, HexDirection};
use crate::search::{SearchContext, SearchState};

/// Who is moving and where it may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementRules {
    /// Movement points per turn; zero is treated as one.
    pub speed: u32,
    /// Only enter cells that have been explored.
    pub explored_only: bool,
}

impl MovementRules {
    pub fn new(speed: u32) -> Self {
        Self {
            speed,
            explored_only: false,
        }
    }
}

/// A found path, origin first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub cells: Vec<usize>,
    pub cost: u32,
    pub turns: u32,
}

impl Path {
    pub fn origin(&self) -> usize {
        self.cells[0]
    }

    pub fn destination(&self) -> usize {
        self.cells[self.cells.len() - 1]
    }
}

/// Cost of moving from `from` into its neighbor `to` across `direction`, or
/// `None` when the edge cannot be crossed.
pub fn move_cost(grid: &HexGrid, from: usize, to: usize, direction: HexDirection) -> Option<u32> {
    let edge = grid.edge_type(from, to);
    if edge == EdgeType::Cliff {
        return None;
    }
    let source = grid.cell(from);
    let target = grid.cell(to);
    if source.has_road_through_edge(direction) {
        return Some(1);
    }
    if source.walled() != target.walled() {
        return None;
    }
    let base = if edge == EdgeType::Flat { 5 } else { 10 };
    Some(
        base + u32::from(target.urban_level())
            + u32::from(target.farm_level())
            + u32::from(target.plant_level()),
    )
}

fn is_valid_destination(grid: &HexGrid, index: usize, rules: &MovementRules) -> bool {
    let cell = grid.cell(index);
    !cell.is_underwater() && (!rules.explored_only || cell.is_explored())
}

/// Cheapest path from `from` to `to` for a unit with `speed` movement points.
pub fn find_path(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    from: usize,
    to: usize,
    speed: u32,
) -> Option<Path> {
    find_path_with(grid, ctx, from, to, &MovementRules::new(speed))
}

pub fn find_path_with(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    from: usize,
    to: usize,
    rules: &MovementRules,
) -> Option<Path> {
    if from >= grid.cell_count() || to >= grid.cell_count() {
        return None;
    }
    let speed = rules.speed.max(1);
    if !search(grid, ctx, from, to, speed, rules) {
        tracing::trace!(target: "hexmap::search", from, to, speed, "path.not_found");
        return None;
    }

    let mut cells = vec![to];
    let mut current = to;
    while current != from {
        current = grid.cell(current).path_from()?;
        cells.push(current);
    }
    cells.reverse();

    let cost = grid.cell(to).distance();
    let turns = if cost == 0 { 0 } else { (cost - 1) / speed + 1 };
    tracing::trace!(
        target: "hexmap::search",
        from,
        to,
        cost,
        turns,
        len = cells.len(),
        "path.found"
    );
    Some(Path { cells, cost, turns })
}

fn search(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    from: usize,
    to: usize,
    speed: u32,
    rules: &MovementRules,
) -> bool {
    let phase = ctx.begin(grid);
    let target = grid.cell(to).coordinates();
    {
        let cell = &mut grid.cells_mut()[from];
        cell.search.phase = phase;
        cell.search.distance = 0;
        cell.search.heuristic = 0;
        cell.search.path_from = None;
    }
    ctx.frontier_mut().enqueue(grid.cells_mut(), from);

    while let Some(current) = ctx.frontier_mut().dequeue(grid.cells()) {
        grid.cells_mut()[current].search.phase += 1;
        if current == to {
            return true;
        }

        let current_distance = grid.cell(current).distance();
        let current_turn = current_distance.saturating_sub(1) / speed;

        for direction in HexDirection::ALL {
            let Some(neighbor) = grid.neighbor(current, direction) else {
                continue;
            };
            if ctx.state_of(grid.cell(neighbor).search_phase()) == SearchState::Closed
                || !is_valid_destination(grid, neighbor, rules)
            {
                continue;
            }
            let Some(cost) = move_cost(grid, current, neighbor, direction) else {
                continue;
            };

            let mut distance = current_distance + cost;
            let turn = (distance - 1) / speed;
            if turn > current_turn {
                distance = turn * speed + cost;
            }

            let cells = grid.cells_mut();
            if ctx.state_of(cells[neighbor].search.phase) == SearchState::Unvisited {
                let heuristic = cells[neighbor].coordinates().distance_to(target);
                let cell = &mut cells[neighbor];
                cell.search.phase = phase;
                cell.search.distance = distance;
                cell.search.heuristic = heuristic;
                cell.search.path_from = Some(current);
                ctx.frontier_mut().enqueue(cells, neighbor);
            } else if distance < cells[neighbor].search.distance {
                let old_priority = (cells[neighbor].search.distance
                    + cells[neighbor].search.heuristic) as usize;
                cells[neighbor].search.distance = distance;
                cells[neighbor].search.path_from = Some(current);
                ctx.frontier_mut().change(cells, neighbor, old_priority);
            }
        }
    }
    false
}
