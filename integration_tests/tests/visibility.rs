mod common;

use hexmap_core::{decrease_visibility, increase_visibility, visible_cells};

#[test]
fn viewers_can_be_added_and_removed_in_any_order() {
    let (mut grid, mut ctx, _) = common::generated_map(60, 40);
    let land = common::land_cells(&grid);
    let viewers: Vec<usize> = land.iter().step_by((land.len() / 5).max(1)).copied().collect();

    for &viewer in &viewers {
        let revealed = increase_visibility(&mut grid, &mut ctx, viewer, 3);
        assert!(revealed.iter().all(|&i| grid.cell(i).is_explored()));
        assert!(grid.cell(viewer).is_visible());
    }
    for &viewer in viewers.iter().rev().step_by(2) {
        decrease_visibility(&mut grid, &mut ctx, viewer, 3);
    }
    for &viewer in viewers.iter().rev().skip(1).step_by(2) {
        decrease_visibility(&mut grid, &mut ctx, viewer, 3);
    }
    assert!(grid.cells().iter().all(|cell| !cell.is_visible()));
    assert!(viewers.iter().all(|&v| grid.cell(v).is_explored()));
}

#[test]
fn sight_respects_range_and_height() {
    let (mut grid, mut ctx, _) = common::generated_map(60, 40);
    for viewer in common::land_cells(&grid).into_iter().step_by(97) {
        let visible = visible_cells(&mut grid, &mut ctx, viewer, 2);
        assert_eq!(visible[0], viewer);

        let origin = grid.cell(viewer).coordinates();
        let reach = 2 + grid.cell(viewer).view_elevation();
        for &index in &visible[1..] {
            let cell = grid.cell(index);
            let distance = origin.distance_to(cell.coordinates()) as i32;
            assert!(distance + cell.view_elevation() <= reach);
        }
    }
}
