use std::collections::HashSet;

use hexmap_core::HexGrid;

/// Draw the map as text, northernmost row first. Odd rows are shifted half a
/// cell to the right, matching the offset layout.
pub fn render_ascii(grid: &HexGrid, path: &[usize]) -> String {
    let on_path: HashSet<usize> = path.iter().copied().collect();
    let mut out = String::with_capacity((grid.width() as usize * 2 + 2) * grid.height() as usize);

    for z in (0..grid.height()).rev() {
        if z % 2 == 1 {
            out.push(' ');
        }
        let row: Vec<String> = (0..grid.width())
            .filter_map(|x| grid.index_at_offset(x as i32, z as i32))
            .map(|index| glyph(grid, index, &on_path).to_string())
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

fn glyph(grid: &HexGrid, index: usize, on_path: &HashSet<usize>) -> char {
    let cell = grid.cell(index);
    if on_path.contains(&index) {
        'o'
    } else if cell.is_underwater() {
        '~'
    } else if cell.has_river() {
        '='
    } else {
        cell.terrain().glyph()
    }
}
