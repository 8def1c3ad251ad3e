use crucible_core::CostGrid;

use crate::route::Route;

/// Draw `route` over `grid`.
///
/// Produces the grid's text form with every entered cell replaced by the
/// arrow of the heading it was entered with. The start cell keeps its
/// cost. Cells are separated by a space unless every cost is a single
/// digit, matching `CostGrid`'s `Display`.
pub fn render_route(grid: &CostGrid, route: &Route) -> String {
    let width = grid.width() as usize;
    let mut cells: Vec<String> = grid.iter().map(|(_, c)| c.to_string()).collect();
    let digits = cells.iter().all(|c| c.len() == 1);

    for step in &route.steps {
        let Some(h) = step.heading else {
            continue;
        };
        if grid.contains(step.pos) {
            let i = step.pos.y as usize * width + step.pos.x as usize;
            cells[i] = h.arrow().to_string();
        }
    }

    let sep = if digits { "" } else { " " };
    cells
        .chunks(width)
        .map(|row| row.join(sep))
        .collect::<Vec<_>>()
        .join("\n")
}
