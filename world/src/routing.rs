//! Breadth-first route planner used by the world crate.

use std::collections::VecDeque;

use courier_core::{CellCoord, TerrainMap};

/// Computes the shortest road route from `start` to `end`, both inclusive.
///
/// The search expands the 4-neighborhood of each dequeued cell in the fixed
/// order North, East, South, West, which pins down which of several
/// equal-length routes is returned. Neighbors must be in bounds, classified
/// as road, and unvisited; the start cell itself is searched from even when
/// it is not road. Returns an empty route when `end` is unreachable.
pub(crate) fn shortest_route(
    map: &TerrainMap,
    start: CellCoord,
    end: CellCoord,
) -> Vec<CellCoord> {
    if !map.contains(start) || !map.contains(end) {
        return Vec::new();
    }
    if start == end {
        return vec![start];
    }

    let Ok(width) = usize::try_from(map.columns()) else {
        return Vec::new();
    };
    let mut visited = vec![false; map.cell_count()];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; map.cell_count()];
    let mut queue = VecDeque::new();

    if let Some(start_index) = index(width, start) {
        visited[start_index] = true;
    }
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if cell == end {
            break;
        }

        for neighbor in neighbors(cell, map.columns(), map.rows()) {
            if !map.is_road(neighbor) {
                continue;
            }

            let Some(neighbor_index) = index(width, neighbor) else {
                continue;
            };
            if visited[neighbor_index] {
                continue;
            }

            visited[neighbor_index] = true;
            came_from[neighbor_index] = Some(cell);
            queue.push_back(neighbor);
        }
    }

    // Walk the predecessor chain backward; a broken chain means no route.
    let mut route = Vec::new();
    let mut cursor = end;
    loop {
        route.push(cursor);
        if cursor == start {
            break;
        }

        let Some(cursor_index) = index(width, cursor) else {
            return Vec::new();
        };
        match came_from[cursor_index] {
            Some(previous) => cursor = previous,
            None => return Vec::new(),
        }
    }

    route.reverse();
    route
}

fn neighbors(cell: CellCoord, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < columns {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < rows {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
