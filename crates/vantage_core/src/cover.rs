use crate::blueprints::Blueprints;
use crate::cell::Cell;
use crate::obstacle::ObstacleRegistry;
use crate::rules::Rules;

/// Integer line walk from `from` to `to`, excluding both endpoints.
///
/// Classic error-accumulating traversal: step along the dominant axis,
/// switch axis when the accumulated error flips sign. Deterministic for
/// any pair of cells, so both sides of a firefight agree on which cells
/// shield whom.
pub fn cells_between(from: Cell, to: Cell) -> Vec<Cell> {
    let dx = (to.x - from.x).abs();
    let dz = (to.z - from.z).abs();
    let sx = (to.x - from.x).signum();
    let sz = (to.z - from.z).signum();

    let mut cells = vec![];
    let mut x = from.x;
    let mut z = from.z;
    let mut err = dx - dz;
    loop {
        let e2 = 2 * err;
        if e2 > -dz {
            err -= dz;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            z += sz;
        }
        if x == to.x && z == to.z {
            break;
        }
        cells.push(Cell::new(x, z));
    }
    cells
}

/// Maximum cover value contributed by obstacles strictly between the two
/// cells. Zero when partial cover is disabled or nothing intervenes.
pub fn cover_between(
    from: Cell,
    to: Cell,
    rules: &Rules,
    registry: &ObstacleRegistry,
    blueprints: &Blueprints,
) -> f32 {
    if !rules.partial_cover || from == to {
        return 0.0;
    }
    cells_between(from, to)
        .into_iter()
        .filter_map(|cell| registry.get(cell))
        .map(|obstacle| blueprints.get(obstacle.kind).cover_value)
        .fold(0.0, f32::max)
}
