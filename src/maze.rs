//! Randomized depth-first maze carving.
//!
//! Carve points sit on odd coordinates; each step jumps two cells and opens
//! the wall in between, so the result is a spanning tree over the carve
//! points (a perfect maze).

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::validate_dimensions;
use crate::error::Result;
use crate::tile::{Grid, Pos, Tile};

pub const START: Pos = Pos::new(1, 1);

const CARVE_STEPS: [(isize, isize); 4] = [(0, -2), (0, 2), (-2, 0), (2, 0)];

pub fn exit_for(cols: usize, rows: usize) -> Pos {
    Pos::new(cols - 2, rows - 2)
}

/// A fresh uniformly shuffled copy of the four carve steps.
pub fn shuffled_directions(rng: &mut impl Rng) -> [(isize, isize); 4] {
    let mut dirs = CARVE_STEPS;
    dirs.shuffle(rng);
    dirs
}

pub fn generate_maze(rng: &mut impl Rng, cols: usize, rows: usize) -> Result<Grid> {
    validate_dimensions(cols, rows)?;

    let mut grid = Grid::filled(cols, rows, Tile::Wall);
    let mut stack = vec![START];
    grid.set(START, Tile::Floor);

    while let Some(&current) = stack.last() {
        let mut advanced = false;
        for (dx, dy) in shuffled_directions(rng) {
            let Some(next) = carve_target(&grid, current, dx, dy) else {
                continue;
            };
            let wall = Pos::new((current.x + next.x) / 2, (current.y + next.y) / 2);
            grid.set(wall, Tile::Floor);
            grid.set(next, Tile::Floor);
            stack.push(next);
            advanced = true;
            break;
        }
        if !advanced {
            stack.pop();
        }
    }

    grid.set(START, Tile::Start);
    grid.set(exit_for(cols, rows), Tile::Exit);

    tracing::debug!(cols, rows, floor = grid.count(Tile::Floor), "maze carved");
    Ok(grid)
}

/// Strictly interior, still-uncarved target two cells away.
fn carve_target(grid: &Grid, from: Pos, dx: isize, dy: isize) -> Option<Pos> {
    let nx = from.x.checked_add_signed(dx)?;
    let ny = from.y.checked_add_signed(dy)?;
    if nx == 0 || ny == 0 || nx >= grid.cols() - 1 || ny >= grid.rows() - 1 {
        return None;
    }
    let next = Pos::new(nx, ny);
    (grid.get(next) == Some(Tile::Wall)).then_some(next)
}
