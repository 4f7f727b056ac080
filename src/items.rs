//! Scatters keys and traps over carved floor by rejection sampling.

use rand::Rng;

use crate::config::GameConfig;
use crate::error::{GameError, ItemKind, Result};
use crate::maze::START;
use crate::tile::{Grid, Pos, Tile};

/// Samples allowed per grid cell before a placement gives up.
pub const ATTEMPTS_PER_CELL: usize = 64;

/// Traps never land this close (Manhattan) to the start.
pub const TRAP_SAFE_RADIUS: usize = 2;

/// Keys first, then traps, so a key cell can never become a trap.
pub fn place_items(grid: &mut Grid, config: &GameConfig, rng: &mut impl Rng) -> Result<()> {
    scatter(grid, rng, ItemKind::Key, config.total_keys, |grid, pos| {
        grid.get(pos) == Some(Tile::Floor)
    })?;
    scatter(grid, rng, ItemKind::Trap, config.trap_count, |grid, pos| {
        grid.get(pos) == Some(Tile::Floor) && pos.manhattan(START) > TRAP_SAFE_RADIUS
    })?;
    Ok(())
}

fn scatter<R, F>(
    grid: &mut Grid,
    rng: &mut R,
    item: ItemKind,
    required: usize,
    eligible: F,
) -> Result<()>
where
    R: Rng,
    F: Fn(&Grid, Pos) -> bool,
{
    if required == 0 {
        return Ok(());
    }

    let view: &Grid = grid;
    let available = view.positions().filter(|&pos| eligible(view, pos)).count();
    if available < required {
        return Err(GameError::InsufficientFloor {
            item,
            required,
            available,
        });
    }

    let tile = match item {
        ItemKind::Key => Tile::Key,
        ItemKind::Trap => Tile::Trap,
    };
    let max_attempts = ATTEMPTS_PER_CELL * grid.cols() * grid.rows();
    let mut placed = 0;
    let mut attempts = 0;

    while placed < required {
        if attempts >= max_attempts {
            return Err(GameError::PlacementExhausted {
                item,
                placed,
                required,
                attempts,
            });
        }
        attempts += 1;

        let pos = Pos::new(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()));
        if eligible(grid, pos) {
            grid.set(pos, tile);
            placed += 1;
        }
    }

    tracing::debug!(%item, placed, attempts, "items placed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::maze::generate_maze;

    fn config(total_keys: usize, trap_count: usize) -> GameConfig {
        GameConfig {
            total_keys,
            trap_count,
            ..GameConfig::default()
        }
    }

    #[test]
    fn reference_counts() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut grid = generate_maze(&mut rng, 21, 15).unwrap();
        place_items(&mut grid, &config(3, 6), &mut rng).unwrap();

        assert_eq!(grid.count(Tile::Key), 3);
        assert_eq!(grid.count(Tile::Trap), 6);
        assert_eq!(grid.get(START), Some(Tile::Start));
        assert_eq!(grid.get(Pos::new(19, 13)), Some(Tile::Exit));
    }

    #[test]
    fn too_many_keys_fail_before_sampling() {
        let mut rng = StdRng::seed_from_u64(1);
        // a 7x3 corridor has exactly three floor cells between start and exit
        let mut grid = generate_maze(&mut rng, 7, 3).unwrap();
        let err = place_items(&mut grid, &config(4, 0), &mut rng).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientFloor {
                item: ItemKind::Key,
                required: 4,
                available: 3,
            }
        );
    }

    #[test]
    fn traps_respect_start_radius_even_when_floor_exists() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = generate_maze(&mut rng, 7, 3).unwrap();
        // cells at x=2,3 are within distance 2 of the start; only x=4 qualifies
        let err = place_items(&mut grid, &config(0, 2), &mut rng).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientFloor {
                item: ItemKind::Trap,
                required: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn keys_take_floor_away_from_traps() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut grid = generate_maze(&mut rng, 7, 3).unwrap();
        let err = place_items(&mut grid, &config(3, 1), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFloor {
                item: ItemKind::Trap,
                available: 0,
                ..
            }
        ));
    }

    #[test]
    fn exhaustion_is_reported() {
        // an rng that always lands on a wall
        struct Corner;
        impl rand::RngCore for Corner {
            fn next_u32(&mut self) -> u32 {
                0
            }
            fn next_u64(&mut self) -> u64 {
                0
            }
            fn fill_bytes(&mut self, dest: &mut [u8]) {
                dest.fill(0);
            }
            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
                dest.fill(0);
                Ok(())
            }
        }

        let mut seeded = StdRng::seed_from_u64(2);
        let mut grid = generate_maze(&mut seeded, 21, 15).unwrap();
        let err = place_items(&mut grid, &config(1, 0), &mut Corner).unwrap_err();
        assert_eq!(
            err,
            GameError::PlacementExhausted {
                item: ItemKind::Key,
                placed: 0,
                required: 1,
                attempts: ATTEMPTS_PER_CELL * 21 * 15,
            }
        );
    }

    proptest! {
        #[test]
        fn placement_counts_and_constraints(
            seed in any::<u64>(),
            keys in 0usize..8,
            traps in 0usize..12,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = generate_maze(&mut rng, 21, 15).unwrap();
            let floor_before = grid.count(Tile::Floor);
            place_items(&mut grid, &config(keys, traps), &mut rng).unwrap();

            prop_assert_eq!(grid.count(Tile::Key), keys);
            prop_assert_eq!(grid.count(Tile::Trap), traps);
            prop_assert_eq!(grid.count(Tile::Floor), floor_before - keys - traps);
            for pos in grid.positions() {
                if grid.get(pos) == Some(Tile::Trap) {
                    prop_assert!(pos.manhattan(START) > TRAP_SAFE_RADIUS);
                }
            }
        }
    }
}
