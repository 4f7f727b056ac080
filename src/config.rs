//! Game and display settings, with optional environment overrides.

use std::env;

use crate::error::{GameError, Result};

pub const DEFAULT_COLS: usize = 21;
pub const DEFAULT_ROWS: usize = 15;
pub const DEFAULT_TOTAL_KEYS: usize = 3;
pub const DEFAULT_TRAP_COUNT: usize = 6;
pub const DEFAULT_TRAP_CYCLE_MS: u64 = 2000;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const DEFAULT_REPEAT_MS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub cols: usize,
    pub rows: usize,
    pub total_keys: usize,
    pub trap_count: usize,
    pub trap_cycle_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            total_keys: DEFAULT_TOTAL_KEYS,
            trap_count: DEFAULT_TRAP_COUNT,
            trap_cycle_ms: DEFAULT_TRAP_CYCLE_MS,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by `MAZE_COLS`, `MAZE_ROWS`, `MAZE_KEYS`,
    /// `MAZE_TRAPS` and `MAZE_TRAP_CYCLE_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(cols) = read_env("MAZE_COLS") {
            config.cols = cols;
        }
        if let Some(rows) = read_env("MAZE_ROWS") {
            config.rows = rows;
        }
        if let Some(keys) = read_env("MAZE_KEYS") {
            config.total_keys = keys;
        }
        if let Some(traps) = read_env("MAZE_TRAPS") {
            config.trap_count = traps;
        }
        if let Some(period) = read_env("MAZE_TRAP_CYCLE_MS") {
            config.trap_cycle_ms = period;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.cols, self.rows)?;
        if self.trap_cycle_ms == 0 {
            return Err(GameError::InvalidTrapPeriod);
        }
        Ok(())
    }
}

/// Odd, at least 3, and not 3x3 (start and exit would share a cell).
pub fn validate_dimensions(cols: usize, rows: usize) -> Result<()> {
    let odd = cols % 2 == 1 && rows % 2 == 1;
    let big_enough = cols >= 3 && rows >= 3 && (cols > 3 || rows > 3);
    if odd && big_enough {
        Ok(())
    } else {
        Err(GameError::InvalidDimensions { cols, rows })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub render_fps: u64,
    /// Interval between repeated moves while a direction is held.
    pub repeat_ms: u64,
    /// Set when the terminal reports key releases.
    pub release_events: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_fps: DEFAULT_RENDER_FPS,
            repeat_ms: DEFAULT_REPEAT_MS,
            release_events: false,
        }
    }
}

impl DisplayConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(fps) = read_env::<u64>("MAZE_FPS").filter(|v| *v > 0) {
            config.render_fps = fps;
        }
        if let Some(repeat) = read_env::<u64>("MAZE_REPEAT_MS").filter(|v| *v > 0) {
            config.repeat_ms = repeat;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
