use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

/// Failures that prevent a session from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("maze dimensions {cols}x{rows} are invalid: both must be odd, at least 3, and leave room for distinct start and exit")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("trap cycle period must be greater than zero")]
    InvalidTrapPeriod,

    #[error("not enough floor for {required} {item}(s): only {available} eligible cells")]
    InsufficientFloor {
        item: ItemKind,
        required: usize,
        available: usize,
    },

    #[error("gave up placing {item}s after {attempts} samples ({placed}/{required} placed)")]
    PlacementExhausted {
        item: ItemKind,
        placed: usize,
        required: usize,
        attempts: usize,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Key,
    Trap,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::Key => "key",
            ItemKind::Trap => "trap",
        };
        f.write_str(label)
    }
}

/// Best-time storage failures. Never surfaced past the store itself.
#[derive(Debug, Error)]
pub enum BestTimeError {
    #[error("best time storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("best time record is corrupt: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no data directory available on this platform")]
    NoDataDir,
}
