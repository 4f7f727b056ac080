//! Mystery Maze: escape a freshly carved maze after collecting every key,
//! without standing on a trap while it is armed.
//!
//! The core is [`maze`] (carving), [`items`] (key and trap placement),
//! [`trap`] (the shared trap phase) and [`game`] (the session state machine).
//! [`input`], [`timer`], [`render`], [`best_time`] and [`app`] make up the
//! terminal front end around it.

pub mod app;
pub mod best_time;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod items;
pub mod logging;
pub mod maze;
pub mod render;
pub mod tile;
pub mod timer;
pub mod trap;

pub use config::{DisplayConfig, GameConfig};
pub use error::{GameError, Result};
pub use game::{GameEvent, GameState, Phase, Snapshot};
pub use tile::{Dir, Grid, Pos, Tile};
