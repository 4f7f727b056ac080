//! Session state machine: start, movement, collisions, trap danger, win/lose.
//!
//! `GameState` holds no presentation handles. Everything the UI needs is
//! either read through [`GameState::snapshot`] or drained as [`GameEvent`]s.

use rand::Rng;

use crate::config::GameConfig;
use crate::error::Result;
use crate::items::place_items;
use crate::maze::{generate_maze, START};
use crate::tile::{Dir, Grid, Pos, Tile};
use crate::trap::{Clock, TrapOscillator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Won { elapsed_secs: u64 },
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    KeysChanged { collected: usize, total: usize },
    Won { elapsed_secs: u64 },
    Lost,
}

#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub player: Pos,
    pub keys_collected: usize,
    pub total_keys: usize,
    pub phase: Phase,
    pub is_playing: bool,
    pub trap_active: bool,
    pub elapsed_secs: u64,
}

#[derive(Debug)]
struct Session {
    grid: Grid,
    player: Pos,
    keys_collected: usize,
    started_at_ms: u64,
    ended_at_ms: Option<u64>,
}

pub struct GameState<R, C> {
    config: GameConfig,
    oscillator: TrapOscillator,
    rng: R,
    clock: C,
    phase: Phase,
    session: Option<Session>,
    events: Vec<GameEvent>,
}

impl<R: Rng, C: Clock> GameState<R, C> {
    pub fn new(config: GameConfig, rng: R, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            oscillator: TrapOscillator::new(config.trap_cycle_ms)?,
            config,
            rng,
            clock,
            phase: Phase::Idle,
            session: None,
            events: Vec::new(),
        })
    }

    /// On failure the state is left `Idle`.
    pub fn start(&mut self) -> Result<()> {
        self.phase = Phase::Idle;
        self.session = None;

        let built = generate_maze(&mut self.rng, self.config.cols, self.config.rows).and_then(
            |mut grid| {
                place_items(&mut grid, &self.config, &mut self.rng)?;
                Ok(grid)
            },
        );
        let grid = match built {
            Ok(grid) => grid,
            Err(err) => {
                tracing::warn!(error = %err, "maze could not be generated");
                return Err(err);
            }
        };

        self.begin(grid);
        Ok(())
    }

    fn begin(&mut self, grid: Grid) {
        self.session = Some(Session {
            grid,
            player: START,
            keys_collected: 0,
            started_at_ms: self.clock.now_ms(),
            ended_at_ms: None,
        });
        self.phase = Phase::Playing;
        self.events.push(GameEvent::Started);
        self.events.push(GameEvent::KeysChanged {
            collected: 0,
            total: self.config.total_keys,
        });
        tracing::info!(
            cols = self.config.cols,
            rows = self.config.rows,
            keys = self.config.total_keys,
            traps = self.config.trap_count,
            "session started"
        );
    }

    // diagonal and multi-cell offsets are dropped
    pub fn move_by(&mut self, dx: isize, dy: isize) {
        if let Some(dir) = Dir::from_delta(dx, dy) {
            self.move_player(dir);
        }
    }

    pub fn move_player(&mut self, dir: Dir) {
        if self.phase != Phase::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(target) = session.grid.step(session.player, dir) else {
            return;
        };
        let tile = match session.grid.get(target) {
            Some(tile) if tile.is_walkable() => tile,
            _ => return,
        };

        session.player = target;
        self.resolve_collision(tile, target);
    }

    /// Runs against the tile as it was before the player stepped on it.
    fn resolve_collision(&mut self, tile: Tile, at: Pos) {
        match tile {
            Tile::Key => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                session.keys_collected += 1;
                session.grid.set(at, Tile::Floor);
                tracing::debug!(collected = session.keys_collected, "key collected");
                self.events.push(GameEvent::KeysChanged {
                    collected: session.keys_collected,
                    total: self.config.total_keys,
                });
            }
            Tile::Trap => {
                if self.trap_active() {
                    self.lose();
                }
            }
            Tile::Exit => {
                if self.keys_collected() >= self.config.total_keys {
                    self.win();
                }
            }
            Tile::Floor | Tile::Start | Tile::Wall => {}
        }
    }

    /// Must run every tick: a trap can switch on under a player who is
    /// standing still.
    pub fn check_current_tile_danger(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        let on_trap = self
            .session
            .as_ref()
            .is_some_and(|s| s.grid.get(s.player) == Some(Tile::Trap));
        if on_trap && self.trap_active() {
            self.lose();
        }
    }

    fn win(&mut self) {
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.ended_at_ms = Some(now);
        let elapsed_secs = now.saturating_sub(session.started_at_ms) / 1000;
        self.phase = Phase::Won { elapsed_secs };
        self.events.push(GameEvent::Won { elapsed_secs });
        tracing::info!(elapsed_secs, "maze escaped");
    }

    fn lose(&mut self) {
        let now = self.clock.now_ms();
        if let Some(session) = self.session.as_mut() {
            session.ended_at_ms = Some(now);
        }
        self.phase = Phase::Lost;
        self.events.push(GameEvent::Lost);
        tracing::info!("caught by a trap");
    }

    pub fn trap_active(&self) -> bool {
        self.oscillator.is_active(self.clock.now_ms())
    }

    /// Whole seconds since start, frozen once the session ends.
    pub fn elapsed_secs(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| {
            let end = s.ended_at_ms.unwrap_or_else(|| self.clock.now_ms());
            end.saturating_sub(s.started_at_ms) / 1000
        })
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn snapshot(&self) -> Option<Snapshot<'_>> {
        let session = self.session.as_ref()?;
        Some(Snapshot {
            grid: &session.grid,
            player: session.player,
            keys_collected: session.keys_collected,
            total_keys: self.config.total_keys,
            phase: self.phase,
            is_playing: self.is_playing(),
            trap_active: self.trap_active(),
            elapsed_secs: self.elapsed_secs(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn keys_collected(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.keys_collected)
    }

    pub fn player(&self) -> Option<Pos> {
        self.session.as_ref().map(|s| s.player)
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.session.as_ref().map(|s| &s.grid)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
