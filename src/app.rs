//! Session driver: routes input to the game, runs the tick timers, reacts to
//! game events and feeds the renderer.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use rand::Rng;

use crate::best_time::BestTimeStore;
use crate::config::{DisplayConfig, GameConfig};
use crate::error::Result;
use crate::game::{GameEvent, GameState};
use crate::input::{map_key, Command, Input, InputHandle};
use crate::render::{Hud, Overlay, Renderer};
use crate::timer::Ticker;
use crate::trap::Clock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<R, C> {
    game: GameState<R, C>,
    input: Input,
    handle: Option<InputHandle>,
    frame: Ticker,
    second: Ticker,
    best: BestTimeStore,
    hud: Hud,
    renderer: Renderer,
}

impl<R: Rng, C: Clock> App<R, C> {
    pub fn new(
        config: GameConfig,
        display: DisplayConfig,
        rng: R,
        clock: C,
        best: BestTimeStore,
    ) -> Result<Self> {
        let game = GameState::new(config, rng, clock)?;
        let best_secs = best.load();
        Ok(Self {
            game,
            input: Input::new(display.repeat_ms, display.release_events),
            handle: None,
            frame: Ticker::from_fps(display.render_fps),
            second: Ticker::new(Duration::from_secs(1)),
            best,
            hud: Hud {
                clock_secs: 0,
                best_secs,
                overlay: Overlay::Start,
            },
            renderer: Renderer::new(config.cols, config.rows),
        })
    }

    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Flow {
        match map_key(key) {
            Some(command) => self.handle_command(command, now),
            None => Flow::Continue,
        }
    }

    pub fn handle_command(&mut self, command: Command, now: Instant) -> Flow {
        match command {
            Command::Quit => {
                self.end_session();
                return Flow::Quit;
            }
            Command::Start => {
                if !self.game.is_playing() {
                    self.start_session(now);
                }
            }
            Command::Move(dir) => {
                if let Some(dir) = self.handle.as_mut().and_then(|h| h.press(dir, now)) {
                    self.game.move_player(dir);
                }
            }
            Command::Release(dir) => {
                if let Some(handle) = self.handle.as_mut() {
                    handle.release(dir);
                }
            }
        }
        self.process_events();
        Flow::Continue
    }

    /// Tears down the previous session's timers and input before the new
    /// session attaches its own.
    pub fn start_session(&mut self, now: Instant) {
        self.end_session();
        self.renderer.invalidate();

        if let Err(err) = self.game.start() {
            self.hud.overlay = Overlay::Failed(err.to_string());
            return;
        }
        self.handle = Some(self.input.attach());
        self.frame.start(now);
        self.second.start(now);
        self.hud.clock_secs = 0;
        self.hud.overlay = Overlay::None;
        self.process_events();
    }

    fn end_session(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.detach();
        }
        self.frame.stop();
        self.second.stop();
    }

    pub fn update(&mut self, now: Instant) {
        if let Some(dir) = self.handle.as_mut().and_then(|h| h.poll_repeat(now)) {
            self.game.move_player(dir);
        }
        if self.frame.fire(now) {
            self.game.check_current_tile_danger();
        }
        if self.second.fire(now) {
            self.hud.clock_secs = self.game.elapsed_secs();
        }
        self.process_events();
    }

    fn process_events(&mut self) {
        let events: Vec<GameEvent> = self.game.drain_events().collect();
        for event in events {
            match event {
                GameEvent::Started => {}
                GameEvent::KeysChanged { collected, total } => {
                    tracing::debug!(collected, total, "keys changed");
                }
                GameEvent::Won { elapsed_secs } => {
                    self.end_session();
                    self.hud.clock_secs = elapsed_secs;
                    self.hud.best_secs = self.best.record(elapsed_secs);
                    self.hud.overlay = Overlay::Won { elapsed_secs };
                }
                GameEvent::Lost => {
                    self.end_session();
                    self.hud.clock_secs = self.game.elapsed_secs();
                    self.hud.overlay = Overlay::Lost;
                }
            }
        }
    }

    pub fn draw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.renderer.draw(out, self.game.snapshot(), &self.hud)
    }

    pub fn frame_period(&self) -> Duration {
        self.frame.period()
    }

    pub fn game(&self) -> &GameState<R, C> {
        &self.game
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn timers_running(&self) -> bool {
        self.frame.is_running() || self.second.is_running()
    }

    pub fn input_attached(&self) -> bool {
        self.handle.as_ref().is_some_and(InputHandle::is_attached)
    }
}
