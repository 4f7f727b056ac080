//! Keyboard mapping and the attachable movement handle.
//!
//! Only one [`InputHandle`] is live at a time: attaching a new one, calling
//! [`InputHandle::detach`], or dropping it makes every older handle inert, so
//! a stale handle can never move the player on a fresh grid.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::tile::Dir;

/// How long after the last key event a direction still counts as held.
pub const INPUT_HOLD_MS: u64 = 160;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Dir),
    Release(Dir),
    Start,
    Quit,
}

pub fn map_key(key: &KeyEvent) -> Option<Command> {
    let dir = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('k') => {
            Some(Dir::Up)
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') => {
            Some(Dir::Down)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') => {
            Some(Dir::Left)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') => {
            Some(Dir::Right)
        }
        _ => None,
    };

    match key.kind {
        KeyEventKind::Release => dir.map(Command::Release),
        KeyEventKind::Press | KeyEventKind::Repeat => {
            if let Some(dir) = dir {
                return Some(Command::Move(dir));
            }
            match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') => Some(Command::Start),
                KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
                _ => None,
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Held {
    dir: Dir,
    last_seen: Instant,
    next_repeat: Instant,
}

#[derive(Debug)]
pub struct Input {
    repeat: Duration,
    hold: Option<Duration>,
    active: Rc<Cell<u64>>,
    next_id: u64,
}

impl Input {
    /// Without release events a direction counts as held for
    /// [`INPUT_HOLD_MS`] after its last key event. With them it is held
    /// until released.
    pub fn new(repeat_ms: u64, release_events: bool) -> Self {
        Self {
            repeat: Duration::from_millis(repeat_ms),
            hold: (!release_events).then(|| Duration::from_millis(INPUT_HOLD_MS)),
            active: Rc::new(Cell::new(0)),
            next_id: 1,
        }
    }

    pub fn attach(&mut self) -> InputHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.active.set(id);
        tracing::debug!(id, "input attached");
        InputHandle {
            id,
            active: Rc::clone(&self.active),
            repeat: self.repeat,
            hold: self.hold,
            held: None,
        }
    }

    pub fn has_active_handle(&self) -> bool {
        self.active.get() != 0
    }
}

#[derive(Debug)]
pub struct InputHandle {
    id: u64,
    active: Rc<Cell<u64>>,
    repeat: Duration,
    hold: Option<Duration>,
    held: Option<Held>,
}

impl InputHandle {
    pub fn is_attached(&self) -> bool {
        self.active.get() == self.id
    }

    /// Every key event moves at once and pushes the next repeat back.
    pub fn press(&mut self, dir: Dir, now: Instant) -> Option<Dir> {
        if !self.is_attached() {
            self.held = None;
            return None;
        }
        self.held = Some(Held {
            dir,
            last_seen: now,
            next_repeat: now + self.repeat,
        });
        Some(dir)
    }

    pub fn release(&mut self, dir: Dir) {
        if self.held.is_some_and(|held| held.dir == dir) {
            self.held = None;
        }
    }

    pub fn poll_repeat(&mut self, now: Instant) -> Option<Dir> {
        if !self.is_attached() {
            self.held = None;
            return None;
        }
        let held = self.held.as_mut()?;
        if self
            .hold
            .is_some_and(|hold| now.saturating_duration_since(held.last_seen) > hold)
        {
            self.held = None;
            return None;
        }
        if now < held.next_repeat {
            return None;
        }
        held.next_repeat = now + self.repeat;
        Some(held.dir)
    }

    pub fn detach(mut self) {
        self.release_slot();
    }

    fn release_slot(&mut self) {
        self.held = None;
        if self.is_attached() {
            self.active.set(0);
            tracing::debug!(id = self.id, "input detached");
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.release_slot();
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, KeyModifiers};

    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn key_mapping() {
        assert_eq!(
            map_key(&key(KeyCode::Up, KeyEventKind::Press)),
            Some(Command::Move(Dir::Up))
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('D'), KeyEventKind::Repeat)),
            Some(Command::Move(Dir::Right))
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('h'), KeyEventKind::Release)),
            Some(Command::Release(Dir::Left))
        );
        assert_eq!(
            map_key(&key(KeyCode::Enter, KeyEventKind::Press)),
            Some(Command::Start)
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('q'), KeyEventKind::Press)),
            Some(Command::Quit)
        );
        assert_eq!(map_key(&key(KeyCode::Char('q'), KeyEventKind::Release)), None);
        assert_eq!(map_key(&key(KeyCode::Char('x'), KeyEventKind::Press)), None);
    }

    #[test]
    fn quick_taps_each_move() {
        let mut input = Input::new(200, false);
        let mut handle = input.attach();
        let t0 = Instant::now();
        for ms in [0, 40, 80] {
            assert_eq!(
                handle.press(Dir::Right, t0 + Duration::from_millis(ms)),
                Some(Dir::Right)
            );
        }
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(120)), None);
    }

    #[test]
    fn held_key_repeats_until_released() {
        let mut input = Input::new(200, true);
        let mut handle = input.attach();
        let t0 = Instant::now();

        assert_eq!(handle.press(Dir::Down, t0), Some(Dir::Down));
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(150)), None);
        assert_eq!(
            handle.poll_repeat(t0 + Duration::from_millis(210)),
            Some(Dir::Down)
        );
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(250)), None);
        assert_eq!(
            handle.poll_repeat(t0 + Duration::from_millis(410)),
            Some(Dir::Down)
        );

        handle.release(Dir::Down);
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(700)), None);
    }

    #[test]
    fn autorepeat_events_push_the_timer_back() {
        let mut input = Input::new(200, true);
        let mut handle = input.attach();
        let t0 = Instant::now();
        handle.press(Dir::Left, t0);
        handle.press(Dir::Left, t0 + Duration::from_millis(150));
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(210)), None);
        assert_eq!(
            handle.poll_repeat(t0 + Duration::from_millis(350)),
            Some(Dir::Left)
        );
    }

    #[test]
    fn hold_expires_without_key_events() {
        let mut input = Input::new(200, false);
        let mut handle = input.attach();
        let t0 = Instant::now();
        handle.press(Dir::Left, t0);
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(400)), None);
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(600)), None);
    }

    #[test]
    fn release_of_another_direction_keeps_the_hold() {
        let mut input = Input::new(200, true);
        let mut handle = input.attach();
        let t0 = Instant::now();
        handle.press(Dir::Up, t0);
        handle.release(Dir::Left);
        assert_eq!(
            handle.poll_repeat(t0 + Duration::from_millis(200)),
            Some(Dir::Up)
        );
        handle.release(Dir::Up);
        assert_eq!(handle.poll_repeat(t0 + Duration::from_millis(400)), None);
    }

    #[test]
    fn attaching_again_disarms_the_old_handle() {
        let mut input = Input::new(200, false);
        let mut old = input.attach();
        let t0 = Instant::now();
        old.press(Dir::Up, t0);

        let mut fresh = input.attach();
        assert!(!old.is_attached());
        assert_eq!(old.poll_repeat(t0 + Duration::from_millis(100)), None);
        assert_eq!(old.press(Dir::Down, t0), None);

        // dropping the stale handle must not detach the live one
        drop(old);
        assert!(fresh.is_attached());
        assert_eq!(fresh.press(Dir::Down, t0), Some(Dir::Down));
    }

    #[test]
    fn detach_clears_the_slot() {
        let mut input = Input::new(200, false);
        let handle = input.attach();
        assert!(input.has_active_handle());
        handle.detach();
        assert!(!input.has_active_handle());
    }
}
