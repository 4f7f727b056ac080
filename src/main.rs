use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;

use mystery_maze::app::{App, Flow};
use mystery_maze::best_time::BestTimeStore;
use mystery_maze::logging;
use mystery_maze::trap::SystemClock;
use mystery_maze::{DisplayConfig, GameConfig};

fn main() -> io::Result<()> {
    // logging is best-effort; the game runs without it
    let _guard = logging::setup_logging().ok();

    let config = GameConfig::from_env();
    let mut display = DisplayConfig::from_env();

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    display.release_events = matches!(terminal::supports_keyboard_enhancement(), Ok(true));

    let mut app = match App::new(
        config,
        display,
        rand::thread_rng(),
        SystemClock,
        BestTimeStore::default_location(),
    ) {
        Ok(app) => app,
        Err(err) => {
            terminal::disable_raw_mode()?;
            tracing::error!(error = %err, "invalid configuration");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, err));
        }
    };

    stdout.execute(EnterAlternateScreen)?;
    if display.release_events {
        stdout.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut app);

    stdout.execute(Show)?;
    if display.release_events {
        stdout.execute(PopKeyboardEnhancementFlags)?;
    }
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run<R: rand::Rng>(stdout: &mut Stdout, app: &mut App<R, SystemClock>) -> io::Result<()> {
    let frame_time = app.frame_period();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(&key, Instant::now()) == Flow::Quit {
                    return Ok(());
                }
            }
        }

        app.update(Instant::now());
        app.draw(stdout)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
