//! Terminal renderer. Reads a [`Snapshot`] and never touches game state.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::best_time::format_clock;
use crate::game::Snapshot;
use crate::tile::{Pos, Tile};

const CELL_W: usize = 2;

/// What sits on top of (or instead of) the maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    None,
    Start,
    Won { elapsed_secs: u64 },
    Lost,
    Failed(String),
}

/// Everything the frame needs besides the maze itself.
#[derive(Clone, Debug)]
pub struct Hud {
    pub clock_secs: u64,
    pub best_secs: Option<u64>,
    pub overlay: Overlay,
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Glyph {
    Player,
    Wall,
    Floor,
    Start,
    ExitOpen,
    ExitClosed,
    Key,
    TrapArmed,
    TrapIdle,
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Floor,
    color: Color::Reset,
};

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_footer: String,
    needs_full: bool,
    banner_shown: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            last: vec![BLANK; cols * rows],
            last_hud: String::new(),
            last_footer: String::new(),
            needs_full: true,
            banner_shown: false,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces the next frame to redraw every cell.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
        self.banner_shown = false;
    }

    pub fn draw<W: Write>(
        &mut self,
        out: &mut W,
        snapshot: Option<Snapshot<'_>>,
        hud: &Hud,
    ) -> io::Result<()> {
        let Some(snap) = snapshot else {
            return self.draw_banner(out, hud);
        };
        self.banner_shown = false;
        let cols = snap.grid.cols();
        let rows = snap.grid.rows();
        if self.last.len() != cols * rows {
            self.last = vec![BLANK; cols * rows];
            self.needs_full = true;
        }

        let (term_w, term_h) = terminal::size()?;
        let Some((needed_w, needed_h)) = fit(cols, rows, term_w, term_h) else {
            out.queue(MoveTo(0, 0))?;
            out.queue(Clear(ClearType::All))?;
            out.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                cols.saturating_mul(CELL_W),
                rows.saturating_add(3),
                term_w,
                term_h
            )))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        };

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let all_keys = snap.keys_collected >= snap.total_keys;
        let hud_line = format!(
            "Keys: {}/{}  Time: {}  Best: {}  (q to quit)",
            snap.keys_collected,
            snap.total_keys,
            format_clock(Some(hud.clock_secs)),
            format_clock(hud.best_secs),
        );
        if self.needs_full || hud_line != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(if all_keys {
                Color::Cyan
            } else {
                Color::Yellow
            }))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud_line))?;
            out.queue(ResetColor)?;
            self.last_hud = hud_line;
        }

        for y in 0..rows {
            for x in 0..cols {
                let cell = cell_for(&snap, Pos { x, y });
                let idx = y * cols + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, x, y, cell)?;
                }
            }
        }

        let footer = overlay_text(&hud.overlay);
        if self.needs_full || footer != self.last_footer {
            out.queue(MoveTo(self.origin_x, self.origin_y + needed_h - 2))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(SetForegroundColor(overlay_color(&hud.overlay)))?;
            out.queue(Print(&footer))?;
            out.queue(ResetColor)?;
            self.last_footer = footer;
        }
        self.needs_full = false;

        out.flush()
    }

    /// Start screen or a failed start: no maze to show.
    fn draw_banner<W: Write>(&mut self, out: &mut W, hud: &Hud) -> io::Result<()> {
        let text = overlay_text(&hud.overlay);
        let best = format!("Best time: {}", format_clock(hud.best_secs));
        let banner = format!("{text}\n{best}");
        if self.banner_shown && banner == self.last_footer {
            return Ok(());
        }
        let (term_w, term_h) = terminal::size()?;
        let mid_y = term_h / 2;
        out.queue(Clear(ClearType::All))?;
        for (row, line, color) in [
            (mid_y.saturating_sub(2), "MYSTERY MAZE", Color::Yellow),
            (mid_y, text.as_str(), overlay_color(&hud.overlay)),
            (mid_y + 2, best.as_str(), Color::White),
        ] {
            let w = u16::try_from(UnicodeWidthStr::width(line)).unwrap_or(term_w);
            out.queue(MoveTo(term_w.saturating_sub(w) / 2, row))?;
            out.queue(SetForegroundColor(color))?;
            out.queue(Print(line))?;
        }
        out.queue(ResetColor)?;
        self.last_footer = banner;
        self.banner_shown = true;
        self.last_hud.clear();
        // the maze must be repainted over the banner next time
        self.needs_full = true;
        out.flush()
    }

    fn draw_cell<W: Write>(&self, out: &mut W, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Wall => "██",
            Glyph::Floor => "  ",
            Glyph::Start => "░░",
            Glyph::ExitOpen => "🚪",
            Glyph::ExitClosed => "▐▌",
            Glyph::Key => "🔑",
            Glyph::TrapArmed => "▲▲",
            Glyph::TrapIdle => "△△",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                out.queue(Print(' '))?;
            }
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

/// Screen size the maze needs, or `None` when it does not fit.
fn fit(cols: usize, rows: usize, term_w: u16, term_h: u16) -> Option<(u16, u16)> {
    let needed_w = u16::try_from(cols.checked_mul(CELL_W)?).ok()?;
    let needed_h = u16::try_from(rows.checked_add(3)?).ok()?;
    (needed_w <= term_w && needed_h <= term_h).then_some((needed_w, needed_h))
}

fn cell_for(snap: &Snapshot<'_>, pos: Pos) -> Cell {
    if pos == snap.player {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    match snap.grid.get(pos).unwrap_or(Tile::Wall) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::DarkBlue,
        },
        Tile::Floor => BLANK,
        Tile::Start => Cell {
            glyph: Glyph::Start,
            color: Color::DarkGrey,
        },
        Tile::Exit if snap.keys_collected >= snap.total_keys => Cell {
            glyph: Glyph::ExitOpen,
            color: Color::Green,
        },
        Tile::Exit => Cell {
            glyph: Glyph::ExitClosed,
            color: Color::Red,
        },
        Tile::Key => Cell {
            glyph: Glyph::Key,
            color: Color::Yellow,
        },
        Tile::Trap if snap.trap_active => Cell {
            glyph: Glyph::TrapArmed,
            color: Color::Red,
        },
        Tile::Trap => Cell {
            glyph: Glyph::TrapIdle,
            color: Color::DarkGrey,
        },
    }
}

fn overlay_text(overlay: &Overlay) -> String {
    match overlay {
        Overlay::None => String::new(),
        Overlay::Start => "Press Enter to start. Move with arrows, WASD or hjkl.".to_string(),
        Overlay::Won { elapsed_secs } => format!(
            "VICTORY! You escaped the maze in {}s. Enter to play again, q to quit.",
            elapsed_secs
        ),
        Overlay::Lost => "DEFEAT! A trap caught you. Enter to try again, q to quit.".to_string(),
        Overlay::Failed(reason) => format!("Maze could not be generated: {}", reason),
    }
}

fn overlay_color(overlay: &Overlay) -> Color {
    match overlay {
        Overlay::Won { .. } => Color::Cyan,
        Overlay::Lost | Overlay::Failed(_) => Color::Red,
        Overlay::None | Overlay::Start => Color::White,
    }
}
