/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Layout: a status panel on the left, the maze on the right. Each maze
/// tile is two terminal columns wide. A terminal shorter than the maze
/// scrolls vertically to keep the player in view.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Direction, ItemKind};
use crate::domain::grid::{Grid, TilePos};
use crate::domain::tile::TileKind;
use crate::sim::phase::{AdversaryState, Outcome};
use crate::sim::session::Session;
use crate::sim::snapshot::Snapshot;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background everywhere, never the terminal default,
    /// so row gaps don't show as lines on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 14, b: 10 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell, so every position gets diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, x0: usize, x1: usize, y: usize, bg: Color) {
        for x in x0..x1.min(self.width) {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

/// Terminal columns per maze tile.
const CELL_W: usize = 2;
/// Width of the status panel left of the maze.
const PANEL_W: usize = 24;

const WALL_FG: Color = Color::Rgb { r: 120, g: 96, b: 70 };
const WALL_BG: Color = Color::Rgb { r: 70, g: 54, b: 38 };
const PELLET: Color = Color::Rgb { r: 80, g: 230, b: 90 };
const GATE_LOCKED: Color = Color::Rgb { r: 200, g: 60, b: 50 };
const GATE_OPEN: Color = Color::Rgb { r: 90, g: 210, b: 120 };
const PLAYER: Color = Color::Rgb { r: 250, g: 210, b: 60 };
const TRIBUTE: Color = Color::Rgb { r: 220, g: 220, b: 220 };
const MINOTAUR: Color = Color::Rgb { r: 230, g: 40, b: 40 };
const MINOTAUR_SCARED: Color = Color::Rgb { r: 90, g: 120, b: 255 };
const MINOTAUR_DEAD: Color = Color::DarkGrey;

/// First maze row to show so `focus` stays in view on a short terminal.
fn viewport_top(focus_row: i32, maze_rows: usize, view_h: usize) -> usize {
    if maze_rows <= view_h {
        return 0;
    }
    let max_top = (maze_rows - view_h) as i32;
    (focus_row - view_h as i32 / 2).clamp(0, max_top) as usize
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_outcome: Option<Outcome>,
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_outcome: None,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    /// Ask the terminal to report key releases. Returns whether it will.
    pub fn enable_key_release(&mut self) -> bool {
        if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            return false;
        }
        let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
        self.key_release = execute!(self.writer, PushKeyboardEnhancementFlags(flags)).is_ok();
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Force a full repaint on the next frame (e.g. after a restart).
    pub fn invalidate(&mut self) {
        self.back.cells.fill(Cell::INVALID);
        self.last_outcome = None;
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        let snap = Snapshot::capture(session);
        if self.last_outcome != Some(snap.outcome) {
            self.back.cells.fill(Cell::INVALID);
            self.last_outcome = Some(snap.outcome);
        }

        self.front.clear();
        self.compose_panel(session, &snap);
        let top = self.compose_maze(&session.grid, &snap);
        match snap.outcome {
            Outcome::InProgress => {}
            Outcome::Defeat => self.compose_banner(
                &session.grid,
                top,
                &["THE MINOTAUR FEASTS", "", "R - restart   Q - quit"],
                MINOTAUR,
            ),
            Outcome::Victory => {
                let survivors = format!("Survivors: {}", snap.survivors);
                self.compose_banner(
                    &session.grid,
                    top,
                    &["YOU ESCAPED THE LABYRINTH", survivors.as_str(), "R - play again   Q - quit"],
                    PLAYER,
                );
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_panel(&mut self, session: &Session, snap: &Snapshot) {
        let white = Color::White;
        let dim = Color::DarkGrey;
        let bg = Color::Black;
        for y in 0..self.front.height {
            self.front.fill_row(0, PANEL_W - 1, y, bg);
            self.front.set(PANEL_W - 1, y, Cell::new('│', dim, Cell::BASE_BG));
        }

        let lines: Vec<(String, Color)> = vec![
            (session.maze_name.clone(), PLAYER),
            (String::new(), white),
            (format!("Survivors: {}", snap.survivors), white),
            (snap.objective.clone(), white),
            (format!("Score: {}", snap.score), white),
            (String::new(), white),
            ("Controls:".into(), white),
            ("Arrow keys - move".into(), white),
            ("R - restart".into(), white),
            ("Q - quit".into(), white),
            (String::new(), white),
            (format!("Seed: {}", session.seed), dim),
        ];
        for (i, (text, fg)) in lines.iter().enumerate() {
            let clipped: String = text.chars().take(PANEL_W - 3).collect();
            self.front.put_str(1, 1 + i, &clipped, *fg, bg);
        }
    }

    /// Draw the maze and its occupants. Returns the first visible maze row.
    fn compose_maze(&mut self, grid: &Grid, snap: &Snapshot) -> usize {
        let view_h = self.front.height;
        let top = viewport_top(snap.player.cell.1, grid.rows(), view_h);

        for vy in 0..view_h.min(grid.rows()) {
            let row = (top + vy) as i32;
            for col in 0..grid.cols() as i32 {
                let (ch, fg, bg) = tile_glyph(grid.tile_at(col, row), snap.gates_open);
                self.put_tile(col, vy, ch, fg, bg);
            }
        }

        let visible = |pos: TilePos| pos.1 >= top as i32 && ((pos.1 - top as i32) as usize) < view_h;

        for item in &snap.items {
            if !visible(item.pos) { continue; }
            let ch = match item.kind {
                ItemKind::Small => '·',
                ItemKind::Large => '●',
            };
            self.put_tile(item.pos.0, (item.pos.1 as usize) - top, ch, PELLET, Cell::BASE_BG);
        }

        for t in &snap.tributes {
            let pos = t.cell;
            if visible(pos) {
                self.put_tile(pos.0, pos.1 as usize - top, 'h', TRIBUTE, Cell::BASE_BG);
            }
        }

        let m = snap.minotaur.cell;
        if visible(m) {
            let (ch, fg) = match snap.minotaur_state {
                AdversaryState::Normal => ('M', MINOTAUR),
                AdversaryState::Fleeing => ('M', MINOTAUR_SCARED),
                AdversaryState::Defeated => ('x', MINOTAUR_DEAD),
            };
            self.put_tile(m.0, m.1 as usize - top, ch, fg, Cell::BASE_BG);
        }

        let p = snap.player.cell;
        if snap.player_alive && visible(p) {
            let ch = match snap.player.dir {
                Direction::Left => '<',
                Direction::Right => '>',
                Direction::Up => '^',
                Direction::Down => 'v',
                Direction::None => '@',
            };
            self.put_tile(p.0, p.1 as usize - top, ch, PLAYER, Cell::BASE_BG);
        }

        top
    }

    /// One maze tile: glyph in the left column, padding in the right.
    fn put_tile(&mut self, col: i32, screen_row: usize, ch: char, fg: Color, bg: Color) {
        if col < 0 { return; }
        let x = PANEL_W + col as usize * CELL_W;
        let pad = if bg == WALL_BG { '█' } else { ' ' };
        let pad_fg = if bg == WALL_BG { WALL_FG } else { fg };
        self.front.set(x, screen_row, Cell::new(ch, fg, bg));
        self.front.set(x + 1, screen_row, Cell::new(pad, pad_fg, bg));
    }

    fn compose_banner(&mut self, grid: &Grid, top: usize, lines: &[&str], fg: Color) {
        let maze_w = grid.cols() * CELL_W;
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let box_w = inner.min(maze_w);
        let x0 = PANEL_W + (maze_w - box_w) / 2;
        let visible_rows = grid.rows().saturating_sub(top).min(self.front.height);
        let y0 = visible_rows.saturating_sub(lines.len() + 2) / 2;
        let bg = Color::Black;

        for dy in 0..lines.len() + 2 {
            self.front.fill_row(x0, x0 + box_w, y0 + dy, bg);
        }
        for (i, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            let x = x0 + box_w.saturating_sub(len) / 2;
            self.front.put_str(x, y0 + 1 + i, line, fg, bg);
        }
    }
}

fn tile_glyph(tile: TileKind, gates_open: bool) -> (char, Color, Color) {
    match tile {
        TileKind::Wall => ('█', WALL_FG, WALL_BG),
        TileKind::Gate if gates_open => ('░', GATE_OPEN, Cell::BASE_BG),
        TileKind::Gate => ('▓', GATE_LOCKED, Cell::BASE_BG),
        _ => (' ', Color::White, Cell::BASE_BG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_fits_whole_maze() {
        assert_eq!(viewport_top(30, 31, 40), 0);
        assert_eq!(viewport_top(0, 31, 31), 0);
    }

    #[test]
    fn viewport_follows_and_clamps() {
        assert_eq!(viewport_top(0, 31, 20), 0);
        assert_eq!(viewport_top(15, 31, 20), 5);
        assert_eq!(viewport_top(30, 31, 20), 11);
    }

    #[test]
    fn gate_glyph_tracks_lock() {
        assert_eq!(tile_glyph(TileKind::Gate, false).1, GATE_LOCKED);
        assert_eq!(tile_glyph(TileKind::Gate, true).1, GATE_OPEN);
        assert_eq!(tile_glyph(TileKind::SmallItem, false).0, ' ');
    }
}
