/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// The simulation runs in world pixels (1200×800); the playfield is
/// projected onto whatever terminal size is available, one world rect
/// per span of cells. Entities are painted back-to-front: sky, hills,
/// platforms, flagpole, power-ups, monsters, player, particles.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{
    Facing, LayerKind, ParticleShape, PowerKind, FLAGPOLE_HEIGHT, FLAGPOLE_WIDTH,
};
use crate::domain::physics::Aabb;
use crate::sim::world::{Phase, WorldState, VIEW_H, VIEW_W};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the SAME explicit RGB for `Clear(ClearType::All)` and every
    /// cell's background keeps inter-row gap pixels on VTE terminals the
    /// same color as the cells, eliminating visible horizontal lines.
    const BASE_BG: Color = Color::Rgb { r: 16, g: 18, b: 40 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
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

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Vertical layout: HUD on top, help bar at the bottom, playfield between.
const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 1;
const RESERVED_ROWS: usize = 3; // HUD + help + margin

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

/// Projection from world pixels to terminal cells for one frame.
#[derive(Clone, Copy)]
struct Viewport {
    cols: usize,
    rows: usize,
    px_per_col: f32,
    px_per_row: f32,
}

impl Viewport {
    fn col_of(&self, wx: f32) -> i32 {
        (wx / self.px_per_col).floor() as i32
    }

    fn row_of(&self, wy: f32) -> i32 {
        (wy / self.px_per_row).floor() as i32
    }
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
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
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(world.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        // Build front buffer
        self.front.clear();

        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing | Phase::Win => {
                self.compose_game(world);
                if world.phase == Phase::Win {
                    self.compose_win_overlay(world);
                }
            }
            Phase::GameOver => self.compose_game_over(world),
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here — it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell == prev {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                let mut buf = [0u8; 4];
                queue!(self.writer, Print(&*cell.ch.encode_utf8(&mut buf)))?;

                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn viewport(&self) -> Viewport {
        let cols = self.front.width.max(1);
        let rows = if self.front.height > RESERVED_ROWS {
            self.front.height - RESERVED_ROWS
        } else {
            1
        };
        Viewport {
            cols,
            rows,
            px_per_col: VIEW_W / cols as f32,
            px_per_row: VIEW_H / rows as f32,
        }
    }

    /// Fill the cells covered by a world-space rect.
    fn fill_rect(&mut self, vp: &Viewport, rect: &Aabb, ch: char, fg: Color, bg: Color) {
        let c0 = vp.col_of(rect.left()).max(0);
        let c1 = vp.col_of(rect.right() - 0.01).min(vp.cols as i32 - 1);
        let r0 = vp.row_of(rect.top()).max(0);
        let r1 = vp.row_of(rect.bottom() - 0.01).min(vp.rows as i32 - 1);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.front.set(col as usize, FIELD_ROW + row as usize, Cell::new(ch, fg, bg));
            }
        }
    }

    fn compose_game(&mut self, w: &WorldState) {
        let vp = self.viewport();

        self.compose_background(w, &vp);

        // ── Platforms ──
        for p in &w.platforms {
            let (ch, fg, bg) = if p.pos.y >= VIEW_H - 100.0 {
                // Ground run
                ('▓', Color::Rgb { r: 90, g: 160, b: 70 }, Color::Rgb { r: 60, g: 40, b: 20 })
            } else {
                ('▒', Color::Rgb { r: 180, g: 120, b: 60 }, Color::Rgb { r: 100, g: 65, b: 30 })
            };
            self.fill_rect(&vp, &p.aabb(), ch, fg, bg);
        }

        // ── Flagpole: thin pole with a flag at the top ──
        let fx = w.flagpole.pos.x;
        let fy = w.flagpole.pos.y;
        let pole_col = vp.col_of(fx + FLAGPOLE_WIDTH / 2.0);
        if pole_col >= 0 && (pole_col as usize) < vp.cols {
            let r0 = vp.row_of(fy).max(0);
            let r1 = vp.row_of(fy + FLAGPOLE_HEIGHT - 0.01).min(vp.rows as i32 - 1);
            for row in r0..=r1 {
                let ch = if row == r0 { '▶' } else { '║' };
                let fg = if row == r0 {
                    Color::Rgb { r: 255, g: 220, b: 50 }
                } else {
                    Color::Rgb { r: 200, g: 200, b: 210 }
                };
                self.front.set(pole_col as usize, FIELD_ROW + row as usize, Cell::new(ch, fg, Color::Reset));
            }
        }

        // ── Power-ups ──
        for p in w.powerups.iter().filter(|p| !p.collected) {
            let (ch, fg) = match p.kind {
                PowerKind::Speed => ('»', Color::Rgb { r: 255, g: 220, b: 50 }),
                PowerKind::Jump => ('↑', Color::Rgb { r: 80, g: 255, b: 80 }),
                PowerKind::Shield => ('◈', Color::Rgb { r: 100, g: 200, b: 255 }),
                PowerKind::DoublePoints => ('2', Color::Rgb { r: 255, g: 160, b: 0 }),
                PowerKind::ExtraLife => ('♥', Color::Rgb { r: 255, g: 105, b: 180 }),
            };
            self.fill_rect(&vp, &p.aabb(), ch, fg, Color::Rgb { r: 40, g: 40, b: 70 });
        }

        // ── Monsters ──
        for m in w.live_monsters() {
            let hurt = m.health < m.max_health;
            let (fg, bg) = if m.width > 100.0 {
                // Mini-boss
                (Color::Rgb { r: 255, g: 100, b: 255 }, Color::Rgb { r: 90, g: 0, b: 90 })
            } else if hurt {
                (Color::Rgb { r: 255, g: 150, b: 120 }, Color::Rgb { r: 110, g: 30, b: 20 })
            } else {
                (Color::Rgb { r: 255, g: 80, b: 80 }, Color::Rgb { r: 140, g: 20, b: 20 })
            };
            self.fill_rect(&vp, &m.aabb(), '▚', fg, bg);
        }

        // ── Player (blinks while invincible) ──
        let blink_hidden = w.player.is_invincible() && (w.tick / 3) % 2 == 1;
        if !blink_hidden {
            let fg = if w.player.is_invincible() {
                Color::Rgb { r: 180, g: 230, b: 255 }
            } else {
                Color::Rgb { r: 80, g: 200, b: 255 }
            };
            // Run animation shimmers between two body shades
            let body = if (w.player.frames / 2) % 2 == 0 { '█' } else { '▓' };
            let pbox = w.player.aabb();
            self.fill_rect(&vp, &pbox, body, fg, Color::Rgb { r: 20, g: 70, b: 110 });

            // Eye marker shows facing
            let eye = match w.player.facing {
                Facing::Left => '◂',
                Facing::Right => '▸',
            };
            let head_col = vp.col_of(pbox.center_x());
            let head_row = vp.row_of(pbox.top() + 10.0);
            if head_col >= 0 && head_row >= 0 {
                self.front.set(
                    head_col as usize,
                    FIELD_ROW + head_row as usize,
                    Cell::new(eye, Color::Rgb { r: 10, g: 30, b: 60 }, Color::Rgb { r: 20, g: 70, b: 110 }),
                );
            }
        }

        // ── Particles (drawn over everything, alpha fades the color) ──
        for p in &w.particles {
            let col = vp.col_of(p.pos.x);
            let row = vp.row_of(p.pos.y);
            if col < 0 || row < 0 || col as usize >= vp.cols || row as usize >= vp.rows {
                continue;
            }
            let a = p.alpha.clamp(0.0, 1.0);
            let fg = Color::Rgb {
                r: (p.color.0 as f32 * a) as u8,
                g: (p.color.1 as f32 * a) as u8,
                b: (p.color.2 as f32 * a) as u8,
            };
            let ch = match p.shape {
                ParticleShape::Dot => {
                    if p.size > 2.5 { '●' } else { '•' }
                }
                ParticleShape::Heart => '♥',
            };
            // Keep the background beneath the particle
            let under = self.front.get(col as usize, FIELD_ROW + row as usize);
            self.front.set(col as usize, FIELD_ROW + row as usize, Cell::new(ch, fg, under.bg));
        }

        self.compose_hud(w);
        self.compose_help_bar();
    }

    /// Sky gradient with parallax star and hill layers.
    fn compose_background(&mut self, w: &WorldState, vp: &Viewport) {
        let sky_x = w.layers.iter().find(|l| l.kind == LayerKind::Sky).map_or(0.0, |l| l.x);
        let hills_x = w.layers.iter().find(|l| l.kind == LayerKind::Hills).map_or(0.0, |l| l.x);

        let ground_row = vp.row_of(VIEW_H - 80.0).max(1) as usize;

        for row in 0..vp.rows {
            // Darker toward the top
            let t = row as f32 / vp.rows as f32;
            let bg = Color::Rgb {
                r: (10.0 + t * 14.0) as u8,
                g: (12.0 + t * 18.0) as u8,
                b: (36.0 + t * 30.0) as u8,
            };
            for col in 0..vp.cols {
                let wx = col as f32 * vp.px_per_col;

                // Stars: sparse fixed pattern in layer space, drifting
                // at the slow layer's speed
                let u = (wx - sky_x) as i32;
                let star = row < ground_row
                    && ((u / 14) * 31 + row as i32 * 17).rem_euclid(23) == 0
                    && u.rem_euclid(14) < 2;

                // Hills: triangle-wave silhouette in the faster layer's space
                let hu = (wx - hills_x) * 0.008;
                let wave = (hu - hu.floor() - 0.5).abs() * 2.0; // 0..1 triangle
                let hill_rows = (wave * 7.0) as usize;
                let hill = row + hill_rows >= ground_row && row < ground_row;

                let cell = if hill {
                    Cell::new('▗', Color::Rgb { r: 20, g: 60, b: 45 }, Color::Rgb { r: 14, g: 40, b: 32 })
                } else if star {
                    Cell::new('·', Color::Rgb { r: 150, g: 150, b: 180 }, bg)
                } else {
                    Cell::new(' ', Color::White, bg)
                };
                self.front.set(col, FIELD_ROW + row, cell);
            }
        }
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let buf_w = self.front.width;
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, hud_bg));
        }

        let mut hud = format!(
            " Level {:<2}  Score:{:<8}  ♥×{}",
            w.level, w.score, w.lives,
        );
        if w.combo > 1 {
            hud.push_str(&format!("  Combo ×{}", w.combo));
        }
        if w.multiplier > 1 {
            hud.push_str("  [2× POINTS]");
        }
        if w.boost_timer > 0 {
            hud.push_str("  [BOOST]");
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);
    }

    fn compose_help_bar(&mut self) {
        let help_row = self.front.height.saturating_sub(1);
        if help_row > FIELD_ROW {
            let help = " ←→/A D Move   ␣/W/↑ Jump   ESC Title";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    // ── Static screens ──

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  ___  _          _                              ",
            r" / __|| |__ _  _ | |_   ___  _ __  _ __  ___  _ _ ",
            r" \__ \| / /| || ||   \ / _ \| '_ \| '_ \/ -_)| '_|",
            r" |___/|_\_\ \_, ||_||_|\___/| .__/| .__/\___||_|  ",
            r"            |__/            |_|   |_|             ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb { r: 255, g: 200, b: 50 }, Color::Reset);
        }

        let subtitle = "◈◈  Stomp · Combo · Climb  ◈◈";
        let sx = 2 + (title[1].len().saturating_sub(subtitle.chars().count())) / 2;
        self.front.put_str(sx, 8, subtitle, Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);

        let menu_base = 11;
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        self.front.put_str(8, menu_base, "ENTER   New Game", hi, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  ←→ / A D      Move",
            "  SPACE / W / ↑  Jump",
            "  R              Restart (after game over)",
            "  ESC            Back to title",
        ];
        let help_base = menu_base + 3;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 {
                Color::Rgb { r: 255, g: 200, b: 50 }
            } else {
                Color::White
            };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }

        let tip_row = help_base + help.len() + 2;
        let tip = format!("Stomp monsters to chain combos. {} lives. Good luck.", w.tuning.starting_lives);
        self.front.put_str(8, tip_row, &tip, Color::DarkGrey, Color::Reset);
    }

    fn compose_win_overlay(&mut self, w: &WorldState) {
        let cy = FIELD_ROW + self.viewport().rows / 2;
        let border = "╔══════════════════════════════╗";
        let middle = format!("║   ★ LEVEL {:<2} CLEARED ★      ║", w.level);
        let prompt = "║      Get ready...            ║";
        let bottom = "╚══════════════════════════════╝";
        let cx = self.front.width.saturating_sub(border.chars().count()) / 2;
        let fg = Color::Rgb { r: 255, g: 220, b: 50 };
        let bg = Color::Rgb { r: 20, g: 60, b: 20 };
        if cy >= 1 {
            self.front.put_str(cx, cy - 1, border, fg, bg);
            self.front.put_str(cx, cy, &middle, fg, bg);
            self.front.put_str(cx, cy + 1, prompt, Color::Rgb { r: 80, g: 255, b: 80 }, bg);
            self.front.put_str(cx, cy + 2, bottom, fg, bg);
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let box_art = [
            "╔════════════════════════════════╗",
            "║       ✕  GAME  OVER  ✕         ║",
            "╚════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset);
        }
        let score = format!("◈ Final Score: {}", w.score);
        let level = format!("◈ Reached Level: {}", w.level);
        self.front.put_str(8, 9, &score, Color::White, Color::Reset);
        self.front.put_str(8, 10, &level, Color::White, Color::Reset);
        self.front.put_str(8, 12, "▸ R / ENTER: Play Again", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        self.front.put_str(8, 13, "▸ ESC:       Back to Title", Color::DarkGrey, Color::Reset);
    }
}
