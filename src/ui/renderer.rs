/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The arena is continuous (pixels), the terminal is a grid of cells, so
/// every entity is projected through a `Viewport`. The same viewport maps
/// a mouse cell back to an arena point for aiming.
///
/// Screen layout:
///   ┌──────────────────────────────┬──────────────┐
///   │ room banner                  │              │
///   ├──────────────────────────────┤   sidebar    │
///   │                              │  (HUD read   │
///   │   arena                      │   model)     │
///   │                              │              │
///   ├──────────────────────────────┴──────────────┤
///   │ message bar / key help                      │
///   └─────────────────────────────────────────────┘

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::ability::AbilityId;
use crate::domain::collision::Vec2;
use crate::domain::entity::{Owner, Rgb};
use crate::sim::hud::{self, HudSnapshot};
use crate::sim::rooms::{Side, BOSS_BACKGROUND, BOSS_PARTICLE};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gap between rows matches the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
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

    /// Keep the background already in place, only change glyph and color.
    fn overlay(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        let bg = self.get(x, y).bg;
        self.set(x, y, Cell::new(ch, fg, bg));
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

// ── Colors ──

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

fn scaled(c: Rgb, f: f32) -> Color {
    let k = f.clamp(0.0, 1.0);
    Color::Rgb {
        r: (c.r as f32 * k) as u8,
        g: (c.g as f32 * k) as u8,
        b: (c.b as f32 * k) as u8,
    }
}

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const PANEL_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };
const GOLD: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const RED: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const GREY: Color = Color::Rgb { r: 180, g: 180, b: 180 };

// ── Viewport: arena ↔ terminal projection ──

/// Where the arena sits on screen and how many cells it spans.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub col: usize,
    pub row: usize,
    pub cols: usize,
    pub rows: usize,
    pub arena_w: f32,
    pub arena_h: f32,
}

impl Viewport {
    /// Arena point to terminal cell. `None` when outside the arena.
    pub fn to_cell(&self, p: Vec2) -> Option<(usize, usize)> {
        if self.cols == 0 || self.rows == 0 { return None; }
        if p.x < 0.0 || p.y < 0.0 || p.x >= self.arena_w || p.y >= self.arena_h {
            return None;
        }
        let cx = (p.x / self.arena_w * self.cols as f32) as usize;
        let cy = (p.y / self.arena_h * self.rows as f32) as usize;
        Some((self.col + cx.min(self.cols - 1), self.row + cy.min(self.rows - 1)))
    }

    /// Terminal cell to the arena point at its center.
    pub fn to_arena(&self, col: usize, row: usize) -> Option<Vec2> {
        if col < self.col || row < self.row { return None; }
        let (dx, dy) = (col - self.col, row - self.row);
        if dx >= self.cols || dy >= self.rows { return None; }
        Some(Vec2::new(
            (dx as f32 + 0.5) * self.arena_w / self.cols as f32,
            (dy as f32 + 0.5) * self.arena_h / self.rows as f32,
        ))
    }

    /// Arena distance covered by one cell horizontally.
    fn cell_w(&self) -> f32 {
        self.arena_w / self.cols.max(1) as f32
    }

    fn cell_h(&self) -> f32 {
        self.arena_h / self.rows.max(1) as f32
    }
}

/// UI-only state the simulation doesn't own.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overlay {
    pub inventory_open: bool,
    /// Highlighted ability in the roster panel.
    pub roster_cursor: usize,
}

// ── Renderer ──

const SIDEBAR_W: usize = 30;
const BANNER_ROW: usize = 0;
const MAP_ROW: usize = 1;
/// Rows kept below the arena for the message and help bars.
const FOOTER_ROWS: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    viewport: Viewport,
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
            viewport: Viewport { col: 0, row: MAP_ROW, cols: 0, rows: 0, arena_w: 1.0, arena_h: 1.0 },
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Mouse cell to arena point, using the layout of the last frame.
    pub fn cell_to_arena(&self, col: u16, row: u16) -> Option<Vec2> {
        self.viewport.to_arena(col as usize, row as usize)
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &WorldState, overlay: &Overlay) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.viewport = Viewport {
            col: 0,
            row: MAP_ROW,
            cols: self.term_w.saturating_sub(SIDEBAR_W + 1),
            rows: self.term_h.saturating_sub(MAP_ROW + FOOTER_ROWS),
            arena_w: world.width,
            arena_h: world.height,
        };

        // Phase change → clear for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();

        if world.phase == Phase::Title {
            self.compose_title(world);
        } else {
            let hud = hud::snapshot(world);
            self.compose_arena(world);
            self.compose_banner(&hud);
            self.compose_sidebar(&hud);
            self.compose_footer(&hud);

            match world.phase {
                Phase::BossOffered => self.compose_boss_offer(world),
                Phase::UpgradeChoice => self.compose_upgrade_choice(world),
                Phase::UpgradeCountdown => self.compose_countdown(&hud),
                Phase::GameOver => self.compose_game_over(&hud),
                Phase::Victory => self.compose_victory(&hud),
                _ => {}
            }

            if overlay.inventory_open {
                self.compose_inventory(world, &hud, overlay.roster_cursor);
            }
            if world.paused {
                self.compose_pause_overlay(world);
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
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors. ResetColor would fall back to the
        // terminal's own default and leave line artifacts.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
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
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Arena ──

    fn compose_arena(&mut self, w: &WorldState) {
        let vp = self.viewport;
        let room = w.room();
        let background = if w.in_boss_arena { BOSS_BACKGROUND } else { room.background };
        let floor = scaled(background, 0.8);

        for row in vp.row..vp.row + vp.rows {
            self.front.fill_row(vp.col, vp.col + vp.cols, row, floor);
        }

        // Ambient motes in the room's particle colour, shifting every 20 ticks.
        if w.effects.enabled {
            let mote = scaled(if w.in_boss_arena { BOSS_PARTICLE } else { room.particle }, 0.6);
            let drift = (w.tick / 20) as usize;
            for row in vp.row..vp.row + vp.rows {
                for col in vp.col..vp.col + vp.cols {
                    if (col * 7 + row * 13 + drift) % 61 == 0 {
                        self.front.set(col, row, Cell::new('.', mote, floor));
                    }
                }
            }
        }

        // Passages glow with the theme accent.
        if w.phase == Phase::InRoom {
            let accent = rgb(room.theme.accent);
            for passage in &room.passages {
                let t = passage.trigger;
                for row in vp.row..vp.row + vp.rows {
                    for col in vp.col..vp.col + vp.cols {
                        let inside = vp.to_arena(col, row).is_some_and(|p| t.contains(p));
                        if inside {
                            self.front.set(col, row, Cell::new('░', accent, floor));
                        }
                    }
                }
                let arrow = match passage.side {
                    Side::Top => '▲',
                    Side::Right => '▶',
                    Side::Bottom => '▼',
                    Side::Left => '◀',
                };
                self.plot(t.center(), arrow, Color::White);
            }
        }

        if w.effects.enabled {
            for p in &w.effects.particles {
                if let Some((c, r)) = vp.to_cell(p.pos) {
                    self.front.overlay(c, r, '·', scaled(p.color, p.fade()));
                }
            }
        }

        for k in w.keys.iter().filter(|k| !k.collected) {
            self.plot(k.pos, '⚷', GOLD);
        }
        for p in w.pickups.iter().filter(|p| !p.collected) {
            self.plot(p.pos, p.kind.symbol(), rgb(p.kind.color()));
        }
        for b in &w.bombs {
            let ch = if (b.fuse / 10) % 2 == 0 { '◉' } else { '○' };
            self.plot(b.pos, ch, Color::Rgb { r: 255, g: 140, b: 0 });
        }
        for d in &w.decoys {
            self.plot(d.pos, '☺', CYAN);
        }

        if let Some(beam) = &w.player.beam {
            let len = beam.origin.distance(beam.end);
            let step = vp.cell_w().min(vp.cell_h()).max(1.0);
            let dir = (beam.end - beam.origin).normalized();
            let mut t = 0.0;
            while t <= len {
                self.plot(beam.origin + dir * t, '*', Color::Rgb { r: 255, g: 255, b: 120 });
                t += step;
            }
        }

        for e in &w.enemies {
            let color = if e.frozen_ticks > 0 {
                Color::Rgb { r: 170, g: 220, b: 255 }
            } else {
                rgb(e.color)
            };
            if e.is_boss() {
                self.fill_disc(e.pos, e.radius, '█', color);
                self.plot(e.pos, 'B', Color::White);
            } else {
                let glyph = e.name.chars().next().unwrap_or('E').to_ascii_uppercase();
                self.plot(e.pos, glyph, color);
            }
        }

        for p in &w.projectiles {
            let ch = match p.owner {
                Owner::Player => '•',
                Owner::Boss => '●',
            };
            self.plot(p.pos, ch, rgb(p.element.color()));
        }

        // Player and aim marker
        let player = &w.player;
        let aim_dir = (player.aim - player.pos).normalized();
        if aim_dir.length() > 0.0 {
            self.plot(player.pos + aim_dir * (vp.cell_w() * 2.0), '+', GREY);
        }
        let body = if player.is_invincible() {
            GOLD
        } else if player.has_shield() {
            CYAN
        } else {
            Color::White
        };
        self.plot(player.pos, '@', body);
    }

    fn plot(&mut self, p: Vec2, ch: char, fg: Color) {
        if let Some((c, r)) = self.viewport.to_cell(p) {
            self.front.overlay(c, r, ch, fg);
        }
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, ch: char, fg: Color) {
        let vp = self.viewport;
        for row in vp.row..vp.row + vp.rows {
            for col in vp.col..vp.col + vp.cols {
                let inside = vp.to_arena(col, row).is_some_and(|p| p.distance(center) <= radius);
                if inside {
                    self.front.overlay(col, row, ch, fg);
                }
            }
        }
    }

    // ── Chrome: banner, sidebar, footer ──

    fn compose_banner(&mut self, hud: &HudSnapshot) {
        let width = self.viewport.cols;
        self.front.fill_row(0, width, BANNER_ROW, HUD_BG);
        let title = match &hud.boss {
            Some(b) => format!(" ☠ {} ", b.name),
            None => format!(" {} ", hud.room_name),
        };
        let fg = if hud.boss.is_some() || hud.boss_room { RED } else { Color::White };
        self.front.put_str(0, BANNER_ROW, &title, fg, HUD_BG);
    }

    fn compose_sidebar(&mut self, hud: &HudSnapshot) {
        let x0 = self.viewport.cols + 1;
        let bar_w = SIDEBAR_W.saturating_sub(4);
        let mut y = 0;

        let line = |fb: &mut FrameBuffer, y: &mut usize, s: &str, fg: Color| {
            fb.put_str(x0, *y, s, fg, Color::Reset);
            *y += 1;
        };

        line(&mut self.front, &mut y, "KEYBOUND", GOLD);
        line(&mut self.front, &mut y, &format!("Room {}/{}  Lv {}", hud.room_index + 1, crate::sim::rooms::ROOM_COUNT, hud.level), Color::White);
        line(&mut self.front, &mut y, &bar(hud.progress, bar_w), GREY);
        y += 1;

        let hp_ratio = hud.health as f32 / hud.max_health.max(1) as f32;
        let hp_color = if hp_ratio > 0.5 { GREEN } else if hp_ratio > 0.25 { GOLD } else { RED };
        line(&mut self.front, &mut y, &format!("HP {}/{}", hud.health, hud.max_health), hp_color);
        line(&mut self.front, &mut y, &bar(hp_ratio, bar_w), hp_color);
        let to_boss = crate::sim::progression::KEYS_PER_BOSS;
        line(&mut self.front, &mut y, &format!("⚷ Keys {}  (boss every {})", hud.keys, to_boss), GOLD);
        y += 1;

        line(&mut self.front, &mut y, "Abilities", CYAN);
        for (i, slot) in hud.slots.iter().enumerate() {
            let (name, fg) = match slot.ability {
                Some(id) if slot.cooldown > 0.0 => (id.name(), GREY),
                Some(id) => (id.name(), GREEN),
                None => ("(empty)", Color::DarkGrey),
            };
            let s = format!("{} {:<14} {}", i + 1, name, bar(1.0 - slot.cooldown, 8));
            line(&mut self.front, &mut y, &s, fg);
        }
        if let Some(cd) = hud.lightning {
            let fg = if cd > 0.0 { GREY } else { GOLD };
            let s = format!("4 {:<14} {}", AbilityId::Lightning.name(), bar(1.0 - cd, 8));
            line(&mut self.front, &mut y, &s, fg);
        }
        y += 1;

        if !hud.modifiers.is_empty() {
            line(&mut self.front, &mut y, "Active", CYAN);
            for (m, secs) in &hud.modifiers {
                line(&mut self.front, &mut y, &format!("  {} {}s", m.label(), secs), Color::White);
            }
            y += 1;
        }

        line(&mut self.front, &mut y, "Items", CYAN);
        if hud.inventory.is_empty() {
            line(&mut self.front, &mut y, "  (none)", Color::DarkGrey);
        }
        for (i, item) in hud.inventory.iter().enumerate() {
            if y + 1 >= self.front.height { break; }
            let s = format!("{} {} {:<16} x{}", i + 1, item.symbol, item.kind.name(), item.count);
            line(&mut self.front, &mut y, &s, rgb(item.kind.color()));
        }

        if let Some(boss) = &hud.boss {
            y += 1;
            if y + 2 < self.front.height {
                line(&mut self.front, &mut y, &format!("{} {}/{}", boss.name, boss.hits_left, boss.max_hits), RED);
                let ratio = boss.hits_left as f32 / boss.max_hits.max(1) as f32;
                line(&mut self.front, &mut y, &bar(ratio, bar_w), RED);
            }
        }
    }

    fn compose_footer(&mut self, hud: &HudSnapshot) {
        let buf_w = self.front.width;
        let msg_row = self.viewport.row + self.viewport.rows;
        if !hud.message.is_empty() {
            self.front.fill_row(0, buf_w, msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {} ", hud.message), Color::Black, MSG_BG);
        }
        let help = " WASD:Move  Mouse:Aim  1-3/J K L/Click:Cast  4/F:Storm  Tab:Items  P:Pause";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, Color::Reset);
    }

    // ── Dialogs ──

    /// Centered box over the arena. First line is the title.
    fn compose_box(&mut self, lines: &[(String, Color)], border: Color) {
        let vp = self.viewport;
        let inner = lines.iter().map(|(s, _)| s.chars().count()).max().unwrap_or(0) + 4;
        let box_w = (inner + 2).min(vp.cols.max(1));
        let box_h = lines.len() + 2;
        let x0 = vp.col + vp.cols.saturating_sub(box_w) / 2;
        let y0 = vp.row + vp.rows.saturating_sub(box_h) / 2;

        for y in y0..y0 + box_h {
            self.front.fill_row(x0, x0 + box_w, y, PANEL_BG);
        }
        let horiz = "═".repeat(box_w.saturating_sub(2));
        self.front.put_str(x0, y0, &format!("╔{}╗", horiz), border, PANEL_BG);
        self.front.put_str(x0, y0 + box_h - 1, &format!("╚{}╝", horiz), border, PANEL_BG);
        for (i, (text, fg)) in lines.iter().enumerate() {
            let y = y0 + 1 + i;
            self.front.set(x0, y, Cell::new('║', border, PANEL_BG));
            self.front.set(x0 + box_w - 1, y, Cell::new('║', border, PANEL_BG));
            self.front.put_str(x0 + 3, y, text, *fg, PANEL_BG);
        }
    }

    fn compose_boss_offer(&mut self, w: &WorldState) {
        let name = crate::domain::bestiary::boss_display_name(w.boss_variant);
        let lines = vec![
            ("⚠ BOSS CHALLENGE ⚠".to_string(), RED),
            (String::new(), Color::White),
            (format!("{} keys collected.", w.keys_collected), Color::White),
            (format!("{} awaits.", name), GOLD),
            ("Either way your keys are spent.".to_string(), GREY),
            (String::new(), Color::White),
            ("Y / Enter  Fight".to_string(), GREEN),
            ("N / Esc    Decline".to_string(), GREY),
        ];
        self.compose_box(&lines, RED);
    }

    fn compose_upgrade_choice(&mut self, w: &WorldState) {
        let mut lines = vec![
            ("★ BOSS DEFEATED ★".to_string(), GOLD),
            ("Choose an upgrade:".to_string(), Color::White),
            (String::new(), Color::White),
        ];
        for (i, id) in AbilityId::BASE.iter().enumerate() {
            lines.push((format!("{}  {}  (tier {} → {})", i + 1, id.name(), w.tier(*id), w.tier(*id) + 1), GREEN));
        }
        lines.push((String::new(), Color::White));
        lines.push(("Also grants the Lightning Storm.".to_string(), GREY));
        self.compose_box(&lines, GOLD);
    }

    fn compose_countdown(&mut self, hud: &HudSnapshot) {
        let lines = vec![
            ("UPGRADE APPLIED".to_string(), GREEN),
            (format!("Returning in {}...", hud.countdown_secs), Color::White),
        ];
        self.compose_box(&lines, GREEN);
    }

    fn compose_game_over(&mut self, hud: &HudSnapshot) {
        let lines = vec![
            ("✕ GAME OVER ✕".to_string(), RED),
            (format!("Reached {}", hud.room_name), Color::White),
            (format!("Back to title in {}...", hud.countdown_secs), GREY),
        ];
        self.compose_box(&lines, RED);
    }

    fn compose_victory(&mut self, hud: &HudSnapshot) {
        let lines = vec![
            ("★ ALL ROOMS CONQUERED ★".to_string(), GOLD),
            (format!("Keys: {}", hud.keys), Color::White),
            ("R: Play again   Esc: Title".to_string(), GREEN),
        ];
        self.compose_box(&lines, GOLD);
    }

    fn compose_inventory(&mut self, w: &WorldState, hud: &HudSnapshot, cursor: usize) {
        let mut lines = vec![
            ("INVENTORY & LOADOUT".to_string(), GOLD),
            (String::new(), Color::White),
        ];
        if w.inventory.is_empty() {
            lines.push(("No items.".to_string(), Color::DarkGrey));
        }
        for (i, item) in hud.inventory.iter().enumerate() {
            lines.push((format!("{}  {} {} x{}", i + 1, item.symbol, item.kind.name(), item.count), rgb(item.kind.color())));
        }
        lines.push((String::new(), Color::White));

        lines.push((format!("LOADOUT {}/{}", w.loadout.filled(), hud.slots.len()), GOLD));
        for (i, slot) in hud.slots.iter().enumerate() {
            let key = ['Z', 'X', 'C'][i.min(2)];
            let name = slot.ability.map_or("(empty)", |id| id.name());
            lines.push((format!("Slot {} [{}]  {}", i + 1, key, name), CYAN));
        }
        lines.push((String::new(), Color::White));

        for (i, id) in hud.unlocked.iter().enumerate() {
            let marker = if i == cursor { '▶' } else { ' ' };
            let equipped = if w.loadout.contains(*id) { " [E]" } else { "" };
            let fg = if i == cursor { GREEN } else { Color::White };
            lines.push((format!("{} {}{}", marker, id.name(), equipped), fg));
        }
        lines.push((String::new(), Color::White));
        lines.push(("1-9 use  [ ] select  Enter equip  Z/X/C unequip".to_string(), GREY));
        self.compose_box(&lines, CYAN);
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let blink = (w.tick / 30) % 2 == 0;
        let title = if blink { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        let lines = vec![
            (title.to_string(), GOLD),
            (String::new(), Color::White),
            ("P / F1  Resume".to_string(), CYAN),
            ("R       Restart".to_string(), CYAN),
            ("Esc     Back to Title".to_string(), CYAN),
        ];
        self.compose_box(&lines, GOLD);
    }

    // ── Title ──

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  _  __          _                          _ ",
            r" | |/ /___ _  _ | |__  ___  _  _  _ _   __| |",
            r" | ' </ -_) || || '_ \/ _ \| || || ' \ / _` |",
            r" |_|\_\___|\_, ||_.__/\___/ \_,_||_||_|\__,_|",
            r"           |__/                              ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, Color::Reset);
        }

        let tagline = "━━━ A thousand rooms. Five keys per boss. ━━━";
        self.front.put_str(4, 8, tagline, Color::Rgb { r: 180, g: 140, b: 50 }, Color::Reset);

        let menu_base = 11;
        self.front.put_str(8, menu_base, "ENTER   New Game", GREEN, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  WASD / ←→↑↓        Move",
            "  Mouse              Aim (auto-aim otherwise)",
            "  1 2 3 / J K L      Cast equipped ability",
            "  Left/Right click   Cast slot 1 / 2",
            "  4 / F              Lightning Storm",
            "  Tab / I            Inventory & loadout",
            "  P / F1             Pause",
        ];
        let help_base = menu_base + 3;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { GOLD } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }

        if !w.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            if msg_row > help_base + help.len() {
                let buf_w = self.front.width;
                self.front.fill_row(0, buf_w, msg_row, MSG_BG);
                self.front.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
            }
        }
    }
}

/// Fixed-width fill bar, `ratio` in 0..=1.
fn bar(ratio: f32, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport { col: 0, row: 1, cols: 80, rows: 30, arena_w: 800.0, arena_h: 600.0 }
    }

    #[test]
    fn projection_scales_arena_to_cells() {
        let vp = viewport();
        assert_eq!(vp.to_cell(Vec2::new(0.0, 0.0)), Some((0, 1)));
        assert_eq!(vp.to_cell(Vec2::new(400.0, 300.0)), Some((40, 16)));
        assert_eq!(vp.to_cell(Vec2::new(799.9, 599.9)), Some((79, 30)));
        assert_eq!(vp.to_cell(Vec2::new(800.0, 10.0)), None);
        assert_eq!(vp.to_cell(Vec2::new(-1.0, 10.0)), None);
    }

    #[test]
    fn mouse_cell_maps_back_into_arena() {
        let vp = viewport();
        assert_eq!(vp.to_arena(0, 1), Some(Vec2::new(5.0, 10.0)));
        assert_eq!(vp.to_arena(40, 16), Some(Vec2::new(405.0, 310.0)));
        assert_eq!(vp.to_arena(0, 0), None);
        assert_eq!(vp.to_arena(80, 5), None);
        let p = vp.to_arena(17, 9).map(|p| vp.to_cell(p));
        assert_eq!(p, Some(Some((17, 9))));
    }

    #[test]
    fn empty_viewport_projects_nothing() {
        let vp = Viewport { cols: 0, ..viewport() };
        assert_eq!(vp.to_cell(Vec2::new(10.0, 10.0)), None);
        assert_eq!(vp.to_arena(0, 1), None);
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0.5, 4), "██░░");
        assert_eq!(bar(1.5, 3), "███");
        assert_eq!(bar(-1.0, 2), "░░");
    }
}
