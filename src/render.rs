use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::game::{Game, Phase};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    fn to_color(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const SKY_TOP: Rgb = Rgb(150, 205, 235);
const SKY_BOT: Rgb = Rgb(235, 245, 250);
const EARTH: Rgb = Rgb(139, 69, 19);
const EARTH_DARK: Rgb = Rgb(110, 52, 12);
const GRASS: Rgb = Rgb(84, 168, 55);
const VOID: Rgb = Rgb(25, 20, 30);
const LOG_BARK: Rgb = Rgb(95, 60, 30);
const LOG_RING: Rgb = Rgb(190, 150, 95);
const DINO: Rgb = Rgb(70, 140, 60);
const DINO_BELLY: Rgb = Rgb(160, 200, 110);
const DINO_EYE: Rgb = Rgb(20, 20, 20);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const TEXT: Rgb = Rgb(20, 20, 20);
const ALERT: Rgb = Rgb(200, 30, 30);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    /// Two pixels per cell: top as foreground of `▀`, bottom as background.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if need_bg || prev_bg != bot {
                    queue!(out, style::SetBackgroundColor(bot.to_color()))?;
                    prev_bg = bot;
                    need_bg = false;
                }
                if top == bot {
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(top.to_color()))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1; // 3px per digit + 1px spacing
    let start_x = cx - total_w / 2;
    for (i, ch) in s.bytes().enumerate() {
        draw_digit(buf, start_x + i as i32 * 4, y, ch - b'0', fg);
    }
}

// ── Dinosaur sprite ─────────────────────────────────────────────────────────

/// 12x12 mask: 0 empty, 1 body, 2 belly, 3 eye.
#[rustfmt::skip]
const DINO_SPRITE: [[u8; 12]; 12] = [
    [0,0,0,0,0,0,1,1,1,1,1,0],
    [0,0,0,0,0,0,1,3,1,1,1,1],
    [0,0,0,0,0,0,1,1,1,1,1,1],
    [0,0,0,0,0,0,1,1,1,0,0,0],
    [1,0,0,0,0,1,1,1,1,1,0,0],
    [1,1,0,0,1,1,1,1,0,0,0,0],
    [1,1,1,1,1,2,2,1,1,0,0,0],
    [0,1,1,1,1,2,2,1,0,0,0,0],
    [0,0,1,1,1,1,1,1,0,0,0,0],
    [0,0,0,1,1,0,1,1,0,0,0,0],
    [0,0,0,1,0,0,0,1,0,0,0,0],
    [0,0,0,1,1,0,0,1,1,0,0,0],
];

// ── Playfield to pixel mapping ──────────────────────────────────────────────

/// Uniform scale from playfield units to pixels, centered horizontally and
/// anchored to the bottom of the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub ox: f64,
    pub oy: f64,
}

impl Viewport {
    pub fn fit(pw: usize, ph: usize, width: f64, height: f64) -> Self {
        let scale = (pw as f64 / width).min(ph as f64 / height);
        Self {
            scale,
            ox: (pw as f64 - width * scale) / 2.0,
            oy: ph as f64 - height * scale,
        }
    }

    pub fn x(&self, x: f64) -> i32 {
        (self.ox + x * self.scale).round() as i32
    }

    pub fn y(&self, y: f64) -> i32 {
        (self.oy + y * self.scale).round() as i32
    }

    /// Pixel rect covering a playfield rect, at least one pixel each way.
    pub fn rect(&self, x: f64, y: f64, w: f64, h: f64) -> (i32, i32, i32, i32) {
        let x0 = self.x(x);
        let y0 = self.y(y);
        let x1 = self.x(x + w).max(x0 + 1);
        let y1 = self.y(y + h).max(y0 + 1);
        (x0, y0, x1 - x0, y1 - y0)
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

pub fn draw(game: &Game, buf: &mut PixelBuf) {
    let config = game.config();
    let view = Viewport::fit(buf.width(), buf.height(), config.width, config.height);

    draw_sky(buf, view.y(config.ground_y));
    draw_ground(game, buf, &view);
    draw_logs(game, buf, &view);
    draw_dino(game, buf, &view);

    let cx = buf.width() as i32 / 2;
    draw_number(buf, cx, 2, game.run().pace.jumps, WHITE);

    if game.phase() == Phase::Idle && game.last_outcome().is_some() {
        dim(buf);
    }
}

fn draw_sky(buf: &mut PixelBuf, horizon: i32) {
    let sky_h = horizon.max(1);
    for y in 0..buf.height() as i32 {
        let t = (y.clamp(0, sky_h) as u32 * 256 / sky_h as u32) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..buf.width() as i32 {
            buf.set(x, y, c);
        }
    }
}

fn draw_ground(game: &Game, buf: &mut PixelBuf, view: &Viewport) {
    let config = game.config();
    let top = view.y(config.ground_y);
    let bottom = view
        .y(config.ground_y + config.ground_height)
        .min(buf.height() as i32);
    let left = view.x(0.0);
    let right = view.x(config.width);

    for y in top..bottom {
        for x in left..right {
            let stripe = (x + (y - top) * 2).rem_euclid(10) < 5;
            buf.set(x, y, if stripe { EARTH } else { EARTH_DARK });
        }
    }
    for x in left..right {
        buf.set(x, top, GRASS);
    }

    for seg in game.run().ground.segments().iter().filter(|s| s.is_gap) {
        let x0 = view.x(seg.x).max(left);
        let x1 = view.x(seg.x + seg.width).min(right);
        for y in top..bottom {
            for x in x0..x1 {
                buf.set(x, y, VOID);
            }
        }
    }
}

fn draw_logs(game: &Game, buf: &mut PixelBuf, view: &Viewport) {
    for log in &game.run().logs {
        let (x, y, w, h) = view.rect(log.x, log.y, log.width, log.height);
        buf.fill_rect(x, y, w, h, LOG_BARK);
        if w > 2 && h > 2 {
            buf.fill_rect(x + 1, y, w - 2, 1, LOG_RING);
        }
    }
}

fn draw_dino(game: &Game, buf: &mut PixelBuf, view: &Viewport) {
    let avatar = &game.run().avatar;
    let (x, y, w, h) = view.rect(avatar.x, avatar.y, avatar.width, avatar.height);
    let rows = DINO_SPRITE.len() as i32;
    let cols = DINO_SPRITE[0].len() as i32;
    for py in 0..h {
        for px in 0..w {
            let sy = (py * rows / h) as usize;
            let sx = (px * cols / w) as usize;
            let c = match DINO_SPRITE[sy][sx] {
                1 => DINO,
                2 => DINO_BELLY,
                3 => DINO_EYE,
                _ => continue,
            };
            buf.set(x + px, y + py, c);
        }
    }
}

fn dim(buf: &mut PixelBuf) {
    for y in 0..buf.height() {
        for x in 0..buf.width() {
            let c = buf.get(x, y);
            buf.set(x as i32, y as i32, Rgb(c.0 / 2, c.1 / 2, c.2 / 2));
        }
    }
}

// ── Text overlay ────────────────────────────────────────────────────────────

/// Status text drawn over the pixel rows after [`PixelBuf::render`].
pub struct Hud<'a> {
    pub mic_status: &'a str,
}

pub fn draw_text(game: &Game, hud: &Hud<'_>, cols: u16, rows: u16, out: &mut impl Write) -> io::Result<()> {
    let run = game.run();
    let status = format!(
        " DINO  Jumps: {}  Volume: {:.1}  Speed: {:.0}  {}",
        run.pace.jumps, run.loudness, run.pace.speed, hud.mic_status
    );
    put(out, 0, 0, &status, TEXT, None, cols)?;

    if game.phase() == Phase::Idle {
        let mid = rows / 2;
        if let Some(cause) = game.last_outcome() {
            centered(out, mid.saturating_sub(1), cause.message(), WHITE, Some(ALERT), cols)?;
        }
        let prompt = if game.can_start() {
            "Press S to start  -  B to jump  -  Q to quit"
        } else {
            "Press M to enable the microphone, then S to start"
        };
        centered(out, mid + 1, prompt, TEXT, Some(SKY_BOT), cols)?;
    }
    out.flush()
}

fn centered(out: &mut impl Write, row: u16, text: &str, fg: Rgb, bg: Option<Rgb>, cols: u16) -> io::Result<()> {
    let len = text.chars().count() as u16;
    let col = cols.saturating_sub(len) / 2;
    put(out, col, row, text, fg, bg, cols)
}

fn put(out: &mut impl Write, col: u16, row: u16, text: &str, fg: Rgb, bg: Option<Rgb>, cols: u16) -> io::Result<()> {
    let room = usize::from(cols.saturating_sub(col));
    let clipped: String = text.chars().take(room).collect();
    queue!(out, cursor::MoveTo(col, row), style::SetForegroundColor(fg.to_color()))?;
    if let Some(bg) = bg {
        queue!(out, style::SetBackgroundColor(bg.to_color()))?;
    }
    queue!(out, style::Print(clipped), style::ResetColor)
}
