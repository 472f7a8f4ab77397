use std::io::{self, Write};

use super::font::{self, ADVANCE, CAP_HEIGHT, FONT_PIXEL};
use super::pixel::PixelBuf;
use super::sprites::{self, CapEnd, LETTERBOX, PxRect, SHADOW, WHITE};
use super::{Renderer, Sprite};

/// Pipe cap height in playfield units.
const CAP_UNITS: f64 = 26.0;

/// [`Renderer`] backed by a half-block [`PixelBuf`].
///
/// The playfield keeps its aspect ratio: it is scaled to fit the terminal
/// and centered, with the remainder letterboxed.
pub struct TerminalCanvas {
    buf: PixelBuf,
    field_w: f64,
    field_h: f64,
    scale: f64,
    origin_x: i32,
    origin_y: i32,
}

impl TerminalCanvas {
    pub fn new(cols: u16, rows: u16, field_w: f64, field_h: f64) -> Self {
        let mut canvas = Self {
            buf: PixelBuf::for_terminal(cols, rows, LETTERBOX),
            field_w,
            field_h,
            scale: 1.0,
            origin_x: 0,
            origin_y: 0,
        };
        canvas.fit();
        canvas
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.buf
            .resize(cols as usize, rows as usize * 2, LETTERBOX);
        self.fit();
    }

    fn fit(&mut self) {
        let pw = self.buf.width() as f64;
        let ph = self.buf.height() as f64;
        self.scale = (pw / self.field_w).min(ph / self.field_h);
        self.origin_x = ((pw - self.field_w * self.scale) / 2.0) as i32;
        self.origin_y = ((ph - self.field_h * self.scale) / 2.0) as i32;
    }

    /// Terminal pixels per playfield unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pixels(&self) -> &PixelBuf {
        &self.buf
    }

    /// Flush the current frame to the terminal.
    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        self.buf.render(out)
    }

    /// Playfield rectangle to terminal pixels, at least one pixel each way.
    pub fn to_pixels(&self, x: f64, y: f64, w: f64, h: f64) -> PxRect {
        let x0 = (x * self.scale).round() as i32 + self.origin_x;
        let y0 = (y * self.scale).round() as i32 + self.origin_y;
        let x1 = ((x + w) * self.scale).round() as i32 + self.origin_x;
        let y1 = ((y + h) * self.scale).round() as i32 + self.origin_y;
        PxRect {
            x: x0,
            y: y0,
            w: (x1 - x0).max(1),
            h: (y1 - y0).max(1),
        }
    }

    fn field(&self) -> PxRect {
        self.to_pixels(0.0, 0.0, self.field_w, self.field_h)
    }

    /// Run `draw` with writes confined to the playfield.
    fn clipped(&mut self, draw: impl FnOnce(&mut PixelBuf)) {
        let field = self.field();
        self.buf.set_clip(field.x, field.y, field.w, field.h);
        draw(&mut self.buf);
        self.buf.clear_clip();
    }
}

impl Renderer for TerminalCanvas {
    fn clear(&mut self) {
        self.buf.fill(LETTERBOX);
        let field = self.field();
        sprites::sky(&mut self.buf, field, self.scale);
    }

    fn draw_image(&mut self, sprite: Sprite, x: f64, y: f64, w: f64, h: f64) {
        let r = self.to_pixels(x, y, w, h);
        let cap_h = (CAP_UNITS * self.scale).round().max(1.0) as i32;
        match sprite {
            // The backdrop dims the letterbox too.
            Sprite::Panel => sprites::panel(&mut self.buf, r),
            Sprite::Actor => self.clipped(|buf| sprites::bird(buf, r)),
            Sprite::UpperObstacle => {
                self.clipped(|buf| sprites::pipe(buf, r, CapEnd::Bottom, cap_h))
            }
            Sprite::LowerObstacle => self.clipped(|buf| sprites::pipe(buf, r, CapEnd::Top, cap_h)),
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64) {
        let dot = (FONT_PIXEL * self.scale).round().max(1.0) as i32;
        let origin = self.to_pixels(x, y - CAP_HEIGHT, 0.0, 0.0);

        self.clipped(|buf| {
            for (i, c) in text.chars().enumerate() {
                let Some(glyph) = font::glyph(c) else {
                    continue;
                };
                let gx = origin.x + (i * ADVANCE) as i32 * dot;
                for row in 0..5 {
                    for col in 0..3 {
                        if font::lit(&glyph, col, row) {
                            let px = gx + col as i32 * dot;
                            let py = origin.y + row as i32 * dot;
                            buf.fill_rect(px + 1, py + 1, dot, dot, SHADOW);
                            buf.fill_rect(px, py, dot, dot, WHITE);
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playfield_is_centered_and_letterboxed() {
        // 80x50 cells -> 80x100 pixels; 360x640 fits by height.
        let canvas = TerminalCanvas::new(80, 50, 360.0, 640.0);
        assert!((canvas.scale() - 100.0 / 640.0).abs() < 1e-9);
        let field = canvas.to_pixels(0.0, 0.0, 360.0, 640.0);
        assert_eq!(field.y, 0);
        assert_eq!(field.h, 100);
        assert!(field.x > 0);
        assert!(field.right() < 80);
    }

    #[test]
    fn tiny_sprites_still_cover_a_pixel() {
        let canvas = TerminalCanvas::new(10, 5, 360.0, 640.0);
        let r = canvas.to_pixels(100.0, 100.0, 0.5, 0.5);
        assert_eq!((r.w, r.h), (1, 1));
    }

    #[test]
    fn clear_then_text_draws_white() {
        let mut canvas = TerminalCanvas::new(80, 50, 360.0, 640.0);
        canvas.clear();
        canvas.draw_text("1", 100.0, 300.0);
        let buf = canvas.pixels();
        let lit = (0..buf.height())
            .flat_map(|y| (0..buf.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| buf.get(x, y) == WHITE)
            .count();
        assert_eq!(lit, 8);
    }

    fn letterbox_leaks(canvas: &TerminalCanvas) -> usize {
        let field = canvas.field();
        let buf = canvas.pixels();
        (0..buf.height())
            .flat_map(|y| (0..buf.width()).map(move |x| (x, y)))
            .filter(|&(x, _)| (x as i32) < field.x || x as i32 >= field.right())
            .filter(|&(x, y)| buf.get(x, y) != LETTERBOX)
            .count()
    }

    #[test]
    fn obstacles_off_the_field_stay_out_of_the_letterbox() {
        // Wide terminal: the field is pillarboxed on both sides.
        let mut canvas = TerminalCanvas::new(200, 50, 360.0, 640.0);
        canvas.clear();
        assert_eq!(letterbox_leaks(&canvas), 0);
        let field = canvas.field();
        let (edge_x, edge_y) = (field.right() as usize - 1, 10);
        let sky = canvas.pixels().get(edge_x, edge_y);

        // Just spawned at the right edge.
        canvas.draw_image(Sprite::LowerObstacle, 360.0, 400.0, 64.0, 512.0);
        canvas.draw_image(Sprite::UpperObstacle, 340.0, -300.0, 64.0, 512.0);
        // Scrolling out on the left, not yet evicted.
        canvas.draw_image(Sprite::LowerObstacle, -60.0, 400.0, 64.0, 512.0);
        canvas.draw_image(Sprite::Actor, -20.0, 300.0, 34.0, 24.0);
        canvas.draw_text("SCORE: 99999", 300.0, 100.0);
        assert_eq!(letterbox_leaks(&canvas), 0);

        // The partly visible pipe still shows inside the field.
        assert_ne!(canvas.pixels().get(edge_x, edge_y), sky);
    }

    #[test]
    fn panel_backdrop_dims_the_letterbox() {
        let mut canvas = TerminalCanvas::new(200, 50, 360.0, 640.0);
        canvas.clear();
        canvas.draw_image(Sprite::Panel, 30.0, 200.0, 300.0, 240.0);
        assert_eq!(canvas.pixels().get(0, 0), LETTERBOX.halved());
    }

    #[test]
    fn resize_refits() {
        let mut canvas = TerminalCanvas::new(80, 50, 360.0, 640.0);
        canvas.resize(200, 25);
        assert!((canvas.scale() - 50.0 / 640.0).abs() < 1e-9);
        assert_eq!(canvas.pixels().width(), 200);
    }
}
