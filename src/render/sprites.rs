//! Procedural art for the bird, the pipes, the sky and the modal panel.

use super::pixel::{PixelBuf, Rgb};

pub const SKY_TOP: Rgb = Rgb(70, 180, 200);
pub const SKY_BOT: Rgb = Rgb(190, 232, 245);
pub const LETTERBOX: Rgb = Rgb(24, 28, 36);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const PANEL_EDGE: Rgb = Rgb(210, 185, 110);
const PANEL_FILL: Rgb = Rgb(220, 195, 120);
pub const SHADOW: Rgb = Rgb(30, 30, 30);
pub const WHITE: Rgb = Rgb(255, 255, 255);

/// A rectangle in terminal pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PxRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PxRect {
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

/// Which end of a pipe faces the gap and carries the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapEnd {
    Top,
    Bottom,
}

/// Vertical gradient with two rows of rolling hills along the bottom.
pub fn sky(buf: &mut PixelBuf, field: PxRect, scale: f64) {
    for y in field.y..field.bottom() {
        let t = ((y - field.y) as i64 * 256 / field.h.max(1) as i64) as u16;
        buf.fill_rect(field.x, y, field.w, 1, Rgb::lerp(SKY_TOP, SKY_BOT, t));
    }

    let base = field.bottom();
    for (color, freq, amp, lift) in [(HILL_FAR, 0.04, 40.0, 30.0), (HILL_NEAR, 0.06, 25.0, 12.0)] {
        for x in field.x..field.right() {
            let fx = (x - field.x) as f64 / scale.max(1e-6) * freq * 0.25;
            let h = ((fx.sin() * 0.7 + (fx * 1.7).sin() * 0.3) * amp + amp + lift) * scale;
            let top = base - h as i32;
            buf.fill_rect(x, top, 1, base - top, color);
        }
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

/// Shaded pipe body with a wider cap at `cap_end`.
pub fn pipe(buf: &mut PixelBuf, r: PxRect, cap_end: CapEnd, cap_h: i32) {
    let cap_h = cap_h.clamp(1, r.h.max(1));
    let cap_extra = (r.w / 8).max(1);

    for x in 0..r.w {
        buf.fill_rect(r.x + x, r.y, 1, r.h, pipe_shade(x, r.w));
    }

    let cap_y = match cap_end {
        CapEnd::Top => r.y,
        CapEnd::Bottom => r.bottom() - cap_h,
    };
    let cap_w = r.w + cap_extra * 2;
    for x in 0..cap_w {
        buf.fill_rect(r.x - cap_extra + x, cap_y, 1, cap_h, pipe_shade(x, cap_w));
    }
    buf.fill_rect(r.x - cap_extra, cap_y, cap_w, 1, CAP_DARK);
    buf.fill_rect(r.x - cap_extra, cap_y + cap_h - 1, cap_w, 1, CAP_DARK);
}

/// Bird drawn to fill `r`, facing right.
pub fn bird(buf: &mut PixelBuf, r: PxRect) {
    let w = r.w.max(2);
    let h = r.h.max(2);

    let beak_w = (w / 4).max(1);
    let body_w = w - beak_w;
    buf.fill_rect(r.x, r.y, body_w, h, BIRD_Y);
    buf.fill_rect(r.x + 1, r.y, (body_w - 2).max(1), (h / 6).max(1), BIRD_HI);

    let wing_w = (body_w / 3).max(1);
    let wing_h = (h / 3).max(1);
    buf.fill_rect(r.x, r.y + h / 2 - wing_h / 2, wing_w, wing_h, BIRD_WING);

    let eye = (h / 4).max(1);
    let ex = r.x + body_w - eye - 1;
    let ey = r.y + (h / 5).max(0);
    buf.fill_rect(ex, ey, eye + 1, eye + 1, BIRD_EYE);
    buf.set(ex + eye, ey + eye, BIRD_PUPIL);

    let beak_h = (h / 3).max(1);
    buf.fill_rect(r.x + body_w, r.y + h / 2 - beak_h / 2, beak_w, beak_h, BIRD_BEAK);
}

/// Modal panel: darkens everything behind it first.
pub fn panel(buf: &mut PixelBuf, r: PxRect) {
    buf.darken();
    buf.fill_rect(r.x - 1, r.y - 1, r.w + 2, r.h + 2, SHADOW);
    buf.fill_rect(r.x, r.y, r.w, r.h, PANEL_EDGE);
    buf.fill_rect(r.x + 1, r.y + 1, r.w - 2, r.h - 2, PANEL_FILL);
}
