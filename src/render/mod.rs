//! Drawing: the [`Renderer`] seam plus the terminal implementation.

mod canvas;
pub mod font;
pub mod pixel;
pub mod sprites;

pub use canvas::TerminalCanvas;

use crate::game::Game;
use crate::state::ObstacleKind;

/// Images the scene can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Actor,
    UpperObstacle,
    LowerObstacle,
    /// Backdrop of the game-over modal.
    Panel,
}

impl From<ObstacleKind> for Sprite {
    fn from(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::Upper => Sprite::UpperObstacle,
            ObstacleKind::Lower => Sprite::LowerObstacle,
        }
    }
}

/// A 2D drawing surface in playfield units.
pub trait Renderer {
    fn clear(&mut self);
    fn draw_image(&mut self, sprite: Sprite, x: f64, y: f64, w: f64, h: f64);
    /// `y` is the text baseline.
    fn draw_text(&mut self, text: &str, x: f64, y: f64);
}

const MODAL_W: f64 = 300.0;
const MODAL_H: f64 = 240.0;

/// Redraw the whole frame from the current game state.
pub fn draw_scene(game: &Game, r: &mut impl Renderer) {
    let session = game.session();
    let field = &game.config().playfield;
    let cx = field.width / 2.0;

    r.clear();

    for obstacle in &session.obstacles {
        r.draw_image(
            obstacle.kind.into(),
            obstacle.x,
            obstacle.y,
            obstacle.width,
            obstacle.height,
        );
    }

    let actor = &session.actor;
    r.draw_image(Sprite::Actor, actor.x, actor.y, actor.width, actor.height);

    r.draw_text(&format!("Score: {}", session.display_score()), 5.0, 45.0);
    if session.over {
        r.draw_text("GAME OVER", 5.0, 90.0);
    }

    let overlay = game.overlay();
    if overlay.start_visible {
        centered(r, "TAP TO START", cx, field.height * 0.72);
        centered(r, "SPACE OR CLICK", cx, field.height * 0.72 + 50.0);
    }

    if let Some(score) = overlay.modal {
        let x = cx - MODAL_W / 2.0;
        let y = (field.height - MODAL_H) / 2.0;
        r.draw_image(Sprite::Panel, x, y, MODAL_W, MODAL_H);
        centered(r, &format!("SCORE: {score}"), cx, y + 60.0);
        centered(r, &format!("BEST: {}", game.best_score()), cx, y + 110.0);
        centered(r, "R: RESTART", cx, y + 170.0);
        centered(r, "C: CLOSE", cx, y + 215.0);
    }
}

fn centered(r: &mut impl Renderer, text: &str, cx: f64, baseline: f64) {
    r.draw_text(text, cx - font::text_width(text) / 2.0, baseline);
}
