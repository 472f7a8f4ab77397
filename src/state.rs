//! Mutable game state: the bird, the pipes and the session flags.

use std::collections::VecDeque;

use crate::config::Config;

/// Axis-aligned rectangle in playfield units. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// The player-controlled bird.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub velocity_y: f64,
}

impl Actor {
    pub fn new(config: &Config) -> Self {
        let (x, y) = config.actor_start();
        Self {
            x,
            y,
            width: config.actor.width,
            height: config.actor.height,
            velocity_y: 0.0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Hangs from the top, opening at its bottom edge.
    Upper,
    /// Rises from the bottom, opening at its top edge.
    Lower,
}

/// One pipe. Pipes are always spawned in upper/lower pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub passed: bool,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Over,
}

/// Everything one play-through mutates.
///
/// `velocity_x` is deliberately kept across [`Session::reset`]; the speed only
/// ever grows over the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Session {
    pub actor: Actor,
    /// Oldest first. All pipes move at the same speed, so this is also
    /// sorted by `x`.
    pub obstacles: VecDeque<Obstacle>,
    pub score: f64,
    pub velocity_x: f64,
    pub started: bool,
    pub over: bool,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            actor: Actor::new(config),
            obstacles: VecDeque::new(),
            score: 0.0,
            velocity_x: config.physics.initial_velocity_x,
            started: false,
            over: false,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.started, self.over) {
            (false, _) => Phase::NotStarted,
            (true, false) => Phase::Running,
            (true, true) => Phase::Over,
        }
    }

    /// Physics, collisions and spawns only run while this holds.
    pub fn is_active(&self) -> bool {
        self.started && !self.over
    }

    /// Score as shown to the player.
    pub fn display_score(&self) -> u32 {
        self.score.floor() as u32
    }

    /// Back to the not-started state, keeping the obstacle speed.
    pub fn reset(&mut self, config: &Config) {
        let (_, y) = config.actor_start();
        self.actor.y = y;
        self.actor.velocity_y = 0.0;
        self.obstacles.clear();
        self.score = 0.0;
        self.started = false;
        self.over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_flags() {
        let mut session = Session::new(&Config::default());
        assert_eq!(session.phase(), Phase::NotStarted);
        session.started = true;
        assert_eq!(session.phase(), Phase::Running);
        assert!(session.is_active());
        session.over = true;
        assert_eq!(session.phase(), Phase::Over);
        assert!(!session.is_active());
    }

    #[test]
    fn reset_keeps_speed() {
        let config = Config::default();
        let mut session = Session::new(&config);
        session.started = true;
        session.over = true;
        session.score = 3.5;
        session.velocity_x = -3.0;
        session.actor.y = 600.0;
        session.actor.velocity_y = 4.0;

        session.reset(&config);

        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.score, 0.0);
        assert_eq!(session.actor.y, 320.0);
        assert_eq!(session.actor.velocity_y, 0.0);
        assert_eq!(session.velocity_x, -3.0);
    }

    #[test]
    fn display_score_floors_half_points() {
        let mut session = Session::new(&Config::default());
        session.score = 2.5;
        assert_eq!(session.display_score(), 2);
    }
}
