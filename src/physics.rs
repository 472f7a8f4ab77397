//! Per-frame integration, scoring and collision.

use crate::config::Config;
use crate::state::{Rect, Session};

/// What a single physics step did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing ended the session.
    Continue,
    /// The bird fell below the playfield.
    OutOfBounds,
    /// The bird hit a pipe.
    Collided,
    /// The session was not running; nothing changed.
    Idle,
}

impl StepOutcome {
    pub fn ends_session(self) -> bool {
        matches!(self, StepOutcome::OutOfBounds | StepOutcome::Collided)
    }
}

/// Strict AABB overlap. Rectangles that only share an edge do not collide.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Advance the session by one frame.
///
/// Sets `session.over` when the bird leaves the playfield or hits a pipe.
/// The caller is responsible for counting the failure.
pub fn step(session: &mut Session, config: &Config) -> StepOutcome {
    if !session.is_active() {
        return StepOutcome::Idle;
    }

    let actor = &mut session.actor;
    actor.velocity_y += config.physics.gravity;
    // Clamped at the ceiling only; falling through the floor ends the run.
    actor.y = (actor.y + actor.velocity_y).max(0.0);

    if actor.y > config.playfield.height {
        session.over = true;
        return StepOutcome::OutOfBounds;
    }

    let bird = session.actor.bounds();
    for obstacle in session.obstacles.iter_mut() {
        obstacle.x += session.velocity_x;

        if !obstacle.passed && bird.x > obstacle.x + obstacle.width {
            session.score += config.physics.score_per_obstacle;
            obstacle.passed = true;
        }

        if overlaps(&bird, &obstacle.bounds()) {
            session.over = true;
            return StepOutcome::Collided;
        }
    }

    while session
        .obstacles
        .front()
        .is_some_and(|o| o.x < -config.obstacles.width)
    {
        session.obstacles.pop_front();
    }

    StepOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Obstacle, ObstacleKind};
    use proptest::prelude::*;

    fn running(config: &Config) -> Session {
        let mut session = Session::new(config);
        session.started = true;
        session
    }

    fn pipe(x: f64, y: f64) -> Obstacle {
        Obstacle {
            x,
            y,
            width: 64.0,
            height: 512.0,
            passed: false,
            kind: ObstacleKind::Upper,
        }
    }

    #[test]
    fn gravity_accumulates_each_frame() {
        let config = Config::default();
        let mut session = running(&config);

        let mut last = session.actor.velocity_y;
        for _ in 0..10 {
            assert_eq!(step(&mut session, &config), StepOutcome::Continue);
            let v = session.actor.velocity_y;
            assert!((v - last - config.physics.gravity).abs() < 1e-9);
            last = v;
        }
    }

    #[test]
    fn ceiling_clamps_at_zero() {
        let config = Config::default();
        let mut session = running(&config);
        session.actor.y = 3.0;
        session.actor.velocity_y = -6.0;

        step(&mut session, &config);
        assert_eq!(session.actor.y, 0.0);
        assert!(!session.over);
    }

    #[test]
    fn falling_below_the_board_ends_the_session() {
        let config = Config::default();
        let mut session = running(&config);
        session.actor.y = config.playfield.height;
        session.actor.velocity_y = 0.0;

        assert_eq!(step(&mut session, &config), StepOutcome::OutOfBounds);
        assert!(session.over);
    }

    #[test]
    fn exactly_at_the_bottom_is_still_alive() {
        let mut config = Config::default();
        config.physics.gravity = 0.5;
        let mut session = running(&config);
        session.actor.y = config.playfield.height - 0.5;
        session.actor.velocity_y = 0.0;

        assert_eq!(step(&mut session, &config), StepOutcome::Continue);
    }

    #[test]
    fn passing_a_pipe_scores_once() {
        let config = Config::default();
        let mut session = running(&config);
        session.actor.velocity_y = -config.physics.gravity;
        // Pipe fully left of the bird, out of its vertical path.
        session.obstacles.push_back(pipe(-20.0, -600.0));

        step(&mut session, &config);
        assert_eq!(session.score, 0.5);
        assert!(session.obstacles[0].passed);

        session.actor.velocity_y = -config.physics.gravity;
        step(&mut session, &config);
        assert_eq!(session.score, 0.5);
    }

    #[test]
    fn hitting_a_pipe_stops_the_frame() {
        let config = Config::default();
        let mut session = running(&config);
        let (x, y) = config.actor_start();
        session.obstacles.push_back(pipe(x, y - 100.0));
        session.obstacles.push_back(pipe(300.0, -600.0));

        assert_eq!(step(&mut session, &config), StepOutcome::Collided);
        assert!(session.over);
        // The second pipe was never advanced.
        assert_eq!(session.obstacles[1].x, 300.0);
    }

    #[test]
    fn offscreen_pipes_are_evicted_from_the_front() {
        let config = Config::default();
        let mut session = running(&config);
        session.obstacles.push_back(pipe(-63.0, -600.0));
        session.obstacles.push_back(pipe(-61.0, -600.0));
        session.obstacles.push_back(pipe(200.0, -600.0));

        step(&mut session, &config);

        let xs: Vec<f64> = session.obstacles.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![-63.0, 198.0]);
    }

    #[test]
    fn frozen_when_over() {
        let config = Config::default();
        let mut session = running(&config);
        session.over = true;
        session.obstacles.push_back(pipe(100.0, -600.0));
        let y = session.actor.y;

        assert_eq!(step(&mut session, &config), StepOutcome::Idle);
        assert_eq!(session.actor.y, y);
        assert_eq!(session.obstacles[0].x, 100.0);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &right));
        assert!(!overlaps(&a, &below));
        assert!(overlaps(&a, &Rect::new(9.9, 9.9, 1.0, 1.0)));
    }

    fn rect() -> impl Strategy<Value = Rect> {
        (-500.0..500.0f64, -500.0..500.0f64, 0.1..200.0f64, 0.1..200.0f64)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in rect(), b in rect()) {
            prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
        }

        #[test]
        fn actor_never_goes_above_the_ceiling(
            y in 0.0..640.0f64,
            vy in -50.0..50.0f64,
        ) {
            let config = Config::default();
            let mut session = running(&config);
            session.actor.y = y;
            session.actor.velocity_y = vy;
            step(&mut session, &config);
            prop_assert!(session.actor.y >= 0.0);
        }
    }
}
