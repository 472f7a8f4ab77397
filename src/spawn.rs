//! Pipe pair generation and speed escalation.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::Config;
use crate::state::{Obstacle, ObstacleKind, Session};

/// Counts game overs and speeds pipes up every `threshold` of them.
///
/// Lives outside [`Session`] so a restart does not reset it.
#[derive(Debug, Clone, Default)]
pub struct Difficulty {
    failures: u32,
    /// Failure count at which the last speed-up was applied.
    escalated_at: u32,
}

impl Difficulty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Apply at most one speed-up per multiple of the threshold.
    ///
    /// Returns true if the obstacle speed changed.
    pub fn escalate(&mut self, session: &mut Session, config: &Config) -> bool {
        let threshold = config.difficulty.threshold.max(1);
        if self.failures == 0 || self.failures % threshold != 0 || self.escalated_at == self.failures
        {
            return false;
        }
        self.escalated_at = self.failures;
        session.velocity_x -= config.difficulty.increment;
        log::info!(
            "Difficulty increased after {} game overs, obstacle speed now {}",
            self.failures,
            -session.velocity_x
        );
        true
    }
}

/// Spawns upper/lower pipe pairs with a random gap position.
pub struct ObstacleGenerator {
    rng: Pcg32,
}

impl ObstacleGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Push one pipe pair at the right edge, then consult `difficulty`.
    ///
    /// Does nothing unless the session is running.
    pub fn spawn(&mut self, session: &mut Session, difficulty: &mut Difficulty, config: &Config) {
        if !session.is_active() {
            return;
        }

        let width = config.obstacles.width;
        let height = config.obstacles.height;
        let x = config.playfield.width;

        let r: f64 = self.rng.random();
        let upper_y = -height / 4.0 - r * (height / 2.0);
        let lower_y = upper_y + height + config.opening_height();

        session.obstacles.push_back(Obstacle {
            x,
            y: upper_y,
            width,
            height,
            passed: false,
            kind: ObstacleKind::Upper,
        });
        session.obstacles.push_back(Obstacle {
            x,
            y: lower_y,
            width,
            height,
            passed: false,
            kind: ObstacleKind::Lower,
        });

        difficulty.escalate(session, config);
    }
}
