//! Session controller: owns all game state and runs every handler.
//!
//! Three kinds of handler mutate the game, always one at a time: input
//! commands, the frame tick and the spawn timer. Each takes `now`, the loop's
//! virtual time, so the whole controller can be driven from tests.

use std::time::Duration;

use crate::audio::Soundtrack;
use crate::config::Config;
use crate::error::AudioError;
use crate::input::Command;
use crate::physics::{self, StepOutcome};
use crate::scheduler::{Scheduler, Tick, TimerToken};
use crate::spawn::{Difficulty, ObstacleGenerator};
use crate::state::{Phase, Session};

/// What the UI layer shows on top of the playfield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// The "tap to start" prompt.
    pub start_visible: bool,
    /// Game-over modal with the final score, while open.
    pub modal: Option<u32>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            start_visible: true,
            modal: None,
        }
    }
}

pub struct Game {
    config: Config,
    session: Session,
    difficulty: Difficulty,
    generator: ObstacleGenerator,
    scheduler: Scheduler,
    spawn_timer: Option<TimerToken>,
    overlay: Overlay,
    best: u32,
    soundtrack: Box<dyn Soundtrack>,
}

impl Game {
    /// Uses `config.seed` for obstacle gaps, or a random seed if unset.
    pub fn new(config: Config, soundtrack: Box<dyn Soundtrack>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, seed, soundtrack)
    }

    pub fn with_seed(config: Config, seed: u64, soundtrack: Box<dyn Soundtrack>) -> Self {
        log::debug!("Obstacle seed {seed}");
        Self {
            session: Session::new(&config),
            difficulty: Difficulty::new(),
            generator: ObstacleGenerator::new(seed),
            scheduler: Scheduler::new(config.frame_period()),
            spawn_timer: None,
            overlay: Overlay::default(),
            best: 0,
            soundtrack,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Best displayed score since the process started.
    pub fn best_score(&self) -> u32 {
        self.best
    }

    pub fn spawn_timer(&self) -> Option<TimerToken> {
        self.spawn_timer
    }

    /// Returns false when the player asked to quit.
    pub fn handle(&mut self, command: Command, now: Duration) -> bool {
        match command {
            Command::Tap => self.tap(now),
            Command::Restart => {
                if self.session.over {
                    self.restart();
                }
            }
            Command::CloseModal => self.close_modal(),
            Command::Quit => return false,
        }
        true
    }

    /// Start, restart or flap depending on the phase.
    pub fn tap(&mut self, now: Duration) {
        match self.session.phase() {
            Phase::NotStarted => self.start(now),
            Phase::Over => self.restart(),
            Phase::Running => self.session.actor.velocity_y = self.config.physics.flap_velocity,
        }
    }

    fn start(&mut self, now: Duration) {
        if self.session.started {
            return;
        }
        self.session.started = true;
        self.overlay.start_visible = false;
        self.scheduler.request_frame(now);
        self.spawn_timer = Some(
            self.scheduler
                .start_interval(now, self.config.spawn_period()),
        );
        match self.soundtrack.play() {
            Ok(()) => {}
            // Already reported once when the device failed to open.
            Err(AudioError::Unavailable) => log::debug!("Background music unavailable"),
            Err(err) => log::error!("Error playing background music: {err}"),
        }
        log::info!("Session started");
    }

    /// Back to the start screen. Obstacle speed and failure count survive.
    pub fn restart(&mut self) {
        self.session.reset(&self.config);
        self.overlay = Overlay::default();
        if let Some(token) = self.spawn_timer.take() {
            self.scheduler.cancel(token);
        }
        self.soundtrack.stop();
        log::info!("Session reset");
    }

    /// Hide the game-over modal without leaving the game-over state.
    pub fn close_modal(&mut self) {
        self.overlay.modal = None;
    }

    /// Run every scheduler event due at `now`. Returns the number of frames run.
    pub fn advance(&mut self, now: Duration) -> usize {
        let ticks = self.scheduler.poll(now);
        let mut frames = 0;
        for tick in ticks {
            if tick == Tick::Frame {
                frames += 1;
            }
            self.dispatch(tick, now);
        }
        frames
    }

    pub fn dispatch(&mut self, tick: Tick, now: Duration) {
        match tick {
            Tick::Frame => self.on_frame(now),
            Tick::Interval(token) if self.spawn_timer == Some(token) => self.on_spawn(),
            Tick::Interval(token) => log::debug!("Ignoring stale timer {token:?}"),
        }
    }

    /// Frame handler. Keeps re-arming itself while started, even once the
    /// session is over, but only steps physics while running.
    pub fn on_frame(&mut self, now: Duration) {
        if !self.session.started {
            return;
        }
        self.scheduler.request_frame(now);
        if self.session.over {
            return;
        }

        let outcome = physics::step(&mut self.session, &self.config);
        if outcome.ends_session() {
            self.end_session(outcome);
        }
    }

    /// Spawn timer handler.
    pub fn on_spawn(&mut self) {
        self.generator
            .spawn(&mut self.session, &mut self.difficulty, &self.config);
    }

    fn end_session(&mut self, outcome: StepOutcome) {
        self.difficulty.record_failure();
        let score = self.session.display_score();
        self.best = self.best.max(score);
        self.overlay.modal = Some(score);
        if let Err(err) = self.soundtrack.crash() {
            log::error!("Error playing crash sound: {err}");
        }
        log::info!(
            "Game over ({outcome:?}) with score {score}, {} failures so far",
            self.difficulty.failures()
        );
    }

    /// How long the loop may wait for input before a tick is due.
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.scheduler.time_until_next(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;

    fn game() -> Game {
        Game::with_seed(Config::default(), 1, Box::new(Silent::disabled()))
    }

    #[test]
    fn first_tap_starts_without_flapping() {
        let mut game = game();
        game.tap(Duration::ZERO);

        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.session().actor.velocity_y, 0.0);
        assert!(!game.overlay().start_visible);
        assert!(game.scheduler().frame_armed());
        assert!(game.spawn_timer().is_some());
    }

    #[test]
    fn tap_while_running_flaps() {
        let mut game = game();
        game.tap(Duration::ZERO);
        game.tap(Duration::from_millis(5));
        assert_eq!(game.session().actor.velocity_y, -6.0);
    }

    #[test]
    fn restart_key_only_applies_after_game_over() {
        let mut game = game();
        game.tap(Duration::ZERO);
        assert!(game.handle(Command::Restart, Duration::ZERO));
        assert_eq!(game.phase(), Phase::Running);
    }

    #[test]
    fn quit_is_reported() {
        let mut game = game();
        assert!(!game.handle(Command::Quit, Duration::ZERO));
    }

    #[test]
    fn cancelled_spawn_timer_is_ignored() {
        let mut game = game();
        game.tap(Duration::ZERO);
        let old = game.spawn_timer().expect("spawn timer");
        game.restart();
        game.tap(Duration::from_millis(10));
        let current = game.spawn_timer().expect("spawn timer");
        assert_ne!(old, current);

        game.dispatch(Tick::Interval(old), Duration::from_secs(2));
        assert!(game.session().obstacles.is_empty());

        game.dispatch(Tick::Interval(current), Duration::from_secs(2));
        assert_eq!(game.session().obstacles.len(), 2);
    }

    #[test]
    fn frame_chain_stops_when_not_started() {
        let mut game = game();
        game.on_frame(Duration::ZERO);
        assert!(!game.scheduler().frame_armed());
    }
}
