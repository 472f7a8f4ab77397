//! Flappy Arcade - a single-screen Flappy Bird clone for the terminal.
//!
//! Modules:
//! - `state`: the bird, the pipes and the session flags
//! - `physics`: gravity, scoring and AABB collision per frame
//! - `spawn`: pipe pair generation and speed escalation
//! - `scheduler`: frame and spawn timing on a virtual clock
//! - `input`: raw keyboard/pointer/touch events to game commands
//! - `game`: the session controller tying it all together
//! - `render`: the drawing seam and the half-block terminal canvas
//! - `audio`: synthesized music and crash sound

pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod physics;
pub mod render;
pub mod scheduler;
pub mod spawn;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use game::{Game, Overlay};
pub use state::{Phase, Session};
