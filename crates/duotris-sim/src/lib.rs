//! Match driver for duotris.
//!
//! A [`Simulation`] owns one or two [`PlayerSession`](duotris_engine::PlayerSession)s, the
//! bots that control some of them, and the garbage exchange between them. The embedding
//! program calls [`Simulation::tick`] once per frame with the elapsed time, forwards human
//! input through [`Simulation::command`], and reads state back through
//! [`Simulation::sessions`] and [`Simulation::drain_events`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use duotris_engine::PieceSeed;
//! use duotris_sim::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::bot_vs_bot(), PieceSeed::from_u128(7))?;
//! sim.start()?;
//! for _ in 0..500 {
//!     sim.tick(Duration::from_millis(16));
//! }
//! assert!(sim.sessions().all(|session| session.stats().completed_pieces() > 0));
//! # Ok::<(), duotris_sim::SimulationError>(())
//! ```

use duotris_engine::{ConfigError, InputError};

pub use self::{config::*, simulation::*};

mod config;
mod simulation;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SimulationError {
    #[display("a match needs 1 to {} players, got {count}", SimulationConfig::MAX_PLAYERS)]
    PlayerCount { count: usize },
    #[display("invalid engine configuration: {_0}")]
    Engine(ConfigError),
    #[display("no player with index {player}")]
    UnknownPlayer { player: usize },
    #[display("input rejected: {_0}")]
    Input(InputError),
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Engine(err)
    }
}

impl From<InputError> for SimulationError {
    fn from(err: InputError) -> Self {
        SimulationError::Input(err)
    }
}
