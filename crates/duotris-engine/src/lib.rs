//! Deterministic simulation core for a two-player falling-block puzzle game.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - static data and pure primitives: the shape library, pieces, wall kicks, and
//!   the board with its collision, merge, line-clear, and garbage operations
//! - [`engine`] - stateful gameplay: the bag randomizer, the lookahead queue with hold, the
//!   playfield, statistics, and the timed player session state machine
//!
//! Nothing in this crate reads a clock. Time only advances through
//! [`PlayerSession::advance`], which makes every session reproducible from its
//! [`PieceSeed`] and the sequence of deltas and commands fed to it.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

/// Why a player command was rejected.
///
/// Rejections are ordinary outcomes, not failures: callers that only need the "no-op"
/// behavior can discard them with `.ok()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InputError {
    #[display("session is not accepting input")]
    Inactive,
    #[display("piece colliding when applying input")]
    PieceCollision(PieceCollisionError),
    #[display("hold already used in this turn")]
    HoldAlreadyUsed,
}

impl From<PieceCollisionError> for InputError {
    fn from(err: PieceCollisionError) -> Self {
        InputError::PieceCollision(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("lookahead must be at least {min}, got {actual}")]
    LookaheadTooShort { min: usize, actual: usize },
    #[display("minimum gravity interval {min_ms}ms exceeds initial interval {initial_ms}ms")]
    GravityFloorAboveStart { min_ms: u64, initial_ms: u64 },
    #[display("{name} must be greater than zero")]
    Zero { name: &'static str },
}
