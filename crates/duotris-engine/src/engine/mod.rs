//! Stateful gameplay built on the [`core`](crate::core) primitives.
//!
//! - [`PieceBag`] - 7-bag randomizer seeded by a [`PieceSeed`]
//! - [`PieceBuffer`] - lookahead queue and hold slot
//! - [`GameField`] - board, falling piece, queue, and hold without timing
//! - [`GameStats`] - score, lines, level, and piece counters
//! - [`PlayerSession`] - one player's timed game: gravity, lock delay, commands, garbage
//!
//! # Game Flow
//!
//! 1. Create a [`PlayerSession`] from an [`EngineConfig`] and a seed, then [`start`] it
//! 2. Feed elapsed time through [`advance`] and player commands in between
//! 3. A lock merges the piece, clears lines, scores, and spawns the next piece
//! 4. The session is over when a fresh piece cannot be placed
//!
//! [`start`]: PlayerSession::start
//! [`advance`]: PlayerSession::advance
//!
//! # Example
//!
//! ```
//! use duotris_engine::{EngineConfig, PieceSeed, PlayerSession, RotationDirection};
//!
//! let mut session = PlayerSession::new(EngineConfig::standard(), PieceSeed::from_u128(42));
//! session.start().unwrap();
//!
//! // Rejected commands leave the session unchanged.
//! session.try_move_left().ok();
//! session.try_rotate(RotationDirection::Clockwise).ok();
//! session.hard_drop().unwrap();
//!
//! for event in session.drain_events() {
//!     println!("{event}");
//! }
//! ```

pub use self::{
    config::*, game_field::*, game_stats::*, piece_buffer::*, piece_generator::*, session::*,
};

mod config;
mod game_field;
mod game_stats;
mod piece_buffer;
mod piece_generator;
mod session;
