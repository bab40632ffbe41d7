pub use self::{board::*, piece::*, rotation::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod rotation;

/// Number of columns on the playfield.
pub const COLS: usize = 10;
/// Number of visible rows on the playfield.
pub const ROWS: usize = 20;
