use crate::{
    InputError, PieceCollisionError,
    core::{Board, KickTable, Piece, PieceKind, RotationDirection},
};

use super::{piece_buffer::PieceBuffer, piece_generator::PieceSeed};

/// Board, falling piece, queue, and hold slot of one player, without any timing.
///
/// The falling piece is `None` before the first spawn and after a top-out.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    falling_piece: Option<Piece>,
    piece_buffer: PieceBuffer,
    hold_used: bool,
    kick_table: KickTable,
}

impl GameField {
    #[must_use]
    pub fn new(seed: PieceSeed, lookahead: usize, kick_table: KickTable) -> Self {
        Self::with_board(Board::EMPTY, seed, lookahead, kick_table)
    }

    #[must_use]
    pub fn with_board(
        board: Board,
        seed: PieceSeed,
        lookahead: usize,
        kick_table: KickTable,
    ) -> Self {
        Self {
            board,
            falling_piece: None,
            piece_buffer: PieceBuffer::with_seed(seed, lookahead),
            hold_used: false,
            kick_table,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Option<Piece> {
        self.falling_piece
    }

    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.board.is_colliding(piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = Some(piece);
        Ok(())
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.piece_buffer.held_piece()
    }

    #[must_use]
    pub fn is_hold_used(&self) -> bool {
        self.hold_used
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    /// Where the falling piece would land on a hard drop.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.falling_piece
            .map(|piece| piece.simulate_drop_position(&self.board))
    }

    /// Whether the falling piece rests on the stack or the floor.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.falling_piece
            .is_some_and(|piece| self.board.is_colliding(piece.down()))
    }

    pub fn try_shift(&mut self, dx: i32, dy: i32) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece.shifted(dx, dy))
    }

    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), PieceCollisionError> {
        let piece = self
            .falling_piece
            .and_then(|piece| piece.rotated_with_kicks(direction, &self.board, self.kick_table))
            .ok_or(PieceCollisionError)?;
        self.falling_piece = Some(piece);
        Ok(())
    }

    #[must_use]
    pub fn peek_falling_piece_after_hold(&self) -> Piece {
        Piece::spawn(self.piece_buffer.peek_hold_result())
    }

    /// Puts the falling piece into the hold slot and spawns the piece it swaps with: the
    /// previously held one, or the next in the queue when the slot was empty.
    ///
    /// The incoming piece spawns like any other. If its spawn position collides the swap
    /// still happens but nothing is falling afterwards, and `PieceCollision` is returned
    /// so the caller can end the game.
    pub fn try_hold(&mut self) -> Result<(), InputError> {
        if self.hold_used {
            return Err(InputError::HoldAlreadyUsed);
        }
        let current = self.falling_piece.ok_or(InputError::Inactive)?;
        let next = Piece::spawn(self.piece_buffer.hold(current.kind()));
        self.hold_used = true;
        if self.board.is_colliding(next) {
            self.falling_piece = None;
            return Err(PieceCollisionError.into());
        }
        self.falling_piece = Some(next);
        Ok(())
    }

    /// Takes the next kind from the queue and places it at its spawn position.
    ///
    /// On collision the board is left untouched and no piece is falling.
    pub fn spawn_next(&mut self) -> Result<Piece, PieceCollisionError> {
        let piece = Piece::spawn(self.piece_buffer.pop_next());
        self.hold_used = false;
        if self.board.is_colliding(piece) {
            self.falling_piece = None;
            return Err(PieceCollisionError);
        }
        self.falling_piece = Some(piece);
        Ok(piece)
    }

    /// Merges the falling piece into the board and clears full rows.
    ///
    /// Returns the number of cleared rows, or `None` if no piece was falling.
    pub fn lock_falling_piece(&mut self) -> Option<usize> {
        let piece = self.falling_piece.take()?;
        self.board.fill_piece(piece);
        Some(self.board.clear_lines())
    }

    /// Pushes garbage rows and discards the falling piece.
    pub fn push_garbage(&mut self, holes: &[usize]) {
        for &hole in holes {
            self.board.push_garbage_row(hole);
        }
        self.falling_piece = None;
    }
}
