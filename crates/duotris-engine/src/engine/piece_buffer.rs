use std::collections::VecDeque;

use crate::PieceKind;

use super::piece_generator::{PieceBag, PieceSeed};

/// Upcoming pieces plus the hold slot.
///
/// The queue is topped up from a [`PieceBag`] so that at least `lookahead` kinds are always
/// visible after a piece has been taken.
///
/// # Hold
///
/// - The first hold stores the current kind and takes the next one from the queue
/// - Later holds swap the current kind with the held one
///
/// # Example
///
/// ```
/// use duotris_engine::{PieceBuffer, PieceSeed};
///
/// let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u128(7), 5);
/// let first = buffer.pop_next();
/// assert_eq!(buffer.next_pieces().count(), 5);
///
/// let upcoming = buffer.peek_hold_result();
/// assert_eq!(buffer.hold(first), upcoming);
/// assert_eq!(buffer.held_piece(), Some(first));
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    bag: PieceBag,
    queue: VecDeque<PieceKind>,
    lookahead: usize,
    held: Option<PieceKind>,
}

impl PieceBuffer {
    /// Smallest lookahead a queue may be configured with.
    pub const MIN_LOOKAHEAD: usize = 3;

    /// Creates a buffer with a random seed.
    #[must_use]
    pub fn new(lookahead: usize) -> Self {
        Self::from_bag(PieceBag::new(), lookahead)
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed, lookahead: usize) -> Self {
        Self::from_bag(PieceBag::with_seed(seed), lookahead)
    }

    fn from_bag(bag: PieceBag, lookahead: usize) -> Self {
        let lookahead = lookahead.max(Self::MIN_LOOKAHEAD);
        let mut this = Self {
            bag,
            queue: VecDeque::with_capacity(lookahead + 1),
            lookahead,
            held: None,
        };
        this.fill_queue();
        this
    }

    // Keeps one spare so that `lookahead` kinds remain visible after the next pop.
    fn fill_queue(&mut self) {
        while self.queue.len() <= self.lookahead {
            self.queue.push_back(self.bag.draw());
        }
    }

    #[must_use]
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Takes the next kind from the front of the queue.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty, which the refill strategy rules out.
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self
            .queue
            .pop_front()
            .expect("piece queue should never be empty");
        self.fill_queue();
        kind
    }

    /// Returns the visible upcoming kinds, front first.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied().take(self.lookahead)
    }

    /// Returns what kind would become current if hold is used now.
    ///
    /// - If a kind is held: returns the held kind
    /// - If nothing is held: returns the front of the queue
    #[must_use]
    pub fn peek_hold_result(&self) -> PieceKind {
        self.held.unwrap_or_else(|| self.queue[0])
    }

    /// Stores `current` in the hold slot and returns the kind that replaces it.
    pub fn hold(&mut self, current: PieceKind) -> PieceKind {
        self.held
            .replace(current)
            .unwrap_or_else(|| self.pop_next())
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }
}
