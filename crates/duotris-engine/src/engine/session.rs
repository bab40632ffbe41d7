use std::{mem, time::Duration};

use serde::Serialize;

use crate::{
    InputError, PieceCollisionError,
    core::{Board, Piece, PieceKind, RotationDirection},
};

use super::{EngineConfig, GameField, GameStats, PieceSeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created or reset; waiting for [`PlayerSession::start`].
    Ready,
    Playing,
    Paused,
    GameOver,
}

/// Something that happened inside a session, queued until the driver drains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    #[display("piece locked, {cleared_lines} lines cleared (+{score_gained})")]
    PieceLocked {
        cleared_lines: usize,
        score_gained: usize,
    },
    #[display("level up to {level}")]
    LevelUp { level: usize },
    #[display("received {lines} garbage lines")]
    GarbageReceived { lines: usize },
    #[display("topped out")]
    ToppedOut,
}

/// One player's game: field and statistics driven by gravity and lock-delay timers.
///
/// Time only moves through [`Self::advance`]. Commands are synchronous and return
/// `Err` when rejected, leaving the session untouched.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use duotris_engine::{EngineConfig, PieceSeed, PlayerSession};
///
/// let mut session = PlayerSession::new(EngineConfig::standard(), PieceSeed::from_u128(1));
/// session.start().unwrap();
///
/// let spawned = session.falling_piece().unwrap();
/// session.advance(Duration::from_millis(800));
/// assert_eq!(session.falling_piece().unwrap().position().y(), spawned.position().y() + 1);
///
/// session.hard_drop().unwrap();
/// assert_eq!(session.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PlayerSession {
    config: EngineConfig,
    seed: PieceSeed,
    initial_board: Board,
    field: GameField,
    stats: GameStats,
    state: SessionState,
    play_time: Duration,
    gravity_elapsed: Duration,
    lock_elapsed: Option<Duration>,
    spawn_count: u64,
    events: Vec<SessionEvent>,
}

impl PlayerSession {
    #[must_use]
    pub fn new(config: EngineConfig, seed: PieceSeed) -> Self {
        Self::with_board(config, seed, Board::EMPTY)
    }

    /// Creates a session whose board starts from `board` instead of empty.
    #[must_use]
    pub fn with_board(config: EngineConfig, seed: PieceSeed, board: Board) -> Self {
        let field =
            GameField::with_board(board.clone(), seed, config.lookahead, config.kick_table);
        let stats = GameStats::new(config.lines_per_level);
        Self {
            config,
            seed,
            initial_board: board,
            field,
            stats,
            state: SessionState::Ready,
            play_time: Duration::ZERO,
            gravity_elapsed: Duration::ZERO,
            lock_elapsed: None,
            spawn_count: 0,
            events: vec![],
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.field.board()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn falling_piece(&self) -> Option<Piece> {
        self.field.falling_piece()
    }

    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.field.ghost_piece()
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.field.held_piece()
    }

    #[must_use]
    pub fn is_hold_used(&self) -> bool {
        self.field.is_hold_used()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.field.next_pieces()
    }

    /// Time spent in [`SessionState::Playing`].
    #[must_use]
    pub fn play_time(&self) -> Duration {
        self.play_time
    }

    #[must_use]
    pub fn gravity_elapsed(&self) -> Duration {
        self.gravity_elapsed
    }

    /// Time since the falling piece was grounded, or `None` while it can still fall.
    #[must_use]
    pub fn lock_elapsed(&self) -> Option<Duration> {
        self.lock_elapsed
    }

    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        self.config.gravity_interval(self.stats.level())
    }

    /// Counts every spawn, including hold swaps and garbage replacements.
    ///
    /// Controllers compare it between ticks to notice a new falling piece.
    #[must_use]
    pub fn spawn_count(&self) -> u64 {
        self.spawn_count
    }

    /// Removes and returns the queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    /// Spawns the first piece of a [`SessionState::Ready`] session.
    pub fn start(&mut self) -> Result<(), InputError> {
        if !self.state.is_ready() {
            return Err(InputError::Inactive);
        }
        self.state = SessionState::Playing;
        self.spawn_next();
        Ok(())
    }

    /// Discards all state and returns to [`SessionState::Ready`] with a new seed.
    pub fn reset(&mut self, seed: PieceSeed) {
        *self = Self::with_board(self.config.clone(), seed, self.initial_board.clone());
    }

    pub fn toggle_pause(&mut self) -> Result<(), InputError> {
        self.state = match self.state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::Ready | SessionState::GameOver => return Err(InputError::Inactive),
        };
        Ok(())
    }

    /// Advances the timers by `delta`.
    ///
    /// Gravity steps whenever the accumulator reaches the interval for the current level.
    /// The remainder carries over, so a level change only affects later steps. A grounded
    /// piece locks once its lock timer reaches the lock delay.
    pub fn advance(&mut self, delta: Duration) {
        if !self.state.is_playing() {
            return;
        }
        self.play_time += delta;

        self.refresh_lock_timer();
        if let Some(lock_delay) = self.config.lock_delay()
            && let Some(elapsed) = self.lock_elapsed.as_mut()
        {
            *elapsed += delta;
            if *elapsed >= lock_delay {
                self.lock_piece();
            }
        }

        self.gravity_elapsed += delta;
        while self.state.is_playing() {
            let interval = self.gravity_interval();
            if self.gravity_elapsed < interval {
                break;
            }
            self.gravity_elapsed -= interval;
            self.gravity_step();
        }
    }

    fn gravity_step(&mut self) {
        if self.field.try_shift(0, 1).is_ok() {
            self.lock_elapsed = None;
            return;
        }
        if self.config.lock_delay().is_none() {
            self.lock_piece();
        } else if self.lock_elapsed.is_none() && self.field.falling_piece().is_some() {
            self.lock_elapsed = Some(Duration::ZERO);
        }
    }

    // A grounded piece that was moved off its support falls again.
    fn refresh_lock_timer(&mut self) {
        if !self.field.is_grounded() {
            self.lock_elapsed = None;
        }
    }

    fn ensure_playing(&self) -> Result<(), InputError> {
        if !self.state.is_playing() || self.field.falling_piece().is_none() {
            return Err(InputError::Inactive);
        }
        Ok(())
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> Result<(), InputError> {
        self.ensure_playing()?;
        self.field.try_shift(dx, dy)?;
        self.refresh_lock_timer();
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), InputError> {
        self.try_shift(-1, 0)
    }

    pub fn try_move_right(&mut self) -> Result<(), InputError> {
        self.try_shift(1, 0)
    }

    pub fn try_soft_drop(&mut self) -> Result<(), InputError> {
        self.try_shift(0, 1)
    }

    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), InputError> {
        self.ensure_playing()?;
        self.field.try_rotate(direction)?;
        self.refresh_lock_timer();
        Ok(())
    }

    /// Swaps the falling piece with the hold slot. A swapped-in piece that cannot spawn
    /// ends the session the same way a blocked spawn does.
    pub fn try_hold(&mut self) -> Result<(), InputError> {
        self.ensure_playing()?;
        match self.field.try_hold() {
            Ok(()) => {
                self.lock_elapsed = None;
                self.spawn_count += 1;
                Ok(())
            }
            Err(InputError::PieceCollision(_)) => {
                self.top_out();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Drops the falling piece to its ghost position and locks it immediately.
    pub fn hard_drop(&mut self) -> Result<(), InputError> {
        self.ensure_playing()?;
        let ghost = self.field.ghost_piece().ok_or(InputError::Inactive)?;
        self.field.set_falling_piece(ghost)?;
        self.lock_piece();
        Ok(())
    }

    /// Pushes one garbage row per entry of `holes`, each empty at that column.
    ///
    /// The falling piece is replaced by the next queued piece and the timers restart. If
    /// the replacement cannot be placed the session is over. Ignored unless playing.
    pub fn receive_garbage(&mut self, holes: &[usize]) {
        if !self.state.is_playing() || holes.is_empty() {
            return;
        }
        self.field.push_garbage(holes);
        self.events.push(SessionEvent::GarbageReceived { lines: holes.len() });
        self.gravity_elapsed = Duration::ZERO;
        self.spawn_next();
    }

    fn lock_piece(&mut self) {
        let level = self.stats.level();
        let Some(cleared_lines) = self.field.lock_falling_piece() else {
            return;
        };
        let score_gained = self.stats.complete_piece_drop(cleared_lines);
        self.events.push(SessionEvent::PieceLocked {
            cleared_lines,
            score_gained,
        });
        if self.stats.level() > level {
            self.events.push(SessionEvent::LevelUp {
                level: self.stats.level(),
            });
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        self.lock_elapsed = None;
        match self.field.spawn_next() {
            Ok(_) => self.spawn_count += 1,
            Err(PieceCollisionError) => self.top_out(),
        }
    }

    fn top_out(&mut self) {
        self.lock_elapsed = None;
        self.state = SessionState::GameOver;
        self.events.push(SessionEvent::ToppedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Block, PieceBag, PiecePosition, PieceRotation};

    const STANDARD: EngineConfig = EngineConfig::standard();

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// Finds a seed whose first piece is `kind`.
    fn seed_starting_with(kind: PieceKind) -> PieceSeed {
        (0..)
            .map(PieceSeed::from_u128)
            .find(|seed| PieceBag::with_seed(*seed).draw() == kind)
            .unwrap()
    }

    fn started(config: EngineConfig, seed: PieceSeed, board: Board) -> PlayerSession {
        let mut session = PlayerSession::with_board(config, seed, board);
        session.start().unwrap();
        session
    }

    #[test]
    fn test_commands_rejected_until_started() {
        let mut session = PlayerSession::new(STANDARD, PieceSeed::from_u128(1));
        assert!(session.state().is_ready());
        assert_eq!(session.try_move_left(), Err(InputError::Inactive));
        assert_eq!(session.hard_drop(), Err(InputError::Inactive));
        assert_eq!(session.toggle_pause(), Err(InputError::Inactive));
        session.advance(ms(5000));
        assert!(session.falling_piece().is_none());

        session.start().unwrap();
        assert!(session.state().is_playing());
        assert_eq!(session.spawn_count(), 1);
        assert_eq!(session.start(), Err(InputError::Inactive));
    }

    #[test]
    fn test_flat_i_completes_bottom_row() {
        let board = Board::from_ascii("....######");
        let mut session = started(STANDARD, seed_starting_with(PieceKind::I), board);
        for _ in 0..3 {
            session.try_move_left().unwrap();
        }
        assert_eq!(
            session.try_move_left(),
            Err(InputError::PieceCollision(PieceCollisionError))
        );

        session.hard_drop().unwrap();
        assert_eq!(session.stats().score(), 100);
        assert_eq!(session.stats().total_cleared_lines(), 1);
        assert_eq!(session.board(), &Board::EMPTY);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::PieceLocked {
                cleared_lines: 1,
                score_gained: 100
            }]
        );
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_second_hold_is_noop() {
        let mut session = started(STANDARD, PieceSeed::from_u128(8), Board::EMPTY);
        session.try_hold().unwrap();
        let piece = session.falling_piece();
        let held = session.held_piece();
        let queue: Vec<PieceKind> = session.next_pieces().collect();

        assert_eq!(session.try_hold(), Err(InputError::HoldAlreadyUsed));
        assert_eq!(session.falling_piece(), piece);
        assert_eq!(session.held_piece(), held);
        assert_eq!(session.next_pieces().collect::<Vec<_>>(), queue);

        session.hard_drop().unwrap();
        assert!(!session.is_hold_used());
        session.try_hold().unwrap();
    }

    #[test]
    fn test_hold_into_blocked_spawn_is_game_over() {
        let seed = seed_starting_with(PieceKind::T);
        let mut board = Board::EMPTY;
        for y in 0..2 {
            for x in 0..Board::WIDTH {
                board.fill_block_at(x, y, Block::Garbage);
            }
        }
        for (x, y) in Piece::spawn(PieceKind::T).occupied_positions() {
            let (x, y) = (usize::try_from(x).unwrap(), usize::try_from(y).unwrap());
            board.fill_block_at(x, y, Block::Empty);
        }
        let mut session = started(STANDARD, seed, board);
        assert!(session.state().is_playing());
        session.drain_events();

        assert_eq!(session.try_hold(), Ok(()));
        assert!(session.state().is_game_over());
        assert!(session.falling_piece().is_none());
        assert_eq!(session.held_piece(), Some(PieceKind::T));
        assert_eq!(session.drain_events(), vec![SessionEvent::ToppedOut]);
        assert_eq!(session.try_hold(), Err(InputError::Inactive));
    }

    #[test]
    fn test_unvalidated_zero_lines_per_level_does_not_panic() {
        let config = EngineConfig {
            lines_per_level: 0,
            ..STANDARD
        };
        let mut session = started(config, PieceSeed::from_u128(4), Board::EMPTY);
        session.hard_drop().unwrap();
        assert_eq!(session.stats().level(), 1);
        assert_eq!(session.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_spawn_collision_is_game_over() {
        let mut board = Board::EMPTY;
        for y in 0..2 {
            for x in 3..7 {
                board.fill_block_at(x, y, Block::Garbage);
            }
        }
        let mut session =
            PlayerSession::with_board(STANDARD, PieceSeed::from_u128(2), board.clone());
        session.start().unwrap();
        assert!(session.state().is_game_over());
        assert!(session.falling_piece().is_none());
        assert_eq!(session.board(), &board);
        assert_eq!(session.drain_events(), vec![SessionEvent::ToppedOut]);

        assert_eq!(
            session.try_rotate(RotationDirection::Clockwise),
            Err(InputError::Inactive)
        );
        assert_eq!(session.toggle_pause(), Err(InputError::Inactive));
    }

    #[test]
    fn test_gravity_moves_piece_down() {
        let mut session = started(STANDARD, PieceSeed::from_u128(3), Board::EMPTY);
        let y = session.falling_piece().unwrap().position().y();
        session.advance(ms(799));
        assert_eq!(session.falling_piece().unwrap().position().y(), y);
        session.advance(ms(1));
        assert_eq!(session.falling_piece().unwrap().position().y(), y + 1);
        assert_eq!(session.gravity_elapsed(), Duration::ZERO);
        session.advance(ms(1700));
        assert_eq!(session.falling_piece().unwrap().position().y(), y + 3);
        assert_eq!(session.gravity_elapsed(), ms(100));
    }

    #[test]
    fn test_lock_delay() {
        let mut session = started(STANDARD, PieceSeed::from_u128(4), Board::EMPTY);
        let ghost = session.ghost_piece().unwrap();
        session.field.set_falling_piece(ghost).unwrap();

        // The failed gravity step grounds the piece.
        session.advance(ms(800));
        assert_eq!(session.lock_elapsed(), Some(Duration::ZERO));
        session.advance(ms(499));
        assert_eq!(session.lock_elapsed(), Some(ms(499)));
        assert_eq!(session.stats().completed_pieces(), 0);
        session.advance(ms(1));
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.lock_elapsed(), None);
        assert_eq!(session.spawn_count(), 2);
    }

    #[test]
    fn test_lock_timer_cancelled_when_piece_can_fall() {
        let board = Board::from_ascii(
            "
            ######....
            ######....
            ",
        );
        let mut session = started(STANDARD, PieceSeed::from_u128(4), board);
        // O covers matrix columns 1 and 2, so this rests on columns 4 and 5 of the ledge.
        let on_ledge = Piece::with_placement(
            PieceKind::O,
            PieceRotation::new(0),
            PiecePosition::new(3, 15),
        );
        session.field.set_falling_piece(on_ledge).unwrap();
        session.advance(ms(800));
        session.advance(ms(300));
        assert_eq!(session.lock_elapsed(), Some(ms(300)));

        // Sliding along the ledge does not restart the timer.
        session.try_move_right().unwrap();
        assert_eq!(session.lock_elapsed(), Some(ms(300)));

        // Past the edge the piece can fall again.
        session.try_move_right().unwrap();
        assert_eq!(session.lock_elapsed(), None);
        session.advance(ms(800));
        assert_eq!(session.falling_piece().unwrap().position().y(), 16);
        assert_eq!(session.stats().completed_pieces(), 0);
    }

    #[test]
    fn test_no_lock_delay_locks_on_failed_gravity() {
        let mut session =
            started(EngineConfig::classic(), PieceSeed::from_u128(4), Board::EMPTY);
        let ghost = session.ghost_piece().unwrap();
        session.field.set_falling_piece(ghost).unwrap();
        session.advance(ms(800));
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.lock_elapsed(), None);
    }

    #[test]
    fn test_pause_freezes_timers() {
        let mut session = started(STANDARD, PieceSeed::from_u128(5), Board::EMPTY);
        session.advance(ms(300));
        session.toggle_pause().unwrap();
        assert!(session.state().is_paused());
        let piece = session.falling_piece();
        session.advance(ms(10_000));
        assert_eq!(session.falling_piece(), piece);
        assert_eq!(session.gravity_elapsed(), ms(300));
        assert_eq!(session.play_time(), ms(300));
        assert_eq!(session.try_move_left(), Err(InputError::Inactive));

        session.toggle_pause().unwrap();
        session.advance(ms(500));
        assert_eq!(
            session.falling_piece().unwrap().position().y(),
            piece.unwrap().position().y() + 1
        );
    }

    #[test]
    fn test_level_up_keeps_partial_gravity() {
        // Nine of ten lines already cleared; the next single clear levels up.
        let board = Board::from_ascii("....######");
        let mut session = started(STANDARD, seed_starting_with(PieceKind::I), board);
        for _ in 0..9 {
            session.stats.complete_piece_drop(1);
        }
        session.advance(ms(300));
        for _ in 0..3 {
            session.try_move_left().unwrap();
        }
        session.hard_drop().unwrap();
        assert_eq!(session.stats().level(), 2);
        assert_eq!(session.gravity_interval(), ms(740));
        assert_eq!(session.gravity_elapsed(), ms(300));
        assert!(
            session
                .drain_events()
                .contains(&SessionEvent::LevelUp { level: 2 })
        );

        let y = session.falling_piece().unwrap().position().y();
        session.advance(ms(440));
        assert_eq!(session.falling_piece().unwrap().position().y(), y + 1);
    }

    #[test]
    fn test_receive_garbage() {
        let board = Board::from_ascii(
            "
            LLL.......
            L.........
            ",
        );
        let mut session = started(STANDARD, PieceSeed::from_u128(6), board.clone());
        session.try_hold().unwrap();
        session.advance(ms(500));
        let next = session.next_pieces().next().unwrap();
        let spawns = session.spawn_count();

        session.receive_garbage(&[2, 7, 7]);
        let rows: Vec<&[Block; 10]> = session.board().rows().collect();
        assert_eq!(rows.len(), Board::HEIGHT);
        // Old bottom rows moved up by three.
        assert_eq!(session.board().get(0, 15), Some(Block::Piece(PieceKind::L)));
        assert_eq!(session.board().get(0, 16), Some(Block::Piece(PieceKind::L)));
        for row in &rows[Board::HEIGHT - 3..] {
            assert_eq!(row.iter().filter(|b| b.is_empty()).count(), 1);
        }
        assert_eq!(session.board().get(2, 17), Some(Block::Empty));
        assert_eq!(session.board().get(7, 19), Some(Block::Empty));

        assert_eq!(session.falling_piece().unwrap().kind(), next);
        assert_eq!(session.falling_piece(), Some(Piece::spawn(next)));
        assert!(!session.is_hold_used());
        assert_eq!(session.gravity_elapsed(), Duration::ZERO);
        assert_eq!(session.spawn_count(), spawns + 1);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::GarbageReceived { lines: 3 }]
        );
    }

    #[test]
    fn test_garbage_can_top_out() {
        let mut session = started(STANDARD, PieceSeed::from_u128(7), Board::EMPTY);
        session.receive_garbage(&[0; Board::HEIGHT]);
        assert!(session.state().is_game_over());
        assert_eq!(
            session.drain_events(),
            vec![
                SessionEvent::GarbageReceived {
                    lines: Board::HEIGHT
                },
                SessionEvent::ToppedOut
            ]
        );
        // Game over sessions ignore further garbage.
        let board = session.board().clone();
        session.receive_garbage(&[1]);
        assert_eq!(session.board(), &board);
    }

    #[test]
    fn test_reset_restores_ready_state() {
        let mut session = started(STANDARD, PieceSeed::from_u128(9), Board::EMPTY);
        session.hard_drop().unwrap();
        session.reset(PieceSeed::from_u128(10));
        assert!(session.state().is_ready());
        assert_eq!(session.board(), &Board::EMPTY);
        assert_eq!(session.stats().score(), 0);
        assert_eq!(session.stats().completed_pieces(), 0);
        assert_eq!(session.spawn_count(), 0);
        assert_eq!(session.seed(), PieceSeed::from_u128(10));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = |seed| {
            let mut session = started(STANDARD, seed, Board::EMPTY);
            for i in 0..30 {
                if i % 3 == 0 {
                    session.try_move_left().ok();
                } else {
                    session.try_rotate(RotationDirection::Clockwise).ok();
                }
                session.advance(ms(450));
                session.hard_drop().ok();
            }
            (session.board().clone(), session.stats().clone())
        };
        let seed = PieceSeed::from_u128(0xdead_beef);
        assert_eq!(play(seed), play(seed));
    }
}
