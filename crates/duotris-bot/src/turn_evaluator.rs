//! Choosing where the current piece should go.
//!
//! The search is exhaustive and greedy: every rotation state and every starting column of
//! the falling piece (and optionally of the piece hold would bring in) is dropped straight
//! down and scored with a [`PlacementEvaluator`]. Only the immediate placement is judged;
//! there is no lookahead into the queue.
//!
//! A placement counts as reachable when the piece fits at its spawn row in the target
//! rotation and column. Candidates are visited rotation-major, then by column from left
//! to right, and the strictly highest score wins, so the first candidate found keeps ties.

use duotris_engine::{Board, COLS, GameField, Piece, PieceKind, PiecePosition, PieceRotation};

use crate::{placement_analysis::PlacementAnalysis, placement_evaluator::PlacementEvaluator};

/// Leftmost matrix offset tried; a 4-wide matrix may hang two empty columns past the wall.
const MIN_X: i32 = -2;

#[expect(clippy::cast_possible_wrap)]
const MAX_X: i32 = COLS as i32 - 1;

/// Where to put the current piece, and whether to hold first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPlan {
    use_hold: bool,
    placement: Piece,
}

impl TurnPlan {
    #[must_use]
    pub fn use_hold(&self) -> bool {
        self.use_hold
    }

    /// Final resting position of the piece.
    #[must_use]
    pub fn placement(&self) -> Piece {
        self.placement
    }
}

#[derive(Debug)]
pub struct TurnEvaluator<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> TurnEvaluator<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Returns the best plan for the falling piece of `field`, or `None` when no piece is
    /// falling or no placement is reachable.
    ///
    /// With `consider_hold`, placements of the piece hold would bring in are searched too,
    /// after those of the current piece, provided hold is still available.
    #[must_use]
    pub fn select_best_turn(
        &self,
        field: &GameField,
        consider_hold: bool,
    ) -> Option<(TurnPlan, PlacementAnalysis)> {
        let board = field.board();
        let current = field.falling_piece()?;

        let mut candidates = vec![(false, current.kind())];
        if consider_hold && !field.is_hold_used() {
            let after_hold = field.peek_falling_piece_after_hold();
            if !board.is_colliding(after_hold) {
                candidates.push((true, after_hold.kind()));
            }
        }

        let mut best_score = f32::MIN;
        let mut best_result = None;
        for (use_hold, kind) in candidates {
            for placement in available_placements(board, kind) {
                let analysis = PlacementAnalysis::from_board(board, placement);
                let score = self.placement_evaluator.evaluate_placement(&analysis);
                if score > best_score {
                    best_score = score;
                    best_result = Some((
                        TurnPlan {
                            use_hold,
                            placement,
                        },
                        analysis,
                    ));
                }
            }
        }
        best_result
    }
}

/// Enumerates the landing positions of `kind` in search order.
pub fn available_placements(board: &Board, kind: PieceKind) -> impl Iterator<Item = Piece> + '_ {
    let spawn_y = kind.spawn_position().y();
    PieceRotation::ALL
        .into_iter()
        .flat_map(move |rotation| {
            (MIN_X..=MAX_X).map(move |x| {
                Piece::with_placement(kind, rotation, PiecePosition::new(x, spawn_y))
            })
        })
        .filter(|piece| !board.is_colliding(*piece))
        .map(|piece| piece.simulate_drop_position(board))
}

#[cfg(test)]
mod tests {
    use duotris_engine::{KickTable, PieceBag, PieceSeed};

    use super::*;
    use crate::placement_evaluator::HeuristicPlacementEvaluator;

    fn evaluator() -> TurnEvaluator<'static> {
        TurnEvaluator::new(Box::new(HeuristicPlacementEvaluator::default()))
    }

    fn seed_with_opening(first: PieceKind, second: PieceKind) -> PieceSeed {
        (0..)
            .map(PieceSeed::from_u128)
            .find(|seed| {
                let mut bag = PieceBag::with_seed(*seed);
                bag.draw() == first && bag.draw() == second
            })
            .unwrap()
    }

    fn field_with(board: Board, seed: PieceSeed) -> GameField {
        let mut field = GameField::with_board(board, seed, 5, KickTable::Srs);
        field.spawn_next().unwrap();
        field
    }

    const WELL: &str = "
        #########.
        #########.
        #########.
        #########.
    ";

    #[test]
    fn test_every_rotation_and_column_is_searched() {
        let placements: Vec<Piece> = available_placements(&Board::EMPTY, PieceKind::T).collect();
        // A 3-wide T fits in 8 columns flat and 9 upright.
        assert_eq!(placements.len(), 8 + 9 + 8 + 9);
        assert!(
            placements
                .iter()
                .all(|p| Board::EMPTY.is_colliding(p.down()))
        );
    }

    #[test]
    fn test_flat_i_on_empty_board_prefers_left() {
        let field = field_with(Board::EMPTY, seed_with_opening(PieceKind::I, PieceKind::O));
        let (plan, analysis) = evaluator().select_best_turn(&field, false).unwrap();
        assert!(!plan.use_hold());
        assert_eq!(
            plan.placement(),
            Piece::with_placement(
                PieceKind::I,
                PieceRotation::new(0),
                PiecePosition::new(0, 18)
            )
        );
        assert_eq!(analysis.cleared_lines(), 0);
    }

    #[test]
    fn test_first_found_wins_ties() {
        // O against either wall scores the same; the left one is visited first.
        let field = field_with(Board::EMPTY, seed_with_opening(PieceKind::O, PieceKind::I));
        let (plan, _) = evaluator().select_best_turn(&field, false).unwrap();
        assert_eq!(plan.placement().rotation(), PieceRotation::new(0));
        assert_eq!(plan.placement().position(), PiecePosition::new(-1, 17));
    }

    #[test]
    fn test_i_goes_into_well() {
        let field = field_with(
            Board::from_ascii(WELL),
            seed_with_opening(PieceKind::I, PieceKind::T),
        );
        let (plan, analysis) = evaluator().select_best_turn(&field, false).unwrap();
        assert_eq!(analysis.cleared_lines(), 4);
        assert!(
            plan.placement()
                .occupied_positions()
                .all(|(x, _)| x == 9)
        );
        assert_eq!(plan.placement().rotation(), PieceRotation::new(1));
    }

    #[test]
    fn test_metrics_include_the_cleared_row() {
        let board = Board::from_ascii(
            "
            ......##..
            ###.######
            ####.#####
            ",
        );
        let field = field_with(board, seed_with_opening(PieceKind::T, PieceKind::I));
        let (plan, analysis) = evaluator().select_best_turn(&field, false).unwrap();
        // Upside-down T plugs column 3 and clears one row. Scored after the clear, the
        // left-pointing T would look better.
        assert_eq!(analysis.cleared_lines(), 1);
        assert_eq!(
            plan.placement(),
            Piece::with_placement(
                PieceKind::T,
                PieceRotation::new(2),
                PiecePosition::new(2, 16)
            )
        );
        assert_eq!(analysis.board_analysis().aggregate_height(), 25);
        assert_eq!(analysis.board_analysis().num_holes(), 1);
    }

    #[test]
    fn test_hold_considered_when_allowed() {
        let field = field_with(
            Board::from_ascii(WELL),
            seed_with_opening(PieceKind::S, PieceKind::I),
        );
        let (plan, analysis) = evaluator().select_best_turn(&field, true).unwrap();
        assert!(plan.use_hold());
        assert_eq!(plan.placement().kind(), PieceKind::I);
        assert_eq!(analysis.cleared_lines(), 4);

        let (plan, _) = evaluator().select_best_turn(&field, false).unwrap();
        assert!(!plan.use_hold());
        assert_eq!(plan.placement().kind(), PieceKind::S);
    }

    #[test]
    fn test_no_piece_no_plan() {
        let field = GameField::new(PieceSeed::from_u128(1), 5, KickTable::Srs);
        assert!(evaluator().select_best_turn(&field, true).is_none());
    }
}
