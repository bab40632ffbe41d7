use serde::{Deserialize, Serialize};

use super::piece::{PieceKind, PieceRotation};

/// Direction of a rotation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Which wall-kick offsets a rotation tries before giving up.
///
/// Offsets are `(dx, dy)` in board coordinates, so a negative `dy` lifts the piece.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KickTable {
    /// Guideline SRS tables, one for I and one shared by J, L, S, T, Z.
    #[default]
    Srs,
    /// A single horizontal nudge list shared by every piece.
    Simple,
}

type Kicks = [(i32, i32); 5];

const NO_KICK: &[(i32, i32)] = &[(0, 0)];

const SIMPLE_KICKS: Kicks = [(0, 0), (-1, 0), (1, 0), (-2, 0), (2, 0)];

// Indexed by `transition_index`.
const JLSTZ_KICKS: [Kicks; 8] = [
    // 0 -> 1
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 1 -> 0
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 1 -> 2
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 2 -> 1
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 2 -> 3
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 3 -> 2
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 3 -> 0
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 0 -> 3
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
];

const I_KICKS: [Kicks; 8] = [
    // 0 -> 1
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // 1 -> 0
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // 1 -> 2
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    // 2 -> 1
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    // 2 -> 3
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    // 3 -> 2
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    // 3 -> 0
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    // 0 -> 3
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
];

fn transition_index(from: PieceRotation, to: PieceRotation) -> Option<usize> {
    match (from.index(), to.index()) {
        (0, 1) => Some(0),
        (1, 0) => Some(1),
        (1, 2) => Some(2),
        (2, 1) => Some(3),
        (2, 3) => Some(4),
        (3, 2) => Some(5),
        (3, 0) => Some(6),
        (0, 3) => Some(7),
        _ => None,
    }
}

impl KickTable {
    /// Returns the ordered kick candidates for rotating `kind` from `from` to `to`.
    ///
    /// The first entry is always `(0, 0)`, the unkicked rotation. O pieces never kick,
    /// and neither does any pair of states that is not a quarter turn apart.
    #[must_use]
    pub fn kicks(
        self,
        kind: PieceKind,
        from: PieceRotation,
        to: PieceRotation,
    ) -> &'static [(i32, i32)] {
        if kind == PieceKind::O {
            return NO_KICK;
        }
        let Some(index) = transition_index(from, to) else {
            return NO_KICK;
        };
        match self {
            KickTable::Simple => &SIMPLE_KICKS,
            KickTable::Srs if kind == PieceKind::I => &I_KICKS[index],
            KickTable::Srs => &JLSTZ_KICKS[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, Piece, PiecePosition};

    #[test]
    fn test_every_table_starts_unkicked() {
        for table in [KickTable::Srs, KickTable::Simple] {
            for kind in PieceKind::ALL {
                for from in PieceRotation::ALL {
                    for to in [from.rotated_right(), from.rotated_left()] {
                        assert_eq!(table.kicks(kind, from, to)[0], (0, 0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_opposite_transitions_mirror() {
        // Undoing a rotation tries the negated offsets.
        for table in [&JLSTZ_KICKS, &I_KICKS] {
            for pair in table.chunks(2) {
                for (a, b) in pair[0].iter().zip(&pair[1]) {
                    assert_eq!((a.0, a.1), (-b.0, -b.1));
                }
            }
        }
    }

    #[test]
    fn test_o_piece_has_no_kicks() {
        let kicks =
            KickTable::Srs.kicks(PieceKind::O, PieceRotation::new(0), PieceRotation::new(1));
        assert_eq!(kicks, &[(0, 0)]);
    }

    #[test]
    fn test_rotation_against_left_wall_kicks_right() {
        // Vertical I hugging the left wall: column 0 is occupied by matrix column 2.
        let board = Board::EMPTY;
        let piece = Piece::with_placement(
            PieceKind::I,
            PieceRotation::new(1),
            PiecePosition::new(-2, 5),
        );
        assert!(!board.is_colliding(piece));
        let rotated = piece
            .rotated_with_kicks(RotationDirection::CounterClockwise, &board, KickTable::Srs)
            .unwrap();
        assert_eq!(rotated.rotation().index(), 0);
        assert!(rotated.occupied_positions().all(|(x, _)| x >= 0));
    }

    #[test]
    fn test_simple_kicks_nudge_horizontally() {
        let board = Board::EMPTY;
        // T pointing left against the right wall; rotating back needs a left nudge.
        let piece = Piece::with_placement(
            PieceKind::T,
            PieceRotation::new(3),
            PiecePosition::new(8, 5),
        );
        assert!(!board.is_colliding(piece));
        let rotated = piece
            .rotated_with_kicks(RotationDirection::Clockwise, &board, KickTable::Simple)
            .unwrap();
        assert_eq!(rotated.position(), PiecePosition::new(7, 5));
    }

    #[test]
    fn test_rotation_rejected_when_boxed_in() {
        let board = Board::from_ascii(
            r"
            ###...####
            ###...####
            ###...####
            ##########
            ",
        );
        // A flat I can't fit in the 3-wide pocket. Horizontal nudges alone fail; SRS
        // finds the lift out of the pocket.
        let piece = Piece::with_placement(
            PieceKind::I,
            PieceRotation::new(1),
            PiecePosition::new(2, 15),
        );
        assert!(!board.is_colliding(piece));
        assert!(
            piece
                .rotated_with_kicks(RotationDirection::Clockwise, &board, KickTable::Simple)
                .is_none()
        );
        let lifted = piece
            .rotated_with_kicks(RotationDirection::Clockwise, &board, KickTable::Srs)
            .unwrap();
        assert_eq!(lifted.position(), PiecePosition::new(1, 13));
    }
}
