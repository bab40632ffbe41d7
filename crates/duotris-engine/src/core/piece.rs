use super::{
    board::Board,
    rotation::{KickTable, RotationDirection},
};

/// A falling piece: kind, rotation state, and the board offset of its shape matrix.
///
/// Pieces are plain data. Movement and rotation return new `Piece` values and never look
/// at a board, except for the kick-aware rotations which need one to test candidates.
///
/// # Coordinate System
///
/// - `x` is the column of the matrix's left edge, `y` the row of its top edge
/// - Row 0 is the top of the visible playfield; `y` may be negative while the piece is
///   still above it
///
/// # Example
///
/// ```
/// use duotris_engine::{Board, Piece, PieceKind, RotationDirection, KickTable};
///
/// let board = Board::EMPTY;
/// let piece = Piece::spawn(PieceKind::T);
/// let moved = piece.left();
/// let rotated = moved
///     .rotated_with_kicks(RotationDirection::Clockwise, &board, KickTable::Srs)
///     .unwrap();
/// assert_eq!(rotated.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    /// Creates a piece at the spawn offset of its kind, in rotation 0.
    #[must_use]
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            position: kind.spawn_position(),
            rotation: PieceRotation::default(),
            kind,
        }
    }

    /// Creates a piece at an explicit rotation and position.
    #[must_use]
    pub const fn with_placement(
        kind: PieceKind,
        rotation: PieceRotation,
        position: PiecePosition,
    ) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns the absolute `(x, y)` board coordinates of every occupied cell.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.kind
            .occupied_positions(self.rotation)
            .map(move |(dx, dy)| (self.position.x + dx, self.position.y + dy))
    }

    #[must_use]
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: PiecePosition::new(self.position.x + dx, self.position.y + dy),
            rotation: self.rotation,
            kind: self.kind,
        }
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    /// Rotates in place without testing any kick.
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.rotated(direction),
            kind: self.kind,
        }
    }

    /// Rotates using the given kick table.
    ///
    /// Candidate offsets are tried in table order and the first collision-free one wins.
    /// Returns `None` when every candidate collides.
    #[must_use]
    pub fn rotated_with_kicks(
        self,
        direction: RotationDirection,
        board: &Board,
        table: KickTable,
    ) -> Option<Self> {
        let rotated = self.rotated(direction);
        table
            .kicks(self.kind, self.rotation, rotated.rotation)
            .iter()
            .map(|&(dx, dy)| rotated.shifted(dx, dy))
            .find(|candidate| !board.is_colliding(*candidate))
    }

    /// Returns the piece moved down as far as it can go without colliding.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while !board.is_colliding(dropped.down()) {
            dropped = dropped.down();
        }
        dropped
    }
}

/// Offset of a piece's shape matrix on the board.
///
/// Signed so that a piece can sit partially above the playfield (negative `y`) or have
/// empty matrix columns hanging past a wall (negative `x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    /// Creates a rotation state from any index, reduced modulo 4.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_left(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    #[must_use]
    pub fn rotated(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => self.rotated_right(),
            RotationDirection::CounterClockwise => self.rotated_left(),
        }
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns the occupancy matrix for `rotation`.
    ///
    /// The matrix is always stored as 4×4. I and O rotate within all of it, the other
    /// kinds within its top-left 3×3.
    #[must_use]
    pub fn shape(self, rotation: PieceRotation) -> &'static PieceShape {
        &PIECE_SHAPES[self as usize][rotation.as_usize()]
    }

    /// Returns an iterator of occupied `(dx, dy)` matrix offsets in the given rotation.
    pub fn occupied_positions(self, rotation: PieceRotation) -> impl Iterator<Item = (i32, i32)> {
        self.shape(rotation)
            .iter()
            .zip(0..)
            .flat_map(|(row, dy)| {
                row.iter()
                    .zip(0..)
                    .filter_map(move |(&cell, dx)| cell.then_some((dx, dy)))
            })
    }

    /// Spawn offset: horizontally centered, with I and O lifted one row so that their
    /// first occupied row lands on row 0.
    #[must_use]
    pub const fn spawn_position(self) -> PiecePosition {
        match self {
            PieceKind::I | PieceKind::O => PiecePosition::new(3, -1),
            PieceKind::S | PieceKind::Z | PieceKind::J | PieceKind::L | PieceKind::T => {
                PiecePosition::new(3, 0)
            }
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use duotris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use duotris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Looks up the occupancy matrix of `kind` at `rotation mod 4`.
#[must_use]
pub fn shape_at(kind: PieceKind, rotation: u8) -> &'static PieceShape {
    kind.shape(PieceRotation::new(rotation))
}

/// Occupancy matrix of one rotation state, always stored as 4×4.
pub type PieceShape = [[bool; 4]; 4];

/// Generates all 4 rotation states of a shape by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Edge of the square the shape rotates within (3 or 4)
/// * `shape` - Initial shape at rotation 0
const fn shape_rotations(size: usize, shape: &PieceShape) -> [PieceShape; 4] {
    let mut rotates = [*shape; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_shape = [[false; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                new_shape[y][x] = rotates[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_shape;
        i += 1;
    }
    rotates
}

const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // I-piece
        shape_rotations(4, &[EEEE, [C, C, C, C], EEEE, EEEE]),
        // O-piece (centered in 4×4, so every rotation is identical)
        shape_rotations(4, &[EEEE, [E, C, C, E], [E, C, C, E], EEEE]),
        // S-piece
        shape_rotations(3, &[[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // Z-piece
        shape_rotations(3, &[[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
        // J-piece
        shape_rotations(3, &[[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L-piece
        shape_rotations(3, &[[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // T-piece
        shape_rotations(3, &[[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
    ]
};
