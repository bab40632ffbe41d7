use std::fmt;

use super::{
    COLS, ROWS,
    piece::{Piece, PieceKind, PieceRotation, PiecePosition},
};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell locked by a piece of a specific type.
    Piece(PieceKind),
    /// Cell injected by an opponent's garbage.
    Garbage,
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    /// Single-character form used by [`Board::from_ascii`] and the `Display` impl.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Piece(kind) => kind.as_char(),
            Block::Garbage => '#',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Block::Empty),
            '#' => Some(Block::Garbage),
            _ => match PieceKind::from_char(c) {
                Some(kind) => Some(Block::Piece(kind)),
                None => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoardRow {
    cells: [Block; COLS],
}

impl BoardRow {
    const EMPTY: Self = Self {
        cells: [Block::Empty; COLS],
    };

    fn garbage(hole: usize) -> Self {
        let mut row = Self {
            cells: [Block::Garbage; COLS],
        };
        row.cells[hole] = Block::Empty;
        row
    }

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }
}

/// The locked contents of a playfield.
///
/// A fixed `ROWS`×`COLS` grid; row 0 is the top. Only the visible area is stored, so
/// every addressable cell lies in `[0, ROWS) × [0, COLS)`. Pieces may extend above row 0
/// while spawning; those cells are never checked or written.
///
/// # Example
///
/// ```
/// use duotris_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::EMPTY;
/// let piece = Piece::spawn(PieceKind::O).simulate_drop_position(&board);
/// board.fill_piece(piece);
/// assert_eq!(board.clear_lines(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for block in row {
                write!(f, "{}", block.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    pub const WIDTH: usize = COLS;
    pub const HEIGHT: usize = ROWS;

    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; ROWS],
    };

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Block; COLS]> {
        self.rows.iter().map(|row| &row.cells)
    }

    /// Returns the cell at column `x`, row `y`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Block> {
        let x = usize::try_from(x).ok().filter(|x| *x < COLS)?;
        let y = usize::try_from(y).ok().filter(|y| *y < ROWS)?;
        Some(self.rows[y].cells[x])
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        !self.rows[y].cells[x].is_empty()
    }

    /// Checks whether `piece` overlaps a wall, the floor, or a locked cell.
    ///
    /// Cells above row 0 only have to be within the side walls.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        piece.occupied_positions().any(|(x, y)| {
            let Ok(col) = usize::try_from(x) else {
                return true;
            };
            if col >= COLS {
                return true;
            }
            let Ok(row) = usize::try_from(y) else {
                return false;
            };
            row >= ROWS || !self.rows[row].cells[col].is_empty()
        })
    }

    /// Returns `true` if `kind` fits at `(x, y)` in `rotation`.
    #[must_use]
    pub fn can_place(&self, kind: PieceKind, x: i32, y: i32, rotation: PieceRotation) -> bool {
        !self.is_colliding(Piece::with_placement(
            kind,
            rotation,
            PiecePosition::new(x, y),
        ))
    }

    /// Merges the piece's cells into the board.
    ///
    /// Cells above row 0 are dropped.
    pub fn fill_piece(&mut self, piece: Piece) {
        for (x, y) in piece.occupied_positions() {
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
                && x < COLS
                && y < ROWS
            {
                self.rows[y].cells[x] = Block::Piece(piece.kind());
            }
        }
    }

    /// Fills a single cell.
    pub fn fill_block_at(&mut self, x: usize, y: usize, block: Block) {
        self.rows[y].cells[x] = block;
    }

    /// Number of rows that are completely filled.
    #[must_use]
    pub fn count_filled_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.is_filled()).count()
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Remaining rows keep their relative order and settle to the bottom; the same
    /// number of empty rows appear at the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..ROWS).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(BoardRow::EMPTY);
        count
    }

    /// Pushes one garbage row in from the bottom.
    ///
    /// Everything moves up a row and the top row is discarded. The new bottom row is
    /// garbage except for column `hole`.
    pub fn push_garbage_row(&mut self, hole: usize) {
        assert!(hole < COLS, "garbage hole {hole} outside the board");
        self.rows.rotate_left(1);
        self.rows[ROWS - 1] = BoardRow::garbage(hole);
    }

    /// Creates a `Board` from ASCII art for tests and tools.
    ///
    /// Each line is one row of exactly `COLS` cells: `.` is empty, `#` is garbage, and a
    /// piece letter is a locked cell of that kind. The art is aligned to the bottom of the
    /// board, so a short drawing describes the bottom rows.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::EMPTY;
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(
            lines.len() <= ROWS,
            "Board art has {} rows, at most {ROWS} allowed",
            lines.len()
        );

        let top = ROWS - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let blocks: Vec<Block> = line
                .chars()
                .map(|c| {
                    Block::from_char(c).unwrap_or_else(|| panic!("invalid board character {c:?}"))
                })
                .collect();
            assert_eq!(
                blocks.len(),
                COLS,
                "Each row must have exactly {COLS} cells, got {} at row {i}",
                blocks.len(),
            );
            for (x, block) in blocks.into_iter().enumerate() {
                board.rows[top + i].cells[x] = block;
            }
        }
        board
    }
}
