use std::{cell::OnceCell, iter};

use duotris_engine::{Board, COLS, ROWS};

/// Lazily computed surface metrics of a board.
///
/// Column height counts from the floor up to the topmost occupied cell, so an empty
/// column has height 0 and a column filled to the top has height [`ROWS`]. A hole is an
/// empty cell with at least one occupied cell above it in the same column.
#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    column_heights: OnceCell<[u8; COLS]>,
    column_occupied_cells: OnceCell<[u8; COLS]>,
    aggregate_height: OnceCell<u32>,
    num_holes: OnceCell<u32>,
    bumpiness: OnceCell<u32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self {
            board: board.clone(),
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
            aggregate_height: OnceCell::new(),
            num_holes: OnceCell::new(),
            bumpiness: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn column_heights(&self) -> &[u8; COLS] {
        self.column_heights.get_or_init(|| {
            let mut column_heights = [0; COLS];
            for (x, h) in column_heights.iter_mut().enumerate() {
                let top = (0..ROWS).find(|&y| self.board.is_occupied(x, y));
                if let Some(top) = top {
                    *h = u8::try_from(ROWS - top).unwrap_or(u8::MAX);
                }
            }
            column_heights
        })
    }

    #[must_use]
    pub fn column_occupied_cells(&self) -> &[u8; COLS] {
        self.column_occupied_cells.get_or_init(|| {
            let mut column_occupied_cells = [0; COLS];
            for (x, o) in column_occupied_cells.iter_mut().enumerate() {
                for y in 0..ROWS {
                    if self.board.is_occupied(x, y) {
                        *o += 1;
                    }
                }
            }
            column_occupied_cells
        })
    }

    #[must_use]
    pub fn max_height(&self) -> u8 {
        self.column_heights().iter().copied().max().unwrap_or(0)
    }

    /// Sum of all column heights.
    #[must_use]
    pub fn aggregate_height(&self) -> u32 {
        *self
            .aggregate_height
            .get_or_init(|| self.column_heights().iter().copied().map(u32::from).sum())
    }

    #[must_use]
    pub fn num_holes(&self) -> u32 {
        *self.num_holes.get_or_init(|| {
            iter::zip(self.column_heights(), self.column_occupied_cells())
                .map(|(h, occ)| u32::from(h - occ))
                .sum()
        })
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> u32 {
        *self.bumpiness.get_or_init(|| {
            self.column_heights()
                .windows(2)
                .map(|w| u32::from(w[0].abs_diff(w[1])))
                .sum()
        })
    }
}
