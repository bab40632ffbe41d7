use serde::Serialize;

/// Score values for line clears, indexed by the number of lines cleared by one lock.
pub const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Score, line, and piece counters for one session.
///
/// The level is derived from the cleared lines: it starts at 1 and goes up by one every
/// `lines_per_level` lines. A `lines_per_level` of zero is treated as one.
///
/// # Example
///
/// ```
/// use duotris_engine::GameStats;
///
/// let mut stats = GameStats::new(10);
/// assert_eq!(stats.complete_piece_drop(4), 800);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// assert_eq!(stats.level(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    #[serde(skip)]
    lines_per_level: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(10)
    }
}

impl GameStats {
    #[must_use]
    pub const fn new(lines_per_level: usize) -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            lines_per_level: if lines_per_level == 0 {
                1
            } else {
                lines_per_level
            },
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / self.lines_per_level + 1
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by the number of lines they cleared (0 to 4).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records one lock and returns the points it scored.
    pub const fn complete_piece_drop(&mut self, cleared_lines: usize) -> usize {
        let gained = if cleared_lines < SCORE_TABLE.len() {
            self.line_cleared_counter[cleared_lines] += 1;
            SCORE_TABLE[cleared_lines]
        } else {
            0
        };
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        self.score += gained;
        gained
    }
}
