/*!
The playing field: the settled-piece collection and the score/level
bookkeeping for one session.

Settled pieces keep their identity and color across row clears — a clear
rewrites each piece's cells in place and drops pieces that end up empty,
rather than flattening everything into an anonymous grid.
*/

use std::time::Duration;

use tracing::debug;

use crate::{Cell, Piece, Ruleset};

/// The settled-cell collection plus score/level bookkeeping.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    ruleset: Ruleset,
    /// Settled pieces in lock order.
    settled: Vec<Piece>,
    score: u32,
    level: u32,
    lines_since_level_up: u32,
}

impl Field {
    /// Creates an empty field at level 1 with score 0.
    pub fn new(ruleset: Ruleset) -> Self {
        Field {
            ruleset,
            settled: Vec::new(),
            score: 0,
            level: 1,
            lines_since_level_up: 0,
        }
    }

    /// The immutable gameplay parameters this field was created with.
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// The settled pieces, in lock order.
    pub fn settled_pieces(&self) -> &[Piece] {
        &self.settled
    }

    /// Current score. Monotonically non-decreasing.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current level. Starts at 1, monotonically non-decreasing.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Cleared-line progress towards the next level, in `[0, 10)`.
    pub fn lines_since_level_up(&self) -> u32 {
        self.lines_since_level_up
    }

    /// Whether a settled cell occupies the given coordinate.
    pub fn is_settled(&self, cell: Cell) -> bool {
        self.settled.iter().any(|piece| piece.cells.contains(&cell))
    }

    /// Commits a piece to the settled collection. The piece changes role,
    /// not identity: it keeps its cells and color.
    pub fn lock(&mut self, piece: Piece) {
        self.settled.push(piece);
    }

    /// The time one gravity step takes at the current level,
    /// `1/(1 + level·0.1)` seconds.
    pub fn fall_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / (1.0 + f64::from(self.level) * 0.1))
    }

    /// Finds and removes every fully-occupied row, returning how many
    /// were cleared.
    ///
    /// Scoring uses the fixed table 40/100/300/1200 × level for 1/2/3/4
    /// simultaneous rows (more than 4 is unreachable with 4-cell pieces
    /// and clamps to the 4-row bonus). Level-up progress is drained in a
    /// loop, so a single clear event can raise the level more than once.
    ///
    /// Settled shapes are rewritten in place: cells in a cleared row are
    /// dropped, cells above the topmost cleared row shift down by the
    /// cleared count, cells below stay put; pieces left without cells are
    /// removed. Calling this again with no new pieces locked is a no-op.
    pub fn clear_completed_rows(&mut self) -> usize {
        let width = self.ruleset.grid_width;
        let height = self.ruleset.grid_height;

        // Dense occupancy grid over all settled cells.
        let mut grid = vec![vec![false; width as usize]; height as usize];
        for piece in &self.settled {
            for &(x, y) in &piece.cells {
                if (0..width).contains(&x) && (0..height).contains(&y) {
                    grid[y as usize][x as usize] = true;
                }
            }
        }

        let completed: Vec<i32> = (0..height)
            .filter(|&y| grid[y as usize].iter().all(|&occupied| occupied))
            .collect();
        if completed.is_empty() {
            return 0;
        }

        let count = completed.len();
        let bonus = match count {
            1 => 40,
            2 => 100,
            3 => 300,
            _ => 1200,
        };
        self.score += bonus * self.level;

        self.lines_since_level_up += count as u32;
        while self.lines_since_level_up >= 10 {
            self.level += 1;
            self.lines_since_level_up -= 10;
        }

        // Rewrite settled shapes around the cleared rows. Bounding-box
        // extents are left as spawned; only active/next pieces' extents
        // are ever read.
        let topmost = completed[0];
        let shift = count as i32;
        for piece in &mut self.settled {
            piece.cells = piece
                .cells
                .iter()
                .filter_map(|&(x, y)| {
                    if y < topmost {
                        Some((x, y + shift))
                    } else if completed.contains(&y) {
                        None
                    } else {
                        Some((x, y))
                    }
                })
                .collect();
        }
        self.settled.retain(|piece| !piece.cells.is_empty());

        debug!(rows = count, score = self.score, level = self.level, "rows cleared");
        count
    }
}
