/*!
Movement, rotation and collision logic of a single falling tetromino.

A [`Piece`] stores its cells in *absolute* grid coordinates, so every query
and mutation works directly against the playing grid; there is no separate
piece-local frame. Collision queries take the [`Field`] they are checked
against — a piece does not hold a reference to the field it falls in.
*/

use rand::Rng;
use tracing::debug;

use crate::{Cell, Direction, Field, GameRng, Rgb, Ruleset, ShapeKind};

/// A falling (or settled) tetromino: four grid cells plus a color.
///
/// All mutating operations are validate-then-commit: a move or rotation
/// that would leave the grid or overlap a settled cell leaves the piece
/// untouched. There are no error values for this — an impossible move is
/// a normal, silent event in play.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    /// Which catalog shape this piece was spawned as.
    pub kind: ShapeKind,
    /// Absolute grid cells. Always pairwise distinct; exactly four for an
    /// active piece, possibly fewer for a settled piece after row clears.
    pub cells: Vec<Cell>,
    /// The palette color chosen at spawn, kept for the piece's lifetime.
    pub color: Rgb,
    /// Horizontal bounding-box extent (`max x − min x`).
    pub width: i32,
    /// Vertical bounding-box extent (`max y − min y`).
    pub height: i32,
}

impl Piece {
    /// Spawns a new piece: uniformly random shape and palette color,
    /// translated to the ruleset's spawn column at the top of the grid.
    pub fn spawn(ruleset: &Ruleset, rng: &mut GameRng) -> Self {
        let kind = ShapeKind::VARIANTS[rng.random_range(0..ShapeKind::VARIANTS.len())];
        let color = ruleset.palette[rng.random_range(0..ruleset.palette.len())];
        let cells: Vec<Cell> = ruleset
            .shape_cells(kind)
            .iter()
            .map(|&(x, y)| (x + ruleset.spawn_offset, y))
            .collect();
        let (width, height) = extents(&cells);
        Piece {
            kind,
            cells,
            color,
            width,
            height,
        }
    }

    /// Translates the piece one step in `direction` if nothing blocks it.
    ///
    /// Returns whether the piece actually moved; a blocked move is a
    /// silent no-op.
    pub fn try_move(&mut self, direction: Direction, field: &Field) -> bool {
        let blocked = match direction {
            Direction::Down => self.has_collided_bottom(field),
            Direction::Left => self.has_collided_left(field),
            Direction::Right => self.has_collided_right(field),
        };
        if blocked {
            debug!("cannot move {direction:?}");
            return false;
        }
        let (dx, dy) = direction.offset();
        for cell in &mut self.cells {
            cell.0 += dx;
            cell.1 += dy;
        }
        true
    }

    /// Rotates the piece 90° clockwise about its bounding-box center.
    ///
    /// Each cell `(x, y)` maps to `(cx + (y − cy), cy − (x − cx) + 1)`,
    /// where `(cx, cy)` is the integer bounding-box center. The trailing
    /// `+1` re-offset is part of the game's established rotation feel and
    /// must not be "fixed". The rotation commits only if every resulting
    /// cell is in bounds and free; otherwise the shape stays untouched
    /// (no wall kicks). Width and height swap on success.
    ///
    /// Returns whether the rotation was committed.
    pub fn rotate(&mut self, field: &Field) -> bool {
        let min_x = self.cells.iter().map(|c| c.0).min().unwrap_or(0);
        let max_x = self.cells.iter().map(|c| c.0).max().unwrap_or(0);
        let min_y = self.cells.iter().map(|c| c.1).min().unwrap_or(0);
        let max_y = self.cells.iter().map(|c| c.1).max().unwrap_or(0);
        let center_x = (min_x + max_x) / 2;
        let center_y = (min_y + max_y) / 2;

        let rotated: Vec<Cell> = self
            .cells
            .iter()
            .map(|&(x, y)| (center_x + (y - center_y), center_y - (x - center_x) + 1))
            .collect();

        if !is_valid_position(&rotated, field) {
            debug!("cannot rotate");
            return false;
        }
        self.cells = rotated;
        std::mem::swap(&mut self.width, &mut self.height);
        true
    }

    /// Whether the piece rests on the floor or on a settled cell.
    pub fn has_collided_bottom(&self, field: &Field) -> bool {
        self.cells
            .iter()
            .any(|&(_, y)| y >= field.ruleset().grid_height - 1)
            || self.touches_settled(Direction::Down, field)
    }

    /// Whether the piece touches the left wall or a settled cell to its left.
    pub fn has_collided_left(&self, field: &Field) -> bool {
        self.cells.iter().any(|&(x, _)| x <= 0) || self.touches_settled(Direction::Left, field)
    }

    /// Whether the piece touches the right wall or a settled cell to its right.
    pub fn has_collided_right(&self, field: &Field) -> bool {
        self.cells
            .iter()
            .any(|&(x, _)| x >= field.ruleset().grid_width - 1)
            || self.touches_settled(Direction::Right, field)
    }

    /// Whether any cell, advanced one step in `direction`, coincides with
    /// a settled cell.
    fn touches_settled(&self, direction: Direction, field: &Field) -> bool {
        let (dx, dy) = direction.offset();
        self.cells
            .iter()
            .any(|&(x, y)| field.is_settled((x + dx, y + dy)))
    }
}

/// Whether every cell lies on the grid and coincides with no settled cell.
fn is_valid_position(cells: &[Cell], field: &Field) -> bool {
    let ruleset = field.ruleset();
    cells.iter().all(|&(x, y)| {
        (0..ruleset.grid_width).contains(&x)
            && (0..ruleset.grid_height).contains(&y)
            && !field.is_settled((x, y))
    })
}

/// Bounding-box extents `(max − min)` of a nonempty cell list.
pub(crate) fn extents(cells: &[Cell]) -> (i32, i32) {
    let width = cells.iter().map(|c| c.0).max().unwrap_or(0)
        - cells.iter().map(|c| c.0).min().unwrap_or(0);
    let height = cells.iter().map(|c| c.1).max().unwrap_or(0)
        - cells.iter().map(|c| c.1).min().unwrap_or(0);
    (width, height)
}
