/*!
# Leuchtris Engine

`leuchtris_engine` is the game-state core of a falling-block puzzle game.
It owns piece movement, rotation and collision rules, row clearing and
scoring, and the session state machine — everything short of real time and
real I/O. A frontend drives it by applying [`Command`]s and calling
[`Session::tick`] on a schedule of its choosing, then reads the state back
out to render it (as text, or as an RGB grid via [`compose`]).

# Examples

```
use leuchtris_engine::{Command, Phase, Ruleset, Session};

// A session seeded with 42 always deals the same pieces.
let mut session = Session::new(Ruleset::default(), Some(42));

// Player input is applied through commands...
session.handle(Command::MoveLeft);

// ...while gravity advances one step per tick.
session.tick();
assert_eq!(*session.phase(), Phase::Running);

// Frontends read state to render it.
let _score = session.field().score();
```
*/

#![warn(missing_docs)]

mod field;
mod frame;
mod piece;
mod session;

use rand_chacha::ChaCha12Rng;

pub use field::Field;
pub use frame::{compose, PixelFrame, FRAME_HEIGHT, FRAME_WIDTH};
pub use piece::Piece;
pub use session::{Command, Phase, Session};

/// An sRGB color triple, as consumed by the lighthouse display.
pub type Rgb = [u8; 3];
/// A single block coordinate on the playing grid, `(x, y)` with `y`
/// growing downwards and `(0, 0)` in the top-left.
pub type Cell = (i32, i32);
/// A translation that can be applied to a [`Cell`].
pub type Offset = (i32, i32);
/// The internal PRNG used by a session.
pub type GameRng = ChaCha12Rng;

/// Represents one of the seven "Tetrominos";
///
/// A *tetromino* is a two-dimensional, geometric shape made by
/// connecting four squares (orthogonally / along the edges).
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    /// 'T'-Tetromino; `▄█▄`.
    T = 0,
    /// 'O'-Tetromino; `██`.
    O,
    /// 'J'-Tetromino; `█▄▄`.
    J,
    /// 'L'-Tetromino; `▄▄█`.
    L,
    /// 'S'-Tetromino; `▄█▀`.
    S,
    /// 'Z'-Tetromino; `▀█▄`.
    Z,
    /// 'I'-Tetromino; `▄▄▄▄`.
    I,
}

impl ShapeKind {
    /// All `ShapeKind` enum variants in order.
    ///
    /// Note that `ShapeKind::VARIANTS[k as usize] == k` always holds.
    pub const VARIANTS: [Self; 7] = {
        use ShapeKind::*;
        [T, O, J, L, S, Z, I]
    };
}

/// The direction of a single-step piece translation.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// One unit towards the floor.
    Down,
    /// One unit towards the left wall.
    Left,
    /// One unit towards the right wall.
    Right,
}

impl Direction {
    /// The unit vector of this direction.
    pub const fn offset(&self) -> Offset {
        match self {
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Immutable gameplay parameters fixed at session startup: grid
/// dimensions, spawn column, color palette and the shape catalog.
///
/// A `Ruleset` is constructed once (normally via [`Ruleset::default`]) and
/// handed to [`Session::new`]; nothing in it changes during play.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ruleset {
    /// Number of playable columns.
    pub grid_width: i32,
    /// Number of playable rows.
    pub grid_height: i32,
    /// Horizontal offset applied to catalog cells at spawn.
    pub spawn_offset: i32,
    /// The fixed seven-color block palette.
    pub palette: [Rgb; 7],
    /// Canonical cell offsets of each shape, indexed by [`ShapeKind`].
    shapes: [[Cell; 4]; 7],
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 14,
            spawn_offset: 4,
            palette: [
                [239, 86, 91],  // red
                [220, 55, 186], // pink
                [31, 74, 202],  // dark blue
                [232, 128, 65], // orange
                [215, 231, 81], // yellow
                [82, 215, 232], // light blue
                [76, 237, 79],  // green
            ],
            shapes: [
                [(0, 0), (1, 0), (2, 0), (1, 1)], // T
                [(0, 0), (0, 1), (1, 0), (1, 1)], // O
                [(1, 0), (1, 1), (1, 2), (0, 2)], // J
                [(0, 0), (0, 1), (0, 2), (1, 2)], // L
                [(1, 0), (2, 0), (0, 1), (1, 1)], // S
                [(0, 0), (1, 0), (1, 1), (2, 1)], // Z
                [(0, 0), (0, 1), (0, 2), (0, 3)], // I
            ],
        }
    }
}

impl Ruleset {
    /// Returns the canonical (un-spawned) cells of the given shape.
    pub const fn shape_cells(&self, kind: ShapeKind) -> [Cell; 4] {
        self.shapes[kind as usize]
    }
}
