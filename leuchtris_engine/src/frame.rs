/*!
Presentation adapter: flattens field + pieces into the fixed-size RGB grid
consumed by the lighthouse display (and any other pixel sink).

Purely derived data — composing a frame never mutates game state, and the
decorative border animation depends only on the frame counter.
*/

use crate::{Field, Piece, Rgb};

/// Width of the composed pixel grid (the display's window columns).
pub const FRAME_WIDTH: usize = 28;
/// Height of the composed pixel grid (equal to the playfield height).
pub const FRAME_HEIGHT: usize = 14;

/// One full display frame, rows of RGB triples, `[y][x]`-indexed.
pub type PixelFrame = [[Rgb; FRAME_WIDTH]; FRAME_HEIGHT];

/// Composes a display frame from the current game state.
///
/// Settled and active cells are painted their stored color into the
/// playfield region. The two columns right of the playfield cycle through
/// a rainbow (per-channel phase-shifted sine over the frame counter),
/// independent of game state. The next piece is drawn centered in the
/// reserved right-hand region, never overlapping the playfield.
pub fn compose(field: &Field, active: &Piece, next: &Piece, frame: u32) -> PixelFrame {
    let mut image: PixelFrame = [[[0, 0, 0]; FRAME_WIDTH]; FRAME_HEIGHT];
    let grid_width = field.ruleset().grid_width;
    let grid_height = field.ruleset().grid_height;

    for piece in field.settled_pieces().iter().chain(std::iter::once(active)) {
        for &(x, y) in &piece.cells {
            if (0..grid_width).contains(&x) && (0..grid_height).contains(&y) {
                image[y as usize][x as usize] = piece.color;
            }
        }
    }

    // Decorative rainbow on the two border columns.
    for x in grid_width..grid_width + 2 {
        for y in 0..grid_height {
            image[y as usize][x as usize] = rainbow(frame.wrapping_add(y as u32) % 256);
        }
    }

    // Next-piece preview, translated to its own centered offset. The
    // bounds guard runs on the untranslated cells, like the rest of the
    // playfield painting.
    let center_x = grid_width + ((FRAME_WIDTH as i32 - grid_width) / 2) - next.width / 2 - 3;
    let center_y = FRAME_HEIGHT as i32 / 2 - next.height / 2 - 1;
    for &(x, y) in &next.cells {
        if (0..grid_width).contains(&x) && (0..grid_height).contains(&y) {
            image[(center_y + y) as usize][(center_x + x - 1) as usize] = next.color;
        }
    }

    image
}

/// One step of the border color cycle: phase-shifted sines per channel.
fn rainbow(t: u32) -> Rgb {
    let t = f64::from(t);
    let channel = |phase: f64| (f64::sin(0.1 * t + phase) * 127.0 + 128.0) as u8;
    [channel(0.0), channel(2.0), channel(4.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Ruleset, ShapeKind};

    fn piece_with(cells: Vec<Cell>, color: Rgb) -> Piece {
        let (width, height) = crate::piece::extents(&cells);
        Piece {
            kind: ShapeKind::O,
            cells,
            color,
            width,
            height,
        }
    }

    #[test]
    fn playfield_cells_carry_their_piece_colors() {
        let mut field = Field::new(Ruleset::default());
        field.lock(piece_with(vec![(0, 13), (1, 13)], [10, 20, 30]));
        let active = piece_with(vec![(4, 0), (5, 0)], [40, 50, 60]);
        let next = piece_with(vec![(4, 0), (5, 0)], [70, 80, 90]);
        let image = compose(&field, &active, &next, 0);
        assert_eq!(image[13][0], [10, 20, 30]);
        assert_eq!(image[13][1], [10, 20, 30]);
        assert_eq!(image[0][4], [40, 50, 60]);
        assert_eq!(image[13][5], [0, 0, 0]);
    }

    #[test]
    fn border_columns_animate_independently_of_state() {
        let field = Field::new(Ruleset::default());
        let active = piece_with(vec![(4, 0)], [1, 1, 1]);
        let next = piece_with(vec![(4, 0)], [1, 1, 1]);
        let a = compose(&field, &active, &next, 0);
        let b = compose(&field, &active, &next, 77);
        for y in 0..FRAME_HEIGHT {
            for x in 10..12 {
                assert_ne!(a[y][x], [0, 0, 0]);
            }
        }
        assert_ne!(a[0][10], b[0][10]);
    }

    #[test]
    fn preview_lands_in_the_reserved_region() {
        let field = Field::new(Ruleset::default());
        let active = piece_with(vec![(4, 13)], [1, 1, 1]);
        // An O-piece as dealt: catalog cells offset to the spawn column.
        let next = piece_with(vec![(4, 0), (4, 1), (5, 0), (5, 1)], [200, 100, 50]);
        let image = compose(&field, &active, &next, 0);
        let preview_cells: Vec<(usize, usize)> = (0..FRAME_HEIGHT)
            .flat_map(|y| (0..FRAME_WIDTH).map(move |x| (x, y)))
            .filter(|&(x, y)| image[y][x] == [200, 100, 50])
            .collect();
        assert_eq!(preview_cells.len(), 4);
        // Strictly right of playfield and rainbow columns.
        assert!(preview_cells.iter().all(|&(x, _)| x >= 12));
    }

    #[test]
    fn preview_matches_reference_centering() {
        let field = Field::new(Ruleset::default());
        let active = piece_with(vec![(4, 13)], [1, 1, 1]);
        // width/height extents of a dealt O are (1, 1), so the centered
        // origin is (16 − 0 − 1, 7 − 0 − 1) + the cells' own (4, 0) base.
        let next = piece_with(vec![(4, 0), (4, 1), (5, 0), (5, 1)], [200, 100, 50]);
        let image = compose(&field, &active, &next, 0);
        assert_eq!(image[6][19], [200, 100, 50]);
        assert_eq!(image[7][19], [200, 100, 50]);
        assert_eq!(image[6][20], [200, 100, 50]);
        assert_eq!(image[7][20], [200, 100, 50]);
    }
}
