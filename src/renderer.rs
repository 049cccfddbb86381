//! Text rendering of the game onto the terminal: bordered playfield,
//! side panel, and the fixed instruction / game-over screens.
//!
//! Everything is queued onto the terminal handle and flushed once per
//! call, so a frame appears atomically.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};

use leuchtris_engine::{Phase, Rgb, Session};

const BORDER_GLYPH: &str = "□";
const BLOCK_GLYPH: &str = "■";

fn block_color([r, g, b]: Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// Draws the playfield, the active piece, and the side panel.
pub fn draw_game(term: &mut impl Write, session: &Session) -> io::Result<()> {
    let field = session.field();
    let grid_width = field.ruleset().grid_width;
    let grid_height = field.ruleset().grid_height;

    term.queue(MoveTo(0, 0))?.queue(Clear(ClearType::All))?;

    // Border around the playfield; cells are two columns wide.
    term.queue(SetForegroundColor(Color::Cyan))?;
    for y in 0..grid_height + 2 {
        for x in 0..grid_width + 2 {
            if y == 0 || y == grid_height + 1 || x == 0 || x == grid_width + 1 {
                term.queue(MoveTo((x * 2) as u16, y as u16))?
                    .queue(Print(BORDER_GLYPH))?;
            }
        }
    }

    // Settled pieces, then the active piece on top.
    for piece in field
        .settled_pieces()
        .iter()
        .chain(std::iter::once(session.active_piece()))
    {
        term.queue(SetForegroundColor(block_color(piece.color)))?;
        for &(x, y) in &piece.cells {
            if (0..grid_width).contains(&x) && (0..grid_height).contains(&y) {
                term.queue(MoveTo(((x + 1) * 2) as u16, (y + 1) as u16))?
                    .queue(Print(BLOCK_GLYPH))?;
            }
        }
    }

    // Side panel.
    let panel_col = ((grid_width + 2) * 2 + 3) as u16;
    term.queue(ResetColor)?
        .queue(MoveTo(panel_col, 0))?
        .queue(Print("Next Tetromino:"))?;
    let next = session.next_piece();
    term.queue(SetForegroundColor(block_color(next.color)))?;
    for &(x, y) in &next.cells {
        term.queue(MoveTo(panel_col + (x * 2) as u16, (y + 2) as u16))?
            .queue(Print(BLOCK_GLYPH))?;
    }

    term.queue(ResetColor)?
        .queue(MoveTo(panel_col, 10))?
        .queue(Print(format!("Score: {}", field.score())))?
        .queue(MoveTo(panel_col, 11))?
        .queue(Print(format!("Level: {}", field.level())))?;
    if *session.phase() == Phase::Paused {
        term.queue(MoveTo(panel_col, 13))?
            .queue(Print("Paused ['P' resumes]"))?;
    }

    term.flush()
}

/// Draws the welcome/instructions screen shown before the first session.
pub fn draw_instructions(term: &mut impl Write) -> io::Result<()> {
    let instructions = [
        "Welcome to Leuchtris!",
        "The goal of the game is to clear as many rows as possible.",
        "You can clear a row by filling it completely with tetrominos.",
        "The game is over when a tetromino reaches the top of the grid.",
        "The game gets faster as you clear more rows.",
        "",
        "==============================================================",
        "",
        "Use the arrow keys to move the tetromino.",
        "Use the up arrow key to rotate the tetromino.",
        "Press 'P' to pause the game.",
        "Press 'R' to restart the game.",
        "Press 'Q' to quit the game.",
        "",
        "Press any key to start the game...",
    ];
    draw_text_screen(term, &instructions)
}

/// Draws the fixed game-over screen.
pub fn draw_game_over(term: &mut impl Write, score: u32, level: u32) -> io::Result<()> {
    let score_line = format!("Final score: {score} (level {level})");
    let game_over = [
        "Game Over!",
        score_line.as_str(),
        "",
        "Press 'R' to restart the game.",
        "Press 'Q' to quit the game.",
    ];
    draw_text_screen(term, &game_over)
}

fn draw_text_screen(term: &mut impl Write, lines: &[&str]) -> io::Result<()> {
    term.queue(MoveTo(0, 0))?
        .queue(Clear(ClearType::All))?
        .queue(ResetColor)?;
    for (row, line) in lines.iter().enumerate() {
        term.queue(MoveTo(4, (row + 1) as u16))?.queue(Print(line))?;
    }
    term.flush()
}
