use std::fmt::Write as _;

use trimatch_engine::{GameSession, Position, QUEUE_CAPACITY};

/// Text view of a session: the grid with row and column numbers, then the
/// holding queue.
///
/// ```text
///     0 1 2
///  0  1 2 .
///  1  . 1 2
///
/// queue [1 _ _ _ _] (1/5)
/// ```
pub fn render_session(session: &GameSession) -> String {
    let grid = session.grid();
    let mut out = String::new();

    out.push_str("   ");
    for col in 0..grid.width() {
        write!(out, " {col}").unwrap();
    }
    out.push('\n');

    for row in 0..grid.height() {
        write!(out, "{row:>2} ").unwrap();
        for col in 0..grid.width() {
            let ch = grid
                .get(Position::new(row, col))
                .map_or('.', |tile| tile.kind().as_char());
            write!(out, " {ch}").unwrap();
        }
        out.push('\n');
    }

    write!(
        out,
        "\nqueue {} ({}/{QUEUE_CAPACITY})",
        session.queue(),
        session.queue().len()
    )
    .unwrap();
    out
}
