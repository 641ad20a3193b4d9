pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("holding queue is full")]
pub struct QueueFullError {
    /// The tile that was refused, handed back to the caller.
    #[error(not(source))]
    pub tile: Tile,
}

/// Reasons a move is refused by [`GameSession`].
///
/// A refused move never changes the session state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum MoveError {
    #[display("session is already over")]
    SessionOver,
    #[display("another move is still in flight")]
    Busy,
    #[display("holding queue cannot accept another tile")]
    QueueFull,
    #[display("cell {_0} is empty or outside the grid")]
    InvalidCell(#[error(not(source))] Position),
    #[display("move {_0} is not the one in flight")]
    UnknownMove(#[error(not(source))] TileId),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SettingsError {
    #[display("board dimensions must be non-zero (got {width}x{height})")]
    EmptyBoard { width: usize, height: usize },
    #[display("normal kind count must be between 1 and {max} (got {count})")]
    NormalKinds { count: usize, max: usize },
    #[display("board of {width}x{height} cells exceeds the limit of {max} cells")]
    BoardTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
}
