use serde::{Deserialize, Serialize};

/// Counters for one session.
///
/// # Example
///
/// ```
/// use trimatch_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_move(None);
/// stats.complete_move(Some(3));
///
/// assert_eq!(stats.moves(), 2);
/// assert_eq!(stats.matches(), 1);
/// assert_eq!(stats.tiles_cleared(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    moves: usize,
    matches: usize,
    tiles_cleared: usize,
    discarded: usize,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            moves: 0,
            matches: 0,
            tiles_cleared: 0,
            discarded: 0,
        }
    }

    /// Number of tiles moved from the grid into the queue.
    #[must_use]
    pub const fn moves(&self) -> usize {
        self.moves
    }

    /// Number of triples cleared.
    #[must_use]
    pub const fn matches(&self) -> usize {
        self.matches
    }

    #[must_use]
    pub const fn tiles_cleared(&self) -> usize {
        self.tiles_cleared
    }

    /// Number of held tiles removed out of band.
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.discarded
    }

    /// Records a completed move.
    ///
    /// `cleared` is the number of tiles the move cleared, if it made a match.
    pub const fn complete_move(&mut self, cleared: Option<usize>) {
        self.moves += 1;
        if let Some(count) = cleared {
            self.matches += 1;
            self.tiles_cleared += count;
        }
    }

    pub const fn discard(&mut self) {
        self.discarded += 1;
    }
}
