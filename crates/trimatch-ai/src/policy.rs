//! Cell selection for automated play.
//!
//! A [`DecisionPolicy`] looks at the holding queue and the grid and picks the
//! next cell to move. It plays toward one of two opposed [`Objective`]s:
//!
//! - [`Objective::MaximizeWin`] completes held pairs first, then held
//!   singletons, then starts on the most common kind on the grid.
//! - [`Objective::MaximizeLoss`] avoids every kind already held, so the queue
//!   fills with distinct kinds and overflows.
//!
//! Decisions are pure functions of the queue, the grid and the random source.
//! The random source is only consulted when the loss objective has no
//! unheld kind left to pick.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use trimatch_ai::policy::{DecisionPolicy, Objective};
//! use trimatch_engine::{Grid, HoldingQueue, Position};
//!
//! let grid = Grid::from_rows(&["121", "322"]).unwrap();
//! let queue = HoldingQueue::new();
//! let mut rng = Pcg32::seed_from_u64(0);
//!
//! let policy = DecisionPolicy::new(Objective::MaximizeWin);
//! // Nothing held yet: start on the most common kind ('2', first seen at (0, 1)).
//! assert_eq!(policy.select_cell(&queue, &grid, &mut rng), Some(Position::new(0, 1)));
//! ```

use rand::{RngCore, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};
use trimatch_engine::{GridSnapshot, HoldingQueue, Position};

use crate::view::{GridGroups, HeldCounts};

/// What automated play is steering toward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Objective {
    MaximizeWin,
    MaximizeLoss,
}

impl Objective {
    pub const ALL: [Self; 2] = [Self::MaximizeWin, Self::MaximizeLoss];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPolicy {
    objective: Objective,
}

impl DecisionPolicy {
    #[must_use]
    pub const fn new(objective: Objective) -> Self {
        Self { objective }
    }

    #[must_use]
    pub const fn objective(&self) -> Objective {
        self.objective
    }

    /// Picks the next cell to move into the queue.
    ///
    /// Returns `None` if the grid has no tiles.
    pub fn select_cell<G>(
        &self,
        queue: &HoldingQueue,
        grid: &G,
        rng: &mut dyn RngCore,
    ) -> Option<Position>
    where
        G: GridSnapshot,
    {
        let held = HeldCounts::from_queue(queue);
        let groups = GridGroups::from_grid(grid);
        let selected = match self.objective {
            Objective::MaximizeWin => select_for_win(&held, &groups, grid),
            Objective::MaximizeLoss => select_for_loss(&held, &groups, grid, rng),
        };
        log::debug!("{} selected {selected:?}", self.objective);
        selected
    }
}

fn select_for_win<G>(held: &HeldCounts, groups: &GridGroups, grid: &G) -> Option<Position>
where
    G: GridSnapshot,
{
    // A held pair, then a held singleton, that can be topped up from the grid.
    for count in [2, 1] {
        if let Some(cell) = held.with_count(count).find_map(|kind| groups.first_cell(kind)) {
            return Some(cell);
        }
    }
    if let Some((_, cells)) = groups.most_common() {
        return cells.first().copied();
    }
    grid.occupied_cells().next().map(|(position, _)| position)
}

fn select_for_loss<G>(
    held: &HeldCounts,
    groups: &GridGroups,
    grid: &G,
    rng: &mut dyn RngCore,
) -> Option<Position>
where
    G: GridSnapshot,
{
    // Kinds held once or twice; taking one of them could complete a match.
    let avoided = |kind| matches!(held.count(kind), 1 | 2);

    if let Some((position, _)) = grid
        .occupied_cells()
        .find(|(_, tile)| !avoided(tile.kind()))
    {
        return Some(position);
    }
    if let Some((_, cells)) = groups.least_common(|kind| !avoided(kind)) {
        return cells.first().copied();
    }

    let cells: Vec<Position> = grid.occupied_cells().map(|(position, _)| position).collect();
    cells.choose(rng).copied()
}
