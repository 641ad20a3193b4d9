//! Per-decision summaries of the queue and the grid.
//!
//! Both views are rebuilt from scratch for every decision and keep kinds in
//! the order they were first seen, which is what the policy's tie-breaks rely
//! on.

use arrayvec::ArrayVec;
use trimatch_engine::{GridSnapshot, HoldingQueue, Position, QUEUE_CAPACITY, TileKind};

/// How many tiles of each kind the queue holds, in first-arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldCounts {
    entries: ArrayVec<(TileKind, usize), QUEUE_CAPACITY>,
}

impl HeldCounts {
    #[must_use]
    pub fn from_queue(queue: &HoldingQueue) -> Self {
        let mut entries: ArrayVec<(TileKind, usize), QUEUE_CAPACITY> = ArrayVec::new();
        for tile in queue.iter() {
            match entries.iter_mut().find(|(kind, _)| *kind == tile.kind()) {
                Some((_, count)) => *count += 1,
                None => entries.push((tile.kind(), 1)),
            }
        }
        Self { entries }
    }

    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.entries
            .iter()
            .find_map(|(k, count)| (*k == kind).then_some(*count))
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileKind, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Held kinds whose count is exactly `count`, in first-arrival order.
    pub fn with_count(&self, count: usize) -> impl Iterator<Item = TileKind> + '_ {
        self.iter()
            .filter(move |(_, c)| *c == count)
            .map(|(kind, _)| kind)
    }
}

/// Grid cells grouped by kind.
///
/// Groups are ordered by the first cell of each kind in scan order, and each
/// group lists its cells in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridGroups {
    groups: ArrayVec<(TileKind, Vec<Position>), { TileKind::LEN }>,
}

impl GridGroups {
    #[must_use]
    pub fn from_grid<G>(grid: &G) -> Self
    where
        G: GridSnapshot,
    {
        let mut groups: ArrayVec<(TileKind, Vec<Position>), { TileKind::LEN }> = ArrayVec::new();
        for (position, tile) in grid.occupied_cells() {
            match groups.iter_mut().find(|(kind, _)| *kind == tile.kind()) {
                Some((_, cells)) => cells.push(position),
                None => groups.push((tile.kind(), vec![position])),
            }
        }
        Self { groups }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileKind, &[Position])> {
        self.groups
            .iter()
            .map(|(kind, cells)| (*kind, cells.as_slice()))
    }

    /// First cell holding `kind`, or `None` if the kind is not on the grid.
    #[must_use]
    pub fn first_cell(&self, kind: TileKind) -> Option<Position> {
        self.groups
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, cells)| cells.first().copied())
    }

    /// Largest group; the earliest one wins a tie.
    #[must_use]
    pub fn most_common(&self) -> Option<(TileKind, &[Position])> {
        self.select(|_| true, |candidate, best| candidate > best)
    }

    /// Smallest group among the kinds accepted by `filter`; the earliest one
    /// wins a tie.
    pub fn least_common<F>(&self, filter: F) -> Option<(TileKind, &[Position])>
    where
        F: FnMut(TileKind) -> bool,
    {
        self.select(filter, |candidate, best| candidate < best)
    }

    fn select<F, B>(&self, mut filter: F, better: B) -> Option<(TileKind, &[Position])>
    where
        F: FnMut(TileKind) -> bool,
        B: Fn(usize, usize) -> bool,
    {
        let mut best: Option<(TileKind, &[Position])> = None;
        for (kind, cells) in self.iter().filter(|(kind, _)| filter(*kind)) {
            if best.is_none_or(|(_, b)| better(cells.len(), b.len())) {
                best = Some((kind, cells));
            }
        }
        best
    }
}
