use std::fmt;

use arrayvec::ArrayVec;

use crate::{
    QueueFullError,
    core::{
        events::{ListenerId, Listeners},
        tile::{Tile, TileId, TileKind},
    },
};

/// Number of slots in the holding queue.
pub const QUEUE_CAPACITY: usize = 5;

/// Number of same-kind tiles removed by one match.
pub const MATCH_SIZE: usize = 3;

/// Index of a queue slot, used by the presentation layer as a fixed anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub struct SlotAnchor(usize);

impl SlotAnchor {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Result of adding a tile to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum AddResult {
    /// A match was found and this many tiles were removed.
    Cleared(usize),
    /// No match; the queue still has free slots.
    Pending,
    /// No match and every slot is taken.
    Overflow,
}

/// Events emitted synchronously by [`HoldingQueue::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum QueueEvent {
    MatchCleared { count: usize },
    Overflow,
}

/// Bounded, left-compacted sequence of tiles waiting to be matched.
///
/// # Matching
///
/// After every add, held tiles are grouped by kind (groups ordered by the
/// first arrival of each kind). Among groups with at least [`MATCH_SIZE`]
/// tiles, the largest wins, ties going to the earlier group. The first
/// [`MATCH_SIZE`] tiles of that group, in arrival order, are removed; the rest
/// stay. Position in the queue does not matter: `[1, 2, 1]` plus another `1`
/// clears all three `1`s and leaves `[2]`.
///
/// # Example
///
/// ```
/// use trimatch_engine::{AddResult, HoldingQueue, NormalKind, Tile, TileId, TileKind};
///
/// let red = TileKind::Normal(NormalKind::One);
/// let blue = TileKind::Normal(NormalKind::Two);
/// let mut queue = HoldingQueue::new();
///
/// let results: Vec<_> = [red, blue, red, red]
///     .into_iter()
///     .enumerate()
///     .map(|(i, kind)| queue.add(Tile::new(TileId::new(i as u32), kind)).unwrap())
///     .collect();
///
/// assert_eq!(
///     results,
///     [AddResult::Pending, AddResult::Pending, AddResult::Pending, AddResult::Cleared(3)]
/// );
/// assert_eq!(queue.len(), 1);
/// assert_eq!(queue.get(0).unwrap().kind(), blue);
/// ```
#[derive(Debug, Default)]
pub struct HoldingQueue {
    tiles: ArrayVec<Tile, QUEUE_CAPACITY>,
    listeners: Listeners<QueueEvent>,
}

impl HoldingQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn can_accept(&self) -> bool {
        !self.tiles.is_full()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Returns the tile at slot `index`, or `None` past the last held tile.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Held tiles paired with the slot each one currently occupies.
    pub fn slots(&self) -> impl Iterator<Item = (SlotAnchor, &Tile)> {
        self.tiles.iter().enumerate().map(|(i, t)| (SlotAnchor(i), t))
    }

    /// Slot the next added tile will land in, if any is free.
    #[must_use]
    pub fn next_slot(&self) -> Option<SlotAnchor> {
        self.can_accept().then_some(SlotAnchor(self.tiles.len()))
    }

    /// Appends a tile and resolves matches.
    ///
    /// Listeners receive [`QueueEvent::MatchCleared`] or [`QueueEvent::Overflow`]
    /// before this returns. Adding to a full queue is refused and the tile is
    /// handed back in the error.
    pub fn add(&mut self, tile: Tile) -> Result<AddResult, QueueFullError> {
        if let Err(err) = self.tiles.try_push(tile) {
            return Err(QueueFullError {
                tile: err.element(),
            });
        }

        let result = if let Some(matched) = self.find_match() {
            let kind = self.tiles[matched[0]].kind();
            self.remove_slots(&matched);
            log::debug!("cleared {MATCH_SIZE} tiles of {kind}, {} held", self.len());
            AddResult::Cleared(MATCH_SIZE)
        } else if self.tiles.is_full() {
            AddResult::Overflow
        } else {
            AddResult::Pending
        };

        match result {
            AddResult::Cleared(_) => self.listeners.emit(&QueueEvent::MatchCleared {
                count: MATCH_SIZE,
            }),
            AddResult::Overflow => self.listeners.emit(&QueueEvent::Overflow),
            AddResult::Pending => {}
        }
        Ok(result)
    }

    /// Removes a specific held tile and compacts the rest.
    ///
    /// Returns `None` if no held tile has this id; the queue is left untouched.
    pub fn remove(&mut self, id: TileId) -> Option<Tile> {
        let index = self.tiles.iter().position(|t| t.id() == id)?;
        Some(self.tiles.remove(index))
    }

    /// Discards every held tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&QueueEvent) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Slots of the tiles to clear, in arrival order.
    fn find_match(&self) -> Option<[usize; MATCH_SIZE]> {
        let mut groups: ArrayVec<(TileKind, ArrayVec<usize, QUEUE_CAPACITY>), QUEUE_CAPACITY> =
            ArrayVec::new();
        for (slot, tile) in self.tiles.iter().enumerate() {
            if let Some((_, members)) = groups.iter_mut().find(|(k, _)| *k == tile.kind()) {
                members.push(slot);
            } else {
                groups.push((tile.kind(), ArrayVec::from_iter([slot])));
            }
        }

        // `max_by_key` keeps the last maximum; ties must go to the first group.
        let mut best: Option<&ArrayVec<usize, QUEUE_CAPACITY>> = None;
        for (_, members) in &groups {
            if members.len() >= MATCH_SIZE && best.is_none_or(|b| members.len() > b.len()) {
                best = Some(members);
            }
        }
        let members = best?;
        let mut matched = [0; MATCH_SIZE];
        matched.copy_from_slice(&members[..MATCH_SIZE]);
        Some(matched)
    }

    fn remove_slots(&mut self, slots: &[usize]) {
        let mut slot = 0;
        self.tiles.retain(|_| {
            let keep = !slots.contains(&slot);
            slot += 1;
            keep
        });
    }
}

impl fmt::Display for HoldingQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for slot in 0..QUEUE_CAPACITY {
            if slot > 0 {
                write!(f, " ")?;
            }
            let ch = self.tiles.get(slot).map_or('_', |t| t.kind().as_char());
            write!(f, "{ch}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::core::tile::{BonusKind, NormalKind};

    const RED: TileKind = TileKind::Normal(NormalKind::One);
    const BLUE: TileKind = TileKind::Normal(NormalKind::Two);
    const GREEN: TileKind = TileKind::Normal(NormalKind::Three);
    const BONUS: TileKind = TileKind::Bonus(BonusKind::All);

    struct Fixture {
        queue: HoldingQueue,
        next_id: u32,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                queue: HoldingQueue::new(),
                next_id: 0,
            }
        }

        fn add(&mut self, kind: TileKind) -> AddResult {
            let tile = Tile::new(TileId::new(self.next_id), kind);
            self.next_id += 1;
            self.queue.add(tile).unwrap()
        }

        fn ids(&self) -> Vec<u32> {
            self.queue.iter().map(|t| t.id().raw()).collect()
        }

        fn kinds(&self) -> Vec<TileKind> {
            self.queue.iter().map(Tile::kind).collect()
        }
    }

    #[test]
    fn test_match_ignores_positions_between_members() {
        let mut f = Fixture::new();
        assert_eq!(f.add(RED), AddResult::Pending);
        assert_eq!(f.add(BLUE), AddResult::Pending);
        assert_eq!(f.add(RED), AddResult::Pending);
        assert_eq!(f.kinds(), [RED, BLUE, RED]);
        assert_eq!(f.add(RED), AddResult::Cleared(3));
        assert_eq!(f.kinds(), [BLUE]);
    }

    #[test]
    fn test_remainder_is_left_compacted_in_arrival_order() {
        let mut f = Fixture::new();
        f.add(BLUE); // 0
        f.add(RED); // 1
        f.add(GREEN); // 2
        f.add(RED); // 3
        assert_eq!(f.add(RED), AddResult::Cleared(3)); // 4
        assert_eq!(f.ids(), [0, 2]);
        let slots: Vec<_> = f.queue.slots().map(|(s, t)| (s.index(), t.id().raw())).collect();
        assert_eq!(slots, [(0, 0), (1, 2)]);
        assert_eq!(f.queue.next_slot().map(SlotAnchor::index), Some(2));
    }

    #[test]
    fn test_overflow_when_full_without_match() {
        let mut f = Fixture::new();
        for kind in [RED, BLUE, RED, BLUE] {
            assert_eq!(f.add(kind), AddResult::Pending);
        }
        assert_eq!(f.add(GREEN), AddResult::Overflow);
        assert_eq!(f.queue.len(), QUEUE_CAPACITY);
        assert!(!f.queue.can_accept());
        assert_eq!(f.queue.next_slot(), None);
    }

    #[test]
    fn test_add_to_full_queue_hands_tile_back() {
        let mut f = Fixture::new();
        for kind in [RED, BLUE, GREEN, BONUS, RED] {
            f.add(kind);
        }
        let tile = Tile::new(TileId::new(99), GREEN);
        let err = f.queue.add(tile.clone()).unwrap_err();
        assert_eq!(err.tile, tile);
        assert_eq!(f.queue.len(), QUEUE_CAPACITY);
        assert_eq!(f.ids(), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_match_on_last_slot_is_not_overflow() {
        let mut f = Fixture::new();
        for kind in [RED, BLUE, RED, GREEN] {
            f.add(kind);
        }
        assert_eq!(f.add(RED), AddResult::Cleared(3));
        assert_eq!(f.kinds(), [BLUE, GREEN]);
    }

    #[test]
    fn test_clear_leaves_other_kinds_in_place() {
        let mut f = Fixture::new();
        f.add(RED); // 0
        f.add(RED); // 1
        f.add(BLUE); // 2
        f.add(BLUE); // 3
        assert!(f.queue.remove(TileId::new(3)).is_some());
        assert_eq!(f.add(BLUE), AddResult::Pending); // 4
        assert_eq!(f.add(RED), AddResult::Cleared(3)); // 5
        assert_eq!(f.ids(), [2, 4]);
    }

    #[test]
    fn test_largest_group_wins_then_first_encountered() {
        let red = |i| Tile::new(TileId::new(i), RED);
        let blue = |i| Tile::new(TileId::new(i), BLUE);

        // Five slots cannot hold two groups of three, so drive the selection
        // directly.
        let mut queue = HoldingQueue::new();
        queue.tiles.extend([blue(0), red(1), blue(2), red(3), red(4)]);
        assert_eq!(queue.find_match(), Some([1, 3, 4]));

        let mut queue = HoldingQueue::new();
        queue.tiles.extend([red(0), red(1), red(2), red(3), blue(4)]);
        assert_eq!(queue.find_match(), Some([0, 1, 2]));
    }

    #[test]
    fn test_remove_absent_tile_is_noop() {
        let mut f = Fixture::new();
        f.add(RED);
        f.add(BLUE);
        assert!(f.queue.remove(TileId::new(42)).is_none());
        assert_eq!(f.ids(), [0, 1]);
        assert!(f.queue.get(2).is_none());
        assert!(f.queue.get(usize::MAX).is_none());
    }

    #[test]
    fn test_remove_compacts() {
        let mut f = Fixture::new();
        f.add(RED);
        f.add(BLUE);
        f.add(GREEN);
        let removed = f.queue.remove(TileId::new(1)).unwrap();
        assert_eq!(removed.kind(), BLUE);
        assert_eq!(f.ids(), [0, 2]);
        assert_eq!(f.queue.get(1).unwrap().kind(), GREEN);
    }

    #[test]
    fn test_events_fire_once_per_add() {
        let events = Rc::new(RefCell::new(vec![]));
        let mut f = Fixture::new();
        let id = {
            let events = Rc::clone(&events);
            f.queue.subscribe(move |e| events.borrow_mut().push(*e))
        };

        f.add(RED);
        f.add(RED);
        f.add(RED);
        assert_eq!(*events.borrow(), [QueueEvent::MatchCleared { count: 3 }]);

        for kind in [RED, BLUE, GREEN, BONUS] {
            f.add(kind);
        }
        f.add(BLUE);
        assert_eq!(
            *events.borrow(),
            [QueueEvent::MatchCleared { count: 3 }, QueueEvent::Overflow]
        );

        assert!(f.queue.unsubscribe(id));
    }

    #[test]
    fn test_length_invariant_over_long_sequences() {
        let kinds = [RED, BLUE, GREEN, BONUS];
        let mut f = Fixture::new();
        for step in 0..200_usize {
            if f.queue.can_accept() {
                f.add(kinds[(step * 7 + step / 3) % kinds.len()]);
            } else {
                let victim = f.queue.get(step % QUEUE_CAPACITY).unwrap().id();
                f.queue.remove(victim);
            }
            assert!(f.queue.len() <= QUEUE_CAPACITY);
            assert_eq!(f.queue.iter().count(), f.queue.len());
            // No kind may be left with a full match pending.
            for kind in kinds {
                assert!(f.kinds().iter().filter(|k| **k == kind).count() < MATCH_SIZE);
            }
        }
    }

    #[test]
    fn test_display() {
        let mut f = Fixture::new();
        f.add(RED);
        f.add(BONUS);
        assert_eq!(f.queue.to_string(), "[1 A _ _ _]");
    }
}
