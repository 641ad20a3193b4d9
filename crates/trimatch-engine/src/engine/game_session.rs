use crate::{
    MoveError, QueueFullError, SettingsError,
    core::{
        AddResult, Grid, HoldingQueue, ListenerId, Position, QueueEvent, Seed,
        SlotAnchor, Tile, TileId, TileKind, ViewHandle,
    },
};

use super::{Arbiter, GameSettings, GameStats, Outcome};

/// Ticket for a move that left the grid but has not reached the queue yet.
///
/// Returned by [`GameSession::submit_move`] and consumed by
/// [`GameSession::complete_move`], so each move completes at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending move keeps the session busy until it is completed"]
pub struct PendingMove {
    tile_id: TileId,
    kind: TileKind,
    view: ViewHandle,
    origin: Position,
    slot: SlotAnchor,
}

impl PendingMove {
    #[must_use]
    pub const fn tile_id(&self) -> TileId {
        self.tile_id
    }

    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Presentation object to animate.
    #[must_use]
    pub const fn view(&self) -> ViewHandle {
        self.view
    }

    /// Grid cell the tile was taken from.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Queue slot the tile is heading for.
    #[must_use]
    pub const fn slot(&self) -> SlotAnchor {
        self.slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub add_result: AddResult,
    pub outcome: Outcome,
}

#[derive(Debug)]
struct InFlight {
    tile: Tile,
    origin: Position,
}

/// A single game: grid, holding queue and arbiter, with at most one move in
/// flight at a time.
///
/// Rejected moves never change the session.
#[derive(Debug)]
pub struct GameSession {
    seed: Option<Seed>,
    grid: Grid,
    queue: HoldingQueue,
    arbiter: Arbiter,
    stats: GameStats,
    in_flight: Option<InFlight>,
    torn_down: bool,
}

impl GameSession {
    /// Starts a session on a freshly generated board.
    pub fn new(settings: &GameSettings, seed: Seed) -> Result<Self, SettingsError> {
        let grid = Grid::generate(settings, seed)?;
        let mut session = Self::from_grid(grid);
        session.seed = Some(seed);
        Ok(session)
    }

    /// Starts a session on a prepared board.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        let mut session = Self {
            seed: None,
            grid,
            queue: HoldingQueue::new(),
            arbiter: Arbiter::new(),
            stats: GameStats::new(),
            in_flight: None,
            torn_down: false,
        };
        session.arbiter.check_win(&session.grid, &session.queue);
        session
    }

    /// Seed the board was generated from, if it was generated.
    #[must_use]
    pub const fn seed(&self) -> Option<Seed> {
        self.seed
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn queue(&self) -> &HoldingQueue {
        &self.queue
    }

    #[must_use]
    pub const fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.arbiter.outcome()
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn can_accept_move(&self) -> bool {
        self.check_admission().is_ok()
    }

    /// Takes the tile at `position` off the grid and marks the session busy.
    pub fn submit_move(&mut self, position: Position) -> Result<PendingMove, MoveError> {
        self.check_admission()
            .and_then(|slot| {
                let tile = self
                    .grid
                    .free_cell(position)
                    .ok_or(MoveError::InvalidCell(position))?;
                let pending = PendingMove {
                    tile_id: tile.id(),
                    kind: tile.kind(),
                    view: tile.view(),
                    origin: position,
                    slot,
                };
                log::debug!("move {} {} from {position}", tile.id(), tile.kind());
                self.in_flight = Some(InFlight {
                    tile,
                    origin: position,
                });
                Ok(pending)
            })
            .inspect_err(|e| log::warn!("rejected move at {position}: {e}"))
    }

    /// Delivers the in-flight tile to the queue and lets the arbiter decide.
    ///
    /// Queue listeners, then outcome listeners, fire before this returns.
    pub fn complete_move(&mut self, pending: PendingMove) -> Result<MoveResult, MoveError> {
        let InFlight { tile, origin } = match self.in_flight.take() {
            Some(in_flight) if in_flight.tile.id() == pending.tile_id => in_flight,
            other => {
                self.in_flight = other;
                log::warn!("rejected completion of move {}", pending.tile_id);
                return Err(MoveError::UnknownMove(pending.tile_id));
            }
        };

        let add_result = match self.queue.add(tile) {
            Ok(result) => result,
            Err(QueueFullError { tile }) => {
                // Nothing else adds while a move is in flight, so the slot
                // reserved at submission is still free.
                log::warn!("queue filled up under move {}", tile.id());
                self.in_flight = Some(InFlight { tile, origin });
                return Err(MoveError::QueueFull);
            }
        };

        let cleared = match add_result {
            AddResult::Cleared(count) => Some(count),
            AddResult::Overflow => {
                self.arbiter.on_overflow();
                None
            }
            AddResult::Pending => None,
        };
        self.stats.complete_move(cleared);
        let outcome = self.arbiter.check_win(&self.grid, &self.queue);

        Ok(MoveResult {
            add_result,
            outcome,
        })
    }

    /// Submits and completes a move in one step.
    pub fn play_move(&mut self, position: Position) -> Result<MoveResult, MoveError> {
        let pending = self.submit_move(position)?;
        self.complete_move(pending)
    }

    /// Removes a held tile outside of normal play.
    ///
    /// Returns `false` if no held tile has this id.
    pub fn discard_held(&mut self, tile_id: TileId) -> bool {
        if self.queue.remove(tile_id).is_none() {
            return false;
        }
        self.stats.discard();
        // The in-flight tile is on neither the grid nor the queue.
        if !self.is_busy() {
            self.arbiter.check_win(&self.grid, &self.queue);
        }
        true
    }

    pub fn subscribe_queue<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&QueueEvent) + 'static,
    {
        self.queue.subscribe(callback)
    }

    pub fn unsubscribe_queue(&mut self, id: ListenerId) -> bool {
        self.queue.unsubscribe(id)
    }

    pub fn subscribe_outcome<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&Outcome) + 'static,
    {
        self.arbiter.subscribe(callback)
    }

    pub fn unsubscribe_outcome(&mut self, id: ListenerId) -> bool {
        self.arbiter.unsubscribe(id)
    }

    /// Discards every tile on the grid, in the queue and in flight.
    ///
    /// The outcome is left as it was, and every later move is refused with
    /// [`MoveError::SessionOver`].
    pub fn teardown(&mut self) {
        self.grid.clear();
        self.queue.clear();
        self.in_flight = None;
        self.torn_down = true;
    }

    fn check_admission(&self) -> Result<SlotAnchor, MoveError> {
        if self.torn_down || self.arbiter.outcome().is_terminal() {
            return Err(MoveError::SessionOver);
        }
        if self.is_busy() {
            return Err(MoveError::Busy);
        }
        self.queue.next_slot().ok_or(MoveError::QueueFull)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::core::GridSnapshot as _;

    fn session(rows: &[&str]) -> GameSession {
        GameSession::from_grid(Grid::from_rows(rows).unwrap())
    }

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_clearing_every_tile_wins() {
        let mut s = session(&["112", "122"]);
        let outcomes = Rc::new(RefCell::new(vec![]));
        {
            let outcomes = Rc::clone(&outcomes);
            s.subscribe_outcome(move |o| outcomes.borrow_mut().push(*o));
        }

        for (p, expected) in [
            (pos(0, 0), AddResult::Pending),
            (pos(0, 2), AddResult::Pending),
            (pos(0, 1), AddResult::Pending),
            (pos(1, 0), AddResult::Cleared(3)),
            (pos(1, 1), AddResult::Pending),
        ] {
            let result = s.play_move(p).unwrap();
            assert_eq!(result.add_result, expected);
            assert_eq!(result.outcome, Outcome::Ongoing);
        }
        let last = s.play_move(pos(1, 2)).unwrap();
        assert_eq!(last.add_result, AddResult::Cleared(3));
        assert_eq!(last.outcome, Outcome::Won);
        assert_eq!(*outcomes.borrow(), [Outcome::Won]);

        assert_eq!(s.stats().moves(), 6);
        assert_eq!(s.stats().matches(), 2);
        assert_eq!(s.stats().tiles_cleared(), 6);
        assert_eq!(s.play_move(pos(0, 0)), Err(MoveError::SessionOver));
    }

    #[test]
    fn test_overflow_loses_with_single_event() {
        let mut s = session(&["12345", "6...."]);
        let events = Rc::new(RefCell::new(vec![]));
        {
            let events = Rc::clone(&events);
            s.subscribe_queue(move |e| events.borrow_mut().push(*e));
        }

        for col in 0..4 {
            s.play_move(pos(0, col)).unwrap();
        }
        let result = s.play_move(pos(0, 4)).unwrap();
        assert_eq!(result.add_result, AddResult::Overflow);
        assert_eq!(result.outcome, Outcome::Lost);
        assert_eq!(*events.borrow(), [QueueEvent::Overflow]);

        assert!(!s.can_accept_move());
        assert_eq!(s.submit_move(pos(1, 0)), Err(MoveError::SessionOver));
        assert_eq!(s.grid().occupied_count(), 1);
    }

    #[test]
    fn test_busy_window_refuses_second_move() {
        let mut s = session(&["111"]);
        let pending = s.submit_move(pos(0, 0)).unwrap();
        assert!(s.is_busy());
        assert_eq!(pending.origin(), pos(0, 0));
        assert_eq!(pending.slot().index(), 0);
        assert!(s.grid().get(pos(0, 0)).is_none());
        assert!(s.queue().is_empty());

        assert!(!s.can_accept_move());
        assert_eq!(s.submit_move(pos(0, 1)), Err(MoveError::Busy));
        assert!(s.grid().get(pos(0, 1)).is_some());

        s.complete_move(pending).unwrap();
        assert!(!s.is_busy());
        assert!(s.can_accept_move());
        let next = s.submit_move(pos(0, 1)).unwrap();
        assert_eq!(next.slot().index(), 1);
    }

    #[test]
    fn test_invalid_cells_change_nothing() {
        let mut s = session(&["1.", "11"]);
        assert_eq!(
            s.submit_move(pos(0, 1)),
            Err(MoveError::InvalidCell(pos(0, 1)))
        );
        assert_eq!(
            s.submit_move(pos(5, 0)),
            Err(MoveError::InvalidCell(pos(5, 0)))
        );
        assert!(!s.is_busy());
        assert_eq!(s.grid().occupied_count(), 3);
        assert_eq!(s.stats().moves(), 0);
    }

    #[test]
    fn test_completion_with_foreign_ticket_is_refused() {
        let mut a = session(&["12"]);
        let mut b = session(&["21"]);
        let ticket_a = a.submit_move(pos(0, 0)).unwrap();
        let ticket_b = b.submit_move(pos(0, 1)).unwrap();
        // Both grids number their tiles from zero; #1 is not a's in-flight tile.
        assert_eq!(
            a.complete_move(ticket_b),
            Err(MoveError::UnknownMove(TileId::new(1)))
        );
        assert!(a.is_busy());
        assert!(a.complete_move(ticket_a).is_ok());
        assert!(b.is_busy());
    }

    #[test]
    fn test_discard_held_rechecks_win() {
        let mut s = session(&["12"]);
        s.play_move(pos(0, 0)).unwrap();
        s.play_move(pos(0, 1)).unwrap();
        assert_eq!(s.outcome(), Outcome::Ongoing);

        let held: Vec<_> = s.queue().iter().map(Tile::id).collect();
        assert!(!s.discard_held(TileId::new(99)));
        assert!(s.discard_held(held[0]));
        assert_eq!(s.outcome(), Outcome::Ongoing);
        assert!(s.discard_held(held[1]));
        assert_eq!(s.outcome(), Outcome::Won);
        assert_eq!(s.stats().discarded(), 2);
    }

    #[test]
    fn test_discard_during_move_does_not_win_early() {
        let mut s = session(&["12"]);
        s.play_move(pos(0, 0)).unwrap();
        let pending = s.submit_move(pos(0, 1)).unwrap();
        let held = s.queue().get(0).unwrap().id();
        assert!(s.discard_held(held));
        assert_eq!(s.outcome(), Outcome::Ongoing);

        let result = s.complete_move(pending).unwrap();
        assert_eq!(result.outcome, Outcome::Ongoing);
        let last = s.queue().get(0).unwrap().id();
        assert!(s.discard_held(last));
        assert_eq!(s.outcome(), Outcome::Won);
    }

    #[test]
    fn test_generated_session_remembers_seed() {
        let seed = Seed::from_bytes([3; 16]);
        let settings = GameSettings::default();
        let s = GameSession::new(&settings, seed).unwrap();
        assert_eq!(s.seed(), Some(seed));
        assert_eq!(s.grid().occupied_count(), 36);
        assert_eq!(s.outcome(), Outcome::Ongoing);
        assert!(session(&["12"]).seed().is_none());
    }

    #[test]
    fn test_empty_board_is_won_immediately() {
        let s = session(&["..", ".."]);
        assert_eq!(s.outcome(), Outcome::Won);
    }

    #[test]
    fn test_teardown_discards_tiles() {
        let mut s = session(&["123"]);
        s.play_move(pos(0, 0)).unwrap();
        let _pending = s.submit_move(pos(0, 1)).unwrap();
        s.teardown();
        assert!(s.grid().is_cleared());
        assert!(s.queue().is_empty());
        assert!(!s.is_busy());
    }

    #[test]
    fn test_teardown_refuses_later_moves() {
        let mut s = session(&["123"]);
        s.teardown();
        assert_eq!(s.outcome(), Outcome::Ongoing);
        assert!(!s.can_accept_move());
        assert_eq!(s.submit_move(pos(0, 0)), Err(MoveError::SessionOver));
        assert_eq!(s.stats().moves(), 0);
    }

    #[test]
    fn test_unsubscribed_listeners_hear_nothing_more() {
        let mut s = session(&["111", "222"]);
        let queue_events = Rc::new(RefCell::new(vec![]));
        let outcomes = Rc::new(RefCell::new(vec![]));
        let queue_id = {
            let queue_events = Rc::clone(&queue_events);
            s.subscribe_queue(move |e| queue_events.borrow_mut().push(*e))
        };
        let outcome_id = {
            let outcomes = Rc::clone(&outcomes);
            s.subscribe_outcome(move |o| outcomes.borrow_mut().push(*o))
        };

        for col in 0..3 {
            s.play_move(pos(0, col)).unwrap();
        }
        assert_eq!(
            *queue_events.borrow(),
            [QueueEvent::MatchCleared { count: 3 }]
        );

        assert!(s.unsubscribe_queue(queue_id));
        assert!(s.unsubscribe_outcome(outcome_id));
        assert!(!s.unsubscribe_queue(queue_id));
        assert!(!s.unsubscribe_outcome(outcome_id));

        for col in 0..3 {
            s.play_move(pos(1, col)).unwrap();
        }
        assert_eq!(s.outcome(), Outcome::Won);
        assert_eq!(queue_events.borrow().len(), 1);
        assert!(outcomes.borrow().is_empty());
    }
}
