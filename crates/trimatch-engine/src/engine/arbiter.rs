use serde::{Deserialize, Serialize};

use crate::core::{GridSnapshot, HoldingQueue, ListenerId, Listeners};

/// Terminal state of a session, or `Ongoing` while it can still be played.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Outcome {
    #[default]
    Ongoing,
    Won,
    Lost,
}

impl Outcome {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// Decides the outcome of a session from queue and grid state.
///
/// Starts `Ongoing`. An overflow makes it `Lost`; an empty grid together with
/// an empty queue makes it `Won`. Once terminal, the outcome never changes and
/// listeners are notified exactly once.
#[derive(Debug, Default)]
pub struct Arbiter {
    outcome: Outcome,
    listeners: Listeners<Outcome>,
}

impl Arbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Handles a queue overflow.
    pub fn on_overflow(&mut self) -> Outcome {
        self.decide(Outcome::Lost)
    }

    /// Declares the session won if both the grid and the queue are empty.
    pub fn check_win<G>(&mut self, grid: &G, queue: &HoldingQueue) -> Outcome
    where
        G: GridSnapshot,
    {
        if grid.is_cleared() && queue.is_empty() {
            self.decide(Outcome::Won)
        } else {
            self.outcome
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&Outcome) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn decide(&mut self, outcome: Outcome) -> Outcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }
        self.outcome = outcome;
        log::info!("session {outcome}");
        self.listeners.emit(&outcome);
        outcome
    }
}
