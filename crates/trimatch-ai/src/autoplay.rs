//! Paced automated play on top of a [`DecisionPolicy`].
//!
//! [`Autoplayer::tick`] performs one step of a cooperative loop and tells the
//! host how long to wait before the next step. The host owns the clock: it
//! sleeps (or schedules a timer), animates any submitted move, and completes
//! it on the session.
//!
//! [`Autoplayer::play_to_end`] skips all pacing and completes every move
//! immediately, for batch simulation.

use std::time::Duration;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use trimatch_engine::{GameSession, GameStats, Outcome, PendingMove, Position, Seed};

use crate::policy::{DecisionPolicy, Objective};

/// Delays used between autoplay steps, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayPacing {
    /// Wait before the first move.
    pub start_delay_ms: u64,
    /// Recheck interval while a move is in flight.
    pub busy_poll_ms: u64,
    /// Recheck interval while the queue cannot take a tile.
    pub full_poll_ms: u64,
    /// Wait after submitting a move.
    pub move_delay_ms: u64,
    /// Time the presentation layer takes to settle a moved tile.
    pub settle_ms: u64,
}

impl Default for AutoplayPacing {
    fn default() -> Self {
        Self {
            start_delay_ms: 500,
            busy_poll_ms: 16,
            full_poll_ms: 100,
            move_delay_ms: 500,
            settle_ms: 300,
        }
    }
}

impl AutoplayPacing {
    /// Pacing with every delay set to zero.
    #[must_use]
    pub const fn turbo() -> Self {
        Self {
            start_delay_ms: 0,
            busy_poll_ms: 0,
            full_poll_ms: 0,
            move_delay_ms: 0,
            settle_ms: 0,
        }
    }

    #[must_use]
    pub const fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    #[must_use]
    pub const fn busy_poll(&self) -> Duration {
        Duration::from_millis(self.busy_poll_ms)
    }

    #[must_use]
    pub const fn full_poll(&self) -> Duration {
        Duration::from_millis(self.full_poll_ms)
    }

    #[must_use]
    pub const fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }

    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// What the host should do after a call to [`Autoplayer::tick`].
#[derive(Debug, derive_more::IsVariant)]
pub enum Tick {
    /// Nothing to do yet; tick again after the delay.
    Wait(Duration),
    /// The policy found no cell to play; tick again after the delay.
    Stalled(Duration),
    /// A move left the grid. Complete it on the session, then tick again
    /// after `next_tick`.
    Submitted {
        pending: PendingMove,
        next_tick: Duration,
    },
    /// The session is over.
    Finished(Outcome),
}

/// Summary of one automated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub objective: Objective,
    pub board_seed: Option<Seed>,
    pub policy_seed: Seed,
    pub outcome: Outcome,
    pub stats: GameStats,
    /// Cells played, in order.
    pub moves: Vec<Position>,
}

#[derive(Debug)]
pub struct Autoplayer {
    policy: DecisionPolicy,
    pacing: AutoplayPacing,
    seed: Seed,
    rng: Pcg32,
    started: bool,
}

impl Autoplayer {
    /// Creates an autoplayer whose random fallback is driven by `seed`.
    #[must_use]
    pub fn new(objective: Objective, pacing: AutoplayPacing, seed: Seed) -> Self {
        Self {
            policy: DecisionPolicy::new(objective),
            pacing,
            seed,
            rng: seed.rng(),
            started: false,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn pacing(&self) -> &AutoplayPacing {
        &self.pacing
    }

    #[must_use]
    pub const fn seed(&self) -> Seed {
        self.seed
    }

    /// Runs one step of the autoplay loop.
    pub fn tick(&mut self, session: &mut GameSession) -> Tick {
        if !self.started {
            self.started = true;
            return Tick::Wait(self.pacing.start_delay());
        }

        let outcome = session.outcome();
        if outcome.is_terminal() {
            return Tick::Finished(outcome);
        }
        if session.is_busy() {
            return Tick::Wait(self.pacing.busy_poll());
        }
        if !session.queue().can_accept() {
            return Tick::Wait(self.pacing.full_poll());
        }

        let Some(position) = self
            .policy
            .select_cell(session.queue(), session.grid(), &mut self.rng)
        else {
            return Tick::Stalled(self.pacing.busy_poll());
        };

        match session.submit_move(position) {
            Ok(pending) => Tick::Submitted {
                pending,
                next_tick: self.pacing.move_delay(),
            },
            // The session already logged why.
            Err(_) => Tick::Wait(self.pacing.busy_poll()),
        }
    }

    /// Plays `session` without pacing until it ends, the policy stalls, or
    /// `move_limit` moves have been made.
    pub fn play_to_end(&mut self, session: &mut GameSession, move_limit: usize) -> SessionReport {
        self.started = true;
        let mut moves = vec![];

        while moves.len() < move_limit {
            match self.tick(session) {
                Tick::Submitted { pending, .. } => {
                    let origin = pending.origin();
                    if let Err(e) = session.complete_move(pending) {
                        log::warn!("autoplay move at {origin} failed: {e}");
                        break;
                    }
                    moves.push(origin);
                }
                Tick::Stalled(_) => {
                    log::debug!("autoplay stalled after {} moves", moves.len());
                    break;
                }
                Tick::Wait(_) | Tick::Finished(_) => break,
            }
        }

        log::info!(
            "{} finished with {} after {} moves",
            self.policy.objective(),
            session.outcome(),
            moves.len()
        );
        SessionReport {
            objective: self.policy.objective(),
            board_seed: session.seed(),
            policy_seed: self.seed,
            outcome: session.outcome(),
            stats: session.stats().clone(),
            moves,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng as _;
    use trimatch_engine::{GameSettings, Grid, QUEUE_CAPACITY};

    use super::*;
    use crate::view::GridGroups;

    const POLICY_SEED: Seed = Seed::from_bytes([0x11; 16]);

    fn generated(settings: &GameSettings, seed: Seed) -> GameSession {
        GameSession::new(settings, seed).unwrap()
    }

    #[test_log::test]
    fn test_tick_sequence_with_presentation_delay() {
        let pacing = AutoplayPacing::default();
        let mut session = GameSession::from_grid(Grid::from_rows(&["111"]).unwrap());
        let mut player = Autoplayer::new(Objective::MaximizeWin, pacing.clone(), POLICY_SEED);

        assert!(matches!(player.tick(&mut session), Tick::Wait(d) if d == pacing.start_delay()));

        let Tick::Submitted { pending, next_tick } = player.tick(&mut session) else {
            panic!("expected a submitted move");
        };
        assert_eq!(next_tick, pacing.move_delay());
        assert_eq!(pending.origin(), Position::new(0, 0));

        // Still animating: the autoplayer must not submit another move.
        assert!(matches!(player.tick(&mut session), Tick::Wait(d) if d == pacing.busy_poll()));
        session.complete_move(pending).unwrap();

        for col in 1..3 {
            let Tick::Submitted { pending, .. } = player.tick(&mut session) else {
                panic!("expected a submitted move");
            };
            assert_eq!(pending.origin(), Position::new(0, col));
            session.complete_move(pending).unwrap();
        }
        assert!(matches!(player.tick(&mut session), Tick::Finished(Outcome::Won)));
    }

    #[test_log::test]
    fn test_stalls_when_grid_empty_but_queue_not() {
        let mut session = GameSession::from_grid(Grid::from_rows(&["12"]).unwrap());
        let mut player =
            Autoplayer::new(Objective::MaximizeWin, AutoplayPacing::turbo(), POLICY_SEED);
        let report = player.play_to_end(&mut session, 100);
        assert_eq!(report.moves.len(), 2);
        assert_eq!(report.outcome, Outcome::Ongoing);
        assert!(player.tick(&mut session).is_stalled());
    }

    #[test_log::test]
    fn test_win_objective_always_wins_generated_boards() {
        let mut rng = Seed::from_bytes([0xA5; 16]).rng();
        let settings = [
            GameSettings::default(),
            GameSettings {
                board_width: 9,
                board_height: 7,
                normal_kinds: 7,
                bonus_triples: 4,
            },
            GameSettings {
                board_width: 5,
                board_height: 4,
                normal_kinds: 2,
                bonus_triples: 1,
            },
        ];
        for settings in &settings {
            for _ in 0..20 {
                let board_seed: Seed = rng.random();
                let mut session = generated(settings, board_seed);
                let tiles = session.grid().occupied_count();
                let mut player =
                    Autoplayer::new(Objective::MaximizeWin, AutoplayPacing::turbo(), rng.random());
                let report = player.play_to_end(&mut session, usize::MAX);
                assert_eq!(report.outcome, Outcome::Won, "board {board_seed}");
                assert_eq!(report.moves.len(), tiles);
                assert_eq!(report.stats.tiles_cleared(), tiles);
                assert_eq!(report.board_seed, Some(board_seed));
            }
        }
    }

    #[test_log::test]
    fn test_loss_objective_overflows_varied_boards() {
        let settings = GameSettings {
            board_width: 9,
            board_height: 7,
            ..GameSettings::default()
        };
        let mut rng = Seed::from_bytes([0x3C; 16]).rng();
        for _ in 0..20 {
            let mut session = generated(&settings, rng.random());
            // With five distinct kinds available, five picks fill the queue
            // without a single match.
            if GridGroups::from_grid(session.grid()).iter().count() < QUEUE_CAPACITY {
                continue;
            }
            let mut player =
                Autoplayer::new(Objective::MaximizeLoss, AutoplayPacing::turbo(), rng.random());
            let report = player.play_to_end(&mut session, usize::MAX);
            assert_eq!(report.outcome, Outcome::Lost);
            assert_eq!(report.stats.matches(), 0);
            assert_eq!(report.moves.len(), QUEUE_CAPACITY);
        }
    }

    #[test_log::test]
    fn test_loss_objective_on_few_kinds_still_ends() {
        let mut session = GameSession::from_grid(Grid::from_rows(&["111", "222"]).unwrap());
        let report = Autoplayer::new(Objective::MaximizeLoss, AutoplayPacing::turbo(), POLICY_SEED)
            .play_to_end(&mut session, usize::MAX);
        // Two kinds cannot overflow five slots; the random fallback clears them.
        assert_eq!(report.outcome, Outcome::Won);
        assert_eq!(report.moves.len(), 6);
    }

    #[test_log::test]
    fn test_same_seeds_same_report() {
        let settings = GameSettings {
            normal_kinds: 2,
            ..GameSettings::default()
        };
        let board_seed = Seed::from_bytes([0x42; 16]);
        let run = || {
            let mut session = generated(&settings, board_seed);
            Autoplayer::new(Objective::MaximizeLoss, AutoplayPacing::turbo(), POLICY_SEED)
                .play_to_end(&mut session, usize::MAX)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_move_limit() {
        let mut session = generated(&GameSettings::default(), Seed::from_bytes([1; 16]));
        let report = Autoplayer::new(Objective::MaximizeWin, AutoplayPacing::turbo(), POLICY_SEED)
            .play_to_end(&mut session, 4);
        assert_eq!(report.moves.len(), 4);
        assert_eq!(report.outcome, Outcome::Ongoing);
    }

    #[test]
    fn test_pacing_from_partial_json() {
        let pacing: AutoplayPacing = serde_json::from_str(r#"{"move_delay_ms": 50}"#).unwrap();
        assert_eq!(pacing.move_delay(), Duration::from_millis(50));
        assert_eq!(pacing.start_delay(), Duration::from_millis(500));
        assert_eq!(pacing.settle(), Duration::from_millis(300));
    }
}
