//! Automated play for trimatch sessions.
//!
//! - [`view`] - Per-decision summaries of the queue ([`view::HeldCounts`]) and
//!   the grid ([`view::GridGroups`])
//! - [`policy`] - [`policy::DecisionPolicy`], which picks the next cell to play
//!   toward a win or toward a loss
//! - [`autoplay`] - [`autoplay::Autoplayer`], a paced polling loop around the
//!   policy, and a headless runner producing [`autoplay::SessionReport`]s
//!
//! # Example
//!
//! ```
//! use trimatch_ai::{
//!     autoplay::{AutoplayPacing, Autoplayer},
//!     policy::Objective,
//! };
//! use trimatch_engine::{GameSession, GameSettings, Outcome, Seed};
//!
//! let mut session = GameSession::new(&GameSettings::default(), Seed::from_bytes([9; 16])).unwrap();
//! let mut player = Autoplayer::new(
//!     Objective::MaximizeWin,
//!     AutoplayPacing::turbo(),
//!     Seed::from_bytes([1; 16]),
//! );
//!
//! let report = player.play_to_end(&mut session, usize::MAX);
//! assert_eq!(report.outcome, Outcome::Won);
//! ```

pub mod autoplay;
pub mod policy;
pub mod view;
