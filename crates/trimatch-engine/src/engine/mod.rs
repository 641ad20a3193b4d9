//! Session-level logic built on top of [`crate::core`].
//!
//! - [`GameSettings`] - Board dimensions and kind mix used to generate grids
//! - [`Arbiter`] - Decides when a session is won or lost
//! - [`GameSession`] - Owns grid, queue and arbiter; gates moves one at a time
//! - [`GameStats`] - Per-session counters
//!
//! # Move Flow
//!
//! 1. The host asks [`GameSession::can_accept_move`]
//! 2. [`GameSession::submit_move`] frees the tile from the grid and returns a
//!    [`PendingMove`] ticket; the session is now busy
//! 3. The presentation layer animates the tile toward its queue slot
//! 4. [`GameSession::complete_move`] consumes the ticket, adds the tile to the
//!    queue (queue listeners fire), and lets the arbiter decide the outcome
//!
//! Headless hosts use [`GameSession::play_move`], which does both steps at once.
//!
//! # Example
//!
//! ```
//! use trimatch_engine::{GameSession, GameSettings, Outcome, Position, Seed};
//!
//! let settings = GameSettings {
//!     board_width: 3,
//!     board_height: 1,
//!     normal_kinds: 1,
//!     bonus_triples: 0,
//! };
//! let mut session = GameSession::new(&settings, Seed::from_bytes([7; 16])).unwrap();
//!
//! for col in 0..3 {
//!     session.play_move(Position::new(0, col)).unwrap();
//! }
//! assert_eq!(session.outcome(), Outcome::Won);
//! ```

pub use self::{arbiter::*, game_session::*, game_stats::*, settings::*};

mod arbiter;
mod game_session;
mod game_stats;
mod settings;
