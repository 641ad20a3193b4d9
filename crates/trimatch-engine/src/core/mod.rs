//! Tile-level data structures: tiles, the grid, the holding queue and the
//! event registry they share.

pub use self::{events::*, grid::*, holding_queue::*, seed::*, tile::*};

mod events;
mod grid;
mod holding_queue;
mod seed;
mod tile;
