use serde::{Deserialize, Serialize};

use crate::{SettingsError, core::NormalKind};

/// Largest number of cells a generated board may have.
pub const MAX_BOARD_CELLS: usize = 64 * 64;

/// Parameters for generating a board.
///
/// Missing fields fall back to [`GameSettings::default`] when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub board_width: usize,
    pub board_height: usize,
    /// How many of the normal kinds are in play, starting from the first.
    pub normal_kinds: usize,
    /// How many triples of bonus tiles to place.
    pub bonus_triples: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_width: 6,
            board_height: 6,
            normal_kinds: NormalKind::LEN,
            bonus_triples: 0,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(SettingsError::EmptyBoard {
                width: self.board_width,
                height: self.board_height,
            });
        }
        let too_large = SettingsError::BoardTooLarge {
            width: self.board_width,
            height: self.board_height,
            max: MAX_BOARD_CELLS,
        };
        let cells = self
            .board_width
            .checked_mul(self.board_height)
            .ok_or_else(|| too_large.clone())?;
        if cells > MAX_BOARD_CELLS {
            return Err(too_large);
        }
        if !(1..=NormalKind::LEN).contains(&self.normal_kinds) {
            return Err(SettingsError::NormalKinds {
                count: self.normal_kinds,
                max: NormalKind::LEN,
            });
        }
        Ok(())
    }
}
