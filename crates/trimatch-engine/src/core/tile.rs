use std::fmt;

use serde::{Deserialize, Serialize};

/// Subtype of an ordinary collectable tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalKind {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
}

impl NormalKind {
    pub const LEN: usize = 7;
    pub const ALL: [Self; Self::LEN] = [
        Self::One,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
    ];
}

/// Subtype of a bonus tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    Horizontal,
    Vertical,
    All,
}

impl BonusKind {
    pub const LEN: usize = 3;
    pub const ALL: [Self; Self::LEN] = [Self::Horizontal, Self::Vertical, Self::All];
}

/// Type classifier of a tile: category plus subtype.
///
/// Two tiles match iff their kinds are equal. A normal tile never matches a
/// bonus tile, even when they share an ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Normal(NormalKind),
    Bonus(BonusKind),
}

impl TileKind {
    /// Number of distinct tile kinds.
    pub const LEN: usize = NormalKind::LEN + BonusKind::LEN;

    #[must_use]
    pub fn is_bonus(self) -> bool {
        matches!(self, TileKind::Bonus(_))
    }

    /// Single character used by the text representation of grids and queues.
    ///
    /// ```
    /// use trimatch_engine::{BonusKind, NormalKind, TileKind};
    ///
    /// assert_eq!(TileKind::Normal(NormalKind::Three).as_char(), '3');
    /// assert_eq!(TileKind::Bonus(BonusKind::Vertical).as_char(), 'V');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            TileKind::Normal(NormalKind::One) => '1',
            TileKind::Normal(NormalKind::Two) => '2',
            TileKind::Normal(NormalKind::Three) => '3',
            TileKind::Normal(NormalKind::Four) => '4',
            TileKind::Normal(NormalKind::Five) => '5',
            TileKind::Normal(NormalKind::Six) => '6',
            TileKind::Normal(NormalKind::Seven) => '7',
            TileKind::Bonus(BonusKind::Horizontal) => 'H',
            TileKind::Bonus(BonusKind::Vertical) => 'V',
            TileKind::Bonus(BonusKind::All) => 'A',
        }
    }

    /// Inverse of [`Self::as_char`].
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        let kind = match ch {
            '1' => TileKind::Normal(NormalKind::One),
            '2' => TileKind::Normal(NormalKind::Two),
            '3' => TileKind::Normal(NormalKind::Three),
            '4' => TileKind::Normal(NormalKind::Four),
            '5' => TileKind::Normal(NormalKind::Five),
            '6' => TileKind::Normal(NormalKind::Six),
            '7' => TileKind::Normal(NormalKind::Seven),
            'H' => TileKind::Bonus(BonusKind::Horizontal),
            'V' => TileKind::Bonus(BonusKind::Vertical),
            'A' => TileKind::Bonus(BonusKind::All),
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileKind::Normal(kind) => write!(f, "Normal{kind:?}"),
            TileKind::Bonus(kind) => write!(f, "Bonus{kind:?}"),
        }
    }
}

/// Identity of a single tile, unique within a grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("#{_0}")]
pub struct TileId(u32);

impl TileId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Opaque reference to the presentation object drawn for a tile.
///
/// The engine carries it around so the host can find the sprite to animate,
/// but never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(u64);

impl ViewHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A collectable tile.
///
/// Tiles are not `Copy`: a tile lives either in a grid cell or in
/// the holding queue, and moving it between them transfers ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    kind: TileKind,
    view: ViewHandle,
}

impl Tile {
    /// Creates a tile whose view handle defaults to its id.
    #[must_use]
    pub fn new(id: TileId, kind: TileKind) -> Self {
        Self {
            id,
            kind,
            view: ViewHandle::from_raw(u64::from(id.raw())),
        }
    }

    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    #[must_use]
    pub const fn view(&self) -> ViewHandle {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_roundtrip_covers_every_kind() {
        let kinds = NormalKind::ALL
            .into_iter()
            .map(TileKind::Normal)
            .chain(BonusKind::ALL.into_iter().map(TileKind::Bonus));
        let mut count = 0;
        for kind in kinds {
            assert_eq!(TileKind::from_char(kind.as_char()), Some(kind));
            count += 1;
        }
        assert_eq!(count, TileKind::LEN);
        assert_eq!(TileKind::from_char('x'), None);
        assert_eq!(TileKind::from_char('.'), None);
    }

    #[test]
    fn test_matching_uses_kind_not_identity() {
        let a = Tile::new(TileId::new(1), TileKind::Normal(NormalKind::One));
        let b = Tile::new(TileId::new(2), TileKind::Normal(NormalKind::One));
        let c = Tile::new(TileId::new(3), TileKind::Bonus(BonusKind::Horizontal));
        assert_eq!(a.kind(), b.kind());
        assert_ne!(a.kind(), c.kind());
        assert_ne!(a, b);
        assert_eq!(a.view(), ViewHandle::from_raw(1));
    }

    #[test]
    fn test_normal_and_bonus_never_match() {
        // Same ordinal position, different category.
        assert_ne!(
            TileKind::Normal(NormalKind::One),
            TileKind::Bonus(BonusKind::Horizontal)
        );
        assert!(TileKind::Bonus(BonusKind::All).is_bonus());
        assert!(!TileKind::Normal(NormalKind::Seven).is_bonus());
    }
}
