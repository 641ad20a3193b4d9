use std::fmt;

use rand::{Rng, seq::SliceRandom as _};
use serde::{Deserialize, Serialize};

use crate::{
    GameSettings, Seed, SettingsError,
    core::tile::{BonusKind, NormalKind, Tile, TileId, TileKind},
};

/// Location of a grid cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Read-only view of the placed tiles, as consumed by decision policies.
///
/// # Scan order
///
/// [`Self::occupied_cells`] yields cells in row-major order: row 0 first, and
/// within a row column 0 first. Every tie-break that depends on "first
/// encountered" (most/least common kind, first cell of a kind) is defined
/// relative to this order.
pub trait GridSnapshot {
    /// Enumerates non-empty cells in scan order.
    fn occupied_cells(&self) -> impl Iterator<Item = (Position, &Tile)>;

    /// Returns `true` if the cell is empty or outside the grid.
    fn is_cell_empty(&self, position: Position) -> bool;

    /// Returns `true` if no cell holds a tile.
    fn is_cleared(&self) -> bool {
        self.occupied_cells().next().is_none()
    }
}

/// Rectangular grid of cells, each empty or holding exactly one tile.
///
/// # Example
///
/// ```
/// use trimatch_engine::{Grid, GridSnapshot as _, Position};
///
/// let mut grid = Grid::from_rows(&["12.", "..1"]).unwrap();
/// assert_eq!(grid.occupied_count(), 3);
///
/// let tile = grid.free_cell(Position::new(0, 0)).unwrap();
/// assert_eq!(tile.kind().as_char(), '1');
/// assert!(grid.is_cell_empty(Position::new(0, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Tile>>,
    next_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseGridError {
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[display("unrecognized character {ch:?} at row {row} col {col}")]
    UnknownTile { ch: char, row: usize, col: usize },
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows. Board settings are checked
    /// against [`MAX_BOARD_CELLS`](crate::MAX_BOARD_CELLS) by
    /// [`GameSettings::validate`] before a grid is generated.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
            next_id: 0,
        }
    }

    /// Builds a grid from its text representation.
    ///
    /// Each string is one row; `.` is an empty cell and every other character
    /// must be a [`TileKind::as_char`] code. All rows must have the same width.
    pub fn from_rows(rows: &[&str]) -> Result<Self, ParseGridError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::new(width, rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(ParseGridError::RaggedRow {
                    row,
                    found,
                    expected: width,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let kind =
                    TileKind::from_char(ch).ok_or(ParseGridError::UnknownTile { ch, row, col })?;
                grid.spawn(Position::new(row, col), kind);
            }
        }
        Ok(grid)
    }

    /// Creates a grid laid out per `settings`, shuffled with `seed`.
    ///
    /// See [`Self::fill_divisible_by_three`].
    pub fn generate(settings: &GameSettings, seed: Seed) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut grid = Self::new(settings.board_width, settings.board_height);
        grid.fill_divisible_by_three(settings, &mut seed.rng());
        Ok(grid)
    }

    /// Fills the grid so that every tile kind appears a multiple of three times.
    ///
    /// The grid is cleared first. It holds `width * height / 3` triples; each
    /// triple gets a random kind among the first `normal_kinds` normal kinds,
    /// except for up to `bonus_triples` triples that get a random bonus kind.
    /// The tiles are shuffled across the cells, and the `width * height % 3`
    /// leftover cells stay empty.
    pub fn fill_divisible_by_three<R>(&mut self, settings: &GameSettings, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.clear();

        let normal_kinds = &NormalKind::ALL[..settings.normal_kinds.clamp(1, NormalKind::LEN)];
        let triples = self.cells.len() / 3;
        let bonus_triples = settings.bonus_triples.min(triples);

        let mut layout = Vec::with_capacity(self.cells.len());
        for i in 0..triples {
            let kind = if i < bonus_triples {
                TileKind::Bonus(BonusKind::ALL[rng.random_range(0..BonusKind::LEN)])
            } else {
                TileKind::Normal(normal_kinds[rng.random_range(0..normal_kinds.len())])
            };
            layout.extend([Some(kind); 3]);
        }
        layout.resize(self.cells.len(), None);
        layout.shuffle(rng);

        for (index, kind) in layout.into_iter().enumerate() {
            if let Some(kind) = kind {
                let position = Position::new(index / self.width, index % self.width);
                self.spawn(position, kind);
            }
        }

        log::debug!(
            "filled {}x{} grid with {triples} triples ({bonus_triples} bonus)",
            self.width,
            self.height
        );
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.row < self.height && position.col < self.width
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then_some(position.row * self.width + position.col)
    }

    /// Returns the tile at `position`, if any.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<&Tile> {
        self.index(position).and_then(|i| self.cells[i].as_ref())
    }

    fn spawn(&mut self, position: Position, kind: TileKind) {
        let id = TileId::new(self.next_id);
        self.next_id += 1;
        let index = position.row * self.width + position.col;
        self.cells[index] = Some(Tile::new(id, kind));
    }

    /// Removes the tile at `position` and hands over ownership.
    ///
    /// Returns `None` if the cell is empty or outside the grid.
    pub fn free_cell(&mut self, position: Position) -> Option<Tile> {
        let index = self.index(position)?;
        self.cells[index].take()
    }

    /// Number of cells currently holding a tile.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }
}

impl GridSnapshot for Grid {
    fn occupied_cells(&self) -> impl Iterator<Item = (Position, &Tile)> {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref()
                .map(|tile| (Position::new(i / width, i % width), tile))
        })
    }

    fn is_cell_empty(&self, position: Position) -> bool {
        self.get(position).is_none()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(self.width.max(1)).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in cells {
                let ch = cell.as_ref().map_or('.', |t| t.kind().as_char());
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}
