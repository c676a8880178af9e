use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

pub const STANDARD_WIDTH: Coord = 13;
pub const STANDARD_HEIGHT: Coord = 11;

/// Row-major layout of the standard arena, see [`Cell::code`] for the codes.
pub const STANDARD_LAYOUT: [[u8; STANDARD_WIDTH as usize]; STANDARD_HEIGHT as usize] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Outcome of trying to destroy a wall
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DestroyOutcome {
    NoChange,
    Destroyed,
}

impl DestroyOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Destroyed => true,
        }
    }
}

/// Fixed-shape terrain grid, indexed `[x, y]`.
///
/// The shape never changes after construction; the only mutation is a
/// destructible wall turning into an empty cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    pub fn standard() -> Self {
        Self::from_rows(&STANDARD_LAYOUT).expect("standard layout uses valid cell codes")
    }

    /// Builds a board from a row-major matrix of cell codes.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        let max = Coord::MAX as usize;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(GameError::InvalidBoardShape);
        }

        let mut cells = Array2::default((width, height));
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GameError::InvalidBoardShape);
            }
            for (x, &code) in row.iter().enumerate() {
                cells[[x, y]] = Cell::try_from(code)?;
            }
        }

        Ok(Self { cells })
    }

    pub fn size(&self) -> Tile {
        let (width, height) = self.cells.dim();
        (width as Coord, height as Coord)
    }

    pub fn contains(&self, (x, y): Tile) -> bool {
        let (width, height) = self.size();
        (0..width).contains(&x) && (0..height).contains(&y)
    }

    fn nd_index(&self, tile: Tile) -> Option<[usize; 2]> {
        self.contains(tile)
            .then(|| [tile.0 as usize, tile.1 as usize])
    }

    /// Cell kind at `tile`; anything outside the board reads as [`Cell::Empty`].
    pub fn cell_at(&self, tile: Tile) -> Cell {
        self.nd_index(tile)
            .map_or(Cell::Empty, |index| self.cells[index])
    }

    pub fn is_blocking(&self, tile: Tile) -> bool {
        self.cell_at(tile).is_blocking()
    }

    /// Turns a destructible wall into an empty cell. Every other cell, and
    /// every out-of-range tile, is left alone.
    pub fn destroy(&mut self, tile: Tile) -> DestroyOutcome {
        let Some(index) = self.nd_index(tile) else {
            return DestroyOutcome::NoChange;
        };

        if self.cells[index].is_destructible() {
            self.cells[index] = Cell::Empty;
            log::debug!("Wall at {:?} destroyed", tile);
            DestroyOutcome::Destroyed
        } else {
            DestroyOutcome::NoChange
        }
    }

    pub fn iter_orthogonal(&self, tile: Tile) -> OrthogonalIter {
        OrthogonalIter::new(tile, self.size())
    }

    /// Every tile with its cell, column by column.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Tile, Cell)> {
        self.cells
            .indexed_iter()
            .map(|((x, y), &cell)| ((x as Coord, y as Coord), cell))
    }

    pub fn destructible_count(&self) -> usize {
        self.iter_cells()
            .filter(|(_, cell)| cell.is_destructible())
            .count()
    }

    /// Row-major cell codes, the inverse of [`Board::from_rows`].
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        let (width, height) = self.size();
        (0..height)
            .map(|y| (0..width).map(|x| self.cell_at((x, y)).code()).collect())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
