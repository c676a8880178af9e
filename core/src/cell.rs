use serde::{Deserialize, Serialize};

use crate::*;

/// Terrain kind of one board tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Solid,
    Destructible,
}

impl Cell {
    /// Matrix code used by board layouts: 0 empty, 1 solid, 2 destructible.
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Solid => 1,
            Self::Destructible => 2,
        }
    }

    /// Whether a player body may not overlap this cell.
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Solid | Self::Destructible)
    }

    pub const fn is_destructible(self) -> bool {
        matches!(self, Self::Destructible)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Empty
    }
}

impl TryFrom<u8> for Cell {
    type Error = GameError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Empty),
            1 => Ok(Self::Solid),
            2 => Ok(Self::Destructible),
            other => Err(GameError::InvalidCellCode(other)),
        }
    }
}
