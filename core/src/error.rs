use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board rows must be non-empty and all the same length")]
    InvalidBoardShape,
    #[error("Unknown cell code {0}")]
    InvalidCellCode(u8),
    #[error("Bomb owner is not alive")]
    OwnerNotAlive,
    #[error("Unknown player")]
    UnknownPlayer,
}

pub type Result<T> = core::result::Result<T, GameError>;
