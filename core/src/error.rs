use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board width and height must be between 5 and 20")]
    InvalidDimension,
    #[error("Mine count outside the allowed density")]
    InvalidMineCount,
    #[error("Game not initialized")]
    GameNotInitialized,
    #[error("Game already ended, no new moves are accepted")]
    GameAlreadyEnded,
    #[error("Cell already revealed")]
    CellAlreadyRevealed,
    #[error("Cell is flagged")]
    CellFlagged,
    #[error("Invalid coordinate")]
    InvalidCoordinate,
}

pub type Result<T> = core::result::Result<T, GameError>;
