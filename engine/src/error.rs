use chainsweeper_core::GameError;
use chainsweeper_protocol::GameMode;
use thiserror::Error;

use crate::ledger::{LedgerError, TxHash};

/// Errors surfaced by [`EngineAdapter`](crate::EngineAdapter).
///
/// Local rule violations arrive as [`EngineError::Game`] right away; ledger
/// failures only after the submit/confirm cycle finished or timed out, and
/// never as a `Game` error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("{operation} is not supported in {mode} mode")]
    UnsupportedOperation {
        operation: &'static str,
        mode: GameMode,
    },
    #[error("Wallet connection required")]
    ConnectionRequired,
    #[error("Transaction {0} was not confirmed in time")]
    TransactionTimeout(TxHash),
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    #[error("{0} mode is not available in this environment")]
    ModeUnavailable(GameMode),
    #[error("Ledger query failed: {0}")]
    Ledger(LedgerError),
    #[error("Imported data is invalid: {0}")]
    InvalidImport(&'static str),
}

/// Flat classification of [`EngineError`] for callers that branch on the
/// kind of failure.
///
/// Moves on a finished game classify as `GameNotInitialized` and reveals of a
/// flagged cell as `CellAlreadyRevealed`; the [`GameError`] keeps the detail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDimension,
    InvalidMineCount,
    GameNotInitialized,
    CellAlreadyRevealed,
    InvalidCoordinate,
    UnsupportedOperation,
    ConnectionRequired,
    TransactionTimeout,
    TransactionFailed,
    ModeUnavailable,
    Ledger,
    InvalidImport,
}

impl EngineError {
    pub(crate) fn unsupported(operation: &'static str, mode: GameMode) -> Self {
        Self::UnsupportedOperation { operation, mode }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Game(err) => match err {
                GameError::InvalidDimension => ErrorKind::InvalidDimension,
                GameError::InvalidMineCount => ErrorKind::InvalidMineCount,
                GameError::GameNotInitialized | GameError::GameAlreadyEnded => {
                    ErrorKind::GameNotInitialized
                }
                GameError::CellAlreadyRevealed | GameError::CellFlagged => {
                    ErrorKind::CellAlreadyRevealed
                }
                GameError::InvalidCoordinate => ErrorKind::InvalidCoordinate,
            },
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::ConnectionRequired => ErrorKind::ConnectionRequired,
            Self::TransactionTimeout(_) => ErrorKind::TransactionTimeout,
            Self::TransactionFailed(_) => ErrorKind::TransactionFailed,
            Self::ModeUnavailable(_) => ErrorKind::ModeUnavailable,
            Self::Ledger(_) => ErrorKind::Ledger,
            Self::InvalidImport(_) => ErrorKind::InvalidImport,
        }
    }

    /// Whether the failure came out of the ledger rather than local checks.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRequired
                | Self::TransactionTimeout(_)
                | Self::TransactionFailed(_)
                | Self::Ledger(_)
        )
    }

    /// Maps a failed submission or confirmation.
    pub(crate) fn from_transaction(err: LedgerError) -> Self {
        match err {
            LedgerError::NotConnected => Self::ConnectionRequired,
            LedgerError::ProviderMissing => Self::ModeUnavailable(GameMode::Remote),
            other => Self::TransactionFailed(other.to_string()),
        }
    }

    /// Maps a failed read-only call.
    pub(crate) fn from_query(err: LedgerError) -> Self {
        match err {
            LedgerError::NotConnected => Self::ConnectionRequired,
            LedgerError::ProviderMissing => Self::ModeUnavailable(GameMode::Remote),
            other => Self::Ledger(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
