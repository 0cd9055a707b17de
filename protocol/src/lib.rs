//! Types shared between the game engines, the ledger ABI and the UI.
//!
//! Everything here is plain data: the engines produce it, the UI consumes it,
//! and a ledger client decodes contract return values and logs into it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Constants exposed by the ledger contract. The local engine enforces the
/// same bounds so both modes accept the same board configurations.
pub mod limits {
    /// Smallest accepted board width/height.
    pub const MIN_SIZE: u8 = 5;
    /// Largest accepted board width/height.
    pub const MAX_SIZE: u8 = 20;
    /// Minimum mine density, in percent of the total cells (rounded up).
    pub const MIN_MINE_RATE: u8 = 10;
    /// Maximum mine density, in percent of the total cells (rounded down).
    pub const MAX_MINE_RATE: u8 = 30;
    /// Points for every safely revealed cell.
    pub const CELL_SCORE: u32 = 1;
    /// Points added once when a game is won.
    pub const WIN_BONUS: u32 = 5;
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("Unknown game status code {0}")]
pub struct InvalidStatus(pub u8);

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
/// - any -> InProgress (starting a new game)
///
/// Encoded as `0..=3` on the wire, matching the contract's enum.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum GameStatus {
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn code(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Won => 2,
            Self::Lost => 3,
        }
    }

    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Game ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl From<GameStatus> for u8 {
    fn from(status: GameStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for GameStatus {
    type Error = InvalidStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::NotStarted),
            1 => Ok(Self::InProgress),
            2 => Ok(Self::Won),
            3 => Ok(Self::Lost),
            other => Err(InvalidStatus(other)),
        }
    }
}

/// Engine-agnostic view of the current game handed to the UI.
///
/// Timestamps are unix milliseconds regardless of which engine produced the
/// snapshot; `end_time` stays `0` until the game is finished.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub width: u8,
    pub height: u8,
    pub mine_count: u16,
    pub status: GameStatus,
    pub score: u32,
    pub click_count: u32,
    pub start_time: u64,
    pub end_time: u64,
    pub initialized: bool,
}

impl GameSnapshot {
    /// Snapshot reported when no game was ever started.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Cumulative per-player totals as reported to the UI.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsInfo {
    pub total_games_played: u32,
    pub games_won: u32,
    pub current_high_score: u32,
    /// Percentage in `0..=100`.
    pub win_rate: u8,
}

/// Outcome of a reveal request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealResult {
    pub success: bool,
    pub is_mine: bool,
    pub game_status: GameStatus,
    /// Adjacent mine count of the clicked cell, `0` when it was a mine.
    pub adjacent_mines: u8,
}

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagResult {
    pub success: bool,
    pub flagged: bool,
}

/// Events emitted by either engine. Mirrors the contract's event set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    GameStarted { width: u8, height: u8, mine_count: u16 },
    #[serde(rename_all = "camelCase")]
    CellRevealed {
        x: u8,
        y: u8,
        is_mine: bool,
        adjacent_mines: u8,
    },
    #[serde(rename_all = "camelCase")]
    GameWon {
        score: u32,
        click_count: u32,
        /// Milliseconds between start and end.
        duration: u64,
    },
    #[serde(rename_all = "camelCase")]
    GameLost { x: u8, y: u8, click_count: u32 },
    #[serde(rename_all = "camelCase")]
    HighScoreUpdated { new_high_score: u32 },
}

impl GameEvent {
    /// Whether acting on this event may change a win/loss decision, in which
    /// case consumers should re-query the authoritative state first.
    pub const fn affects_outcome(&self) -> bool {
        matches!(
            self,
            Self::CellRevealed { is_mine: true, .. } | Self::GameWon { .. } | Self::GameLost { .. }
        )
    }
}

/// Identifies one delivered event so duplicates can be dropped.
///
/// For ledger events this is the block number and log index; the local engine
/// uses a running sequence number and index `0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub sequence: u64,
    pub index: u32,
}

impl EventId {
    pub const fn new(sequence: u64, index: u32) -> Self {
        Self { sequence, index }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub event: GameEvent,
}

/// Mode the engine adapter runs in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Local,
    Remote,
}

impl GameMode {
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Local => "Local mode",
            Self::Remote => "Ledger mode",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Local => "Offline play, data stays on this device, flagging supported",
            Self::Remote => "Game state lives on the ledger, every move is a transaction",
        }
    }
}

impl core::fmt::Display for GameMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
        })
    }
}

impl core::str::FromStr for GameMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "remote" | "ledger" | "blockchain" => Ok(Self::Remote),
            _ => Err(InvalidMode),
        }
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("Invalid game mode")]
pub struct InvalidMode;
