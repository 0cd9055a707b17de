//! Boundary to the on-chain game contract.
//!
//! A [`LedgerClient`] wraps whatever wallet/provider stack talks to the
//! contract. The remote engine only sees this trait: it submits calls, waits
//! for confirmations and issues read-only queries, all of which may fail with
//! a [`LedgerError`].

use std::fmt;

use async_trait::async_trait;
use chainsweeper_protocol::{EventEnvelope, GameSnapshot, GameStatus, PlayerStatsInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{EventHandler, SubscriptionId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("No ledger provider found")]
    ProviderMissing,
    #[error("Wallet is not connected")]
    NotConnected,
    #[error("Request rejected by the wallet: {0}")]
    Rejected(String),
    #[error("Transaction reverted: {0}")]
    Reverted(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed ledger response: {0}")]
    Malformed(String),
}

/// Hash of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State-changing contract calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum LedgerCall {
    #[serde(rename_all = "camelCase")]
    StartGame { width: u8, height: u8, mine_count: u16 },
    RevealCell { x: u8, y: u8 },
}

/// Confirmation of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx: TxHash,
    pub block_number: u64,
    /// Events logged by the transaction, in log order.
    pub events: Vec<EventEnvelope>,
}

/// `getGameInfo()` as returned by the contract, times in unix seconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerGameInfo {
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

impl LedgerGameInfo {
    pub fn to_snapshot(self) -> GameSnapshot {
        GameSnapshot {
            width: self.width,
            height: self.height,
            mine_count: self.mine_count,
            status: self.status,
            score: self.score,
            click_count: self.click_count,
            start_time: self.start_time.saturating_mul(1000),
            end_time: self.end_time.saturating_mul(1000),
            initialized: self.initialized,
        }
    }
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Whether a provider is reachable at all, connected or not.
    fn provider_available(&self) -> bool;

    /// Address of the connected account.
    fn account(&self) -> Option<String>;

    async fn connect(&self) -> Result<String, LedgerError>;

    async fn disconnect(&self);

    /// Sends a transaction and returns as soon as it is accepted for mining.
    async fn submit(&self, call: LedgerCall) -> Result<TxHash, LedgerError>;

    /// Resolves once `tx` is mined. Reverts are reported as
    /// [`LedgerError::Reverted`].
    async fn confirm(&self, tx: &TxHash) -> Result<Receipt, LedgerError>;

    async fn game_info(&self) -> Result<LedgerGameInfo, LedgerError>;

    async fn is_cell_revealed(&self, x: u8, y: u8) -> Result<bool, LedgerError>;

    async fn adjacent_mine_count(&self, x: u8, y: u8) -> Result<u8, LedgerError>;

    async fn player_stats(&self) -> Result<PlayerStatsInfo, LedgerError>;

    /// Registers a handler for contract events of the connected player.
    fn subscribe(&self, handler: EventHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Whether the page has an injected wallet provider (`window.ethereum`).
#[cfg(target_arch = "wasm32")]
pub fn browser_provider_present() -> bool {
    let window = gloo::utils::window();
    js_sys::Reflect::has(&window, &"ethereum".into()).unwrap_or(false)
}
