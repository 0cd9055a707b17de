use std::sync::Arc;
use std::time::Duration;

use chainsweeper_protocol::{
    FlagResult, GameMode, GameSnapshot, GameStatus, PlayerStatsInfo, RevealResult,
};

use crate::events::{EventHandler, SubscriptionId, deduplicated};
use crate::ledger::{LedgerCall, LedgerClient, Receipt};
use crate::{EngineError, Result};

/// Runs `fut` to completion, or gives up with `None` after `limit`.
#[cfg(not(target_arch = "wasm32"))]
async fn within<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}

/// Browser flavor: no tokio timer driver, so race against a `setTimeout`.
#[cfg(target_arch = "wasm32")]
async fn within<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    use futures_util::future::{Either, select};
    use gloo::timers::future::TimeoutFuture;

    let millis = u32::try_from(limit.as_millis()).unwrap_or(u32::MAX);
    let fut = std::pin::pin!(fut);
    let timer = std::pin::pin!(TimeoutFuture::new(millis));
    match select(fut, timer).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(_) => None,
    }
}

/// Engine backed by the game contract.
///
/// Every move is a transaction: it is submitted, then awaited until it is
/// confirmed or the confirmation timeout elapses. Nothing is applied
/// optimistically; results are read back from the ledger afterwards.
pub struct RemoteEngine {
    ledger: Arc<dyn LedgerClient>,
    confirm_timeout: Duration,
    subscriptions: Vec<SubscriptionId>,
}

impl RemoteEngine {
    pub fn new(ledger: Arc<dyn LedgerClient>, confirm_timeout: Duration) -> Self {
        Self {
            ledger,
            confirm_timeout,
            subscriptions: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    pub fn is_connected(&self) -> bool {
        self.ledger.account().is_some()
    }

    pub fn account(&self) -> Option<String> {
        self.ledger.account()
    }

    pub async fn connect(&self) -> Result<String> {
        let account = self.ledger.connect().await.map_err(EngineError::from_query)?;
        log::info!("Connected ledger account {}", account);
        Ok(account)
    }

    pub async fn disconnect(&self) {
        self.ledger.disconnect().await;
        log::info!("Disconnected ledger account");
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(EngineError::ConnectionRequired)
        }
    }

    /// Submits `call` and waits for its confirmation. No retries.
    async fn transact(&self, call: LedgerCall) -> Result<Receipt> {
        self.ensure_connected()?;
        let tx = self
            .ledger
            .submit(call)
            .await
            .map_err(EngineError::from_transaction)?;
        log::debug!("Submitted {:?} as {}", call, tx);

        match within(self.confirm_timeout, self.ledger.confirm(&tx)).await {
            Some(Ok(receipt)) => {
                log::debug!("{} confirmed in block {}", tx, receipt.block_number);
                Ok(receipt)
            }
            Some(Err(err)) => {
                log::warn!("{} failed: {}", tx, err);
                Err(EngineError::from_transaction(err))
            }
            None => {
                log::warn!("{} not confirmed after {:?}", tx, self.confirm_timeout);
                Err(EngineError::TransactionTimeout(tx))
            }
        }
    }

    /// Bounds are checked by the contract; a rejected configuration comes
    /// back as [`EngineError::TransactionFailed`].
    pub async fn start_game(&self, width: u8, height: u8, mine_count: u16) -> Result<GameSnapshot> {
        self.transact(LedgerCall::StartGame {
            width,
            height,
            mine_count,
        })
        .await?;
        self.game_info().await
    }

    pub async fn reveal_cell(&self, x: u8, y: u8) -> Result<RevealResult> {
        self.transact(LedgerCall::RevealCell { x, y }).await?;

        let info = self.game_info().await?;
        // the contract only ends a game as lost on the clicked mine
        let is_mine = info.status == GameStatus::Lost;
        let adjacent_mines = if is_mine {
            0
        } else {
            self.adjacent_mine_count(x, y).await?
        };
        Ok(RevealResult {
            success: true,
            is_mine,
            game_status: info.status,
            adjacent_mines,
        })
    }

    pub fn toggle_flag(&self, _x: u8, _y: u8) -> Result<FlagResult> {
        Err(EngineError::unsupported("Flagging", GameMode::Remote))
    }

    pub async fn game_info(&self) -> Result<GameSnapshot> {
        let info = self.ledger.game_info().await.map_err(EngineError::from_query)?;
        Ok(info.to_snapshot())
    }

    pub async fn is_cell_revealed(&self, x: u8, y: u8) -> Result<bool> {
        self.ledger
            .is_cell_revealed(x, y)
            .await
            .map_err(EngineError::from_query)
    }

    /// Flags are not tracked on the ledger.
    pub fn is_cell_flagged(&self, _x: u8, _y: u8) -> bool {
        false
    }

    pub async fn adjacent_mine_count(&self, x: u8, y: u8) -> Result<u8> {
        self.ledger
            .adjacent_mine_count(x, y)
            .await
            .map_err(EngineError::from_query)
    }

    pub async fn player_stats(&self) -> Result<PlayerStatsInfo> {
        self.ledger.player_stats().await.map_err(EngineError::from_query)
    }

    pub fn subscribe(&mut self, handler: EventHandler) -> SubscriptionId {
        let id = self.ledger.subscribe(deduplicated(handler));
        self.subscriptions.push(id);
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| *sub != id);
        if self.subscriptions.len() == before {
            return false;
        }
        self.ledger.unsubscribe(id);
        true
    }

    /// Detaches only the handlers registered through this engine.
    pub fn unsubscribe_all(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.ledger.unsubscribe(id);
        }
    }
}

impl Drop for RemoteEngine {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}
