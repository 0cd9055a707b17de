use std::fmt;
use std::sync::Arc;

use chainsweeper_core::{Cell, Difficulty, MinePlacer, RandomMinePlacer};
use chainsweeper_protocol::{
    FlagResult, GameMode, GameSnapshot, PlayerStatsInfo, RevealResult,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::events::{EventHandler, SubscriptionId};
use crate::ledger::LedgerClient;
use crate::local::{ExportBundle, LocalEngine};
use crate::persistence::PersistenceStore;
use crate::remote::RemoteEngine;
use crate::{EngineError, Result};

/// Account shown while playing locally.
pub const LOCAL_ACCOUNT: &str = "local-player";

/// Collaborators the adapter is built from.
pub struct EngineContext {
    pub config: EngineConfig,
    pub store: PersistenceStore,
    /// `None` when the host has no way to reach a ledger at all.
    pub ledger: Option<Arc<dyn LedgerClient>>,
    pub clock: Arc<dyn Clock>,
}

/// Non-fatal conditions the UI should surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// Ledger mode was requested but no provider was found; playing locally.
    RemoteUnavailable,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteUnavailable => {
                f.write_str("No ledger provider detected, switched to local mode")
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModeSuggestion {
    pub mode: GameMode,
    pub reason: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub mode: GameMode,
    pub address: Option<String>,
    pub connected: bool,
}

/// What the UI draws for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
}

impl From<Cell> for CellView {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell { flagged: true, .. } => Self::Flagged,
            Cell { revealed: false, .. } => Self::Hidden,
            Cell { is_mine: true, .. } => Self::Mine,
            Cell { adjacent_mines, .. } => Self::Revealed(adjacent_mines),
        }
    }
}

enum ActiveEngine {
    Local(LocalEngine),
    Remote(RemoteEngine),
}

impl ActiveEngine {
    fn mode(&self) -> GameMode {
        match self {
            Self::Local(_) => GameMode::Local,
            Self::Remote(_) => GameMode::Remote,
        }
    }
}

/// Single entry point for the UI, whichever engine is active.
pub struct EngineAdapter {
    ctx: EngineContext,
    active: ActiveEngine,
    warnings: Vec<Warning>,
}

impl EngineAdapter {
    /// Builds the engine for the saved mode, or the configured default when
    /// nothing was saved. Falls back to local play with a
    /// [`Warning::RemoteUnavailable`] if the ledger cannot be reached, and
    /// saves local as the mode so later starts do not repeat the warning.
    pub fn open(ctx: EngineContext) -> Self {
        let requested = ctx.store.load_mode().unwrap_or(ctx.config.default_mode);
        let mut warnings = Vec::new();

        let mode = if requested == GameMode::Remote && !remote_available(&ctx) {
            log::warn!("Ledger mode requested but unavailable, falling back to local mode");
            warnings.push(Warning::RemoteUnavailable);
            ctx.store.save(&GameMode::Local);
            GameMode::Local
        } else {
            requested
        };

        let active = build_engine(&ctx, mode);
        log::info!("Engine opened in {} mode", mode);
        Self {
            ctx,
            active,
            warnings,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.active.mode()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn is_mode_available(&self, mode: GameMode) -> bool {
        match mode {
            GameMode::Local => true,
            GameMode::Remote => remote_available(&self.ctx),
        }
    }

    pub fn mode_suggestion(&self) -> ModeSuggestion {
        ModeSuggestion {
            mode: GameMode::Local,
            reason: if self.is_mode_available(GameMode::Remote) {
                "Local mode is faster and supports flags"
            } else {
                "No ledger provider detected"
            },
        }
    }

    /// Switches engines. Every subscription is detached first, the previous
    /// engine is dropped, and the new mode is saved.
    pub fn set_mode(&mut self, mode: GameMode) -> Result<()> {
        if !self.is_mode_available(mode) {
            return Err(EngineError::ModeUnavailable(mode));
        }
        if mode != self.mode() {
            self.unsubscribe_all();
            self.active = build_engine(&self.ctx, mode);
            log::info!("Switched to {} mode", mode);
        }
        self.ctx.store.save(&mode);
        Ok(())
    }

    pub fn account_info(&self) -> AccountInfo {
        match &self.active {
            ActiveEngine::Local(_) => AccountInfo {
                mode: GameMode::Local,
                address: Some(LOCAL_ACCOUNT.to_owned()),
                connected: true,
            },
            ActiveEngine::Remote(engine) => {
                let address = engine.account();
                AccountInfo {
                    mode: GameMode::Remote,
                    connected: address.is_some(),
                    address,
                }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        match &self.active {
            ActiveEngine::Local(_) => true,
            ActiveEngine::Remote(engine) => engine.is_connected(),
        }
    }

    pub async fn connect(&mut self) -> Result<String> {
        match &self.active {
            ActiveEngine::Local(_) => Ok(LOCAL_ACCOUNT.to_owned()),
            ActiveEngine::Remote(engine) => engine.connect().await,
        }
    }

    pub async fn disconnect(&mut self) {
        if let ActiveEngine::Remote(engine) = &self.active {
            engine.disconnect().await;
        }
    }

    pub async fn start_game(&mut self, width: u8, height: u8, mine_count: u16) -> Result<GameSnapshot> {
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.start_game(width, height, mine_count),
            ActiveEngine::Remote(engine) => engine.start_game(width, height, mine_count).await,
        }
    }

    pub async fn start_preset(&mut self, difficulty: Difficulty) -> Result<GameSnapshot> {
        let config = difficulty.config();
        self.start_game(config.width(), config.height(), config.mines).await
    }

    pub async fn reveal_cell(&mut self, x: u8, y: u8) -> Result<RevealResult> {
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.reveal_cell(x, y),
            ActiveEngine::Remote(engine) => engine.reveal_cell(x, y).await,
        }
    }

    pub fn toggle_flag(&mut self, x: u8, y: u8) -> Result<FlagResult> {
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.toggle_flag(x, y),
            ActiveEngine::Remote(engine) => engine.toggle_flag(x, y),
        }
    }

    pub async fn game_info(&self) -> Result<GameSnapshot> {
        match &self.active {
            ActiveEngine::Local(engine) => Ok(engine.game_info()),
            ActiveEngine::Remote(engine) => engine.game_info().await,
        }
    }

    /// Re-reads the authoritative snapshot, e.g. after an event hinted at a
    /// change.
    pub async fn refresh(&self) -> Result<GameSnapshot> {
        log::debug!("Refreshing game state");
        self.game_info().await
    }

    pub async fn is_cell_revealed(&self, x: u8, y: u8) -> Result<bool> {
        match &self.active {
            ActiveEngine::Local(engine) => engine.is_cell_revealed(x, y),
            ActiveEngine::Remote(engine) => engine.is_cell_revealed(x, y).await,
        }
    }

    pub fn is_cell_flagged(&self, x: u8, y: u8) -> Result<bool> {
        match &self.active {
            ActiveEngine::Local(engine) => engine.is_cell_flagged(x, y),
            ActiveEngine::Remote(engine) => Ok(engine.is_cell_flagged(x, y)),
        }
    }

    pub async fn adjacent_mine_count(&self, x: u8, y: u8) -> Result<u8> {
        match &self.active {
            ActiveEngine::Local(engine) => engine.adjacent_mine_count(x, y),
            ActiveEngine::Remote(engine) => engine.adjacent_mine_count(x, y).await,
        }
    }

    /// The ledger does not expose mine positions, so remote cells are only
    /// ever hidden or revealed.
    pub async fn cell_view(&self, x: u8, y: u8) -> Result<CellView> {
        match &self.active {
            ActiveEngine::Local(engine) => Ok(engine.cell(x, y)?.into()),
            ActiveEngine::Remote(engine) => {
                if engine.is_cell_revealed(x, y).await? {
                    Ok(CellView::Revealed(engine.adjacent_mine_count(x, y).await?))
                } else {
                    Ok(CellView::Hidden)
                }
            }
        }
    }

    pub async fn player_stats(&self) -> Result<PlayerStatsInfo> {
        match &self.active {
            ActiveEngine::Local(engine) => Ok(engine.player_stats()),
            ActiveEngine::Remote(engine) => engine.player_stats().await,
        }
    }

    pub fn subscribe(&mut self, handler: EventHandler) -> SubscriptionId {
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.subscribe(handler),
            ActiveEngine::Remote(engine) => engine.subscribe(handler),
        }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.unsubscribe(id),
            ActiveEngine::Remote(engine) => engine.unsubscribe(id),
        }
    }

    pub fn unsubscribe_all(&mut self) {
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.unsubscribe_all(),
            ActiveEngine::Remote(engine) => engine.unsubscribe_all(),
        }
    }

    /// Deletes every locally stored record. Ledger state is not affected.
    pub fn reset_all_data(&mut self) {
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.reset(),
            ActiveEngine::Remote(_) => {
                self.ctx.store.clear::<chainsweeper_core::Game>();
                self.ctx.store.clear::<chainsweeper_core::PlayerStats>();
            }
        }
        self.ctx.store.clear::<GameMode>();
        log::info!("All local data cleared");
    }

    /// JSON backup of the local game and statistics.
    pub fn export_data(&self) -> Result<String> {
        let engine = self.local_engine_or_unsupported("Export")?;
        serde_json::to_string_pretty(&engine.export())
            .map_err(|_| EngineError::InvalidImport("could not encode export"))
    }

    pub fn import_data(&mut self, json: &str) -> Result<()> {
        let bundle: ExportBundle =
            serde_json::from_str(json).map_err(|_| EngineError::InvalidImport("malformed JSON"))?;
        match &mut self.active {
            ActiveEngine::Local(engine) => engine.import(bundle),
            ActiveEngine::Remote(_) => Err(EngineError::unsupported("Import", GameMode::Remote)),
        }
    }

    pub fn local_engine(&self) -> Option<&LocalEngine> {
        match &self.active {
            ActiveEngine::Local(engine) => Some(engine),
            ActiveEngine::Remote(_) => None,
        }
    }

    fn local_engine_or_unsupported(&self, operation: &'static str) -> Result<&LocalEngine> {
        self.local_engine()
            .ok_or_else(|| EngineError::unsupported(operation, GameMode::Remote))
    }
}

fn remote_available(ctx: &EngineContext) -> bool {
    let client_ready = ctx
        .ledger
        .as_ref()
        .is_some_and(|ledger| ledger.provider_available());

    #[cfg(target_arch = "wasm32")]
    let client_ready = client_ready && crate::ledger::browser_provider_present();

    client_ready
}

fn build_engine(ctx: &EngineContext, mode: GameMode) -> ActiveEngine {
    match (mode, &ctx.ledger) {
        (GameMode::Remote, Some(ledger)) => ActiveEngine::Remote(RemoteEngine::new(
            ledger.clone(),
            ctx.config.confirm_timeout(),
        )),
        _ => ActiveEngine::Local(LocalEngine::open(
            ctx.store.clone(),
            make_placer(&ctx.config),
            ctx.clock.clone(),
            ctx.config.scoring,
        )),
    }
}

fn make_placer(config: &EngineConfig) -> Box<dyn MinePlacer + Send> {
    let seed = config.seed.unwrap_or_else(random_seed);
    Box::new(RandomMinePlacer::new(SmallRng::seed_from_u64(seed)))
}

#[cfg(target_arch = "wasm32")]
fn random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes(std::array::from_fn(|_| (256. * random()) as u8))
}

#[cfg(not(target_arch = "wasm32"))]
fn random_seed() -> u64 {
    rand::random()
}
