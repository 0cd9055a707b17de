#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chainsweeper_core::{
    FixedMinePlacer, Game, GameConfig, MineLayout, MinePlacer, PlayerStats,
    RandomMinePlacer, RevealOutcome, ScoringRule,
};
use chainsweeper_engine::{
    Clock, EngineAdapter, EngineConfig, EngineContext, EventHandler, LedgerCall, LedgerClient, LedgerError,
    LedgerGameInfo, Listeners, ManualClock, PersistenceStore, Receipt, SubscriptionId, TxHash,
};
use chainsweeper_protocol::{EventEnvelope, EventId, GameEvent, GameMode, PlayerStatsInfo};
use rand::SeedableRng;
use rand::rngs::SmallRng;

pub const T0: u64 = 1_700_000_000_000;
pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

/// Five mines forming a wall on column 2 of a 5×5 board.
pub const WALL: [(u8, u8); 5] = [(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)];

pub fn wall_layout() -> MineLayout {
    MineLayout::from_mine_coords((5, 5), &WALL).unwrap()
}

struct LedgerState {
    account: Option<String>,
    game: Option<Game>,
    stats: PlayerStats,
    placer: Box<dyn MinePlacer + Send>,
    receipts: HashMap<TxHash, Result<Receipt, LedgerError>>,
    next_tx: u64,
    block: u64,
    listeners: Listeners,
    submitted: Vec<LedgerCall>,
}

/// In-memory stand-in for the game contract.
///
/// Transactions are executed on submit and their receipts handed out on
/// confirm. Scoring is flat and times are reported in seconds, as on chain.
pub struct FakeLedger {
    state: Mutex<LedgerState>,
    clock: Arc<ManualClock>,
    provider: AtomicBool,
    hang_confirmations: AtomicBool,
    duplicate_events: AtomicBool,
}

impl FakeLedger {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self::with_placer(clock, Box::new(RandomMinePlacer::new(SmallRng::seed_from_u64(99))))
    }

    pub fn with_layout(clock: Arc<ManualClock>, layout: MineLayout) -> Self {
        Self::with_placer(clock, Box::new(FixedMinePlacer(layout)))
    }

    fn with_placer(clock: Arc<ManualClock>, placer: Box<dyn MinePlacer + Send>) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                account: None,
                game: None,
                stats: PlayerStats::default(),
                placer,
                receipts: HashMap::new(),
                next_tx: 0,
                block: 100,
                listeners: Listeners::new(),
                submitted: Vec::new(),
            }),
            clock,
            provider: AtomicBool::new(true),
            hang_confirmations: AtomicBool::new(false),
            duplicate_events: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap()
    }

    pub fn set_provider(&self, present: bool) {
        self.provider.store(present, Ordering::SeqCst);
    }

    pub fn hang_confirmations(&self, hang: bool) {
        self.hang_confirmations.store(hang, Ordering::SeqCst);
    }

    pub fn duplicate_events(&self, duplicate: bool) {
        self.duplicate_events.store(duplicate, Ordering::SeqCst);
    }

    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    pub fn submitted(&self) -> Vec<LedgerCall> {
        self.state().submitted.clone()
    }

    pub fn game(&self) -> Option<Game> {
        self.state().game.clone()
    }

    fn execute(&self, state: &mut LedgerState, call: LedgerCall) -> Result<Vec<GameEvent>, LedgerError> {
        let now = self.clock.now_ms();
        let revert = |err: chainsweeper_core::GameError| LedgerError::Reverted(err.to_string());

        match call {
            LedgerCall::StartGame {
                width,
                height,
                mine_count,
            } => {
                let config = GameConfig::new(width, height, mine_count).map_err(revert)?;
                let game = Game::start(config, ScoringRule::Flat, state.placer.as_mut(), now)
                    .map_err(revert)?;
                state.game = Some(game);
                Ok(vec![GameEvent::GameStarted {
                    width,
                    height,
                    mine_count,
                }])
            }
            LedgerCall::RevealCell { x, y } => {
                let game = state
                    .game
                    .as_mut()
                    .ok_or(LedgerError::Reverted("Game not initialized".into()))?;
                let report = game.reveal((x, y), state.placer.as_mut(), now).map_err(revert)?;
                let result = report.result();

                let mut events = vec![GameEvent::CellRevealed {
                    x,
                    y,
                    is_mine: result.is_mine,
                    adjacent_mines: result.adjacent_mines,
                }];
                match report.outcome {
                    RevealOutcome::HitMine => events.push(GameEvent::GameLost {
                        x,
                        y,
                        click_count: game.click_count(),
                    }),
                    RevealOutcome::Won => events.push(GameEvent::GameWon {
                        score: game.score(),
                        click_count: game.click_count(),
                        duration: game.duration_ms(),
                    }),
                    RevealOutcome::Revealed => {}
                }

                let score = game.score();
                if let Some(outcome) = game.outcome()
                    && state.stats.record(outcome)
                {
                    events.push(GameEvent::HighScoreUpdated {
                        new_high_score: score,
                    });
                }
                Ok(events)
            }
        }
    }

    fn require_account(&self) -> Result<(), LedgerError> {
        if self.state().account.is_some() {
            Ok(())
        } else {
            Err(LedgerError::NotConnected)
        }
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    fn provider_available(&self) -> bool {
        self.provider.load(Ordering::SeqCst)
    }

    fn account(&self) -> Option<String> {
        self.state().account.clone()
    }

    async fn connect(&self) -> Result<String, LedgerError> {
        if !self.provider_available() {
            return Err(LedgerError::ProviderMissing);
        }
        self.state().account = Some(ACCOUNT.to_owned());
        Ok(ACCOUNT.to_owned())
    }

    async fn disconnect(&self) {
        self.state().account = None;
    }

    async fn submit(&self, call: LedgerCall) -> Result<TxHash, LedgerError> {
        self.require_account()?;
        let mut state = self.state();
        state.submitted.push(call);
        state.next_tx += 1;
        state.block += 1;
        let tx = TxHash(format!("0x{:064x}", state.next_tx));
        let block_number = state.block;

        let outcome = self.execute(&mut *state, call).map(|events| Receipt {
            tx: tx.clone(),
            block_number,
            events: events
                .into_iter()
                .zip(0..)
                .map(|(event, index)| EventEnvelope {
                    id: EventId::new(block_number, index),
                    event,
                })
                .collect(),
        });
        let delivered = outcome.as_ref().map(|receipt| receipt.events.clone()).unwrap_or_default();
        state.receipts.insert(tx.clone(), outcome);
        let listeners = state.listeners.clone();
        drop(state);

        // handlers may query the ledger again
        let repeat = if self.duplicate_events.load(Ordering::SeqCst) { 2 } else { 1 };
        for _ in 0..repeat {
            for envelope in &delivered {
                listeners.dispatch(envelope);
            }
        }
        Ok(tx)
    }

    async fn confirm(&self, tx: &TxHash) -> Result<Receipt, LedgerError> {
        if self.hang_confirmations.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.state()
            .receipts
            .remove(tx)
            .unwrap_or(Err(LedgerError::Malformed(format!("unknown transaction {tx}"))))
    }

    async fn game_info(&self) -> Result<LedgerGameInfo, LedgerError> {
        self.require_account()?;
        Ok(self.state().game.as_ref().map_or_else(LedgerGameInfo::default, |game| {
            let snapshot = game.snapshot();
            LedgerGameInfo {
                width: snapshot.width,
                height: snapshot.height,
                mine_count: snapshot.mine_count,
                status: snapshot.status,
                score: snapshot.score,
                click_count: snapshot.click_count,
                start_time: snapshot.start_time / 1000,
                end_time: snapshot.end_time / 1000,
                initialized: snapshot.initialized,
            }
        }))
    }

    async fn is_cell_revealed(&self, x: u8, y: u8) -> Result<bool, LedgerError> {
        self.require_account()?;
        match &self.state().game {
            Some(game) => game
                .is_cell_revealed((x, y))
                .map_err(|err| LedgerError::Reverted(err.to_string())),
            None => Ok(false),
        }
    }

    async fn adjacent_mine_count(&self, x: u8, y: u8) -> Result<u8, LedgerError> {
        self.require_account()?;
        match &self.state().game {
            Some(game) => game
                .adjacent_mine_count((x, y))
                .map_err(|err| LedgerError::Reverted(err.to_string())),
            None => Ok(0),
        }
    }

    async fn player_stats(&self) -> Result<PlayerStatsInfo, LedgerError> {
        self.require_account()?;
        Ok(self.state().stats.info())
    }

    fn subscribe(&self, handler: EventHandler) -> SubscriptionId {
        self.state().listeners.subscribe(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.state().listeners.unsubscribe(id);
    }
}

/// Adapter wired to in-memory storage, a manual clock and an optional ledger.
pub struct Harness {
    pub adapter: EngineAdapter,
    pub store: PersistenceStore,
    pub clock: Arc<ManualClock>,
    pub ledger: Option<Arc<FakeLedger>>,
}

impl Harness {
    pub fn local() -> Self {
        Self::build(PersistenceStore::in_memory(), None, GameMode::Local)
    }

    pub fn with_ledger(ledger: impl FnOnce(Arc<ManualClock>) -> FakeLedger, mode: GameMode) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let ledger = Arc::new(ledger(clock.clone()));
        Self::build_with_clock(PersistenceStore::in_memory(), Some(ledger), mode, clock)
    }

    pub fn build(store: PersistenceStore, ledger: Option<Arc<FakeLedger>>, mode: GameMode) -> Self {
        Self::build_with_clock(store, ledger, mode, Arc::new(ManualClock::new(T0)))
    }

    fn build_with_clock(
        store: PersistenceStore,
        ledger: Option<Arc<FakeLedger>>,
        mode: GameMode,
        clock: Arc<ManualClock>,
    ) -> Self {
        let config = EngineConfig {
            default_mode: mode,
            seed: Some(7),
            confirm_timeout_ms: 200,
            ..EngineConfig::default()
        };
        let adapter = EngineAdapter::open(EngineContext {
            config,
            store: store.clone(),
            ledger: ledger.clone().map(|ledger| ledger as Arc<dyn LedgerClient>),
            clock: clock.clone(),
        });
        Self {
            adapter,
            store,
            clock,
            ledger,
        }
    }

    pub fn ledger(&self) -> &FakeLedger {
        self.ledger.as_deref().unwrap()
    }
}

/// Handler collecting every delivered event.
pub fn recorder() -> (EventHandler, Arc<Mutex<Vec<EventEnvelope>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handler: EventHandler = Arc::new(move |envelope: &EventEnvelope| {
        sink.lock().unwrap().push(envelope.clone());
    });
    (handler, seen)
}
