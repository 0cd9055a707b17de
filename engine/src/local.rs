use std::sync::Arc;

use chainsweeper_core::{
    Cell, CellCount, Coord, Game, GameConfig, GameError, GameOutcome, MinePlacer, PlayerStats,
    RevealOutcome, ScoringRule,
};
use chainsweeper_protocol::{FlagResult, GameEvent, GameMode, GameSnapshot, PlayerStatsInfo, RevealResult};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::events::{EventHandler, Listeners, SubscriptionId, deduplicated};
use crate::persistence::PersistenceStore;
use crate::{EngineError, Result};

/// Version written into [`ExportBundle`].
pub const EXPORT_VERSION: u32 = 1;

/// Everything the local engine keeps, for backups and moving devices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: u32,
    pub mode: GameMode,
    pub exported_at: u64,
    pub game: Option<Game>,
    pub stats: PlayerStats,
}

/// In-process engine. Owns the current game and the player's statistics and
/// writes both through to storage after every accepted move.
pub struct LocalEngine {
    game: Option<Game>,
    stats: PlayerStats,
    store: PersistenceStore,
    placer: Box<dyn MinePlacer + Send>,
    clock: Arc<dyn Clock>,
    scoring: ScoringRule,
    listeners: Listeners,
}

impl LocalEngine {
    /// Restores the saved game and statistics from `store`.
    pub fn open(
        store: PersistenceStore,
        placer: Box<dyn MinePlacer + Send>,
        clock: Arc<dyn Clock>,
        scoring: ScoringRule,
    ) -> Self {
        let game = store.load_game();
        let stats = store.load_stats();
        if let Some(game) = &game {
            log::info!(
                "Restored {}x{} game, status {:?}",
                game.size().0,
                game.size().1,
                game.status()
            );
        }
        Self {
            game,
            stats,
            store,
            placer,
            clock,
            scoring,
            listeners: Listeners::new(),
        }
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn scoring(&self) -> ScoringRule {
        self.scoring
    }

    fn current_game(&self) -> Result<&Game> {
        self.game.as_ref().ok_or(EngineError::Game(GameError::GameNotInitialized))
    }

    /// Replaces any previous game, finished or not, with a fresh one.
    pub fn start_game(&mut self, width: Coord, height: Coord, mines: CellCount) -> Result<GameSnapshot> {
        let config = GameConfig::new(width, height, mines)?;
        let game = Game::start(config, self.scoring, self.placer.as_mut(), self.clock.now_ms())?;

        if self.game.as_ref().is_some_and(|previous| previous.status().is_in_progress()) {
            log::debug!("Abandoning unfinished game");
        }
        let snapshot = game.snapshot();
        self.store.save(&game);
        self.game = Some(game);

        self.listeners.emit(GameEvent::GameStarted {
            width,
            height,
            mine_count: mines,
        });
        Ok(snapshot)
    }

    pub fn reveal_cell(&mut self, x: Coord, y: Coord) -> Result<RevealResult> {
        let now = self.clock.now_ms();
        let game = self
            .game
            .as_mut()
            .ok_or(EngineError::Game(GameError::GameNotInitialized))?;
        let report = game.reveal((x, y), self.placer.as_mut(), now)?;

        let click_count = game.click_count();
        let score = game.score();
        let duration = game.duration_ms();
        let outcome = game.outcome();
        self.store.save(&*game);

        let high_score_raised = match outcome {
            Some(outcome) => {
                let raised = self.stats.record(outcome);
                self.store.save(&self.stats);
                log::info!("Game finished: {:?}, stats {:?}", outcome, self.stats);
                raised
            }
            None => false,
        };

        let result = report.result();
        self.listeners.emit(GameEvent::CellRevealed {
            x,
            y,
            is_mine: result.is_mine,
            adjacent_mines: result.adjacent_mines,
        });
        match report.outcome {
            RevealOutcome::HitMine => self.listeners.emit(GameEvent::GameLost { x, y, click_count }),
            RevealOutcome::Won => self.listeners.emit(GameEvent::GameWon {
                score,
                click_count,
                duration,
            }),
            RevealOutcome::Revealed => {}
        }
        if high_score_raised {
            self.listeners.emit(GameEvent::HighScoreUpdated { new_high_score: score });
        }

        Ok(result)
    }

    pub fn toggle_flag(&mut self, x: Coord, y: Coord) -> Result<FlagResult> {
        let game = self
            .game
            .as_mut()
            .ok_or(EngineError::Game(GameError::GameNotInitialized))?;
        let flagged = game.toggle_flag((x, y))?;
        self.store.save(&*game);
        Ok(FlagResult {
            success: true,
            flagged,
        })
    }

    pub fn game_info(&self) -> GameSnapshot {
        self.game.as_ref().map_or_else(GameSnapshot::empty, Game::snapshot)
    }

    pub fn cell(&self, x: Coord, y: Coord) -> Result<Cell> {
        Ok(self.current_game()?.cell_at((x, y))?)
    }

    pub fn is_cell_revealed(&self, x: Coord, y: Coord) -> Result<bool> {
        Ok(self.current_game()?.is_cell_revealed((x, y))?)
    }

    pub fn is_cell_flagged(&self, x: Coord, y: Coord) -> Result<bool> {
        Ok(self.current_game()?.is_cell_flagged((x, y))?)
    }

    pub fn adjacent_mine_count(&self, x: Coord, y: Coord) -> Result<u8> {
        Ok(self.current_game()?.adjacent_mine_count((x, y))?)
    }

    pub fn player_stats(&self) -> PlayerStatsInfo {
        self.stats.info()
    }

    pub fn subscribe(&mut self, handler: EventHandler) -> SubscriptionId {
        self.listeners.subscribe(deduplicated(handler))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn unsubscribe_all(&mut self) {
        self.listeners.clear();
    }

    /// Forgets the current game and zeroes the statistics, in memory and in
    /// storage.
    pub fn reset(&mut self) {
        self.game = None;
        self.stats = PlayerStats::default();
        self.store.clear::<Game>();
        self.store.clear::<PlayerStats>();
        log::info!("Local game data cleared");
    }

    pub fn export(&self) -> ExportBundle {
        ExportBundle {
            version: EXPORT_VERSION,
            mode: GameMode::Local,
            exported_at: self.clock.now_ms(),
            game: self.game.clone(),
            stats: self.stats,
        }
    }

    /// Replaces the game and statistics with the bundle's. Nothing changes
    /// when the bundle is rejected.
    pub fn import(&mut self, bundle: ExportBundle) -> Result<()> {
        if bundle.version != EXPORT_VERSION {
            return Err(EngineError::InvalidImport("unsupported export version"));
        }
        if bundle.mode != GameMode::Local {
            return Err(EngineError::InvalidImport("not a local export"));
        }
        if bundle.game.as_ref().is_some_and(|game| !game.is_consistent()) {
            return Err(EngineError::InvalidImport("inconsistent game state"));
        }
        if !bundle.stats.is_consistent() {
            return Err(EngineError::InvalidImport("more games won than played"));
        }

        match &bundle.game {
            Some(game) => self.store.save(game),
            None => self.store.clear::<Game>(),
        }
        self.store.save(&bundle.stats);
        self.game = bundle.game;
        self.stats = bundle.stats;
        log::info!("Imported local game data");
        Ok(())
    }

    /// Statistics entry the current game would record, if it is finished.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.game.as_ref().and_then(Game::outcome)
    }
}
