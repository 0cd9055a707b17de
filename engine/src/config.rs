use std::time::Duration;

use chainsweeper_core::ScoringRule;
use chainsweeper_protocol::GameMode;
use serde::{Deserialize, Serialize};

/// Settings shared by both engines. Every field has a default, so a partial
/// TOML/JSON document is enough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Mode used when no mode was saved yet.
    pub default_mode: GameMode,
    /// Scoring rule of the local engine. The ledger always scores flat.
    pub scoring: ScoringRule,
    /// Fixed seed for mine placement, random when unset.
    pub seed: Option<u64>,
    /// How long to wait for a submitted transaction to be confirmed.
    pub confirm_timeout_ms: u64,
}

impl EngineConfig {
    pub const DEFAULT_CONFIRM_TIMEOUT_MS: u64 = 60_000;

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_mode: GameMode::Local,
            scoring: ScoringRule::Weighted,
            seed: None,
            confirm_timeout_ms: Self::DEFAULT_CONFIRM_TIMEOUT_MS,
        }
    }
}
