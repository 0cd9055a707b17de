use chainsweeper_protocol::PlayerStatsInfo;
use serde::{Deserialize, Serialize};

/// How a finished game ended, as far as statistics are concerned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Won { score: u32 },
    Lost,
}

/// Cumulative totals for one player.
///
/// The win rate is deliberately not stored; it is derived from the two
/// counters whenever it is read.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_games_played: u32,
    pub games_won: u32,
    pub current_high_score: u32,
}

impl PlayerStats {
    /// Records one terminal transition. Returns `true` when the high score
    /// was raised.
    pub fn record(&mut self, outcome: GameOutcome) -> bool {
        self.total_games_played = self.total_games_played.saturating_add(1);
        match outcome {
            GameOutcome::Won { score } => {
                self.games_won = self.games_won.saturating_add(1);
                if score > self.current_high_score {
                    self.current_high_score = score;
                    return true;
                }
                false
            }
            GameOutcome::Lost => false,
        }
    }

    /// Wins never exceed games played.
    pub fn is_consistent(&self) -> bool {
        self.games_won <= self.total_games_played
    }

    /// `round(100·won/played)`, `0` before any game finished.
    pub fn win_rate(&self) -> u8 {
        let played = u64::from(self.total_games_played);
        if played == 0 {
            return 0;
        }
        let won = u64::from(self.games_won.min(self.total_games_played));
        ((200 * won + played) / (2 * played)) as u8
    }

    pub fn info(&self) -> PlayerStatsInfo {
        PlayerStatsInfo {
            total_games_played: self.total_games_played,
            games_won: self.games_won,
            current_high_score: self.current_high_score,
            win_rate: self.win_rate(),
        }
    }
}
