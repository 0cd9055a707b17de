use serde::{Deserialize, Serialize};

use crate::*;

/// Games finished faster than this earn a time bonus.
pub const TIME_BONUS_WINDOW_MS: u64 = 300_000;

/// How a game's score is computed.
///
/// Both rules award [`limits::CELL_SCORE`] per safely revealed cell while the
/// game runs and only add to the score at the winning transition, so scores
/// never decrease and stop changing once the game is over.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringRule {
    /// Ledger accounting: a fixed [`limits::WIN_BONUS`] on top of the cell points.
    Flat,
    /// Local accounting: a board-size base plus time and click-efficiency bonuses.
    #[default]
    Weighted,
}

/// Inputs for the winning bonus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WinContext {
    pub size: Coord2,
    pub click_count: u32,
    pub duration_ms: u64,
}

impl ScoringRule {
    pub fn cell_points(self, newly_revealed: u32) -> u32 {
        newly_revealed.saturating_mul(limits::CELL_SCORE)
    }

    pub fn win_bonus(self, ctx: WinContext) -> u32 {
        match self {
            Self::Flat => limits::WIN_BONUS,
            Self::Weighted => weighted_bonus(ctx),
        }
    }
}

/// `area·10 + round(2·time_bonus + 50·area/clicks)` where `time_bonus` is the
/// number of seconds left in the bonus window. Integer arithmetic only.
fn weighted_bonus(ctx: WinContext) -> u32 {
    let area = u64::from(mult(ctx.size.0, ctx.size.1));
    let clicks = u64::from(ctx.click_count.max(1));
    let remaining_ms = TIME_BONUS_WINDOW_MS.saturating_sub(ctx.duration_ms);

    // 2·remaining/1000 + 50·area/clicks over the common denominator 500·clicks
    let numerator = remaining_ms * clicks + 25_000 * area;
    let denominator = 500 * clicks;
    let rounded = (2 * numerator + denominator) / (2 * denominator);

    u32::try_from(area * 10 + rounded).unwrap_or(u32::MAX)
}
