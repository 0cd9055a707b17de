//! Minesweeper rules: board model, mine placement, cascading reveal, scoring,
//! the game state machine and cumulative player statistics.
//!
//! The crate holds no clock and no global randomness. Callers pass the
//! current time in unix milliseconds and an [`rand::Rng`] to every operation
//! that needs one.

#![no_std]

extern crate alloc;

use alloc::collections::BTreeSet;
use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

pub use chainsweeper_protocol::{GameStatus, limits};
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use scoring::*;
pub use stats::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod grid;
mod scoring;
mod stats;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates the board dimensions and the mine density.
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        let sizes = limits::MIN_SIZE..=limits::MAX_SIZE;
        if !sizes.contains(&width) || !sizes.contains(&height) {
            return Err(GameError::InvalidDimension);
        }

        let total_cells = mult(width, height);
        if !Self::mine_range(total_cells).contains(&mines) || mines >= total_cells {
            return Err(GameError::InvalidMineCount);
        }

        Ok(Self::new_unchecked((width, height), mines))
    }

    /// Accepted mine counts for a board of `total_cells`: at least 10% rounded
    /// up, at most 30% rounded down.
    pub const fn mine_range(total_cells: CellCount) -> RangeInclusive<CellCount> {
        let total = total_cells as u32;
        let min = (total * limits::MIN_MINE_RATE as u32).div_ceil(100);
        let max = total * limits::MAX_MINE_RATE as u32 / 100;
        (min as CellCount)..=(max as CellCount)
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

/// Preset board configurations offered by the UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked((8, 8), 10),
            Self::Medium => GameConfig::new_unchecked((12, 12), 21),
            Self::Hard => GameConfig::new_unchecked((16, 16), 51),
            Self::Expert => GameConfig::new_unchecked((20, 20), 100),
        }
    }
}

/// A concrete set of mine positions on a board of known size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineLayout {
    size: Coord2,
    positions: BTreeSet<Coord2>,
}

impl MineLayout {
    pub(crate) fn from_positions(size: Coord2, positions: BTreeSet<Coord2>) -> Self {
        Self { size, positions }
    }

    /// Fixed layout, mainly for tests and replays. Duplicates collapse.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut positions = BTreeSet::new();
        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoordinate);
            }
            positions.insert(coords);
        }
        Ok(Self { size, positions })
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.positions.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn positions(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.positions.iter().copied()
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.positions.contains(&coords)
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        count_adjacent(&self.positions, coords, self.size)
    }

    pub fn into_positions(self) -> BTreeSet<Coord2> {
        self.positions
    }
}

/// Mines in the 3×3 neighbourhood of `coords`, excluding the cell itself.
pub fn count_adjacent(mines: &BTreeSet<Coord2>, coords: Coord2, size: Coord2) -> u8 {
    let count = NeighborIter::new(coords, size)
        .filter(|pos| mines.contains(pos))
        .count();
    // at most eight neighbours
    count as u8
}
