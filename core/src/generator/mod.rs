use alloc::collections::BTreeSet;

use crate::*;
pub use random::*;

mod random;

/// Produces the mine layout of a new board.
pub trait MinePlacer {
    fn place(&mut self, config: GameConfig, safe_zone: &SafeZone) -> Result<MineLayout>;
}

/// Cells that must stay free of mines: the clicked cell and its neighbours,
/// clipped to the board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SafeZone(BTreeSet<Coord2>);

impl SafeZone {
    /// No restriction, every cell may hold a mine.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn around(center: Coord2, size: Coord2) -> Self {
        let mut cells: BTreeSet<_> = NeighborIter::new(center, size).collect();
        cells.insert(center);
        Self(cells)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.0.contains(&coords)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.0.iter().copied()
    }
}
