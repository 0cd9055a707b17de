use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use rand::Rng;
use rand::seq::index;

use super::*;

/// Draws `mine_count` distinct coordinates uniformly at random from the cells
/// outside `safe_zone`.
pub fn generate_mine_positions<R: Rng + ?Sized>(
    width: Coord,
    height: Coord,
    mine_count: CellCount,
    safe_zone: &SafeZone,
    rng: &mut R,
) -> Result<BTreeSet<Coord2>> {
    let candidates: Vec<Coord2> = iter_coords((width, height))
        .filter(|&coords| !safe_zone.contains(coords))
        .collect();

    let mine_count = usize::from(mine_count);
    if mine_count > candidates.len() {
        log::warn!(
            "Cannot place {} mines outside a safe zone of {} cells on a {}x{} board",
            mine_count,
            safe_zone.len(),
            width,
            height
        );
        return Err(GameError::InvalidMineCount);
    }

    let positions: BTreeSet<Coord2> = index::sample(rng, candidates.len(), mine_count)
        .into_iter()
        .map(|i| candidates[i])
        .collect();

    // double check mine count
    if positions.len() != mine_count {
        log::warn!(
            "Generated mine count mismatch, actual: {}, requested: {}",
            positions.len(),
            mine_count
        );
    }
    Ok(positions)
}

/// Uniform placement driven by an injected random source.
#[derive(Clone, Debug)]
pub struct RandomMinePlacer<R> {
    rng: R,
}

impl<R: Rng> RandomMinePlacer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> MinePlacer for RandomMinePlacer<R> {
    fn place(&mut self, config: GameConfig, safe_zone: &SafeZone) -> Result<MineLayout> {
        let positions = generate_mine_positions(
            config.width(),
            config.height(),
            config.mines,
            safe_zone,
            &mut self.rng,
        )?;
        Ok(MineLayout::from_positions(config.size, positions))
    }
}

/// Always returns the same layout, regardless of the safe zone.
#[derive(Clone, Debug)]
pub struct FixedMinePlacer(pub MineLayout);

impl MinePlacer for FixedMinePlacer {
    fn place(&mut self, _config: GameConfig, _safe_zone: &SafeZone) -> Result<MineLayout> {
        Ok(self.0.clone())
    }
}
