use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use chainsweeper_protocol::{GameSnapshot, RevealResult};
use serde::{Deserialize, Serialize};

use crate::*;

/// Kinds of requests a game can receive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Move {
    Start,
    Reveal,
    Flag,
}

/// Whether `mv` is accepted while the game is in `status`.
///
/// Starting is always allowed; every other move needs a game in progress.
/// Finished games report [`GameError::GameAlreadyEnded`] so a stale click can
/// be told apart from one that was never possible.
pub fn check_move(status: GameStatus, mv: Move) -> Result<()> {
    use GameStatus::*;

    match (mv, status) {
        (Move::Start, _) => Ok(()),
        (_, InProgress) => Ok(()),
        (_, NotStarted) => Err(GameError::GameNotInitialized),
        (_, Won | Lost) => Err(GameError::GameAlreadyEnded),
    }
}

pub const fn is_legal_transition(from: GameStatus, to: GameStatus) -> bool {
    use GameStatus::*;

    matches!(
        (from, to),
        (_, InProgress) | (InProgress, Won) | (InProgress, Lost)
    )
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::HitMine | Self::Won)
    }

    pub const fn status(self) -> GameStatus {
        match self {
            Self::Revealed => GameStatus::InProgress,
            Self::HitMine => GameStatus::Lost,
            Self::Won => GameStatus::Won,
        }
    }
}

/// What a single accepted reveal did to the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealReport {
    pub coords: Coord2,
    pub outcome: RevealOutcome,
    /// Adjacent mines of the clicked cell, `0` when it was a mine.
    pub adjacent_mines: u8,
    /// Cells revealed by this move, mines included on a loss.
    pub newly_revealed: Vec<Coord2>,
}

impl RevealReport {
    pub fn result(&self) -> RevealResult {
        RevealResult {
            success: true,
            is_mine: self.outcome == RevealOutcome::HitMine,
            game_status: self.outcome.status(),
            adjacent_mines: self.adjacent_mines,
        }
    }
}

/// Represents a game from start to finish.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    width: Coord,
    height: Coord,
    mine_count: CellCount,
    status: GameStatus,
    board: Board,
    revealed_cells: BTreeSet<Coord2>,
    flagged_cells: BTreeSet<Coord2>,
    mine_positions: BTreeSet<Coord2>,
    click_count: u32,
    score: u32,
    start_time: u64,
    end_time: u64,
    initialized: bool,
    scoring: ScoringRule,
    /// Mines may still be moved out of the first click's safe zone.
    #[serde(default)]
    layout_pending: bool,
}

impl Game {
    /// Starts a game with mines placed right away. The first reveal may still
    /// move mines out of its safe zone, so the first click is never a mine.
    pub fn start<P: MinePlacer + ?Sized>(
        config: GameConfig,
        scoring: ScoringRule,
        placer: &mut P,
        now: u64,
    ) -> Result<Self> {
        let layout = placer.place(config, &SafeZone::none())?;
        let mut game = Self::with_layout(config, layout, scoring, now)?;
        game.layout_pending = true;
        Ok(game)
    }

    /// Starts a game on a fixed layout. No first-click protection applies.
    pub fn with_layout(
        config: GameConfig,
        layout: MineLayout,
        scoring: ScoringRule,
        now: u64,
    ) -> Result<Self> {
        check_layout(config, &layout)?;

        let board = board_from_layout(&layout);
        log::debug!(
            "Game started: {}x{} with {} mines",
            config.width(),
            config.height(),
            config.mines
        );
        Ok(Self {
            width: config.width(),
            height: config.height(),
            mine_count: config.mines,
            status: GameStatus::InProgress,
            board,
            revealed_cells: BTreeSet::new(),
            flagged_cells: BTreeSet::new(),
            mine_positions: layout.into_positions(),
            click_count: 0,
            score: 0,
            start_time: now,
            end_time: 0,
            initialized: true,
            scoring,
            layout_pending: false,
        })
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// `0` until the game is finished.
    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn scoring(&self) -> ScoringRule {
        self.scoring
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn revealed_cells(&self) -> &BTreeSet<Coord2> {
        &self.revealed_cells
    }

    pub fn flagged_cells(&self) -> &BTreeSet<Coord2> {
        &self.flagged_cells
    }

    pub fn mine_positions(&self) -> &BTreeSet<Coord2> {
        &self.mine_positions
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoordinate)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.board[coords.to_nd_index()])
    }

    pub fn is_cell_revealed(&self, coords: Coord2) -> Result<bool> {
        Ok(self.cell_at(coords)?.revealed)
    }

    pub fn is_cell_flagged(&self, coords: Coord2) -> Result<bool> {
        Ok(self.cell_at(coords)?.flagged)
    }

    /// Adjacent mine count of a revealed cell; hidden cells report `0` so the
    /// layout is not leaked before the cell is opened.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> Result<u8> {
        let cell = self.cell_at(coords)?;
        Ok(if cell.revealed && !cell.is_mine {
            cell.adjacent_mines
        } else {
            0
        })
    }

    /// Statistics entry for a finished game.
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.status {
            GameStatus::Won => Some(GameOutcome::Won { score: self.score }),
            GameStatus::Lost => Some(GameOutcome::Lost),
            GameStatus::NotStarted | GameStatus::InProgress => None,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.width,
            height: self.height,
            mine_count: self.mine_count,
            status: self.status,
            score: self.score,
            click_count: self.click_count,
            start_time: self.start_time,
            end_time: self.end_time,
            initialized: self.initialized,
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<bool> {
        check_move(self.status, Move::Flag)?;
        let coords = self.validate_coords(coords)?;

        let cell = &mut self.board[coords.to_nd_index()];
        if cell.revealed {
            return Err(GameError::CellAlreadyRevealed);
        }

        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.flagged_cells.insert(coords);
        } else {
            self.flagged_cells.remove(&coords);
        }
        Ok(cell.flagged)
    }

    pub fn reveal<P: MinePlacer + ?Sized>(
        &mut self,
        coords: Coord2,
        placer: &mut P,
        now: u64,
    ) -> Result<RevealReport> {
        check_move(self.status, Move::Reveal)?;
        let coords = self.validate_coords(coords)?;

        let cell = self.board[coords.to_nd_index()];
        if cell.revealed {
            return Err(GameError::CellAlreadyRevealed);
        }
        if cell.flagged {
            return Err(GameError::CellFlagged);
        }

        if self.layout_pending {
            self.settle_layout(coords, placer)?;
        }

        self.click_count = self.click_count.saturating_add(1);

        if self.mine_positions.contains(&coords) {
            let newly_revealed = self.lose(now);
            return Ok(RevealReport {
                coords,
                outcome: RevealOutcome::HitMine,
                adjacent_mines: 0,
                newly_revealed,
            });
        }

        let newly_revealed = self.flood_fill(coords);
        let points = self
            .scoring
            .cell_points(newly_revealed.len().try_into().unwrap_or(u32::MAX));
        self.score = self.score.saturating_add(points);

        let outcome = if self.revealed_cells.len() == usize::from(self.config().safe_cells()) {
            self.win(now);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        };

        Ok(RevealReport {
            coords,
            outcome,
            adjacent_mines: self.board[coords.to_nd_index()].adjacent_mines,
            newly_revealed,
        })
    }

    /// Checks that the board and the coordinate sets agree. Used to reject
    /// tampered or truncated saved games.
    pub fn is_consistent(&self) -> bool {
        let Ok(config) = GameConfig::new(self.width, self.height, self.mine_count) else {
            return false;
        };
        if board_size(&self.board) != self.size()
            || self.mine_positions.len() != usize::from(self.mine_count)
            || !self.flagged_cells.is_disjoint(&self.revealed_cells)
        {
            return false;
        }

        let cells_agree = iter_coords(self.size()).all(|coords| {
            let cell = self.board[coords.to_nd_index()];
            cell.is_mine == self.mine_positions.contains(&coords)
                && cell.revealed == self.revealed_cells.contains(&coords)
                && cell.flagged == self.flagged_cells.contains(&coords)
        });
        if !cells_agree {
            return false;
        }

        let safe_revealed = self
            .revealed_cells
            .iter()
            .filter(|pos| !self.mine_positions.contains(pos))
            .count();
        let mines_revealed = self.revealed_cells.len() - safe_revealed;
        match self.status {
            GameStatus::NotStarted => false,
            GameStatus::InProgress => {
                mines_revealed == 0 && safe_revealed < usize::from(config.safe_cells())
            }
            GameStatus::Won => {
                mines_revealed == 0 && safe_revealed == usize::from(config.safe_cells())
            }
            GameStatus::Lost => mines_revealed == self.mine_positions.len(),
        }
    }

    /// Redraws the layout when the first click's safe zone holds a mine.
    fn settle_layout<P: MinePlacer + ?Sized>(&mut self, coords: Coord2, placer: &mut P) -> Result<()> {
        let safe_zone = SafeZone::around(coords, self.size());
        if safe_zone.iter().any(|pos| self.mine_positions.contains(&pos)) {
            let layout = placer.place(self.config(), &safe_zone)?;
            check_layout(self.config(), &layout)?;
            if layout.positions().any(|pos| safe_zone.contains(pos)) {
                log::warn!("Mine placer ignored the safe zone around {:?}", coords);
            }

            for cell in self.board.iter_mut() {
                cell.is_mine = false;
            }
            for pos in layout.positions() {
                self.board[pos.to_nd_index()].is_mine = true;
            }
            self.mine_positions = layout.into_positions();
            log::debug!("Moved mines away from first click at {:?}", coords);
        }
        self.layout_pending = false;
        Ok(())
    }

    /// Iterative 8-connected fill. Zero cells expand, numbered cells are
    /// revealed but do not expand, flagged cells are left alone.
    fn flood_fill(&mut self, start: Coord2) -> Vec<Coord2> {
        let size = self.size();
        let mut newly_revealed = Vec::new();
        let mut visited = BTreeSet::from([start]);
        let mut to_visit = VecDeque::from([start]);

        while let Some(visit_coords) = to_visit.pop_front() {
            let cell = &mut self.board[visit_coords.to_nd_index()];
            if !cell.is_hidden() || cell.is_mine {
                continue;
            }

            let adjacent_mines = count_adjacent(&self.mine_positions, visit_coords, size);
            cell.revealed = true;
            cell.adjacent_mines = adjacent_mines;
            self.revealed_cells.insert(visit_coords);
            newly_revealed.push(visit_coords);

            if adjacent_mines == 0 {
                to_visit.extend(
                    NeighborIter::new(visit_coords, size).filter(|&pos| visited.insert(pos)),
                );
            }
        }

        newly_revealed
    }

    fn lose(&mut self, now: u64) -> Vec<Coord2> {
        self.transition(GameStatus::Lost, now);

        let mut newly_revealed = Vec::with_capacity(self.mine_positions.len());
        for &pos in &self.mine_positions {
            let cell = &mut self.board[pos.to_nd_index()];
            cell.revealed = true;
            cell.flagged = false;
            self.flagged_cells.remove(&pos);
            if self.revealed_cells.insert(pos) {
                newly_revealed.push(pos);
            }
        }
        newly_revealed
    }

    fn win(&mut self, now: u64) {
        let bonus = self.scoring.win_bonus(WinContext {
            size: self.size(),
            click_count: self.click_count,
            duration_ms: now.saturating_sub(self.start_time),
        });
        self.score = self.score.saturating_add(bonus);
        self.transition(GameStatus::Won, now);
    }

    fn transition(&mut self, next: GameStatus, now: u64) {
        debug_assert!(is_legal_transition(self.status, next));
        log::debug!("Game status {:?} -> {:?}", self.status, next);
        self.status = next;
        if next.is_finished() {
            self.end_time = now;
        }
    }
}

fn check_layout(config: GameConfig, layout: &MineLayout) -> Result<()> {
    if layout.size() != config.size {
        return Err(GameError::InvalidDimension);
    }
    if layout.mine_count() != config.mines {
        return Err(GameError::InvalidMineCount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const T0: u64 = 1_700_000_000_000;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    fn fixed_game(size: Coord2, mines: &[Coord2]) -> Game {
        let config = GameConfig::new(size.0, size.1, mines.len() as CellCount).unwrap();
        Game::with_layout(config, layout(size, mines), ScoringRule::Flat, T0).unwrap()
    }

    fn seeded_game(width: Coord, height: Coord, mines: CellCount, seed: u64) -> (Game, RandomMinePlacer<SmallRng>) {
        let mut placer = RandomMinePlacer::new(SmallRng::seed_from_u64(seed));
        let config = GameConfig::new(width, height, mines).unwrap();
        let game = Game::start(config, ScoringRule::Weighted, &mut placer, T0).unwrap();
        (game, placer)
    }

    /// Five mines forming a wall on column 2.
    const WALL: [Coord2; 5] = [(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)];

    #[test]
    fn start_sets_up_a_game_in_progress() {
        let (game, _) = seeded_game(8, 8, 10, 1);
        let snapshot = game.snapshot();

        assert!(snapshot.initialized);
        assert_eq!((snapshot.width, snapshot.height, snapshot.mine_count), (8, 8, 10));
        assert_eq!(snapshot.status, GameStatus::InProgress);
        assert_eq!(snapshot.start_time, T0);
        assert_eq!(snapshot.end_time, 0);
        assert_eq!(game.mine_positions().len(), 10);
        assert!(game.is_consistent());
    }

    #[test]
    fn first_click_is_never_a_mine() {
        for seed in 0..200 {
            let (mut game, mut placer) = seeded_game(8, 8, 19, seed);
            let first = ((seed % 8) as Coord, (seed / 8 % 8) as Coord);

            let report = game.reveal(first, &mut placer, T0 + 1).unwrap();

            assert_ne!(report.outcome, RevealOutcome::HitMine, "seed {seed}");
            assert_eq!(report.adjacent_mines, 0, "seed {seed}");
            assert_eq!(game.mine_positions().len(), 19);
            assert!(SafeZone::around(first, (8, 8))
                .iter()
                .all(|pos| !game.mine_positions().contains(&pos)));
            assert!(game.is_consistent());
        }
    }

    #[test]
    fn reveal_on_fresh_game_scores_and_stays_in_progress() {
        let (mut game, mut placer) = seeded_game(8, 8, 10, 11);

        let report = game.reveal((0, 0), &mut placer, T0 + 1).unwrap();

        assert!(!report.result().is_mine);
        assert!(game.score() >= 1);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.click_count(), 1);
    }

    #[test]
    fn flood_fill_stops_at_numbered_border() {
        let mut game = fixed_game((5, 5), &WALL);
        let mut placer = FixedMinePlacer(layout((5, 5), &WALL));

        let report = game.reveal((0, 0), &mut placer, T0 + 1).unwrap();

        assert_eq!(report.outcome, RevealOutcome::Revealed);
        assert_eq!(report.newly_revealed.len(), 10);
        let expected: BTreeSet<Coord2> = (0..2).flat_map(|x| (0..5).map(move |y| (x, y))).collect();
        assert_eq!(game.revealed_cells(), &expected);
        assert_eq!(game.cell_at((0, 2)).unwrap().adjacent_mines, 0);
        assert_eq!(game.cell_at((1, 0)).unwrap().adjacent_mines, 2);
        assert_eq!(game.cell_at((1, 2)).unwrap().adjacent_mines, 3);
        assert!(!game.is_cell_revealed((3, 2)).unwrap());
        assert!(!game.is_cell_revealed((4, 2)).unwrap());
        assert_eq!(game.score(), 10);
    }

    #[test]
    fn numbered_cell_reveals_only_itself() {
        let mut game = fixed_game((5, 5), &WALL);
        let mut placer = FixedMinePlacer(layout((5, 5), &WALL));

        let report = game.reveal((3, 2), &mut placer, T0 + 1).unwrap();

        assert_eq!(report.newly_revealed, [(3, 2)]);
        assert_eq!(report.adjacent_mines, 3);
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let mut game = fixed_game((5, 5), &WALL);
        let mut placer = FixedMinePlacer(layout((5, 5), &WALL));

        game.toggle_flag((0, 4)).unwrap();
        game.reveal((0, 0), &mut placer, T0 + 1).unwrap();

        assert!(!game.is_cell_revealed((0, 4)).unwrap());
        assert!(game.is_cell_flagged((0, 4)).unwrap());
        assert_eq!(game.revealed_cells().len(), 9);
        assert!(game.is_consistent());
    }

    #[test]
    fn revealing_a_mine_loses_and_shows_all_mines() {
        let (mut game, mut placer) = seeded_game(8, 8, 10, 5);
        game.reveal((0, 0), &mut placer, T0 + 1).unwrap();
        let mine = *game.mine_positions().iter().next().unwrap();
        game.toggle_flag(*game.mine_positions().iter().last().unwrap()).unwrap();

        let report = game.reveal(mine, &mut placer, T0 + 2).unwrap();

        assert!(report.result().is_mine);
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(game.end_time(), T0 + 2);
        assert!(game.mine_positions().is_subset(game.revealed_cells()));
        assert!(game.flagged_cells().is_disjoint(game.revealed_cells()));
        assert_eq!(game.outcome(), Some(GameOutcome::Lost));
        assert!(game.is_consistent());
    }

    #[test]
    fn fixed_layout_first_click_can_hit_mine() {
        let mut game = fixed_game((5, 5), &WALL);
        let mut placer = FixedMinePlacer(layout((5, 5), &WALL));

        let report = game.reveal((2, 2), &mut placer, T0 + 1).unwrap();

        assert_eq!(report.outcome, RevealOutcome::HitMine);
        assert_eq!(report.adjacent_mines, 0);
        assert_eq!(game.revealed_cells().len(), 5);
    }

    #[test]
    fn win_happens_exactly_when_all_safe_cells_are_revealed() {
        let mines = [(0, 0), (2, 2), (4, 4)];
        let mut game = fixed_game((5, 5), &mines);
        let mut placer = FixedMinePlacer(layout((5, 5), &mines));

        for coords in iter_coords((5, 5)) {
            if mines.contains(&coords) || game.is_cell_revealed(coords).unwrap() {
                continue;
            }
            let before = game.score();
            game.reveal(coords, &mut placer, T0 + 10).unwrap();
            assert!(game.score() >= before);

            let all_revealed = game.revealed_cells().len() == 22;
            assert_eq!(game.status() == GameStatus::Won, all_revealed);
        }

        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.end_time(), T0 + 10);
        // flat rule: one point per cell plus the bonus
        assert_eq!(game.score(), 22 + 5);
        assert_eq!(game.outcome(), Some(GameOutcome::Won { score: 27 }));
        assert!(game.is_consistent());
    }

    #[test]
    fn finished_game_rejects_moves_without_changes() {
        let mut game = fixed_game((5, 5), &WALL);
        let mut placer = FixedMinePlacer(layout((5, 5), &WALL));
        game.reveal((2, 0), &mut placer, T0 + 1).unwrap();
        let frozen = game.clone();

        assert_eq!(
            game.reveal((0, 0), &mut placer, T0 + 2),
            Err(GameError::GameAlreadyEnded)
        );
        assert_eq!(game.toggle_flag((4, 4)), Err(GameError::GameAlreadyEnded));
        assert_eq!(game, frozen);
    }

    #[test]
    fn flags_toggle_back_to_original_state() {
        let (mut game, _) = seeded_game(8, 8, 10, 2);
        let before = game.flagged_cells().clone();

        assert_eq!(game.toggle_flag((3, 3)), Ok(true));
        assert!(game.flagged_cells().contains(&(3, 3)));
        assert_eq!(game.toggle_flag((3, 3)), Ok(false));

        assert_eq!(game.flagged_cells(), &before);
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let mut game = fixed_game((5, 5), &WALL);
        let mut placer = FixedMinePlacer(layout((5, 5), &WALL));

        assert_eq!(
            game.reveal((5, 0), &mut placer, T0),
            Err(GameError::InvalidCoordinate)
        );
        assert_eq!(game.toggle_flag((0, 5)), Err(GameError::InvalidCoordinate));

        game.toggle_flag((0, 0)).unwrap();
        assert_eq!(game.reveal((0, 0), &mut placer, T0), Err(GameError::CellFlagged));

        game.reveal((4, 4), &mut placer, T0).unwrap();
        assert_eq!(
            game.reveal((4, 4), &mut placer, T0),
            Err(GameError::CellAlreadyRevealed)
        );
        assert_eq!(game.toggle_flag((4, 4)), Err(GameError::CellAlreadyRevealed));
        assert_eq!(game.click_count(), 1);
    }

    #[test]
    fn hidden_cells_do_not_leak_counts() {
        let mut game = fixed_game((5, 5), &WALL);
        let mut placer = FixedMinePlacer(layout((5, 5), &WALL));

        assert_eq!(game.adjacent_mine_count((1, 2)), Ok(0));
        game.reveal((1, 2), &mut placer, T0).unwrap();
        assert_eq!(game.adjacent_mine_count((1, 2)), Ok(3));
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        use GameStatus::*;

        assert!(is_legal_transition(NotStarted, InProgress));
        assert!(is_legal_transition(InProgress, Won));
        assert!(is_legal_transition(Lost, InProgress));
        assert!(!is_legal_transition(Won, Lost));
        assert!(!is_legal_transition(NotStarted, Won));

        assert_eq!(check_move(NotStarted, Move::Reveal), Err(GameError::GameNotInitialized));
        assert_eq!(check_move(Won, Move::Flag), Err(GameError::GameAlreadyEnded));
        assert_eq!(check_move(Lost, Move::Start), Ok(()));
    }

    #[test]
    fn saved_game_keeps_sets_and_detects_tampering() {
        let (mut game, mut placer) = seeded_game(6, 6, 5, 9);
        game.reveal((0, 0), &mut placer, T0 + 1).unwrap();

        let json = serde_json::to_value(&game).unwrap();
        assert!(json["revealedCells"].is_array());
        assert!(json["minePositions"].is_array());
        let restored: Game = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored, game);
        assert!(restored.is_consistent());

        let mut tampered = json;
        tampered["mineCount"] = 7.into();
        let tampered: Game = serde_json::from_value(tampered).unwrap();
        assert!(!tampered.is_consistent());
    }
}
