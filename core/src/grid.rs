use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// State of a single board cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub revealed: bool,
    pub is_mine: bool,
    /// Only meaningful once the cell was revealed.
    pub adjacent_mines: u8,
    pub flagged: bool,
}

impl Cell {
    /// Hidden and unflagged, so a reveal can be attempted.
    pub const fn is_hidden(self) -> bool {
        !self.revealed && !self.flagged
    }
}

pub type Board = Array2<Cell>;

/// A `width`×`height` board of default cells, indexed by `(x, y)`.
pub fn create_empty_board(width: Coord, height: Coord) -> Board {
    Array2::default((width, height).to_nd_index())
}

/// Board with mine cells marked from `layout`.
pub fn board_from_layout(layout: &MineLayout) -> Board {
    let (width, height) = layout.size();
    let mut board = create_empty_board(width, height);
    for coords in layout.positions() {
        board[coords.to_nd_index()].is_mine = true;
    }
    board
}

pub fn board_size(board: &Board) -> Coord2 {
    let (x, y) = board.dim();
    (
        Coord::try_from(x).unwrap_or(Coord::MAX),
        Coord::try_from(y).unwrap_or(Coord::MAX),
    )
}
