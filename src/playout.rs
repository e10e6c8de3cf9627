//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays policy moves for both colors, alternating, until every
//! cell is owned. The board fills monotonically, so a playout always ends
//! within 225 placements.

use crate::board::{Board, Color};
use crate::policy::{choose_move, CellOrder};

/// Play random moves from `board` until the game is finished and return the winner.
///
/// `to_move` is the color that moves first. Each color gets its own
/// exploration cursor: a cell is only discarded from a cursor once it is
/// illegal for that color, so when both strategies come up empty every empty
/// cell would have to be both unreachable and unexplorable, which cannot
/// happen on an unfinished board.
pub fn mcplayout(board: &mut Board, to_move: Color, p_explore: f64, rng: &mut fastrand::Rng) -> Color {
    let mut cursors = [CellOrder::shuffled(rng), CellOrder::shuffled(rng)];
    let order = CellOrder::shuffled(rng);
    let mut color = to_move;
    let mut placements = 0;

    while !board.game_finished() {
        let cursor = &mut cursors[color as usize];
        let Some(mv) = choose_move(board, color, cursor, &order, p_explore, rng) else {
            panic!(
                "no move for {color} on an unfinished board ({} white, {} black stones)",
                board.num_stones(Color::White),
                board.num_stones(Color::Black)
            );
        };
        placements += mv.len();
        board.set_move(&mv, color);
        color = color.opponent();
    }

    log::trace!(
        "playout placed {placements} stones, {} {} - {} {}",
        Color::White,
        board.score(Color::White),
        Color::Black,
        board.score(Color::Black)
    );
    board.winner()
}
