//! Randomized move generation.
//!
//! Two kinds of move exist:
//! - An *exploration* places one stone with no friendly neighbor, starting a
//!   new group.
//! - An *expansion* places one stone next to each of several friendly groups
//!   at once. A group may be extended at most once per move, and a stone that
//!   touches several groups merges them and uses them all up.
//!
//! The same [`choose_move`] drives rollouts, the baseline random agent, and
//! child creation in the search tree.

use crate::board::{point, Board, Color};
use crate::constants::NUM_CELLS;
use crate::moves::Move;

/// A random permutation of all cell indices.
///
/// Used either as a cursor that is consumed one cell at a time
/// ([`CellOrder::pop`]) or as a read-only scan order ([`CellOrder::iter`]).
#[derive(Clone, Debug)]
pub struct CellOrder {
    cells: Vec<u8>,
}

impl CellOrder {
    pub fn shuffled(rng: &mut fastrand::Rng) -> Self {
        let mut order = Self { cells: Vec::new() };
        order.reshuffle(rng);
        order
    }

    /// An order with exactly the given cells, popped from the back.
    pub fn from_indices(cells: &[usize]) -> Self {
        Self {
            cells: cells.iter().map(|&i| i as u8).collect(),
        }
    }

    /// Refill with every cell and shuffle.
    pub fn reshuffle(&mut self, rng: &mut fastrand::Rng) {
        self.cells.clear();
        self.cells.extend(0..NUM_CELLS as u8);
        rng.shuffle(&mut self.cells);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.cells.pop().map(usize::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().map(|&i| usize::from(i))
    }

    pub fn is_exhausted(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    Exploration,
    Expansion,
}

/// Pop cells from `cursor` until one is a legal exploration for `color`.
///
/// Returns `None` once the cursor runs dry. Cells rejected on the way are
/// consumed; they cannot become legal again because stones are never removed.
pub fn generate_exploration(board: &Board, color: Color, cursor: &mut CellOrder) -> Option<Move> {
    while let Some(idx) = cursor.pop() {
        if board.legal_exploration_at(color, idx) {
            return Some(Move::single(point(idx)));
        }
    }
    None
}

/// Scan `order` once and build an expansion move for `color`.
///
/// Returns `None` when no empty cell touches a friendly group.
pub fn generate_expansion(board: &Board, color: Color, order: &CellOrder) -> Option<Move> {
    let mut claimed = vec![false; board.max_group_id() as usize + 1];
    let mut mv = Move::default();

    for idx in order.iter() {
        let cell = board.cell(idx);
        if cell.owner.is_some() {
            continue;
        }

        let mut adjacent = [0u16; 4];
        let mut num_adjacent = 0;
        for n in cell.neighbors().into_iter().flatten() {
            let neighbor = board.cell(n);
            if neighbor.owner == Some(color) && !adjacent[..num_adjacent].contains(&neighbor.group) {
                adjacent[num_adjacent] = neighbor.group;
                num_adjacent += 1;
            }
        }
        let adjacent = &adjacent[..num_adjacent];

        // A merge point needs every group it touches to still be unused
        if adjacent.is_empty() || adjacent.iter().any(|&g| claimed[g as usize]) {
            continue;
        }
        for &g in adjacent {
            claimed[g as usize] = true;
        }
        mv.push(cell.point());
    }

    (!mv.is_empty()).then_some(mv)
}

/// Decide which strategy to try first.
///
/// A color without stones has nothing to expand, so it always explores first.
pub fn strategy_order(
    board: &Board,
    color: Color,
    p_explore: f64,
    rng: &mut fastrand::Rng,
) -> [Strategy; 2] {
    if board.num_stones(color) == 0 || rng.f64() < p_explore {
        [Strategy::Exploration, Strategy::Expansion]
    } else {
        [Strategy::Expansion, Strategy::Exploration]
    }
}

pub fn generate(
    strategy: Strategy,
    board: &Board,
    color: Color,
    cursor: &mut CellOrder,
    order: &CellOrder,
) -> Option<Move> {
    match strategy {
        Strategy::Exploration => generate_exploration(board, color, cursor),
        Strategy::Expansion => generate_expansion(board, color, order),
    }
}

/// Pick a random legal move, falling back to the other strategy when the
/// first one is exhausted. `None` means neither strategy produced a move.
pub fn choose_move(
    board: &Board,
    color: Color,
    cursor: &mut CellOrder,
    order: &CellOrder,
    p_explore: f64,
    rng: &mut fastrand::Rng,
) -> Option<Move> {
    strategy_order(board, color, p_explore, rng)
        .into_iter()
        .find_map(|strategy| generate(strategy, board, color, cursor, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::index;

    fn identity_order() -> CellOrder {
        // Popping from the back visits the highest index first
        CellOrder::from_indices(&(0..NUM_CELLS).collect::<Vec<_>>())
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let mut rng = fastrand::Rng::with_seed(7);
        let order = CellOrder::shuffled(&mut rng);
        let mut cells: Vec<usize> = order.iter().collect();
        cells.sort_unstable();
        assert_eq!(cells, (0..NUM_CELLS).collect::<Vec<_>>());
    }

    #[test]
    fn test_exploration_skips_friendly_neighbors() {
        let mut board = Board::new();
        board.set((14, 13), Color::White);
        // Cursor pops (14,14) first: adjacent to white, so it is consumed
        let mut cursor = CellOrder::from_indices(&[index((0, 0)), index((14, 14))]);
        let mv = generate_exploration(&board, Color::White, &mut cursor).unwrap();
        assert_eq!(mv.cells(), &[(0, 0)]);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_exploration_exhaustion_leaves_board_untouched() {
        let mut board = Board::new();
        board.set((0, 0), Color::Black);
        let before = board.clone();
        let mut cursor = CellOrder::from_indices(&[index((0, 1)), index((1, 0)), index((0, 0))]);
        assert!(generate_exploration(&board, Color::Black, &mut cursor).is_none());
        assert!(cursor.is_exhausted());
        assert_eq!(board, before);
    }

    #[test]
    fn test_expansion_requires_friendly_group() {
        let board = Board::new();
        assert!(generate_expansion(&board, Color::White, &identity_order()).is_none());
    }

    #[test]
    fn test_expansion_extends_each_group_once() {
        let mut board = Board::new();
        board.set((7, 7), Color::White);
        board.set((2, 2), Color::White);
        let mv = generate_expansion(&board, Color::White, &identity_order()).unwrap();
        assert_eq!(mv.len(), 2);
        board.set_move(&mv, Color::White);
        assert_eq!(board.num_groups(Color::White), 2);
        assert_eq!(board.num_stones(Color::White), 4);
    }

    #[test]
    fn test_expansion_merge_claims_all_groups() {
        let mut board = Board::new();
        board.set((7, 6), Color::Black);
        board.set((7, 8), Color::Black);
        // (7,7) touches both groups and is scanned first
        let order = CellOrder::from_indices(&[index((7, 7)), index((7, 5)), index((7, 9))]);
        let mv = generate_expansion(&board, Color::Black, &order).unwrap();
        assert_eq!(mv.cells(), &[(7, 7)]);
    }

    #[test]
    fn test_expansion_skips_merge_of_claimed_group() {
        let mut board = Board::new();
        board.set((7, 6), Color::Black);
        board.set((7, 8), Color::Black);
        let order = CellOrder::from_indices(&[index((7, 5)), index((7, 7)), index((7, 9))]);
        let mv = generate_expansion(&board, Color::Black, &order).unwrap();
        assert_eq!(mv.cells(), &[(7, 5), (7, 9)]);
    }

    #[test]
    fn test_expansion_ignores_opponent_groups() {
        let mut board = Board::new();
        board.set((7, 7), Color::White);
        assert!(generate_expansion(&board, Color::Black, &identity_order()).is_none());
    }

    #[test]
    fn test_choose_move_without_stones_explores() {
        let board = Board::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut cursor = CellOrder::shuffled(&mut rng);
        let order = CellOrder::shuffled(&mut rng);
        for _ in 0..20 {
            let mv = choose_move(&board, Color::Black, &mut cursor, &order, 0.0, &mut rng).unwrap();
            assert_eq!(mv.len(), 1);
        }
    }

    #[test]
    fn test_choose_move_falls_back_to_expansion() {
        let mut board = Board::new();
        board.set((3, 3), Color::White);
        let mut rng = fastrand::Rng::with_seed(2);
        let mut cursor = CellOrder::from_indices(&[]);
        let order = CellOrder::shuffled(&mut rng);
        let mv = choose_move(&board, Color::White, &mut cursor, &order, 1.0, &mut rng).unwrap();
        assert_eq!(mv.len(), 1);
        assert!(!board.legal_exploration(Color::White, mv.cells()[0]));
    }

    #[test]
    fn test_choose_move_falls_back_to_exploration() {
        let mut board = Board::new();
        board.set((3, 3), Color::White);
        let mut rng = fastrand::Rng::with_seed(3);
        let mut cursor = CellOrder::shuffled(&mut rng);
        // Read-only order with no cells: expansion finds nothing
        let order = CellOrder::from_indices(&[]);
        let mv = choose_move(&board, Color::White, &mut cursor, &order, 0.0, &mut rng).unwrap();
        assert!(board.legal_exploration(Color::White, mv.cells()[0]));
    }
}
