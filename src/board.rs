//! Board state and stone-group connectivity.
//!
//! Stones are never removed, so groups only ever grow or merge. Each new
//! isolated stone gets a fresh group id from a counter owned by the board;
//! ids are never reused. When a stone joins several groups, every cell of the
//! absorbed groups is relabelled with a full scan of the board. That keeps
//! the structure trivial and is cheap at 225 cells, but it is linear in the
//! board size per merge; a union-find with path compression is the
//! replacement if the grid ever becomes configurable.

use std::fmt;

use crate::constants::{GRID_SIZE, GROUP_PENALTY, NUM_CELLS};
use crate::moves::{Move, Point};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "WHITE"),
            Color::Black => write!(f, "BLACK"),
        }
    }
}

/// A single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub x: u8,
    pub y: u8,
    pub owner: Option<Color>,
    /// Group id, 0 while the cell is unowned
    pub group: u16,
}

impl Cell {
    pub fn point(&self) -> Point {
        (self.x as usize, self.y as usize)
    }

    /// Indices of the left, right, lower and upper neighbors. Cells on the
    /// edge have `None` in place of the missing neighbor.
    pub fn neighbors(&self) -> [Option<usize>; 4] {
        let (x, y) = self.point();
        [
            (x > 0).then(|| index((x - 1, y))),
            (x + 1 < GRID_SIZE).then(|| index((x + 1, y))),
            (y > 0).then(|| index((x, y - 1))),
            (y + 1 < GRID_SIZE).then(|| index((x, y + 1))),
        ]
    }
}

/// Flat index of a point.
#[inline]
pub fn index(pt: Point) -> usize {
    pt.0 * GRID_SIZE + pt.1
}

/// Point at a flat index.
#[inline]
pub fn point(idx: usize) -> Point {
    (idx / GRID_SIZE, idx % GRID_SIZE)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; NUM_CELLS],
    stones: [u32; 2],
    groups: [u32; 2],
    /// Last group id handed out
    next_group: u16,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut cells = [Cell {
            x: 0,
            y: 0,
            owner: None,
            group: 0,
        }; NUM_CELLS];
        for (i, cell) in cells.iter_mut().enumerate() {
            let (x, y) = point(i);
            cell.x = x as u8;
            cell.y = y as u8;
        }
        Self {
            cells,
            stones: [0; 2],
            groups: [0; 2],
            next_group: 0,
        }
    }

    pub fn get(&self, pt: Point) -> &Cell {
        &self.cells[index(pt)]
    }

    #[inline]
    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + use<> {
        self.cells[idx].neighbors().into_iter().flatten()
    }

    /// Place a stone. The point must be on the board and unowned.
    pub fn set(&mut self, pt: Point, color: Color) {
        assert!(
            pt.0 < GRID_SIZE && pt.1 < GRID_SIZE,
            "point {pt:?} is off the board"
        );
        let idx = index(pt);
        assert!(
            self.cells[idx].owner.is_none(),
            "point {pt:?} is already owned"
        );

        let c = color.index();
        self.stones[c] += 1;
        self.cells[idx].owner = Some(color);

        // Adopt the first neighboring friendly group
        let adopted = self
            .neighbors(idx)
            .map(|n| self.cells[n])
            .find(|n| n.owner == Some(color) && n.group != 0)
            .map(|n| n.group);

        let Some(group) = adopted else {
            self.next_group += 1;
            self.cells[idx].group = self.next_group;
            self.groups[c] += 1;
            return;
        };
        self.cells[idx].group = group;

        // Merge any other friendly groups touching this stone
        for n in self.neighbors(idx) {
            let neighbor = self.cells[n];
            if neighbor.owner == Some(color) && neighbor.group != 0 && neighbor.group != group {
                self.relabel(neighbor.group, group);
                self.groups[c] -= 1;
            }
        }
    }

    /// Place every cell of a move in order.
    pub fn set_move(&mut self, mv: &Move, color: Color) {
        for &pt in mv.cells() {
            self.set(pt, color);
        }
    }

    fn relabel(&mut self, old: u16, new: u16) {
        for cell in self.cells.iter_mut().filter(|c| c.group == old) {
            cell.group = new;
        }
    }

    /// True if the point is unowned and none of its neighbors belong to `color`.
    pub fn legal_exploration(&self, color: Color, pt: Point) -> bool {
        self.legal_exploration_at(color, index(pt))
    }

    pub fn legal_exploration_at(&self, color: Color, idx: usize) -> bool {
        self.cells[idx].owner.is_none()
            && self
                .neighbors(idx)
                .all(|n| self.cells[n].owner != Some(color))
    }

    pub fn num_stones(&self, color: Color) -> u32 {
        self.stones[color.index()]
    }

    pub fn num_groups(&self, color: Color) -> u32 {
        self.groups[color.index()]
    }

    /// Largest group id assigned so far. Every live group id is in `1..=max_group_id()`.
    pub fn max_group_id(&self) -> u16 {
        self.next_group
    }

    pub fn score(&self, color: Color) -> i32 {
        self.num_stones(color) as i32 - GROUP_PENALTY * self.num_groups(color) as i32
    }

    /// Color with the strictly higher score. Ties go to BLACK.
    pub fn winner(&self) -> Color {
        if self.score(Color::White) > self.score(Color::Black) {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn game_finished(&self) -> bool {
        (self.stones[0] + self.stones[1]) as usize == NUM_CELLS
    }

    /// Compare ownership only, ignoring group labels.
    pub fn same_position(&self, other: &Board) -> bool {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .all(|(a, b)| a.owner == b.owner)
    }

    /// Render the group id of every cell instead of its owner.
    pub fn groups_string(&self) -> String {
        let mut s = String::new();
        for y in (0..GRID_SIZE).rev() {
            for x in 0..GRID_SIZE {
                match self.get((x, y)).group {
                    0 => s.push_str("   ."),
                    g => s.push_str(&format!("{g:>4}")),
                }
            }
            s.push_str(&format!(" | {}\n", y + 1));
        }
        s
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..GRID_SIZE).rev() {
            for x in 0..GRID_SIZE {
                let ch = self.get((x, y)).owner.map_or('.', Color::symbol);
                write!(f, "{ch} ")?;
            }
            writeln!(f, "| {}", y + 1)?;
        }
        for x in 0..GRID_SIZE {
            write!(f, "{} ", (b'A' + x as u8) as char)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.num_stones(Color::White), 0);
        assert_eq!(board.num_groups(Color::Black), 0);
        assert!(!board.game_finished());
        assert!(board.cells().iter().all(|c| c.owner.is_none() && c.group == 0));
        assert_eq!(board.get((3, 11)).point(), (3, 11));
    }

    #[test]
    fn test_edge_neighbors_are_absent() {
        let board = Board::new();
        assert_eq!(board.get((0, 0)).neighbors().iter().flatten().count(), 2);
        assert_eq!(board.get((0, 7)).neighbors().iter().flatten().count(), 3);
        assert_eq!(board.get((7, 7)).neighbors().iter().flatten().count(), 4);
        assert_eq!(board.get((14, 14)).neighbors().iter().flatten().count(), 2);
    }

    #[test]
    fn test_isolated_stone_creates_group() {
        let mut board = Board::new();
        board.set((7, 7), Color::White);
        assert_eq!(board.num_stones(Color::White), 1);
        assert_eq!(board.num_groups(Color::White), 1);
        assert_eq!(board.score(Color::White), -5);
        assert_ne!(board.get((7, 7)).group, 0);
    }

    #[test]
    fn test_adjacent_stone_joins_group() {
        let mut board = Board::new();
        board.set((7, 7), Color::White);
        board.set((7, 8), Color::White);
        assert_eq!(board.num_groups(Color::White), 1);
        assert_eq!(board.get((7, 7)).group, board.get((7, 8)).group);
        assert_eq!(board.score(Color::White), -4);
    }

    #[test]
    fn test_opponent_stone_does_not_join() {
        let mut board = Board::new();
        board.set((7, 7), Color::White);
        board.set((7, 8), Color::Black);
        assert_eq!(board.num_groups(Color::White), 1);
        assert_eq!(board.num_groups(Color::Black), 1);
        assert_ne!(board.get((7, 7)).group, board.get((7, 8)).group);
    }

    #[test]
    fn test_merge_relabels_whole_group() {
        let mut board = Board::new();
        // Two white lines joined by (7,9)
        for x in 3..7 {
            board.set((x, 9), Color::White);
        }
        for x in 8..12 {
            board.set((x, 9), Color::White);
        }
        assert_eq!(board.num_groups(Color::White), 2);

        board.set((7, 9), Color::White);
        assert_eq!(board.num_groups(Color::White), 1);
        let g = board.get((3, 9)).group;
        assert!((3..12).all(|x| board.get((x, 9)).group == g));
    }

    #[test]
    fn test_four_way_merge() {
        let mut board = Board::new();
        for pt in [(6, 7), (8, 7), (7, 6), (7, 8)] {
            board.set(pt, Color::Black);
        }
        assert_eq!(board.num_groups(Color::Black), 4);
        board.set((7, 7), Color::Black);
        assert_eq!(board.num_groups(Color::Black), 1);
        assert_eq!(board.score(Color::Black), 5 - 6);
    }

    #[test]
    fn test_group_ids_never_reused() {
        let mut board = Board::new();
        board.set((0, 0), Color::White);
        board.set((2, 0), Color::White);
        board.set((1, 0), Color::White);
        assert_eq!(board.max_group_id(), 2);
        board.set((5, 5), Color::Black);
        assert_eq!(board.get((5, 5)).group, 3);
    }

    #[test]
    fn test_set_move_is_sequential() {
        let mut board = Board::new();
        let mv = Move::new(vec![(4, 4), (4, 6), (4, 5)]);
        board.set_move(&mv, Color::Black);
        assert_eq!(board.num_stones(Color::Black), 3);
        assert_eq!(board.num_groups(Color::Black), 1);
    }

    #[test]
    fn test_legal_exploration() {
        let mut board = Board::new();
        board.set((7, 7), Color::White);
        assert!(!board.legal_exploration(Color::White, (7, 7)));
        assert!(!board.legal_exploration(Color::Black, (7, 7)));
        assert!(!board.legal_exploration(Color::White, (7, 8)));
        assert!(board.legal_exploration(Color::Black, (7, 8)));
        assert!(board.legal_exploration(Color::White, (8, 8)));
    }

    #[test]
    fn test_winner_tie_goes_to_black() {
        let mut board = Board::new();
        board.set((0, 0), Color::White);
        board.set((14, 14), Color::Black);
        assert_eq!(board.score(Color::White), board.score(Color::Black));
        assert_eq!(board.winner(), Color::Black);

        board.set((0, 1), Color::White);
        assert_eq!(board.winner(), Color::White);
    }

    #[test]
    fn test_game_finished_when_full() {
        let mut board = Board::new();
        for i in 0..NUM_CELLS {
            assert!(!board.game_finished());
            let color = if point(i).0 % 2 == 0 { Color::White } else { Color::Black };
            board.set(point(i), color);
        }
        assert!(board.game_finished());
        // Alternating columns: 8 white, 7 black
        assert_eq!(board.num_groups(Color::White), 8);
        assert_eq!(board.num_groups(Color::Black), 7);
    }

    #[test]
    fn test_same_position_ignores_group_labels() {
        let mut a = Board::new();
        let mut b = Board::new();
        a.set_move(&Move::new(vec![(1, 1), (3, 1), (2, 1)]), Color::White);
        b.set_move(&Move::new(vec![(3, 1), (1, 1), (2, 1)]), Color::White);
        assert!(a.same_position(&b));
        assert_ne!(a.get((1, 1)).group, b.get((1, 1)).group);
    }

    #[test]
    fn test_groups_string_shows_merged_id() {
        let mut board = Board::new();
        board.set((0, 0), Color::White);
        board.set((2, 0), Color::White);
        let s = board.groups_string();
        assert_eq!(s.lines().count(), GRID_SIZE);
        assert!(s.lines().last().unwrap().starts_with("   1   .   2   ."));

        board.set((1, 0), Color::White);
        let s = board.groups_string();
        assert!(s.lines().last().unwrap().starts_with("   1   1   1   ."));
        assert!(!s.contains("   2"));
        assert!(s.lines().last().unwrap().ends_with(" | 1"));
    }

    #[test]
    #[should_panic(expected = "already owned")]
    fn test_set_on_owned_cell_panics() {
        let mut board = Board::new();
        board.set((3, 3), Color::White);
        board.set((3, 3), Color::Black);
    }

    #[test]
    #[should_panic(expected = "off the board")]
    fn test_set_off_board_panics() {
        let mut board = Board::new();
        board.set((15, 0), Color::White);
    }
}
