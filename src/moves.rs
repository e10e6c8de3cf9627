//! Moves and their text notation.
//!
//! A cell is written as a column letter followed by a 1-based row number,
//! so `(0, 0)` is `A1` and `(14, 14)` is `O15`. A move joins its cells with
//! `-` in placement order, e.g. `A1-B12`.

use std::fmt;
use std::str::FromStr;

use crate::constants::GRID_SIZE;

/// A cell on the grid as `(x, y)`, with `x` the column and `y` the row.
pub type Point = (usize, usize);

/// Error returned when a move string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// The move, or one of its `-` separated cells, is empty
    Empty,
    /// Column letter is missing or past the edge of the board
    BadColumn(String),
    /// Row number is missing, malformed, or outside the board
    BadRow(String),
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotationError::Empty => write!(f, "empty move"),
            NotationError::BadColumn(s) => write!(f, "bad column in cell '{s}'"),
            NotationError::BadRow(s) => write!(f, "bad row in cell '{s}'"),
        }
    }
}

impl std::error::Error for NotationError {}

/// One or more cells placed atomically by one color in a single turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Move {
    cells: Vec<Point>,
}

impl Move {
    pub fn new(cells: Vec<Point>) -> Self {
        Self { cells }
    }

    /// A move placing a single cell.
    pub fn single(pt: Point) -> Self {
        Self { cells: vec![pt] }
    }

    pub fn push(&mut self, pt: Point) {
        self.cells.push(pt);
    }

    pub fn cells(&self) -> &[Point] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True if both moves place the same cells, in any order.
    pub fn same_cells(&self, other: &Move) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut a = self.cells.clone();
        let mut b = other.cells.clone();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &pt) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", str_coord(pt))?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NotationError::Empty);
        }
        s.split('-')
            .map(parse_coord)
            .collect::<Result<Vec<_>, _>>()
            .map(Move::new)
    }
}

/// Parse a single cell such as `"H12"`.
pub fn parse_coord(s: &str) -> Result<Point, NotationError> {
    let mut chars = s.chars();
    let col = chars.next().ok_or(NotationError::Empty)?.to_ascii_uppercase();
    if !col.is_ascii_uppercase() {
        return Err(NotationError::BadColumn(s.to_string()));
    }
    let x = (col as u8 - b'A') as usize;
    if x >= GRID_SIZE {
        return Err(NotationError::BadColumn(s.to_string()));
    }

    let row = chars.as_str();
    if row.is_empty() || !row.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NotationError::BadRow(s.to_string()));
    }
    match row.parse::<usize>() {
        Ok(y) if (1..=GRID_SIZE).contains(&y) => Ok((x, y - 1)),
        _ => Err(NotationError::BadRow(s.to_string())),
    }
}

/// Convert a cell to its string form.
pub fn str_coord(pt: Point) -> String {
    let (x, y) = pt;
    format!("{}{}", (b'A' + x as u8) as char, y + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners() {
        assert_eq!(parse_coord("A1"), Ok((0, 0)));
        assert_eq!(parse_coord("O15"), Ok((14, 14)));
        assert_eq!(str_coord((0, 0)), "A1");
        assert_eq!(str_coord((14, 14)), "O15");
    }

    #[test]
    fn test_two_digit_rows() {
        assert_eq!(parse_coord("B12"), Ok((1, 11)));
        assert_eq!(parse_coord("c10"), Ok((2, 9)));
        assert_eq!(str_coord((1, 11)), "B12");
    }

    #[test]
    fn test_multi_cell_move() {
        let mv: Move = "A1-B12".parse().unwrap();
        assert_eq!(mv.cells(), &[(0, 0), (1, 11)]);
        assert_eq!(mv.to_string(), "A1-B12");
    }

    #[test]
    fn test_same_cells_ignores_order() {
        let a: Move = "A1-C3-B2".parse().unwrap();
        let b: Move = "B2-A1-C3".parse().unwrap();
        let c: Move = "B2-A1".parse().unwrap();
        assert!(a.same_cells(&b));
        assert_ne!(a, b);
        assert!(!a.same_cells(&c));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(parse_coord("P1"), Err(NotationError::BadColumn(_))));
        assert!(matches!(parse_coord("A0"), Err(NotationError::BadRow(_))));
        assert!(matches!(parse_coord("A16"), Err(NotationError::BadRow(_))));
        assert!(matches!(parse_coord("A1x"), Err(NotationError::BadRow(_))));
        assert!(matches!(parse_coord("11"), Err(NotationError::BadColumn(_))));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!("".parse::<Move>(), Err(NotationError::Empty));
        assert_eq!("A1--B2".parse::<Move>(), Err(NotationError::Empty));
    }
}
