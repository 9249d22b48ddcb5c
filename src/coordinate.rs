use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A grid cell addressed by 0-indexed row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn manhattan_distance(&self, other: &Self) -> u64 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u64
    }

    /// Axis-aligned neighbours in the order up, down, left, right.
    /// Cells that would fall below row or column 0 are skipped; the upper
    /// bound is left to the caller, which knows the grid size.
    pub fn adjacent(&self) -> impl Iterator<Item = Coordinate> {
        let Coordinate { row, col } = *self;
        [
            row.checked_sub(1).map(|r| (r, col)),
            row.checked_add(1).map(|r| (r, col)),
            col.checked_sub(1).map(|c| (row, c)),
            col.checked_add(1).map(|c| (row, c)),
        ]
        .into_iter()
        .flatten()
        .map(|(row, col)| Coordinate { row, col })
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// Parses `"row,col"`, tolerating whitespace around either number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.split(',');
        match (split.next(), split.next(), split.next()) {
            (Some(row), Some(col), None) => {
                let row = row
                    .trim()
                    .parse()
                    .map_err(|e| format!("invalid row {:?}: {}", row.trim(), e))?;
                let col = col
                    .trim()
                    .parse()
                    .map_err(|e| format!("invalid column {:?}: {}", col.trim(), e))?;
                Ok(Coordinate { row, col })
            }
            _ => Err(format!("expected ROW,COL but got {:?}", s)),
        }
    }
}
