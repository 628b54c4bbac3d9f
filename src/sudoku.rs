use colored::Colorize;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

pub const N: usize = 9;

/// A fully completed, valid grid that puzzles are cut from.
pub const SOLVED_GRID: [[u8; N]; N] = [
    [3, 1, 6, 5, 7, 8, 4, 9, 2],
    [5, 2, 9, 1, 3, 4, 7, 6, 8],
    [4, 8, 7, 6, 2, 9, 5, 3, 1],
    [2, 6, 3, 4, 1, 5, 9, 8, 7],
    [9, 7, 4, 8, 6, 3, 1, 2, 5],
    [8, 5, 1, 7, 9, 2, 6, 4, 3],
    [1, 3, 8, 9, 4, 7, 2, 5, 6],
    [6, 9, 2, 3, 5, 1, 8, 7, 4],
    [7, 4, 5, 2, 8, 6, 3, 1, 9],
];

/// [`SOLVED_GRID`] with a single hole at row 6, column 7.
pub const SEED_PUZZLE: [[u8; N]; N] = [
    [3, 1, 6, 5, 7, 8, 4, 9, 2],
    [5, 2, 9, 1, 3, 4, 7, 6, 8],
    [4, 8, 7, 6, 2, 9, 5, 3, 1],
    [2, 6, 3, 4, 1, 5, 9, 8, 7],
    [9, 7, 4, 8, 6, 3, 1, 2, 5],
    [8, 5, 1, 7, 9, 2, 6, 4, 3],
    [1, 3, 8, 9, 4, 7, 2, 0, 6],
    [6, 9, 2, 3, 5, 1, 8, 7, 4],
    [7, 4, 5, 2, 8, 6, 3, 1, 9],
];

/// 9x9 grid, 0 meaning empty.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[[u8; 9]; 9]", into = "[[u8; 9]; 9]")]
pub struct Sudoku {
    rows: [[u8; N]; N],
}

impl Sudoku {
    pub fn empty() -> Self {
        Self {
            rows: [[0; N]; N],
        }
    }

    pub fn from_rows(rows: [[u8; N]; N]) -> Result<Self> {
        if let Some(&x) = rows.iter().flatten().find(|&&x| x > 9) {
            return Err(SolverError::invalid("cell", x, "digits must be in 0..=9"));
        }
        Ok(Self { rows })
    }

    /// Parses one line per row; blanks, `.` and `0` are empty cells.
    /// Short lines are padded with empty cells.
    pub fn from_text(text: &str) -> std::result::Result<Self, String> {
        let mut rows = [[0; N]; N];
        for (i, line) in text.lines().enumerate() {
            if i >= N {
                return Err(format!("Too many rows: {}", i + 1));
            }
            for (j, c) in line.chars().enumerate() {
                if j >= N {
                    return Err(format!("Too many columns in row {i}"));
                }
                rows[i][j] = match c {
                    ' ' | '.' => 0,
                    c => c
                        .to_digit(10)
                        .ok_or_else(|| format!("Invalid char: {c}"))? as u8,
                };
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[[u8; N]; N] {
        &self.rows
    }

    pub fn get(&self, i: usize, j: usize) -> u8 {
        self.rows[i][j]
    }

    pub fn set(&mut self, i: usize, j: usize, number: u8) {
        self.rows[i][j] = number;
    }

    pub fn clear(&mut self, i: usize, j: usize) {
        self.rows[i][j] = 0;
    }

    pub fn count_empty(&self) -> usize {
        self.rows.iter().flatten().filter(|&&x| x == 0).count()
    }

    /// First empty cell in row-major order.
    pub fn find_empty(&self) -> Option<(usize, usize)> {
        (0..N)
            .cartesian_product(0..N)
            .find(|&(i, j)| self.rows[i][j] == 0)
    }

    fn get_row_values(&self, i: usize) -> Vec<u8> {
        self.rows[i].iter().copied().filter(|&x| x != 0).collect_vec()
    }

    fn get_col_values(&self, j: usize) -> Vec<u8> {
        self.rows
            .iter()
            .map(|row| row[j])
            .filter(|&x| x != 0)
            .collect_vec()
    }

    fn get_square_values(&self, i: usize, j: usize) -> Vec<u8> {
        let i0 = (i / 3) * 3;
        let j0 = (j / 3) * 3;
        (i0..i0 + 3)
            .cartesian_product(j0..j0 + 3)
            .map(|(i, j)| self.get(i, j))
            .filter(|&x| x != 0)
            .collect_vec()
    }

    /// Whether `number` can go at `(row, col)`: no other cell of the row,
    /// column or 3x3 box holds it. Scans all 27 cells every time.
    pub fn is_valid_move(&self, number: u8, (row, col): (usize, usize)) -> bool {
        for j in 0..N {
            if self.rows[row][j] == number && j != col {
                return false;
            }
        }
        for i in 0..N {
            if self.rows[i][col] == number && i != row {
                return false;
            }
        }
        let i0 = (row / 3) * 3;
        let j0 = (col / 3) * 3;
        for (i, j) in (i0..i0 + 3).cartesian_product(j0..j0 + 3) {
            if self.rows[i][j] == number && (i, j) != (row, col) {
                return false;
            }
        }
        true
    }

    /// Iterates over the 27 groups: rows, then columns, then boxes.
    fn groups(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        (0..N)
            .map(move |i| self.get_row_values(i))
            .chain((0..N).map(move |j| self.get_col_values(j)))
            .chain(
                (0..3)
                    .cartesian_product(0..3)
                    .map(move |(i, j)| self.get_square_values(i * 3, j * 3)),
            )
    }

    /// No digit repeats inside any row, column or box. Empty cells are ignored.
    pub fn is_consistent(&self) -> bool {
        self.groups()
            .map(|group| group.into_iter().counts().into_values().max().unwrap_or(0))
            .max()
            .unwrap_or(0)
            <= 1
    }

    /// Every row, column and box holds each digit 1..=9 exactly once.
    pub fn is_solved(&self) -> bool {
        self.groups()
            .all(|group| group.into_iter().sorted().eq(1..=9u8))
    }
}

impl Default for Sudoku {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<[[u8; N]; N]> for Sudoku {
    type Error = SolverError;

    fn try_from(rows: [[u8; N]; N]) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<Sudoku> for [[u8; N]; N] {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.rows
    }
}

impl std::fmt::Display for Sudoku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut line = String::new();
        let horizontal_line = " ----------------- ";
        for (i, row) in self.rows.iter().enumerate() {
            if i % 3 == 0 {
                writeln!(f, "{}", horizontal_line)?;
            }
            for (j, x) in row.iter().enumerate() {
                line.push(if j % 3 == 0 { '|' } else { ' ' });
                match x {
                    0 => line.push_str(&" ".on_blue().to_string()),
                    n => line.push_str(&format!("{n}")),
                }
            }
            writeln!(f, "{line}|")?;
            line.clear();
        }
        writeln!(f, "{}", horizontal_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALMOST_SOLVED: &str = "926817345
851394726
473265891
685123479
734589162
219746538
586472 1
342951687
197638254";

    #[test]
    fn create_sudoku_from_text_works() {
        let text = " 1
69  2  57
    692
  9   4
47     2
581 9   3
  5  86
 4 2  8 1
   6   4";
        let board = Sudoku::from_text(text).unwrap();
        println!("{board}");
        assert_eq!(board.get(1, 0), 6);
        assert_eq!(board.get(0, 0), 0);
        assert!(board.is_consistent());
    }

    #[test]
    fn create_sudoku_from_text_fails_on_invalid_char() {
        let err = Sudoku::from_text("12x").unwrap_err();
        assert_eq!(err, "Invalid char: x");
    }

    #[test]
    fn from_rows_fails_on_out_of_range_digit() {
        let mut rows = SOLVED_GRID;
        rows[4][4] = 10;
        assert!(matches!(
            Sudoku::from_rows(rows),
            Err(SolverError::InvalidParameter { name: "cell", .. })
        ));
    }

    #[test]
    fn is_consistent_detects_duplicates() {
        let text = " 1
699 2  57
    692";
        let board = Sudoku::from_text(text).unwrap();
        assert!(!board.is_consistent());
    }

    #[test]
    fn get_row_values_works() {
        let board = Sudoku::from_text(ALMOST_SOLVED).unwrap();
        assert_eq!(board.get_row_values(0), vec![9, 2, 6, 8, 1, 7, 3, 4, 5]);
    }

    #[test]
    fn get_col_values_works() {
        let board = Sudoku::from_text(ALMOST_SOLVED).unwrap();
        assert_eq!(board.get_col_values(0), vec![9, 8, 4, 6, 7, 2, 5, 3, 1]);
    }

    #[test]
    fn get_square_values_works() {
        let board = Sudoku::from_text(ALMOST_SOLVED).unwrap();
        let cases = [
            ((1, 1), vec![9, 2, 6, 8, 5, 1, 4, 7, 3]),
            ((6, 8), vec![1, 6, 8, 7, 2, 5, 4]),
        ];
        for ((i, j), expected) in cases {
            assert_eq!(board.get_square_values(i, j), expected);
        }
    }

    #[test]
    fn find_empty_is_row_major() {
        let board = Sudoku::from_text(ALMOST_SOLVED).unwrap();
        assert_eq!(board.find_empty(), Some((6, 6)));
        assert_eq!(Sudoku::from_rows(SOLVED_GRID).unwrap().find_empty(), None);
    }

    #[test]
    fn is_valid_move_works() {
        let board = Sudoku::from_rows(SEED_PUZZLE).unwrap();
        let valid = (1..=9)
            .filter(|&d| board.is_valid_move(d, (6, 7)))
            .collect_vec();
        assert_eq!(valid, vec![5]);
        // A filled cell does not conflict with itself.
        assert!(board.is_valid_move(3, (0, 0)));
        assert!(!board.is_valid_move(1, (0, 0)));
    }

    #[test]
    fn solved_grid_is_solved() {
        let board = Sudoku::from_rows(SOLVED_GRID).unwrap();
        assert!(board.is_solved());
        assert!(!Sudoku::from_rows(SEED_PUZZLE).unwrap().is_solved());
    }

    #[test]
    fn serde_as_nested_arrays_works() {
        let board = Sudoku::from_rows(SEED_PUZZLE).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.starts_with("[[3,1,6,5,7,8,4,9,2],"));
        let back: Sudoku = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
        assert!(serde_json::from_str::<Sudoku>("[[12]]").is_err());
    }
}
