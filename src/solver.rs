use log::debug;

use crate::sudoku::Sudoku;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    pub success: bool,
    /// Digits written into the grid, including ones later undone.
    pub placements: usize,
    pub backtracks: usize,
    /// Deepest the placement stack got.
    pub peak_depth: usize,
}

/// A tentative digit placed in an empty cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    row: usize,
    col: usize,
    digit: u8,
}

/// Solves `board` in place by backtracking.
///
/// The first empty cell in row-major order gets the smallest digit that is
/// valid for its row, column and box; when a cell has no valid digit left, the
/// latest placement is undone and retried from its next digit. Placements
/// live on an explicit stack, so depth is bounded by the 81 cells rather
/// than the call stack.
///
/// On failure every placement has been undone and `board` is back to its
/// input state. A board that already repeats a digit fails without searching.
pub fn solve_sudoku(board: &mut Sudoku) -> SolveStats {
    let mut stats = SolveStats::default();
    if !board.is_consistent() {
        debug!("[solver] Input repeats a digit, nothing to search");
        return stats;
    }

    let mut stack: Vec<Placement> = Vec::new();
    let mut first_digit = 1;
    loop {
        let Some((row, col)) = board.find_empty() else {
            stats.success = true;
            break;
        };
        match (first_digit..=9).find(|&d| board.is_valid_move(d, (row, col))) {
            Some(digit) => {
                board.set(row, col, digit);
                stack.push(Placement { row, col, digit });
                stats.placements += 1;
                stats.peak_depth = stats.peak_depth.max(stack.len());
                first_digit = 1;
            }
            None => {
                let Some(last) = stack.pop() else {
                    break;
                };
                board.clear(last.row, last.col);
                stats.backtracks += 1;
                first_digit = last.digit + 1;
            }
        }
    }
    debug!(
        "[solver] success={} after {} placements and {} backtracks",
        stats.success, stats.placements, stats.backtracks
    );
    stats
}
