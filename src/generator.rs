use log::debug;
use rand::{seq::index, seq::SliceRandom, Rng};

use crate::{
    error::{Result, SolverError},
    sudoku::{Sudoku, N, SOLVED_GRID},
};

/// Cuts `difficulty` distinct cells out of [`SOLVED_GRID`].
///
/// Every puzzle shares the same underlying solution; only the holes change.
pub fn generate<R: Rng + ?Sized>(difficulty: usize, rng: &mut R) -> Result<Sudoku> {
    remove_cells(SOLVED_GRID, difficulty, rng)
}

/// Like [`generate`], but the solution itself is first scrambled with
/// transformations that keep a grid valid.
pub fn generate_varied<R: Rng + ?Sized>(difficulty: usize, rng: &mut R) -> Result<Sudoku> {
    check_difficulty(difficulty)?;
    let base = shuffle_grid(SOLVED_GRID, rng);
    remove_cells(base, difficulty, rng)
}

fn check_difficulty(difficulty: usize) -> Result<()> {
    if difficulty > N * N {
        return Err(SolverError::invalid(
            "difficulty",
            difficulty as i64,
            "at most 81 cells can be removed",
        ));
    }
    Ok(())
}

fn remove_cells<R: Rng + ?Sized>(
    rows: [[u8; N]; N],
    difficulty: usize,
    rng: &mut R,
) -> Result<Sudoku> {
    check_difficulty(difficulty)?;
    let mut puzzle = Sudoku::from_rows(rows)?;
    for cell in index::sample(rng, N * N, difficulty) {
        puzzle.clear(cell / N, cell % N);
    }
    debug!("[generator] Removed {difficulty} cells");
    Ok(puzzle)
}

/// Relabels digits, permutes rows inside each band and columns inside each
/// stack, then permutes the bands and stacks themselves.
fn shuffle_grid<R: Rng + ?Sized>(rows: [[u8; N]; N], rng: &mut R) -> [[u8; N]; N] {
    let mut digits: Vec<u8> = (1..=9).collect();
    digits.shuffle(rng);
    let row_order = line_order(rng);
    let col_order = line_order(rng);

    let mut out = [[0; N]; N];
    for (i, &src_i) in row_order.iter().enumerate() {
        for (j, &src_j) in col_order.iter().enumerate() {
            out[i][j] = digits[(rows[src_i][src_j] - 1) as usize];
        }
    }
    out
}

fn line_order<R: Rng + ?Sized>(rng: &mut R) -> Vec<usize> {
    let mut bands = [0, 1, 2];
    bands.shuffle(rng);
    let mut order = Vec::with_capacity(N);
    for band in bands {
        let mut lines = [band * 3, band * 3 + 1, band * 3 + 2];
        lines.shuffle(rng);
        order.extend(lines);
    }
    order
}
