mod graph;

pub mod config;
pub mod error;
pub mod generator;
pub mod hanoi;
pub mod maze;
pub mod metrics;
pub mod request;
pub mod runner;
pub mod solver;
pub mod sudoku;

pub use config::Limits;
pub use error::{Result, SolverError};
pub use graph::SearchResult;
pub use request::{
    solve_hanoi, solve_maze_grid, solve_maze_request, solve_sudoku_grid, solve_sudoku_request,
    HanoiRequest, MazeRequest, Report, Request, SudokuRequest,
};
pub use solver::{solve_sudoku, SolveStats};
pub use sudoku::Sudoku;
