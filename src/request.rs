//! Generate, solve and measure, one request at a time.

use log::{info, warn};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    config::Limits,
    error::Result,
    generator, hanoi,
    hanoi::{Move, Peg},
    maze::{self, Maze, Position},
    metrics::{measure, Footprint, Metrics, MetricsReport},
    solver::solve_sudoku,
    sudoku::Sudoku,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HanoiRequest {
    pub num_disks: u32,
}

impl Default for HanoiRequest {
    fn default() -> Self {
        Self { num_disks: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SudokuRequest {
    /// Number of cells removed from the solved grid.
    pub difficulty: usize,
    pub seed: Option<u64>,
    /// Scramble the solved grid before removing cells.
    pub varied: bool,
}

impl Default for SudokuRequest {
    fn default() -> Self {
        Self {
            difficulty: 60,
            seed: None,
            varied: false,
        }
    }
}

/// Even dimensions are bumped to the next odd number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeRequest {
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
}

impl Default for MazeRequest {
    fn default() -> Self {
        Self {
            width: 31,
            height: 31,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HanoiReport {
    pub num_disks: u32,
    pub solution: Vec<String>,
    #[serde(flatten)]
    pub metrics: MetricsReport,
    #[serde(skip)]
    pub moves: Vec<Move>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SudokuReport {
    /// `None` for a grid supplied by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub puzzle: Sudoku,
    /// `None` when the search was exhausted.
    pub solution: Option<Sudoku>,
    pub success: bool,
    pub placements: usize,
    pub backtracks: usize,
    #[serde(flatten)]
    pub metrics: MetricsReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct MazeReport {
    /// `None` for a maze supplied by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub maze: Maze,
    pub start: Position,
    pub end: Position,
    /// `None` when the exit cannot be reached.
    pub solution_path: Option<Vec<Position>>,
    pub iterations: usize,
    #[serde(flatten)]
    pub metrics: MetricsReport,
}

fn seed_or_random(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = rand::random();
        info!("No seed given, using {seed}");
        seed
    })
}

fn log_metrics(name: &str, metrics: &Metrics) {
    info!("[{name}] Solved in {metrics}");
}

pub fn solve_hanoi(request: &HanoiRequest, limits: &Limits) -> Result<HanoiReport> {
    let n = request.num_disks;
    let before = Vec::<Move>::new().footprint();
    let measured = measure(before, || {
        hanoi::plan_between(n, Peg::A, Peg::C, Peg::B, limits)
    });
    let moves = measured.value.map_err(|err| {
        warn!("[hanoi] Rejected request: {err}");
        err
    })?;
    log_metrics("hanoi", &measured.metrics);
    Ok(HanoiReport {
        num_disks: n,
        solution: moves.iter().map(Move::to_string).collect(),
        metrics: measured.metrics.into(),
        moves,
    })
}

pub fn solve_sudoku_request(request: &SudokuRequest, _limits: &Limits) -> Result<SudokuReport> {
    let seed = seed_or_random(request.seed);
    let mut rng = SmallRng::seed_from_u64(seed);
    let generated = if request.varied {
        generator::generate_varied(request.difficulty, &mut rng)
    } else {
        generator::generate(request.difficulty, &mut rng)
    };
    let puzzle = generated.map_err(|err| {
        warn!("[sudoku] Rejected request: {err}");
        err
    })?;

    Ok(solve_puzzle(Some(seed), puzzle))
}

/// Solves a grid supplied by the caller, e.g. parsed with [`Sudoku::from_text`].
pub fn solve_sudoku_grid(puzzle: Sudoku) -> SudokuReport {
    solve_puzzle(None, puzzle)
}

fn solve_puzzle(seed: Option<u64>, puzzle: Sudoku) -> SudokuReport {
    let mut board = puzzle;
    let measured = measure(0, || solve_sudoku(&mut board));
    let stats = measured.value;
    log_metrics("sudoku", &measured.metrics);
    SudokuReport {
        seed,
        puzzle,
        solution: stats.success.then_some(board),
        success: stats.success,
        placements: stats.placements,
        backtracks: stats.backtracks,
        metrics: measured.metrics.into(),
    }
}

pub fn solve_maze_request(request: &MazeRequest, limits: &Limits) -> Result<MazeReport> {
    let width = maze::normalize_dimension(request.width);
    let height = maze::normalize_dimension(request.height);
    let seed = seed_or_random(request.seed);
    let mut rng = SmallRng::seed_from_u64(seed);
    let grid = maze::generate(width, height, &mut rng, limits).map_err(|err| {
        warn!("[maze] Rejected request: {err}");
        err
    })?;

    Ok(walk_maze(Some(seed), grid))
}

/// Walks a maze supplied by the caller from its entry to its exit.
pub fn solve_maze_grid(maze: Maze) -> MazeReport {
    walk_maze(None, maze)
}

fn walk_maze(seed: Option<u64>, grid: Maze) -> MazeReport {
    let (start, end) = (grid.entry(), grid.exit());
    let measured = measure(0, || maze::solve_maze(&grid, start, end));
    let search = measured.value;
    log_metrics("maze", &measured.metrics);
    MazeReport {
        seed,
        start,
        end,
        solution_path: search.path,
        iterations: search.iterations,
        maze: grid,
        metrics: measured.metrics.into(),
    }
}

/// A request tagged by puzzle kind, e.g. `{"puzzle": "maze", "width": 21}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "puzzle", rename_all = "lowercase")]
pub enum Request {
    Hanoi(HanoiRequest),
    Sudoku(SudokuRequest),
    Maze(MazeRequest),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "puzzle", rename_all = "lowercase")]
pub enum Report {
    Hanoi(HanoiReport),
    Sudoku(SudokuReport),
    Maze(MazeReport),
}

impl Request {
    pub fn run(&self, limits: &Limits) -> Result<Report> {
        match self {
            Request::Hanoi(req) => solve_hanoi(req, limits).map(Report::Hanoi),
            Request::Sudoku(req) => solve_sudoku_request(req, limits).map(Report::Sudoku),
            Request::Maze(req) => solve_maze_request(req, limits).map(Report::Maze),
        }
    }
}

impl Report {
    pub fn metrics(&self) -> &MetricsReport {
        match self {
            Report::Hanoi(r) => &r.metrics,
            Report::Sudoku(r) => &r.metrics,
            Report::Maze(r) => &r.metrics,
        }
    }

    /// Whether the search reached its goal.
    pub fn solved(&self) -> bool {
        match self {
            Report::Hanoi(_) => true,
            Report::Sudoku(r) => r.success,
            Report::Maze(r) => r.solution_path.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;

    #[test]
    fn solve_hanoi_works() {
        let report = solve_hanoi(&HanoiRequest { num_disks: 3 }, &Limits::default()).unwrap();
        assert_eq!(report.solution.len(), 7);
        assert_eq!(report.solution[0], "Move disk 1 from A to C");
        assert_eq!(report.solution[3], "Move disk 3 from A to C");
        assert!(report.metrics.memory_used_mb > 0.0);
    }

    #[test]
    fn solve_hanoi_rejects_zero() {
        let err = solve_hanoi(&HanoiRequest { num_disks: 0 }, &Limits::default()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidParameter { .. }));
    }

    #[test]
    fn solve_sudoku_request_works() {
        let request = SudokuRequest {
            difficulty: 50,
            seed: Some(17),
            varied: false,
        };
        let report = solve_sudoku_request(&request, &Limits::default()).unwrap();
        assert!(report.success);
        assert_eq!(report.puzzle.count_empty(), 50);
        assert!(report.solution.unwrap().is_solved());
        assert_eq!(report.seed, Some(17));

        let again = solve_sudoku_request(&request, &Limits::default()).unwrap();
        assert_eq!(again.puzzle, report.puzzle);
    }

    #[test]
    fn solve_sudoku_request_rejects_difficulty() {
        let request = SudokuRequest {
            difficulty: 82,
            ..SudokuRequest::default()
        };
        assert!(solve_sudoku_request(&request, &Limits::default()).is_err());
    }

    #[test]
    fn solve_maze_request_bumps_even_dimensions() {
        let request = MazeRequest {
            width: 20,
            height: 10,
            seed: Some(4),
        };
        let report = solve_maze_request(&request, &Limits::default()).unwrap();
        assert_eq!(report.maze.width(), 21);
        assert_eq!(report.maze.height(), 11);
        assert_eq!(report.end, (9, 19));
        let path = report.solution_path.unwrap();
        assert_eq!(path.first(), Some(&(1, 1)));
        assert_eq!(path.last(), Some(&(9, 19)));
    }

    #[test]
    fn solve_sudoku_grid_works() {
        let puzzle = Sudoku::from_text("..3\n4").unwrap();
        let report = solve_sudoku_grid(puzzle);
        assert!(report.success);
        assert_eq!(report.puzzle, puzzle);
        let solution = report.solution.unwrap();
        assert!(solution.is_solved());
        assert_eq!(solution.get(0, 2), 3);
        assert_eq!(solution.get(1, 0), 4);

        let json = serde_json::to_value(Report::Sudoku(solve_sudoku_grid(puzzle))).unwrap();
        assert!(json.get("seed").is_none());
    }

    #[test]
    fn solve_maze_grid_works() {
        let maze = Maze::from_text(
            "#######\n\
             #.....#\n\
             #.###.#\n\
             #...#.#\n\
             #######",
        )
        .unwrap();
        let report = solve_maze_grid(maze);
        assert_eq!(report.end, (3, 5));
        assert_eq!(report.seed, None);
        let path = report.solution_path.unwrap();
        assert_eq!(path.first(), Some(&(1, 1)));
        assert_eq!(path.last(), Some(&(3, 5)));
        assert!(path.iter().all(|&p| report.maze.is_path(p)));
    }

    #[test]
    fn solve_maze_request_rejects_tiny() {
        let request = MazeRequest {
            width: 1,
            height: 1,
            seed: Some(0),
        };
        let err = solve_maze_request(&request, &Limits::default()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidParameter { name: "width", .. }));
    }

    #[test]
    fn request_from_json_works() {
        let request: Request = serde_json::from_str(r#"{"puzzle": "maze", "width": 11}"#).unwrap();
        assert_eq!(
            request,
            Request::Maze(MazeRequest {
                width: 11,
                height: 31,
                seed: None
            })
        );
        let request: Request = serde_json::from_str(r#"{"puzzle": "hanoi"}"#).unwrap();
        assert_eq!(request, Request::Hanoi(HanoiRequest { num_disks: 10 }));
    }

    #[test]
    fn report_to_json_works() {
        let report = Request::Hanoi(HanoiRequest { num_disks: 2 })
            .run(&Limits::default())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["puzzle"], "hanoi");
        assert_eq!(json["solution"][1], "Move disk 2 from A to C");
        assert!(json["time_taken_ms"].is_number());
        assert!(json["memory_used_mb"].is_number());
        assert!(json.get("moves").is_none());
    }

    #[test]
    fn failed_sudoku_serializes_null_solution() {
        let report = SudokuReport {
            seed: Some(0),
            puzzle: Sudoku::empty(),
            solution: None,
            success: false,
            placements: 0,
            backtracks: 0,
            metrics: Metrics::default().into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["solution"].is_null());
        assert_eq!(json["success"], false);
    }
}
