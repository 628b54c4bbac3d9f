use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::info;
use puzzle_search::{
    hanoi::{self, Peg},
    maze::Maze,
    request::{HanoiReport, MazeReport, SudokuReport},
    runner, solve_hanoi, solve_maze_grid, solve_maze_request, solve_sudoku_grid,
    solve_sudoku_request, HanoiRequest, Limits, MazeRequest, Report, Request, Sudoku,
    SudokuRequest,
};

#[derive(Parser)]
#[command(name = "puzzle-search")]
#[command(about = "Generate, solve and measure Tower of Hanoi, Sudoku and maze puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Refuse Tower of Hanoi plans above this many disks
    #[arg(long, global = true, default_value = "20")]
    max_disks: u32,

    /// Refuse mazes wider or taller than this
    #[arg(long, global = true, default_value = "501")]
    max_dimension: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the moves for a Tower of Hanoi
    Hanoi {
        #[arg(long, default_value = "10")]
        disks: u32,

        /// Replay the plan against three pegs and check every move
        #[arg(long)]
        verify: bool,

        #[arg(long)]
        json: bool,
    },
    /// Cut cells out of a solved grid and solve it back, or solve a given grid
    Sudoku {
        /// Solve the grid in this file: one line per row, blank, `.` or 0 for empty
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Number of cells to remove (0 to 81)
        #[arg(long, default_value = "60")]
        difficulty: usize,

        #[arg(long)]
        seed: Option<u64>,

        /// Scramble the solved grid before removing cells
        #[arg(long)]
        varied: bool,

        #[arg(long)]
        json: bool,
    },
    /// Carve a maze and walk from the top-left to the bottom-right corner
    Maze {
        /// Walk the maze in this file instead, `#` for walls
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        #[arg(long, default_value = "31")]
        width: usize,

        #[arg(long, default_value = "31")]
        height: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },
    /// Run a JSON request such as {"puzzle": "maze", "width": 21}
    Run {
        /// Path to request JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[arg(long)]
        stdin: bool,

        /// Give up after this many seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },
    /// Run many independent requests across worker threads
    Bench {
        #[arg(long, value_enum, default_value = "sudoku")]
        puzzle: PuzzleKind,

        #[arg(long, default_value = "16")]
        count: usize,

        /// Defaults to one worker per CPU
        #[arg(long)]
        workers: Option<usize>,

        /// Request i uses seed + i, wrapping around
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PuzzleKind {
    Hanoi,
    Sudoku,
    Maze,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let limits = Limits {
        max_disks: cli.max_disks,
        max_maze_dimension: cli.max_dimension,
    };

    let outcome = match cli.command {
        Commands::Hanoi {
            disks,
            verify,
            json,
        } => solve_hanoi(&HanoiRequest { num_disks: disks }, &limits)
            .map(|report| print_hanoi(&report, verify, json)),
        Commands::Sudoku {
            file: Some(path),
            json,
            ..
        } => {
            let text = read_text(&path);
            let puzzle = Sudoku::from_text(&text)
                .unwrap_or_else(|e| fail(format!("Invalid grid in {path:?}: {e}")));
            print_sudoku(&solve_sudoku_grid(puzzle), json);
            Ok(())
        }
        Commands::Sudoku {
            file: None,
            difficulty,
            seed,
            varied,
            json,
        } => solve_sudoku_request(
            &SudokuRequest {
                difficulty,
                seed,
                varied,
            },
            &limits,
        )
        .map(|report| print_sudoku(&report, json)),
        Commands::Maze {
            file: Some(path),
            json,
            ..
        } => {
            let text = read_text(&path);
            let maze = Maze::from_text(&text)
                .unwrap_or_else(|e| fail(format!("Invalid maze in {path:?}: {e}")));
            print_maze(&solve_maze_grid(maze), json);
            Ok(())
        }
        Commands::Maze {
            file: None,
            width,
            height,
            seed,
            json,
        } => solve_maze_request(
            &MazeRequest {
                width,
                height,
                seed,
            },
            &limits,
        )
        .map(|report| print_maze(&report, json)),
        Commands::Run {
            file,
            stdin,
            timeout,
        } => {
            let request = read_request(file, stdin);
            runner::run_with_deadline(request, limits, Duration::from_secs(timeout))
                .map(|report| print_json(&report))
        }
        Commands::Bench {
            puzzle,
            count,
            workers,
            seed,
        } => {
            bench(puzzle, count, workers, seed, limits);
            Ok(())
        }
    };

    if let Err(err) = outcome {
        eprintln!("{}", format!("{err}").red());
        process::exit(1);
    }
}

fn fail(msg: String) -> ! {
    eprintln!("{}", msg.red());
    process::exit(1);
}

fn read_text(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("Failed to read file {path:?}: {e}")))
}

fn read_request(file: Option<PathBuf>, stdin: bool) -> Request {
    let text = if stdin {
        let mut buffer = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buffer) {
            fail(format!("Failed to read from stdin: {e}"));
        }
        buffer
    } else if let Some(path) = file {
        read_text(&path)
    } else {
        fail("Must provide either a file path or --stdin".to_string());
    };
    serde_json::from_str(&text).unwrap_or_else(|e| fail(format!("Invalid request JSON: {e}")))
}

fn print_json(report: &Report) {
    match serde_json::to_string_pretty(report) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(format!("Failed to encode report: {e}")),
    }
}

fn print_hanoi(report: &HanoiReport, verify: bool, json: bool) {
    if json {
        print_json(&Report::Hanoi(report.clone()));
    } else {
        for line in &report.solution {
            println!("{line}");
        }
        println!(
            "{} moves for {} disks ({:.2} ms, {:.4} MB)",
            report.solution.len(),
            report.num_disks,
            report.metrics.time_taken_ms,
            report.metrics.memory_used_mb
        );
    }
    if verify {
        match hanoi::simulate(report.num_disks, Peg::A, &report.moves) {
            Ok(_) => println!("{}", "Plan verified: every move is legal".green()),
            Err(err) => fail(format!("Plan is illegal: {err}")),
        }
    }
}

fn print_sudoku(report: &SudokuReport, json: bool) {
    if json {
        return print_json(&Report::Sudoku(report.clone()));
    }
    match report.seed {
        Some(seed) => println!("Input (seed {seed}):\n{}", report.puzzle),
        None => println!("Input:\n{}", report.puzzle),
    }
    match &report.solution {
        Some(solution) => println!(
            "Found a solution with {} placements and {} backtracks ({:.2} ms, {:.4} MB).\n{solution}",
            report.placements,
            report.backtracks,
            report.metrics.time_taken_ms,
            report.metrics.memory_used_mb
        ),
        None => println!(
            "{}",
            format!("No solution found ({} backtracks)", report.backtracks).red()
        ),
    }
}

fn print_maze(report: &MazeReport, json: bool) {
    if json {
        return print_json(&Report::Maze(report.clone()));
    }
    println!("{}", report.maze.render(report.solution_path.as_deref()));
    match &report.solution_path {
        Some(path) => println!(
            "Path of {} cells from {:?} to {:?} after {} iterations ({}{:.2} ms, {:.4} MB)",
            path.len(),
            report.start,
            report.end,
            report.iterations,
            report.seed.map_or(String::new(), |seed| format!("seed {seed}, ")),
            report.metrics.time_taken_ms,
            report.metrics.memory_used_mb
        ),
        None => println!("{}", "No path found".red()),
    }
}

fn bench_requests(puzzle: PuzzleKind, count: usize, seed: u64) -> Vec<Request> {
    (0..count as u64)
        .map(|i| {
            let seed = Some(seed.wrapping_add(i));
            match puzzle {
                PuzzleKind::Hanoi => Request::Hanoi(HanoiRequest::default()),
                PuzzleKind::Sudoku => Request::Sudoku(SudokuRequest {
                    seed,
                    ..SudokuRequest::default()
                }),
                PuzzleKind::Maze => Request::Maze(MazeRequest {
                    seed,
                    ..MazeRequest::default()
                }),
            }
        })
        .collect()
}

fn bench(puzzle: PuzzleKind, count: usize, workers: Option<usize>, seed: u64, limits: Limits) {
    let workers = workers.unwrap_or_else(runner::default_workers);
    let requests = bench_requests(puzzle, count, seed);
    info!("Running {count} requests on {workers} workers");

    let mut solved = 0;
    let mut failed = 0;
    let mut times = Vec::with_capacity(count);
    for result in runner::run_batch(requests, limits, workers) {
        match result {
            Ok(report) => {
                if report.solved() {
                    solved += 1;
                }
                times.push(report.metrics().time_taken_ms);
            }
            Err(err) => {
                failed += 1;
                eprintln!("{}", format!("{err}").red());
            }
        }
    }
    let total: f64 = times.iter().sum();
    let slowest = times.iter().copied().fold(0.0, f64::max);
    let mean = if times.is_empty() {
        0.0
    } else {
        total / times.len() as f64
    };
    println!(
        "{count} requests, {solved} solved, {failed} failed; mean {mean:.2} ms, slowest {slowest:.2} ms"
    );
}
