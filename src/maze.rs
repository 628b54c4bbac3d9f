use colored::Colorize;
use log::debug;
use rand::{seq::SliceRandom, Rng};
use serde::{Serialize, Serializer};

use crate::{
    config::Limits,
    error::{Result, SolverError},
    graph::{dfs, Graph, GraphControl, SearchResult},
};

/// `(row, col)`
pub type Position = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Path,
}

/// Walls are written as 1 and paths as 0.
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Cell::Wall => 1,
            Cell::Path => 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Maze {
    fn filled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    /// Builds a maze from rows of text, `#` for walls and anything else for paths.
    /// At least 3 rows of at least 3 cells, so entry and exit are inside the grid.
    pub fn from_text(text: &str) -> std::result::Result<Self, String> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        if width < 3 || lines.len() < 3 {
            return Err(format!(
                "Maze must be at least 3x3, got {width}x{}",
                lines.len()
            ));
        }
        let mut cells = Vec::with_capacity(width * lines.len());
        for (i, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(format!("Row {i} is not {width} cells wide"));
            }
            cells.extend(line.chars().map(|c| if c == '#' { Cell::Wall } else { Cell::Path }));
        }
        Ok(Self {
            width,
            height: lines.len(),
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Top-left open cell.
    pub fn entry(&self) -> Position {
        (1, 1)
    }

    /// Bottom-right open cell.
    pub fn exit(&self) -> Position {
        (self.height - 2, self.width - 2)
    }

    pub fn get(&self, (row, col): Position) -> Option<Cell> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub fn is_path(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Path)
    }

    fn carve(&mut self, (row, col): Position) {
        self.cells[row * self.width + col] = Cell::Path;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub fn count_paths(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Path).count()
    }

    /// Orthogonal open neighbours: right, left, down, up.
    pub fn open_neighbours(&self, (row, col): Position) -> Vec<Position> {
        let mut out = Vec::with_capacity(4);
        let candidates = [
            Some((row, col + 1)),
            col.checked_sub(1).map(|c| (row, c)),
            Some((row + 1, col)),
            row.checked_sub(1).map(|r| (r, col)),
        ];
        for pos in candidates.into_iter().flatten() {
            if self.is_path(pos) {
                out.push(pos);
            }
        }
        out
    }

    /// Renders the maze with `path` highlighted.
    pub fn render(&self, path: Option<&[Position]>) -> String {
        let on_path = |pos: Position| path.map_or(false, |p| p.contains(&pos));
        let mut out = String::with_capacity((self.width * 2 + 1) * self.height);
        for (i, row) in self.rows().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                let tile = match cell {
                    Cell::Wall => "  ".on_white().to_string(),
                    Cell::Path if on_path((i, j)) => "()".green().bold().to_string(),
                    Cell::Path => "  ".to_string(),
                };
                out.push_str(&tile);
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Maze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(None))
    }
}

impl Serialize for Maze {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// Bumps an even dimension to the next odd one.
pub fn normalize_dimension(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

fn check_dimension(name: &'static str, n: usize, limits: &Limits) -> Result<()> {
    if n < 3 {
        return Err(SolverError::invalid(name, n as i64, "must be at least 3"));
    }
    if n % 2 == 0 {
        return Err(SolverError::invalid(name, n as i64, "must be odd"));
    }
    if n > limits.max_maze_dimension {
        return Err(SolverError::exhausted(
            name,
            n as u64,
            limits.max_maze_dimension as u64,
        ));
    }
    Ok(())
}

/// Carving steps two cells at a time: up, down, left, right.
const STEPS: [(isize, isize); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

/// One cell of the carving walk and the directions it has yet to try.
struct CarveFrame {
    pos: Position,
    steps: [(isize, isize); 4],
    next: usize,
}

impl CarveFrame {
    fn new<R: Rng + ?Sized>(pos: Position, rng: &mut R) -> Self {
        let mut steps = STEPS;
        steps.shuffle(rng);
        Self {
            pos,
            steps,
            next: 0,
        }
    }
}

/// Generates a perfect maze by randomized backtracking.
///
/// Carving starts from a random odd cell. Each frame tries its four
/// directions in its own shuffled order; a neighbour two cells away that is
/// still a wall gets itself and the wall between carved, and carving moves on
/// from there. A frame with no directions left is popped, which is the
/// backtrack. Entry and exit are carved at the end regardless.
pub fn generate<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    rng: &mut R,
    limits: &Limits,
) -> Result<Maze> {
    check_dimension("width", width, limits)?;
    check_dimension("height", height, limits)?;

    let mut maze = Maze::filled(width, height);
    let start = (
        rng.gen_range(0..height / 2) * 2 + 1,
        rng.gen_range(0..width / 2) * 2 + 1,
    );
    maze.carve(start);
    let mut stack = vec![CarveFrame::new(start, rng)];
    let mut peak = 1;

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.steps.len() {
            stack.pop();
            continue;
        }
        let (dr, dc) = frame.steps[frame.next];
        frame.next += 1;
        let (row, col) = frame.pos;
        let (Some(nr), Some(nc)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
            continue;
        };
        if maze.get((nr, nc)) != Some(Cell::Wall) {
            continue;
        }
        maze.carve(((row + nr) / 2, (col + nc) / 2));
        maze.carve((nr, nc));
        stack.push(CarveFrame::new((nr, nc), rng));
        peak = peak.max(stack.len());
    }

    let (entry, exit) = (maze.entry(), maze.exit());
    maze.carve(entry);
    maze.carve(exit);
    debug!("[maze] Carved {width}x{height} from {start:?}, deepest walk {peak}");
    Ok(maze)
}

struct MazeGraph<'a> {
    maze: &'a Maze,
    end: Position,
}

impl Graph for MazeGraph<'_> {
    type Node = Position;

    fn neighbours(&self, node: &Position) -> Vec<Position> {
        self.maze.open_neighbours(*node)
    }

    fn check_goal(&self, node: &Position) -> GraphControl {
        if *node == self.end {
            GraphControl::Finish
        } else if !self.maze.is_path(*node) {
            GraphControl::Prune
        } else {
            GraphControl::Continue
        }
    }
}

/// Finds a route from `start` to `end` by depth-first search.
///
/// The route is simple and runs through adjacent open cells, but it is not
/// necessarily the shortest. A start on a wall or off the grid finds nothing.
pub fn solve_maze(maze: &Maze, start: Position, end: Position) -> SearchResult<Position> {
    if !maze.is_path(start) || !maze.is_path(end) {
        debug!("[maze] Start {start:?} or end {end:?} is not an open cell");
        return SearchResult {
            path: None,
            iterations: 0,
            peak_frames: 0,
            peak_path_nodes: 0,
            visited: 0,
        };
    }
    let graph = MazeGraph { maze, end };
    dfs(&graph, start)
}
