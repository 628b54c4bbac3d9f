/// Safe bounds for oversized inputs.
///
/// Every engine runs on an explicit heap stack, so these bound memory rather
/// than call depth: a hanoi plan holds `2^n - 1` moves and a maze search
/// copies its path into every stack frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_disks: u32,
    pub max_maze_dimension: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_disks: 20,
            max_maze_dimension: 501,
        }
    }
}
