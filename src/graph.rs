use std::{collections::HashSet, hash::Hash};

use log::debug;

pub trait Graph {
    type Node: Clone + Eq + Hash;
    fn neighbours(&self, node: &Self::Node) -> Vec<Self::Node>;
    fn check_goal(&self, node: &Self::Node) -> GraphControl;
}

pub enum GraphControl {
    Finish,
    Continue,
    Prune,
}

/// Outcome of a path-carrying depth-first search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<N> {
    /// Nodes from the start to the goal, both included.
    pub path: Option<Vec<N>>,
    pub iterations: usize,
    /// Largest number of frames the stack held at once.
    pub peak_frames: usize,
    /// Total nodes stored across all frame paths at the peak.
    pub peak_path_nodes: usize,
    pub visited: usize,
}

/// Depth-first search over `(node, path)` frames.
///
/// Every pushed frame owns its own copy of the path. Nodes are marked visited
/// when popped, so a node can sit on the stack several times before it is
/// expanded once; the visited check on pop drops the duplicates.
pub fn dfs<G: Graph>(graph: &G, start: G::Node) -> SearchResult<G::Node> {
    let mut iterations = 0;
    let mut peak_frames = 0;
    let mut path_nodes = 1;
    let mut peak_path_nodes = 0;
    let mut stack = vec![(start.clone(), vec![start])];
    let mut visited = HashSet::new();

    while let Some((node, path)) = stack.pop() {
        peak_frames = peak_frames.max(stack.len() + 1);
        peak_path_nodes = peak_path_nodes.max(path_nodes);
        path_nodes -= path.len();
        iterations += 1;
        match graph.check_goal(&node) {
            GraphControl::Finish => {
                debug!("[dfs] Goal reached after {iterations} iterations");
                return SearchResult {
                    path: Some(path),
                    iterations,
                    peak_frames,
                    peak_path_nodes,
                    visited: visited.len(),
                };
            }
            GraphControl::Prune => continue,
            GraphControl::Continue => {}
        }
        if !visited.insert(node.clone()) {
            continue;
        }
        for neighbour in graph.neighbours(&node) {
            if visited.contains(&neighbour) {
                continue;
            }
            let mut next_path = path.clone();
            next_path.push(neighbour.clone());
            path_nodes += next_path.len();
            stack.push((neighbour, next_path));
        }
    }
    debug!("[dfs] Stack exhausted after {iterations} iterations");
    SearchResult {
        path: None,
        iterations,
        peak_frames,
        peak_path_nodes,
        visited: visited.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Adjacency-list graph; node 0 is the start.
    struct Lists {
        edges: Vec<Vec<usize>>,
        goal: usize,
    }

    impl Graph for Lists {
        type Node = usize;

        fn neighbours(&self, node: &usize) -> Vec<usize> {
            self.edges[*node].clone()
        }

        fn check_goal(&self, node: &usize) -> GraphControl {
            if *node == self.goal {
                GraphControl::Finish
            } else {
                GraphControl::Continue
            }
        }
    }

    #[test]
    fn dfs_follows_last_pushed_neighbour_first() {
        // 0 -> {1, 2}, both lead to 3. 2 is pushed last, so it is explored first.
        let graph = Lists {
            edges: vec![vec![1, 2], vec![3], vec![3], vec![]],
            goal: 3,
        };
        let result = dfs(&graph, 0);
        assert_eq!(result.path, Some(vec![0, 2, 3]));
    }

    #[test]
    fn dfs_returns_none_when_goal_unreachable() {
        let graph = Lists {
            edges: vec![vec![1], vec![0], vec![]],
            goal: 2,
        };
        let result = dfs(&graph, 0);
        assert_eq!(result.path, None);
        assert_eq!(result.visited, 2);
    }

    #[test]
    fn dfs_marks_visited_on_pop() {
        // 1 is pushed by 0 and again by 3 before it is expanded.
        let graph = Lists {
            edges: vec![vec![1, 2], vec![3], vec![3], vec![1, 2]],
            goal: 99,
        };
        let result = dfs(&graph, 0);
        assert_eq!(result.path, None);
        assert_eq!(result.visited, 4);
        assert!(result.iterations > result.visited);
    }

    #[test]
    fn dfs_start_is_goal() {
        let graph = Lists {
            edges: vec![vec![]],
            goal: 0,
        };
        let result = dfs(&graph, 0);
        assert_eq!(result.path, Some(vec![0]));
        assert_eq!(result.iterations, 1);
    }
}
