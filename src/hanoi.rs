use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::Limits,
    error::{Result, SolverError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Peg {
    A,
    B,
    C,
}

impl Peg {
    fn index(self) -> usize {
        match self {
            Peg::A => 0,
            Peg::B => 1,
            Peg::C => 2,
        }
    }
}

impl fmt::Display for Peg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Peg::A => "A",
            Peg::B => "B",
            Peg::C => "C",
        };
        f.write_str(label)
    }
}

/// Disks are numbered from 1 (smallest) to n (largest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub disk: u32,
    pub from: Peg,
    pub to: Peg,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move disk {} from {} to {}", self.disk, self.from, self.to)
    }
}

enum Frame {
    Solve { n: u32, from: Peg, to: Peg, via: Peg },
    Emit(Move),
}

/// Plans the minimal move sequence for `n` disks from A to C, using B.
pub fn plan(n: u32) -> Result<Vec<Move>> {
    plan_between(n, Peg::A, Peg::C, Peg::B, &Limits::default())
}

/// Plans the minimal move sequence for `n` disks stacked on `from`.
///
/// Moving `n` disks is moving `n - 1` of them out of the way onto `via`,
/// moving disk `n`, then moving the `n - 1` back on top of it. The sub-problems
/// are kept on an explicit stack, pushed in reverse so they pop in order.
pub fn plan_between(n: u32, from: Peg, to: Peg, via: Peg, limits: &Limits) -> Result<Vec<Move>> {
    if n == 0 {
        return Err(SolverError::invalid("num_disks", n, "must be at least 1"));
    }
    if n > limits.max_disks {
        return Err(SolverError::exhausted("num_disks", n, limits.max_disks));
    }

    let mut moves = Vec::with_capacity(1usize.checked_shl(n).unwrap_or(0).saturating_sub(1));
    let mut stack = vec![Frame::Solve { n, from, to, via }];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Emit(m) => moves.push(m),
            Frame::Solve { n: 1, from, to, .. } => moves.push(Move { disk: 1, from, to }),
            Frame::Solve { n, from, to, via } => {
                stack.push(Frame::Solve {
                    n: n - 1,
                    from: via,
                    to,
                    via: from,
                });
                stack.push(Frame::Emit(Move { disk: n, from, to }));
                stack.push(Frame::Solve {
                    n: n - 1,
                    from,
                    to: via,
                    via: to,
                });
            }
        }
    }
    debug!("[hanoi] Planned {} moves for {n} disks", moves.len());
    Ok(moves)
}

/// Peg contents, bottom disk first.
pub type Towers = [Vec<u32>; 3];

/// Replays `moves` against three pegs that start with `n` disks on `from`.
///
/// Fails on the first move that takes a disk other than the top of its
/// source peg, or puts a disk onto a smaller one.
pub fn simulate(n: u32, from: Peg, moves: &[Move]) -> std::result::Result<Towers, String> {
    let mut towers: Towers = [Vec::new(), Vec::new(), Vec::new()];
    towers[from.index()] = (1..=n).rev().collect();
    for (step, m) in moves.iter().enumerate() {
        match towers[m.from.index()].last() {
            Some(&top) if top == m.disk => {}
            top => {
                return Err(format!(
                    "step {step}: disk {} is not on top of peg {} (top is {top:?})",
                    m.disk, m.from
                ))
            }
        }
        if let Some(&below) = towers[m.to.index()].last() {
            if below < m.disk {
                return Err(format!(
                    "step {step}: disk {} placed on smaller disk {below} at peg {}",
                    m.disk, m.to
                ));
            }
        }
        towers[m.from.index()].pop();
        towers[m.to.index()].push(m.disk);
    }
    Ok(towers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_two_disks_works() {
        let moves = plan(2).unwrap();
        let text: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
        assert_eq!(
            text,
            vec![
                "Move disk 1 from A to B",
                "Move disk 2 from A to C",
                "Move disk 1 from B to C",
            ]
        );
    }

    #[test]
    fn plan_one_disk_works() {
        let moves = plan(1).unwrap();
        assert_eq!(
            moves,
            vec![Move {
                disk: 1,
                from: Peg::A,
                to: Peg::C
            }]
        );
    }

    #[test]
    fn plan_length_and_legality_works() {
        for n in 1..=12 {
            let moves = plan(n).unwrap();
            assert_eq!(moves.len(), (1usize << n) - 1);
            let towers = simulate(n, Peg::A, &moves).unwrap();
            assert!(towers[0].is_empty());
            assert!(towers[1].is_empty());
            assert_eq!(towers[2], (1..=n).rev().collect::<Vec<_>>());
        }
    }

    #[test]
    fn plan_between_other_pegs_works() {
        let moves = plan_between(4, Peg::B, Peg::A, Peg::C, &Limits::default()).unwrap();
        let towers = simulate(4, Peg::B, &moves).unwrap();
        assert_eq!(towers[0], vec![4, 3, 2, 1]);
    }

    #[test]
    fn plan_fails_on_zero_disks() {
        let err = plan(0).unwrap_err();
        assert!(matches!(
            err,
            SolverError::InvalidParameter {
                name: "num_disks",
                ..
            }
        ));
    }

    #[test]
    fn plan_fails_above_limit() {
        let limits = Limits {
            max_disks: 5,
            ..Limits::default()
        };
        let err = plan_between(6, Peg::A, Peg::C, Peg::B, &limits).unwrap_err();
        assert_eq!(err, SolverError::exhausted("num_disks", 6u32, 5u32));
    }

    #[test]
    fn simulate_rejects_buried_disk() {
        let moves = [Move {
            disk: 2,
            from: Peg::A,
            to: Peg::C,
        }];
        let err = simulate(2, Peg::A, &moves).unwrap_err();
        println!("{err}");
    }

    #[test]
    fn simulate_rejects_larger_on_smaller() {
        let moves = [
            Move {
                disk: 1,
                from: Peg::A,
                to: Peg::C,
            },
            Move {
                disk: 2,
                from: Peg::A,
                to: Peg::C,
            },
        ];
        assert!(simulate(2, Peg::A, &moves).is_err());
    }
}
