//! Timing and an approximate memory figure for each solve.
//!
//! The memory figure is a proxy: the shallow byte size of the containers a
//! search owns (element count times element size, plus container headers, plus
//! the peak size of the search stack where the engine tracks it). Allocator
//! overhead, spare capacity and hash-table buckets are not counted, so it is
//! no substitute for heap profiling.

use std::{
    mem::size_of,
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::{
    graph::SearchResult,
    maze::Position,
    solver::{Placement, SolveStats},
};

/// Approximate bytes held by a value's containers.
pub trait Footprint {
    fn footprint(&self) -> usize;
}

impl<T> Footprint for Vec<T> {
    fn footprint(&self) -> usize {
        size_of::<Vec<T>>() + self.len() * size_of::<T>()
    }
}

impl<T: Footprint> Footprint for Option<T> {
    fn footprint(&self) -> usize {
        self.as_ref().map_or(0, Footprint::footprint)
    }
}

/// A failed operation holds nothing.
impl<T: Footprint, E> Footprint for Result<T, E> {
    fn footprint(&self) -> usize {
        self.as_ref().map_or(0, Footprint::footprint)
    }
}

impl Footprint for SolveStats {
    /// The placement stack at its deepest.
    fn footprint(&self) -> usize {
        self.peak_depth * size_of::<Placement>()
    }
}

impl Footprint for SearchResult<Position> {
    /// Returned path, peak stack with every frame's own path copy, and the
    /// visited set.
    fn footprint(&self) -> usize {
        let frame = size_of::<(Position, Vec<Position>)>();
        self.path.footprint()
            + self.peak_frames * frame
            + self.peak_path_nodes * size_of::<Position>()
            + self.visited * size_of::<Position>()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub elapsed: Duration,
    /// Growth of the footprint across the measured operation.
    pub memory_bytes: usize,
}

impl Metrics {
    pub fn time_taken_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    pub fn memory_used_mb(&self) -> f64 {
        self.memory_bytes as f64 / (1024.0 * 1024.0)
    }
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2} ms, {:.4} MB",
            self.time_taken_ms(),
            self.memory_used_mb()
        )
    }
}

/// Wire form of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsReport {
    pub time_taken_ms: f64,
    pub memory_used_mb: f64,
}

impl From<Metrics> for MetricsReport {
    fn from(metrics: Metrics) -> Self {
        Self {
            time_taken_ms: metrics.time_taken_ms(),
            memory_used_mb: metrics.memory_used_mb(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Measured<T> {
    pub value: T,
    pub metrics: Metrics,
}

/// Runs `op` and records its wall time and how far the footprint of its
/// result grew past `before` bytes.
pub fn measure<T, F>(before: usize, op: F) -> Measured<T>
where
    T: Footprint,
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let value = op();
    let elapsed = start.elapsed();
    let memory_bytes = value.footprint().saturating_sub(before);
    Measured {
        value,
        metrics: Metrics {
            elapsed,
            memory_bytes,
        },
    }
}
