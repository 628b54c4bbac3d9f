use std::{fmt, time::Duration};

pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors surfaced to the caller before (or instead of) a search result.
///
/// Exhausted searches are not errors: an unsolvable sudoku or a maze without
/// a route to the exit are reported as regular outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    InvalidParameter {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },
    /// Input would need more memory or stack than the configured limits allow.
    ResourceExhausted {
        name: &'static str,
        value: u64,
        limit: u64,
    },
    DeadlineExceeded {
        timeout: Duration,
    },
    WorkerFailed(String),
}

impl SolverError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<i64>, reason: &'static str) -> Self {
        SolverError::InvalidParameter {
            name,
            value: value.into(),
            reason,
        }
    }

    pub(crate) fn exhausted(name: &'static str, value: impl Into<u64>, limit: impl Into<u64>) -> Self {
        SolverError::ResourceExhausted {
            name,
            value: value.into(),
            limit: limit.into(),
        }
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "Invalid {name} = {value}: {reason}"),
            SolverError::ResourceExhausted { name, value, limit } => {
                write!(f, "{name} = {value} exceeds the safe limit of {limit}")
            }
            SolverError::DeadlineExceeded { timeout } => {
                write!(f, "No result within {} ms", timeout.as_millis())
            }
            SolverError::WorkerFailed(msg) => write!(f, "Worker failed: {msg}"),
        }
    }
}

impl std::error::Error for SolverError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_works() {
        let err = SolverError::invalid("num_disks", 0, "must be at least 1");
        assert_eq!(err.to_string(), "Invalid num_disks = 0: must be at least 1");

        let err = SolverError::exhausted("width", 9001u64, 501u64);
        assert_eq!(err.to_string(), "width = 9001 exceeds the safe limit of 501");

        let err = SolverError::DeadlineExceeded {
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "No result within 250 ms");
    }
}
