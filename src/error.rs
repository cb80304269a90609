use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a single cut length was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemIssue {
    NonPositive,
    NotFinite,
    /// The buffered length cannot fit even in an empty bar.
    ExceedsCapacity { buffered: f64, capacity: f64 },
}

impl fmt::Display for ItemIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemIssue::NonPositive => write!(f, "must be greater than zero"),
            ItemIssue::NotFinite => write!(f, "must be a finite number"),
            ItemIssue::ExceedsCapacity { buffered, capacity } => write!(
                f,
                "buffered length {buffered:.2} exceeds stock length {capacity}"
            ),
        }
    }
}

/// Errors reported by [`crate::Packer`]. All but `ResourceExhausted` are
/// raised before any search work is done.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    #[error("invalid stock length {capacity}: must be a finite number greater than zero and at most {}", crate::types::MAX_CAPACITY)]
    InvalidCapacity { capacity: f64 },

    #[error("invalid buffer {buffer}: must be a finite number, zero or greater")]
    InvalidBuffer { buffer: f64 },

    #[error("invalid cut #{} of length {length}: {reason}", .index + 1)]
    InvalidItem {
        index: usize,
        length: f64,
        reason: ItemIssue,
    },

    #[error("search budget exhausted after {nodes_explored} nodes ({elapsed:?})")]
    ResourceExhausted {
        nodes_explored: u64,
        elapsed: Duration,
    },
}

impl PackError {
    /// True for errors caused by the caller's input rather than search effort.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, PackError::ResourceExhausted { .. })
    }
}
