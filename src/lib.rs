//! One-dimensional cutting stock: assign required cut lengths, each widened by
//! a kerf allowance, to the fewest stock bars of a fixed length.

pub mod error;
pub mod render;
pub mod solver;
pub mod types;

pub use error::{ItemIssue, PackError};
pub use solver::{Packer, pack};
pub use types::{Bin, Demand, SearchBudget, SearchStats, Solution};
