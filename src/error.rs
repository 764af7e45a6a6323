//! Error types for persistent vector operations.
//!
//! Every fallible operation on [`PersistentVector`](crate::persistent::PersistentVector)
//! reports one of the [`VectorError`] variants. Operations are pure, so
//! repeating a failed call with the same inputs fails the same way.

use std::fmt;

/// Errors reported by vector construction, reads, updates and removals.
///
/// # Examples
///
/// ```rust
/// use radix_vector::VectorError;
///
/// let error = VectorError::OutOfRange { index: 7, length: 3 };
/// assert_eq!(
///     format!("{error}"),
///     "index 7 is out of range for a vector of length 3"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorError {
    /// Remove-last was requested on a vector with no elements.
    EmptyCollection,
    /// An index outside `[0, length)` was used for a read or an update.
    OutOfRange {
        /// The rejected index.
        index: usize,
        /// The length of the vector at the time of the call.
        length: usize,
    },
    /// The branching power is outside the supported range.
    InvalidBranchingPower {
        /// The rejected power.
        power: u32,
    },
}

impl fmt::Display for VectorError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCollection => {
                write!(formatter, "cannot remove the last element of an empty vector")
            }
            Self::OutOfRange { index, length } => write!(
                formatter,
                "index {index} is out of range for a vector of length {length}"
            ),
            Self::InvalidBranchingPower { power } => write!(
                formatter,
                "branching power {power} is not in 1..={}",
                crate::config::MAX_BRANCHING_POWER
            ),
        }
    }
}

impl std::error::Error for VectorError {}
