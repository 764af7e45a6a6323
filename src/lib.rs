//! # radix-vector
//!
//! A persistent (immutable, structurally shared) vector built on a
//! bit-partitioned trie with a tail buffer.
//!
//! ## Overview
//!
//! Every mutation (append, update, remove-last) returns a new version of the
//! vector without copying the whole collection: only the nodes on the path
//! from the root to the touched leaf are cloned, and everything else is
//! shared with the previous version. Versions are never mutated after they
//! are created, so any number of them can be held and read at once.
//!
//! - [`PersistentVector`]: the version handle
//! - [`VectorConfig`]: the branching power (`W = 2^P` children per node)
//! - [`VectorError`]: errors reported by fallible operations
//!
//! ## Feature Flags
//!
//! - `arc` (default): share nodes through `Arc`, making versions `Send + Sync`
//! - `serde`: serialize vectors as sequences and configurations as structs
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use radix_vector::prelude::*;
//!
//! let vector = PersistentVector::from_elements([1, 2, 3], 1).unwrap();
//! let appended = vector.push_back_many([4, 5, 6]);
//! let updated = appended.update(2, 4).unwrap();
//! let (popped, last) = updated.pop_back().unwrap();
//!
//! assert_eq!(vector.to_vec(), vec![1, 2, 3]);
//! assert_eq!(updated.to_vec(), vec![1, 2, 4, 4, 5, 6]);
//! assert_eq!(last, 6);
//! assert_eq!(popped.len(), 5);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use radix_vector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::VectorConfig;
    pub use crate::error::VectorError;
    pub use crate::persistent::*;
}

pub mod config;
pub mod error;
pub mod persistent;

pub use config::VectorConfig;
pub use error::VectorError;
pub use persistent::PersistentVector;
