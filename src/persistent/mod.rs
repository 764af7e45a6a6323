//! Persistent (immutable) vector built on a bit-partitioned trie.
//!
//! - [`PersistentVector`]: the version handle
//! - [`PersistentVectorIterator`], [`PersistentVectorIntoIterator`],
//!   [`PersistentVectorChunks`]: ordered traversal
//! - [`TreeView`]: a debugging dump of the trie
//!
//! # Structural Sharing
//!
//! Every mutation clones only the nodes on the root-to-leaf path it touches.
//! All other subtrees are shared by reference with the version it was derived
//! from, and nodes are reclaimed once the last version referencing them is
//! dropped.
//!
//! ```rust
//! use radix_vector::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Some(&50));
//!
//! let updated = vector.update(50, 999).unwrap();
//! assert_eq!(vector.get(50), Some(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Some(&999));   // New version
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled (default), this is `std::sync::Arc`,
/// so versions can be read from several threads at once.
///
/// When the `arc` feature is disabled, this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod iterator;
mod node;
mod vector;

pub use iterator::PersistentVectorChunks;
pub use iterator::PersistentVectorIntoIterator;
pub use iterator::PersistentVectorIterator;
pub use vector::PersistentVector;
pub use vector::TreeView;

// =============================================================================
// Tests
// =============================================================================
