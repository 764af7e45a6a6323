//! Persistent (immutable) vector based on a bit-partitioned trie.
//!
//! This module provides [`PersistentVector`], an immutable dynamic array
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `PersistentVector` is a `W`-way branching trie (`W = 2^P`, configurable per
//! lineage, 32 by default) with a tail buffer, in the style of Clojure's
//! `PersistentVector`. It provides:
//!
//! - `O(log_W N)` random access
//! - `O(log_W N)` `push_back` (amortized O(1) with tail optimization)
//! - `O(log_W N)` update
//! - `O(log_W N)` `pop_back` (O(1) while the tail holds more than one element)
//! - O(1) len and `is_empty`
//!
//! All operations return new vectors without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Internal Structure
//!
//! The vector consists of:
//! - A root node (`W`-way branching trie, always a branch)
//! - A tail buffer (up to `W` elements) for efficient append
//!
//! Every leaf reachable from the root is full; partially filled leaves only
//! ever live in the tail. The index of the first tail element is the length
//! rounded down to a multiple of `W`, treating an exact multiple as a full
//! tail rather than an empty one.
//!
//! # Examples
//!
//! ```rust
//! use radix_vector::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .push_back(1)
//!     .push_back(2)
//!     .push_back(3);
//!
//! assert_eq!(vector.get(0), Some(&1));
//! assert_eq!(vector.get(1), Some(&2));
//! assert_eq!(vector.get(2), Some(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let extended = vector.push_back(4);
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4);   // New vector
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops::Index;

use super::ReferenceCounter;
use super::iterator::{PersistentVectorChunks, PersistentVectorIntoIterator, PersistentVectorIterator};
use super::node::Node;
use crate::config::{Branching, VectorConfig};
use crate::error::VectorError;

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentVector<i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentVector<i32>: Send, Sync);

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a bit-partitioned trie.
///
/// Each value is one immutable version. Mutating operations return a new
/// version that shares every untouched subtree with the receiver.
///
/// # Time Complexity
///
/// | Operation        | Complexity                      |
/// |------------------|---------------------------------|
/// | `new`            | O(1)                            |
/// | `get`            | `O(log_W N)`                    |
/// | `push_back`      | `O(log_W N)` amortized O(1)     |
/// | `pop_back`       | `O(log_W N)`                    |
/// | `update`         | `O(log_W N)`                    |
/// | `len`            | O(1)                            |
/// | `to_vec`         | O(N)                            |
///
/// # Examples
///
/// ```rust
/// use radix_vector::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Some(&50));
/// ```
pub struct PersistentVector<T> {
    /// Total number of elements (tree plus tail)
    length: usize,
    /// Tree height as a bit shift: levels above the leaves times `bits`
    shift: usize,
    /// Branching parameters shared by the whole lineage
    branching: Branching,
    /// Root node of the trie, never the tail
    root: ReferenceCounter<Node<T>>,
    /// Tail buffer for efficient append (up to `W` elements)
    tail: ReferenceCounter<[T]>,
}

impl<T> Clone for PersistentVector<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            length: self.length,
            shift: self.shift,
            branching: self.branching,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector with the default branching power (32-way).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// assert_eq!(vector.width(), 32);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::empty(Branching::default())
    }

    /// Creates a new empty vector from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidBranchingPower`] if the configured power
    /// is out of range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::{PersistentVector, VectorConfig};
    ///
    /// let vector: PersistentVector<u8> =
    ///     PersistentVector::with_config(VectorConfig::new(3).unwrap()).unwrap();
    /// assert_eq!(vector.width(), 8);
    /// ```
    pub fn with_config(config: VectorConfig) -> Result<Self, VectorError> {
        Ok(Self::empty(config.branching()?))
    }

    /// Creates a new empty vector with `W = 2^power`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidBranchingPower`] if `power` is out of range.
    pub fn with_branching_power(power: u32) -> Result<Self, VectorError> {
        Self::with_config(VectorConfig::new(power)?)
    }

    /// Creates an empty vector of the given lineage.
    fn empty(branching: Branching) -> Self {
        Self {
            length: 0,
            shift: branching.bits,
            branching,
            root: ReferenceCounter::new(Node::empty_branch(branching.width)),
            tail: ReferenceCounter::from(Vec::<T>::new()),
        }
    }

    /// Returns the number of elements in the vector.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the branching power `P` of this lineage.
    #[inline]
    #[must_use]
    pub const fn bits(&self) -> usize {
        self.branching.bits
    }

    /// Returns the node width `W = 2^P` of this lineage.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.branching.width
    }

    /// Returns the configuration this lineage was built from.
    #[must_use]
    pub fn config(&self) -> VectorConfig {
        // The stored branching was validated when the lineage was created
        u32::try_from(self.branching.bits)
            .ok()
            .and_then(|power| VectorConfig::new(power).ok())
            .unwrap_or_default()
    }

    /// Returns the number of branch levels above the leaves.
    ///
    /// The root is always a branch, so the minimum height is 1. The height
    /// grows by one level when the tree fills up and shrinks by one level
    /// when `pop_back` empties the root's second child.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// // Width 2: four elements fill one level, the tail holds two more
    /// let vector = PersistentVector::from_elements(0..6, 1).unwrap();
    /// assert_eq!(vector.height(), 1);
    /// assert_eq!(vector.push_back(6).height(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.shift / self.branching.bits
    }

    /// Returns the starting index of the tail buffer.
    #[inline]
    const fn tail_offset(&self) -> usize {
        if self.length < self.branching.width {
            0
        } else {
            ((self.length - 1) >> self.branching.bits) << self.branching.bits
        }
    }

    /// Returns the shared leaf that holds `index`.
    ///
    /// Tail-held indices resolve to the tail itself. The caller must ensure
    /// `index < self.length`.
    fn leaf_for(&self, index: usize) -> Option<&ReferenceCounter<[T]>> {
        if index >= self.tail_offset() {
            return Some(&self.tail);
        }

        let mut node = self.root.as_ref();
        let mut level = self.shift;

        while level > 0 {
            let Node::Branch(children) = node else {
                return None;
            };
            node = children[(index >> level) & self.branching.mask].as_deref()?;
            level -= self.branching.bits;
        }

        match node {
            Node::Leaf(elements) => Some(elements),
            Node::Branch(_) => None,
        }
    }

    /// Returns the elements of the leaf holding `index`.
    ///
    /// Every tree leaf has exactly `W` elements; the last chunk of a vector is
    /// the tail and may be shorter.
    pub(crate) fn chunk_for(&self, index: usize) -> Option<&[T]> {
        if index >= self.length {
            return None;
        }
        self.leaf_for(index).map(AsRef::as_ref)
    }

    /// Like [`PersistentVector::chunk_for`], returning the shared leaf.
    pub(crate) fn shared_chunk_for(&self, index: usize) -> Option<ReferenceCounter<[T]>> {
        if index >= self.length {
            return None;
        }
        self.leaf_for(index).cloned()
    }

    /// Returns a reference to the element at the given index.
    ///
    /// Returns `None` if the index is out of bounds.
    ///
    /// # Complexity
    ///
    /// `O(log_W N)`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Some(&1));
    /// assert_eq!(vector.get(4), Some(&5));
    /// assert_eq!(vector.get(10), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.chunk_for(index)?.get(index & self.branching.mask)
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `index >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::{PersistentVector, VectorError};
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// assert_eq!(vector.try_get(2), Ok(&3));
    /// assert_eq!(
    ///     vector.try_get(3),
    ///     Err(VectorError::OutOfRange { index: 3, length: 3 })
    /// );
    /// ```
    pub fn try_get(&self, index: usize) -> Result<&T, VectorError> {
        self.get(index).ok_or(VectorError::OutOfRange {
            index,
            length: self.length,
        })
    }

    /// Returns a reference to the first element.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a reference to the last element.
    ///
    /// # Complexity
    ///
    /// O(1) - the last element is always in the tail
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tail.last()
    }

    /// Returns an iterator over references to the elements, front to back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator::new(self)
    }

    /// Returns an iterator over the leaves of the vector, front to back.
    ///
    /// Every chunk but the last is a full tree leaf of `W` elements; the last
    /// chunk is the tail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_elements(1..=5, 1).unwrap();
    /// let chunks: Vec<&[i32]> = vector.chunks().collect();
    /// assert_eq!(chunks, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
    /// ```
    #[must_use]
    pub const fn chunks(&self) -> PersistentVectorChunks<'_, T> {
        PersistentVectorChunks::new(self)
    }

    /// Returns a [`fmt::Display`] adapter that dumps the tail and the trie.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_elements(1..=5, 1).unwrap();
    /// let dump = vector.tree_view().to_string();
    /// assert!(dump.starts_with("tail: [5]\n"));
    /// ```
    #[must_use]
    pub const fn tree_view(&self) -> TreeView<'_, T> {
        TreeView { vector: self }
    }

    /// Asserts the structural invariants of this version.
    ///
    /// Intended for tests; panics with a description of the first violated
    /// invariant.
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        let bits = self.branching.bits;
        assert!(self.shift >= bits, "shift below the minimum height");
        assert_eq!(self.shift % bits, 0, "shift is not a multiple of bits");
        assert!(self.tail.len() <= self.branching.width, "tail exceeds width");
        assert_eq!(
            self.length - self.tail_offset(),
            self.tail.len(),
            "tail length does not match the tail offset"
        );
        if self.length > 0 {
            assert!(!self.tail.is_empty(), "non-empty vector with an empty tail");
        }

        let Node::Branch(children) = self.root.as_ref() else {
            panic!("root is not a branch");
        };
        if self.shift > bits {
            assert!(
                children.get(1).is_some_and(Option::is_some),
                "root above minimum height has fewer than two children"
            );
        }
        assert_eq!(
            self.root.check_shape(self.shift, self.branching),
            self.tail_offset(),
            "tree does not hold exactly the elements before the tail"
        );
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Creates a vector holding `elements` with `W = 2^power`.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidBranchingPower`] if `power` is out of range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_elements([1, 2, 3], 5).unwrap();
    /// assert_eq!(vector.to_vec(), vec![1, 2, 3]);
    /// ```
    pub fn from_elements<I>(elements: I, power: u32) -> Result<Self, VectorError>
    where
        I: IntoIterator<Item = T>,
    {
        Ok(Self::with_branching_power(power)?.push_back_many(elements))
    }

    /// Creates a vector containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().push_back(element)
    }

    /// Appends an element to the back of the vector.
    ///
    /// # Complexity
    ///
    /// `O(log_W N)` amortized O(1) due to tail optimization
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .push_back(1)
    ///     .push_back(2)
    ///     .push_back(3);
    ///
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.get(2), Some(&3));
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        if self.length - self.tail_offset() < self.branching.width {
            // Tail has space, clone it with the element added
            let mut new_tail = Vec::with_capacity(self.tail.len() + 1);
            new_tail.extend_from_slice(&self.tail);
            new_tail.push(element);

            Self {
                length: self.length + 1,
                shift: self.shift,
                branching: self.branching,
                root: self.root.clone(),
                tail: ReferenceCounter::from(new_tail),
            }
        } else {
            // Tail is full, push tail to root and create new tail
            self.push_tail_to_root(element)
        }
    }

    /// Appends every element of `iter`, in order.
    ///
    /// Elements are packed into the tail a chunk at a time, so the tail is
    /// cloned once per chunk rather than once per element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let extended = vector.push_back_many(4..=6);
    ///
    /// assert_eq!(extended.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    /// assert_eq!(vector.len(), 3);
    /// ```
    #[must_use]
    pub fn push_back_many<I>(&self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut iter = iter.into_iter().peekable();
        let mut result = self.clone();

        while iter.peek().is_some() {
            let room = result.branching.width - (result.length - result.tail_offset());
            if room == 0 {
                if let Some(element) = iter.next() {
                    result = result.push_back(element);
                }
                continue;
            }

            let mut new_tail = Vec::with_capacity(result.branching.width);
            new_tail.extend_from_slice(&result.tail);
            new_tail.extend(iter.by_ref().take(room));
            let added = new_tail.len() - result.tail.len();

            result = Self {
                length: result.length + added,
                shift: result.shift,
                branching: result.branching,
                root: result.root,
                tail: ReferenceCounter::from(new_tail),
            };
        }

        result
    }

    /// Pushes the full tail into the tree and starts a new tail with `element`.
    fn push_tail_to_root(&self, element: T) -> Self {
        let Branching { bits, width, .. } = self.branching;
        // Sharing the tail slice only bumps its reference count
        let tail_leaf = Node::Leaf(self.tail.clone());

        // The tree holds W^(height + 1) elements when full
        let root_overflow = (self.tail_offset() >> self.shift) >= width;

        let (root, shift) = if root_overflow {
            let mut slots = Node::empty_slots(width);
            slots[0] = Some(self.root.clone());
            slots[1] = Some(ReferenceCounter::new(Node::new_path(
                self.shift,
                self.branching,
                tail_leaf,
            )));
            let shift = self.shift + bits;

            tracing::trace!(
                target: "radix_vector::grow",
                shift,
                length = self.length + 1,
                bits,
                "tree grew by one level"
            );
            (ReferenceCounter::new(Node::branch(slots)), shift)
        } else {
            let root = self.push_tail_into_node(&self.root, self.shift, tail_leaf);
            (ReferenceCounter::new(root), self.shift)
        };

        Self {
            length: self.length + 1,
            shift,
            branching: self.branching,
            root,
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Path-copies `node` and attaches `tail_leaf` at the rightmost position.
    fn push_tail_into_node(&self, node: &Node<T>, level: usize, tail_leaf: Node<T>) -> Node<T> {
        let Node::Branch(children) = node else {
            unreachable!("leaf reached above the bottom branch level");
        };
        let Branching { bits, mask, .. } = self.branching;
        let subindex = ((self.length - 1) >> level) & mask;
        let mut new_children = children.to_vec();

        let child = if level == bits {
            // Bottom branch level, the tail leaf goes right here
            tail_leaf
        } else {
            match &children[subindex] {
                Some(existing) => self.push_tail_into_node(existing, level - bits, tail_leaf),
                None => Node::new_path(level - bits, self.branching, tail_leaf),
            }
        };
        new_children[subindex] = Some(ReferenceCounter::new(child));

        Node::branch(new_children)
    }

    /// Updates the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::OutOfRange`] if `index >= self.len()`.
    ///
    /// # Complexity
    ///
    /// `O(log_W N)`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.update(2, 100).unwrap();
    ///
    /// assert_eq!(updated.get(2), Some(&100));
    /// assert_eq!(vector.get(2), Some(&3)); // Original unchanged
    /// assert!(vector.update(5, 0).is_err());
    /// ```
    pub fn update(&self, index: usize, element: T) -> Result<Self, VectorError> {
        if index >= self.length {
            return Err(VectorError::OutOfRange {
                index,
                length: self.length,
            });
        }

        if index >= self.tail_offset() {
            let mut new_tail = self.tail.to_vec();
            new_tail[index & self.branching.mask] = element;

            Ok(Self {
                length: self.length,
                shift: self.shift,
                branching: self.branching,
                root: self.root.clone(),
                tail: ReferenceCounter::from(new_tail),
            })
        } else {
            let new_root = self.update_in_node(&self.root, self.shift, index, element);

            Ok(Self {
                length: self.length,
                shift: self.shift,
                branching: self.branching,
                root: ReferenceCounter::new(new_root),
                tail: self.tail.clone(),
            })
        }
    }

    /// Clones the path from `node` down to the leaf holding `index`.
    fn update_in_node(&self, node: &Node<T>, level: usize, index: usize, element: T) -> Node<T> {
        let Branching { bits, mask, .. } = self.branching;
        match node {
            Node::Leaf(elements) => {
                let mut new_elements = elements.to_vec();
                new_elements[index & mask] = element;
                Node::Leaf(ReferenceCounter::from(new_elements))
            }
            Node::Branch(children) => {
                let subindex = (index >> level) & mask;
                let Some(child) = &children[subindex] else {
                    unreachable!("missing child on the path to a tree-held index");
                };
                let mut new_children = children.to_vec();
                new_children[subindex] = Some(ReferenceCounter::new(self.update_in_node(
                    child,
                    level - bits,
                    index,
                    element,
                )));
                Node::branch(new_children)
            }
        }
    }

    /// Removes the last element from the vector.
    ///
    /// Returns the new vector together with the removed element.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::EmptyCollection`] if the vector is empty.
    ///
    /// # Complexity
    ///
    /// O(1) while the tail holds more than one element, `O(log_W N)` otherwise
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (remaining, element) = vector.pop_back().unwrap();
    ///
    /// assert_eq!(element, 5);
    /// assert_eq!(remaining.len(), 4);
    /// ```
    pub fn pop_back(&self) -> Result<(Self, T), VectorError> {
        let Some(element) = self.tail.last().cloned() else {
            return Err(VectorError::EmptyCollection);
        };

        if self.length == 1 {
            return Ok((Self::empty(self.branching), element));
        }

        if self.tail.len() > 1 {
            // Just remove from tail
            let new_vector = Self {
                length: self.length - 1,
                shift: self.shift,
                branching: self.branching,
                root: self.root.clone(),
                tail: ReferenceCounter::from(&self.tail[..self.tail.len() - 1]),
            };
            return Ok((new_vector, element));
        }

        // The tail empties, so the rightmost tree leaf becomes the new tail
        let new_last = self.length - 2;
        let Some(new_tail) = self.leaf_for(new_last).cloned() else {
            unreachable!("tree leaf holding index {new_last} is missing");
        };
        let (root, shift) = self.pop_tail_from_root(new_last);

        let new_vector = Self {
            length: self.length - 1,
            shift,
            branching: self.branching,
            root,
            tail: new_tail,
        };

        Ok((new_vector, element))
    }

    /// Removes the rightmost tree leaf and shrinks the tree if possible.
    fn pop_tail_from_root(&self, new_last: usize) -> (ReferenceCounter<Node<T>>, usize) {
        let bits = self.branching.bits;

        let Some(root) = self.pop_tail_from_node(&self.root, self.shift, new_last) else {
            // Every leaf moved out, keep a childless root to navigate from
            return (
                ReferenceCounter::new(Node::empty_branch(self.branching.width)),
                bits,
            );
        };

        // Shrink only when the second top-level branch is gone
        if self.shift > bits
            && let Node::Branch(children) = &root
            && children[1].is_none()
            && let Some(only_child) = &children[0]
        {
            let shift = self.shift - bits;
            tracing::trace!(
                target: "radix_vector::shrink",
                shift,
                length = self.length - 1,
                bits,
                "tree shrank by one level"
            );
            return (only_child.clone(), shift);
        }

        (ReferenceCounter::new(root), self.shift)
    }

    /// Path-copies `node` without the leaf holding `index`.
    ///
    /// Returns `None` when the subtree no longer holds anything, so the
    /// parent drops the slot instead of keeping an empty branch.
    fn pop_tail_from_node(&self, node: &Node<T>, level: usize, index: usize) -> Option<Node<T>> {
        let Node::Branch(children) = node else {
            unreachable!("leaf reached above the bottom branch level");
        };
        let Branching { bits, mask, .. } = self.branching;
        let subindex = (index >> level) & mask;

        if level > bits {
            let Some(child) = &children[subindex] else {
                unreachable!("missing child on the rightmost path");
            };
            let new_child = self.pop_tail_from_node(child, level - bits, index);
            if new_child.is_none() && subindex == 0 {
                return None;
            }
            let mut new_children = children.to_vec();
            new_children[subindex] = new_child.map(ReferenceCounter::new);
            Some(Node::branch(new_children))
        } else if subindex == 0 {
            None
        } else {
            let mut new_children = children.to_vec();
            new_children[subindex] = None;
            Some(Node::branch(new_children))
        }
    }

    /// Returns every element, in index order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radix_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_elements([1, 2, 3], 1)
    ///     .unwrap()
    ///     .push_back_many([4, 5, 6]);
    /// assert_eq!(vector.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    /// ```
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut elements = Vec::with_capacity(self.length);
        for chunk in self.chunks() {
            elements.extend_from_slice(chunk);
        }
        elements
    }
}

// =============================================================================
// Tree Dump
// =============================================================================

/// Displays the tail and the trie of a [`PersistentVector`], one node per line.
///
/// Created by [`PersistentVector::tree_view`].
pub struct TreeView<'a, T> {
    vector: &'a PersistentVector<T>,
}

impl<T: fmt::Debug> fmt::Display for TreeView<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vector = self.vector;
        writeln!(formatter, "tail: {:?}", &vector.tail[..])?;
        write!(formatter, "root (height {}) ", vector.height())?;
        vector.root.write_tree(formatter, 0)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new().push_back_many(iter)
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator::new(self)
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Index<usize> for PersistentVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).unwrap_or_else(|| {
            panic!(
                "index {index} is out of range for a vector of length {}",
                self.length
            )
        })
    }
}

/// Vectors are equal when they hold equal elements in the same order,
/// regardless of branching power or tree shape.
impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if ReferenceCounter::ptr_eq(&self.root, &other.root)
            && ReferenceCounter::ptr_eq(&self.tail, &other.tail)
        {
            return true;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

/// Hashes the length followed by every element in order, consistent with
/// [`PartialEq`].
impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            sequence.serialize_element(element)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentVectorVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentVectorVisitor<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentVector<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut elements = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(element) = access.next_element()? {
            elements.push(element);
        }
        Ok(elements.into_iter().collect())
    }
}

/// Deserializes into a vector with the default branching power.
#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentVector<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentVectorVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
