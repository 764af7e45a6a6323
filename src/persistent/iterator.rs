//! Ordered traversal of a [`PersistentVector`].
//!
//! All iterators walk the vector leaf by leaf: each full tree leaf from left
//! to right, then the tail. A leaf is located once with a root-to-leaf
//! descent and then consumed sequentially, so a full traversal costs
//! `O(N + (N / W) log_W N)`.

use super::ReferenceCounter;
use super::vector::PersistentVector;

// =============================================================================
// Chunk Iterator
// =============================================================================

/// An iterator over the leaves of a [`PersistentVector`].
///
/// Yields every full tree leaf in index order followed by the tail. Created
/// by [`PersistentVector::chunks`].
pub struct PersistentVectorChunks<'a, T> {
    vector: &'a PersistentVector<T>,
    /// Index of the first element of the next chunk
    next_index: usize,
}

impl<'a, T> PersistentVectorChunks<'a, T> {
    pub(super) const fn new(vector: &'a PersistentVector<T>) -> Self {
        Self {
            vector,
            next_index: 0,
        }
    }
}

impl<'a, T> Iterator for PersistentVectorChunks<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.vector.chunk_for(self.next_index)?;
        if chunk.is_empty() {
            return None;
        }
        self.next_index += chunk.len();
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len().saturating_sub(self.next_index);
        let chunks = remaining.div_ceil(self.vector.width());
        (chunks, Some(chunks))
    }
}

impl<T> ExactSizeIterator for PersistentVectorChunks<'_, T> {}

// =============================================================================
// Borrowing Iterator
// =============================================================================

/// An iterator over references to elements of a [`PersistentVector`].
///
/// Created by [`PersistentVector::iter`] or by iterating over `&vector`.
pub struct PersistentVectorIterator<'a, T> {
    chunks: PersistentVectorChunks<'a, T>,
    /// Remaining elements of the current leaf
    current_leaf: std::slice::Iter<'a, T>,
    /// Number of elements not yet returned (for `ExactSizeIterator`)
    remaining: usize,
}

impl<'a, T> PersistentVectorIterator<'a, T> {
    pub(super) fn new(vector: &'a PersistentVector<T>) -> Self {
        Self {
            chunks: PersistentVectorChunks::new(vector),
            current_leaf: [].iter(),
            remaining: vector.len(),
        }
    }
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.current_leaf.next() {
                self.remaining -= 1;
                return Some(element);
            }
            // Current leaf is exhausted, move to the next one
            self.current_leaf = self.chunks.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

// =============================================================================
// Owning Iterator
// =============================================================================

/// An owning iterator over elements of a [`PersistentVector`].
///
/// Leaves may be shared with other versions, so elements are cloned out of
/// them as they are returned.
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    /// Currently cached leaf (held via reference counting)
    current_leaf: Option<ReferenceCounter<[T]>>,
    /// Current position within the cached leaf
    leaf_index: usize,
    /// Index of the first element of the next leaf
    next_index: usize,
    /// Number of elements not yet returned
    remaining: usize,
}

impl<T> PersistentVectorIntoIterator<T> {
    pub(super) const fn new(vector: PersistentVector<T>) -> Self {
        let remaining = vector.len();
        Self {
            vector,
            current_leaf: None,
            leaf_index: 0,
            next_index: 0,
            remaining,
        }
    }
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(leaf) = &self.current_leaf
                && let Some(element) = leaf.get(self.leaf_index)
            {
                self.leaf_index += 1;
                self.remaining -= 1;
                return Some(element.clone());
            }

            let leaf = self.vector.shared_chunk_for(self.next_index)?;
            if leaf.is_empty() {
                return None;
            }
            self.next_index += leaf.len();
            self.current_leaf = Some(leaf);
            self.leaf_index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_chunks_of_empty_vector() {
        let vector: PersistentVector<i32> = PersistentVector::new();
        assert_eq!(vector.chunks().count(), 0);
        assert_eq!(vector.chunks().len(), 0);
    }

    #[rstest]
    fn test_chunks_are_full_leaves_then_tail() {
        let vector = PersistentVector::from_elements(0..11, 2).unwrap();
        let chunks: Vec<Vec<i32>> = vector.chunks().map(<[i32]>::to_vec).collect();
        assert_eq!(
            chunks,
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10]]
        );
    }

    #[rstest]
    fn test_chunks_with_exactly_full_tail() {
        let vector = PersistentVector::from_elements(0..8, 2).unwrap();
        let lengths: Vec<usize> = vector.chunks().map(<[i32]>::len).collect();
        assert_eq!(lengths, vec![4, 4]);
        assert_eq!(vector.chunks().len(), 2);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(32)]
    #[case(33)]
    #[case(1025)]
    #[case(1057)]
    fn test_iter_matches_get(#[case] length: usize) {
        let vector: PersistentVector<usize> = (0..length).collect();
        let by_index: Vec<&usize> = (0..length).filter_map(|index| vector.get(index)).collect();
        let by_iter: Vec<&usize> = vector.iter().collect();
        assert_eq!(by_iter, by_index);
    }

    #[rstest]
    fn test_iter_exact_size() {
        let vector = PersistentVector::from_elements(0..10, 1).unwrap();
        let mut iter = vector.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 8);
        assert_eq!(iter.by_ref().count(), 8);
        assert_eq!(iter.next(), None);
    }

    #[rstest]
    fn test_into_iter_clones_from_shared_leaves() {
        let vector = PersistentVector::from_elements((0..20).map(|index| index.to_string()), 2)
            .unwrap();
        let kept = vector.clone();
        let mut iter = vector.into_iter();
        assert_eq!(iter.len(), 20);

        let collected: Vec<String> = iter.by_ref().collect();
        assert_eq!(collected.len(), 20);
        assert_eq!(collected[19], "19");
        assert_eq!(iter.len(), 0);
        assert_eq!(kept.len(), 20);
    }
}
