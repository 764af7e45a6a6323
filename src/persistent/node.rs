//! Tree nodes of the bit-partitioned trie.
//!
//! A node is either a branch holding exactly `W` child slots or a leaf holding
//! a shared slice of elements. Which shape to expect is decided by the depth
//! at which a node is reached, so the vector never needs to inspect a node to
//! know what it is; the enum discriminant is only used for sanity checks.

use std::fmt;

use super::ReferenceCounter;
use crate::config::Branching;

/// One child slot of a branch.
pub(crate) type Slot<T> = Option<ReferenceCounter<Node<T>>>;

/// Child slots of a branch node. Always exactly `W` long.
///
/// Shared like leaves, so a `Node` is a tag plus one slice pointer whatever
/// the branching width.
pub(crate) type Children<T> = ReferenceCounter<[Slot<T>]>;

/// Internal node structure for the trie.
pub(crate) enum Node<T> {
    /// Branch node with `W` slots, each empty or owning a child
    Branch(Children<T>),
    /// Leaf node with exactly `W` elements once it sits in the tree
    Leaf(ReferenceCounter<[T]>),
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Branch(children) => Self::Branch(children.clone()),
            Self::Leaf(elements) => Self::Leaf(elements.clone()),
        }
    }
}

impl<T> Node<T> {
    /// Creates `width` empty child slots, ready to be filled and frozen with
    /// [`Node::branch`].
    pub(crate) fn empty_slots(width: usize) -> Vec<Slot<T>> {
        vec![None; width]
    }

    /// Freezes a slot vector into a branch.
    pub(crate) fn branch(slots: Vec<Slot<T>>) -> Self {
        Self::Branch(ReferenceCounter::from(slots))
    }

    /// Creates a branch with every slot empty.
    pub(crate) fn empty_branch(width: usize) -> Self {
        Self::branch(Self::empty_slots(width))
    }

    /// Builds a fresh single-child path of height `level` ending at `node`.
    ///
    /// Every branch on the path has only slot 0 populated, since the path is
    /// a brand-new rightmost branch with a single occupant.
    pub(crate) fn new_path(level: usize, branching: Branching, node: Self) -> Self {
        if level == 0 {
            node
        } else {
            let mut slots = Self::empty_slots(branching.width);
            slots[0] = Some(ReferenceCounter::new(Self::new_path(
                level - branching.bits,
                branching,
                node,
            )));
            Self::branch(slots)
        }
    }

    /// Number of occupied child slots, or zero for a leaf.
    pub(crate) fn occupied_slots(&self) -> usize {
        match self {
            Self::Branch(children) => children.iter().filter(|child| child.is_some()).count(),
            Self::Leaf(_) => 0,
        }
    }

    /// Walks the subtree asserting its shape and returns its element count.
    ///
    /// `level` is the shift at which this node sits. Branches must have
    /// exactly `W` slots filled left to right, and leaves must be full and
    /// reached exactly at level zero.
    pub(crate) fn check_shape(&self, level: usize, branching: Branching) -> usize {
        match self {
            Self::Leaf(elements) => {
                assert_eq!(level, 0, "leaf found above the bottom of the tree");
                assert_eq!(elements.len(), branching.width, "partially filled tree leaf");
                elements.len()
            }
            Self::Branch(children) => {
                assert!(level > 0, "branch found at leaf level");
                assert_eq!(children.len(), branching.width);
                let occupied = self.occupied_slots();
                assert!(
                    children.iter().skip(occupied).all(Option::is_none),
                    "gap between occupied child slots"
                );
                children
                    .iter()
                    .flatten()
                    .map(|child| child.check_shape(level - branching.bits, branching))
                    .sum()
            }
        }
    }
}

impl<T: fmt::Debug> Node<T> {
    /// Writes a dump of this subtree, one node per line.
    ///
    /// The first line is written without indentation so the caller can put a
    /// label in front of it; children are indented by `depth + 1` steps.
    pub(crate) fn write_tree(&self, formatter: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Self::Leaf(elements) => writeln!(formatter, "leaf {:?}", &elements[..]),
            Self::Branch(children) => {
                let indent = "  ".repeat(depth + 1);
                writeln!(
                    formatter,
                    "branch ({} of {})",
                    self.occupied_slots(),
                    children.len()
                )?;
                for (slot, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        write!(formatter, "{indent}[{slot}] ")?;
                        child.write_tree(formatter, depth + 1)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn leaf(elements: &[i32]) -> Node<i32> {
        Node::Leaf(ReferenceCounter::from(elements))
    }

    #[rstest]
    fn test_empty_branch_has_width_slots() {
        let node: Node<i32> = Node::empty_branch(4);
        match &node {
            Node::Branch(children) => {
                assert_eq!(children.len(), 4);
                assert!(children.iter().all(Option::is_none));
            }
            Node::Leaf(_) => panic!("expected a branch"),
        }
        assert_eq!(node.occupied_slots(), 0);
    }

    #[rstest]
    fn test_new_path_at_level_zero_returns_node() {
        let branching = Branching::from_power(1);
        let node = Node::new_path(0, branching, leaf(&[1, 2]));
        assert!(matches!(node, Node::Leaf(_)));
    }

    #[rstest]
    #[case(1, 3)]
    #[case(2, 2)]
    #[case(5, 1)]
    fn test_new_path_builds_single_child_chain(#[case] power: u32, #[case] levels: usize) {
        let branching = Branching::from_power(power);
        let elements: Vec<i32> = (0..i32::try_from(branching.width).unwrap()).collect();
        let path = Node::new_path(levels * branching.bits, branching, leaf(&elements));

        let mut node = &path;
        for _ in 0..levels {
            let Node::Branch(children) = node else {
                panic!("expected a branch on the new path");
            };
            assert_eq!(node.occupied_slots(), 1);
            node = children[0].as_deref().unwrap();
        }
        assert!(matches!(node, Node::Leaf(_)));
        assert_eq!(path.check_shape(levels * branching.bits, branching), branching.width);
    }

    #[rstest]
    fn test_clone_shares_children() {
        let mut slots = Node::empty_slots(2);
        slots[0] = Some(ReferenceCounter::new(leaf(&[1, 2])));
        let original = Node::branch(slots);
        let copy = original.clone();

        let (Node::Branch(left), Node::Branch(right)) = (&original, &copy) else {
            panic!("expected branches");
        };
        assert!(ReferenceCounter::ptr_eq(
            left[0].as_ref().unwrap(),
            right[0].as_ref().unwrap()
        ));
    }

    #[rstest]
    #[should_panic(expected = "partially filled tree leaf")]
    fn test_check_shape_rejects_partial_leaf() {
        let branching = Branching::from_power(2);
        leaf(&[1, 2]).check_shape(0, branching);
    }

    #[rstest]
    #[should_panic(expected = "gap between occupied child slots")]
    fn test_check_shape_rejects_gaps() {
        let branching = Branching::from_power(1);
        let mut slots = Node::empty_slots(2);
        slots[1] = Some(ReferenceCounter::new(leaf(&[1, 2])));
        Node::branch(slots).check_shape(1, branching);
    }

    #[rstest]
    fn test_node_is_one_shared_pointer_wide() {
        use std::mem::size_of;

        // Both variants hold a slice pointer; only the tag is added on top
        let pointer = size_of::<ReferenceCounter<[u8]>>();
        assert!(size_of::<Node<u8>>() <= pointer + size_of::<usize>());
        assert_eq!(size_of::<Node<u8>>(), size_of::<Node<[u64; 8]>>());
    }

    #[rstest]
    fn test_branch_slots_are_shared_by_clone() {
        let mut slots = Node::empty_slots(256);
        slots[0] = Some(ReferenceCounter::new(leaf(&[1])));
        let original = Node::branch(slots);
        let copy = original.clone();

        let (Node::Branch(left), Node::Branch(right)) = (&original, &copy) else {
            panic!("expected branches");
        };
        assert!(ReferenceCounter::ptr_eq(left, right));
        assert_eq!(left.len(), 256);
    }
}
