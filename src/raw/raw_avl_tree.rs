use alloc::rc::Rc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering::{Equal, Greater, Less};

use super::iter::RawIter;
use super::node::{Link, Node};

/// The core AVL implementation backing `AvlTree`.
///
/// Copies share their node chain. Every structural write goes through [`Rc::make_mut`], so a
/// mutation copies exactly the nodes on the walked path that are still shared and leaves every
/// untouched subtree shared with the other copies.
pub(crate) struct RawAvlTree<T> {
    /// Root of the node chain, if the tree is non-empty.
    root: Link<T>,
    /// Number of elements reachable from `root`.
    len: usize,
}

// Copying a tree never copies nodes, so no `T: Clone` bound.
impl<T> Clone for RawAvlTree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<T> RawAvlTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Releases this copy's hold on the node chain.
    pub(crate) fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn root(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }

    /// Returns true if both trees hold the same root node (or are both empty).
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub(crate) fn first(&self) -> Option<&T> {
        self.root().map(|root| root.min_node().value())
    }

    pub(crate) fn last(&self) -> Option<&T> {
        self.root().map(|root| root.max_node().value())
    }

    pub(crate) fn iter(&self) -> RawIter<'_, T> {
        RawIter::new(self.root(), self.len)
    }

    pub(crate) fn traverse_pre_order<F: FnMut(&T)>(&self, mut visit: F) {
        if let Some(root) = self.root() {
            root.traverse_pre_order(&mut visit);
        }
    }

    pub(crate) fn traverse_in_order<F: FnMut(&T)>(&self, mut visit: F) {
        if let Some(root) = self.root() {
            root.traverse_in_order(&mut visit);
        }
    }

    pub(crate) fn traverse_post_order<F: FnMut(&T)>(&self, mut visit: F) {
        if let Some(root) = self.root() {
            root.traverse_post_order(&mut visit);
        }
    }

    /// Searches for a value by binary descent.
    pub(crate) fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root();
        while let Some(node) = current {
            current = match value.cmp(node.value().borrow()) {
                Less => node.left(),
                Greater => node.right(),
                Equal => return Some(node.value()),
            };
        }
        None
    }

    pub(crate) fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get(value).is_some()
    }
}

impl<T: Clone + Ord> RawAvlTree<T> {
    /// Inserts a value. Returns false, leaving the tree untouched, if an equal value is present.
    pub(crate) fn insert(&mut self, value: T) -> bool {
        // Checked up front so that a rejected insert never un-shares the path. This costs a
        // second descent; dropping it would copy shared nodes on every duplicate.
        if self.contains(&value) {
            return false;
        }
        self.root = Some(insert(self.root.take(), value));
        self.len += 1;
        true
    }

    /// Removes and returns the element equal to `value`, if any.
    pub(crate) fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        // A miss must not un-share the path, so it pays for a read-only descent first.
        if !self.contains(value) {
            return None;
        }
        let root = self.root.take()?;
        let (root, removed) = remove(root, value);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub(crate) fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.take(value).is_some()
    }

    pub(crate) fn pop_first(&mut self) -> Option<T> {
        let root = self.root.take()?;
        let (root, min) = pop_min(root);
        self.root = root;
        self.len -= 1;
        Some(min)
    }

    pub(crate) fn pop_last(&mut self) -> Option<T> {
        let root = self.root.take()?;
        let (root, max) = pop_max(root);
        self.root = root;
        self.len -= 1;
        Some(max)
    }

    /// Moves every element out in ascending order.
    ///
    /// Values of nodes owned only by this tree are moved; values still shared with another copy
    /// are cloned.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.len);
        if let Some(root) = self.root.take() {
            drain_into(root, &mut result);
        }
        self.len = 0;
        result
    }
}

fn drain_into<T: Clone>(node: Rc<Node<T>>, out: &mut Vec<T>) {
    let (value, left, right) = Rc::unwrap_or_clone(node).into_parts();
    if let Some(left) = left {
        drain_into(left, out);
    }
    out.push(value);
    if let Some(right) = right {
        drain_into(right, out);
    }
}

/// Restores the balance invariant at `node`, whose children are already balanced and whose
/// balance factor is within [-2, 2].
fn balance<T: Clone>(node: Rc<Node<T>>) -> Rc<Node<T>> {
    match node.balance_factor() {
        2 => {
            if node.left().is_some_and(|left| left.balance_factor() == -1) {
                rotate_left_right(node)
            } else {
                rotate_right(node)
            }
        }
        -2 => {
            if node.right().is_some_and(|right| right.balance_factor() == 1) {
                rotate_right_left(node)
            } else {
                rotate_left(node)
            }
        }
        factor => {
            debug_assert!((-1..=1).contains(&factor), "balance factor {factor} out of range");
            node
        }
    }
}

/// Right-heavy `node` with right child `pivot`: `pivot` becomes the subtree root.
fn rotate_left<T: Clone>(mut node: Rc<Node<T>>) -> Rc<Node<T>> {
    let n = Rc::make_mut(&mut node);
    let Some(mut pivot) = n.take_right() else {
        return node;
    };
    let p = Rc::make_mut(&mut pivot);
    n.set_right(p.take_left());
    // `node` sits below `pivot` now, so its height must be final first.
    n.update_height();
    p.set_left(Some(node));
    p.update_height();
    pivot
}

/// Mirror of [`rotate_left`].
fn rotate_right<T: Clone>(mut node: Rc<Node<T>>) -> Rc<Node<T>> {
    let n = Rc::make_mut(&mut node);
    let Some(mut pivot) = n.take_left() else {
        return node;
    };
    let p = Rc::make_mut(&mut pivot);
    n.set_left(p.take_right());
    n.update_height();
    p.set_right(Some(node));
    p.update_height();
    pivot
}

fn rotate_left_right<T: Clone>(mut node: Rc<Node<T>>) -> Rc<Node<T>> {
    let n = Rc::make_mut(&mut node);
    if let Some(left) = n.take_left() {
        n.set_left(Some(rotate_left(left)));
    }
    rotate_right(node)
}

fn rotate_right_left<T: Clone>(mut node: Rc<Node<T>>) -> Rc<Node<T>> {
    let n = Rc::make_mut(&mut node);
    if let Some(right) = n.take_right() {
        n.set_right(Some(rotate_right(right)));
    }
    rotate_left(node)
}

/// Inserts below `link` and returns the new subtree root. Equal values descend right.
fn insert<T: Clone + Ord>(link: Link<T>, value: T) -> Rc<Node<T>> {
    let Some(mut node) = link else {
        return Rc::new(Node::new(value));
    };
    let n = Rc::make_mut(&mut node);
    if value < *n.value() {
        let left = n.take_left();
        n.set_left(Some(insert(left, value)));
    } else {
        let right = n.take_right();
        n.set_right(Some(insert(right, value)));
    }
    n.update_height();
    balance(node)
}

/// Removes the element equal to `value` from the subtree rooted at `node`.
///
/// Returns the new subtree root and the removed element.
fn remove<T, Q>(mut node: Rc<Node<T>>, value: &Q) -> (Link<T>, Option<T>)
where
    T: Borrow<Q> + Clone + Ord,
    Q: ?Sized + Ord,
{
    let ordering = value.cmp(node.value().borrow());

    // At most one child: splice it up in place of the node.
    if ordering == Equal && !(node.has_left() && node.has_right()) {
        let (removed, left, right) = Rc::unwrap_or_clone(node).into_parts();
        return (left.or(right), Some(removed));
    }

    let n = Rc::make_mut(&mut node);
    let removed = match ordering {
        Less => match n.take_left() {
            Some(left) => {
                let (left, removed) = remove(left, value);
                n.set_left(left);
                removed
            }
            None => None,
        },
        Greater => match n.take_right() {
            Some(right) => {
                let (right, removed) = remove(right, value);
                n.set_right(right);
                removed
            }
            None => None,
        },
        // Two children: the in-order successor takes this node's place.
        Equal => match n.take_right() {
            Some(right) => {
                let (right, successor) = pop_min(right);
                n.set_right(right);
                Some(n.replace_value(successor))
            }
            None => None,
        },
    };
    n.update_height();
    (Some(balance(node)), removed)
}

/// Detaches the minimum of the subtree rooted at `node`, rebalancing on the way back up.
fn pop_min<T: Clone>(mut node: Rc<Node<T>>) -> (Link<T>, T) {
    if node.has_left() {
        let n = Rc::make_mut(&mut node);
        if let Some(left) = n.take_left() {
            let (left, min) = pop_min(left);
            n.set_left(left);
            n.update_height();
            return (Some(balance(node)), min);
        }
    }
    let (min, _, right) = Rc::unwrap_or_clone(node).into_parts();
    (right, min)
}

/// Mirror of [`pop_min`].
fn pop_max<T: Clone>(mut node: Rc<Node<T>>) -> (Link<T>, T) {
    if node.has_right() {
        let n = Rc::make_mut(&mut node);
        if let Some(right) = n.take_right() {
            let (right, max) = pop_max(right);
            n.set_right(right);
            n.update_height();
            return (Some(balance(node)), max);
        }
    }
    let (max, left, _) = Rc::unwrap_or_clone(node).into_parts();
    (left, max)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    impl<T: Ord + core::fmt::Debug> RawAvlTree<T> {
        /// Validates all AVL invariants. Panics with a descriptive message if any are violated.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();
            let count = match self.root() {
                Some(root) => Self::validate_node(root, None, None, &mut errors),
                None => 0,
            };
            if count != self.len {
                errors.push(alloc::format!("len mismatch: self.len={}, actual count={}", self.len, count));
            }
            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns the number of nodes in the subtree.
        fn validate_node(node: &Node<T>, lower: Option<&T>, upper: Option<&T>, errors: &mut Vec<String>) -> usize {
            let value = node.value();
            if lower.is_some_and(|lower| value <= lower) || upper.is_some_and(|upper| value >= upper) {
                errors.push(alloc::format!("{:?} out of order (bounds {:?}..{:?})", value, lower, upper));
            }

            let expected_height = 1 + node.left_height().max(node.right_height());
            if node.height() != expected_height {
                errors.push(alloc::format!(
                    "height mismatch at {:?}: cached={}, computed={}",
                    value,
                    node.height(),
                    expected_height
                ));
            }

            if !(-1..=1).contains(&node.balance_factor()) {
                errors.push(alloc::format!("balance factor {} at {:?}", node.balance_factor(), value));
            }

            let left = node.left().map_or(0, |left| Self::validate_node(left, lower, Some(value), errors));
            let right = node.right().map_or(0, |right| Self::validate_node(right, Some(value), upper, errors));
            1 + left + right
        }

        fn pre_order(&self) -> Vec<T>
        where
            T: Clone,
        {
            let mut values = Vec::new();
            self.traverse_pre_order(|v| values.push(v.clone()));
            values
        }
    }

    fn ascending(n: i32) -> RawAvlTree<i32> {
        let mut tree = RawAvlTree::new();
        for value in 1..=n {
            assert!(tree.insert(value));
        }
        tree
    }

    #[test]
    fn ascending_insert_rotates_left() {
        let tree = ascending(3);
        let root = tree.root().unwrap();
        assert_eq!(*root.value(), 2);
        assert_eq!(root.height(), 1);
        assert_eq!(*root.left().unwrap().value(), 1);
        assert_eq!(root.left().unwrap().height(), 0);
        assert_eq!(*root.right().unwrap().value(), 3);
        assert_eq!(root.right().unwrap().height(), 0);
        tree.validate_invariants();
    }

    #[test]
    fn descending_insert_rotates_right() {
        let mut tree = RawAvlTree::new();
        for value in [3, 2, 1] {
            tree.insert(value);
        }
        assert_eq!(tree.pre_order(), vec![2, 1, 3]);
        tree.validate_invariants();
    }

    #[test]
    fn double_rotations() {
        let mut left_right = RawAvlTree::new();
        for value in [3, 1, 2] {
            left_right.insert(value);
        }
        assert_eq!(left_right.pre_order(), vec![2, 1, 3]);
        left_right.validate_invariants();

        let mut right_left = RawAvlTree::new();
        for value in [1, 3, 2] {
            right_left.insert(value);
        }
        assert_eq!(right_left.pre_order(), vec![2, 1, 3]);
        right_left.validate_invariants();
    }

    #[test]
    fn thirteen_ascending_shape() {
        let tree = ascending(13);
        assert_eq!(tree.pre_order(), vec![8, 4, 2, 1, 3, 6, 5, 7, 10, 9, 12, 11, 13]);
        assert_eq!(tree.root().unwrap().height(), 3);
        tree.validate_invariants();
    }

    #[test]
    fn remove_with_two_children_uses_successor() {
        let mut tree = ascending(13);
        assert!(tree.remove(&8));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7, 9, 10, 11, 12, 13]);
        assert_eq!(tree.pre_order(), vec![9, 4, 2, 1, 3, 6, 5, 7, 12, 10, 11, 13]);
        tree.validate_invariants();
    }

    #[test]
    fn remove_leaf_and_single_child() {
        let mut tree = ascending(13);
        assert!(tree.remove(&1));
        assert_eq!(tree.pre_order(), vec![8, 4, 2, 3, 6, 5, 7, 10, 9, 12, 11, 13]);
        tree.validate_invariants();

        // 2 now has a single right child.
        assert!(tree.remove(&2));
        assert!(!tree.contains(&2));
        assert!(tree.contains(&3));
        tree.validate_invariants();
    }

    #[test]
    fn empty_tree_operations() {
        let mut tree: RawAvlTree<i32> = RawAvlTree::new();
        assert!(!tree.contains(&1));
        assert!(!tree.remove(&1));
        assert_eq!(tree.take(&1), None);
        assert_eq!(tree.pop_first(), None);
        assert_eq!(tree.pop_last(), None);
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        tree.validate_invariants();
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = ascending(5);
        assert!(!tree.insert(3));
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        tree.validate_invariants();
    }

    #[test]
    fn copy_independence() {
        let tree = ascending(13);
        let mut copy = tree.clone();
        assert!(copy.ptr_eq(&tree));

        assert!(copy.remove(&1));
        assert!(tree.contains(&1));
        assert!(!copy.contains(&1));
        assert!(!copy.ptr_eq(&tree));
        assert_eq!(tree.len(), 13);
        assert_eq!(copy.len(), 12);
        tree.validate_invariants();
        copy.validate_invariants();
    }

    #[test]
    fn mutation_copies_only_the_path() {
        let tree = ascending(13);
        let mut copy = tree.clone();
        assert!(copy.remove(&1));

        // The right half of the root was not on the path and is still shared.
        let original = tree.root().unwrap();
        let copied = copy.root().unwrap();
        assert!(!core::ptr::eq(original, copied));
        assert!(core::ptr::eq(original.right().unwrap(), copied.right().unwrap()));
        // Within the left half, 6 and its children were untouched as well.
        let original_six = original.left().unwrap().right().unwrap();
        let copied_six = copied.left().unwrap().right().unwrap();
        assert_eq!(*copied_six.value(), 6);
        assert!(core::ptr::eq(original_six, copied_six));
    }

    #[test]
    fn unique_tree_mutates_in_place() {
        let mut tree = ascending(13);
        let before: *const Node<i32> = tree.root().unwrap();
        assert!(tree.remove(&13));
        let after: *const Node<i32> = tree.root().unwrap();
        assert!(core::ptr::eq(before, after));
    }

    #[test]
    fn no_op_writes_keep_sharing() {
        let tree = ascending(13);
        let mut copy = tree.clone();
        assert!(!copy.insert(7));
        assert!(!copy.remove(&42));
        assert!(copy.ptr_eq(&tree));
    }

    #[test]
    fn pop_first_and_last() {
        let mut tree = ascending(7);
        let snapshot = tree.clone();
        assert_eq!(tree.pop_first(), Some(1));
        assert_eq!(tree.pop_last(), Some(7));
        assert_eq!(tree.first(), Some(&2));
        assert_eq!(tree.last(), Some(&6));
        tree.validate_invariants();
        assert_eq!(snapshot.first(), Some(&1));
        assert_eq!(snapshot.last(), Some(&7));
        snapshot.validate_invariants();
    }

    #[test]
    fn drain_moves_or_clones() {
        let mut tree = ascending(13);
        let snapshot = tree.clone();
        let drained = tree.drain_to_vec();
        assert_eq!(drained, (1..=13).collect::<Vec<_>>());
        assert!(tree.is_empty());
        tree.validate_invariants();
        assert_eq!(snapshot.len(), 13);
        snapshot.validate_invariants();
    }

    #[test]
    fn take_returns_stored_value() {
        let mut tree = RawAvlTree::new();
        for word in ["pear", "apple", "fig"] {
            tree.insert(word.to_string());
        }
        assert_eq!(tree.take("apple"), Some("apple".to_string()));
        assert_eq!(tree.take("apple"), None);
        assert_eq!(tree.len(), 2);
        tree.validate_invariants();
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        PopFirst,
        PopLast,
        // Snapshot the tree, then keep mutating the original.
        Fork,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..1000).prop_map(Op::Insert),
            3 => (0i32..1000).prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
            1 => Just(Op::Fork),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawAvlTree<i32> = RawAvlTree::new();
            let mut model: BTreeSet<i32> = BTreeSet::new();
            let mut snapshots: Vec<(RawAvlTree<i32>, Vec<i32>)> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(value) => {
                        prop_assert_eq!(tree.insert(value), model.insert(value));
                    }
                    Op::Remove(value) => {
                        prop_assert_eq!(tree.remove(&value), model.remove(&value));
                    }
                    Op::PopFirst => {
                        prop_assert_eq!(tree.pop_first(), model.pop_first());
                    }
                    Op::PopLast => {
                        prop_assert_eq!(tree.pop_last(), model.pop_last());
                    }
                    Op::Fork => {
                        snapshots.push((tree.clone(), model.iter().copied().collect()));
                    }
                }
                tree.validate_invariants();
            }

            prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
            for (snapshot, expected) in &snapshots {
                snapshot.validate_invariants();
                prop_assert_eq!(&snapshot.iter().copied().collect::<Vec<_>>(), expected);
            }
        }

        #[test]
        fn height_is_logarithmic(values in prop::collection::vec(any::<i32>(), 1..2000)) {
            let mut tree = RawAvlTree::new();
            for value in values {
                tree.insert(value);
            }
            // The sparsest AVL tree of height h has N(h) = N(h - 1) + N(h - 2) + 1 nodes.
            let height = tree.root().unwrap().height();
            let (mut sparsest, mut previous) = (1usize, 0usize);
            for _ in 0..height {
                (sparsest, previous) = (sparsest + previous + 1, sparsest);
            }
            prop_assert!(tree.len() >= sparsest, "height {} with only {} nodes", height, tree.len());
        }
    }
}
