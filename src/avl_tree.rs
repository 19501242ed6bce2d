use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use alloc::vec;

use crate::raw::{RawAvlTree, RawIter};

/// An ordered set based on an AVL tree, with copy-on-write value semantics.
///
/// Cloning an `AvlTree` is O(1): the clone shares every node with the original. The first
/// mutation of either copy privately copies the nodes on the root-to-target path it walks, so the
/// other copy never observes the change. Subtrees off that path stay shared.
///
/// Every element is stored once. Inserting an element equal to one already present leaves the
/// tree unchanged.
///
/// It is a logic error for an item to be modified in such a way that the item's ordering relative
/// to any other item, as determined by the [`Ord`] trait, changes while it is in the tree. This is
/// normally only possible through [`Cell`], [`RefCell`], global state, I/O, or unsafe code.
/// The behavior resulting from such a logic error is not specified, but will be encapsulated to the
/// `AvlTree` that observed the logic error and not result in undefined behavior.
///
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
///
/// # Examples
///
/// ```
/// use cow_avl::AvlTree;
///
/// let mut tree = AvlTree::new();
/// for value in 1..=13 {
///     tree.insert(value);
/// }
///
/// // Copies are independent values.
/// let mut copy = tree.clone();
/// copy.remove(&1);
///
/// assert!(tree.contains(&1));
/// assert!(!copy.contains(&1));
/// ```
///
/// An `AvlTree` with a known list of items can be initialized from an array:
///
/// ```
/// use cow_avl::AvlTree;
///
/// let tree = AvlTree::from([1, 2, 3]);
/// ```
pub struct AvlTree<T> {
    raw: RawAvlTree<T>,
}

/// An iterator over the items of an `AvlTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`AvlTree`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use cow_avl::AvlTree;
///
/// let tree = AvlTree::from([3, 1, 2]);
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// ```
///
/// Unlike `btree_set::Iter`, this iterator owns heap-spillable path stacks and so runs a
/// destructor: the borrow of the tree lasts until the iterator is dropped, not just until its
/// last use.
///
/// [`iter`]: AvlTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    inner: RawIter<'a, T>,
}

/// An owning iterator over the items of an `AvlTree` in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`AvlTree`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: AvlTree#method.into_iter
pub struct IntoIter<T> {
    inner: vec::IntoIter<T>,
}

impl<T> AvlTree<T> {
    /// Makes a new, empty `AvlTree`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    ///
    /// // entries can now be inserted into the empty tree
    /// tree.insert(1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn new() -> AvlTree<T> {
        AvlTree { raw: RawAvlTree::new() }
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut a = AvlTree::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1);
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut a = AvlTree::new();
    /// assert!(a.is_empty());
    /// a.insert(1);
    /// assert!(!a.is_empty());
    /// ```
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the tree, removing all elements.
    ///
    /// Nodes still shared with other copies are left to those copies.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut v = AvlTree::from([1, 2]);
    /// let copy = v.clone();
    /// v.clear();
    /// assert!(v.is_empty());
    /// assert_eq!(copy.len(), 2);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns `true` if the tree contains a value.
    ///
    /// The value may be any borrowed form of the tree's element type, but the
    /// ordering on the borrowed form *must* match the ordering on the
    /// element type.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.contains(&1), true);
    /// assert_eq!(tree.contains(&4), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains(value)
    }

    /// Returns a reference to the element in the tree, if any, that is equal to the given value.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.get(&2), Some(&2));
    /// assert_eq!(tree.get(&4), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(value)
    }

    /// Returns a reference to the first (smallest) element in the tree, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.first(), None);
    /// tree.insert(2);
    /// tree.insert(1);
    /// assert_eq!(tree.first(), Some(&1));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first()
    }

    /// Returns a reference to the last (largest) element in the tree, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 3, 2]);
    /// assert_eq!(tree.last(), Some(&3));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last()
    }

    /// Returns `true` if `self` and `other` currently share their root node.
    ///
    /// Two clones share until one of them is mutated. Two empty trees always share.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3]);
    /// let mut copy = tree.clone();
    /// assert!(copy.ptr_eq(&tree));
    ///
    /// copy.insert(4);
    /// assert!(!copy.ptr_eq(&tree));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.raw.ptr_eq(&other.raw)
    }

    /// Gets an iterator that visits the elements in the tree in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([3, 1, 2]);
    /// let mut tree_iter = tree.iter();
    /// assert_eq!(tree_iter.next(), Some(&1));
    /// assert_eq!(tree_iter.next(), Some(&2));
    /// assert_eq!(tree_iter.next(), Some(&3));
    /// assert_eq!(tree_iter.next(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; amortized O(1) per step.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { inner: self.raw.iter() }
    }

    /// Calls `visit` on every element, each node before its left and then its right subtree.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3]);
    /// let mut seen = Vec::new();
    /// tree.traverse_pre_order(|v| seen.push(*v));
    /// assert_eq!(seen, [2, 1, 3]);
    /// ```
    pub fn traverse_pre_order<F: FnMut(&T)>(&self, visit: F) {
        self.raw.traverse_pre_order(visit);
    }

    /// Calls `visit` on every element in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([3, 1, 2]);
    /// let mut seen = Vec::new();
    /// tree.traverse_in_order(|v| seen.push(*v));
    /// assert_eq!(seen, [1, 2, 3]);
    /// ```
    pub fn traverse_in_order<F: FnMut(&T)>(&self, visit: F) {
        self.raw.traverse_in_order(visit);
    }

    /// Calls `visit` on every element, each node after its left and then its right subtree.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3]);
    /// let mut seen = Vec::new();
    /// tree.traverse_post_order(|v| seen.push(*v));
    /// assert_eq!(seen, [1, 3, 2]);
    /// ```
    pub fn traverse_post_order<F: FnMut(&T)>(&self, visit: F) {
        self.raw.traverse_post_order(visit);
    }
}

impl<T: Clone + Ord> AvlTree<T> {
    /// Adds a value to the tree.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the tree did not previously contain an equal value, `true` is returned.
    /// - If the tree already contained an equal value, `false` is returned, and the
    ///   tree is not modified: the original value is not replaced, and the value
    ///   passed as argument is dropped.
    ///
    /// If this tree shares nodes with a clone, the nodes on the insertion path are copied first.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    ///
    /// assert_eq!(tree.insert(2), true);
    /// assert_eq!(tree.insert(2), false);
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        self.raw.insert(value)
    }

    /// If the tree contains an element equal to the value, removes it from the
    /// tree and drops it. Returns whether such an element was present.
    ///
    /// Removing an absent value is a no-op and keeps any sharing with clones intact.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(2);
    /// assert_eq!(tree.remove(&2), true);
    /// assert_eq!(tree.remove(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(value)
    }

    /// Removes and returns the element in the tree, if any, that is equal to the given one.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.take(&2), Some(2));
    /// assert_eq!(tree.take(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.take(value)
    }

    /// Removes the first element from the tree and returns it, if any.
    /// The first element is always the minimum element in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    ///
    /// tree.insert(1);
    /// while let Some(n) = tree.pop_first() {
    ///     assert_eq!(n, 1);
    /// }
    /// assert!(tree.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<T> {
        self.raw.pop_first()
    }

    /// Removes the last element from the tree and returns it, if any.
    /// The last element is always the maximum element in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.pop_last(), Some(3));
    /// assert_eq!(tree.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<T> {
        self.raw.pop_last()
    }
}

impl<T> Clone for AvlTree<T> {
    /// Returns a copy that shares every node with `self`.
    ///
    /// # Complexity
    ///
    /// O(1)
    fn clone(&self) -> Self {
        AvlTree { raw: self.raw.clone() }
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for AvlTree<T> {
    /// Draws the tree sideways: right subtrees above their parent, left subtrees below.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.to_string(), "┌──3\n2\n└──1\n");
    ///
    /// let empty: AvlTree<i32> = AvlTree::new();
    /// assert_eq!(empty.to_string(), "Empty Tree");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw.root() {
            Some(root) => fmt::Display::fmt(root, f),
            None => f.write_str("Empty Tree"),
        }
    }
}

impl<T: Hash> Hash for AvlTree<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for elt in self {
            elt.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for AvlTree<T> {
    fn eq(&self, other: &AvlTree<T>) -> bool {
        self.len() == other.len() && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for AvlTree<T> {}

impl<T: PartialOrd> PartialOrd for AvlTree<T> {
    fn partial_cmp(&self, other: &AvlTree<T>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for AvlTree<T> {
    fn cmp(&self, other: &AvlTree<T>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Ord + Clone> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord + Clone> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord + Clone, const N: usize> From<[T; N]> for AvlTree<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T: Clone + Ord> IntoIterator for AvlTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `AvlTree`'s contents in ascending order.
    ///
    /// Elements still shared with a clone are cloned; the rest are moved.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3, 4]);
    ///
    /// let v: Vec<_> = tree.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3, 4]);
    /// ```
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Default for Iter<'_, T> {
    /// Creates an empty `avl_tree::Iter`.
    ///
    /// ```
    /// # use cow_avl::avl_tree;
    /// let iter: avl_tree::Iter<'_, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            inner: RawIter::default(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("inner", &self.inner).finish()
    }
}

impl<T> Default for IntoIter<T> {
    /// Creates an empty `avl_tree::IntoIter`.
    ///
    /// ```
    /// # use cow_avl::avl_tree;
    /// let iter: avl_tree::IntoIter<u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter {
            inner: vec::IntoIter::default(),
        }
    }
}
