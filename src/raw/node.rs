use alloc::format;
use alloc::rc::Rc;
use core::fmt;

/// Shared, optional ownership link to a subtree.
///
/// Two trees that have not diverged hold the same `Rc`. A writer obtains the node through
/// [`Rc::make_mut`], which mutates in place when the strong count is 1 and otherwise clones the
/// single node first.
pub(crate) type Link<T> = Option<Rc<Node<T>>>;

/// Height of an empty subtree.
pub(crate) const EMPTY_HEIGHT: i32 = -1;

// Cloning a node is shallow: the value is cloned and both child links are shared.
#[derive(Clone)]
pub(crate) struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    // Edges on the longest path down to a leaf; 0 for a leaf.
    height: i32,
}

/// Returns the cached height of the linked node, or [`EMPTY_HEIGHT`] for an absent link.
#[inline]
pub(crate) fn height_of<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(EMPTY_HEIGHT, |node| node.height())
}

impl<T> Node<T> {
    /// Creates a new leaf node.
    pub(crate) const fn new(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
            height: 0,
        }
    }

    #[inline]
    pub(crate) fn value(&self) -> &T {
        &self.value
    }

    /// Replaces the stored value, returning the old one.
    pub(crate) fn replace_value(&mut self, value: T) -> T {
        core::mem::replace(&mut self.value, value)
    }

    /// Consumes the node, returning its value and both child links.
    pub(crate) fn into_parts(self) -> (T, Link<T>, Link<T>) {
        (self.value, self.left, self.right)
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<&Node<T>> {
        self.left.as_deref()
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<&Node<T>> {
        self.right.as_deref()
    }

    pub(crate) fn has_left(&self) -> bool {
        self.left.is_some()
    }

    pub(crate) fn has_right(&self) -> bool {
        self.right.is_some()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub(crate) fn take_left(&mut self) -> Link<T> {
        self.left.take()
    }

    pub(crate) fn take_right(&mut self) -> Link<T> {
        self.right.take()
    }

    pub(crate) fn set_left(&mut self, left: Link<T>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Link<T>) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub(crate) fn left_height(&self) -> i32 {
        height_of(&self.left)
    }

    #[inline]
    pub(crate) fn right_height(&self) -> i32 {
        height_of(&self.right)
    }

    /// Height of the left subtree minus height of the right subtree.
    ///
    /// Always derived from the children, never cached.
    #[inline]
    pub(crate) fn balance_factor(&self) -> i32 {
        self.left_height() - self.right_height()
    }

    /// Recomputes the cached height from the (already final) children.
    #[inline]
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + self.left_height().max(self.right_height());
    }

    /// Returns the leftmost node of this subtree.
    pub(crate) fn min_node(&self) -> &Node<T> {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// Returns the rightmost node of this subtree.
    pub(crate) fn max_node(&self) -> &Node<T> {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// Visits the node, then its left subtree, then its right subtree.
    pub(crate) fn traverse_pre_order<F: FnMut(&T)>(&self, visit: &mut F) {
        visit(&self.value);
        if let Some(left) = self.left() {
            left.traverse_pre_order(visit);
        }
        if let Some(right) = self.right() {
            right.traverse_pre_order(visit);
        }
    }

    /// Visits the left subtree, then the node, then the right subtree.
    pub(crate) fn traverse_in_order<F: FnMut(&T)>(&self, visit: &mut F) {
        if let Some(left) = self.left() {
            left.traverse_in_order(visit);
        }
        visit(&self.value);
        if let Some(right) = self.right() {
            right.traverse_in_order(visit);
        }
    }

    /// Visits the left subtree, then the right subtree, then the node.
    pub(crate) fn traverse_post_order<F: FnMut(&T)>(&self, visit: &mut F) {
        if let Some(left) = self.left() {
            left.traverse_post_order(visit);
        }
        if let Some(right) = self.right() {
            right.traverse_post_order(visit);
        }
        visit(&self.value);
    }
}

// Sideways diagram: the right subtree is drawn above its parent and the left subtree below.
fn diagram<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    node: Option<&Node<T>>,
    top: &str,
    root: &str,
    bottom: &str,
) -> fmt::Result {
    let Some(node) = node else {
        return writeln!(f, "{root}nil");
    };
    if node.is_leaf() {
        return writeln!(f, "{root}{}", node.value);
    }
    diagram(f, node.right(), &format!("{top} "), &format!("{top}┌──"), &format!("{top}│ "))?;
    writeln!(f, "{root}{}", node.value)?;
    diagram(f, node.left(), &format!("{bottom}│ "), &format!("{bottom}└──"), &format!("{bottom} "))
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        diagram(f, Some(self), "", "", "")
    }
}
