use smallvec::SmallVec;

use super::node::Node;

// Inline stack depth before spilling to the heap. An AVL tree of height 32 holds millions of
// elements; the test value is small so the spill path is exercised.
#[cfg(test)]
const INLINE_DEPTH: usize = 2;
#[cfg(not(test))]
const INLINE_DEPTH: usize = 32;

type Stack<'a, T> = SmallVec<[&'a Node<T>; INLINE_DEPTH]>;

/// Double-ended in-order iterator over a node chain.
///
/// The front stack holds the unvisited ancestors on the path to the next smallest element, the
/// back stack those on the path to the next largest. `remaining` stops both ends once they meet.
pub(crate) struct RawIter<'a, T> {
    front: Stack<'a, T>,
    back: Stack<'a, T>,
    remaining: usize,
}

impl<'a, T> RawIter<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>, len: usize) -> Self {
        let mut iter = Self {
            front: SmallVec::new(),
            back: SmallVec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter.push_right_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.front.push(n);
            node = n.left();
        }
    }

    fn push_right_spine(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(n) = node {
            self.back.push(n);
            node = n.right();
        }
    }
}

impl<'a, T> Iterator for RawIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.pop()?;
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some(node.value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for RawIter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.pop()?;
        self.push_right_spine(node.left());
        self.remaining -= 1;
        Some(node.value())
    }
}

impl<T> ExactSizeIterator for RawIter<'_, T> {}

impl<T> Clone for RawIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<T> Default for RawIter<'_, T> {
    fn default() -> Self {
        Self::new(None, 0)
    }
}
