//! Lazy depth-first traversals over the nodes of a tree.
//!
//! Traversals follow child and parent links, so they need no stack and take
//! constant extra space.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Link, Node, NodePtr, NodeRef};

/// Depth-first visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Left subtree, node, right subtree. Yields keys in ascending order.
    #[default]
    InOrder,
    /// Node, left subtree, right subtree.
    PreOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
}

#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

/// Walks the tree and stops at every node visited in the requested order.
pub(crate) struct Traversal<K, V> {
    node: Link<K, V>,
    dir: Direction,
    order: Order,
    remaining: usize,
}

impl<K, V> Traversal<K, V> {
    pub(crate) fn new(root: Link<K, V>, len: usize, order: Order) -> Self {
        Self {
            node: root,
            dir: Direction::FromParent,
            order,
            remaining: len,
        }
    }

    /// Returns the next node in traversal order.
    ///
    /// The returned node is not touched again by the traversal, only its
    /// address is compared, so a post-order traversal may free each node as
    /// soon as it is returned.
    pub(crate) fn advance(&mut self) -> Link<K, V> {
        while let Some(node_ptr) = self.node {
            let visit = match self.dir {
                Direction::FromParent => {
                    if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                        self.node = Some(left_ptr);
                    } else {
                        self.dir = Direction::FromLeft;
                    }
                    self.order == Order::PreOrder
                }
                Direction::FromLeft => {
                    if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                        self.node = Some(right_ptr);
                        self.dir = Direction::FromParent;
                    } else {
                        self.dir = Direction::FromRight;
                    }
                    self.order == Order::InOrder
                }
                Direction::FromRight => {
                    let parent = unsafe { node_ptr.as_ref().parent };
                    if let Some(parent_ptr) = parent {
                        if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                            self.dir = Direction::FromLeft;
                        } else {
                            self.dir = Direction::FromRight;
                        }
                    }
                    self.node = parent;
                    self.order == Order::PostOrder
                }
            };
            if visit {
                self.remaining -= 1;
                return Some(node_ptr);
            }
        }
        None
    }

    fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<K, V> Clone for Traversal<K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

/// An iterator over the entries of a tree in a chosen [`Order`].
///
/// This `struct` is created by [`AvlTree::iter`](crate::AvlTree::iter).
pub struct Iter<'a, K, V> {
    traversal: Traversal<K, V>,
    _marker: PhantomData<&'a Node<K, V>>,
}

/// An iterator over the node handles of a tree in a chosen [`Order`].
///
/// This `struct` is created by [`AvlTree::nodes`](crate::AvlTree::nodes).
pub struct Nodes<'a, K, V> {
    traversal: Traversal<K, V>,
    _marker: PhantomData<&'a Node<K, V>>,
}

/// An iterator over the keys of a tree in ascending order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a tree in ascending key order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(traversal: Traversal<K, V>) -> Self {
        Self {
            traversal,
            _marker: PhantomData,
        }
    }
}

impl<'a, K, V> Nodes<'a, K, V> {
    pub(crate) fn new(traversal: Traversal<K, V>) -> Self {
        Self {
            traversal,
            _marker: PhantomData,
        }
    }
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

fn entry<'a, K, V>(node_ptr: NodePtr<K, V>) -> (&'a K, &'a V) {
    let node = unsafe { &*node_ptr.as_ptr() };
    (&node.key, &node.value)
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.traversal.advance().map(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.traversal.remaining();
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            traversal: self.traversal.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Nodes<'a, K, V> {
    type Item = NodeRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.traversal.advance().map(NodeRef::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.traversal.remaining();
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for Nodes<'_, K, V> {}

impl<K, V> FusedIterator for Nodes<'_, K, V> {}

impl<K, V> Clone for Nodes<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            traversal: self.traversal.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
