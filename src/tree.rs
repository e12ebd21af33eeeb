use std::cmp::Ordering;
use std::fmt;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::iter::{Iter, Keys, Nodes, Order, Traversal, Values};
use crate::node::{self, Link, LinkPtr, Node, NodePtr, NodeRef};

/// An ordered map implemented with an AVL tree.
///
/// Keys are unique. Inserting an existing key is rejected and leaves the
/// stored value untouched.
///
/// ```
/// use avl_tree::AvlTree;
///
/// let mut tree: AvlTree<i32, &str> = AvlTree::new();
/// assert_eq!(tree.insert(1, "one"), Ok(true));
/// assert_eq!(tree.insert(1, "uno"), Ok(false));
/// assert_eq!(tree.find(&1), Ok(Some(&"one")));
/// assert!(tree.insert(None, "none").is_err());
/// assert_eq!(tree.delete(&1), Ok(true));
/// assert_eq!(tree.find(&1), Ok(None));
/// ```
pub struct AvlTree<K, V> {
    root: Link<K, V>,
    num_nodes: usize,
}

// SAFETY: the tree exclusively owns its nodes, like `Box` would, and node
// pointers never escape except behind a borrow of the tree.
unsafe impl<K: Send, V: Send> Send for AvlTree<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for AvlTree<K, V> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl<K, V> AvlTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub const fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of key/value pairs in the tree.
    pub fn size(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree, `-1` for an empty tree and `0` for a
    /// single node.
    pub fn height(&self) -> isize {
        node::height(self.root)
    }

    /// Returns a handle to the root node.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.root.map(NodeRef::new)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        let mut traversal = Traversal::new(self.root, self.num_nodes, Order::PostOrder);
        while let Some(node_ptr) = traversal.advance() {
            unsafe { Node::destroy(node_ptr) };
        }
        self.root = None;
        self.num_nodes = 0;
    }

    /// Gets an iterator over the entries of the tree in the given order.
    ///
    /// The iterator is lazy. Calling `iter` again, or cloning an iterator,
    /// restarts the traversal.
    pub fn iter(&self, order: Order) -> Iter<'_, K, V> {
        Iter::new(Traversal::new(self.root, self.num_nodes, order))
    }

    /// Gets an iterator over node handles in the given order.
    pub fn nodes(&self, order: Order) -> Nodes<'_, K, V> {
        Nodes::new(Traversal::new(self.root, self.num_nodes, order))
    }

    /// Gets an iterator over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter(Order::InOrder))
    }

    /// Gets an iterator over the values in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter(Order::InOrder))
    }

    /// Returns references to all values in pre-order.
    pub fn to_vec(&self) -> Vec<&V> {
        self.iter(Order::PreOrder).map(|(_, v)| v).collect()
    }

    /// Returns true if no node's subtrees differ in height by more than one.
    pub fn is_balanced(&self) -> bool {
        self.nodes(Order::PreOrder)
            .all(|node| node.balance_factor().abs() <= 1)
    }

    /// Returns a [`Display`](fmt::Display) adapter drawing the tree sideways:
    /// right subtree first, then the node, then the left subtree, each level
    /// indented by four spaces.
    pub fn pretty(&self) -> Pretty<'_, K, V> {
        Pretty { tree: self }
    }

    /// Asserts all structural invariants: parent links, key order, cached
    /// heights, AVL balance and node count.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self)
    where
        K: Ord,
    {
        unsafe {
            // Check root link
            if let Some(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            let mut traversal = Traversal::new(self.root, self.num_nodes, Order::PreOrder);
            while let Some(node_ptr) = traversal.advance() {
                let node = node_ptr.as_ref();

                // Check link for left child node
                if let Some(left_ptr) = node.left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert!(left_ptr.as_ref().key < node.key);
                }

                // Check link for right child node
                if let Some(right_ptr) = node.right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert!(right_ptr.as_ref().key > node.key);
                }

                // Check height
                let left_height = node::height(node.left);
                let right_height = node::height(node.right);
                assert_eq!(node.height, 1 + left_height.max(right_height));

                // Check AVL condition (nearly balance)
                assert!((left_height - right_height).abs() <= 1);

                num_nodes += 1;
            }

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);
        }
    }

    /// Recomputes heights from `start_from` up to the root and restores the
    /// AVL condition wherever it is violated. Walks all the way up.
    fn restructure(&mut self, start_from: Link<K, V>) {
        let mut current = start_from;
        while let Some(mut node_ptr) = current {
            node::adjust_height(node_ptr);
            if node::balance_factor(node_ptr).abs() > 1 {
                node_ptr = self.cut_link(node_ptr);
            }
            current = unsafe { node_ptr.as_ref().parent };
        }
    }

    /// Trinode restructuring at the unbalanced node `z`.
    ///
    /// With `y` the taller child of `z` and `x` the taller child of `y`, the
    /// middle of the three keys becomes the local root, the other two its
    /// children, and the four outer subtrees are reattached in key order.
    /// Returns the new local root.
    fn cut_link(&mut self, z: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe {
            let (y_side, y) = Self::taller_child(z, Side::Left);
            let (x_side, x) = Self::taller_child(y, y_side);

            let (a, b, c, t0, t1, t2, t3) = match (y_side, x_side) {
                (Side::Left, Side::Left) => (
                    x,
                    y,
                    z,
                    x.as_ref().left,
                    x.as_ref().right,
                    y.as_ref().right,
                    z.as_ref().right,
                ),
                (Side::Left, Side::Right) => (
                    y,
                    x,
                    z,
                    y.as_ref().left,
                    x.as_ref().left,
                    x.as_ref().right,
                    z.as_ref().right,
                ),
                (Side::Right, Side::Left) => (
                    z,
                    x,
                    y,
                    z.as_ref().left,
                    x.as_ref().left,
                    x.as_ref().right,
                    y.as_ref().right,
                ),
                (Side::Right, Side::Right) => (
                    z,
                    y,
                    x,
                    z.as_ref().left,
                    y.as_ref().left,
                    x.as_ref().left,
                    x.as_ref().right,
                ),
            };

            // Hang the new local root where z used to be
            let grandparent = z.as_ref().parent;
            self.replace_child(grandparent, z, Some(b));
            Self::set_parent(Some(b), grandparent);

            Self::set_children(a, t0, t1);
            Self::set_children(c, t2, t3);
            Self::set_children(b, Some(a), Some(c));

            node::adjust_height(a);
            node::adjust_height(c);
            node::adjust_height(b);

            trace!(
                "cut-link restructuring ({:?}-{:?}), local root height {}",
                y_side,
                x_side,
                b.as_ref().height
            );
            b
        }
    }

    /// Returns the taller child of a node that has at least one child.
    /// On equal heights the child on side `tie` wins.
    unsafe fn taller_child(node_ptr: NodePtr<K, V>, tie: Side) -> (Side, NodePtr<K, V>) {
        let node = node_ptr.as_ref();
        let left_height = node::height(node.left);
        let right_height = node::height(node.right);
        let side = match left_height.cmp(&right_height) {
            Ordering::Greater => Side::Left,
            Ordering::Less => Side::Right,
            Ordering::Equal => tie,
        };
        let child = match side {
            Side::Left => node.left,
            Side::Right => node.right,
        };
        debug_assert!(child.is_some());
        (side, child.unwrap_unchecked())
    }

    unsafe fn set_parent(link: Link<K, V>, parent: Link<K, V>) {
        if let Some(mut node_ptr) = link {
            node_ptr.as_mut().parent = parent;
        }
    }

    unsafe fn set_children(mut node_ptr: NodePtr<K, V>, left: Link<K, V>, right: Link<K, V>) {
        node_ptr.as_mut().left = left;
        node_ptr.as_mut().right = right;
        Self::set_parent(left, Some(node_ptr));
        Self::set_parent(right, Some(node_ptr));
    }

    /// Points the slot of `parent` that holds `old` (or the root slot, when
    /// there is no parent) at `new`. Does not touch the parent link of `new`.
    unsafe fn replace_child(&mut self, parent: Link<K, V>, old: NodePtr<K, V>, new: Link<K, V>) {
        match parent {
            None => self.root = new,
            Some(mut parent_ptr) => {
                if parent_ptr.as_ref().left == Some(old) {
                    parent_ptr.as_mut().left = new;
                } else {
                    debug_assert!(parent_ptr.as_ref().right == Some(old));
                    parent_ptr.as_mut().right = new;
                }
            }
        }
    }

    /// Replaces the subtree rooted at `old` by the subtree rooted at `new`.
    unsafe fn transplant(&mut self, old: NodePtr<K, V>, new: Link<K, V>) {
        let parent = old.as_ref().parent;
        self.replace_child(parent, old, new);
        Self::set_parent(new, parent);
    }

    fn leftmost(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        while let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
            node_ptr = left_ptr;
        }
        node_ptr
    }

    fn rightmost(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        while let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
            node_ptr = right_ptr;
        }
        node_ptr
    }

    /// Unlinks a node from the tree and rebalances. Does not free the node.
    fn unlink_node(&mut self, node_ptr: NodePtr<K, V>) {
        unsafe {
            let node = node_ptr.as_ref();
            let parent = node.parent;
            let removed_height = node.height;

            // Deepest node on the far side of the parent; restructuring from
            // there passes through the parent and every ancestor above it.
            let balance_witness = parent.map(|parent_ptr| {
                if parent_ptr.as_ref().left == Some(node_ptr) {
                    Self::rightmost(parent_ptr)
                } else {
                    Self::leftmost(parent_ptr)
                }
            });

            match (node.left, node.right) {
                (None, None) => {
                    debug!("removing leaf node");
                    self.replace_child(parent, node_ptr, None);
                    self.restructure(balance_witness);
                }
                (Some(child_ptr), None) | (None, Some(child_ptr)) => {
                    debug!("removing node with one child");
                    self.transplant(node_ptr, Some(child_ptr));
                    self.restructure(balance_witness);
                }
                (Some(left_ptr), Some(right_ptr)) => {
                    debug!("removing node with two children");
                    let mut successor_ptr = Self::leftmost(right_ptr);
                    let rebalance_from = if successor_ptr.as_ref().parent != Some(node_ptr) {
                        let successor_parent = successor_ptr.as_ref().parent;
                        self.transplant(successor_ptr, successor_ptr.as_ref().right);
                        successor_ptr.as_mut().right = Some(right_ptr);
                        Self::set_parent(Some(right_ptr), Some(successor_ptr));
                        successor_parent
                    } else {
                        Some(successor_ptr)
                    };
                    self.transplant(node_ptr, Some(successor_ptr));
                    successor_ptr.as_mut().left = Some(left_ptr);
                    Self::set_parent(Some(left_ptr), Some(successor_ptr));
                    // Placeholder until the walk below passes the successor
                    successor_ptr.as_mut().height = removed_height;
                    self.restructure(rebalance_from);
                }
            }
        }
    }

    #[cfg(feature = "consistency_check")]
    fn after_mutation(&self)
    where
        K: Ord,
    {
        self.check_consistency();
    }

    #[cfg(not(feature = "consistency_check"))]
    fn after_mutation(&self) {}
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// Returns `Ok(None)` if the key is not in the tree and an error if the
    /// key is `None`.
    pub fn find<'k>(&self, key: impl Into<Option<&'k K>>) -> Result<Option<&V>>
    where
        K: 'k,
    {
        let key = key.into().ok_or(Error::NONE_KEY)?;
        Ok(self.get(key))
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key)
            .map(|node_ptr| &unsafe { &*node_ptr.as_ptr() }.value)
    }

    /// Returns true if the tree contains the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// Returns `Ok(false)` without modifying the tree if the key is already
    /// present, and an error if either the key or the value is `None`.
    pub fn insert(&mut self, key: impl Into<Option<K>>, value: impl Into<Option<V>>) -> Result<bool> {
        let key = key.into().ok_or(Error::NONE_KEY)?;
        let value = value.into().ok_or(Error::NONE_VALUE)?;
        Ok(self.insert_entry(key, value))
    }

    /// Removes a key from the tree.
    ///
    /// Returns `Ok(false)` if the key was not present and an error if the key
    /// is `None`.
    pub fn delete<'k>(&mut self, key: impl Into<Option<&'k K>>) -> Result<bool>
    where
        K: 'k,
    {
        let key = key.into().ok_or(Error::NONE_KEY)?;
        Ok(self.remove(key))
    }

    /// Removes a key from the tree, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        // Find node to-be-removed
        if let Some(node_ptr) = self.find_node(key) {
            debug_assert!(self.num_nodes >= 1);
            if self.num_nodes == 1 {
                self.root = None;
            } else {
                self.unlink_node(node_ptr);
            }
            unsafe { Node::destroy(node_ptr) };
            self.num_nodes -= 1;
            debug_assert!(self.get(key).is_none());
            self.after_mutation();
            return true;
        }
        false
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        if let Some((parent, mut link_ptr)) = self.find_insert_pos(&key) {
            let node_ptr = Node::create(parent, key, value);
            unsafe {
                *link_ptr.as_mut() = Some(node_ptr);
            }
            self.num_nodes += 1;

            // A parent that already had a child keeps its height
            let parent_grew = parent.map_or(false, |parent_ptr| unsafe {
                let parent = parent_ptr.as_ref();
                parent.left.is_none() || parent.right.is_none()
            });
            if parent_grew {
                self.restructure(Some(node_ptr));
            }
            self.after_mutation();
            return true;
        }
        false
    }

    fn find_node(&self, key: &K) -> Link<K, V> {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    fn find_insert_pos(&mut self, key: &K) -> Option<(Link<K, V>, LinkPtr<K, V>)> {
        let mut parent: Link<K, V> = None;
        let mut link_ptr: LinkPtr<K, V> = LinkPtr::from(&mut self.root);
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                parent = Some(node_ptr);
                link_ptr = match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => return None,
                    Ordering::Less => LinkPtr::from(&mut node_ptr.as_mut().left),
                    Ordering::Greater => LinkPtr::from(&mut node_ptr.as_mut().right),
                };
            }
        }
        Some((parent, link_ptr))
    }
}

impl<K, V> Drop for AvlTree<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

/// Entries with a key already in the tree are skipped.
impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert_entry(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter(Order::InOrder)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_map().entries(self.iter(Order::InOrder)).finish()
    }
}

/// Sideways rendering of a tree, created by [`AvlTree::pretty`].
pub struct Pretty<'a, K, V> {
    tree: &'a AvlTree<K, V>,
}

impl<K: fmt::Display, V> fmt::Display for Pretty<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Reverse in-order walk with an explicit stack
        let mut stack: Vec<(NodePtr<K, V>, usize)> = Vec::new();
        let mut current = self.tree.root;
        let mut depth = 0;
        loop {
            while let Some(node_ptr) = current {
                stack.push((node_ptr, depth));
                current = unsafe { node_ptr.as_ref().right };
                depth += 1;
            }
            let Some((node_ptr, node_depth)) = stack.pop() else {
                break;
            };
            let node = unsafe { node_ptr.as_ref() };
            writeln!(f, "{:indent$}-> {}", "", node.key, indent = 4 * node_depth)?;
            current = node.left;
            depth = node_depth + 1;
        }
        Ok(())
    }
}
