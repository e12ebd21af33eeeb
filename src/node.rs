use std::cmp;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub(crate) type NodePtr<K, V> = NonNull<Node<K, V>>;
pub(crate) type Link<K, V> = Option<NodePtr<K, V>>;
pub(crate) type LinkPtr<K, V> = NonNull<Link<K, V>>;

/// Height of a missing subtree.
pub(crate) const EMPTY_HEIGHT: isize = -1;

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Link<K, V>,
    pub(crate) height: isize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn create(parent: Link<K, V>, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 0,
        });
        // Box::into_raw never returns null
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    /// # Safety
    ///
    /// `node_ptr` must come from `Node::create` and must not be used afterwards.
    pub(crate) unsafe fn destroy(node_ptr: NodePtr<K, V>) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }
}

pub(crate) fn height<K, V>(link: Link<K, V>) -> isize {
    match link {
        None => EMPTY_HEIGHT,
        Some(node_ptr) => unsafe { node_ptr.as_ref().height },
    }
}

/// Recomputes the cached height of a node from its children.
pub(crate) fn adjust_height<K, V>(mut node_ptr: NodePtr<K, V>) {
    unsafe {
        let node = node_ptr.as_mut();
        node.height = 1 + cmp::max(height(node.left), height(node.right));
    }
}

pub(crate) fn balance_factor<K, V>(node_ptr: NodePtr<K, V>) -> isize {
    unsafe { height(node_ptr.as_ref().left) - height(node_ptr.as_ref().right) }
}

/// A read-only handle to a node of an [`AvlTree`](crate::AvlTree).
///
/// Handles are produced by [`AvlTree::root`](crate::AvlTree::root) and
/// [`AvlTree::nodes`](crate::AvlTree::nodes) and borrow the tree, so the tree
/// cannot be modified while a handle is alive.
pub struct NodeRef<'a, K, V> {
    node_ptr: NodePtr<K, V>,
    _marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(node_ptr: NodePtr<K, V>) -> Self {
        Self {
            node_ptr,
            _marker: PhantomData,
        }
    }

    fn link(link: Link<K, V>) -> Option<Self> {
        link.map(Self::new)
    }

    fn node(&self) -> &'a Node<K, V> {
        unsafe { &*self.node_ptr.as_ptr() }
    }

    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    /// Height of the subtree rooted at this node. A leaf has height 0.
    pub fn height(&self) -> isize {
        self.node().height
    }

    /// Height of the left subtree minus height of the right subtree.
    pub fn balance_factor(&self) -> isize {
        balance_factor(self.node_ptr)
    }

    pub fn left(&self) -> Option<Self> {
        Self::link(self.node().left)
    }

    pub fn right(&self) -> Option<Self> {
        Self::link(self.node().right)
    }

    /// The structural parent, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        Self::link(self.node().parent)
    }

    pub fn is_leaf(&self) -> bool {
        self.node().left.is_none() && self.node().right.is_none()
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

/// Handles compare equal when they refer to the same node.
impl<K, V> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.node_ptr == other.node_ptr
    }
}

impl<K, V> Eq for NodeRef<'_, K, V> {}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "key: {}, value: {}", self.key(), self.value())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}
