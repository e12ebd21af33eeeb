//! An ordered map implemented with an AVL tree.
//!
//! Nodes keep a link to their parent, so rebalancing walks upward from the
//! point of change without recursion, and traversals run without a stack.
//!
//! ```
//! use avl_tree::{AvlTree, Order};
//!
//! let mut tree: AvlTree<i32, char> = AvlTree::new();
//! for (key, value) in (1..=7).zip('a'..) {
//!     tree.insert(key, value).unwrap();
//! }
//! assert_eq!(tree.height(), 2);
//! assert_eq!(tree.root().map(|root| *root.key()), Some(4));
//!
//! let keys: Vec<i32> = tree.iter(Order::PreOrder).map(|(k, _)| *k).collect();
//! assert_eq!(keys, [4, 2, 1, 3, 6, 5, 7]);
//! ```
//!
//! With the `consistency_check` feature enabled every mutation is followed by
//! a full structural check of the tree.

mod error;
mod iter;
mod node;
mod tree;

pub use error::{Error, Result};
pub use iter::{Iter, Keys, Nodes, Order, Values};
pub use node::NodeRef;
pub use tree::{AvlTree, Pretty};
