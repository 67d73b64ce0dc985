//! Binary trees
//!
//! `BinaryTree` accepts any shape and carries the diagnostics (height,
//! balance, BST/AVL checks, per-level access). `BinarySearchTree` and
//! `AvlTree` own a `BinaryTree` and keep it ordered; the AVL tree also keeps
//! it height-balanced.

mod avl;
mod bst;
mod error;

pub use avl::AvlTree;
pub use bst::BinarySearchTree;
pub use error::{BinaryTreeError, BinaryTreeResult};

use crate::Key;
use crate::traversal::Traversal;

/// Owning link to a subtree
pub type Link = Option<Box<BinaryNode>>;

/// Binary tree node with a cached subtree height (a leaf has height 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryNode {
    key: Key,
    left: Link,
    right: Link,
    height: usize,
}

impl BinaryNode {
    /// Create a leaf node
    pub fn new(key: Key) -> Self {
        Self {
            key,
            left: None,
            right: None,
            height: 1,
        }
    }

    /// Create a node over the given subtrees
    pub fn with_children(key: Key, left: Option<BinaryNode>, right: Option<BinaryNode>) -> Self {
        let mut node = Self {
            key,
            left: left.map(Box::new),
            right: right.map(Box::new),
            height: 1,
        };
        node.update_height();
        node
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn left(&self) -> Option<&BinaryNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&BinaryNode> {
        self.right.as_deref()
    }

    /// Number of levels in the subtree rooted here
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// Left height minus right height
    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

/// Smallest key of a search-ordered subtree
fn leftmost_key(node: &BinaryNode) -> Key {
    let mut current = node;
    while let Some(left) = current.left() {
        current = left;
    }
    current.key
}

/// Largest key of a search-ordered subtree
fn rightmost_key(node: &BinaryNode) -> Key {
    let mut current = node;
    while let Some(right) = current.right() {
        current = right;
    }
    current.key
}

/// Binary tree of any shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryTree {
    root: Link,
}

impl BinaryTree {
    pub fn new(root: Option<BinaryNode>) -> Self {
        Self {
            root: root.map(Box::new),
        }
    }

    pub fn root(&self) -> Option<&BinaryNode> {
        self.root.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels (0 for an empty tree)
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        fn count(node: Option<&BinaryNode>) -> usize {
            node.map_or(0, |n| 1 + count(n.left()) + count(n.right()))
        }
        count(self.root())
    }

    /// Sum of every key
    pub fn sum(&self) -> i128 {
        fn sum(node: Option<&BinaryNode>) -> i128 {
            node.map_or(0, |n| i128::from(n.key) + sum(n.left()) + sum(n.right()))
        }
        sum(self.root())
    }

    /// Smallest key, found by visiting every node
    pub fn min(&self) -> Option<Key> {
        self.traverse(Traversal::PreOrder).into_iter().min()
    }

    /// Largest key, found by visiting every node
    pub fn max(&self) -> Option<Key> {
        self.traverse(Traversal::PreOrder).into_iter().max()
    }

    /// Search every node for `key`
    pub fn contains(&self, key: Key) -> bool {
        fn search(node: Option<&BinaryNode>, key: Key) -> bool {
            node.is_some_and(|n| n.key == key || search(n.left(), key) || search(n.right(), key))
        }
        search(self.root(), key)
    }

    /// Every node's subtrees differ in height by at most one
    pub fn is_balanced(&self) -> bool {
        fn balanced(node: Option<&BinaryNode>) -> bool {
            node.is_none_or(|n| {
                n.balance_factor().abs() <= 1 && balanced(n.left()) && balanced(n.right())
            })
        }
        balanced(self.root())
    }

    /// Every node has either zero or two children
    pub fn is_full(&self) -> bool {
        fn full(node: Option<&BinaryNode>) -> bool {
            node.is_none_or(|n| {
                n.is_leaf()
                    || match (n.left(), n.right()) {
                        (Some(l), Some(r)) => full(Some(l)) && full(Some(r)),
                        _ => false,
                    }
            })
        }
        full(self.root())
    }

    /// Keys are strictly ordered: left subtree < node < right subtree
    pub fn is_bst(&self) -> bool {
        fn ordered(node: Option<&BinaryNode>, lower: Option<Key>, upper: Option<Key>) -> bool {
            let Some(n) = node else {
                return true;
            };
            if lower.is_some_and(|lo| n.key <= lo) || upper.is_some_and(|hi| n.key >= hi) {
                return false;
            }
            ordered(n.left(), lower, Some(n.key)) && ordered(n.right(), Some(n.key), upper)
        }
        ordered(self.root(), None, None)
    }

    /// Ordered and balanced
    pub fn is_avl(&self) -> bool {
        self.is_bst() && self.is_balanced()
    }

    /// Same shape and same keys
    pub fn same_as(&self, other: &BinaryTree) -> bool {
        fn same(a: Option<&BinaryNode>, b: Option<&BinaryNode>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    a.key == b.key && same(a.left(), b.left()) && same(a.right(), b.right())
                }
                _ => false,
            }
        }
        same(self.root(), other.root())
    }

    /// Same shape, keys ignored
    pub fn similar_to(&self, other: &BinaryTree) -> bool {
        fn similar(a: Option<&BinaryNode>, b: Option<&BinaryNode>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => similar(a.left(), b.left()) && similar(a.right(), b.right()),
                _ => false,
            }
        }
        similar(self.root(), other.root())
    }

    /// Keys at depth `level` (root is level 0), left to right
    pub fn level(&self, level: usize) -> BinaryTreeResult<Vec<Key>> {
        let height = self.height();
        if level >= height {
            return Err(BinaryTreeError::LevelOutOfRange { level, height });
        }
        Ok(self.levels().swap_remove(level))
    }

    /// Keys grouped by depth
    pub fn levels(&self) -> Vec<Vec<Key>> {
        let mut levels = Vec::new();
        let mut frontier: Vec<&BinaryNode> = self.root().into_iter().collect();
        while !frontier.is_empty() {
            levels.push(frontier.iter().map(|n| n.key).collect());
            frontier = frontier
                .iter()
                .flat_map(|n| n.left().into_iter().chain(n.right()))
                .collect();
        }
        levels
    }

    /// Keys in the given traversal order
    pub fn traverse(&self, order: Traversal) -> Vec<Key> {
        fn walk(node: Option<&BinaryNode>, order: Traversal, out: &mut Vec<Key>) {
            let Some(n) = node else {
                return;
            };
            if order == Traversal::PreOrder {
                out.push(n.key);
            }
            walk(n.left(), order, out);
            if order == Traversal::InOrder {
                out.push(n.key);
            }
            walk(n.right(), order, out);
            if order == Traversal::PostOrder {
                out.push(n.key);
            }
        }

        if order == Traversal::LevelOrder {
            return self.levels().into_iter().flatten().collect();
        }
        let mut out = Vec::new();
        walk(self.root(), order, &mut out);
        out
    }

    /// Swap the root's left and right subtrees
    pub fn swap_children(&mut self) {
        if let Some(root) = self.root.as_mut() {
            std::mem::swap(&mut root.left, &mut root.right);
        }
    }
}
