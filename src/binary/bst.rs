use std::cmp::Ordering;

use tracing::debug;

use super::{BinaryNode, BinaryTree, BinaryTreeError, BinaryTreeResult, Link, leftmost_key, rightmost_key};
use crate::Key;
use crate::traversal::Traversal;

/// Unbalanced binary search tree with unique keys
#[derive(Debug, Clone, Default)]
pub struct BinarySearchTree {
    tree: BinaryTree,
    len: usize,
}

impl BinarySearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying tree, for diagnostics
    pub fn as_tree(&self) -> &BinaryTree {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn insert(&mut self, key: Key) -> BinaryTreeResult<()> {
        if self.tree.is_empty() {
            debug!(key, "creating binary search tree");
        }
        insert_node(&mut self.tree.root, key)?;
        self.len += 1;
        Ok(())
    }

    /// Remove `key`; a node with two children takes its in-order successor
    pub fn delete(&mut self, key: Key) -> BinaryTreeResult<()> {
        if self.tree.is_empty() {
            return Err(BinaryTreeError::EmptyTree);
        }
        delete_node(&mut self.tree.root, key)?;
        self.len -= 1;
        Ok(())
    }

    /// Search along a single root-to-leaf path
    pub fn contains(&self, key: Key) -> bool {
        let mut current = self.tree.root();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    pub fn min(&self) -> Option<Key> {
        self.tree.root().map(leftmost_key)
    }

    pub fn max(&self) -> Option<Key> {
        self.tree.root().map(rightmost_key)
    }

    pub fn traverse(&self, order: Traversal) -> Vec<Key> {
        self.tree.traverse(order)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn insert_node(link: &mut Link, key: Key) -> BinaryTreeResult<()> {
    let Some(node) = link.as_mut() else {
        *link = Some(Box::new(BinaryNode::new(key)));
        return Ok(());
    };

    match key.cmp(&node.key) {
        Ordering::Less => insert_node(&mut node.left, key)?,
        Ordering::Greater => insert_node(&mut node.right, key)?,
        Ordering::Equal => return Err(BinaryTreeError::DuplicateKey(key)),
    }
    node.update_height();
    Ok(())
}

fn delete_node(link: &mut Link, key: Key) -> BinaryTreeResult<()> {
    let Some(node) = link.as_mut() else {
        return Err(BinaryTreeError::KeyNotFound(key));
    };

    match key.cmp(&node.key) {
        Ordering::Less => delete_node(&mut node.left, key)?,
        Ordering::Greater => delete_node(&mut node.right, key)?,
        Ordering::Equal => match (node.left.is_some(), node.right.as_deref().map(leftmost_key)) {
            (true, Some(successor)) => {
                node.key = successor;
                delete_node(&mut node.right, successor)?;
            }
            _ => {
                let child = node.left.take().or_else(|| node.right.take());
                *link = child;
                return Ok(());
            }
        },
    }
    node.update_height();
    Ok(())
}
