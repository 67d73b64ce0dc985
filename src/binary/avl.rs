use std::cmp::Ordering;

use tracing::debug;

use super::{BinaryNode, BinaryTree, BinaryTreeError, BinaryTreeResult, Link, leftmost_key, rightmost_key};
use crate::Key;
use crate::traversal::Traversal;

/// Height-balanced binary search tree (AVL)
///
/// Every insert and delete rebalances the nodes on its path, so subtree
/// heights of any node never differ by more than one.
#[derive(Debug, Clone, Default)]
pub struct AvlTree {
    tree: BinaryTree,
    len: usize,
}

impl AvlTree {
    pub fn new() -> Self {
        Self::default()
    }

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
        insert_node(&mut self.tree.root, key)?;
        self.len += 1;
        Ok(())
    }

    pub fn delete(&mut self, key: Key) -> BinaryTreeResult<()> {
        if self.tree.is_empty() {
            return Err(BinaryTreeError::EmptyTree);
        }
        delete_node(&mut self.tree.root, key)?;
        self.len -= 1;
        Ok(())
    }

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

fn rotate_left(mut node: Box<BinaryNode>) -> Box<BinaryNode> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    debug!(node = node.key, pivot = pivot.key, "rotating left");
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_right(mut node: Box<BinaryNode>) -> Box<BinaryNode> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    debug!(node = node.key, pivot = pivot.key, "rotating right");
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

/// Restore the height and balance of the subtree at `link`
fn rebalance(link: &mut Link) {
    let Some(mut node) = link.take() else {
        return;
    };
    node.update_height();

    let balance = node.balance_factor();
    if balance > 1 {
        // left-right case
        if node.left.as_ref().is_some_and(|left| left.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        node = rotate_right(node);
    } else if balance < -1 {
        // right-left case
        if node.right.as_ref().is_some_and(|right| right.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        node = rotate_left(node);
    }
    *link = Some(node);
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
    rebalance(link);
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
    rebalance(link);
    Ok(())
}
