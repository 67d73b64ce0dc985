//! General trees where each node holds any number of ordered children
//!
//! Nodes are addressed by key: `add` appends under an existing parent and
//! `delete` drops a node together with its subtree. Keys are unique.

mod error;

pub use error::{NAryTreeError, NAryTreeResult};

use tracing::debug;

use crate::Key;
use crate::traversal::Traversal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NAryNode {
    pub key: Key,
    pub children: Vec<NAryNode>,
}

impl NAryNode {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            children: Vec::new(),
        }
    }

    pub fn with_children(key: Key, children: Vec<NAryNode>) -> Self {
        Self { key, children }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn find(&self, key: Key) -> Option<&NAryNode> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }

    fn find_mut(&mut self, key: Key) -> Option<&mut NAryNode> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(key))
    }

    /// Detach the descendant holding `key`, returning whether one was found
    fn remove_descendant(&mut self, key: Key) -> bool {
        if let Some(pos) = self.children.iter().position(|child| child.key == key) {
            self.children.remove(pos);
            return true;
        }
        self.children
            .iter_mut()
            .any(|child| child.remove_descendant(key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NAryTree {
    root: Option<NAryNode>,
}

impl NAryTree {
    pub fn new(root: Option<NAryNode>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Option<&NAryNode> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Add `key` as the last child of `parent`. On an empty tree `key`
    /// becomes the root and `parent` is ignored.
    pub fn add(&mut self, parent: Key, key: Key) -> NAryTreeResult<()> {
        let Some(root) = self.root.as_mut() else {
            debug!(key, "creating n-ary tree");
            self.root = Some(NAryNode::new(key));
            return Ok(());
        };

        if root.find(key).is_some() {
            return Err(NAryTreeError::DuplicateKey(key));
        }
        let parent_node = root
            .find_mut(parent)
            .ok_or(NAryTreeError::ParentNotFound(parent))?;
        parent_node.children.push(NAryNode::new(key));
        Ok(())
    }

    /// Remove the node holding `key` along with all of its descendants
    pub fn delete(&mut self, key: Key) -> NAryTreeResult<()> {
        let Some(root) = self.root.as_mut() else {
            return Err(NAryTreeError::EmptyTree);
        };

        if root.key == key {
            self.root = None;
        } else if !root.remove_descendant(key) {
            return Err(NAryTreeError::KeyNotFound(key));
        }
        debug!(key, "removed n-ary subtree");
        Ok(())
    }

    pub fn contains(&self, key: Key) -> bool {
        self.root().is_some_and(|root| root.find(key).is_some())
    }

    /// Number of levels (0 for an empty tree)
    pub fn height(&self) -> usize {
        fn height(node: &NAryNode) -> usize {
            1 + node.children.iter().map(height).max().unwrap_or(0)
        }
        self.root().map_or(0, height)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        fn count(node: &NAryNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.root().map_or(0, count)
    }

    /// Largest number of children held by any node
    pub fn degree(&self) -> usize {
        fn degree(node: &NAryNode) -> usize {
            node.children
                .iter()
                .map(degree)
                .fold(node.children.len(), usize::max)
        }
        self.root().map_or(0, degree)
    }

    pub fn leaf_count(&self) -> usize {
        fn leaves(node: &NAryNode) -> usize {
            if node.is_leaf() {
                1
            } else {
                node.children.iter().map(leaves).sum()
            }
        }
        self.root().map_or(0, leaves)
    }

    /// Keys at depth `level` (root is level 0), left to right
    pub fn level(&self, level: usize) -> NAryTreeResult<Vec<Key>> {
        let height = self.height();
        if level >= height {
            return Err(NAryTreeError::LevelOutOfRange { level, height });
        }
        Ok(self.levels().swap_remove(level))
    }

    pub fn levels(&self) -> Vec<Vec<Key>> {
        let mut levels = Vec::new();
        let mut frontier: Vec<&NAryNode> = self.root().into_iter().collect();
        while !frontier.is_empty() {
            levels.push(frontier.iter().map(|n| n.key).collect());
            frontier = frontier.iter().flat_map(|n| n.children.iter()).collect();
        }
        levels
    }

    /// Keys in the given traversal order. In-order visits the first half of
    /// a node's children, then the node, then the remaining children.
    pub fn traverse(&self, order: Traversal) -> Vec<Key> {
        fn walk(node: &NAryNode, order: Traversal, out: &mut Vec<Key>) {
            let half = match order {
                Traversal::PreOrder => 0,
                Traversal::InOrder => node.children.len() / 2,
                _ => node.children.len(),
            };
            for child in &node.children[..half] {
                walk(child, order, out);
            }
            if order != Traversal::PostOrder {
                out.push(node.key);
            }
            for child in &node.children[half..] {
                walk(child, order, out);
            }
            if order == Traversal::PostOrder {
                out.push(node.key);
            }
        }

        if order == Traversal::LevelOrder {
            return self.levels().into_iter().flatten().collect();
        }
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            walk(root, order, &mut out);
        }
        out
    }
}
