//! Multiway B-tree over integer keys
//!
//! This module provides a classic (CLRS-style) B-tree where keys live in
//! both internal nodes and leaves. It supports:
//! - Pre-emptive splitting on the way down during insertion
//! - Top-down deletion that refills a child (borrow or merge) before
//!   descending into it, so no node ever underflows after the fact
//! - Read-only traversals, per-level rendering and an invariant checker
//!
//! Nodes live in an arena addressed by `NodeId`. Moving an id from one
//! parent's child list to another is the only way a subtree changes owner.

mod error;
mod node;

#[cfg(test)]
mod tests;

pub use error::{BTreeError, BTreeResult};
pub use node::{BNode, NodeId};

use tracing::debug;

use crate::Key;
use crate::traversal::Traversal;

/// Default B-tree order used by the shell
/// - at most 3 keys and 4 children per node
/// - at least 1 key in every non-root node
pub const DEFAULT_ORDER: usize = 4;

/// Whether `order` can back a B-tree
///
/// Splitting a full node leaves maxKeys - 1 keys for two siblings, and
/// merging two minimal siblings needs room for 2 * minKeys + 1 keys. Both
/// only fit when maxKeys is odd, so odd orders are rejected: order 3 would
/// split a 2-key node into the median and an empty sibling, and order 5
/// would leave one sibling with a single key below minKeys = 2.
pub fn is_valid_order(order: usize) -> bool {
    order >= 4 && order % 2 == 0
}

/// B-tree data structure
///
/// Order `P` means:
/// - Nodes have at most `P` children and `P - 1` keys
/// - Nodes (except root) have at least `floor((P - 1) / 2)` keys
/// - All leaves sit at the same depth
#[derive(Debug, Clone)]
pub struct BTree {
    /// Root node ID (an empty leaf when the tree is empty)
    root: NodeId,

    /// Tree order (max children per node)
    order: usize,

    /// Node storage
    nodes: Vec<Option<BNode>>,

    /// Free list for recycling deleted nodes
    free_list: Vec<NodeId>,

    /// Total number of keys in the tree
    key_count: usize,
}

impl Default for BTree {
    fn default() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }
}

impl BTree {
    /// Create a new empty B-tree with the given order
    ///
    /// # Arguments
    /// * `order` - The tree order (an even number >= 4)
    ///
    /// # Returns
    /// * `Ok(BTree)` - A new empty B-tree
    /// * `Err(BTreeError::InvalidOrder)` - If order is invalid
    pub fn new(order: usize) -> BTreeResult<Self> {
        if !is_valid_order(order) {
            return Err(BTreeError::InvalidOrder(order));
        }
        Ok(Self::with_order(order))
    }

    fn with_order(order: usize) -> Self {
        Self {
            root: 0,
            order,
            nodes: vec![Some(BNode::new(order, true))],
            free_list: Vec::new(),
            key_count: 0,
        }
    }

    /// Get the tree order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Maximum keys per node
    pub fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Minimum keys per non-root node
    pub fn min_keys(&self) -> usize {
        (self.order - 1) / 2
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Get number of keys in the tree
    pub fn len(&self) -> usize {
        self.key_count
    }

    /// Get tree height (0 for an empty tree, 1 for a single leaf)
    pub fn height(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        let mut height = 1;
        let mut current = self.root;
        while let Some(node) = self.get_node(current) {
            match node.children.first() {
                Some(&child) if !node.leaf => {
                    current = child;
                    height += 1;
                }
                _ => break,
            }
        }
        height
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Get the root node ID
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&BNode> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    /// Remove every key, keeping the order
    pub fn clear(&mut self) {
        *self = Self::with_order(self.order);
    }

    // ========== Node Management ==========

    fn node(&self, id: NodeId) -> BTreeResult<&BNode> {
        self.get_node(id).ok_or(BTreeError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> BTreeResult<&mut BNode> {
        self.nodes
            .get_mut(id)
            .and_then(|n| n.as_mut())
            .ok_or(BTreeError::NodeNotFound(id))
    }

    fn child(&self, id: NodeId, index: usize) -> BTreeResult<NodeId> {
        self.node(id)?.children.get(index).copied().ok_or_else(|| {
            BTreeError::InvalidState(format!("node {} has no child at {}", id, index))
        })
    }

    /// Allocate a new node, returning its ID
    fn allocate_node(&mut self, node: BNode) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(node));
            id
        }
    }

    /// Remove a node from storage, handing ownership to the caller
    fn take_node(&mut self, id: NodeId) -> BTreeResult<BNode> {
        let node = self
            .nodes
            .get_mut(id)
            .and_then(Option::take)
            .ok_or(BTreeError::NodeNotFound(id))?;
        self.free_list.push(id);
        Ok(node)
    }

    // ========== Search Operations ==========

    /// Check whether `key` is stored in the tree
    pub fn contains(&self, key: Key) -> bool {
        let mut current = self.root;

        while let Some(node) = self.get_node(current) {
            let idx = match node.search(key) {
                Ok(_) => return true,
                Err(_) if node.leaf => return false,
                Err(idx) => idx,
            };
            match node.children.get(idx) {
                Some(&child) => current = child,
                None => return false,
            }
        }

        false
    }

    /// Smallest key in the tree
    pub fn min(&self) -> Option<Key> {
        let mut node = self.get_node(self.root)?;
        while !node.leaf {
            node = self.get_node(*node.children.first()?)?;
        }
        node.keys.first().copied()
    }

    /// Largest key in the tree
    pub fn max(&self) -> Option<Key> {
        let mut node = self.get_node(self.root)?;
        while !node.leaf {
            node = self.get_node(*node.children.last()?)?;
        }
        node.keys.last().copied()
    }

    /// Rightmost key of the subtree rooted at `id`
    fn predecessor(&self, mut id: NodeId) -> BTreeResult<Key> {
        loop {
            let node = self.node(id)?;
            if node.leaf {
                return node
                    .keys
                    .last()
                    .copied()
                    .ok_or_else(|| BTreeError::InvalidState(format!("leaf {} is empty", id)));
            }
            id = self.child(id, node.len())?;
        }
    }

    /// Leftmost key of the subtree rooted at `id`
    fn successor(&self, mut id: NodeId) -> BTreeResult<Key> {
        loop {
            let node = self.node(id)?;
            if node.leaf {
                return node
                    .keys
                    .first()
                    .copied()
                    .ok_or_else(|| BTreeError::InvalidState(format!("leaf {} is empty", id)));
            }
            id = self.child(id, 0)?;
        }
    }

    // ========== Insert Operations ==========

    /// Insert a key into the tree
    ///
    /// A key that is already present is rejected with `DuplicateKey` and the
    /// tree is left untouched.
    pub fn insert(&mut self, key: Key) -> BTreeResult<()> {
        if self.contains(key) {
            return Err(BTreeError::DuplicateKey(key));
        }

        let root = self.root;
        if self.node(root)?.len() == self.max_keys() {
            // Grow the tree: the old root becomes the only child of a new root
            let mut new_root = BNode::new(self.order, false);
            new_root.children.push(root);
            let new_root_id = self.allocate_node(new_root);
            self.root = new_root_id;
            self.split_child(new_root_id, 0)?;
            debug!(root = new_root_id, "B-tree grew by one level");

            let i = usize::from(self.node(new_root_id)?.keys[0] < key);
            let child = self.child(new_root_id, i)?;
            self.insert_non_full(child, key)?;
        } else {
            self.insert_non_full(root, key)?;
        }

        self.key_count += 1;
        Ok(())
    }

    /// Insert into a node that is known to have room
    fn insert_non_full(&mut self, node_id: NodeId, key: Key) -> BTreeResult<()> {
        let max_keys = self.max_keys();

        let node = self.node_mut(node_id)?;
        if node.leaf {
            node.insert_key(key);
            return Ok(());
        }

        let mut i = node.insert_position(key);
        let child_id = self.child(node_id, i)?;
        if self.node(child_id)?.len() == max_keys {
            self.split_child(node_id, i)?;
            if key > self.node(node_id)?.keys[i] {
                i += 1;
            }
        }

        let child_id = self.child(node_id, i)?;
        self.insert_non_full(child_id, key)
    }

    /// Split the full child at `index` of `parent_id`
    ///
    /// The child keeps the keys before the median, a new sibling takes the
    /// keys (and children) after it, and the median moves up into the parent.
    fn split_child(&mut self, parent_id: NodeId, index: usize) -> BTreeResult<()> {
        let order = self.order;
        let max_keys = self.max_keys();
        let mid = max_keys / 2;
        let child_id = self.child(parent_id, index)?;

        let (median, sibling) = {
            let child = self.node_mut(child_id)?;
            if child.len() != max_keys {
                return Err(BTreeError::InvalidState(format!(
                    "split of node {} holding {} keys",
                    child_id,
                    child.len()
                )));
            }

            let mut sibling = BNode::new(order, child.leaf);
            sibling.keys.extend(child.keys.drain(mid + 1..));
            if !child.leaf {
                sibling.children.extend(child.children.drain(mid + 1..));
            }
            let median = child
                .keys
                .pop()
                .ok_or_else(|| BTreeError::InvalidState("split of empty node".to_string()))?;
            (median, sibling)
        };

        let sibling_id = self.allocate_node(sibling);
        let parent = self.node_mut(parent_id)?;
        parent.keys.insert(index, median);
        parent.children.insert(index + 1, sibling_id);

        debug!(
            node = child_id,
            sibling = sibling_id,
            median,
            "split full B-tree node"
        );
        Ok(())
    }

    // ========== Delete Operations ==========

    /// Delete a key from the tree
    ///
    /// Returns `EmptyTree` when there is nothing to delete and `KeyNotFound`
    /// when the key is absent. Neither leaves the tree in an invalid state.
    pub fn delete(&mut self, key: Key) -> BTreeResult<()> {
        if self.is_empty() {
            return Err(BTreeError::EmptyTree);
        }

        // Refills on the way down may empty the root even when the key
        // turns out to be absent, so the root is collapsed either way.
        let result = self.delete_from_node(self.root, key);
        self.collapse_root()?;
        result?;

        self.key_count -= 1;
        Ok(())
    }

    /// Replace an internal root that lost its last key by its only child
    fn collapse_root(&mut self) -> BTreeResult<()> {
        let root = self.node(self.root)?;
        if !root.is_empty() || root.leaf {
            return Ok(());
        }

        let new_root = self.child(self.root, 0)?;
        let old_root = self.root;
        self.take_node(old_root)?;
        self.root = new_root;
        debug!(old_root, new_root, "B-tree shrank by one level");
        Ok(())
    }

    fn delete_from_node(&mut self, node_id: NodeId, key: Key) -> BTreeResult<()> {
        let min_keys = self.min_keys();
        let node = self.node(node_id)?;
        let (idx, found) = match node.search(key) {
            Ok(idx) => (idx, true),
            Err(idx) => (idx, false),
        };

        if found {
            if node.leaf {
                self.node_mut(node_id)?.keys.remove(idx);
                return Ok(());
            }

            let left = self.child(node_id, idx)?;
            let right = self.child(node_id, idx + 1)?;

            if self.node(left)?.len() > min_keys {
                let pred = self.predecessor(left)?;
                self.node_mut(node_id)?.keys[idx] = pred;
                return self.delete_from_node(left, pred);
            }

            if self.node(right)?.len() > min_keys {
                let succ = self.successor(right)?;
                self.node_mut(node_id)?.keys[idx] = succ;
                return self.delete_from_node(right, succ);
            }

            // Both neighbours are minimal: fold the key down between them
            self.merge(node_id, idx)?;
            return self.delete_from_node(left, key);
        }

        if node.leaf {
            return Err(BTreeError::KeyNotFound(key));
        }

        let mut idx = idx;
        let child_id = self.child(node_id, idx)?;
        if self.node(child_id)?.len() <= min_keys {
            idx = self.fill(node_id, idx)?;
        }

        let child_id = self.child(node_id, idx)?;
        self.delete_from_node(child_id, key)
    }

    /// Bring the child at `idx` above the minimum before descending into it
    ///
    /// Returns the index the same key range occupies afterwards: `idx - 1`
    /// if the child was merged into its previous sibling, `idx` otherwise.
    fn fill(&mut self, node_id: NodeId, idx: usize) -> BTreeResult<usize> {
        let min_keys = self.min_keys();
        let node = self.node(node_id)?;
        let n = node.len();
        let prev = if idx > 0 {
            Some(self.child(node_id, idx - 1)?)
        } else {
            None
        };
        let next = if idx < n {
            Some(self.child(node_id, idx + 1)?)
        } else {
            None
        };

        if let Some(prev) = prev {
            if self.node(prev)?.len() > min_keys {
                self.borrow_from_prev(node_id, idx)?;
                return Ok(idx);
            }
        }

        if let Some(next) = next {
            if self.node(next)?.len() > min_keys {
                self.borrow_from_next(node_id, idx)?;
                return Ok(idx);
            }
        }

        if next.is_some() {
            self.merge(node_id, idx)?;
            Ok(idx)
        } else if prev.is_some() {
            self.merge(node_id, idx - 1)?;
            Ok(idx - 1)
        } else {
            Err(BTreeError::InvalidState(format!(
                "node {} has a single child",
                node_id
            )))
        }
    }

    /// Rotate the last key of the previous sibling up through the separator
    fn borrow_from_prev(&mut self, node_id: NodeId, idx: usize) -> BTreeResult<()> {
        let child_id = self.child(node_id, idx)?;
        let sibling_id = self.child(node_id, idx - 1)?;
        let separator = self.node(node_id)?.keys[idx - 1];

        let (lent_key, lent_child) = {
            let sibling = self.node_mut(sibling_id)?;
            let key = sibling
                .keys
                .pop()
                .ok_or_else(|| BTreeError::InvalidState(format!("node {} is empty", sibling_id)))?;
            let child = if sibling.leaf {
                None
            } else {
                sibling.children.pop()
            };
            (key, child)
        };

        let child = self.node_mut(child_id)?;
        child.keys.insert(0, separator);
        if let Some(grandchild) = lent_child {
            child.children.insert(0, grandchild);
        }

        self.node_mut(node_id)?.keys[idx - 1] = lent_key;

        debug!(node = child_id, sibling = sibling_id, "borrowed key from previous sibling");
        Ok(())
    }

    /// Rotate the first key of the next sibling up through the separator
    fn borrow_from_next(&mut self, node_id: NodeId, idx: usize) -> BTreeResult<()> {
        let child_id = self.child(node_id, idx)?;
        let sibling_id = self.child(node_id, idx + 1)?;
        let separator = self.node(node_id)?.keys[idx];

        let (lent_key, lent_child) = {
            let sibling = self.node_mut(sibling_id)?;
            if sibling.is_empty() {
                return Err(BTreeError::InvalidState(format!(
                    "node {} is empty",
                    sibling_id
                )));
            }
            let key = sibling.keys.remove(0);
            let child = if sibling.leaf || sibling.children.is_empty() {
                None
            } else {
                Some(sibling.children.remove(0))
            };
            (key, child)
        };

        let child = self.node_mut(child_id)?;
        child.keys.push(separator);
        if let Some(grandchild) = lent_child {
            child.children.push(grandchild);
        }

        self.node_mut(node_id)?.keys[idx] = lent_key;

        debug!(node = child_id, sibling = sibling_id, "borrowed key from next sibling");
        Ok(())
    }

    /// Fold child `idx + 1` and the separator `keys[idx]` into child `idx`
    ///
    /// The parent loses one key and one child; the right sibling is freed.
    fn merge(&mut self, node_id: NodeId, idx: usize) -> BTreeResult<()> {
        let left_id = self.child(node_id, idx)?;

        let (separator, right_id) = {
            let node = self.node_mut(node_id)?;
            if idx + 1 >= node.children.len() {
                return Err(BTreeError::InvalidState(format!(
                    "node {} has no child at {}",
                    node_id,
                    idx + 1
                )));
            }
            (node.keys.remove(idx), node.children.remove(idx + 1))
        };

        let right = self.take_node(right_id)?;
        let left = self.node_mut(left_id)?;
        left.keys.push(separator);
        left.keys.extend(right.keys);
        left.children.extend(right.children);

        debug!(node = left_id, freed = right_id, separator, "merged B-tree siblings");
        Ok(())
    }

    // ========== Traversal ==========

    /// Keys in the given traversal order
    ///
    /// Pre-order emits a node's keys before its subtrees, post-order after
    /// them. In-order yields the keys sorted ascending.
    pub fn traverse(&self, order: Traversal) -> Vec<Key> {
        let mut out = Vec::with_capacity(self.key_count);
        match order {
            Traversal::PreOrder => self.pre_order(self.root, &mut out),
            Traversal::InOrder => self.in_order(self.root, &mut out),
            Traversal::PostOrder => self.post_order(self.root, &mut out),
            Traversal::LevelOrder => {
                for level in self.levels() {
                    for group in level {
                        out.extend(group);
                    }
                }
            }
        }
        out
    }

    /// All keys in ascending order
    pub fn keys(&self) -> Vec<Key> {
        self.traverse(Traversal::InOrder)
    }

    fn pre_order(&self, id: NodeId, out: &mut Vec<Key>) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        out.extend_from_slice(&node.keys);
        for &child in &node.children {
            self.pre_order(child, out);
        }
    }

    fn in_order(&self, id: NodeId, out: &mut Vec<Key>) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        for (i, &key) in node.keys.iter().enumerate() {
            if let Some(&child) = node.children.get(i) {
                self.in_order(child, out);
            }
            out.push(key);
        }
        if let Some(&child) = node.children.get(node.len()) {
            self.in_order(child, out);
        }
    }

    fn post_order(&self, id: NodeId, out: &mut Vec<Key>) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        for &child in &node.children {
            self.post_order(child, out);
        }
        out.extend_from_slice(&node.keys);
    }

    /// Node key groups, one vector per depth, left to right
    pub fn levels(&self) -> Vec<Vec<Vec<Key>>> {
        let mut levels = Vec::new();
        if self.is_empty() {
            return levels;
        }

        let mut frontier = vec![self.root];
        while !frontier.is_empty() {
            let mut groups = Vec::with_capacity(frontier.len());
            let mut next = Vec::new();
            for id in frontier {
                if let Some(node) = self.get_node(id) {
                    groups.push(node.keys.clone());
                    next.extend_from_slice(&node.children);
                }
            }
            levels.push(groups);
            frontier = next;
        }
        levels
    }

    // ========== Diagnostics ==========

    /// Check every structural invariant, reporting the first violation
    pub fn validate(&self) -> BTreeResult<()> {
        let root = self.node(self.root)?;
        if root.is_empty() && !root.leaf {
            return Err(BTreeError::InvalidState(
                "internal root holds no keys".to_string(),
            ));
        }

        let mut audit = Audit::default();
        self.validate_node(self.root, None, None, 0, &mut audit)?;

        if audit.keys != self.key_count {
            return Err(BTreeError::InvalidState(format!(
                "tree reports {} keys but holds {}",
                self.key_count, audit.keys
            )));
        }
        if audit.nodes != self.node_count() {
            return Err(BTreeError::InvalidState(format!(
                "{} nodes allocated but {} reachable",
                self.node_count(),
                audit.nodes
            )));
        }
        Ok(())
    }

    fn validate_node(
        &self,
        id: NodeId,
        lower: Option<Key>,
        upper: Option<Key>,
        depth: usize,
        audit: &mut Audit,
    ) -> BTreeResult<()> {
        let node = self.node(id)?;
        audit.nodes += 1;
        audit.keys += node.len();

        if node.len() > self.max_keys() {
            return Err(BTreeError::InvalidState(format!(
                "node {} holds {} keys (max {})",
                id,
                node.len(),
                self.max_keys()
            )));
        }
        if id != self.root && node.len() < self.min_keys() {
            return Err(BTreeError::InvalidState(format!(
                "node {} holds {} keys (min {})",
                id,
                node.len(),
                self.min_keys()
            )));
        }
        if !node.keys.windows(2).all(|w| w[0] < w[1]) {
            return Err(BTreeError::InvalidState(format!(
                "node {} keys are not strictly ascending: {:?}",
                id, node.keys
            )));
        }
        let below_lower = lower.is_some_and(|lo| node.keys.first().is_some_and(|&k| k <= lo));
        let above_upper = upper.is_some_and(|hi| node.keys.last().is_some_and(|&k| k >= hi));
        if below_lower || above_upper {
            return Err(BTreeError::InvalidState(format!(
                "node {} keys {:?} escape separator range ({:?}, {:?})",
                id, node.keys, lower, upper
            )));
        }

        if node.leaf {
            if !node.children.is_empty() {
                return Err(BTreeError::InvalidState(format!(
                    "leaf {} has children",
                    id
                )));
            }
            match audit.leaf_depth {
                Some(expected) if expected != depth => {
                    return Err(BTreeError::InvalidState(format!(
                        "leaf {} at depth {} but other leaves at depth {}",
                        id, depth, expected
                    )));
                }
                Some(_) => {}
                None => audit.leaf_depth = Some(depth),
            }
            return Ok(());
        }

        if node.children.len() != node.len() + 1 {
            return Err(BTreeError::InvalidState(format!(
                "node {} has {} keys but {} children",
                id,
                node.len(),
                node.children.len()
            )));
        }

        for (i, &child) in node.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { Some(node.keys[i - 1]) };
            let hi = node.keys.get(i).copied().or(upper);
            self.validate_node(child, lo, hi, depth + 1, audit)?;
        }
        Ok(())
    }
}

/// Running totals collected by `validate`
#[derive(Debug, Default)]
struct Audit {
    leaf_depth: Option<usize>,
    keys: usize,
    nodes: usize,
}
