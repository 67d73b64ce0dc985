use crate::Key;

/// Node identifier (index into node storage)
pub type NodeId = usize;

/// Multiway B-tree node
///
/// - `keys` holds at most `order - 1` strictly increasing keys
/// - an internal node with `n` keys has exactly `n + 1` children
/// - a leaf has no children
#[derive(Debug, Clone)]
pub struct BNode {
    /// Sorted keys
    pub keys: Vec<Key>,
    /// Child node IDs (empty for leaves)
    pub children: Vec<NodeId>,
    /// Whether this node has no children
    pub leaf: bool,
}

impl BNode {
    /// Create an empty node with storage sized for a tree of the given order
    pub fn new(order: usize, leaf: bool) -> Self {
        let children = if leaf {
            Vec::new()
        } else {
            Vec::with_capacity(order)
        };
        Self {
            keys: Vec::with_capacity(order - 1),
            children,
            leaf,
        }
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if node holds no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the first key >= `key`, or `len()` if every key is smaller.
    ///
    /// This is both the slot `key` occupies when present and the child to
    /// descend into when it is not.
    pub fn find_key_index(&self, key: Key) -> usize {
        for (i, &k) in self.keys.iter().enumerate() {
            if k >= key {
                return i;
            }
        }
        self.keys.len()
    }

    /// Position of the first key > `key`; where `key` goes on insertion
    pub fn insert_position(&self, key: Key) -> usize {
        self.keys
            .iter()
            .position(|&k| k > key)
            .unwrap_or(self.keys.len())
    }

    /// Insert a key in sorted order (leaf insertion)
    pub fn insert_key(&mut self, key: Key) {
        let pos = self.insert_position(key);
        self.keys.insert(pos, key);
    }

    /// Locate `key` the way `slice::binary_search` reports it: `Ok(i)` when
    /// `keys[i] == key`, otherwise `Err(i)` with the child index to descend into
    pub fn search(&self, key: Key) -> Result<usize, usize> {
        let idx = self.find_key_index(key);
        if self.keys.get(idx) == Some(&key) {
            Ok(idx)
        } else {
            Err(idx)
        }
    }
}
