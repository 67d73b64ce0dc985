use thiserror::Error;

use super::node::NodeId;
use crate::Key;

/// Errors that can occur during B-tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BTreeError {
    #[error("The tree is empty, there is nothing to delete")]
    EmptyTree,

    #[error("Key not found: {0}")]
    KeyNotFound(Key),

    #[error("Duplicate key: {0}")]
    DuplicateKey(Key),

    #[error("Invalid order: {0} (must be an even number >= 4)")]
    InvalidOrder(usize),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid tree state: {0}")]
    InvalidState(String),
}

pub type BTreeResult<T> = Result<T, BTreeError>;
