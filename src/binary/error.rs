use thiserror::Error;

use crate::Key;

/// Errors that can occur during binary tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinaryTreeError {
    #[error("The tree doesn't have anything to delete")]
    EmptyTree,

    #[error("Key not found: {0}")]
    KeyNotFound(Key),

    #[error("Duplicate key: {0} is already in the tree")]
    DuplicateKey(Key),

    #[error("Level {level} does not exist (tree height is {height})")]
    LevelOutOfRange { level: usize, height: usize },
}

pub type BinaryTreeResult<T> = Result<T, BinaryTreeError>;
