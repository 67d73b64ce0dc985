use thiserror::Error;

use crate::Key;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NAryTreeError {
    #[error("The tree is empty")]
    EmptyTree,

    #[error("Key not found: {0}")]
    KeyNotFound(Key),

    #[error("Duplicate key: {0} is already in the tree")]
    DuplicateKey(Key),

    #[error("Parent not found: {0}")]
    ParentNotFound(Key),

    #[error("Level {level} does not exist (tree height is {height})")]
    LevelOutOfRange { level: usize, height: usize },
}

pub type NAryTreeResult<T> = Result<T, NAryTreeError>;
