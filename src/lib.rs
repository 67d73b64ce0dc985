pub mod binary;
pub mod btree;
pub mod config;
pub mod nary;
pub mod shell;
pub mod traversal;

/// Key type stored by every tree in the crate
pub type Key = i64;

pub use binary::{AvlTree, BinaryNode, BinarySearchTree, BinaryTree, BinaryTreeError, BinaryTreeResult};
pub use btree::{BNode, BTree, BTreeError, BTreeResult, DEFAULT_ORDER, NodeId};
pub use config::{ConfigError, ConfigResult, ShellConfig, TreeKind};
pub use nary::{NAryNode, NAryTree, NAryTreeError, NAryTreeResult};
pub use shell::{Command, Reply, Session, ShellError};
pub use traversal::Traversal;
