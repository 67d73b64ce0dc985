//! Traversal orders shared by every tree in the crate

use std::fmt;
use std::str::FromStr;

/// Order in which a traversal visits keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Node first, then its subtrees left to right
    PreOrder,
    /// Left subtrees, node, right subtrees (sorted order for search trees)
    #[default]
    InOrder,
    /// Subtrees left to right, node last
    PostOrder,
    /// Breadth-first, one depth at a time
    LevelOrder,
}

impl Traversal {
    pub const ALL: [Traversal; 4] = [
        Traversal::PreOrder,
        Traversal::InOrder,
        Traversal::PostOrder,
        Traversal::LevelOrder,
    ];
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Traversal::PreOrder => "pre-order",
            Traversal::InOrder => "in-order",
            Traversal::PostOrder => "post-order",
            Traversal::LevelOrder => "level-order",
        };
        f.write_str(name)
    }
}

impl FromStr for Traversal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre" | "preorder" | "pre-order" => Ok(Traversal::PreOrder),
            "in" | "inorder" | "in-order" => Ok(Traversal::InOrder),
            "post" | "postorder" | "post-order" => Ok(Traversal::PostOrder),
            "level" | "levelorder" | "level-order" => Ok(Traversal::LevelOrder),
            other => Err(format!("unknown traversal: {}", other)),
        }
    }
}

/// Join keys with single spaces, the way the shell prints sequences
pub fn format_keys(keys: &[crate::Key]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
