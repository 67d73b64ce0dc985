use prettytable::{Table, row};
use thiserror::Error;
use tracing::{debug, info};

use super::command::{self, Command, HELP};
use crate::Key;
use crate::binary::{AvlTree, BinarySearchTree, BinaryTreeError};
use crate::btree::{BTree, BTreeError};
use crate::config::{ConfigError, ShellConfig, TreeKind};
use crate::traversal::{Traversal, format_keys};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    BTree(#[from] BTreeError),

    #[error(transparent)]
    BinaryTree(#[from] BinaryTreeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

pub type ShellResult<T> = Result<T, ShellError>;

/// What the shell should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Silent,
    Quit,
}

/// The tree a session is working on
#[derive(Debug, Clone)]
pub enum ActiveTree {
    BTree(BTree),
    Bst(BinarySearchTree),
    Avl(AvlTree),
}

impl ActiveTree {
    pub fn build(kind: TreeKind, order: usize) -> ShellResult<Self> {
        let tree = match kind {
            TreeKind::BTree => ActiveTree::BTree(BTree::new(order)?),
            TreeKind::Bst => ActiveTree::Bst(BinarySearchTree::new()),
            TreeKind::Avl => ActiveTree::Avl(AvlTree::new()),
        };
        Ok(tree)
    }

    pub fn kind(&self) -> TreeKind {
        match self {
            ActiveTree::BTree(_) => TreeKind::BTree,
            ActiveTree::Bst(_) => TreeKind::Bst,
            ActiveTree::Avl(_) => TreeKind::Avl,
        }
    }

    pub fn insert(&mut self, key: Key) -> ShellResult<()> {
        match self {
            ActiveTree::BTree(tree) => tree.insert(key)?,
            ActiveTree::Bst(tree) => tree.insert(key)?,
            ActiveTree::Avl(tree) => tree.insert(key)?,
        }
        Ok(())
    }

    pub fn delete(&mut self, key: Key) -> ShellResult<()> {
        match self {
            ActiveTree::BTree(tree) => tree.delete(key)?,
            ActiveTree::Bst(tree) => tree.delete(key)?,
            ActiveTree::Avl(tree) => tree.delete(key)?,
        }
        Ok(())
    }

    pub fn contains(&self, key: Key) -> bool {
        match self {
            ActiveTree::BTree(tree) => tree.contains(key),
            ActiveTree::Bst(tree) => tree.contains(key),
            ActiveTree::Avl(tree) => tree.contains(key),
        }
    }

    pub fn traverse(&self, order: Traversal) -> Vec<Key> {
        match self {
            ActiveTree::BTree(tree) => tree.traverse(order),
            ActiveTree::Bst(tree) => tree.traverse(order),
            ActiveTree::Avl(tree) => tree.traverse(order),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ActiveTree::BTree(tree) => tree.len(),
            ActiveTree::Bst(tree) => tree.len(),
            ActiveTree::Avl(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn height(&self) -> usize {
        match self {
            ActiveTree::BTree(tree) => tree.height(),
            ActiveTree::Bst(tree) => tree.height(),
            ActiveTree::Avl(tree) => tree.height(),
        }
    }

    pub fn min(&self) -> Option<Key> {
        match self {
            ActiveTree::BTree(tree) => tree.min(),
            ActiveTree::Bst(tree) => tree.min(),
            ActiveTree::Avl(tree) => tree.min(),
        }
    }

    pub fn max(&self) -> Option<Key> {
        match self {
            ActiveTree::BTree(tree) => tree.max(),
            ActiveTree::Bst(tree) => tree.max(),
            ActiveTree::Avl(tree) => tree.max(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            ActiveTree::BTree(tree) => tree.clear(),
            ActiveTree::Bst(tree) => tree.clear(),
            ActiveTree::Avl(tree) => tree.clear(),
        }
    }

    /// One line per depth; B-tree nodes are bracketed
    fn render(&self) -> String {
        let lines: Vec<String> = match self {
            ActiveTree::BTree(tree) => tree
                .levels()
                .iter()
                .map(|level| {
                    level
                        .iter()
                        .map(|keys| format!("[{}]", format_keys(keys)))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect(),
            ActiveTree::Bst(tree) => tree.as_tree().levels().iter().map(|l| format_keys(l)).collect(),
            ActiveTree::Avl(tree) => tree.as_tree().levels().iter().map(|l| format_keys(l)).collect(),
        };
        lines
            .iter()
            .enumerate()
            .map(|(depth, line)| format!("level {}: {}", depth, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Structural invariants, as a problem description when violated
    fn check(&self) -> Option<String> {
        match self {
            ActiveTree::BTree(tree) => tree.validate().err().map(|e| e.to_string()),
            ActiveTree::Bst(tree) => (!tree.as_tree().is_bst()).then(|| "keys out of order".to_string()),
            ActiveTree::Avl(tree) => {
                let shape = tree.as_tree();
                if !shape.is_bst() {
                    Some("keys out of order".to_string())
                } else if !shape.is_balanced() {
                    Some("subtree heights differ by more than one".to_string())
                } else {
                    None
                }
            }
        }
    }

    fn stats(&self) -> Table {
        let show = |key: Option<Key>| key.map_or_else(|| "-".to_string(), |k| k.to_string());

        let mut table = Table::new();
        table.set_titles(row!["property", "value"]);
        table.add_row(row!["tree", self.kind()]);
        table.add_row(row!["keys", self.len()]);
        table.add_row(row!["height", self.height()]);
        table.add_row(row!["min", show(self.min())]);
        table.add_row(row!["max", show(self.max())]);
        match self {
            ActiveTree::BTree(tree) => {
                table.add_row(row!["order", tree.order()]);
                table.add_row(row!["nodes", tree.node_count()]);
                table.add_row(row!["keys per node", format!("{}..={}", tree.min_keys(), tree.max_keys())]);
            }
            ActiveTree::Bst(tree) => {
                table.add_row(row!["balanced", tree.as_tree().is_balanced()]);
            }
            ActiveTree::Avl(tree) => {
                table.add_row(row!["balanced", tree.as_tree().is_balanced()]);
            }
        }
        table
    }
}

/// A shell session: one active tree plus the settings it was built from
pub struct Session {
    tree: ActiveTree,
    config: ShellConfig,
}

impl Session {
    pub fn new(config: ShellConfig) -> ShellResult<Self> {
        let tree = ActiveTree::build(config.tree, config.order)?;
        info!(tree = %config.tree, order = config.order, "session started");
        Ok(Self { tree, config })
    }

    pub fn tree(&self) -> &ActiveTree {
        &self.tree
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Parse and execute one line of input
    pub fn run_line(&mut self, line: &str) -> ShellResult<Reply> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Reply::Silent);
        }
        let command = command::parse(line).map_err(ShellError::Parse)?;
        debug!(?command, "executing");
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> ShellResult<Reply> {
        let output = match command {
            Command::Insert(keys) => self.apply(&keys, "inserted", ActiveTree::insert),
            Command::Delete(keys) => self.apply(&keys, "deleted", ActiveTree::delete),
            Command::Find(key) => {
                if self.tree.contains(key) {
                    format!("{} found", key)
                } else {
                    format!("{} not found", key)
                }
            }
            Command::Print(order) => {
                format!("{}: {}", order, format_keys(&self.tree.traverse(order)))
            }
            Command::Show => {
                if self.tree.is_empty() {
                    "(empty tree)".to_string()
                } else {
                    self.tree.render()
                }
            }
            Command::Stats => self.tree.stats().to_string(),
            Command::Check => match self.tree.check() {
                None => "ok".to_string(),
                Some(problem) => format!("invalid: {}", problem),
            },
            Command::New(kind, order) => {
                let order = order.unwrap_or(self.config.order);
                self.tree = ActiveTree::build(kind, order)?;
                info!(tree = %kind, "replaced active tree");
                match kind {
                    TreeKind::BTree => format!("new btree of order {}", order),
                    _ => format!("new {}", kind),
                }
            }
            Command::Clear => {
                self.tree.clear();
                "cleared".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Output(output))
    }

    /// Run `op` for every key; failures are reported per key and do not
    /// stop the rest of the batch
    fn apply(
        &mut self,
        keys: &[Key],
        verb: &str,
        op: fn(&mut ActiveTree, Key) -> ShellResult<()>,
    ) -> String {
        let mut lines = Vec::new();
        let mut done = 0;
        for &key in keys {
            match op(&mut self.tree, key) {
                Ok(()) => done += 1,
                Err(e) => lines.push(e.to_string()),
            }
        }
        lines.push(format!("{} {} of {} key(s)", verb, done, keys.len()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(kind: TreeKind) -> Session {
        Session::new(ShellConfig {
            tree: kind,
            ..ShellConfig::default()
        })
        .unwrap()
    }

    fn output(session: &mut Session, line: &str) -> String {
        match session.run_line(line).unwrap() {
            Reply::Output(text) => text,
            other => panic!("expected output for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_insert_and_print() {
        let mut session = session(TreeKind::BTree);
        assert_eq!(
            output(&mut session, "insert 10 20 5 6 12 30 7 17"),
            "inserted 8 of 8 key(s)"
        );
        assert_eq!(output(&mut session, "print"), "in-order: 5 6 7 10 12 17 20 30");
        assert_eq!(
            output(&mut session, "show"),
            "level 0: [10 20]\nlevel 1: [5 6 7] [12 17] [30]"
        );
        assert_eq!(output(&mut session, "check"), "ok");
    }

    #[test]
    fn test_batch_reports_each_failure() {
        let mut session = session(TreeKind::Bst);
        output(&mut session, "insert 2 1 3");

        let text = output(&mut session, "delete 1 9 3");
        assert_eq!(text, "Key not found: 9\ndeleted 2 of 3 key(s)");
        assert_eq!(output(&mut session, "print pre"), "pre-order: 2");

        let text = output(&mut session, "add 2 4");
        assert_eq!(text, "Duplicate key: 2 is already in the tree\ninserted 1 of 2 key(s)");
    }

    #[test]
    fn test_find() {
        let mut session = session(TreeKind::Avl);
        output(&mut session, "insert 1 2 3");
        assert_eq!(output(&mut session, "find 2"), "2 found");
        assert_eq!(output(&mut session, "find 4"), "4 not found");
        assert_eq!(output(&mut session, "show"), "level 0: 2\nlevel 1: 1 3");
    }

    #[test]
    fn test_new_tree() {
        let mut session = session(TreeKind::BTree);
        output(&mut session, "insert 1 2 3");

        assert_eq!(output(&mut session, "new avl"), "new avl");
        assert_eq!(session.tree().kind(), TreeKind::Avl);
        assert!(session.tree().is_empty());

        assert_eq!(output(&mut session, "new btree 6"), "new btree of order 6");
        assert!(matches!(
            session.run_line("new btree 5"),
            Err(ShellError::BTree(BTreeError::InvalidOrder(5)))
        ));
        // a rejected order keeps the previous tree
        assert_eq!(session.tree().kind(), TreeKind::BTree);
    }

    #[test]
    fn test_stats_table() {
        let mut session = session(TreeKind::BTree);
        output(&mut session, "insert 1 2 3 4");

        let text = output(&mut session, "stats");
        assert!(text.contains("order"));
        assert!(text.contains("btree"));
        assert!(text.contains("1..=3"));
    }

    #[test]
    fn test_clear_and_empty_output() {
        let mut session = session(TreeKind::BTree);
        output(&mut session, "insert 4 5");
        assert_eq!(output(&mut session, "clear"), "cleared");
        assert_eq!(output(&mut session, "show"), "(empty tree)");
        assert_eq!(output(&mut session, "print level"), "level-order: ");
    }

    #[test]
    fn test_control_lines() {
        let mut session = session(TreeKind::Bst);
        assert_eq!(session.run_line("   ").unwrap(), Reply::Silent);
        assert_eq!(session.run_line("quit").unwrap(), Reply::Quit);
        assert!(matches!(session.run_line("plant 4"), Err(ShellError::Parse(_))));
        assert!(output(&mut session, "help").contains("new btree [order]"));
    }

    #[test]
    fn test_invalid_config_order() {
        let config = ShellConfig {
            order: 3,
            ..ShellConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(ShellError::BTree(BTreeError::InvalidOrder(3)))
        ));
    }
}
