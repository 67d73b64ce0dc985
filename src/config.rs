use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::btree::{DEFAULT_ORDER, is_valid_order};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid order: {0} (must be an even number >= 4)")]
    InvalidOrder(usize),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Kind of tree a shell session starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    #[default]
    #[value(name = "btree")]
    BTree,
    Bst,
    Avl,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeKind::BTree => "btree",
            TreeKind::Bst => "bst",
            TreeKind::Avl => "avl",
        };
        f.write_str(name)
    }
}

/// Shell settings, stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub tree: TreeKind,
    pub order: usize,
    pub prompt: String,
    pub history_file: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            tree: TreeKind::BTree,
            order: DEFAULT_ORDER,
            prompt: "arbor> ".to_string(),
            history_file: None,
        }
    }
}

impl ShellConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(&self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !is_valid_order(self.order) {
            return Err(ConfigError::InvalidOrder(self.order));
        }
        Ok(())
    }
}
