//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How to open the inventory database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    pub foreign_keys: bool,
    /// Write-ahead logging, only applied to file databases.
    pub wal: bool,
    /// Create missing tables on open.
    pub create_schema: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: true,
            wal: true,
            create_schema: true,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn without_schema(mut self) -> Self {
        self.create_schema = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_integrity_and_schema() {
        let config = StoreConfig::default();
        assert!(config.path.is_none());
        assert!(config.foreign_keys);
        assert!(config.create_schema);
    }

    #[test]
    fn test_partial_document_falls_back_to_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{ "path": "inventory.db", "wal": false }"#).unwrap();
        assert_eq!(config.path, Some(PathBuf::from("inventory.db")));
        assert!(!config.wal);
        assert!(config.foreign_keys);
    }
}
