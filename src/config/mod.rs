// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Candyshelf

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ReorgError;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReorgConfig {
    /// Root of the original dataset (one subdirectory per category)
    pub source_dir: PathBuf,

    /// Root of the reorganized output. Deleted and recreated on every run.
    pub target_dir: PathBuf,

    /// Source/target layout details
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Restrict processing to these categories (empty = all)
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Folder holding the sample files inside each split
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Extension of the metadata sidecars
    #[serde(default = "default_metadata_extension")]
    pub metadata_extension: String,

    /// Digits used for renumbered file names
    #[serde(default = "default_index_width")]
    pub index_width: usize,
}

// Default value functions
fn default_source_dir() -> PathBuf { PathBuf::from("dataset-eyecandies") }
fn default_target_dir() -> PathBuf { PathBuf::from("eyecandies") }
fn default_data_dir() -> String { "data".to_string() }
fn default_metadata_extension() -> String { "yaml".to_string() }
fn default_index_width() -> usize { 3 }

impl Default for ReorgConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            target_dir: default_target_dir(),
            layout: LayoutConfig::default(),
            categories: Vec::new(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            metadata_extension: default_metadata_extension(),
            index_width: default_index_width(),
        }
    }
}

impl ReorgConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| ReorgError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply command-line / environment overrides
    pub fn with_roots(mut self, source: Option<PathBuf>, target: Option<PathBuf>) -> Self {
        if let Some(source) = source {
            self.source_dir = source;
        }
        if let Some(target) = target {
            self.target_dir = target;
        }
        self
    }

    /// Check the configuration before any file system state is touched
    pub fn validate(&self) -> crate::Result<()> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(ReorgError::Config("source_dir is empty".to_string()));
        }
        if self.target_dir.as_os_str().is_empty() {
            return Err(ReorgError::Config("target_dir is empty".to_string()));
        }
        if self.layout.data_dir.is_empty() {
            return Err(ReorgError::Config("layout.data_dir is empty".to_string()));
        }
        if self.layout.metadata_extension.is_empty() {
            return Err(ReorgError::Config("layout.metadata_extension is empty".to_string()));
        }
        if self.layout.index_width == 0 {
            return Err(ReorgError::Config("layout.index_width must be at least 1".to_string()));
        }

        // The target is wiped at start; it must not hold the input.
        let source = absolute(&self.source_dir);
        let target = absolute(&self.target_dir);
        if source.starts_with(&target) {
            return Err(ReorgError::Config(format!(
                "target_dir {:?} contains source_dir {:?}; clearing it would destroy the input",
                self.target_dir, self.source_dir
            )));
        }

        Ok(())
    }
}

/// Canonical path when it exists, otherwise joined onto the working directory
fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ReorgConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.layout, LayoutConfig::default());
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_save_and_load_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candyshelf.json");
        std::fs::write(&path, r#"{"source_dir": "/in", "target_dir": "/out"}"#).unwrap();

        let config = ReorgConfig::load(&path).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/in"));
        assert_eq!(config.layout.index_width, 3);
        assert_eq!(config.layout.data_dir, "data");

        config.save(&path).unwrap();
        let reloaded = ReorgConfig::load(&path).unwrap();
        assert_eq!(reloaded.target_dir, PathBuf::from("/out"));
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ source_dir: ").unwrap();
        assert!(matches!(ReorgConfig::load(&path), Err(ReorgError::Config(_))));
    }

    #[test]
    fn test_validate_overlap() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in");
        std::fs::create_dir(&source).unwrap();

        let ok = ReorgConfig::default().with_roots(Some(source.clone()), Some(dir.path().join("out")));
        assert!(ok.validate().is_ok());

        let wipes_source = ReorgConfig::default().with_roots(Some(source.clone()), Some(dir.path().to_path_buf()));
        assert!(matches!(wipes_source.validate(), Err(ReorgError::Config(_))));

        let same = ReorgConfig::default().with_roots(Some(source.clone()), Some(source));
        assert!(same.validate().is_err());
    }

    #[test]
    fn test_validate_layout() {
        let mut config = ReorgConfig::default().with_roots(Some("/in".into()), Some("/out".into()));
        config.layout.index_width = 0;
        assert!(config.validate().is_err());
    }
}
