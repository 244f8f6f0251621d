// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Candyshelf

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Candyshelf operations
pub type Result<T> = std::result::Result<T, ReorgError>;

/// Fatal errors. Per-sample problems (missing or broken metadata, stray files)
/// never surface here; they fall back to defaults inside the processor.
#[derive(Error, Debug)]
pub enum ReorgError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source directory not found: {0}")]
    SourceMissing(PathBuf),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename {from:?} to {to:?}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
