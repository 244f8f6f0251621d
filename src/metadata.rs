// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Per-sample metadata sidecars and quality-label resolution

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::layout::{Quality, SamplePrefix, Split};

/// Recognized fields of a `<prefix>_metadata.yaml` document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleMetadata {
    /// Raw `anomalous` value, if the key is present
    pub anomalous: Option<Value>,
}

impl SampleMetadata {
    /// Parse a sidecar document. Only mappings are accepted.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let doc: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        let map = doc
            .as_mapping()
            .ok_or_else(|| "metadata document is not a mapping".to_string())?;

        Ok(Self {
            anomalous: map.get("anomalous").cloned(),
        })
    }

    /// True when `anomalous` equals 1 (`1`, `1.0` or `true`). A missing key counts as 0.
    pub fn is_anomalous(&self) -> bool {
        match &self.anomalous {
            Some(Value::Number(n)) => {
                n.as_i64() == Some(1) || n.as_u64() == Some(1) || n.as_f64() == Some(1.0)
            }
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }
}

/// Outcome of looking up a sidecar. Kept explicit so callers can tell
/// a missing file from a broken one even though both resolve to `good`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataLookup {
    Absent,
    Unreadable(String),
    Malformed(String),
    Parsed(SampleMetadata),
}

impl MetadataLookup {
    /// Quality implied by this lookup; only a parsed, anomalous record yields `bad`
    pub fn quality(&self) -> Quality {
        match self {
            MetadataLookup::Parsed(meta) if meta.is_anomalous() => Quality::Bad,
            _ => Quality::Good,
        }
    }
}

/// `<dir>/<prefix>_metadata.<ext>`
pub fn sidecar_path(dir: &Path, prefix: &SamplePrefix, extension: &str) -> PathBuf {
    dir.join(format!("{}_metadata.{}", prefix, extension))
}

/// Read and parse the sidecar for `prefix`. Never fails.
pub fn lookup(dir: &Path, prefix: &SamplePrefix, extension: &str) -> MetadataLookup {
    let path = sidecar_path(dir, prefix, extension);
    if !path.exists() {
        return MetadataLookup::Absent;
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Unreadable metadata {:?}: {}", path, e);
            return MetadataLookup::Unreadable(e.to_string());
        }
    };

    match SampleMetadata::parse(&content) {
        Ok(meta) => MetadataLookup::Parsed(meta),
        Err(e) => {
            warn!("Malformed metadata {:?}: {}", path, e);
            MetadataLookup::Malformed(e)
        }
    }
}

/// Resolve the quality label for one sample. Returns the lookup outcome
/// alongside, or `None` when the split carries no metadata.
pub fn resolve_quality(
    split: Split,
    dir: &Path,
    prefix: &SamplePrefix,
    extension: &str,
) -> (Quality, Option<MetadataLookup>) {
    if !split.is_labeled() {
        return (Quality::Good, None);
    }

    let outcome = lookup(dir, prefix, extension);
    let quality = outcome.quality();
    debug!("Sample {} in {:?}: {}", prefix, dir, quality);
    (quality, Some(outcome))
}
