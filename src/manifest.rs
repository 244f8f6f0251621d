// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! JSONL manifest mapping every output file back to its source sample

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::layout::{Modality, Quality, Split};
use crate::processor::CopyRecord;
use crate::renumber::RenameRecord;
use crate::Result;

/// A single output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub split: Split,
    pub quality: Quality,
    pub modality: Modality,
    pub original_name: String,
    pub original_prefix: String,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
}

/// Result of checking a manifest against the file system
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestCheck {
    pub entries: usize,
    /// Entry counts keyed by `category/split/quality`
    pub by_group: BTreeMap<String, usize>,
    pub missing_outputs: Vec<PathBuf>,
}

impl ManifestCheck {
    pub fn is_complete(&self) -> bool {
        self.missing_outputs.is_empty()
    }
}

/// Manifest writer/reader
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Join copies with their final renamed paths. Copies that were never
    /// renamed keep their copied destination.
    pub fn build_entries(copies: &[CopyRecord], renames: &[RenameRecord]) -> Vec<ManifestEntry> {
        let final_paths: HashMap<&Path, &Path> = renames
            .iter()
            .map(|r| (r.from.as_path(), r.to.as_path()))
            .collect();
        let timestamp = Utc::now();

        copies
            .iter()
            .map(|copy| ManifestEntry {
                timestamp,
                category: copy.category.clone(),
                split: copy.split,
                quality: copy.quality,
                modality: copy.modality,
                original_name: copy
                    .source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                original_prefix: copy.prefix.to_string(),
                source_path: copy.source.clone(),
                output_path: final_paths
                    .get(copy.destination.as_path())
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| copy.destination.clone()),
            })
            .collect()
    }

    /// Write all entries, replacing any previous manifest
    pub fn write_all(&self, entries: &[ManifestEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        for entry in entries {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Read all entries
    pub fn read_all(&self) -> Result<Vec<ManifestEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse manifest entry: {}", e);
                }
            }
        }

        Ok(entries)
    }

    /// Read the manifest and verify every recorded output still exists
    pub fn check(&self) -> Result<ManifestCheck> {
        if !self.path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("manifest {:?} not found", self.path),
            )
            .into());
        }

        let entries = self.read_all()?;
        let mut check = ManifestCheck {
            entries: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            let group = format!("{}/{}/{}", entry.category, entry.split.output_name(), entry.quality);
            *check.by_group.entry(group).or_insert(0) += 1;
            if !entry.output_path.is_file() {
                check.missing_outputs.push(entry.output_path);
            }
        }

        Ok(check)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
