// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Dense renumbering of output directories (`000.png`, `001.png`, ...)

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::layout::{renumbered_name, SampleFile, SamplePrefix};
use crate::{ReorgError, Result};

/// A file moved to its final name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameRecord {
    pub from: PathBuf,
    pub to: PathBuf,
    pub prefix: SamplePrefix,
    pub index: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenumberReport {
    pub directories: usize,
    pub renames: Vec<RenameRecord>,
}

/// Group sample file names by prefix and assign dense indices in numeric prefix order
pub fn assign_indices<'a, I>(names: I) -> Vec<(usize, SamplePrefix, Vec<String>)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: BTreeMap<SamplePrefix, Vec<String>> = BTreeMap::new();
    for name in names {
        if let Some(sample) = SampleFile::classify(name) {
            groups.entry(sample.prefix).or_default().push(sample.file_name);
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(index, (prefix, files))| (index, prefix, files))
        .collect()
}

/// Rename the matched sample files of one directory. Directories without
/// matches are left untouched.
pub fn renumber_dir(dir: &Path, width: usize) -> Result<Vec<RenameRecord>> {
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        // Non-UTF-8 names cannot match the ASCII sample patterns
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    let mut renames = Vec::new();
    for (index, prefix, files) in assign_indices(names.iter().map(String::as_str)) {
        let new_name = renumbered_name(index, width);
        for old_name in files {
            let from = dir.join(&old_name);
            let to = dir.join(&new_name);
            // Same directory, so the rename is atomic. New names carry no
            // underscore and cannot collide with a pending old name.
            fs::rename(&from, &to).map_err(|source| ReorgError::Rename {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            renames.push(RenameRecord {
                from,
                to,
                prefix: prefix.clone(),
                index,
            });
        }
    }

    Ok(renames)
}

/// Renumber every directory below `root`
pub fn renumber_tree(root: &Path, width: usize) -> Result<RenumberReport> {
    info!("Renumbering files in {:?}", root);
    let mut report = RenumberReport::default();

    let dirs: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect();

    for dir in dirs {
        let renames = renumber_dir(&dir, width)?;
        if renames.is_empty() {
            continue;
        }
        debug!("{:?}: {} files renumbered", dir, renames.len());
        report.directories += 1;
        report.renames.extend(renames);
    }

    Ok(report)
}
