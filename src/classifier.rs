// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Discovery of category / split data directories in the source tree

use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::layout::Split;
use crate::{ReorgError, Result};

/// A present `<category>/<split>/<data>` directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitDir {
    /// Category name for logs and reports (lossy for non-UTF-8 names)
    pub category: String,
    /// Category directory name exactly as found in the source tree
    #[serde(skip)]
    pub category_dir: OsString,
    pub split: Split,
    pub path: PathBuf,
}

/// A category/split combination with nothing to process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSplit {
    pub category: String,
    pub split: Option<Split>,
    pub reason: String,
}

/// One category and its present split directories
#[derive(Debug, Clone)]
pub struct CategoryDirs {
    pub name: String,
    pub dir_name: OsString,
    pub jobs: Vec<SplitDir>,
}

/// All categories found under the source root, with their splits
#[derive(Debug, Default)]
pub struct Discovery {
    pub categories: Vec<CategoryDirs>,
    pub skipped: Vec<SkippedSplit>,
}

impl Discovery {
    pub fn jobs(&self) -> impl Iterator<Item = &SplitDir> + '_ {
        self.categories.iter().flat_map(|c| c.jobs.iter())
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }
}

/// List category subdirectories of `source`, sorted by name.
/// Names are kept as found; non-UTF-8 names are not dropped.
pub fn list_categories(source: &Path) -> Result<Vec<OsString>> {
    if !source.is_dir() {
        return Err(ReorgError::SourceMissing(source.to_path_buf()));
    }

    let mut categories = Vec::new();
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        if entry.path().is_dir() {
            categories.push(entry.file_name());
        }
    }
    categories.sort();

    Ok(categories)
}

/// Walk the fixed split layout of every category. Missing splits are
/// recorded, not treated as errors.
pub fn discover(source: &Path, data_dir: &str, only: &[String]) -> Result<Discovery> {
    let mut discovery = Discovery::default();
    let found = list_categories(source)?;

    for wanted in only {
        if !found.iter().any(|dir| dir.to_str() == Some(wanted.as_str())) {
            info!("Category '{}' not found in {:?}", wanted, source);
            discovery.skipped.push(SkippedSplit {
                category: wanted.clone(),
                split: None,
                reason: "category not found".to_string(),
            });
        }
    }

    for dir_name in found {
        let name = dir_name.to_string_lossy().into_owned();
        if !only.is_empty() && dir_name.to_str().map_or(true, |n| !only.iter().any(|w| w == n)) {
            continue;
        }
        if dir_name.to_str().is_none() {
            warn!("Category directory {:?} is not valid UTF-8; reported as '{}'", dir_name, name);
        }

        let mut category = CategoryDirs {
            name: name.clone(),
            dir_name: dir_name.clone(),
            jobs: Vec::new(),
        };

        for split in Split::ALL {
            let path = source.join(&dir_name).join(split.dir_name()).join(data_dir);
            if path.is_dir() {
                category.jobs.push(SplitDir {
                    category: name.clone(),
                    category_dir: dir_name.clone(),
                    split,
                    path,
                });
            } else {
                info!("{}/{}: path does not exist, skipping", name, split);
                discovery.skipped.push(SkippedSplit {
                    category: name.clone(),
                    split: Some(split),
                    reason: format!("{:?} does not exist", path),
                });
            }
        }

        discovery.categories.push(category);
    }

    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_sorted_with_skips() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("candy2/train/data")).unwrap();
        fs::create_dir_all(root.path().join("candy1/test_public/data")).unwrap();
        fs::create_dir_all(root.path().join("candy1/val")).unwrap();
        fs::write(root.path().join("README.txt"), "not a category").unwrap();

        let discovery = discover(root.path(), "data", &[]).unwrap();
        assert_eq!(discovery.names(), vec!["candy1", "candy2"]);

        let jobs: Vec<_> = discovery
            .jobs()
            .map(|j| (j.category.as_str(), j.split))
            .collect();
        assert_eq!(jobs, vec![("candy1", Split::TestPublic), ("candy2", Split::Train)]);

        // candy1: train + val missing, candy2: test_public + val missing
        assert_eq!(discovery.skipped.len(), 4);
        assert_eq!(discovery.categories[0].jobs.len(), 1);
    }

    #[test]
    fn test_discover_category_filter() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("a/train/data")).unwrap();
        fs::create_dir_all(root.path().join("b/train/data")).unwrap();

        let only = vec!["b".to_string(), "zzz".to_string()];
        let discovery = discover(root.path(), "data", &only).unwrap();
        assert_eq!(discovery.names(), vec!["b"]);
        assert!(discovery
            .skipped
            .iter()
            .any(|s| s.category == "zzz" && s.split.is_none()));
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let root = TempDir::new().unwrap();
        let result = discover(&root.path().join("nope"), "data", &[]);
        assert!(matches!(result, Err(ReorgError::SourceMissing(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_category_is_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"candy\xff");
        fs::create_dir_all(root.path().join(raw).join("train/data")).unwrap();

        let discovery = discover(root.path(), "data", &[]).unwrap();
        assert_eq!(discovery.categories.len(), 1);
        assert_eq!(discovery.categories[0].dir_name.as_os_str(), raw);
        assert_eq!(discovery.categories[0].name, "candy\u{fffd}");

        let job = discovery.jobs().next().unwrap();
        assert_eq!(job.category_dir.as_os_str(), raw);
        assert_eq!(job.path, root.path().join(raw).join("train/data"));
    }
}
