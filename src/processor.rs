// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Copying of classified sample files into the category/split/quality tree

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, FileTimes};
#[cfg(not(unix))]
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::classifier::SplitDir;
use crate::config::LayoutConfig;
use crate::layout::{destination_dir, Modality, Quality, SampleFile, SamplePrefix, Split};
use crate::metadata::{resolve_quality, MetadataLookup};
use crate::{ReorgError, Result};

/// One sample file and where it goes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyRecord {
    pub category: String,
    pub split: Split,
    pub quality: Quality,
    pub modality: Modality,
    pub prefix: SamplePrefix,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Counters for a processed (or planned) split directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitReport {
    pub copies: Vec<CopyRecord>,
    pub ignored: Vec<String>,
    pub metadata_absent: usize,
    pub metadata_unreadable: usize,
    pub metadata_malformed: usize,
}

impl SplitReport {
    pub fn count(&self, quality: Quality) -> usize {
        self.copies.iter().filter(|c| c.quality == quality).count()
    }

    pub fn by_modality(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for copy in &self.copies {
            *counts.entry(copy.modality.folder()).or_insert(0) += 1;
        }
        counts
    }

    fn note_lookup(&mut self, outcome: &Option<MetadataLookup>) {
        match outcome {
            Some(MetadataLookup::Absent) => self.metadata_absent += 1,
            Some(MetadataLookup::Unreadable(_)) => self.metadata_unreadable += 1,
            Some(MetadataLookup::Malformed(_)) => self.metadata_malformed += 1,
            Some(MetadataLookup::Parsed(_)) | None => {}
        }
    }
}

/// Classify a split directory and resolve destinations without touching the target
pub fn plan_split(job: &SplitDir, target: &Path, layout: &LayoutConfig) -> Result<SplitReport> {
    let mut report = SplitReport::default();
    let metadata_suffix = format!(".{}", layout.metadata_extension);

    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(&job.path)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if name.ends_with(&metadata_suffix) => {}
            Ok(name) => names.push(name),
            // Sample patterns are ASCII, so a non-UTF-8 name can never match
            Err(raw) => report.ignored.push(raw.to_string_lossy().into_owned()),
        }
    }
    names.sort();

    for name in names {
        let Some(sample) = SampleFile::classify(&name) else {
            trace!("Ignoring {:?} in {:?}", name, job.path);
            report.ignored.push(name);
            continue;
        };

        let (quality, outcome) = resolve_quality(
            job.split,
            &job.path,
            &sample.prefix,
            &layout.metadata_extension,
        );
        report.note_lookup(&outcome);

        let dest_dir = destination_dir(target, &job.category_dir, job.split, quality, sample.modality);
        report.copies.push(CopyRecord {
            category: job.category.clone(),
            split: job.split,
            quality,
            modality: sample.modality,
            prefix: sample.prefix,
            source: job.path.join(&name),
            destination: dest_dir.join(&name),
        });
    }

    Ok(report)
}

/// Copy every matched file of a split directory into the target tree
pub fn process_split(job: &SplitDir, target: &Path, layout: &LayoutConfig) -> Result<SplitReport> {
    let report = plan_split(job, target, layout)?;

    for copy in &report.copies {
        copy_preserving(&copy.source, &copy.destination)?;
    }

    debug!(
        "{}/{}: {} copied {:?} ({} good, {} bad), {} ignored",
        job.category,
        job.split,
        report.copies.len(),
        report.by_modality(),
        report.count(Quality::Good),
        report.count(Quality::Bad),
        report.ignored.len()
    );

    Ok(report)
}

/// Byte copy that also carries over access/modification times.
/// Creates the destination directory and overwrites an existing file.
pub fn copy_preserving(from: &Path, to: &Path) -> Result<()> {
    let copy_err = |source: std::io::Error| ReorgError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    fs::copy(from, to).map_err(copy_err)?;

    let meta = fs::metadata(from).map_err(copy_err)?;
    let mut times = FileTimes::new().set_modified(meta.modified().map_err(copy_err)?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    // Read-only copies (permissions are carried over) still accept new times on unix
    #[cfg(unix)]
    let dest = fs::File::open(to);
    #[cfg(not(unix))]
    let dest = OpenOptions::new().write(true).open(to);
    dest.and_then(|file| file.set_times(times)).map_err(copy_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn job(dir: &Path, split: Split) -> SplitDir {
        SplitDir {
            category: "candy1".to_string(),
            category_dir: "candy1".into(),
            split,
            path: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_plan_classifies_and_labels() {
        let src = TempDir::new().unwrap();
        for name in ["7_image_5.png", "7_depth.png", "8_mask.png", "3_other.png", "notes.txt"] {
            fs::write(src.path().join(name), name).unwrap();
        }
        fs::write(src.path().join("7_metadata.yaml"), "anomalous: 1").unwrap();
        fs::write(src.path().join("8_metadata.yaml"), "anomalous: 0").unwrap();

        let report = plan_split(&job(src.path(), Split::TestPublic), Path::new("/out"), &LayoutConfig::default()).unwrap();

        assert_eq!(report.copies.len(), 3);
        assert_eq!(report.ignored, vec!["3_other.png", "notes.txt"]);
        assert_eq!(report.count(Quality::Bad), 2);
        assert_eq!(report.count(Quality::Good), 1);

        let depth = report.copies.iter().find(|c| c.modality == Modality::Depth).unwrap();
        assert_eq!(depth.destination, PathBuf::from("/out/candy1/test_public/bad/xyz/7_depth.png"));
    }

    #[test]
    fn test_plan_counts_metadata_outcomes() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("1_image_5.png"), b"a").unwrap();
        fs::write(src.path().join("2_image_5.png"), b"b").unwrap();
        fs::write(src.path().join("2_metadata.yaml"), "anomalous: [").unwrap();

        let report = plan_split(&job(src.path(), Split::TestPublic), Path::new("/out"), &LayoutConfig::default()).unwrap();
        assert_eq!(report.metadata_absent, 1);
        assert_eq!(report.metadata_malformed, 1);
        assert_eq!(report.count(Quality::Good), 2);
    }

    #[test]
    fn test_train_ignores_metadata() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("5_mask.png"), b"m").unwrap();
        fs::write(src.path().join("5_metadata.yaml"), "anomalous: 1").unwrap();

        let report = plan_split(&job(src.path(), Split::Train), Path::new("/out"), &LayoutConfig::default()).unwrap();
        assert_eq!(report.count(Quality::Good), 1);
        assert_eq!(report.metadata_absent, 0);
    }

    #[test]
    fn test_process_copies_bytes_and_times() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let file = src.path().join("9_image_5.png");
        fs::write(&file, b"\x89PNG payload").unwrap();

        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        fs::File::options()
            .write(true)
            .open(&file)
            .unwrap()
            .set_modified(stamp)
            .unwrap();

        let report = process_split(&job(src.path(), Split::Val), out.path(), &LayoutConfig::default()).unwrap();
        let dest = &report.copies[0].destination;
        assert_eq!(dest, &out.path().join("candy1/val/good/rgb/9_image_5.png"));
        assert_eq!(fs::read(dest).unwrap(), b"\x89PNG payload");
        assert_eq!(fs::metadata(dest).unwrap().modified().unwrap(), stamp);
    }

    #[test]
    fn test_copy_overwrites_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("1_depth.png");
        let to = dir.path().join("nested/deeper/1_depth.png");
        fs::write(&from, b"new").unwrap();
        fs::create_dir_all(to.parent().unwrap()).unwrap();
        fs::write(&to, b"old contents").unwrap();

        copy_preserving(&from, &to).unwrap();
        copy_preserving(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), b"new");
    }

    #[test]
    fn test_copy_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = copy_preserving(&dir.path().join("missing.png"), &dir.path().join("out/x.png"));
        assert!(matches!(result, Err(ReorgError::Copy { .. })));
    }

    #[test]
    fn test_unreadable_sidecar_counts_and_stays_good() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("7_image_5.png"), b"a").unwrap();
        fs::create_dir(src.path().join("7_metadata.yaml")).unwrap();

        let report = plan_split(&job(src.path(), Split::TestPublic), Path::new("/out"), &LayoutConfig::default()).unwrap();
        assert_eq!(report.metadata_unreadable, 1);
        assert_eq!(report.metadata_absent, 0);
        assert_eq!(report.count(Quality::Good), 1);
    }

    #[test]
    fn test_vanished_data_dir_is_fatal() {
        let src = TempDir::new().unwrap();
        let gone = src.path().join("data");

        let result = plan_split(&job(&gone, Split::Train), Path::new("/out"), &LayoutConfig::default());
        assert!(matches!(result, Err(ReorgError::FileSystem(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(src.path().join("1_mask.png"), b"m").unwrap();
        fs::write(src.path().join(OsStr::from_bytes(b"1_mask\xff.png")), b"x").unwrap();

        let category = OsStr::from_bytes(b"candy\xfe");
        let split = SplitDir {
            category: category.to_string_lossy().into_owned(),
            category_dir: category.to_os_string(),
            split: Split::Train,
            path: src.path().to_path_buf(),
        };

        let report = process_split(&split, out.path(), &LayoutConfig::default()).unwrap();
        assert_eq!(report.copies.len(), 1);
        assert_eq!(report.ignored.len(), 1);
        assert!(out.path().join(category).join("train/good/gt/1_mask.png").is_file());
    }
}
