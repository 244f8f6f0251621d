// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! End-to-end reorganization run: clear, copy, renumber

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::classifier::{discover, SkippedSplit};
use crate::layout::{renumbered_name, Quality};
use crate::processor::{plan_split, process_split, CopyRecord};
use crate::renumber::{assign_indices, renumber_tree, RenameRecord};
use crate::{ReorgConfig, ReorgError, Result};

/// Outcome of a complete run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub categories: usize,
    pub splits_processed: usize,
    pub skipped: Vec<SkippedSplit>,
    pub copied: usize,
    pub good: usize,
    pub bad: usize,
    pub ignored: usize,
    pub metadata_fallbacks: usize,
    pub renamed: usize,
    pub elapsed: Duration,
    #[serde(skip)]
    pub copies: Vec<CopyRecord>,
    #[serde(skip)]
    pub renames: Vec<RenameRecord>,
}

/// A planned copy with the name it will end up with after renumbering
#[derive(Debug, Clone, Serialize)]
pub struct PlannedFile {
    #[serde(flatten)]
    pub copy: CopyRecord,
    pub final_name: String,
}

/// Drives a reorganization run
pub struct Reorganizer {
    config: ReorgConfig,
    show_progress: bool,
}

impl Reorganizer {
    pub fn new(config: ReorgConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Draw a progress bar per run (off by default)
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &ReorgConfig {
        &self.config
    }

    /// Rebuild the target tree from the source tree
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let config = &self.config;
        config.validate()?;

        let source = &config.source_dir;
        let target = &config.target_dir;
        if !source.is_dir() {
            return Err(ReorgError::SourceMissing(source.clone()));
        }

        let discovery = discover(source, &config.layout.data_dir, &config.categories)?;

        if target.exists() {
            info!("Clearing existing target directory {:?}", target);
            fs::remove_dir_all(target)?;
        }
        fs::create_dir_all(target)?;

        let mut summary = RunSummary {
            categories: discovery.categories.len(),
            skipped: discovery.skipped.clone(),
            ..Default::default()
        };

        let bar = self.progress_bar(discovery.categories.len() as u64);
        for category in &discovery.categories {
            info!("Processing: {}", category.name);
            bar.set_message(category.name.clone());

            for job in &category.jobs {
                let report = process_split(job, target, &config.layout)?;
                info!(
                    "{}/{}: {} files ({} good, {} bad)",
                    job.category,
                    job.split,
                    report.copies.len(),
                    report.count(Quality::Good),
                    report.count(Quality::Bad)
                );

                summary.splits_processed += 1;
                summary.copied += report.copies.len();
                summary.good += report.count(Quality::Good);
                summary.bad += report.count(Quality::Bad);
                summary.ignored += report.ignored.len();
                summary.metadata_fallbacks += report.metadata_unreadable + report.metadata_malformed;
                summary.copies.extend(report.copies);
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        if summary.metadata_fallbacks > 0 {
            warn!("{} metadata files could not be used; samples labeled good", summary.metadata_fallbacks);
        }

        let renumbered = renumber_tree(target, config.layout.index_width)?;
        summary.renamed = renumbered.renames.len();
        summary.renames = renumbered.renames;
        summary.elapsed = started.elapsed();

        Ok(summary)
    }

    /// Dry run: classify and label everything, report final names, write nothing
    pub fn plan(&self) -> Result<Vec<PlannedFile>> {
        let config = &self.config;
        config.validate()?;

        let discovery = discover(&config.source_dir, &config.layout.data_dir, &config.categories)?;
        let mut copies = Vec::new();
        for job in discovery.jobs() {
            copies.extend(plan_split(job, &config.target_dir, &config.layout)?.copies);
        }

        Ok(plan_final_names(copies, config.layout.index_width))
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] Processing categories: {wide_bar:.cyan/blue} {pos}/{len} {msg}",
        ) {
            bar.set_style(style.progress_chars("█▇▆▅▄▃▂▁  "));
        }
        bar
    }
}

/// Mirror the renumbering pass over planned destinations
fn plan_final_names(copies: Vec<CopyRecord>, width: usize) -> Vec<PlannedFile> {
    let mut by_dir: BTreeMap<PathBuf, Vec<CopyRecord>> = BTreeMap::new();
    for copy in copies {
        let dir = copy.destination.parent().map(PathBuf::from).unwrap_or_default();
        by_dir.entry(dir).or_default().push(copy);
    }

    let mut planned = Vec::new();
    for group in by_dir.into_values() {
        let names: Vec<String> = group
            .iter()
            .filter_map(|c| c.destination.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        let indices = assign_indices(names.iter().map(String::as_str));

        for copy in group {
            let index = indices
                .iter()
                .find(|(_, prefix, _)| *prefix == copy.prefix)
                .map(|(index, _, _)| *index)
                .unwrap_or_default();
            planned.push(PlannedFile {
                copy,
                final_name: renumbered_name(index, width),
            });
        }
    }

    planned
}
