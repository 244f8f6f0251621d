// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Dataset layout: splits, quality labels, modalities and sample file names

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// Partition of samples within a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    TestPublic,
    Val,
}

impl Split {
    /// Processing order inside a category
    pub const ALL: [Split; 3] = [Split::Train, Split::TestPublic, Split::Val];

    /// Directory name in the source tree
    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::TestPublic => "test_public",
            Split::Val => "val",
        }
    }

    /// Directory name in the output tree. Identical to the source name.
    pub fn output_name(self) -> &'static str {
        self.dir_name()
    }

    /// Only the labeled evaluation split carries per-sample anomaly metadata
    pub fn is_labeled(self) -> bool {
        matches!(self, Split::TestPublic)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Normal / anomalous label of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Good,
    Bad,
}

impl Quality {
    pub fn dir_name(self) -> &'static str {
        match self {
            Quality::Good => "good",
            Quality::Bad => "bad",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Kind of file produced per sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Image,
    Depth,
    Mask,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Image, Modality::Depth, Modality::Mask];

    /// File name suffix following the numeric prefix
    pub fn suffix(self) -> &'static str {
        match self {
            Modality::Image => "_image_5.png",
            Modality::Depth => "_depth.png",
            Modality::Mask => "_mask.png",
        }
    }

    /// Output subfolder
    pub fn folder(self) -> &'static str {
        match self {
            Modality::Image => "rgb",
            Modality::Depth => "xyz",
            Modality::Mask => "gt",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}

/// Numeric sample identifier taken from the start of a file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SamplePrefix(String);

impl SamplePrefix {
    /// Accepts a non-empty run of ASCII digits
    pub fn parse(text: &str) -> Option<Self> {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(text.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn significant(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }
}

impl Ord for SamplePrefix {
    // Numeric order without overflow: "2" < "10" < "0011" (== 11, tie broken by text)
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.significant(), other.significant());
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for SamplePrefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SamplePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file name matching one of the strict sample patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    pub file_name: String,
    pub prefix: SamplePrefix,
    pub modality: Modality,
}

impl SampleFile {
    /// Classify a file name. Anything but `<digits>_image_5.png`,
    /// `<digits>_depth.png` or `<digits>_mask.png` yields `None`.
    pub fn classify(file_name: &str) -> Option<Self> {
        Modality::ALL.iter().find_map(|&modality| {
            let stem = file_name.strip_suffix(modality.suffix())?;
            let prefix = SamplePrefix::parse(stem)?;
            Some(Self {
                file_name: file_name.to_string(),
                prefix,
                modality,
            })
        })
    }
}

/// `<target>/<category>/<split>/<quality>/<modality folder>`
pub fn destination_dir(
    target: &Path,
    category: impl AsRef<Path>,
    split: Split,
    quality: Quality,
    modality: Modality,
) -> PathBuf {
    target
        .join(category)
        .join(split.output_name())
        .join(quality.dir_name())
        .join(modality.folder())
}

/// Zero-padded output name, e.g. `007.png` for width 3
pub fn renumbered_name(index: usize, width: usize) -> String {
    format!("{:0width$}.png", index, width = width)
}
