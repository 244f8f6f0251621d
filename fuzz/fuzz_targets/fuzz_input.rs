// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use candyshelf::layout::SampleFile;
use candyshelf::metadata::SampleMetadata;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    file_name: &'a str,
    metadata: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    if let Some(sample) = SampleFile::classify(input.file_name) {
        assert!(input.file_name.starts_with(sample.prefix.as_str()));
        assert!(input.file_name.ends_with(sample.modality.suffix()));
    }

    if let Ok(meta) = SampleMetadata::parse(input.metadata) {
        let _ = meta.is_anomalous();
    }
});
