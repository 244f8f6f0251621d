// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Candyshelf: Eyecandies dataset reorganizer
//!
//! Copies `<category>/{train,test_public,val}/data/` sample files into a
//! `<category>/<split>/{good,bad}/{rgb,xyz,gt}/` tree and renumbers each
//! output directory to `000.png`, `001.png`, ...

pub mod classifier;
pub mod config;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod processor;
pub mod renumber;

pub use config::ReorgConfig;
pub use error::{ReorgError, Result};
pub use pipeline::{Reorganizer, RunSummary};
