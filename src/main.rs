// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Candyshelf: Eyecandies dataset reorganizer
//!
//! Rebuilds the target tree from the source dataset in one pass.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use candyshelf::manifest::Manifest;
use candyshelf::{ReorgConfig, Reorganizer, RunSummary};

/// Candyshelf CLI - Eyecandies dataset reorganizer
#[derive(Parser, Debug)]
#[command(name = "candyshelf")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Reorganize the Eyecandies dataset by category, split and quality", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "candyshelf.json", global = true)]
    config: PathBuf,

    /// Source dataset root (overrides config)
    #[arg(long, global = true, env = "CANDYSHELF_SOURCE")]
    source: Option<PathBuf>,

    /// Output root, deleted and recreated on every run (overrides config)
    #[arg(long, global = true, env = "CANDYSHELF_TARGET")]
    target: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for summaries and plans
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output and progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reorganize the dataset (default)
    Run {
        /// Write a JSONL manifest mapping output files to their sources
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Only process these categories
        #[arg(long = "category")]
        categories: Vec<String>,
    },

    /// Show where every file would go without writing anything
    Plan {
        /// Only process these categories
        #[arg(long = "category")]
        categories: Vec<String>,
    },

    /// Verify a manifest written by `run --manifest` against the output tree
    Manifest {
        /// Manifest file (JSONL)
        path: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "candyshelf.json")]
        output: PathBuf,
    },

    /// Validate configuration
    Validate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = ReorgConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {:?}", cli.config))?
        .with_roots(cli.source.clone(), cli.target.clone());

    match cli.command {
        Some(Commands::Run { manifest, categories }) => {
            run_reorganize(with_categories(config, categories), manifest, &cli.format, cli.quiet)
        }
        Some(Commands::Plan { categories }) => run_plan(with_categories(config, categories), &cli.format),
        Some(Commands::Manifest { path }) => run_manifest_check(path, &cli.format),
        Some(Commands::Config { action }) => run_config_command(config, action),
        None => run_reorganize(config, None, &cli.format, cli.quiet),
    }
}

fn with_categories(mut config: ReorgConfig, categories: Vec<String>) -> ReorgConfig {
    if !categories.is_empty() {
        config.categories = categories;
    }
    config
}

/// Run the full reorganization
fn run_reorganize(config: ReorgConfig, manifest: Option<PathBuf>, format: &str, quiet: bool) -> anyhow::Result<()> {
    if !quiet && format == "text" {
        println!("{:=<50}", "");
        println!("Dataset Processing Tool");
        println!("Source Directory: {}", display_abs(&config.source_dir));
        println!("Target Directory: {}", display_abs(&config.target_dir));
        println!("{:=<50}\n", "");
    }

    let reorganizer = Reorganizer::new(config).with_progress(!quiet && format == "text");
    let summary = reorganizer.run().with_context(|| {
        format!(
            "reorganizing {:?} into {:?}",
            reorganizer.config().source_dir,
            reorganizer.config().target_dir
        )
    })?;

    if let Some(path) = manifest {
        let manifest = Manifest::new(path);
        let entries = Manifest::build_entries(&summary.copies, &summary.renames);
        manifest
            .write_all(&entries)
            .with_context(|| format!("writing manifest {:?}", manifest.path()))?;
        info!("Manifest written: {:?} ({} entries)", manifest.path(), entries.len());
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ if !quiet => print_summary(&summary, &reorganizer.config().target_dir),
        _ => {}
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, target: &Path) {
    println!("\n{:=<50}", "");
    println!("Processing complete! Results saved to:");
    println!("{}", display_abs(target));
    println!("  Categories:  {}", summary.categories);
    println!("  Splits:      {} processed, {} skipped", summary.splits_processed, summary.skipped.len());
    println!("  Files:       {} copied ({} good, {} bad), {} ignored", summary.copied, summary.good, summary.bad, summary.ignored);
    println!("  Renumbered:  {}", summary.renamed);
    if summary.metadata_fallbacks > 0 {
        println!("  Metadata fallbacks: {}", summary.metadata_fallbacks);
    }
    println!("  Elapsed:     {:.2}s", summary.elapsed.as_secs_f64());
    println!("Directory structure example:");
    println!("  target/category/train/good/rgb/000.png");
    println!("  target/category/test_public/bad/xyz/001.png");
    println!("{:=<50}", "");
}

/// Dry run listing
fn run_plan(config: ReorgConfig, format: &str) -> anyhow::Result<()> {
    let reorganizer = Reorganizer::new(config);
    let planned = reorganizer.plan().context("planning reorganization")?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&planned)?),
        _ => {
            for file in &planned {
                let dir = file.copy.destination.parent().unwrap_or_else(|| Path::new(""));
                println!(
                    "{} -> {}",
                    file.copy.source.display(),
                    dir.join(&file.final_name).display()
                );
            }
            println!("\n{} files planned", planned.len());
        }
    }

    Ok(())
}

/// Check a manifest; fails when recorded outputs are missing
fn run_manifest_check(path: PathBuf, format: &str) -> anyhow::Result<()> {
    let manifest = Manifest::new(path);
    let check = manifest
        .check()
        .with_context(|| format!("reading manifest {:?}", manifest.path()))?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&check)?),
        _ => {
            println!("Manifest {:?}: {} entries", manifest.path(), check.entries);
            for (group, count) in &check.by_group {
                println!("  {:<40} {}", group, count);
            }
            for missing in &check.missing_outputs {
                eprintln!("  Missing: {}", missing.display());
            }
        }
    }

    if !check.is_complete() {
        anyhow::bail!("{} output files listed in the manifest are missing", check.missing_outputs.len());
    }
    Ok(())
}

/// Run config commands
fn run_config_command(config: ReorgConfig, action: ConfigCommands) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { output } => {
            ReorgConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration is valid");
            println!("  Source: {}", display_abs(&config.source_dir));
            println!("  Target: {}", display_abs(&config.target_dir));
            println!("  Data dir: {}", config.layout.data_dir);
        }
    }

    Ok(())
}

fn display_abs(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
