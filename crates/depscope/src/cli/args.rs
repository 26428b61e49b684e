//! CLI argument structs.
//!
//! The analysis arguments are grouped by concern and flattened into the
//! top-level [`Cli`](super::Cli) parser.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser};

use super::types::{LayoutArg, WorkModeArg};
use super::validators::{validate_package_name, validate_substring};

/// Which package to analyze and where its metadata comes from.
#[derive(Parser, Debug, Clone)]
pub struct TargetArgs {
    /// Package to analyze (e.g., "Newtonsoft.Json")
    #[arg(short, long, value_parser = validate_package_name)]
    pub package: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Work mode (inferred from the source when omitted)
    ///
    /// `online` requires `--url`, `offline` requires `--test-repo`.
    #[arg(short, long, value_enum)]
    pub mode: Option<WorkModeArg>,
}

/// Package source: a live registry or a local fixture, never both.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// NuGet v3 registry URL (service index or its directory)
    #[arg(short, long, env = "DEPSCOPE_REGISTRY_URL")]
    pub url: Option<String>,

    /// Local fixture: an adjacency-list text file or a directory of .nuspec files
    #[arg(short, long, value_name = "PATH")]
    pub test_repo: Option<PathBuf>,
}

/// Limits applied while walking the graph.
#[derive(Parser, Debug, Clone, Default)]
pub struct TraversalArgs {
    /// Maximum traversal depth (1 records only the root package)
    #[arg(short = 'd', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_depth: Option<usize>,

    /// Only expand packages whose name contains this substring (case-insensitive)
    #[arg(short, long, value_parser = validate_substring)]
    pub filter: Option<String>,

    /// Never expand packages whose name contains this substring (case-insensitive)
    #[arg(short = 'x', long, value_parser = validate_substring)]
    pub exclude: Option<String>,

    /// Show packages that depend on the target instead of its dependencies
    ///
    /// Requires a local fixture, since the whole package universe must be read.
    #[arg(short, long)]
    pub reverse: bool,
}

/// How results are presented.
#[derive(Parser, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Text layout of the graph
    #[arg(short, long, value_enum, default_value_t = LayoutArg::Tree)]
    pub layout: LayoutArg,
}
