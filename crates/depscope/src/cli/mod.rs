//! CLI argument parsing and execution.
//!
//! This module provides the command-line interface for depscope using clap's
//! derive API. There is a single command: analyze one package's dependency
//! graph, forward or reverse, against a registry or a local fixture.
//!
//! # Global Flags
//!
//! - `--json`: Output one JSON object instead of text
//! - `-v`: Increase log verbosity (repeatable)
//!
//! # Example
//!
//! ```bash
//! depscope -p Microsoft.Extensions.Logging --url https://api.nuget.org/v3/index.json --max-depth 3
//! depscope -p D --test-repo tests/fixtures/simple_test.txt --reverse
//! depscope -p A --test-repo tests/fixtures/complex_test.txt --layout flat --json
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::Parser;

// Re-export argument structs
pub use args::{DisplayArgs, SourceArgs, TargetArgs, TraversalArgs};

// Re-export types
pub use types::{LayoutArg, WorkModeArg};

// Re-export validators for external use
pub use validators::{validate_package_name, validate_substring};

/// Depscope - package dependency graph analysis
///
/// Builds the forward dependency graph of a package (what it needs) or its
/// reverse graph (what needs it), from a NuGet v3 registry or a local fixture.
/// Reports cycles, dependency levels and leaf packages.
#[derive(Parser, Debug)]
#[command(name = "depscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub traversal: TraversalArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Log filter directive for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Run the analysis and print the result to stdout.
    pub fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        execute::execute_analysis(self, output_mode)
    }
}
