//! Run configuration.
//!
//! [`AnalysisConfig`] is the validated form of the command line. Every
//! cross-flag and filesystem check happens in [`AnalysisConfig::from_cli`],
//! and all problems found are reported together in one `Error::Config`.

use crate::cli::Cli;
use crate::domain::{PackageName, TraversalOptions};
use crate::error::{Error, Result};
use crate::source::SourceHandle;
use std::fmt;
use std::path::PathBuf;

/// Whether package metadata comes from the network or from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkMode {
    /// Live registry.
    Online,
    /// Local fixture.
    Offline,
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkMode::Online => write!(f, "online"),
            WorkMode::Offline => write!(f, "offline"),
        }
    }
}

/// Where package metadata is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A NuGet v3 registry.
    Registry {
        /// Service index URL, or the directory holding it.
        url: String,
    },
    /// An adjacency-list file or a directory of `.nuspec` files.
    Fixture {
        /// Path to the fixture.
        path: PathBuf,
    },
}

impl SourceSpec {
    /// The work mode this source implies.
    pub fn work_mode(&self) -> WorkMode {
        match self {
            SourceSpec::Registry { .. } => WorkMode::Online,
            SourceSpec::Fixture { .. } => WorkMode::Offline,
        }
    }
}

/// Validated configuration of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Package the graph is built from.
    pub package: PackageName,
    /// Where dependencies are looked up.
    pub source: SourceSpec,
    /// Effective work mode.
    pub mode: WorkMode,
    /// Depth limit and name filters.
    pub traversal: TraversalOptions,
    /// Build the reverse graph instead of the forward one.
    pub reverse: bool,
}

impl AnalysisConfig {
    /// Validate parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` listing every problem found: a blank package
    /// name, a missing or doubled source, a URL that is not http(s), a
    /// fixture path that does not exist, or a `--mode` that contradicts the
    /// source.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut problems = Vec::new();

        let package = cli.target.package.trim();
        if package.is_empty() {
            problems.push("package name must not be empty".to_string());
        }

        let url = cli
            .target
            .source
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        let source = match (url, &cli.target.source.test_repo) {
            (Some(url), None) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    problems.push(format!(
                        "registry URL must start with http:// or https:// (got '{url}')"
                    ));
                }
                Some(SourceSpec::Registry {
                    url: url.to_string(),
                })
            }
            (None, Some(path)) => {
                if !path.exists() {
                    problems.push(format!("test repository not found: {}", path.display()));
                }
                Some(SourceSpec::Fixture { path: path.clone() })
            }
            (Some(_), Some(_)) => {
                problems.push("specify either --url or --test-repo, not both".to_string());
                None
            }
            (None, None) => {
                problems.push("a package source is required: --url or --test-repo".to_string());
                None
            }
        };

        let implied = source.as_ref().map(SourceSpec::work_mode);
        let mode = match (cli.target.mode.map(WorkMode::from), implied) {
            (Some(WorkMode::Online), Some(WorkMode::Offline)) => {
                problems.push("online mode requires --url".to_string());
                WorkMode::Online
            }
            (Some(WorkMode::Offline), Some(WorkMode::Online)) => {
                problems.push("offline mode requires --test-repo".to_string());
                WorkMode::Offline
            }
            (Some(mode), _) | (None, Some(mode)) => mode,
            (None, None) => WorkMode::Offline,
        };

        let (Some(source), true) = (source, problems.is_empty()) else {
            return Err(Error::Config(format_problems(&problems)));
        };

        let mut traversal = TraversalOptions::new();
        traversal.max_depth = cli.traversal.max_depth;
        traversal.filter.clone_from(&cli.traversal.filter);
        traversal.exclude.clone_from(&cli.traversal.exclude);

        let config = Self {
            package: PackageName::from(package),
            source,
            mode,
            traversal,
            reverse: cli.traversal.reverse,
        };
        tracing::debug!(?config, "Configuration validated");
        Ok(config)
    }

    /// Open the configured package source.
    ///
    /// # Errors
    ///
    /// Returns an error if a local fixture cannot be loaded.
    pub fn open_source(&self) -> Result<SourceHandle> {
        match &self.source {
            SourceSpec::Registry { url } => Ok(SourceHandle::registry(url)),
            SourceSpec::Fixture { path } => SourceHandle::open_fixture(path),
        }
    }
}

fn format_problems(problems: &[String]) -> String {
    match problems {
        [single] => single.clone(),
        _ => {
            let list: Vec<String> = problems.iter().map(|p| format!("  - {p}")).collect();
            format!("{} problems found:\n{}", problems.len(), list.join("\n"))
        }
    }
}

impl fmt::Display for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (url, repo) = match &self.source {
            SourceSpec::Registry { url } => (url.clone(), "-".to_string()),
            SourceSpec::Fixture { path } => ("-".to_string(), path.display().to_string()),
        };
        let rows = [
            ("Package", self.package.to_string()),
            ("Registry URL", url),
            ("Test repository", repo),
            ("Work mode", self.mode.to_string()),
            (
                "Max depth",
                self.traversal
                    .max_depth
                    .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
            ),
            (
                "Filter",
                self.traversal.filter.clone().unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Exclude",
                self.traversal.exclude.clone().unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Reverse mode",
                if self.reverse { "enabled" } else { "disabled" }.to_string(),
            ),
        ];
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0) + 1;
        for (key, value) in rows {
            writeln!(f, "{:<width$} {value}", format!("{key}:"))?;
        }
        Ok(())
    }
}
