//! Application context for one analysis run.
//!
//! This module provides the `App` struct, which owns the validated
//! configuration and the opened package source, and runs the analysis.
//!
//! # Example
//!
//! ```no_run
//! use depscope::app::App;
//! use depscope::cli::Cli;
//! use depscope::config::AnalysisConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = Cli::try_parse_from(["depscope", "-p", "A", "--test-repo", "graph.txt"])?;
//!     let app = App::from_config(AnalysisConfig::from_cli(&cli)?)?;
//!     let analysis = app.analyze()?;
//!     println!("{} packages", analysis.graph.package_count());
//!     Ok(())
//! }
//! ```

use crate::config::AnalysisConfig;
use crate::domain::{DependencyGraph, Direction};
use crate::error::Result;
use crate::graph::{GraphBuilder, LevelReport, levels};
use crate::output::Report;
use crate::source::SourceHandle;

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The built graph.
    pub graph: DependencyGraph,
    /// Level analysis, computed for forward graphs only.
    pub levels: Option<LevelReport>,
}

/// Application context for an analysis run.
///
/// The package source is opened once, when the context is created.
#[derive(Debug)]
pub struct App {
    config: AnalysisConfig,
    source: SourceHandle,
}

impl App {
    /// Open the package source named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a local fixture cannot be loaded.
    pub fn from_config(config: AnalysisConfig) -> Result<Self> {
        let source = config.open_source()?;
        tracing::debug!(?source, "Package source ready");
        Ok(Self { config, source })
    }

    /// The validated configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The opened package source.
    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    /// Build the configured graph and, for forward graphs, its levels.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedOperation` for reverse analysis against a
    /// source that cannot list its packages, and propagates listing
    /// failures. Individual lookup failures do not fail the run; they are
    /// recorded on the graph. A failed level analysis leaves `levels` empty.
    pub fn analyze(&self) -> Result<Analysis> {
        let builder = GraphBuilder::new(self.config.traversal.clone());
        let root = self.config.package.clone();

        let graph = if self.config.reverse {
            let source = self.source.require_enumerable()?;
            builder.build_reverse(root, source)?
        } else {
            builder.build_forward(root, &self.source)
        };

        let levels = match graph.direction {
            Direction::Forward => level_report(&graph),
            Direction::Reverse => None,
        };

        Ok(Analysis { graph, levels })
    }

    /// Pair an analysis with this run's configuration for rendering.
    pub fn report<'a>(&'a self, analysis: &'a Analysis) -> Report<'a> {
        Report {
            config: &self.config,
            graph: &analysis.graph,
            levels: analysis.levels.as_ref(),
        }
    }
}

/// Levels of a forward graph; a failure only drops the level section.
fn level_report(graph: &DependencyGraph) -> Option<LevelReport> {
    match levels::analyze(graph) {
        Ok(report) => Some(report),
        Err(error) => {
            tracing::warn!(%error, "Dependency level analysis skipped");
            None
        }
    }
}
