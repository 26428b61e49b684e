//! Command execution logic.
//!
//! Turns parsed arguments into a validated configuration, runs the analysis
//! and prints the result.

use anyhow::{Context, Result};

use super::Cli;
use crate::app::App;
use crate::config::AnalysisConfig;
use crate::output::{self, Layout, OutputMode};

/// Execute the analysis command
pub fn execute_analysis(cli: &Cli, output_mode: OutputMode) -> Result<()> {
    let config = AnalysisConfig::from_cli(cli)?;
    tracing::info!(
        package = %config.package,
        mode = %config.mode,
        reverse = config.reverse,
        "Starting analysis"
    );

    let app = App::from_config(config)?;
    let analysis = app.analyze()?;

    let layout = Layout::from(cli.display.layout);
    output::print_analysis(&app.report(&analysis), output_mode, layout)
        .context("failed to write analysis output")?;

    tracing::debug!(
        packages = analysis.graph.package_count(),
        cycle_detected = analysis.graph.cycle_detected(),
        "Analysis completed"
    );
    Ok(())
}
