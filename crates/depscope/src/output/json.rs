//! JSON output of a finished analysis.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use super::{Report, Statistics, direct_dependents};
use crate::domain::{DependencyGraph, PackageName};

/// The single object written for `--json`.
#[derive(Serialize)]
struct AnalysisJson<'a> {
    #[serde(flatten)]
    graph: &'a DependencyGraph,
    cycle_detected: bool,
    statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    levels: Option<&'a BTreeMap<usize, Vec<PackageName>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    leaves: Option<&'a [PackageName]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direct_dependents: Option<Vec<PackageName>>,
}

fn to_json<'a>(report: &Report<'a>) -> AnalysisJson<'a> {
    let graph = report.graph;
    let reverse = graph.direction == crate::domain::Direction::Reverse;
    AnalysisJson {
        graph,
        cycle_detected: graph.cycle_detected(),
        statistics: Statistics::collect(report),
        levels: report.levels.map(|l| &l.levels),
        leaves: report.levels.map(|l| l.leaves.as_slice()),
        direct_dependents: reverse.then(|| direct_dependents(graph)),
    }
}

pub(super) fn print_analysis_json<W: Write>(w: &mut W, report: &Report<'_>) -> io::Result<()> {
    let output = serde_json::to_string_pretty(&to_json(report)).map_err(io::Error::other)?;
    writeln!(w, "{output}")
}
