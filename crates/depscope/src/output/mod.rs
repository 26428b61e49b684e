//! Output formatting for analysis results.
//!
//! This module renders a finished analysis either as human-readable text or
//! as a single JSON object for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - [`json`]: JSON serialization for programmatic output
//! - [`tree`]: Tree rendering with ASCII/Unicode connectors

pub mod color;
mod json;
pub mod tree;

use crate::config::AnalysisConfig;
use crate::domain::{DependencyGraph, Direction, PackageName};
use crate::graph::LevelReport;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};
pub use tree::print_tree;

use color::{PackageRole, bold, colorize_arrow, colorize_cycle, colorize_package, dimmed};
use json::print_analysis_json;

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for output formatting.
///
/// This struct holds settings that control how output is formatted,
/// including terminal width limits, ASCII fallback mode, and color output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only tree connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `DEPSCOPE_MAX_WIDTH`: Maximum content width (default: 100)
    /// - `DEPSCOPE_ASCII`: Set to "1" or "true" for ASCII-only connectors (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `DEPSCOPE_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable lookup.
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_width = match lookup("DEPSCOPE_MAX_WIDTH") {
            Some(s) if !s.is_empty() => match s.parse() {
                Ok(width) => width,
                Err(_) => {
                    tracing::warn!(
                        env_var = "DEPSCOPE_MAX_WIDTH",
                        value = %s,
                        default = DEFAULT_MAX_CONTENT_WIDTH,
                        "Invalid value, using default"
                    );
                    DEFAULT_MAX_CONTENT_WIDTH
                }
            },
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("DEPSCOPE_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "DEPSCOPE_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("DEPSCOPE_COLOR").is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Usable line width: the terminal width, capped at `max_width`.
    fn line_width(&self) -> usize {
        get_terminal_width().min(self.max_width).max(20)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Get the current terminal width, falling back to default if detection fails.
fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(usize::from(DEFAULT_TERMINAL_WIDTH), |(w, _)| usize::from(w.0))
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// How the graph itself is laid out in text mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Indented tree from the root.
    #[default]
    Tree,
    /// One sorted `NAME -> A, B` line per recorded package.
    Flat,
}

// ============================================================================
// Analysis Report
// ============================================================================

/// Everything one run produced, ready to render.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Validated run configuration.
    pub config: &'a AnalysisConfig,
    /// The built graph.
    pub graph: &'a DependencyGraph,
    /// Level analysis, present for forward graphs.
    pub levels: Option<&'a LevelReport>,
}

/// Summary numbers of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Recorded packages.
    pub packages: usize,
    /// Recorded edges.
    pub edges: usize,
    /// Configured depth limit (`None` = unlimited).
    pub max_depth: Option<usize>,
    /// Include filter in effect.
    pub filter: Option<String>,
    /// Exclude filter in effect.
    pub exclude: Option<String>,
    /// Edge direction.
    pub direction: Direction,
    /// Whether any cycle was found.
    pub cycle_detected: bool,
    /// Number of cycles found.
    pub cycles: usize,
    /// Number of packages whose lookup failed.
    pub lookup_failures: usize,
}

impl Statistics {
    /// Collect statistics for a report.
    pub fn collect(report: &Report<'_>) -> Self {
        let graph = report.graph;
        let traversal = &report.config.traversal;
        Self {
            packages: graph.package_count(),
            edges: graph.edge_count(),
            max_depth: traversal.max_depth,
            filter: traversal.filter.clone(),
            exclude: traversal.exclude.clone(),
            direction: graph.direction,
            cycle_detected: graph.cycle_detected(),
            cycles: graph.cycles.len(),
            lookup_failures: graph.failures.len(),
        }
    }
}

/// Direct dependents of the root in a reverse graph, sorted.
pub fn direct_dependents(graph: &DependencyGraph) -> Vec<PackageName> {
    let mut dependents = graph
        .edges
        .get(graph.root.as_str())
        .map(<[PackageName]>::to_vec)
        .unwrap_or_default();
    dependents.sort();
    dependents
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a finished analysis in the specified format.
pub fn print_analysis(report: &Report<'_>, mode: OutputMode, layout: Layout) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_analysis_text(&mut handle, report, layout, &config),
        OutputMode::Json => print_analysis_json(&mut handle, report),
    }
}

// ============================================================================
// Text Output
// ============================================================================

fn print_analysis_text<W: Write>(
    w: &mut W,
    report: &Report<'_>,
    layout: Layout,
    config: &OutputConfig,
) -> io::Result<()> {
    let graph = report.graph;

    print_section_header(w, "Configuration", config)?;
    for line in report.config.to_string().lines() {
        writeln!(w, "  {line}")?;
    }

    writeln!(w)?;
    let title = match graph.direction {
        Direction::Forward => format!("Dependencies of {}", graph.root),
        Direction::Reverse => format!("Dependents of {}", graph.root),
    };
    print_section_header(w, &title, config)?;
    match layout {
        Layout::Tree => print_tree(w, graph, config)?,
        Layout::Flat => print_flat(w, graph, config)?,
    }

    writeln!(w)?;
    print_statistics(w, &Statistics::collect(report), config)?;

    match (graph.direction, report.levels) {
        (Direction::Forward, Some(levels)) => print_levels(w, levels, config)?,
        (Direction::Reverse, _) => print_direct_dependents(w, graph, config)?,
        (Direction::Forward, None) => {}
    }

    print_cycles(w, graph, config)?;
    print_failures(w, graph, config)
}

fn print_section_header<W: Write>(w: &mut W, title: &str, config: &OutputConfig) -> io::Result<()> {
    writeln!(w, "{}", bold(title, config))
}

/// Print the recorded graph as sorted `NAME -> A, B` lines.
fn print_flat<W: Write>(w: &mut W, graph: &DependencyGraph, config: &OutputConfig) -> io::Result<()> {
    if graph.edges.is_empty() {
        return writeln!(w, "{}", dimmed("(no packages recorded)", config));
    }

    let arrow = graph.direction.arrow();
    let width = config.line_width();
    let mut entries: Vec<_> = graph.edges.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (name, related) in entries {
        let list = if related.is_empty() {
            "(none)".to_string()
        } else {
            related
                .iter()
                .map(PackageName::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let head = format!("{name} {arrow} ");
        let indent = " ".repeat(head.chars().count().min(width / 2));
        let options = textwrap::Options::new(width).subsequent_indent(&indent);
        let line = format!("{head}{list}");

        for (i, wrapped) in textwrap::wrap(&line, options).iter().enumerate() {
            match wrapped.strip_prefix(head.as_str()).filter(|_| i == 0) {
                Some(rest) => {
                    let role = if name == &graph.root {
                        PackageRole::Root
                    } else if related.is_empty() && !graph.has_cut_edge(name.as_str()) {
                        PackageRole::Leaf
                    } else {
                        PackageRole::Inner
                    };
                    writeln!(
                        w,
                        "{} {} {rest}",
                        colorize_package(name.as_str(), role, config),
                        colorize_arrow(arrow, config)
                    )?;
                }
                None => writeln!(w, "{wrapped}")?,
            }
        }
    }
    Ok(())
}

fn print_statistics<W: Write>(w: &mut W, stats: &Statistics, config: &OutputConfig) -> io::Result<()> {
    print_section_header(w, "Statistics", config)?;
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let cycle_text = if stats.cycle_detected {
        color::error(&format!("yes ({})", stats.cycles), config)
    } else {
        color::success("no", config)
    };
    let failure_text = if stats.lookup_failures > 0 {
        color::warning(&stats.lookup_failures.to_string(), config)
    } else {
        stats.lookup_failures.to_string()
    };
    let rows = [
        ("Packages", stats.packages.to_string()),
        ("Edges", stats.edges.to_string()),
        (
            "Max depth",
            stats
                .max_depth
                .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
        ),
        ("Filter", or_dash(&stats.filter)),
        ("Exclude", or_dash(&stats.exclude)),
        ("Direction", stats.direction.to_string()),
        ("Cycle detected", cycle_text),
        ("Lookup failures", failure_text),
    ];
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0) + 1;
    for (key, value) in rows {
        let label = format!("{key}:");
        writeln!(w, "  {} {value}", dimmed(&format!("{label:<width$}"), config))?;
    }
    Ok(())
}

fn join_names(names: &[PackageName]) -> String {
    names
        .iter()
        .map(PackageName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_levels<W: Write>(w: &mut W, levels: &LevelReport, config: &OutputConfig) -> io::Result<()> {
    if levels.levels.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    print_section_header(w, "Dependency levels", config)?;
    let width = config.line_width();
    for (level, names) in &levels.levels {
        let head = format!("  Level {level}: ");
        print_wrapped(w, &head, &join_names(names), width)?;
    }
    print_wrapped(w, "  Leaves: ", &join_names(&levels.leaves), width)
}

fn print_direct_dependents<W: Write>(
    w: &mut W,
    graph: &DependencyGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    let dependents = direct_dependents(graph);
    writeln!(w)?;
    print_section_header(
        w,
        &format!("Direct dependents of {} ({})", graph.root, dependents.len()),
        config,
    )?;
    if dependents.is_empty() {
        return writeln!(w, "  {}", dimmed("no package depends on it", config));
    }
    print_wrapped(w, "  ", &join_names(&dependents), config.line_width())
}

fn print_cycles<W: Write>(w: &mut W, graph: &DependencyGraph, config: &OutputConfig) -> io::Result<()> {
    if graph.cycles.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    print_section_header(w, &format!("Cycles ({})", graph.cycles.len()), config)?;
    for cycle in &graph.cycles {
        writeln!(w, "  {}", colorize_cycle(&cycle.to_string(), config))?;
    }
    Ok(())
}

fn print_failures<W: Write>(
    w: &mut W,
    graph: &DependencyGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    if graph.failures.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    print_section_header(
        w,
        &format!("Lookup failures ({})", graph.failures.len()),
        config,
    )?;
    for failure in &graph.failures {
        writeln!(
            w,
            "  {}: {}",
            color::warning(failure.package.as_str(), config),
            failure.error
        )?;
    }
    Ok(())
}

/// Print `head` followed by `body`, wrapping continuation lines under the body.
fn print_wrapped<W: Write>(w: &mut W, head: &str, body: &str, width: usize) -> io::Result<()> {
    let indent = " ".repeat(head.chars().count().min(width / 2));
    let options = textwrap::Options::new(width)
        .initial_indent(head)
        .subsequent_indent(&indent);
    for line in textwrap::wrap(body, options) {
        writeln!(w, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::graph::{GraphBuilder, levels};
    use crate::source::TextFixture;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    const SIMPLE: &str = "A -> B C\nB -> D\nC -> D E\nD -> \nE -> F\nF -> \n";

    struct Fixture {
        _temp: TempDir,
        config: AnalysisConfig,
        graph: DependencyGraph,
        levels: Option<LevelReport>,
    }

    fn analyze(text: &str, args: &[&str]) -> Fixture {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("graph.txt");
        fs::write(&path, text).expect("write fixture");
        let path = path.display().to_string();
        let argv = ["depscope", "--test-repo", path.as_str()]
            .into_iter()
            .chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).expect("arguments should parse");
        let config = AnalysisConfig::from_cli(&cli).expect("valid configuration");

        let (fixture, _) = TextFixture::parse(text);
        let builder = GraphBuilder::new(config.traversal.clone());
        let graph = if config.reverse {
            builder
                .build_reverse(config.package.clone(), &fixture)
                .expect("fixture is enumerable")
        } else {
            builder.build_forward(config.package.clone(), &fixture)
        };
        let levels = (graph.direction == Direction::Forward)
            .then(|| levels::analyze(&graph).expect("acyclic after build"));
        Fixture {
            _temp: temp,
            config,
            graph,
            levels,
        }
    }

    impl Fixture {
        fn report(&self) -> Report<'_> {
            Report {
                config: &self.config,
                graph: &self.graph,
                levels: self.levels.as_ref(),
            }
        }

        fn render(&self, layout: Layout) -> String {
            let config = OutputConfig::new(80, false, false);
            let mut buffer = Vec::new();
            print_analysis_text(&mut buffer, &self.report(), layout, &config)
                .expect("text rendering should succeed");
            String::from_utf8(buffer).expect("output should be valid UTF-8")
        }
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_output_config_from_lookup() {
        let config = OutputConfig::from_lookup(env(&[]));
        assert_eq!(config, OutputConfig::default());

        let config =
            OutputConfig::from_lookup(env(&[("DEPSCOPE_MAX_WIDTH", "120"), ("DEPSCOPE_ASCII", "1")]));
        assert_eq!(config.max_width, 120);
        assert!(config.use_ascii);
        assert!(config.use_colors);

        let config = OutputConfig::from_lookup(env(&[
            ("DEPSCOPE_MAX_WIDTH", "invalid"),
            ("DEPSCOPE_ASCII", "false"),
        ]));
        assert_eq!(config.max_width, DEFAULT_MAX_CONTENT_WIDTH);
        assert!(!config.use_ascii);
    }

    #[test]
    fn test_output_config_color_switches() {
        assert!(!OutputConfig::from_lookup(env(&[("NO_COLOR", "1")])).use_colors);
        assert!(!OutputConfig::from_lookup(env(&[("DEPSCOPE_COLOR", "0")])).use_colors);
        assert!(!OutputConfig::from_lookup(env(&[("DEPSCOPE_COLOR", "FALSE")])).use_colors);
        assert!(OutputConfig::from_lookup(env(&[("DEPSCOPE_COLOR", "1")])).use_colors);
    }

    #[test]
    fn test_forward_text_sections() {
        let fixture = analyze(SIMPLE, &["-p", "A"]);
        let output = fixture.render(Layout::Tree);

        assert!(output.starts_with("Configuration\n  Package:"), "{output}");
        assert!(output.contains("Dependencies of A\nA\n├── B"), "{output}");
        assert!(output.contains("Packages:        6"), "{output}");
        assert!(output.contains("Edges:           6"), "{output}");
        assert!(output.contains("Cycle detected:  no"), "{output}");
        assert!(output.contains("  Level 3: A"), "{output}");
        assert!(output.contains("  Leaves: D, F"), "{output}");
        assert!(!output.contains("Cycles ("), "{output}");
    }

    #[test]
    fn test_flat_layout_is_sorted() {
        let fixture = analyze("C -> A\nB -> \nA -> B\n", &["-p", "C"]);
        let output = fixture.render(Layout::Flat);
        let listing: Vec<&str> = output
            .lines()
            .skip_while(|l| !l.starts_with("Dependencies of C"))
            .skip(1)
            .take(3)
            .collect();
        assert_eq!(listing, vec!["A -> B", "B -> (none)", "C -> A"]);
    }

    #[test]
    fn test_flat_layout_wraps_long_lists() {
        let deps: Vec<String> = (0..40).map(|i| format!("Package.Number{i}")).collect();
        let text = format!("Root -> {}\n", deps.join(" "));
        let fixture = analyze(&text, &["-p", "Root", "-d", "1"]);
        let output = fixture.render(Layout::Flat);
        let wrapped: Vec<&str> = output
            .lines()
            .skip_while(|l| !l.starts_with("Root -> "))
            .take_while(|l| !l.is_empty())
            .collect();
        assert!(wrapped.len() > 1, "{output}");
        assert!(wrapped.iter().all(|l| l.chars().count() <= 80), "{output}");
        assert!(wrapped[1].starts_with("        Package."), "{output}");
    }

    #[test]
    fn test_reverse_text_shows_direct_dependents() {
        let fixture = analyze(SIMPLE, &["-p", "D", "--reverse"]);
        let output = fixture.render(Layout::Flat);

        assert!(output.contains("Dependents of D"), "{output}");
        assert!(output.contains("D <- B, C"), "{output}");
        assert!(output.contains("Direct dependents of D (2)\n  B, C"), "{output}");
        assert!(output.contains("Direction:       reverse"), "{output}");
        assert!(!output.contains("Dependency levels"), "{output}");
    }

    #[test]
    fn test_cycles_and_failures_listed() {
        let fixture = analyze("A -> B X\nB -> C\nC -> A\n", &["-p", "A"]);
        let output = fixture.render(Layout::Tree);

        assert!(output.contains("Cycle detected:  yes (1)"), "{output}");
        assert!(output.contains("Cycles (1)\n  A -> B -> C -> A"), "{output}");
        assert!(output.contains("Lookup failures (1)\n  X: package not found: X"), "{output}");
    }

    #[test]
    fn test_statistics_collect() {
        let fixture = analyze(SIMPLE, &["-p", "A", "-d", "2", "-f", "a"]);
        let stats = Statistics::collect(&fixture.report());
        assert_eq!(stats.packages, 1);
        assert_eq!(stats.max_depth, Some(2));
        assert_eq!(stats.filter.as_deref(), Some("a"));
        assert_eq!(stats.direction, Direction::Forward);
        assert!(!stats.cycle_detected);
    }

    #[test]
    fn test_direct_dependents_sorted() {
        let fixture = analyze("Z -> T\nA -> T\nT ->\n", &["-p", "T", "-r"]);
        let names: Vec<String> = direct_dependents(&fixture.graph)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["A", "Z"]);
    }
}
