//! Tree rendering of a dependency graph.
//!
//! Renders the recorded graph from its root:
//!
//! ```text
//! A
//! ├── B
//! │   └── D
//! └── C
//!     ├── D (*)
//!     └── E
//!         └── F
//! ```
//!
//! A package already expanded earlier in the output is printed once more
//! with a `(*)` marker and not expanded again. Packages listed by a parent
//! but never recorded (cut by the depth limit or a filter) are printed
//! without children.

use std::collections::HashSet;
use std::io::{self, Write};

use super::OutputConfig;
use super::color::{PackageRole, colorize_package, dimmed};
use crate::domain::{AdjacencyMap, DependencyGraph, PackageName};

const REPEAT_MARKER: &str = "(*)";

/// Connector strings for one rendering style.
struct Connectors {
    branch: &'static str,
    corner: &'static str,
    pipe: &'static str,
    space: &'static str,
}

impl Connectors {
    fn for_config(config: &OutputConfig) -> Self {
        if config.use_ascii {
            Self {
                branch: "|-- ",
                corner: "`-- ",
                pipe: "|   ",
                space: "    ",
            }
        } else {
            Self {
                branch: "├── ",
                corner: "└── ",
                pipe: "│   ",
                space: "    ",
            }
        }
    }
}

/// A line waiting to be printed.
struct Pending<'a> {
    name: &'a PackageName,
    // For each ancestor level below the root: does it have siblings below?
    segments: Vec<bool>,
    is_last: bool,
}

/// Render `graph` as an indented tree.
///
/// Uses an explicit stack, so arbitrarily deep graphs render without
/// recursion.
pub fn print_tree<W: Write>(
    w: &mut W,
    graph: &DependencyGraph,
    config: &OutputConfig,
) -> io::Result<()> {
    let edges = &graph.edges;
    let connectors = Connectors::for_config(config);

    writeln!(
        w,
        "{}",
        colorize_package(graph.root.as_str(), PackageRole::Root, config)
    )?;
    if !edges.contains(graph.root.as_str()) {
        return writeln!(w, "{}", dimmed("  (not expanded)", config));
    }

    let mut expanded: HashSet<&str> = HashSet::new();
    expanded.insert(graph.root.as_str());

    let mut stack: Vec<Pending<'_>> = Vec::new();
    push_children(&mut stack, edges, &graph.root, &[]);

    while let Some(line) = stack.pop() {
        let mut prefix = String::new();
        for &has_more in &line.segments {
            let segment = if has_more {
                connectors.pipe
            } else {
                connectors.space
            };
            prefix.push_str(&dimmed(segment, config));
        }
        let connector = if line.is_last {
            connectors.corner
        } else {
            connectors.branch
        };
        prefix.push_str(&dimmed(connector, config));

        let name = line.name.as_str();
        let recorded = edges.get(name);
        let repeated = recorded.is_some() && expanded.contains(name);
        let role = match recorded {
            None => PackageRole::Pruned,
            Some([]) if !graph.has_cut_edge(name) => PackageRole::Leaf,
            Some(_) => PackageRole::Inner,
        };
        let marker = if repeated {
            format!(" {}", dimmed(REPEAT_MARKER, config))
        } else {
            String::new()
        };
        writeln!(w, "{prefix}{}{marker}", colorize_package(name, role, config))?;

        if recorded.is_some() && !repeated {
            expanded.insert(name);
            let mut segments = line.segments;
            segments.push(!line.is_last);
            push_children(&mut stack, edges, line.name, &segments);
        }
    }

    Ok(())
}

/// Push the children of `parent`, last child first, so they pop in order.
fn push_children<'a>(
    stack: &mut Vec<Pending<'a>>,
    edges: &'a AdjacencyMap,
    parent: &PackageName,
    segments: &[bool],
) {
    let children = edges.get(parent.as_str()).unwrap_or_default();
    for (i, child) in children.iter().enumerate().rev() {
        stack.push(Pending {
            name: child,
            segments: segments.to_vec(),
            is_last: i + 1 == children.len(),
        });
    }
}
