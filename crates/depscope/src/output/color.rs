//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:   green   (acyclic result, leaf packages)
//!   - Warning:   yellow  (lookup failures, pruned packages)
//!   - Error:     red     (cycles)
//!   - Reference: cyan    (root package, arrows)
//!   - Muted:     dimmed  (field labels, connectors, repeat markers)
//!   - Emphasis:  bold    (section headers)

use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// How a package appears in a rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PackageRole {
    /// The analyzed package.
    Root,
    /// A recorded package with relations of its own.
    Inner,
    /// A recorded package with no relations.
    Leaf,
    /// Listed by its parent but never recorded (depth limit or filter).
    Pruned,
}

/// Colorize a package name by its role in the graph.
pub(crate) fn colorize_package(name: &str, role: PackageRole, config: &OutputConfig) -> String {
    if !config.use_colors {
        return name.to_string();
    }
    match role {
        PackageRole::Root => name.cyan().bold().to_string(),
        PackageRole::Inner => name.to_string(),
        PackageRole::Leaf => name.green().to_string(),
        PackageRole::Pruned => name.yellow().dimmed().to_string(),
    }
}

/// Colorize a direction arrow (`->` / `<-`).
pub(crate) fn colorize_arrow(arrow: &str, config: &OutputConfig) -> String {
    info(arrow, config)
}

/// Colorize a cycle chain, red and bold.
pub(crate) fn colorize_cycle(chain: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return chain.to_string();
    }
    chain.red().bold().to_string()
}
