//! CLI value enums and domain type conversions.
//!
//! This module contains the value enums used for CLI argument parsing
//! and their conversions to the configuration and output types.

use clap::ValueEnum;

use crate::config::WorkMode;
use crate::output::Layout;

// ============================================================================
// Value Enums
// ============================================================================

/// Work mode for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkModeArg {
    /// Query a live registry (`--url`)
    Online,
    /// Read a local fixture (`--test-repo`)
    Offline,
}

impl std::fmt::Display for WorkModeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Text layout for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutArg {
    /// Indented tree from the root package
    #[default]
    Tree,
    /// One sorted line per package
    Flat,
}

impl std::fmt::Display for LayoutArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<WorkModeArg> for WorkMode {
    fn from(arg: WorkModeArg) -> Self {
        match arg {
            WorkModeArg::Online => WorkMode::Online,
            WorkModeArg::Offline => WorkMode::Offline,
        }
    }
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Tree => Layout::Tree,
            LayoutArg::Flat => Layout::Flat,
        }
    }
}
