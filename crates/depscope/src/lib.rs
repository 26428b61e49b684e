//! Depscope - package dependency graph analysis.
//!
//! This crate provides both a CLI application and a library for building
//! forward and reverse dependency graphs from NuGet registries and local
//! fixtures, with cycle detection and dependency level analysis.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod graph;
pub mod source;

// Run configuration and application context
pub mod app;
pub mod config;

// Public CLI module (needed by binary)
pub mod cli;

// Rendering of analysis results
pub mod output;
