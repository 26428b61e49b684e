//! Package source abstraction layer.
//!
//! A package source answers one question: which packages does this package
//! require? Sources come in two capability levels:
//!
//! - [`PackageSource`]: single-package lookup only. The live registry client
//!   sits here, since a registry cannot cheaply enumerate every package.
//! - [`EnumerableSource`]: additionally lists every package it knows. Reverse
//!   analysis needs this, and [`GraphBuilder::build_reverse`] only accepts
//!   enumerable sources.
//!
//! # Implementations
//!
//! - [`TextFixture`]: plain `NAME -> DEP DEP` adjacency-list files
//! - [`NuspecDirectory`]: a directory tree of `.nuspec` metadata files
//! - [`RegistryClient`]: a live NuGet v3 registry
//!
//! [`SourceHandle`] picks one of these at runtime from the run configuration.
//!
//! # Example
//!
//! ```no_run
//! use depscope::graph::GraphBuilder;
//! use depscope::domain::TraversalOptions;
//! use depscope::source::TextFixture;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let (fixture, _warnings) = TextFixture::load(Path::new("simple_test.txt"))?;
//!     let graph = GraphBuilder::new(TraversalOptions::new()).build_forward("A".into(), &fixture);
//!     println!("{} packages, cycle detected: {}", graph.package_count(), graph.cycle_detected());
//!     Ok(())
//! }
//! ```
//!
//! [`GraphBuilder::build_reverse`]: crate::graph::GraphBuilder::build_reverse

use crate::domain::PackageName;
use crate::error::{Error, Result, SourceError};
use std::fmt;
use std::path::Path;

pub mod directory;
pub mod nuspec;
pub mod registry;
pub mod text;

pub use directory::NuspecDirectory;
pub use registry::RegistryClient;
pub use text::{FixtureWarning, TextFixture};

/// Single-package dependency lookup.
///
/// Implementations must return the complete dependency list for a package in
/// one call, in the order the underlying data lists them.
pub trait PackageSource {
    /// Immediate dependencies of `name`.
    ///
    /// # Errors
    ///
    /// - `SourceError::NotFound` if the source has no record of `name`
    /// - `SourceError::Transient` for network or server failures
    /// - `SourceError::Parse` if the package metadata is malformed
    fn get_dependencies(&self, name: &PackageName)
    -> std::result::Result<Vec<PackageName>, SourceError>;
}

/// A package source that can also list every package it knows.
pub trait EnumerableSource: PackageSource {
    /// Every known package name, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns a `SourceError` if the package universe cannot be listed.
    fn list_all(&self) -> std::result::Result<Vec<PackageName>, SourceError>;
}

/// Kind of local fixture found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// A single adjacency-list text file.
    Text,
    /// A directory containing `.nuspec` files.
    NuspecDirectory,
}

impl FixtureKind {
    /// Detect which fixture format lives at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `path` is neither a file nor a directory.
    pub fn detect(path: &Path) -> Result<Self> {
        if path.is_file() {
            Ok(FixtureKind::Text)
        } else if path.is_dir() {
            Ok(FixtureKind::NuspecDirectory)
        } else {
            Err(Error::Config(format!(
                "'{}' is neither a file nor a directory",
                path.display()
            )))
        }
    }
}

/// A package source chosen at runtime.
pub enum SourceHandle {
    /// Live registry.
    Registry(RegistryClient),
    /// Adjacency-list text fixture.
    Text(TextFixture),
    /// Directory of `.nuspec` files.
    Directory(NuspecDirectory),
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceHandle::Registry(client) => f
                .debug_tuple("Registry")
                .field(&client.service_index_url())
                .finish(),
            SourceHandle::Text(fixture) => f.debug_tuple("Text").field(&fixture.len()).finish(),
            SourceHandle::Directory(dir) => f.debug_tuple("Directory").field(&dir.len()).finish(),
        }
    }
}

impl SourceHandle {
    /// Open a local fixture, detecting its format from the path.
    ///
    /// Fixture warnings (skipped lines, unreadable metadata files) are logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be read or holds no packages.
    pub fn open_fixture(path: &Path) -> Result<Self> {
        match FixtureKind::detect(path)? {
            FixtureKind::Text => {
                let (fixture, warnings) = TextFixture::load(path)?;
                for warning in &warnings {
                    tracing::warn!(path = %path.display(), "{warning}");
                }
                tracing::info!(packages = fixture.len(), "Loaded adjacency-list fixture");
                Ok(SourceHandle::Text(fixture))
            }
            FixtureKind::NuspecDirectory => {
                let dir = NuspecDirectory::load(path)?;
                tracing::info!(packages = dir.len(), "Loaded .nuspec fixture directory");
                Ok(SourceHandle::Directory(dir))
            }
        }
    }

    /// Connect to a live registry.
    pub fn registry(url: &str) -> Self {
        SourceHandle::Registry(RegistryClient::new(url))
    }

    /// The enumerable view of this source, if it has one.
    pub fn as_enumerable(&self) -> Option<&dyn EnumerableSource> {
        match self {
            SourceHandle::Registry(_) => None,
            SourceHandle::Text(fixture) => Some(fixture),
            SourceHandle::Directory(dir) => Some(dir),
        }
    }

    /// The enumerable view, or an `UnsupportedOperation` error.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedOperation` for sources that cannot list
    /// their packages.
    pub fn require_enumerable(&self) -> Result<&dyn EnumerableSource> {
        self.as_enumerable().ok_or_else(|| {
            Error::UnsupportedOperation(
                "reverse dependency analysis needs the full package list, which a live \
                 registry cannot provide; use a local fixture (--test-repo) instead"
                    .to_string(),
            )
        })
    }
}

impl PackageSource for SourceHandle {
    fn get_dependencies(
        &self,
        name: &PackageName,
    ) -> std::result::Result<Vec<PackageName>, SourceError> {
        match self {
            SourceHandle::Registry(client) => client.get_dependencies(name),
            SourceHandle::Text(fixture) => fixture.get_dependencies(name),
            SourceHandle::Directory(dir) => dir.get_dependencies(name),
        }
    }
}
