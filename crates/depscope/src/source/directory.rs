//! Offline package universe built from a directory of `.nuspec` files.

use super::nuspec;
use super::{EnumerableSource, PackageSource};
use crate::domain::{AdjacencyMap, PackageName};
use crate::error::{Error, Result, SourceError};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Packages read from every `.nuspec` file below a directory.
#[derive(Debug, Clone, Default)]
pub struct NuspecDirectory {
    packages: AdjacencyMap,
}

impl NuspecDirectory {
    /// Scan `root` recursively, in file-name order, for `.nuspec` files.
    ///
    /// Files that cannot be read or parsed, or that lack a package id, are
    /// skipped with a warning. When two files declare the same id, the later
    /// one wins.
    ///
    /// # Errors
    ///
    /// Returns an error if no `.nuspec` files exist or none of them loads.
    pub fn load(root: &Path) -> Result<Self> {
        let mut packages = AdjacencyMap::new();
        let mut found = 0usize;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("nuspec")
            {
                continue;
            }
            found += 1;

            match load_manifest(path) {
                Ok((id, dependencies)) => {
                    tracing::debug!(package = %id, path = %path.display(), "Loaded manifest");
                    packages.insert(id, dependencies);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping .nuspec file");
                }
            }
        }

        if found == 0 {
            return Err(Error::Config(format!(
                "no .nuspec files found in '{}'",
                root.display()
            )));
        }
        if packages.is_empty() {
            return Err(Error::Source(SourceError::Parse(format!(
                "none of the {found} .nuspec files in '{}' could be loaded",
                root.display()
            ))));
        }

        Ok(Self { packages })
    }

    /// Number of loaded packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether no packages were loaded.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn load_manifest(path: &Path) -> std::result::Result<(PackageName, Vec<PackageName>), SourceError> {
    let xml = fs::read_to_string(path)?;
    let manifest = nuspec::parse(&xml)?;
    let id = manifest
        .id
        .ok_or_else(|| SourceError::Parse("manifest has no metadata/id".to_string()))?;
    Ok((id, manifest.dependencies))
}

impl PackageSource for NuspecDirectory {
    fn get_dependencies(
        &self,
        name: &PackageName,
    ) -> std::result::Result<Vec<PackageName>, SourceError> {
        self.packages
            .get(name.as_str())
            .map(<[PackageName]>::to_vec)
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}

impl EnumerableSource for NuspecDirectory {
    fn list_all(&self) -> std::result::Result<Vec<PackageName>, SourceError> {
        Ok(self.packages.keys().cloned().collect())
    }
}
