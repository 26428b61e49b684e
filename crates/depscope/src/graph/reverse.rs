//! Reverse index over a whole package universe.

use crate::domain::{AdjacencyMap, LookupFailure, PackageName};
use crate::error::Result;
use crate::source::EnumerableSource;

/// Dependents of every package in an enumerable source.
///
/// Built by reading the forward dependencies of every listed package and
/// inverting them. Dependents are listed in the order their dependers were
/// enumerated.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    forward: AdjacencyMap,
    dependents: AdjacencyMap,
    failures: Vec<LookupFailure>,
}

impl ReverseIndex {
    /// Read every package from `source` and invert the result.
    ///
    /// A package whose dependencies cannot be read counts as depending on
    /// nothing; the failure is kept on the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot list its packages.
    pub fn build<S>(source: &S) -> Result<Self>
    where
        S: EnumerableSource + ?Sized,
    {
        let all = source.list_all()?;
        tracing::debug!(packages = all.len(), "Indexing package universe");

        let mut forward = AdjacencyMap::new();
        let mut failures = Vec::new();
        for package in all {
            let dependencies = match source.get_dependencies(&package) {
                Ok(dependencies) => dependencies,
                Err(error) => {
                    tracing::warn!(package = %package, %error, "Lookup failed while indexing");
                    failures.push(LookupFailure {
                        package: package.clone(),
                        error,
                    });
                    Vec::new()
                }
            };
            forward.insert(package, dependencies);
        }

        let dependents = forward.invert();
        tracing::debug!(
            packages = forward.len(),
            depended_on = dependents.len(),
            "Reverse index built"
        );
        Ok(Self {
            forward,
            dependents,
            failures,
        })
    }

    /// Packages that directly depend on `name`. Empty if none do.
    pub fn dependents(&self, name: &str) -> &[PackageName] {
        self.dependents.get(name).unwrap_or_default()
    }

    /// Forward adjacency of the whole universe, as read from the source.
    pub fn forward(&self) -> &AdjacencyMap {
        &self.forward
    }

    /// Packages whose lookup failed while indexing.
    pub fn failures(&self) -> &[LookupFailure] {
        &self.failures
    }
}
