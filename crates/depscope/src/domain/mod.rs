//! Domain types for dependency analysis.
//!
//! This module contains the core types shared by package sources, the graph
//! builder, and the renderers.

use crate::error::SourceError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

/// Name of a package.
///
/// Compared case-sensitively everywhere except in name filters, which use a
/// case-insensitive substring match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring test used by name filters.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which relationship an [`AdjacencyMap`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `map[a]` lists the packages `a` requires.
    Forward,
    /// `map[a]` lists the packages that require `a`.
    Reverse,
}

impl Direction {
    /// Arrow used when printing one adjacency entry.
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Forward => "->",
            Direction::Reverse => "<-",
        }
    }

    /// Noun for the packages listed under a node.
    pub fn edge_noun(self) -> &'static str {
        match self {
            Direction::Forward => "dependencies",
            Direction::Reverse => "dependents",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Package name to ordered, duplicate-free list of related packages.
///
/// Keys keep the order in which their nodes were recorded, and every list
/// keeps the order the source reported. A key is present once its node has
/// been expanded, even when the list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyMap(IndexMap<PackageName, Vec<PackageName>>);

impl AdjacencyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node` with the given related packages, dropping repeats.
    ///
    /// Replaces any list already recorded for `node` but keeps its key position.
    pub fn insert<I>(&mut self, node: PackageName, related: I)
    where
        I: IntoIterator<Item = PackageName>,
    {
        let mut seen = HashSet::new();
        let list = related
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        self.0.insert(node, list);
    }

    /// Remove the single edge `from -> to`, returning whether it existed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let Some(list) = self.0.get_mut(from) else {
            return false;
        };
        let before = list.len();
        list.retain(|name| name.as_str() != to);
        list.len() != before
    }

    /// Related packages recorded for `node`.
    pub fn get(&self, node: &str) -> Option<&[PackageName]> {
        self.0.get(node).map(Vec::as_slice)
    }

    /// Whether `node` has been recorded.
    pub fn contains(&self, node: &str) -> bool {
        self.0.contains_key(node)
    }

    /// Iterate entries in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &[PackageName])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Recorded package names in recording order.
    pub fn keys(&self) -> impl Iterator<Item = &PackageName> {
        self.0.keys()
    }

    /// Number of recorded packages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of edges across all lists.
    pub fn edge_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Recorded packages whose list is empty, in recording order.
    pub fn leaves(&self) -> Vec<&PackageName> {
        self.0
            .iter()
            .filter(|(_, list)| list.is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Flip every edge `a -> b` into `b -> a`.
    ///
    /// Targets appear in the order they are first met while walking the map;
    /// each target's list is in source-key order. Packages with no incoming
    /// edges are not keys of the result.
    pub fn invert(&self) -> AdjacencyMap {
        let mut inverted: IndexMap<PackageName, Vec<PackageName>> = IndexMap::new();
        for (from, targets) in &self.0 {
            for to in targets {
                let list = inverted.entry(to.clone()).or_default();
                if !list.contains(from) {
                    list.push(from.clone());
                }
            }
        }
        AdjacencyMap(inverted)
    }
}

impl FromIterator<(PackageName, Vec<PackageName>)> for AdjacencyMap {
    fn from_iter<T: IntoIterator<Item = (PackageName, Vec<PackageName>)>>(iter: T) -> Self {
        let mut map = AdjacencyMap::new();
        for (node, related) in iter {
            map.insert(node, related);
        }
        map
    }
}

/// A dependency chain that returns to a package already on it.
///
/// The first and last elements name the same package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cycle(pub Vec<PackageName>);

impl Cycle {
    /// The edge that closed the cycle, as `(depender, dependency)`.
    ///
    /// The builder drops this edge from the recorded map.
    pub fn closing_edge(&self) -> Option<(&PackageName, &PackageName)> {
        match self.0.as_slice() {
            [.., from, to] => Some((from, to)),
            _ => None,
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(PackageName::as_str).collect();
        write!(f, "{}", names.join(" -> "))
    }
}

/// A package whose lookup failed during traversal and was treated as a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFailure {
    /// The package that could not be looked up.
    pub package: PackageName,
    /// Why the lookup failed.
    #[serde(serialize_with = "serialize_display")]
    pub error: SourceError,
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// Limits applied while walking the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Nodes at this depth or deeper are not expanded (root is depth 0).
    pub max_depth: Option<usize>,
    /// Only nodes whose name contains this substring are expanded.
    pub filter: Option<String>,
    /// Nodes whose name contains this substring are never expanded.
    pub exclude: Option<String>,
}

impl TraversalOptions {
    /// Options with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set the include filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the exclude filter.
    #[must_use]
    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    /// Whether `depth` is past the depth limit.
    pub fn depth_exceeded(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }

    /// Whether the name filters let `name` through.
    pub fn admits(&self, name: &PackageName) -> bool {
        let included = self
            .filter
            .as_deref()
            .is_none_or(|needle| name.contains_ignore_case(needle));
        let excluded = self
            .exclude
            .as_deref()
            .is_some_and(|needle| name.contains_ignore_case(needle));
        included && !excluded
    }
}

/// Result of one graph construction.
///
/// The adjacency map is always paired with its [`Direction`]: in a reverse
/// graph, `edges[a]` lists the packages that depend on `a`.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyGraph {
    /// Package the traversal started from.
    pub root: PackageName,
    /// Meaning of the recorded edges.
    pub direction: Direction,
    /// Recorded nodes and their edges.
    pub edges: AdjacencyMap,
    /// Cycles found along traversal paths, in discovery order.
    pub cycles: Vec<Cycle>,
    /// Packages whose lookup failed and were treated as leaves.
    pub failures: Vec<LookupFailure>,
}

impl DependencyGraph {
    /// Create an empty graph for `root`.
    pub fn new(root: PackageName, direction: Direction) -> Self {
        Self {
            root,
            direction,
            edges: AdjacencyMap::new(),
            cycles: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether any traversal path revisited one of its own ancestors.
    pub fn cycle_detected(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Whether an edge leaving `name` was dropped to break a cycle.
    pub fn has_cut_edge(&self, name: &str) -> bool {
        self.cycles
            .iter()
            .filter_map(Cycle::closing_edge)
            .any(|(from, _)| from.as_str() == name)
    }

    /// Recorded packages with no dependencies, in recording order.
    ///
    /// A package whose list is only empty because a cycle-closing edge was
    /// dropped still has a dependency, so it is not a leaf.
    pub fn leaves(&self) -> Vec<&PackageName> {
        self.edges
            .leaves()
            .into_iter()
            .filter(|name| !self.has_cut_edge(name.as_str()))
            .collect()
    }

    /// Number of recorded packages.
    pub fn package_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of recorded edges.
    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }
}
