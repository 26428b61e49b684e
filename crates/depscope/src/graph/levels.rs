//! Dependency level analysis of forward graphs.
//!
//! A package's level is `0` when it has no dependencies, and otherwise one
//! more than the highest level among its recorded dependencies. Dependencies
//! that were listed but never recorded (pruned by depth or filter) count as
//! level `0`, and so does the dependency behind an edge dropped to break a
//! cycle: such a package sits at level `1` or above, never among the leaves.
//!
//! Levels are only defined on acyclic maps. The builder leaves none behind,
//! but maps built elsewhere may still contain one, so the graph is
//! topologically sorted first and a cycle is reported as an error instead of
//! recursing forever.

use crate::domain::{AdjacencyMap, DependencyGraph, Direction, PackageName};
use crate::error::{Error, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

/// Packages of a forward graph grouped by dependency level.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LevelReport {
    /// Level to the packages on it, names sorted.
    pub levels: BTreeMap<usize, Vec<PackageName>>,
    /// Packages with no dependencies, sorted.
    pub leaves: Vec<PackageName>,
}

impl LevelReport {
    /// Highest level present, if any package was recorded.
    pub fn max_level(&self) -> Option<usize> {
        self.levels.keys().next_back().copied()
    }
}

/// Group the packages of `graph` by level.
///
/// # Errors
///
/// - `Error::UnsupportedOperation` for reverse graphs
/// - `Error::CyclicGraph` if the adjacency map still contains a cycle
pub fn analyze(graph: &DependencyGraph) -> Result<LevelReport> {
    if graph.direction != Direction::Forward {
        return Err(Error::UnsupportedOperation(
            "dependency levels are only defined for forward graphs".to_string(),
        ));
    }

    let mut levels: BTreeMap<usize, Vec<PackageName>> = BTreeMap::new();
    for (name, level) in compute_levels(&graph.edges, |name| graph.has_cut_edge(name))? {
        levels.entry(level).or_default().push(name.clone());
    }
    for names in levels.values_mut() {
        names.sort();
    }

    let mut leaves: Vec<PackageName> = graph.leaves().into_iter().cloned().collect();
    leaves.sort();

    Ok(LevelReport { levels, leaves })
}

/// Level of a single package in `map`.
///
/// Packages that are not keys of the map are at level `0`.
///
/// # Errors
///
/// Returns `Error::CyclicGraph` if `map` contains a cycle.
pub fn dependency_level(node: &str, map: &AdjacencyMap) -> Result<usize> {
    Ok(compute_levels(map, |_| false)?
        .into_iter()
        .find(|(name, _)| name.as_str() == node)
        .map_or(0, |(_, level)| level))
}

/// The recorded part of `map` as a petgraph graph.
///
/// Nodes are added in recording order; edges to packages that are not keys
/// are left out.
pub(super) fn recorded_digraph(
    map: &AdjacencyMap,
) -> (DiGraph<&PackageName, ()>, HashMap<&str, NodeIndex>) {
    let mut graph: DiGraph<&PackageName, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for name in map.keys() {
        index.insert(name.as_str(), graph.add_node(name));
    }
    for (from, dependencies) in map.iter() {
        let Some(&from) = index.get(from.as_str()) else {
            continue;
        };
        for dependency in dependencies {
            if let Some(&to) = index.get(dependency.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }
    (graph, index)
}

fn compute_levels<F>(map: &AdjacencyMap, has_cut_edge: F) -> Result<Vec<(&PackageName, usize)>>
where
    F: Fn(&str) -> bool,
{
    let (graph, index) = recorded_digraph(map);

    let order = toposort(&graph, None).map_err(|cycle| Error::CyclicGraph {
        package: graph[cycle.node_id()].to_string(),
    })?;

    // Dependencies come after their dependers in `order`.
    let mut levels: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
    for &node in order.iter().rev() {
        let name = graph[node].as_str();
        let has_dependencies =
            map.get(name).is_some_and(|deps| !deps.is_empty()) || has_cut_edge(name);
        let level = if has_dependencies {
            1 + graph
                .neighbors(node)
                .filter_map(|dep| levels.get(&dep).copied())
                .max()
                .unwrap_or(0)
        } else {
            0
        };
        levels.insert(node, level);
    }

    Ok(map
        .keys()
        .filter_map(|name| {
            let node = index.get(name.as_str())?;
            Some((name, levels.get(node).copied().unwrap_or(0)))
        })
        .collect())
}
