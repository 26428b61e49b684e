//! Dependency graph construction.
//!
//! [`GraphBuilder`] walks package relationships depth-first from a root and
//! records what it finds in a [`DependencyGraph`]:
//!
//! - **Forward** graphs follow [`PackageSource::get_dependencies`] directly.
//! - **Reverse** graphs first read the whole package universe from an
//!   [`EnumerableSource`], invert it into a [`ReverseIndex`], and then walk
//!   the inverted edges, so each recorded list holds *dependents*.
//!
//! # Traversal rules
//!
//! Each time a package is reached, these checks run in order:
//!
//! 1. Depth at or past `max_depth`: stop, the package is not recorded.
//! 2. Package already on the current path: a cycle. It is recorded on the
//!    result, and the edge that closed it is dropped from the parent's list.
//! 3. Name rejected by the include/exclude filters: stop, not recorded.
//! 4. Package already expanded through another path: stop.
//! 5. Otherwise look up its relations, record them, and descend into each.
//!
//! Cycle detection is path-local: a package reached twice through different
//! branches is only a cycle if it is its own ancestor. The walk uses an
//! explicit stack of frames, so deep graphs do not exhaust the call stack.
//!
//! With a depth limit, a package cut at the limit stays listed under its
//! parent and may be expanded later through a shorter path. Its recorded
//! edges can then close a cycle the walk never saw on one path. Once the
//! walk ends, any cycle left in the recorded map is found, recorded and
//! broken the same way, so the result is always acyclic.
//!
//! A failed lookup never aborts the walk. The failure is logged and kept on
//! the result, and the package is recorded as having no relations.

pub mod levels;
mod reverse;

pub use levels::{LevelReport, dependency_level};
pub use reverse::ReverseIndex;

use crate::domain::{
    AdjacencyMap, Cycle, DependencyGraph, Direction, LookupFailure, PackageName,
    TraversalOptions,
};
use crate::error::{Result, SourceError};
use crate::source::{EnumerableSource, PackageSource};
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet, VecDeque};

/// Builds forward and reverse dependency graphs.
///
/// The builder only holds the traversal limits. Visited set, path stack and
/// adjacency map are created fresh for every build.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    options: TraversalOptions,
}

impl GraphBuilder {
    /// Create a builder with the given traversal limits.
    pub fn new(options: TraversalOptions) -> Self {
        Self { options }
    }

    /// Traversal limits in use.
    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    /// Walk the packages `root` requires.
    pub fn build_forward<S>(&self, root: PackageName, source: &S) -> DependencyGraph
    where
        S: PackageSource + ?Sized,
    {
        tracing::info!(root = %root, "Building forward dependency graph");
        let mut walk = Walk::new(root, Direction::Forward, &self.options);
        walk.run(|name| source.get_dependencies(name));
        walk.finish()
    }

    /// Walk the packages that require `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot list its packages. Lookup
    /// failures for individual packages are recorded on the result instead,
    /// for the packages the walk recorded.
    pub fn build_reverse<S>(&self, root: PackageName, source: &S) -> Result<DependencyGraph>
    where
        S: EnumerableSource + ?Sized,
    {
        tracing::info!(root = %root, "Building reverse dependency graph");
        let index = ReverseIndex::build(source)?;

        let mut walk = Walk::new(root, Direction::Reverse, &self.options);
        walk.run(|name| Ok(index.dependents(name.as_str()).to_vec()));

        let recorded = &walk.graph.edges;
        walk.graph.failures = index
            .failures()
            .iter()
            .filter(|failure| recorded.contains(failure.package.as_str()))
            .cloned()
            .collect();
        let unreached = index.failures().len() - walk.graph.failures.len();
        if unreached > 0 {
            tracing::debug!(unreached, "Lookup failures outside the reverse graph ignored");
        }
        Ok(walk.finish())
    }
}

/// One expanded package on the traversal stack.
struct Frame {
    node: PackageName,
    depth: usize,
    related: Vec<PackageName>,
    next: usize,
}

/// State of a single build.
struct Walk<'a> {
    options: &'a TraversalOptions,
    graph: DependencyGraph,
    visited: HashSet<PackageName>,
    // Mirrors the nodes in `stack`.
    on_path: HashSet<PackageName>,
    stack: Vec<Frame>,
}

impl<'a> Walk<'a> {
    fn new(root: PackageName, direction: Direction, options: &'a TraversalOptions) -> Self {
        Self {
            options,
            graph: DependencyGraph::new(root, direction),
            visited: HashSet::new(),
            on_path: HashSet::new(),
            stack: Vec::new(),
        }
    }

    fn run<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&PackageName) -> std::result::Result<Vec<PackageName>, SourceError>,
    {
        let root = self.graph.root.clone();
        self.enter(root, 0, &mut lookup);

        while let Some(frame) = self.stack.last_mut() {
            if let Some(child) = frame.related.get(frame.next).cloned() {
                frame.next += 1;
                let depth = frame.depth + 1;
                self.enter(child, depth, &mut lookup);
            } else if let Some(done) = self.stack.pop() {
                self.on_path.remove(&done.node);
            }
        }
    }

    fn enter<F>(&mut self, node: PackageName, depth: usize, lookup: &mut F)
    where
        F: FnMut(&PackageName) -> std::result::Result<Vec<PackageName>, SourceError>,
    {
        if self.options.depth_exceeded(depth) {
            tracing::trace!(package = %node, depth, "Depth limit reached");
            return;
        }
        if self.on_path.contains(&node) {
            self.record_cycle(&node);
            return;
        }
        if !self.options.admits(&node) {
            tracing::debug!(package = %node, "Skipped by name filter");
            return;
        }
        if !self.visited.insert(node.clone()) {
            return;
        }

        tracing::debug!(package = %node, depth, "Expanding package");
        let related = match lookup(&node) {
            Ok(related) => related,
            Err(error) => {
                tracing::warn!(package = %node, %error, "Lookup failed, treating as leaf");
                self.graph.failures.push(LookupFailure {
                    package: node.clone(),
                    error,
                });
                Vec::new()
            }
        };
        self.graph.edges.insert(node.clone(), related);
        let related = self
            .graph
            .edges
            .get(node.as_str())
            .map(<[PackageName]>::to_vec)
            .unwrap_or_default();

        self.on_path.insert(node.clone());
        self.stack.push(Frame {
            node,
            depth,
            related,
            next: 0,
        });
    }

    /// `node` is an ancestor of the top frame: keep the chain, drop the edge.
    fn record_cycle(&mut self, node: &PackageName) {
        let start = self
            .stack
            .iter()
            .position(|frame| &frame.node == node)
            .unwrap_or(0);
        let mut chain: Vec<PackageName> = self.stack[start..]
            .iter()
            .map(|frame| frame.node.clone())
            .collect();
        chain.push(node.clone());
        let cycle = Cycle(chain);
        tracing::warn!(%cycle, "Circular dependency detected");

        if let Some(parent) = self.stack.last() {
            self.graph
                .edges
                .remove_edge(parent.node.as_str(), node.as_str());
        }
        self.graph.cycles.push(cycle);
    }

    fn finish(mut self) -> DependencyGraph {
        break_residual_cycles(&mut self.graph);
        tracing::info!(
            direction = %self.graph.direction,
            packages = self.graph.package_count(),
            edges = self.graph.edge_count(),
            cycles = self.graph.cycles.len(),
            failures = self.graph.failures.len(),
            "Graph built"
        );
        self.graph
    }
}

/// Record and break every cycle left in the recorded map.
fn break_residual_cycles(graph: &mut DependencyGraph) {
    while let Some(cycle) = find_recorded_cycle(&graph.edges) {
        tracing::warn!(%cycle, "Circular dependency detected among recorded packages");
        if let Some((from, to)) = cycle.closing_edge() {
            graph.edges.remove_edge(from.as_str(), to.as_str());
        }
        graph.cycles.push(cycle);
    }
}

/// Shortest cycle through the first recorded package that lies on one.
fn find_recorded_cycle(edges: &AdjacencyMap) -> Option<Cycle> {
    let (graph, _) = levels::recorded_digraph(edges);
    let on_cycle: HashSet<NodeIndex> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .flatten()
        .collect();
    let start = graph.node_indices().find(|node| on_cycle.contains(node))?;

    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if next == start {
                // Walk the parents back from `node`; `start` has none.
                let mut back = vec![node];
                let mut cursor = node;
                while let Some(&prev) = parent.get(&cursor) {
                    back.push(prev);
                    cursor = prev;
                }
                let mut chain: Vec<PackageName> =
                    back.iter().rev().map(|&n| PackageName::clone(graph[n])).collect();
                chain.push(PackageName::clone(graph[start]));
                return Some(Cycle(chain));
            }
            if !parent.contains_key(&next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    None
}
