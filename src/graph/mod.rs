//! Call Graph
//!
//! The callee mapping extracted from a binary and the pure algorithms that
//! schedule summarization over it.

mod analyzer;

pub use analyzer::{render_call_tree, subgraph, topological_order, transitive_dependencies};

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Function name → callee names
///
/// Callee lists are de-duplicated on insertion while keeping their
/// first-occurrence order, which is the order callees appear in prompts.
/// Callees need not be keys themselves (true leaves).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
pub struct CallGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(caller, callees)` pairs
    pub fn from_edges<I, K, C, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (caller, callees) in edges {
            graph.insert(caller, callees);
        }
        graph
    }

    /// Set the callees of `caller`, replacing any previous entry
    pub fn insert<C, S>(&mut self, caller: impl Into<String>, callees: C)
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let deduped: Vec<String> = callees
            .into_iter()
            .map(Into::into)
            .filter(|callee: &String| seen.insert(callee.clone()))
            .collect();
        self.edges.insert(caller.into(), deduped);
    }

    /// Callees of `name`; empty for leaves and unknown names
    pub fn callees(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `name` is a key of the graph
    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Keys in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// `(caller, callees)` pairs in lexicographic caller order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges
            .iter()
            .map(|(caller, callees)| (caller.as_str(), callees.as_slice()))
    }

    /// Every name mentioned anywhere: keys and callees
    pub fn all_names(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.names().collect();
        for callees in self.edges.values() {
            names.extend(callees.iter().map(String::as_str));
        }
        names
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

impl From<BTreeMap<String, Vec<String>>> for CallGraph {
    fn from(edges: BTreeMap<String, Vec<String>>) -> Self {
        Self::from_edges(edges)
    }
}
