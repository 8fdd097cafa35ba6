//! Belts graph data model (§3).
//!
//! Mirrors the reference `FlowGraph` class: a node set, an edge map keyed by
//! `(from, to)`, a source/supply table, a declared sink, and per-node
//! capacities. Storage is backed by [`petgraph::graph::DiGraph`] (as in the
//! teacher codebase's `graph` module) with a name index for string-keyed
//! lookups; the transforms in `belts::transform` build fresh `BeltsGraph`
//! values rather than mutating in place, matching the functional style of
//! the reference implementation's transform functions.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Error, Result};

/// Lower and upper flow bounds on an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeBounds {
    /// Minimum flow that must traverse the edge.
    pub lo: f64,
    /// Maximum flow the edge can carry (`f64::INFINITY` for unbounded).
    pub hi: f64,
}

/// A directed flow network with lower/upper edge bounds, optional node
/// capacities, fixed per-source supplies, and a single sink.
#[derive(Debug, Clone, Default)]
pub struct BeltsGraph {
    graph: DiGraph<String, EdgeBounds>,
    index: BTreeMap<String, NodeIndex>,
    /// Node ids that appear as some edge's endpoint — the node set induced
    /// by edges (§3), independent of `index` (which also registers ids that
    /// only ever appear as a declared node capacity, source, or sink).
    edge_node_ids: BTreeSet<String>,
    /// Supply required to leave the network at each source, by node id.
    pub sources: BTreeMap<String, f64>,
    /// The single global sink, if declared.
    pub sink: Option<String>,
    /// Declared node throughput caps, by node id.
    pub node_caps: BTreeMap<String, f64>,
}

impl BeltsGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn node_index(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Insert (or overwrite) a directed edge `u -> v` with the given bounds.
    pub fn add_edge(&mut self, u: &str, v: &str, lo: f64, hi: f64) {
        let ui = self.node_index(u);
        let vi = self.node_index(v);
        self.edge_node_ids.insert(u.to_string());
        self.edge_node_ids.insert(v.to_string());
        if let Some(existing) = self.graph.find_edge(ui, vi) {
            self.graph[existing] = EdgeBounds { lo, hi };
        } else {
            self.graph.add_edge(ui, vi, EdgeBounds { lo, hi });
        }
    }

    /// Declare a node capacity.
    pub fn add_node_capacity(&mut self, node: &str, cap: f64) {
        self.node_index(node);
        self.node_caps.insert(node.to_string(), cap);
    }

    /// Declare a source with a fixed supply.
    pub fn add_source(&mut self, node: &str, supply: f64) {
        self.node_index(node);
        self.sources.insert(node.to_string(), supply);
    }

    /// Set the global sink.
    pub fn set_sink(&mut self, node: &str) {
        self.node_index(node);
        self.sink = Some(node.to_string());
    }

    /// Returns true if `id` appears as some edge's endpoint — the node set
    /// induced by edges (§3). Not satisfied merely by declaring `id` as a
    /// source, a sink, or a node capacity with no edge ever naming it; used
    /// to validate that a declared source/sink actually participates in the
    /// graph (§7).
    pub fn is_edge_node(&self, id: &str) -> bool {
        self.edge_node_ids.contains(id)
    }

    /// All node ids, in sorted order.
    pub fn node_ids(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// All edges as `(from, to, bounds)`, in insertion order.
    pub fn edges(&self) -> Vec<(String, String, EdgeBounds)> {
        self.graph
            .edge_indices()
            .map(|e| {
                let (u, v) = self.graph.edge_endpoints(e).unwrap();
                (
                    self.graph[u].clone(),
                    self.graph[v].clone(),
                    self.graph[e],
                )
            })
            .collect()
    }

    /// Bounds of a specific edge, if present.
    pub fn edge_bounds(&self, u: &str, v: &str) -> Option<EdgeBounds> {
        let ui = *self.index.get(u)?;
        let vi = *self.index.get(v)?;
        let e = self.graph.find_edge(ui, vi)?;
        Some(self.graph[e])
    }

    /// Structural validity check performed before any transform (§7, input
    /// shape/semantics).
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::invalid_input("no sources specified"));
        }
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| Error::invalid_input("no sink specified"))?;
        if self.graph.edge_count() == 0 {
            return Err(Error::invalid_input("no edges defined"));
        }
        if !self.is_edge_node(sink) {
            return Err(Error::invalid_input(format!("sink '{sink}' missing from graph")));
        }
        for s in self.sources.keys() {
            if !self.is_edge_node(s) {
                return Err(Error::invalid_input(format!("source '{s}' missing from graph")));
            }
        }
        for (u, v, bounds) in self.edges() {
            if bounds.lo < 0.0 {
                return Err(Error::invalid_input(format!(
                    "edge {u}->{v} has negative lower bound"
                )));
            }
            if bounds.hi < bounds.lo {
                return Err(Error::invalid_input(format!(
                    "edge {u}->{v} has capacity below its lower bound"
                )));
            }
        }
        for s in self.sources.values() {
            if *s < 0.0 {
                return Err(Error::invalid_input("source supply must be non-negative"));
            }
        }
        for id in self.index.keys() {
            if id.ends_with("_in") || id.ends_with("_out") {
                return Err(Error::invalid_input(format!(
                    "node id '{id}' collides with the node-splitting suffix scheme"
                )));
            }
        }
        Ok(())
    }

    /// Total declared supply across all sources.
    pub fn total_supply(&self) -> f64 {
        self.sources.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_sink() {
        let mut g = BeltsGraph::new();
        g.add_edge("a", "b", 0.0, 10.0);
        g.add_source("a", 5.0);
        assert!(g.validate().is_err());
    }

    #[test]
    fn validate_rejects_sink_absent_from_edges() {
        let mut g = BeltsGraph::new();
        g.add_edge("a", "b", 0.0, 10.0);
        g.add_source("a", 5.0);
        // "z" is declared as the sink but never named by any edge.
        g.set_sink("z");
        assert!(g.validate().is_err());
    }

    #[test]
    fn validate_rejects_source_absent_from_edges() {
        let mut g = BeltsGraph::new();
        g.add_edge("a", "b", 0.0, 10.0);
        // "z" is declared as a source but never named by any edge.
        g.add_source("z", 5.0);
        g.set_sink("b");
        assert!(g.validate().is_err());
    }

    #[test]
    fn validate_rejects_reserved_suffix() {
        let mut g = BeltsGraph::new();
        g.add_edge("a_out", "b", 0.0, 10.0);
        g.add_source("a_out", 5.0);
        g.set_sink("b");
        assert!(g.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_graph() {
        let mut g = BeltsGraph::new();
        g.add_edge("a", "b", 0.0, 10.0);
        g.add_source("a", 5.0);
        g.set_sink("b");
        assert!(g.validate().is_ok());
    }
}
