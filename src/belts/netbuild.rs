//! Glue between string-keyed [`BeltsGraph`](super::graph::BeltsGraph)
//! instances and the index-based [`FlowNetwork`](super::maxflow::FlowNetwork)
//! the max-flow oracle operates on, plus the shared min-cut
//! certificate-extraction routine used by both the feasibility check (§4.3)
//! and the production throughput check (§4.4).

use std::collections::BTreeMap;

use super::maxflow::{max_flow, FlowNetwork, MaxFlowResult};
use crate::numeric::{approx_eq, EPS};

/// A [`FlowNetwork`] paired with the string id bookkeeping needed to map
/// results back to the caller's node/edge names.
pub struct IndexedNetwork {
    network: FlowNetwork,
    id_to_idx: BTreeMap<String, usize>,
    idx_to_id: Vec<String>,
    /// Original (from, to, edge_idx) triples, in insertion order, for edges
    /// that should be reported back to the caller (as opposed to pure
    /// bookkeeping edges like synthetic-source fan-out).
    reportable_edges: Vec<(String, String, usize)>,
}

impl IndexedNetwork {
    /// Start building a network, pre-registering `ids` (in the order given)
    /// so index assignment is deterministic and independent of edge
    /// insertion order.
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        let mut id_to_idx = BTreeMap::new();
        let mut idx_to_id = Vec::new();
        for id in ids {
            id_to_idx.entry(id.clone()).or_insert_with(|| {
                idx_to_id.push(id);
                idx_to_id.len() - 1
            });
        }
        let n = idx_to_id.len();
        Self {
            network: FlowNetwork::new(n),
            id_to_idx,
            idx_to_id,
            reportable_edges: Vec::new(),
        }
    }

    /// Index of an id that was pre-registered via [`IndexedNetwork::new`].
    ///
    /// Panics if `id` was not pre-registered: every id an edge can mention
    /// (graph nodes, the sink, any synthetic source/super-source/super-sink)
    /// must be known before the first edge is added, which every caller in
    /// this crate arranges by construction.
    fn index_of(&self, id: &str) -> usize {
        *self
            .id_to_idx
            .get(id)
            .unwrap_or_else(|| panic!("node '{id}' was not pre-registered on this network"))
    }

    /// Add an edge that should be reported back in a certificate/flow list.
    pub fn add_reportable_edge(&mut self, from: &str, to: &str, capacity: f64) {
        let u = self.index_of(from);
        let v = self.index_of(to);
        let edge_idx = self.network.add_edge(u, v, capacity);
        self.reportable_edges.push((from.to_string(), to.to_string(), edge_idx));
    }

    /// Add a bookkeeping edge (e.g. super-source/super-sink fan-out) that is
    /// never reported back to the caller.
    pub fn add_internal_edge(&mut self, from: &str, to: &str, capacity: f64) {
        let u = self.index_of(from);
        let v = self.index_of(to);
        self.network.add_edge(u, v, capacity);
    }

    /// Run max-flow from `source` to `sink` (by id) and return the solved
    /// network together with the bookkeeping needed to read it back.
    pub fn solve(self, source: &str, sink: &str) -> SolvedNetwork {
        let source_idx = self.id_to_idx[source];
        let sink_idx = self.id_to_idx[sink];
        let MaxFlowResult { value, network } = max_flow(self.network, source_idx, sink_idx);
        SolvedNetwork {
            network,
            value,
            source_idx,
            idx_to_id: self.idx_to_id,
            reportable_edges: self.reportable_edges,
        }
    }
}

/// A solved [`IndexedNetwork`], ready for flow/certificate extraction.
pub struct SolvedNetwork {
    network: FlowNetwork,
    /// Maximum flow value achieved.
    pub value: f64,
    source_idx: usize,
    idx_to_id: Vec<String>,
    reportable_edges: Vec<(String, String, usize)>,
}

impl SolvedNetwork {
    /// Flow on each reportable edge whose magnitude exceeds [`EPS`], as
    /// `(from, to, flow)`.
    pub fn nonzero_flows(&self) -> Vec<(String, String, f64)> {
        self.reportable_edges
            .iter()
            .filter_map(|(from, to, idx)| {
                let f = self.network.flow_on(*idx);
                if f.abs() > EPS {
                    Some((from.clone(), to.clone(), f))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Minimum-cut certificate: the set of node ids reachable from the
    /// source in the residual graph, with `excluded` ids (synthetic
    /// source/sink nodes) removed, plus the "tight" reportable edges
    /// crossing the cut (source side -> sink side, saturated within
    /// [`EPS`]).
    pub fn certificate(&self, excluded: &[&str]) -> Certificate {
        let reach_mask = self.network.reachable_from(self.source_idx);
        let reach: std::collections::BTreeSet<&str> = self
            .idx_to_id
            .iter()
            .enumerate()
            .filter(|(i, id)| reach_mask[*i] && !excluded.contains(&id.as_str()))
            .map(|(_, id)| id.as_str())
            .collect();

        let mut tight = Vec::new();
        for (from, to, idx) in &self.reportable_edges {
            if excluded.contains(&from.as_str()) || excluded.contains(&to.as_str()) {
                continue;
            }
            let u_reach = reach.contains(from.as_str());
            let v_reach = reach.contains(to.as_str());
            if u_reach && !v_reach {
                let cap = self.network.capacity_of(*idx);
                let flow = self.network.flow_on(*idx);
                if approx_eq(flow, cap) {
                    tight.push((from.clone(), to.clone(), cap));
                }
            }
        }

        Certificate {
            cut_reachable: reach.into_iter().map(str::to_string).collect(),
            tight_edges: tight,
        }
    }
}

/// Minimum-cut certificate extracted after an infeasible max-flow.
pub struct Certificate {
    /// Node ids reachable from the source, sorted.
    pub cut_reachable: Vec<String>,
    /// Tight (saturated) edges crossing the cut, as `(from, to, capacity)`.
    pub tight_edges: Vec<(String, String, f64)>,
}
