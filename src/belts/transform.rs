//! Graph transforms: node-splitting (§4.1) and lower-bound elimination
//! (§4.2). Each transform builds a fresh [`BeltsGraph`] rather than
//! mutating in place, matching the reference implementation's
//! `split_nodes_for_capacity`/`transform_lower_bounds` functions.

use std::collections::BTreeMap;

use super::graph::BeltsGraph;
use crate::numeric::EPS;

/// Replace every node with a declared capacity (that is neither a source nor
/// the sink) by an `{node}_in -> {node}_out` pair, redirecting incoming
/// edges to `_in` and outgoing edges from `_out`. The new internal edge
/// carries `[0, cap(node)]`.
pub fn split_nodes_for_capacity(base: &BeltsGraph) -> BeltsGraph {
    let mut out = BeltsGraph::new();
    out.sources = base.sources.clone();
    out.sink = base.sink.clone();

    let split: std::collections::BTreeSet<&String> = base
        .node_caps
        .keys()
        .filter(|n| !base.sources.contains_key(*n) && base.sink.as_deref() != Some(n.as_str()))
        .collect();

    for (u, v, bounds) in base.edges() {
        let u_out = if split.contains(&u) {
            format!("{u}_out")
        } else {
            u.clone()
        };
        let v_in = if split.contains(&v) {
            format!("{v}_in")
        } else {
            v.clone()
        };
        out.add_edge(&u_out, &v_in, bounds.lo, bounds.hi);
    }

    for node in &split {
        let cap = base.node_caps[*node];
        out.add_edge(&format!("{node}_in"), &format!("{node}_out"), 0.0, cap);
    }

    out
}

/// Shift every edge's lower bound out of the system: replace `(u, v, lo, hi)`
/// with `(u, v, 0, hi - lo)` and accumulate the per-node imbalance
/// `b(n) = sum(lo into n) - sum(lo out of n)`.
pub fn eliminate_lower_bounds(base: &BeltsGraph) -> (BeltsGraph, BTreeMap<String, f64>) {
    let mut out = BeltsGraph::new();
    out.sources = base.sources.clone();
    out.sink = base.sink.clone();
    out.node_caps = base.node_caps.clone();

    let mut imbalance: BTreeMap<String, f64> = BTreeMap::new();
    for (u, v, bounds) in base.edges() {
        out.add_edge(&u, &v, 0.0, bounds.hi - bounds.lo);
        if bounds.lo > EPS {
            *imbalance.entry(u).or_insert(0.0) -= bounds.lo;
            *imbalance.entry(v).or_insert(0.0) += bounds.lo;
        }
    }

    (out, imbalance)
}

/// Strip a node-splitting suffix (`_in`/`_out`) from a reported node id.
pub fn strip_split_suffix(id: &str) -> String {
    id.strip_suffix("_in")
        .or_else(|| id.strip_suffix("_out"))
        .unwrap_or(id)
        .to_string()
}
