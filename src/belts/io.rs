//! Belts JSON input/output schemas (§6.2, §6.3).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::numeric::round4;

use super::graph::BeltsGraph;

/// Raw edge entry as it appears in the input JSON.
#[derive(Debug, Clone, Deserialize)]
struct EdgeInput {
    from: String,
    to: String,
    #[serde(alias = "lo", default)]
    lower_bound: Option<f64>,
    #[serde(alias = "hi", default)]
    capacity: Option<f64>,
}

/// One entry of the `"sources"` list form.
#[derive(Debug, Clone, Deserialize)]
struct SourceEntry {
    node: String,
    supply: f64,
}

/// Either list-of-objects or object-map form of `"sources"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SourcesField {
    List(Vec<SourceEntry>),
    Map(BTreeMap<String, f64>),
}

#[derive(Debug, Clone, Deserialize)]
struct NodeCapacity {
    capacity: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct BeltsInputRaw {
    #[serde(default)]
    nodes: BTreeMap<String, NodeCapacity>,
    #[serde(default)]
    node_caps: BTreeMap<String, f64>,
    #[serde(default)]
    edges: Vec<EdgeInput>,
    #[serde(default)]
    sources: Option<SourcesField>,
    sink: Option<String>,
}

/// Parse a raw JSON value into a validated [`BeltsGraph`] (§6.2, §7).
pub fn parse_input(value: &Value) -> Result<BeltsGraph> {
    if !value.is_object() {
        return Err(Error::invalid_input("input must be a JSON object"));
    }
    let raw: BeltsInputRaw = serde_json::from_value(value.clone())
        .map_err(|e| Error::invalid_input(format!("failed to parse belts input: {e}")))?;

    let mut g = BeltsGraph::new();

    for e in &raw.edges {
        let lo = e.lower_bound.unwrap_or(0.0);
        let hi = e.capacity.unwrap_or(f64::INFINITY);
        if lo < 0.0 {
            return Err(Error::invalid_input(format!(
                "edge {}->{} has negative lower bound",
                e.from, e.to
            )));
        }
        if hi < lo {
            return Err(Error::invalid_input(format!(
                "edge {}->{} has capacity below its lower bound",
                e.from, e.to
            )));
        }
        g.add_edge(&e.from, &e.to, lo, hi);
    }

    // "nodes" and legacy "node_caps" are unioned; later values win. We
    // apply node_caps first so an explicit "nodes" entry (processed second)
    // takes precedence, matching "combined via union with later values
    // overriding" (§6.2).
    for (n, cap) in &raw.node_caps {
        g.add_node_capacity(n, *cap);
    }
    for (n, nc) in &raw.nodes {
        g.add_node_capacity(n, nc.capacity);
    }

    match raw.sources {
        Some(SourcesField::List(entries)) => {
            for s in entries {
                g.add_source(&s.node, s.supply);
            }
        }
        Some(SourcesField::Map(map)) => {
            for (n, supply) in map {
                g.add_source(&n, supply);
            }
        }
        None => {}
    }

    if let Some(sink) = &raw.sink {
        g.set_sink(sink);
    }

    g.validate()?;
    Ok(g)
}

/// A reported flow on a single edge.
#[derive(Debug, Clone, Serialize)]
pub struct FlowEntry {
    pub from: String,
    pub to: String,
    pub flow: f64,
}

/// A reported tight (saturated) edge in an infeasibility certificate.
#[derive(Debug, Clone, Serialize)]
pub struct TightEdge {
    pub from: String,
    pub to: String,
    pub capacity: f64,
}

/// Infeasibility deficit detail (§6.3).
#[derive(Debug, Clone, Serialize)]
pub struct Deficit {
    pub demand_balance: f64,
    pub tight_edges: Vec<TightEdge>,
}

/// The belts solver's output, tagged by `"status"` (§6.3).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BeltsOutput {
    Ok {
        max_flow_per_min: f64,
        flows: Vec<FlowEntry>,
    },
    Infeasible {
        cut_reachable: Vec<String>,
        deficit: Deficit,
    },
    Error {
        message: String,
        /// Not part of the JSON contract (§6.3) — carried alongside the
        /// message so the binary can exit 1 only for a genuine internal
        /// solver failure, per §6.1/§7.
        #[serde(skip)]
        exit_code: i32,
    },
}

impl BeltsOutput {
    /// Build an `ok` result, applying the 4-decimal rounding policy and
    /// sorting flows lexicographically by `(from, to)` (§4.4).
    pub fn ok(max_flow: f64, mut flows: Vec<(String, String, f64)>) -> Self {
        flows.sort_by(|a, b| (a.0.as_str(), a.1.as_str()).cmp(&(b.0.as_str(), b.1.as_str())));
        BeltsOutput::Ok {
            max_flow_per_min: round4(max_flow),
            flows: flows
                .into_iter()
                .map(|(from, to, flow)| FlowEntry {
                    from,
                    to,
                    flow: round4(flow),
                })
                .collect(),
        }
    }

    /// Build an `infeasible` result.
    pub fn infeasible(
        mut cut_reachable: Vec<String>,
        demand_balance: f64,
        tight_edges: Vec<(String, String, f64)>,
    ) -> Self {
        cut_reachable.sort();
        BeltsOutput::Infeasible {
            cut_reachable,
            deficit: Deficit {
                demand_balance: round4(demand_balance),
                tight_edges: tight_edges
                    .into_iter()
                    .map(|(from, to, capacity)| TightEdge {
                        from,
                        to,
                        capacity: round4(capacity),
                    })
                    .collect(),
            },
        }
    }

    /// Build an `error` result, carrying the originating [`Error`]'s exit
    /// code (§6.1, §7) alongside its message.
    pub fn error(err: &Error) -> Self {
        BeltsOutput::Error {
            message: err.message(),
            exit_code: err.exit_code(),
        }
    }

    /// Process exit code per §6.1: 0 for `ok`/`infeasible` and for an
    /// input-shape/semantics `error`, 1 only for a genuine internal solver
    /// failure (malformed JSON is handled directly in the binary, before any
    /// `BeltsOutput` exists).
    pub fn exit_code(&self) -> i32 {
        match self {
            BeltsOutput::Error { exit_code, .. } => *exit_code,
            _ => 0,
        }
    }
}
