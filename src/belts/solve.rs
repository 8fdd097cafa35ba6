//! Feasibility + throughput driver (§4.4): orchestrates the transforms, the
//! feasibility check, the production max-flow, and certificate extraction.

use tracing::{debug, info, instrument};

use super::feasibility::{check_feasibility, Feasibility};
use super::graph::BeltsGraph;
use super::io::{parse_input, BeltsOutput};
use super::netbuild::IndexedNetwork;
use super::transform::{eliminate_lower_bounds, split_nodes_for_capacity, strip_split_suffix};
use crate::error::Result;
use crate::numeric::{approx_eq, is_zero};

const SYNTHETIC_SOURCE: &str = "__source__";

/// Solve a belts instance given as a raw JSON value, returning the result
/// object that should be serialized to stdout (§6.1). Parse/validation
/// failures and internal solver failures are folded into
/// `BeltsOutput::Error` here so the caller never has to match on `Result`.
pub fn solve_belts(value: &serde_json::Value) -> BeltsOutput {
    match solve_belts_inner(value) {
        Ok(output) => output,
        Err(e) => BeltsOutput::error(&e),
    }
}

#[instrument(skip_all)]
fn solve_belts_inner(value: &serde_json::Value) -> Result<BeltsOutput> {
    let graph = parse_input(value)?;
    debug!(nodes = graph.node_ids().len(), edges = graph.edges().len(), "parsed belts input");

    if is_zero(graph.total_supply()) {
        info!("total supply is zero, short-circuiting to ok with empty flow");
        return Ok(BeltsOutput::ok(0.0, Vec::new()));
    }

    let split = if graph.node_caps.is_empty() {
        graph.clone()
    } else {
        split_nodes_for_capacity(&graph)
    };

    let (residual, imbalance) = eliminate_lower_bounds(&split);

    match check_feasibility(&residual, &imbalance) {
        Feasibility::Infeasible { demand_balance, certificate } => {
            return Ok(BeltsOutput::infeasible(
                certificate.cut_reachable,
                demand_balance,
                certificate.tight_edges,
            ));
        }
        Feasibility::Feasible => {}
    }

    compute_throughput(&graph, &residual)
}

#[instrument(skip_all)]
fn compute_throughput(original: &BeltsGraph, residual: &BeltsGraph) -> Result<BeltsOutput> {
    let sink = residual
        .sink
        .clone()
        .expect("validated graph always has a sink");

    let mut ids: Vec<String> = residual.node_ids();
    ids.push(SYNTHETIC_SOURCE.to_string());
    let mut net = IndexedNetwork::new(ids);

    for (u, v, bounds) in residual.edges() {
        net.add_reportable_edge(&u, &v, bounds.hi);
    }

    let mut total_supply = 0.0;
    for (s, supply) in &residual.sources {
        net.add_internal_edge(SYNTHETIC_SOURCE, s, *supply);
        total_supply += supply;
    }

    let solved = net.solve(SYNTHETIC_SOURCE, &sink);

    if !approx_eq(solved.value, total_supply) {
        let certificate = solved.certificate(&[SYNTHETIC_SOURCE]);
        let cut_reachable: Vec<String> = certificate
            .cut_reachable
            .into_iter()
            .map(|id| strip_split_suffix(&id))
            .collect();
        let tight_edges = certificate
            .tight_edges
            .into_iter()
            .map(|(from, to, cap)| (strip_split_suffix(&from), strip_split_suffix(&to), cap))
            .collect();
        return Ok(BeltsOutput::infeasible(
            cut_reachable,
            total_supply - solved.value,
            tight_edges,
        ));
    }

    let mut flows = Vec::new();
    for (u, v, flow) in solved.nonzero_flows() {
        let u_base = strip_split_suffix(&u);
        let v_base = strip_split_suffix(&v);
        // Internal node-splitting edges (n_in -> n_out) have no original
        // identity and are omitted from the report (§4.4).
        if u_base == v_base {
            continue;
        }
        let lo = original
            .edge_bounds(&u_base, &v_base)
            .map(|b| b.lo)
            .unwrap_or(0.0);
        flows.push((u_base, v_base, flow + lo));
    }

    Ok(BeltsOutput::ok(solved.value, flows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_path_scenario() {
        let input = json!({
            "nodes": {"A": {"capacity": 1000}, "B": {"capacity": 1000}, "C": {"capacity": 1000}},
            "edges": [
                {"from": "A", "to": "B", "lower_bound": 0, "capacity": 100},
                {"from": "B", "to": "C", "lower_bound": 0, "capacity": 100}
            ],
            "sources": [{"node": "A", "supply": 50}],
            "sink": "C"
        });
        let out = solve_belts(&input);
        match out {
            BeltsOutput::Ok { max_flow_per_min, flows } => {
                assert!((max_flow_per_min - 50.0).abs() < 1e-9);
                assert_eq!(flows.len(), 2);
            }
            _ => panic!("expected ok"),
        }
    }

    #[test]
    fn lower_bound_infeasible_scenario() {
        let input = json!({
            "nodes": {"A": {"capacity": 500}, "B": {"capacity": 500}},
            "edges": [{"from": "A", "to": "B", "lower_bound": 60, "capacity": 100}],
            "sources": [{"node": "A", "supply": 50}],
            "sink": "B"
        });
        let out = solve_belts(&input);
        assert!(matches!(out, BeltsOutput::Infeasible { .. }));
    }

    #[test]
    fn node_cap_bottleneck_scenario() {
        let input = json!({
            "nodes": {"A": {"capacity": 500}, "B": {"capacity": 25}, "C": {"capacity": 500}},
            "edges": [
                {"from": "A", "to": "B", "lower_bound": 0, "capacity": 100},
                {"from": "B", "to": "C", "lower_bound": 0, "capacity": 100}
            ],
            "sources": [{"node": "A", "supply": 50}],
            "sink": "C"
        });
        let out = solve_belts(&input);
        assert!(matches!(out, BeltsOutput::Infeasible { .. }));
    }

    #[test]
    fn zero_supply_short_circuits() {
        let input = json!({
            "edges": [{"from": "A", "to": "B", "capacity": 10}],
            "sources": [{"node": "A", "supply": 0}],
            "sink": "B"
        });
        let out = solve_belts(&input);
        match out {
            BeltsOutput::Ok { max_flow_per_min, flows } => {
                assert_eq!(max_flow_per_min, 0.0);
                assert!(flows.is_empty());
            }
            _ => panic!("expected ok"),
        }
    }

    #[test]
    fn diamond_is_deterministic_across_runs() {
        let input = json!({
            "nodes": {"A": {"capacity": 1000}, "B": {"capacity": 1000}, "C": {"capacity": 1000}, "D": {"capacity": 1000}},
            "edges": [
                {"from": "A", "to": "B", "lower_bound": 0, "capacity": 50},
                {"from": "A", "to": "C", "lower_bound": 0, "capacity": 50},
                {"from": "B", "to": "D", "lower_bound": 0, "capacity": 50},
                {"from": "C", "to": "D", "lower_bound": 0, "capacity": 50}
            ],
            "sources": [{"node": "A", "supply": 80}],
            "sink": "D"
        });

        let baseline = serde_json::to_string(&solve_belts(&input)).unwrap();
        for _ in 0..3 {
            assert_eq!(serde_json::to_string(&solve_belts(&input)).unwrap(), baseline);
        }
    }

    #[test]
    fn missing_sink_is_an_error() {
        let input = json!({
            "edges": [{"from": "A", "to": "B", "capacity": 10}],
            "sources": [{"node": "A", "supply": 5}]
        });
        assert!(matches!(solve_belts(&input), BeltsOutput::Error { .. }));
    }
}
