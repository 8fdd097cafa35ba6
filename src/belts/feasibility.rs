//! Lower-bound feasibility check (§4.3): auxiliary super-source/super-sink
//! graph construction and max-flow-vs-demand comparison.

use std::collections::BTreeMap;

use super::graph::BeltsGraph;
use super::netbuild::{Certificate, IndexedNetwork};
use crate::numeric::{approx_eq, is_zero, EPS};

const SUPER_SOURCE: &str = "__super_source__";
const SUPER_SINK: &str = "__super_sink__";

/// Outcome of the feasibility check.
pub enum Feasibility {
    /// All per-node imbalances are within epsilon of zero, or the auxiliary
    /// max-flow saturates total demand.
    Feasible,
    /// The auxiliary max-flow falls short of total demand, with a min-cut
    /// certificate.
    Infeasible {
        /// Demand that could not be routed (`demand - max_flow`).
        demand_balance: f64,
        /// Min-cut certificate from the auxiliary graph.
        certificate: Certificate,
    },
}

/// Check feasibility of `residual` (post lower-bound-elimination graph)
/// given the `imbalance` map produced alongside it.
pub fn check_feasibility(residual: &BeltsGraph, imbalance: &BTreeMap<String, f64>) -> Feasibility {
    if imbalance.values().all(|b| is_zero(*b)) {
        return Feasibility::Feasible;
    }

    let mut ids: Vec<String> = residual.node_ids();
    ids.push(SUPER_SOURCE.to_string());
    ids.push(SUPER_SINK.to_string());
    let mut net = IndexedNetwork::new(ids);

    for (u, v, bounds) in residual.edges() {
        net.add_reportable_edge(&u, &v, bounds.hi);
    }

    let mut demand = 0.0;
    for (n, b) in imbalance {
        if *b > EPS {
            net.add_internal_edge(SUPER_SOURCE, n, *b);
            demand += b;
        } else if *b < -EPS {
            net.add_internal_edge(n, SUPER_SINK, -b);
        }
    }

    let solved = net.solve(SUPER_SOURCE, SUPER_SINK);
    if approx_eq(solved.value, demand) {
        return Feasibility::Feasible;
    }

    let certificate = solved.certificate(&[SUPER_SOURCE, SUPER_SINK]);
    Feasibility::Infeasible {
        demand_balance: demand - solved.value,
        certificate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_imbalance_is_trivially_feasible() {
        let imbalance = BTreeMap::new();
        let g = BeltsGraph::new();
        assert!(matches!(check_feasibility(&g, &imbalance), Feasibility::Feasible));
    }

    #[test]
    fn unsatisfiable_lower_bound_is_infeasible() {
        let mut g = BeltsGraph::new();
        // Residual graph after eliminating lo=60 on a 100-capacity edge
        // with no path for the surplus demand to route elsewhere.
        g.add_edge("a", "b", 0.0, 40.0);
        let mut imbalance = BTreeMap::new();
        imbalance.insert("a".to_string(), -60.0);
        imbalance.insert("b".to_string(), 60.0);

        match check_feasibility(&g, &imbalance) {
            Feasibility::Infeasible { demand_balance, .. } => {
                assert!(demand_balance > 0.0);
            }
            Feasibility::Feasible => panic!("expected infeasible"),
        }
    }
}
