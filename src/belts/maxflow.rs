//! Max-flow / min-cut oracle for the belts engine.
//!
//! A direct descendant of the teacher codebase's `graph::flow::FlowNetwork`:
//! the same paired forward/reverse edge-list representation, generalized
//! from `i64` unit capacities to `f64` rate capacities (including `+inf`),
//! and re-solved with Dinic's algorithm instead of push-relabel so that a
//! minimum cut falls out of the final BFS layering for free (§4.5).

use std::collections::VecDeque;

use crate::numeric::EPS;

/// A flow network for max-flow / min-cut problems over real-valued
/// capacities. Nodes are referenced by dense `usize` index; callers own the
/// mapping between their own node identifiers and these indices.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    num_nodes: usize,
    /// adj[u] contains indices into `edges` for outgoing edges from u, in
    /// insertion order (this is what makes augmenting-path selection, and
    /// therefore the whole solve, deterministic).
    adj: Vec<Vec<usize>>,
    edges: Vec<FlowEdge>,
}

#[derive(Debug, Clone, Copy)]
struct FlowEdge {
    to: usize,
    capacity: f64,
    flow: f64,
    rev: usize,
}

impl FlowNetwork {
    /// Create a new flow network with `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            adj: vec![Vec::new(); num_nodes],
            edges: Vec::new(),
        }
    }

    /// Add a directed edge `from -> to` with the given capacity. Returns the
    /// index of the forward edge (stable identity used to read back flow
    /// after solving).
    pub fn add_edge(&mut self, from: usize, to: usize, capacity: f64) -> usize {
        let forward_idx = self.edges.len();
        let reverse_idx = forward_idx + 1;

        self.edges.push(FlowEdge {
            to,
            capacity,
            flow: 0.0,
            rev: reverse_idx,
        });
        self.adj[from].push(forward_idx);

        self.edges.push(FlowEdge {
            to: from,
            capacity: 0.0,
            flow: 0.0,
            rev: forward_idx,
        });
        self.adj[to].push(reverse_idx);

        forward_idx
    }

    fn residual(&self, edge_idx: usize) -> f64 {
        self.edges[edge_idx].capacity - self.edges[edge_idx].flow
    }

    fn push_flow(&mut self, edge_idx: usize, amount: f64) {
        self.edges[edge_idx].flow += amount;
        let rev = self.edges[edge_idx].rev;
        self.edges[rev].flow -= amount;
    }

    /// Flow currently assigned to the edge returned by a prior `add_edge`
    /// call.
    pub fn flow_on(&self, edge_idx: usize) -> f64 {
        self.edges[edge_idx].flow
    }

    /// Capacity of the edge returned by a prior `add_edge` call.
    pub fn capacity_of(&self, edge_idx: usize) -> f64 {
        self.edges[edge_idx].capacity
    }

    /// BFS from `source` over edges with positive residual capacity.
    /// Returns the set of reachable node indices — the source side of a
    /// minimum cut once no more augmenting paths exist.
    pub fn reachable_from(&self, source: usize) -> Vec<bool> {
        let mut seen = vec![false; self.num_nodes];
        seen[source] = true;
        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            for &edge_idx in &self.adj[u] {
                let e = &self.edges[edge_idx];
                if self.residual(edge_idx) > EPS && !seen[e.to] {
                    seen[e.to] = true;
                    queue.push_back(e.to);
                }
            }
        }
        seen
    }
}

/// Result of a max-flow computation.
pub struct MaxFlowResult {
    /// Maximum flow value achieved from source to sink.
    pub value: f64,
    /// The network, left in its final flow state so callers can read back
    /// per-edge flow via [`FlowNetwork::flow_on`] and the min cut via
    /// [`FlowNetwork::reachable_from`].
    pub network: FlowNetwork,
}

/// Solve max flow from `source` to `sink` using Dinic's algorithm.
///
/// Deterministic: BFS/DFS always scan adjacency lists front-to-back, and
/// adjacency lists reflect edge-insertion order, so identical input produces
/// an identical sequence of augmenting paths and therefore identical output.
pub fn max_flow(mut network: FlowNetwork, source: usize, sink: usize) -> MaxFlowResult {
    let n = network.num_nodes;
    if source == sink {
        return MaxFlowResult {
            value: 0.0,
            network,
        };
    }

    let mut total = 0.0;
    loop {
        let level = bfs_levels(&network, source, n);
        if level[sink].is_none() {
            break;
        }
        let mut iter = vec![0usize; n];
        loop {
            let pushed = dfs_blocking(&mut network, &level, &mut iter, source, sink, f64::INFINITY);
            if pushed <= EPS {
                break;
            }
            total += pushed;
        }
    }

    MaxFlowResult {
        value: total,
        network,
    }
}

fn bfs_levels(network: &FlowNetwork, source: usize, n: usize) -> Vec<Option<usize>> {
    let mut level = vec![None; n];
    level[source] = Some(0);
    let mut queue = VecDeque::new();
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        let lu = level[u].unwrap();
        for &edge_idx in &network.adj[u] {
            let e = &network.edges[edge_idx];
            if network.residual(edge_idx) > EPS && level[e.to].is_none() {
                level[e.to] = Some(lu + 1);
                queue.push_back(e.to);
            }
        }
    }
    level
}

fn dfs_blocking(
    network: &mut FlowNetwork,
    level: &[Option<usize>],
    iter: &mut [usize],
    u: usize,
    sink: usize,
    bound: f64,
) -> f64 {
    if u == sink {
        return bound;
    }
    while iter[u] < network.adj[u].len() {
        let edge_idx = network.adj[u][iter[u]];
        let e = network.edges[edge_idx];
        let residual = network.residual(edge_idx);
        if residual > EPS && level[e.to] == level[u].map(|l| l + 1) {
            let pushed = dfs_blocking(network, level, iter, e.to, sink, bound.min(residual));
            if pushed > EPS {
                network.push_flow(edge_idx, pushed);
                return pushed;
            }
        }
        iter[u] += 1;
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_path_bottleneck() {
        let mut net = FlowNetwork::new(3);
        net.add_edge(0, 1, 5.0);
        net.add_edge(1, 2, 3.0);
        let result = max_flow(net, 0, 2);
        assert!((result.value - 3.0).abs() < EPS);
    }

    #[test]
    fn parallel_paths_sum() {
        let mut net = FlowNetwork::new(4);
        net.add_edge(0, 1, 10.0);
        net.add_edge(1, 3, 10.0);
        net.add_edge(0, 2, 10.0);
        net.add_edge(2, 3, 10.0);
        let result = max_flow(net, 0, 3);
        assert!((result.value - 20.0).abs() < EPS);
    }

    #[test]
    fn classic_diamond() {
        let mut net = FlowNetwork::new(5);
        net.add_edge(0, 1, 10.0);
        net.add_edge(0, 2, 10.0);
        net.add_edge(1, 2, 2.0);
        net.add_edge(1, 3, 4.0);
        net.add_edge(1, 4, 8.0);
        net.add_edge(2, 4, 9.0);
        net.add_edge(3, 4, 10.0);
        let result = max_flow(net, 0, 4);
        assert!((result.value - 19.0).abs() < EPS, "got {}", result.value);
    }

    #[test]
    fn min_cut_matches_bottleneck() {
        let mut net = FlowNetwork::new(3);
        net.add_edge(0, 1, 5.0);
        net.add_edge(1, 2, 3.0);
        let result = max_flow(net, 0, 2);
        let reach = result.network.reachable_from(0);
        assert!(reach[0]);
        assert!(reach[1]);
        assert!(!reach[2]);
    }

    #[test]
    fn infinite_capacity_edge() {
        let mut net = FlowNetwork::new(3);
        net.add_edge(0, 1, f64::INFINITY);
        net.add_edge(1, 2, 7.0);
        let result = max_flow(net, 0, 2);
        assert!((result.value - 7.0).abs() < EPS);
    }
}
