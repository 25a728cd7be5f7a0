//! The channel routing engine.
//!
//! A [`Router`] owns everything derived from the device and the netlist: the
//! materialized node grid, per-net records, the congestion weight schedule,
//! and the tie-break RNG. Construction runs the graph and net builders and
//! may fail on an inconsistent device; [`Router::route`] then runs the
//! negotiated-congestion loop to a terminal [`RouteOutcome`].
//!
//! Routing is single-threaded and deterministic: identical device, netlist,
//! config, and seed produce bit-identical bindings.

pub(crate) mod graph;
pub(crate) mod nets;

mod cost;
mod pathfinder;
mod search;
mod tree;

use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::router::graph::NodeGrid;
use crate::router::nets::PerNetData;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sluice_diagnostics::DiagnosticSink;
use sluice_fabric::{ChannelGraph, ChannelNode, NetId, Netlist};

/// One entry of a net's routing tree, as read back after routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundNode {
    /// The bound node.
    pub node: ChannelNode,
    /// How many arcs of the net pass through it.
    pub uses: u32,
    /// The unique predecessor the net enters from. The driver node carries
    /// itself as a sentinel.
    pub uphill: ChannelNode,
}

/// Counters accumulated over a routing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterStats {
    /// Outer iterations executed.
    pub iterations: u32,
    /// Over-capacity node count at the end of each iteration.
    pub overflow_per_iter: Vec<usize>,
    /// Total wall-clock time spent in arc routing, in microseconds.
    pub route_time_us: u64,
}

/// The negotiated-congestion channel router.
#[derive(Debug)]
pub struct Router {
    pub(crate) cfg: RouterConfig,
    pub(crate) grid: NodeGrid,
    pub(crate) nets: Vec<PerNetData>,
    pub(crate) curr_cong_weight: f32,
    pub(crate) hist_cong_weight: f32,
    pub(crate) rng: StdRng,
    pub(crate) stats: RouterStats,
}

impl Router {
    /// Builds a router from the device graph, the placed netlist, and the
    /// configuration.
    ///
    /// Materializes the node grid and per-net records. Fails with
    /// [`RouteError::GraphInconsistent`] on a malformed device template or a
    /// net terminal mapped off-grid, and with a config error when an option
    /// lies outside its domain. Driverless nets with users are reported
    /// through `sink` and skipped.
    pub fn new(
        g: &dyn ChannelGraph,
        netlist: &Netlist,
        cfg: RouterConfig,
        sink: &DiagnosticSink,
    ) -> Result<Self, RouteError> {
        cfg.validate()?;
        let grid = NodeGrid::build(g)?;
        let nets = nets::build_nets(g, netlist, &grid, &cfg, sink)?;
        let rng = StdRng::seed_from_u64(cfg.seed);
        Ok(Self {
            curr_cong_weight: cfg.init_curr_cong,
            hist_cong_weight: cfg.init_hist_cong,
            cfg,
            grid,
            nets,
            rng,
            stats: RouterStats::default(),
        })
    }

    /// Returns the number of nets known to the router.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Looks up a net id by canonical name.
    pub fn find_net(&self, name: &str) -> Option<NetId> {
        // Nets are stored in canonical name order, so ids are sorted by name.
        self.nets
            .binary_search_by(|nd| nd.name.as_str().cmp(name))
            .ok()
            .map(|i| NetId::from_raw(i as u32))
    }

    /// Returns the canonical name of a net.
    pub fn net_name(&self, net: NetId) -> &str {
        &self.nets[net.as_raw() as usize].name
    }

    /// Returns whether every arc of the net has a bound path.
    ///
    /// Trivially `true` for nets with no users.
    pub fn is_net_routed(&self, net: NetId) -> bool {
        self.nets[net.as_raw() as usize].arcs.iter().all(|a| a.routed)
    }

    /// Returns the wall-clock time spent routing this net so far.
    pub fn net_route_time_us(&self, net: NetId) -> u64 {
        self.nets[net.as_raw() as usize].route_time_us
    }

    /// Returns the counters accumulated so far.
    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Locks a node out of routing entirely.
    ///
    /// Must be called before [`Router::route`]; a node already carrying
    /// bindings keeps them.
    pub fn set_unavailable(&mut self, node: ChannelNode) -> Result<(), RouteError> {
        if !self.grid.contains(node) {
            return Err(RouteError::graph(format!(
                "cannot mark {node} unavailable: outside the grid"
            )));
        }
        self.grid.data_mut(node).unavailable = true;
        Ok(())
    }

    /// Reserves a node so that only `net` may route through it.
    pub fn reserve_for(&mut self, node: ChannelNode, net: NetId) -> Result<(), RouteError> {
        if !self.grid.contains(node) {
            return Err(RouteError::graph(format!(
                "cannot reserve {node}: outside the grid"
            )));
        }
        self.grid.data_mut(node).reserved_net = Some(net);
        Ok(())
    }

    /// Reads back a net's routing tree: every node bound to the net with its
    /// use count and unique uphill, in grid storage order.
    pub fn bound_nodes(&self, net: NetId) -> Vec<BoundNode> {
        let mut out = Vec::new();
        for node in self.grid.iter_nodes() {
            if let Some(b) = self.grid.data(node).bound_nets.get(&net) {
                out.push(BoundNode {
                    node,
                    uses: b.uses,
                    uphill: b.uphill,
                });
            }
        }
        out
    }

    /// Returns the bound path of one arc, from driver to sink.
    ///
    /// Returns an empty path for an unrouted arc, and
    /// [`RouteError::InvariantViolation`] if the binding state no longer
    /// forms a walkable tree.
    pub fn arc_path(&self, net: NetId, user: usize) -> Result<Vec<ChannelNode>, RouteError> {
        let mut path = self.walk_arc(net, user)?;
        path.reverse();
        Ok(path)
    }
}
