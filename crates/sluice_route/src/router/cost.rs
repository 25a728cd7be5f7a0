//! The node cost model.
//!
//! A node's price for a given net combines its base cost, its historical
//! congestion penalty, the present capacity-aware congestion penalty, a
//! discount for nodes the net already uses (so fanout branches prefer the
//! existing tree), and a bias pulling the search toward the net centroid.

use crate::router::graph::PerNodeData;
use crate::router::Router;
use sluice_fabric::{ChannelNode, NetId};

impl Router {
    /// Present congestion cost of a node for `net`.
    ///
    /// A node at or under capacity (counting `net` itself as free) costs 1;
    /// past that, each excess net adds the current congestion weight.
    pub(crate) fn present_node_cost(&self, wd: &PerNodeData, ty: u32, net: NetId) -> f32 {
        let mut over_capacity = wd.bound_nets.len() as i32;
        over_capacity -= self.grid.channel(ty).width as i32 - 1;
        if wd.bound_nets.contains_key(&net) {
            over_capacity -= 1;
        }
        if over_capacity <= 0 {
            1.0
        } else {
            1.0 + over_capacity as f32 * self.curr_cong_weight
        }
    }

    /// The cost of relaxing an edge into `node` while routing an arc of `net`.
    pub(crate) fn score_node_for_arc(&self, net: NetId, node: ChannelNode) -> f32 {
        let wd = self.grid.data(node);
        let nd = &self.nets[net.as_raw() as usize];
        let base_cost = self.grid.channel(node.ty).cost;
        let hist_cost = wd.hist_cong_cost;
        let present_cost = self.present_node_cost(wd, node.ty, net);
        let source_uses = wd.bound_nets.get(&net).map_or(0, |b| b.uses);

        let bias_cost = self.cfg.bias_cost_factor * (base_cost / nd.arcs.len().max(1) as f32)
            * ((node.x - nd.cx).abs() + (node.y - nd.cy).abs()) as f32
            / nd.hpwl as f32;

        base_cost * hist_cost * present_cost / (1 + source_uses) as f32 + bias_cost
    }

    /// Estimated remaining cost from `node` to the arc's sink.
    ///
    /// Scaled down by the net's own use count at `node`, which deliberately
    /// breaks admissibility to accelerate reuse of the already-laid tree.
    pub(crate) fn togo_cost(&self, net: NetId, node: ChannelNode, sink: ChannelNode) -> f32 {
        let wd = self.grid.data(node);
        let source_uses = wd.bound_nets.get(&net).map_or(0, |b| b.uses);
        let base_cost = self.cfg.togo_cost_dx * (node.x - sink.x).abs() as f32
            + self.cfg.togo_cost_dy * (node.y - sink.y).abs() as f32
            + self.cfg.togo_cost_adder;
        base_cost / (1 + source_uses) as f32
    }
}
