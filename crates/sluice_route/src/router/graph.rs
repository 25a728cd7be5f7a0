//! The materialized channel node grid.
//!
//! [`NodeGrid`] stamps the device's channel-type templates out over the grid
//! once at setup, producing per-node adjacency plus the mutable per-node
//! state the router negotiates over: bindings, congestion history, and the
//! per-search visit scratch. Storage is `(y * width + x)` cells of
//! `|channel types|` slots each, matching node identity `(x, y, ty)`.

use crate::error::RouteError;
use sluice_fabric::{ChannelGraph, ChannelNode, ChannelType, Dir, NetId};
use std::collections::BTreeMap;

/// The running cost of a node during one arc search.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NodeScore {
    /// Accumulated cost from the search seeds to this node.
    pub cost: f32,
    /// Estimated remaining cost to the sink.
    pub togo_cost: f32,
}

impl NodeScore {
    /// The total ordering key of the search frontier.
    pub fn total(&self) -> f32 {
        self.cost + self.togo_cost
    }
}

/// Per-search scratch state, reset lazily through the dirty list.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VisitState {
    /// The node was touched by the current search.
    pub dirty: bool,
    /// The node was popped and expanded (closed).
    pub visited: bool,
    /// Predecessor on the best known path into this node.
    pub bwd: ChannelNode,
    /// Best known score for this node.
    pub score: NodeScore,
}

/// One net's claim on a node: how many of its arcs pass through, and the
/// unique predecessor through which the net enters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoundNet {
    /// Number of arcs of the net using this node.
    pub uses: u32,
    /// The node the net enters from. All arcs of one net must agree.
    pub uphill: ChannelNode,
}

/// Mutable routing state for one `(x, y, ty)` slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct PerNodeData {
    /// Materialized downhill neighbors.
    pub downhill: Vec<ChannelNode>,
    /// Materialized uphill neighbors.
    pub uphill: Vec<ChannelNode>,
    /// Nets currently bound here, ordered by net id for stable iteration.
    pub bound_nets: BTreeMap<NetId, BoundNet>,
    /// Historical congestion penalty, non-decreasing across iterations.
    pub hist_cong_cost: f32,
    /// The node is locked out of routing entirely.
    pub unavailable: bool,
    /// When set, only this net may use the node.
    pub reserved_net: Option<NetId>,
    /// Per-search scratch.
    pub visit: VisitState,
}

/// The channel node grid: immutable adjacency plus mutable per-node state.
#[derive(Debug)]
pub(crate) struct NodeGrid {
    width: i32,
    height: i32,
    channels: Vec<ChannelType>,
    nodes: Vec<Vec<PerNodeData>>,
}

/// Displaces `(x, y)` opposite to `dir` by `along` grid units, yielding the
/// origin of the channel that a junction offset refers to.
fn channel_origin(dir: Dir, x: i32, y: i32, along: i32) -> (i32, i32) {
    match dir {
        Dir::East => (x - along, y),
        Dir::West => (x + along, y),
        Dir::North => (x, y - along),
        Dir::South => (x, y + along),
    }
}

impl NodeGrid {
    /// Materializes the grid from the device's channel templates.
    ///
    /// Template internals are validated strictly: a junction whose offsets
    /// exceed the declared channel lengths, or whose destination type does
    /// not exist, fails with [`RouteError::GraphInconsistent`]. Template
    /// placements whose endpoints fall off the grid edge are skipped; the
    /// channel simply does not exist there.
    pub fn build(g: &dyn ChannelGraph) -> Result<Self, RouteError> {
        let width = g.width();
        let height = g.height();
        if width <= 0 || height <= 0 {
            return Err(RouteError::graph(format!(
                "grid dimensions {width}x{height} are not positive"
            )));
        }
        let channels = g.channels();

        for (t, c) in channels.iter().enumerate() {
            if c.length < 0 {
                return Err(RouteError::graph(format!(
                    "channel type {t} has negative length {}",
                    c.length
                )));
            }
            for dh in &c.downhill {
                if dh.src_along < 0 || dh.src_along > c.length {
                    return Err(RouteError::graph(format!(
                        "channel type {t}: junction src_along {} outside [0, {}]",
                        dh.src_along, c.length
                    )));
                }
                let Some(d) = channels.get(dh.dst_type as usize) else {
                    return Err(RouteError::graph(format!(
                        "channel type {t}: junction references missing type {}",
                        dh.dst_type
                    )));
                };
                if dh.dst_along < 0 || dh.dst_along > d.length {
                    return Err(RouteError::graph(format!(
                        "channel type {t}: junction dst_along {} outside [0, {}]",
                        dh.dst_along, d.length
                    )));
                }
            }
        }

        let mut nodes = vec![vec![PerNodeData::default(); channels.len()]; (width * height) as usize];
        for pnd in nodes.iter_mut().flatten() {
            pnd.hist_cong_cost = 1.0;
        }

        let in_grid = |x: i32, y: i32| x >= 0 && x < width && y >= 0 && y < height;
        for y in 0..height {
            for x in 0..width {
                for (t, c) in channels.iter().enumerate() {
                    for dh in &c.downhill {
                        let (start_x, start_y) = channel_origin(c.dir, x, y, dh.src_along);
                        let d = &channels[dh.dst_type as usize];
                        let (end_x, end_y) = channel_origin(d.dir, x, y, dh.dst_along);
                        if !in_grid(start_x, start_y) || !in_grid(end_x, end_y) {
                            continue;
                        }
                        let src = ChannelNode::new(start_x, start_y, t as u32);
                        let dst = ChannelNode::new(end_x, end_y, dh.dst_type);
                        nodes[(start_y * width + start_x) as usize][t]
                            .downhill
                            .push(dst);
                        nodes[(end_y * width + end_x) as usize][dh.dst_type as usize]
                            .uphill
                            .push(src);
                    }
                }
            }
        }

        Ok(Self {
            width,
            height,
            channels,
            nodes,
        })
    }

    /// Returns the grid width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Returns the grid height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the channel type template for index `ty`.
    pub fn channel(&self, ty: u32) -> &ChannelType {
        &self.channels[ty as usize]
    }

    /// Returns the number of channel types.
    pub fn type_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns whether `node` names an existing grid slot.
    pub fn contains(&self, node: ChannelNode) -> bool {
        node.x >= 0
            && node.x < self.width
            && node.y >= 0
            && node.y < self.height
            && (node.ty as usize) < self.channels.len()
    }

    pub fn data(&self, node: ChannelNode) -> &PerNodeData {
        &self.nodes[(node.y * self.width + node.x) as usize][node.ty as usize]
    }

    pub fn data_mut(&mut self, node: ChannelNode) -> &mut PerNodeData {
        &mut self.nodes[(node.y * self.width + node.x) as usize][node.ty as usize]
    }

    /// How far past capacity `node` currently is. Legal nodes are `<= 0`.
    pub fn overuse(&self, node: ChannelNode) -> i32 {
        let w = self.data(node);
        w.bound_nets.len() as i32 - self.channels[node.ty as usize].width as i32
    }

    /// Counts the nodes currently over capacity.
    pub fn overused_count(&self) -> usize {
        self.iter_nodes()
            .filter(|&n| self.overuse(n) > 0)
            .count()
    }

    /// Adds `weight * overuse` to the history cost of every over-capacity
    /// node. History never decreases.
    pub fn update_history(&mut self, weight: f32) {
        let over: Vec<(ChannelNode, i32)> = self
            .iter_nodes()
            .filter_map(|n| {
                let o = self.overuse(n);
                (o > 0).then_some((n, o))
            })
            .collect();
        for (n, o) in over {
            self.data_mut(n).hist_cong_cost += weight * o as f32;
        }
    }

    /// Iterates every node identity in storage order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = ChannelNode> + '_ {
        let width = self.width;
        let types = self.channels.len() as u32;
        (0..self.height).flat_map(move |y| {
            (0..width).flat_map(move |x| (0..types).map(move |t| ChannelNode::new(x, y, t)))
        })
    }
}
