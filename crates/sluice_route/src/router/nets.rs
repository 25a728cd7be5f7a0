//! Per-net and per-arc routing records.
//!
//! Built once from the placed netlist, in canonical (name-sorted) net order
//! so that net ids are deterministic. Each net record carries its driver
//! node, one arc per user, bounding boxes, the centroid used by the bias
//! cost, and the half-perimeter wirelength.

use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::router::graph::NodeGrid;
use sluice_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use sluice_fabric::{ChannelGraph, ChannelNode, Netlist};

/// An inclusive axis-aligned bounding box over grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArcBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl ArcBounds {
    /// The tight box around two nodes.
    pub fn of(a: ChannelNode, b: ChannelNode) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    /// Grows the box to include `(x, y)`.
    pub fn extend(&mut self, x: i32, y: i32) {
        self.x0 = self.x0.min(x);
        self.y0 = self.y0.min(y);
        self.x1 = self.x1.max(x);
        self.y1 = self.y1.max(y);
    }

    /// Whether `node` lies inside the box expanded by the given margins.
    pub fn hit_test(&self, node: ChannelNode, margin_x: i32, margin_y: i32) -> bool {
        node.x >= self.x0 - margin_x
            && node.x <= self.x1 + margin_x
            && node.y >= self.y0 - margin_y
            && node.y <= self.y1 + margin_y
    }

    /// Cell area of the box, the net-ordering key of the outer loop.
    pub fn area(&self) -> i64 {
        (self.x1 - self.x0 + 1) as i64 * (self.y1 - self.y0 + 1) as i64
    }
}

/// One driver-to-sink connection request.
#[derive(Debug, Clone)]
pub(crate) struct PerArcData {
    /// The node this arc must reach.
    pub sink_node: ChannelNode,
    /// Search bounding box for this arc.
    pub bb: ArcBounds,
    /// Whether a bound path currently exists for this arc.
    pub routed: bool,
}

/// Routing state for one net.
#[derive(Debug, Clone)]
pub(crate) struct PerNetData {
    /// Canonical net name, for diagnostics.
    pub name: String,
    /// The driver node; `None` for driverless nets, which are skipped.
    pub src_node: Option<ChannelNode>,
    /// One arc per user, in design order.
    pub arcs: Vec<PerArcData>,
    /// Arc indices in routing order: increasing driver distance, ties by index.
    pub arc_order: Vec<usize>,
    /// Bounding box over the driver and all sinks.
    pub bb: ArcBounds,
    /// Net centroid x, the arithmetic mean over driver and sinks.
    pub cx: i32,
    /// Net centroid y.
    pub cy: i32,
    /// Half-perimeter wirelength; at least 1 for driven nets, 0 otherwise.
    pub hpwl: i32,
    /// Accumulated wall-clock time spent routing this net, in microseconds.
    pub route_time_us: u64,
}

/// Builds per-net records from the placed netlist, in canonical net order.
///
/// The position of each record doubles as the net's dense id. Driver and
/// sink nodes are validated against the grid; a terminal mapped off-grid
/// fails with [`RouteError::GraphInconsistent`]. Nets with users but no
/// driver are reported through the sink and built as skipped records.
pub(crate) fn build_nets(
    g: &dyn ChannelGraph,
    netlist: &Netlist,
    grid: &NodeGrid,
    cfg: &RouterConfig,
    sink: &DiagnosticSink,
) -> Result<Vec<PerNetData>, RouteError> {
    let mut order: Vec<usize> = (0..netlist.nets.len()).collect();
    order.sort_by(|&a, &b| netlist.nets[a].name.cmp(&netlist.nets[b].name).then(a.cmp(&b)));

    let mut nets = Vec::with_capacity(order.len());
    for idx in order {
        let ni = &netlist.nets[idx];

        if ni.driver.is_none() {
            if !ni.users.is_empty() {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::new(Category::Net, 101),
                        format!("net `{}` has {} users but no driver; skipped", ni.name, ni.users.len()),
                    )
                    .with_net(&ni.name),
                );
            }
            nets.push(PerNetData {
                name: ni.name.clone(),
                src_node: None,
                arcs: Vec::new(),
                arc_order: Vec::new(),
                bb: ArcBounds {
                    x0: 0,
                    y0: 0,
                    x1: 0,
                    y1: 0,
                },
                cx: 0,
                cy: 0,
                hpwl: 0,
                route_time_us: 0,
            });
            continue;
        }

        let src_node = g.source_node(ni);
        if !grid.contains(src_node) {
            return Err(RouteError::graph(format!(
                "net `{}`: driver node {src_node} is outside the grid",
                ni.name
            )));
        }

        let mut bb = ArcBounds::of(src_node, src_node);
        let mut cx = src_node.x;
        let mut cy = src_node.y;
        let mut arcs = Vec::with_capacity(ni.users.len());
        for user in &ni.users {
            let sink_node = g.sink_node(ni, user);
            if !grid.contains(sink_node) {
                return Err(RouteError::graph(format!(
                    "net `{}`: sink node {sink_node} is outside the grid",
                    ni.name
                )));
            }
            bb.extend(sink_node.x, sink_node.y);
            cx += sink_node.x;
            cy += sink_node.y;
            arcs.push(PerArcData {
                sink_node,
                bb: ArcBounds::of(src_node, sink_node),
                routed: false,
            });
        }

        cx /= ni.users.len() as i32 + 1;
        cy /= ni.users.len() as i32 + 1;
        let hpwl = ((bb.y1 - bb.y0).abs() + (bb.x1 - bb.x0).abs()).max(1);

        let mut arc_order: Vec<usize> = (0..arcs.len()).collect();
        arc_order.sort_by_key(|&u| {
            let s = arcs[u].sink_node;
            let dx = (s.x - src_node.x) as i64;
            let dy = (s.y - src_node.y) as i64;
            (dx * dx + dy * dy, u)
        });

        if cfg.verbose {
            sink.emit(
                Diagnostic::note(
                    DiagnosticCode::new(Category::Net, 1),
                    format!(
                        "net `{}`: bb=({}, {})->({}, {}) c=({}, {}) hpwl={}",
                        ni.name, bb.x0, bb.y0, bb.x1, bb.y1, cx, cy, hpwl
                    ),
                )
                .with_net(&ni.name),
            );
        }

        nets.push(PerNetData {
            name: ni.name.clone(),
            src_node: Some(src_node),
            arcs,
            arc_order,
            bb,
            cx,
            cy,
            hpwl,
            route_time_us: 0,
        });
    }

    Ok(nets)
}
