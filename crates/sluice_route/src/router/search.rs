//! Best-first search of one arc, from the net's current tree to one sink.
//!
//! The frontier is a binary heap ordered on accumulated cost plus the to-go
//! estimate. Entries are immutable: a better path re-pushes the node and the
//! closed check discards stale entries on pop. Every node touched goes on a
//! dirty list so that only those nodes have their scratch reset afterwards;
//! the search never sweeps the whole grid.

use crate::error::RouteError;
use crate::router::graph::NodeScore;
use crate::router::Router;
use rand::Rng;
use sluice_fabric::{ChannelNode, NetId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One frontier entry.
#[derive(Debug, Clone, Copy)]
struct QueuedNode {
    node: ChannelNode,
    score: NodeScore,
    /// Tie-break tag drawn per enqueue; larger tags pop first on equal
    /// totals, scattering equally-priced frontiers.
    randtag: u32,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on total so the max-heap pops the cheapest entry.
        other
            .score
            .total()
            .total_cmp(&self.score.total())
            .then_with(|| self.randtag.cmp(&other.randtag))
    }
}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Router {
    /// Searches and binds one arc of `net`.
    ///
    /// Seeds the frontier with every node of the net's current tree (the
    /// driver alone before the first arc), expands downhill within the arc's
    /// bounding box plus the configured margins plus `extra_margin`, and on
    /// reaching the sink binds the reconstructed path. Returns `false` when
    /// the frontier empties without reaching the sink; the caller decides
    /// whether to retry with a larger box.
    pub(crate) fn route_arc(
        &mut self,
        net: NetId,
        user: usize,
        extra_margin: i32,
    ) -> Result<bool, RouteError> {
        let udata = net.as_raw() as usize;
        let Some(src) = self.nets[udata].src_node else {
            return Ok(false);
        };
        let sink_node = self.nets[udata].arcs[user].sink_node;
        let bb = self.nets[udata].arcs[user].bb;
        let margin_x = self.cfg.bb_margin_x + extra_margin;
        let margin_y = self.cfg.bb_margin_y + extra_margin;

        let mut dirty: Vec<ChannelNode> = Vec::new();
        let mut queue: BinaryHeap<QueuedNode> = BinaryHeap::new();

        for seed in self.tree_nodes(net)? {
            let score = NodeScore {
                cost: 0.0,
                togo_cost: self.togo_cost(net, seed, sink_node),
            };
            let randtag = self.rng.gen();
            let wd = self.grid.data_mut(seed);
            wd.visit.dirty = true;
            wd.visit.bwd = seed;
            wd.visit.score = score;
            dirty.push(seed);
            queue.push(QueuedNode {
                node: seed,
                score,
                randtag,
            });
        }

        let mut found = false;
        while let Some(q) = queue.pop() {
            if self.grid.data(q.node).visit.visited {
                continue;
            }
            self.grid.data_mut(q.node).visit.visited = true;
            if q.node == sink_node {
                found = true;
                break;
            }

            let downhill = self.grid.data(q.node).downhill.clone();
            for m in downhill {
                {
                    let wd = self.grid.data(m);
                    if wd.unavailable {
                        continue;
                    }
                    if wd.reserved_net.is_some_and(|r| r != net) {
                        continue;
                    }
                    if wd.visit.visited {
                        continue;
                    }
                }
                if !bb.hit_test(m, margin_x, margin_y) {
                    continue;
                }

                let next_cost = q.score.cost + self.score_node_for_arc(net, m);
                let togo_cost = self.togo_cost(net, m, sink_node);
                let prior_total = {
                    let v = &self.grid.data(m).visit;
                    v.dirty.then(|| v.score.total())
                };
                if prior_total.map_or(true, |t| next_cost + togo_cost < t) {
                    let randtag = self.rng.gen();
                    let score = NodeScore {
                        cost: next_cost,
                        togo_cost,
                    };
                    let wd = self.grid.data_mut(m);
                    if !wd.visit.dirty {
                        dirty.push(m);
                    }
                    wd.visit.dirty = true;
                    wd.visit.bwd = q.node;
                    wd.visit.score = score;
                    queue.push(QueuedNode {
                        node: m,
                        score,
                        randtag,
                    });
                }
            }
        }

        if found {
            self.bind_arc_path(net, user, sink_node, src)?;
        }
        for n in dirty {
            self.grid.data_mut(n).visit = Default::default();
        }
        Ok(found)
    }

    /// Binds the found path: backwards through the search predecessors to
    /// the tree attach point, then through the existing tree to the driver,
    /// which carries itself as the uphill sentinel.
    fn bind_arc_path(
        &mut self,
        net: NetId,
        user: usize,
        sink_node: ChannelNode,
        src: ChannelNode,
    ) -> Result<(), RouteError> {
        let mut cursor = sink_node;
        loop {
            let bwd = self.grid.data(cursor).visit.bwd;
            if bwd == cursor {
                break;
            }
            self.bind_node(net, cursor, bwd)?;
            cursor = bwd;
        }
        while cursor != src {
            let Some(b) = self.grid.data(cursor).bound_nets.get(&net) else {
                return Err(RouteError::invariant(format!(
                    "arc of net {net} attaches at {cursor}, which is not on the net's tree"
                )));
            };
            let uphill = b.uphill;
            self.bind_node(net, cursor, uphill)?;
            cursor = uphill;
        }
        self.bind_node(net, src, src)?;
        self.nets[net.as_raw() as usize].arcs[user].routed = true;
        Ok(())
    }
}
