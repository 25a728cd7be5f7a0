//! Binding maintenance: bind, unbind, rip-up, and tree walks.
//!
//! A net's routing tree is stored flat: each bound node records one use
//! count and one uphill predecessor. Trees are never materialized as linked
//! structures; they are walked on demand by following uphill links from a
//! sink toward the driver.

use crate::error::RouteError;
use crate::router::graph::BoundNet;
use crate::router::Router;
use sluice_fabric::{ChannelNode, NetId};
use std::collections::HashSet;

impl Router {
    /// Adds one use of `node` by `net`, entering from `uphill`.
    ///
    /// The first use records the uphill; every later use must agree with it,
    /// since a net forms a tree rooted at its driver. Disagreement is an
    /// [`RouteError::InvariantViolation`].
    pub(crate) fn bind_node(
        &mut self,
        net: NetId,
        node: ChannelNode,
        uphill: ChannelNode,
    ) -> Result<(), RouteError> {
        let b = self
            .grid
            .data_mut(node)
            .bound_nets
            .entry(net)
            .or_insert(BoundNet { uses: 0, uphill });
        b.uses += 1;
        if b.uses == 1 {
            b.uphill = uphill;
        } else if b.uphill != uphill {
            return Err(RouteError::invariant(format!(
                "net {net} enters {node} from {uphill}, but an earlier arc entered from {}",
                b.uphill
            )));
        }
        Ok(())
    }

    /// Removes one use of `node` by `net`, erasing the binding at zero.
    pub(crate) fn unbind_node(&mut self, net: NetId, node: ChannelNode) -> Result<(), RouteError> {
        let wd = self.grid.data_mut(node);
        let Some(b) = wd.bound_nets.get_mut(&net) else {
            return Err(RouteError::invariant(format!(
                "net {net} is not bound at {node}"
            )));
        };
        b.uses -= 1;
        if b.uses == 0 {
            wd.bound_nets.remove(&net);
        }
        Ok(())
    }

    /// Unwinds one arc's path, releasing one use of every node from the
    /// sink back through the driver. No-op for unrouted arcs.
    pub(crate) fn rip_up_arc(&mut self, net: NetId, user: usize) -> Result<(), RouteError> {
        let nd = &self.nets[net.as_raw() as usize];
        if !nd.arcs[user].routed {
            return Ok(());
        }
        let Some(src) = nd.src_node else {
            return Ok(());
        };
        let mut cursor = nd.arcs[user].sink_node;
        loop {
            let Some(b) = self.grid.data(cursor).bound_nets.get(&net) else {
                return Err(RouteError::invariant(format!(
                    "rip-up of net {net} left its tree at {cursor}"
                )));
            };
            let uphill = b.uphill;
            self.unbind_node(net, cursor)?;
            if cursor == src {
                break;
            }
            cursor = uphill;
        }
        self.nets[net.as_raw() as usize].arcs[user].routed = false;
        Ok(())
    }

    /// Walks one routed arc from its sink to the driver, returning the
    /// nodes in walk order. Empty for unrouted arcs.
    pub(crate) fn walk_arc(
        &self,
        net: NetId,
        user: usize,
    ) -> Result<Vec<ChannelNode>, RouteError> {
        let nd = &self.nets[net.as_raw() as usize];
        if !nd.arcs[user].routed {
            return Ok(Vec::new());
        }
        let Some(src) = nd.src_node else {
            return Ok(Vec::new());
        };
        // A well-formed tree path visits each node at most once.
        let limit = (self.grid.width() * self.grid.height()) as usize * self.grid.type_count();
        let mut path = Vec::new();
        let mut cursor = nd.arcs[user].sink_node;
        loop {
            path.push(cursor);
            if cursor == src {
                break;
            }
            if path.len() > limit {
                return Err(RouteError::invariant(format!(
                    "walk of net {net} from {} does not reach the driver",
                    nd.arcs[user].sink_node
                )));
            }
            let Some(b) = self.grid.data(cursor).bound_nets.get(&net) else {
                return Err(RouteError::invariant(format!(
                    "walk of net {net} left its tree at {cursor}"
                )));
            };
            cursor = b.uphill;
        }
        Ok(path)
    }

    /// Whether any node on a routed arc's path is over capacity.
    pub(crate) fn arc_has_overuse(&self, net: NetId, user: usize) -> Result<bool, RouteError> {
        Ok(self
            .walk_arc(net, user)?
            .iter()
            .any(|&n| self.grid.overuse(n) > 0))
    }

    /// Collects the nodes of the net's current tree (the driver plus every
    /// node on a routed arc's path) in deterministic encounter order. These
    /// seed each arc search so later arcs can branch anywhere on the tree.
    pub(crate) fn tree_nodes(&self, net: NetId) -> Result<Vec<ChannelNode>, RouteError> {
        let nd = &self.nets[net.as_raw() as usize];
        let Some(src) = nd.src_node else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        let mut out = vec![src];
        seen.insert(src);
        for user in 0..nd.arcs.len() {
            for node in self.walk_arc(net, user)? {
                if seen.insert(node) {
                    out.push(node);
                }
            }
        }
        Ok(out)
    }
}
