//! The outer negotiated-congestion loop.
//!
//! Each iteration routes every net: arcs whose paths cross over-capacity
//! nodes are ripped up and re-searched, a failed search gets one retry with
//! an enlarged bounding box, and unresolved congestion raises the historical
//! cost of the offending nodes before the next iteration. Present-congestion
//! pricing tightens geometrically, so competing nets are progressively
//! pushed apart until the routing legalizes or the iteration cap is hit.

use crate::cancel::CancelToken;
use crate::error::{RouteError, RouteOutcome};
use crate::router::Router;
use sluice_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use sluice_fabric::NetId;
use std::cmp::Reverse;
use std::time::Instant;

impl Router {
    /// Routes all nets to a terminal outcome.
    ///
    /// Nets are visited in decreasing bounding-box area (ties to the lower
    /// net id), arcs within a net in increasing driver distance. The run is
    /// deterministic for identical inputs, config, and seed. Cancellation is
    /// honored between arc searches; the binding state stays consistent.
    pub fn route(
        &mut self,
        cancel: &CancelToken,
        sink: &DiagnosticSink,
    ) -> Result<RouteOutcome, RouteError> {
        self.curr_cong_weight = self.cfg.init_curr_cong;
        self.hist_cong_weight = self.cfg.init_hist_cong;

        let mut order: Vec<usize> = (0..self.nets.len())
            .filter(|&i| self.nets[i].src_node.is_some() && self.nets[i].hpwl > 0)
            .collect();
        order.sort_by_key(|&i| (Reverse(self.nets[i].bb.area()), i));

        for iter in 1..=self.cfg.max_iter {
            let mut unrouted = 0usize;
            for &udata in &order {
                let net = NetId::from_raw(udata as u32);
                let arc_order = self.nets[udata].arc_order.clone();
                let started = Instant::now();
                for &user in &arc_order {
                    if cancel.is_canceled() {
                        return Ok(RouteOutcome::Canceled);
                    }
                    if self.nets[udata].arcs[user].routed && self.arc_has_overuse(net, user)? {
                        self.rip_up_arc(net, user)?;
                    }
                    if !self.nets[udata].arcs[user].routed {
                        let routed = self.route_arc(net, user, 0)?
                            || self.route_arc(net, user, self.cfg.bb_grow)?;
                        if !routed {
                            unrouted += 1;
                        }
                    }
                }
                let spent = started.elapsed().as_micros() as u64;
                self.nets[udata].route_time_us += spent;
                self.stats.route_time_us += spent;
            }

            let overflow = self.grid.overused_count();
            self.stats.iterations = iter;
            self.stats.overflow_per_iter.push(overflow);
            if self.cfg.verbose {
                sink.emit(Diagnostic::note(
                    DiagnosticCode::new(Category::Routing, 10),
                    format!(
                        "iteration {iter}: {overflow} nodes over capacity, {unrouted} arcs unrouted"
                    ),
                ));
            }
            if overflow == 0 && unrouted == 0 {
                return Ok(RouteOutcome::Routed { iterations: iter });
            }
            self.grid.update_history(self.hist_cong_weight);
            self.curr_cong_weight *= self.cfg.curr_cong_mult;
        }

        let overflow = self.grid.overused_count();
        sink.emit(Diagnostic::warning(
            DiagnosticCode::new(Category::Routing, 201),
            format!(
                "routing did not converge after {} iterations ({overflow} nodes over capacity)",
                self.cfg.max_iter
            ),
        ));
        for udata in 0..self.nets.len() {
            let net = NetId::from_raw(udata as u32);
            if self.nets[udata].src_node.is_none() {
                continue;
            }
            let mut congested = 0usize;
            let mut missing = 0usize;
            for user in 0..self.nets[udata].arcs.len() {
                if !self.nets[udata].arcs[user].routed {
                    missing += 1;
                } else if self.arc_has_overuse(net, user)? {
                    congested += 1;
                }
            }
            if congested > 0 || missing > 0 {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::new(Category::Routing, 202),
                        format!(
                            "net `{}`: {congested} arcs through over-capacity nodes, {missing} unrouted",
                            self.nets[udata].name
                        ),
                    )
                    .with_net(&self.nets[udata].name),
                );
            }
        }
        Ok(RouteOutcome::Congested { overflow })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::testgrid::TestFabric;
    use sluice_fabric::{ChannelNode, Net, Netlist, Terminal};

    fn netlist(nets: Vec<Net>) -> Netlist {
        let mut nl = Netlist::new();
        for net in nets {
            nl.add_net(net);
        }
        nl
    }

    fn two_pin(name: &str, dx: i32, dy: i32, sx: i32, sy: i32) -> Net {
        Net {
            name: name.into(),
            driver: Some(Terminal::new(dx, dy)),
            users: vec![Terminal::new(sx, sy)],
        }
    }

    /// Every node holds at most `width` nets.
    fn assert_legal(r: &Router) {
        for node in r.grid.iter_nodes().collect::<Vec<_>>() {
            assert!(
                r.grid.overuse(node) <= 0,
                "node {node} over capacity after success"
            );
        }
    }

    /// Every consecutive pair of a routed arc's path is a graph edge.
    fn assert_paths_follow_edges(r: &Router, net: NetId) {
        let udata = net.as_raw() as usize;
        for user in 0..r.nets[udata].arcs.len() {
            let path = r.arc_path(net, user).unwrap();
            for pair in path.windows(2) {
                assert!(
                    r.grid.data(pair[0]).downhill.contains(&pair[1]),
                    "{} -> {} is not an edge",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn trivial_one_hop() {
        let fabric = TestFabric::chain_east(2, 1);
        let nl = netlist(vec![two_pin("n", 0, 0, 1, 0)]);
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, RouterConfig::default(), &sink).unwrap();

        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert_eq!(outcome, RouteOutcome::Routed { iterations: 1 });

        let net = NetId::from_raw(0);
        let nodes: Vec<ChannelNode> = r.bound_nodes(net).iter().map(|b| b.node).collect();
        assert_eq!(
            nodes,
            vec![ChannelNode::new(0, 0, 0), ChannelNode::new(1, 0, 0)]
        );
        assert!(r.is_net_routed(net));
        assert_legal(&r);
    }

    #[test]
    fn forced_sharing_never_legalizes() {
        // Both nets need (1, 0, 0): one as its sink, one as its driver.
        let fabric = TestFabric::chain_east(3, 1);
        let nl = netlist(vec![
            two_pin("a", 0, 0, 1, 0),
            two_pin("b", 1, 0, 2, 0),
        ]);
        let cfg = RouterConfig {
            max_iter: 6,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, cfg, &sink).unwrap();

        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert_eq!(outcome, RouteOutcome::Congested { overflow: 1 });

        let contested = ChannelNode::new(1, 0, 0);
        assert_eq!(r.grid.data(contested).bound_nets.len(), 2);
        assert!(r.grid.data(contested).hist_cong_cost > 1.0);
        assert!(r.stats().overflow_per_iter.iter().all(|&o| o == 1));
        assert_eq!(r.stats().iterations, 6);

        // Partial binding left intact, and the failure was reported: one
        // non-convergence warning plus one summary per congested net.
        assert!(r.is_net_routed(NetId::from_raw(0)));
        assert_eq!(sink.warning_count(), 3);
        let diags = sink.take_all();
        assert!(diags.iter().any(|d| d.message.contains("did not converge")));
        assert!(diags.iter().filter(|d| d.net.is_some()).count() >= 2);
    }

    #[test]
    fn width_two_absorbs_contention() {
        let mut fabric = TestFabric::chain_east(3, 1);
        fabric.channels[0].width = 2;
        let nl = netlist(vec![
            two_pin("a", 0, 0, 1, 0),
            two_pin("b", 1, 0, 2, 0),
        ]);
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, RouterConfig::default(), &sink).unwrap();

        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert_eq!(outcome, RouteOutcome::Routed { iterations: 1 });
        assert_eq!(r.stats().overflow_per_iter, vec![0]);

        let shared = ChannelNode::new(1, 0, 0);
        assert_eq!(r.grid.data(shared).bound_nets.len(), 2);
        assert_legal(&r);
    }

    #[test]
    fn multi_sink_branching() {
        let fabric = TestFabric::manhattan(3, 3, 1);
        let nl = netlist(vec![Net {
            name: "fan".into(),
            driver: Some(Terminal::new(0, 0)),
            users: vec![Terminal::new(2, 0), Terminal::new(0, 2)],
        }]);
        let cfg = RouterConfig {
            bb_margin_x: 1,
            bb_margin_y: 1,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, cfg, &sink).unwrap();

        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert!(outcome.is_routed());

        let net = NetId::from_raw(0);
        let driver = ChannelNode::new(0, 0, 0);
        // One path from the driver to each sink, walkable via uphill links.
        let p0 = r.arc_path(net, 0).unwrap();
        let p1 = r.arc_path(net, 1).unwrap();
        assert_eq!(p0.first(), Some(&driver));
        assert_eq!(p1.first(), Some(&driver));
        assert_eq!(*p0.last().unwrap(), ChannelNode::new(2, 0, 0));
        assert_eq!(*p1.last().unwrap(), ChannelNode::new(0, 2, 0));
        assert_paths_follow_edges(&r, net);
        assert_legal(&r);

        // Shared tree nodes carry one use per arc and a single uphill.
        let bound = r.bound_nodes(net);
        let at_driver = bound.iter().find(|b| b.node == driver).unwrap();
        assert_eq!(at_driver.uses, 2);
        assert_eq!(at_driver.uphill, driver);
    }

    #[test]
    fn bbox_expansion_retry() {
        // The east/west channels at (1, 0) are unavailable, so the only
        // path detours through y = 1, one cell past the zero-margin box.
        let fabric = TestFabric::manhattan(3, 2, 1);
        let nl = netlist(vec![two_pin("n", 0, 0, 2, 0)]);
        let cfg = RouterConfig {
            bb_margin_x: 0,
            bb_margin_y: 0,
            bb_grow: 1,
            max_iter: 4,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, cfg, &sink).unwrap();
        for ty in 0..2 {
            r.set_unavailable(ChannelNode::new(1, 0, ty)).unwrap();
        }

        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert_eq!(outcome, RouteOutcome::Routed { iterations: 1 });

        let net = NetId::from_raw(0);
        let path = r.arc_path(net, 0).unwrap();
        assert!(path.iter().any(|n| n.y == 1), "expected a detour via y=1");
    }

    #[test]
    fn determinism_across_runs() {
        let run = |seed: u64| {
            let fabric = TestFabric::manhattan(3, 3, 1);
            let nl = netlist(vec![Net {
                name: "fan".into(),
                driver: Some(Terminal::new(0, 0)),
                users: vec![Terminal::new(2, 0), Terminal::new(0, 2)],
            }]);
            let cfg = RouterConfig {
                bb_margin_x: 1,
                bb_margin_y: 1,
                seed,
                ..RouterConfig::default()
            };
            let sink = DiagnosticSink::new();
            let mut r = Router::new(&fabric, &nl, cfg, &sink).unwrap();
            let outcome = r.route(&CancelToken::new(), &sink).unwrap();
            assert!(outcome.is_routed());
            r.bound_nodes(NetId::from_raw(0))
        };

        let first = run(42);
        let second = run(42);
        assert_eq!(first, second);
    }

    #[test]
    fn congestion_negotiated_apart() {
        // Net `a` has a shortcut through net `b`'s driver node; history
        // pricing must push it onto the parallel row.
        let fabric = TestFabric::manhattan(3, 2, 1);
        let nl = netlist(vec![
            two_pin("a", 0, 0, 2, 1),
            two_pin("b", 1, 0, 2, 0),
        ]);
        let cfg = RouterConfig {
            bb_margin_x: 1,
            bb_margin_y: 1,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, cfg, &sink).unwrap();

        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert!(outcome.is_routed(), "negotiation should resolve: {outcome:?}");
        assert_legal(&r);
        for raw in 0..2 {
            assert_paths_follow_edges(&r, NetId::from_raw(raw));
        }
    }

    #[test]
    fn reserved_node_starves_other_nets() {
        let fabric = TestFabric::chain_east(3, 1);
        let nl = netlist(vec![two_pin("a", 0, 0, 2, 0)]);
        let cfg = RouterConfig {
            max_iter: 3,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, cfg, &sink).unwrap();
        r.reserve_for(ChannelNode::new(1, 0, 0), NetId::from_raw(9))
            .unwrap();

        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        // The arc can never route, and the reserved node is never taken.
        assert_eq!(outcome, RouteOutcome::Congested { overflow: 0 });
        assert!(!r.is_net_routed(NetId::from_raw(0)));
        assert!(r
            .grid
            .data(ChannelNode::new(1, 0, 0))
            .bound_nets
            .is_empty());
        assert!(!sink.for_net("a").is_empty());
    }

    #[test]
    fn whole_grid_box_reaches_any_reachable_sink() {
        let fabric = TestFabric::manhattan(4, 4, 1);
        let nl = netlist(vec![two_pin("back", 2, 2, 0, 0)]);
        let cfg = RouterConfig {
            bb_margin_x: 4,
            bb_margin_y: 4,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, cfg, &sink).unwrap();
        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert!(outcome.is_routed());
        assert_paths_follow_edges(&r, NetId::from_raw(0));
    }

    #[test]
    fn zero_user_net_trivially_succeeds() {
        let fabric = TestFabric::chain_east(2, 1);
        let nl = netlist(vec![Net {
            name: "lonely".into(),
            driver: Some(Terminal::new(0, 0)),
            users: vec![],
        }]);
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, RouterConfig::default(), &sink).unwrap();
        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert_eq!(outcome, RouteOutcome::Routed { iterations: 1 });
        assert!(r.bound_nodes(NetId::from_raw(0)).is_empty());
    }

    #[test]
    fn driverless_net_does_not_block_success() {
        let fabric = TestFabric::chain_east(2, 1);
        let nl = netlist(vec![
            two_pin("live", 0, 0, 1, 0),
            Net {
                name: "floating".into(),
                driver: None,
                users: vec![Terminal::new(1, 0)],
            },
        ]);
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, RouterConfig::default(), &sink).unwrap();
        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert!(outcome.is_routed());
        assert_eq!(sink.for_net("floating").len(), 1);
    }

    #[test]
    fn cancellation_before_first_arc() {
        let fabric = TestFabric::chain_east(2, 1);
        let nl = netlist(vec![two_pin("n", 0, 0, 1, 0)]);
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, RouterConfig::default(), &sink).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = r.route(&cancel, &sink).unwrap();
        assert_eq!(outcome, RouteOutcome::Canceled);
        // No arc was searched: binding state is untouched and consistent.
        assert!(r.bound_nodes(NetId::from_raw(0)).is_empty());
        assert!(!r.is_net_routed(NetId::from_raw(0)));
    }

    #[test]
    fn history_monotonically_non_decreasing() {
        let fabric = TestFabric::chain_east(3, 1);
        let nl = netlist(vec![
            two_pin("a", 0, 0, 1, 0),
            two_pin("b", 1, 0, 2, 0),
        ]);
        let cfg = RouterConfig {
            max_iter: 4,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, cfg.clone(), &sink).unwrap();
        r.route(&CancelToken::new(), &sink).unwrap();

        // Only the contested node accumulated history; with init_hist_cong
        // weight w and overuse 1, each of the 4 iterations adds w.
        let contested = r.grid.data(ChannelNode::new(1, 0, 0)).hist_cong_cost;
        assert!((contested - (1.0 + 4.0 * cfg.init_hist_cong)).abs() < 1e-5);
        for x in [0, 2] {
            assert_eq!(
                r.grid.data(ChannelNode::new(x, 0, 0)).hist_cong_cost,
                1.0
            );
        }
    }

    #[test]
    fn net_ordering_prefers_larger_bounding_boxes() {
        // Both nets route fine; this exercises the ordering path and the
        // per-net timing accumulation.
        let fabric = TestFabric::manhattan(5, 5, 2);
        let nl = netlist(vec![
            two_pin("short", 0, 4, 1, 4),
            two_pin("long", 0, 0, 4, 0),
        ]);
        let sink = DiagnosticSink::new();
        let mut r = Router::new(&fabric, &nl, RouterConfig::default(), &sink).unwrap();
        let outcome = r.route(&CancelToken::new(), &sink).unwrap();
        assert!(outcome.is_routed());
        assert!(r.net_route_time_us(NetId::from_raw(0)) <= r.stats().route_time_us);
        assert_legal(&r);
    }
}
