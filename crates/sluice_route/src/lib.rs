//! Negotiated-congestion channel router for grid-structured fabrics.
//!
//! This crate takes a placed [`Netlist`](sluice_fabric::Netlist) and a device
//! [`ChannelGraph`](sluice_fabric::ChannelGraph) and binds every net's
//! driver-to-sink arcs onto channel nodes, resolving contention iteratively:
//! arcs route with an A*-style search biased toward the net centroid, and
//! nodes that stay over capacity accumulate a historical penalty that drives
//! competing nets apart across iterations.
//!
//! # Pipeline
//!
//! 1. **Setup** — materialize the node grid from the channel templates and
//!    build per-net records in canonical net order
//! 2. **Route** — outer negotiated-congestion loop over nets, arc by arc
//! 3. **Readout** — walk each net's flat routing tree via uphill links
//!
//! # Usage
//!
//! ```ignore
//! use sluice_route::{route_netlist, CancelToken, RouterConfig};
//!
//! let sink = DiagnosticSink::new();
//! let (router, outcome) = route_netlist(&graph, &netlist, RouterConfig::default(),
//!     &CancelToken::new(), &sink)?;
//! assert!(outcome.is_routed());
//! ```

#![warn(missing_docs)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod router;

#[cfg(test)]
pub(crate) mod testgrid;

pub use cancel::CancelToken;
pub use config::{ConfigError, RouterConfig};
pub use error::{RouteError, RouteOutcome};
pub use router::{BoundNode, Router, RouterStats};

use sluice_diagnostics::DiagnosticSink;
use sluice_fabric::{ChannelGraph, Netlist};

/// Builds a router and runs it to a terminal outcome.
///
/// Convenience wrapper over [`Router::new`] followed by [`Router::route`].
/// The router is returned alongside the outcome so callers can read back
/// bindings, per-net trees, and stats, including the partial binding left
/// intact after a congested run.
pub fn route_netlist(
    g: &dyn ChannelGraph,
    netlist: &Netlist,
    cfg: RouterConfig,
    cancel: &CancelToken,
    sink: &DiagnosticSink,
) -> Result<(Router, RouteOutcome), RouteError> {
    let mut router = Router::new(g, netlist, cfg, sink)?;
    let outcome = router.route(cancel, sink)?;
    Ok((router, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgrid::TestFabric;
    use sluice_fabric::{ChannelNode, Net, NetId, Terminal};

    #[test]
    fn route_netlist_end_to_end() {
        let fabric = TestFabric::chain_east(3, 1);
        let mut nl = Netlist::new();
        nl.add_net(Net {
            name: "n".into(),
            driver: Some(Terminal::new(0, 0)),
            users: vec![Terminal::new(2, 0)],
        });

        let sink = DiagnosticSink::new();
        let (router, outcome) = route_netlist(
            &fabric,
            &nl,
            RouterConfig::default(),
            &CancelToken::new(),
            &sink,
        )
        .unwrap();

        assert_eq!(outcome, RouteOutcome::Routed { iterations: 1 });
        let path = router.arc_path(NetId::from_raw(0), 0).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], ChannelNode::new(0, 0, 0));
        assert_eq!(path[2], ChannelNode::new(2, 0, 0));
    }

    #[test]
    fn route_netlist_propagates_setup_errors() {
        let fabric = TestFabric::chain_east(0, 0);
        let nl = Netlist::new();
        let sink = DiagnosticSink::new();
        let err = route_netlist(
            &fabric,
            &nl,
            RouterConfig::default(),
            &CancelToken::new(),
            &sink,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::GraphInconsistent { .. }));
    }

    #[test]
    fn reexports_available() {
        let _ = RouterConfig::default();
        let _ = CancelToken::new();
        let _ = RouteOutcome::Canceled;
    }
}
