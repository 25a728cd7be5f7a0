//! Error and outcome types for the routing engine.
//!
//! Fatal conditions (an inconsistent device template, a corrupted routing
//! tree) are `Err` values of [`RouteError`] and abort the run. Terminal but
//! expected conditions, like congestion that never legalized or cooperative
//! cancellation, are ordinary [`RouteOutcome`] values so callers can react
//! without error plumbing.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Fatal routing errors.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The device template violates grid bounds or references missing
    /// channel types. Raised before routing begins.
    #[error("channel graph inconsistent: {reason}")]
    GraphInconsistent {
        /// Description of the inconsistency.
        reason: String,
    },

    /// A routing-tree invariant was broken mid-run. Indicates a bug in the
    /// router; the run aborts without releasing bound state.
    #[error("routing invariant violated: {reason}")]
    InvariantViolation {
        /// Description of the violated invariant.
        reason: String,
    },

    /// The router configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RouteError {
    /// Creates a [`RouteError::GraphInconsistent`] with the given reason.
    pub fn graph(reason: impl Into<String>) -> Self {
        Self::GraphInconsistent {
            reason: reason.into(),
        }
    }

    /// Creates a [`RouteError::InvariantViolation`] with the given reason.
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}

/// The terminal state of a routing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteOutcome {
    /// Every arc routed and no node is over capacity.
    Routed {
        /// Number of outer iterations used.
        iterations: u32,
    },
    /// The iteration cap was reached with congestion remaining. The partial
    /// binding is left intact for diagnostics.
    Congested {
        /// Number of nodes still over capacity.
        overflow: usize,
    },
    /// The caller requested cancellation between arc searches.
    Canceled,
}

impl RouteOutcome {
    /// Returns `true` if the run completed with a legal routing.
    pub fn is_routed(&self) -> bool {
        matches!(self, RouteOutcome::Routed { .. })
    }
}
