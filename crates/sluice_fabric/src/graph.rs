//! Channel nodes and the device-side provider interface.

use crate::netlist::{Net, Terminal};
use crate::types::ChannelType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One routable node in the channel graph: a channel of type `ty` anchored
/// at grid coordinate `(x, y)`.
///
/// Equality is structural on all three fields. The `Ord` implementation
/// orders by `(y, x, ty)` storage order, which keeps sorted node lists
/// deterministic in tests and dumps.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChannelNode {
    /// Grid y coordinate of the channel origin.
    pub y: i32,
    /// Grid x coordinate of the channel origin.
    pub x: i32,
    /// Channel type index into the device's channel list.
    pub ty: u32,
}

impl ChannelNode {
    /// Creates a channel node at `(x, y)` with channel type `ty`.
    pub fn new(x: i32, y: i32, ty: u32) -> Self {
        Self { x, y, ty }
    }
}

impl fmt::Display for ChannelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.ty)
    }
}

/// The device-side interface the router consumes.
///
/// A backend materializes the channel graph template: grid dimensions, the
/// channel type list, and the binding from placed net terminals to channel
/// nodes. The router queries this once at setup and owns all derived state.
pub trait ChannelGraph: fmt::Debug {
    /// Returns the grid width in cells.
    fn width(&self) -> i32;

    /// Returns the grid height in cells.
    fn height(&self) -> i32;

    /// Returns the channel type templates, indexed by `ChannelNode::ty`.
    fn channels(&self) -> Vec<ChannelType>;

    /// Returns the channel node driven by the net's driver.
    ///
    /// Only called for nets with a driver terminal.
    fn source_node(&self, net: &Net) -> ChannelNode;

    /// Returns the channel node feeding the given user terminal of the net.
    fn sink_node(&self, net: &Net, user: &Terminal) -> ChannelNode;
}
