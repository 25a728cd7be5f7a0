//! Static channel-type templates describing the routing fabric.
//!
//! A device is described by a small set of [`ChannelType`]s, each of which is
//! stamped out at every grid coordinate. Channels are directional wire
//! segments of a fixed length; [`ChannelJunction`] templates describe where
//! along a channel it can hop to a neighboring channel. The templates are
//! loaded once from the device backend and never change during routing.

use serde::{Deserialize, Serialize};

/// The run direction of a channel across the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    /// Increasing x.
    East,
    /// Decreasing x.
    West,
    /// Increasing y.
    North,
    /// Decreasing y.
    South,
}

/// A downhill junction template on a channel type.
///
/// `src_along` is the offset along the source channel (in grid units, from
/// its origin toward its run direction) where the junction sits; `dst_along`
/// is the corresponding offset along the destination channel. Offsets must
/// lie within the respective channel lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelJunction {
    /// Offset along the source channel where this junction originates.
    pub src_along: i32,
    /// Index of the destination channel type.
    pub dst_type: u32,
    /// Offset along the destination channel where this junction lands.
    pub dst_along: i32,
}

/// The static template for one family of channels.
///
/// A channel type is instantiated at every grid coordinate; its `width` is
/// the number of nets that may legally share one node of this type. The
/// router treats `cost` as the base price of crossing one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelType {
    /// The direction this channel runs in.
    pub dir: Dir,
    /// The length of the channel in grid units.
    pub length: i32,
    /// Base routing cost of one node of this type.
    pub cost: f32,
    /// Capacity: how many nets may share one node before it is over capacity.
    pub width: u32,
    /// Downhill junction templates leaving this channel.
    pub downhill: Vec<ChannelJunction>,
}
