//! Shared test fabrics: small in-memory `ChannelGraph` implementations.

use sluice_fabric::{ChannelGraph, ChannelJunction, ChannelNode, ChannelType, Dir, Net, Terminal};

/// A toy device: a rectangular grid of unit-length channels where every
/// terminal maps to the channel of type 0 at its coordinates.
#[derive(Debug)]
pub(crate) struct TestFabric {
    pub width: i32,
    pub height: i32,
    pub channels: Vec<ChannelType>,
}

impl TestFabric {
    /// A single EAST channel type stepping one cell forward per junction.
    /// On a `w`x`h` grid this materializes left-to-right chains.
    pub fn chain_east(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            channels: vec![ChannelType {
                dir: Dir::East,
                length: 1,
                cost: 1.0,
                width: 1,
                downhill: vec![ChannelJunction {
                    src_along: 1,
                    dst_type: 0,
                    dst_along: 0,
                }],
            }],
        }
    }

    /// Four unit-length channel types (east, west, north, south), each able
    /// to junction into any type one cell along its run direction. Every
    /// interior node can reach its four neighbors.
    pub fn manhattan(width: i32, height: i32, chan_width: u32) -> Self {
        let dirs = [Dir::East, Dir::West, Dir::North, Dir::South];
        let channels = dirs
            .iter()
            .map(|&dir| ChannelType {
                dir,
                length: 1,
                cost: 1.0,
                width: chan_width,
                downhill: (0..dirs.len() as u32)
                    .map(|dst_type| ChannelJunction {
                        src_along: 1,
                        dst_type,
                        dst_along: 0,
                    })
                    .collect(),
            })
            .collect();
        Self {
            width,
            height,
            channels,
        }
    }
}

impl ChannelGraph for TestFabric {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn channels(&self) -> Vec<ChannelType> {
        self.channels.clone()
    }

    fn source_node(&self, net: &Net) -> ChannelNode {
        let d = net.driver.as_ref().unwrap();
        ChannelNode::new(d.x, d.y, 0)
    }

    fn sink_node(&self, _net: &Net, user: &Terminal) -> ChannelNode {
        ChannelNode::new(user.x, user.y, 0)
    }
}
