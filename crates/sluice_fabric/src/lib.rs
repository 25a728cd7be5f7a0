//! Channel fabric model for the Sluice global router.
//!
//! This crate defines the static description of a grid-structured routing
//! fabric (channel types, junction templates, channel nodes) together with
//! the two provider interfaces the router consumes: the [`ChannelGraph`]
//! (device side) and the [`Netlist`] (design side). The router core in
//! `sluice_route` builds its working data from these and never mutates them.
//!
//! # Usage
//!
//! A device backend implements [`ChannelGraph`] to expose its grid size,
//! channel templates, and the mapping from placed net terminals to channel
//! nodes. A frontend fills a [`Netlist`] with named nets, each carrying an
//! optional driver terminal and an ordered list of user terminals.

#![warn(missing_docs)]

pub mod graph;
pub mod ids;
pub mod netlist;
pub mod types;

pub use graph::{ChannelGraph, ChannelNode};
pub use ids::NetId;
pub use netlist::{Net, Netlist, Terminal};
pub use types::{ChannelJunction, ChannelType, Dir};
