//! The design-side netlist interface the router consumes.
//!
//! A [`Netlist`] is an ordered collection of [`Net`]s produced by placement:
//! each net has a canonical name, an optional driver terminal, and an ordered
//! list of user terminals. The router never iterates nets in container order;
//! it sorts by canonical name to keep results deterministic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A placed net terminal: the grid coordinate of a driver or user pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terminal {
    /// Grid x coordinate of the placed cell pin.
    pub x: i32,
    /// Grid y coordinate of the placed cell pin.
    pub y: i32,
}

impl Terminal {
    /// Creates a terminal at `(x, y)`.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One net of the placed design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// Canonical net name, unique within the netlist.
    pub name: String,
    /// The driver terminal, if the net has one.
    pub driver: Option<Terminal>,
    /// User terminals, in design order.
    pub users: Vec<Terminal>,
}

/// The placed netlist handed to the router.
///
/// Nets are stored in insertion order; an auxiliary name index supports
/// lookup and is rebuilt after deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// All nets, in insertion order.
    pub nets: Vec<Net>,
    /// Auxiliary index: net name to position (rebuilt on deserialization).
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a net and returns its position in insertion order.
    pub fn add_net(&mut self, net: Net) -> usize {
        let index = self.nets.len();
        self.by_name.insert(net.name.clone(), index);
        self.nets.push(net);
        index
    }

    /// Returns the net with the given canonical name.
    pub fn find(&self, name: &str) -> Option<&Net> {
        self.by_name.get(name).map(|&i| &self.nets[i])
    }

    /// Returns the number of nets.
    pub fn len(&self) -> usize {
        self.nets.len()
    }

    /// Returns whether the netlist contains no nets.
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// Rebuilds the name index after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.by_name.clear();
        for (i, net) in self.nets.iter().enumerate() {
            self.by_name.insert(net.name.clone(), i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_terminal_net(name: &str) -> Net {
        Net {
            name: name.to_string(),
            driver: Some(Terminal::new(0, 0)),
            users: vec![Terminal::new(3, 1)],
        }
    }

    #[test]
    fn empty_netlist() {
        let nl = Netlist::new();
        assert!(nl.is_empty());
        assert_eq!(nl.len(), 0);
        assert!(nl.find("missing").is_none());
    }

    #[test]
    fn add_and_find() {
        let mut nl = Netlist::new();
        nl.add_net(two_terminal_net("clk"));
        nl.add_net(two_terminal_net("data_0"));
        assert_eq!(nl.len(), 2);
        let net = nl.find("data_0").unwrap();
        assert_eq!(net.users.len(), 1);
        assert!(nl.find("data_1").is_none());
    }

    #[test]
    fn insertion_order_preserved() {
        let mut nl = Netlist::new();
        nl.add_net(two_terminal_net("z"));
        nl.add_net(two_terminal_net("a"));
        assert_eq!(nl.nets[0].name, "z");
        assert_eq!(nl.nets[1].name, "a");
    }

    #[test]
    fn driverless_net_representable() {
        let mut nl = Netlist::new();
        nl.add_net(Net {
            name: "floating".to_string(),
            driver: None,
            users: vec![Terminal::new(1, 1)],
        });
        assert!(nl.find("floating").unwrap().driver.is_none());
    }

    #[test]
    fn serde_roundtrip_rebuilds_index() {
        let mut nl = Netlist::new();
        nl.add_net(two_terminal_net("net_a"));
        nl.add_net(two_terminal_net("net_b"));

        let json = serde_json::to_string(&nl).unwrap();
        let mut back: Netlist = serde_json::from_str(&json).unwrap();
        assert!(back.find("net_a").is_none());
        back.rebuild_indices();
        assert!(back.find("net_a").is_some());
        assert!(back.find("net_b").is_some());
    }
}
