//! Opaque ID newtypes for routing entities.
//!
//! [`NetId`] is a thin `u32` wrapper identifying a net inside the router.
//! IDs are dense indices assigned by the router in canonical net order, so
//! they double as stable sort keys for deterministic iteration.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a net under route.
    ///
    /// Assigned densely by the router in canonical (name-sorted) net order.
    NetId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn net_id_roundtrip() {
        let id = NetId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn id_equality() {
        let a = NetId::from_raw(3);
        let b = NetId::from_raw(3);
        let c = NetId::from_raw(4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn id_ordering_follows_raw_index() {
        let mut set = BTreeSet::new();
        set.insert(NetId::from_raw(2));
        set.insert(NetId::from_raw(0));
        set.insert(NetId::from_raw(1));
        let raws: Vec<u32> = set.iter().map(|id| id.as_raw()).collect();
        assert_eq!(raws, vec![0, 1, 2]);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = NetId::from_raw(55);
        let json = serde_json::to_string(&id).unwrap();
        let restored: NetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn id_display() {
        let id = NetId::from_raw(7);
        assert_eq!(format!("{id}"), "7");
    }
}
