// SPDX-License-Identifier: MIT OR Apache-2.0
//! Order-preserving, id-keyed port collection.

use crate::port::{Port, PortId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The ports of one node in one direction
///
/// Ports are keyed by id and kept in declaration order. The map and the
/// order are one structure, so they can never disagree in size.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedPorts {
    ports: IndexMap<PortId, Port>,
}

impl OrderedPorts {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a port. Returns false if a port with the same id is already present.
    pub fn add(&mut self, port: Port) -> bool {
        if self.ports.contains_key(&port.id) {
            return false;
        }
        self.ports.insert(port.id.clone(), port);
        true
    }

    /// Remove a port, keeping the relative order of the remaining ports
    pub fn remove(&mut self, id: &PortId) -> Option<Port> {
        self.ports.shift_remove(id)
    }

    /// Exchange the order slots of two ports. Returns false if either is missing.
    pub fn swap_order(&mut self, a: &PortId, b: &PortId) -> bool {
        let (Some(i), Some(j)) = (self.ports.get_index_of(a), self.ports.get_index_of(b)) else {
            return false;
        };
        self.ports.swap_indices(i, j);
        true
    }

    /// Look up a port by id
    pub fn get(&self, id: &PortId) -> Option<&Port> {
        self.ports.get(id)
    }

    /// Look up a port by id, mutably
    pub fn get_mut(&mut self, id: &PortId) -> Option<&mut Port> {
        self.ports.get_mut(id)
    }

    /// Look up a port by id, returning its position as well
    pub fn get_full(&self, id: &PortId) -> Option<(usize, &Port)> {
        self.ports.get_full(id).map(|(index, _, port)| (index, port))
    }

    /// Port at a position
    pub fn get_index(&self, index: usize) -> Option<&Port> {
        self.ports.get_index(index).map(|(_, port)| port)
    }

    /// Position of a port
    pub fn index_of(&self, id: &PortId) -> Option<usize> {
        self.ports.get_index_of(id)
    }

    /// Check for a port id
    pub fn contains(&self, id: &PortId) -> bool {
        self.ports.contains_key(id)
    }

    /// Ports in order
    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Port ids in order
    pub fn ids(&self) -> impl Iterator<Item = &PortId> {
        self.ports.keys()
    }

    /// Number of ports
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether there are no ports
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Port> {
        self.ports.values_mut()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Port> + '_ {
        self.ports.drain(..).map(|(_, port)| port)
    }
}

impl<'a> IntoIterator for &'a OrderedPorts {
    type Item = &'a Port;
    type IntoIter = indexmap::map::Values<'a, PortId, Port>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Guid;
    use crate::port::{PortCapacity, PortDecl, PortDirection, PortType};

    fn ports(ids: &[&str]) -> OrderedPorts {
        let node = Guid::new();
        let mut ports = OrderedPorts::new();
        for id in ids {
            ports.add(Port::from_decl(
                node,
                PortDirection::Input,
                PortDecl::new(*id, PortType::Float),
                PortCapacity::Single,
            ));
        }
        ports
    }

    fn order(ports: &OrderedPorts) -> Vec<&str> {
        ports.ids().map(PortId::as_str).collect()
    }

    #[test]
    fn test_add_preserves_order() {
        let ports = ports(&["a", "b", "c"]);
        assert_eq!(order(&ports), vec!["a", "b", "c"]);
        assert_eq!(ports.get_index(1).map(|p| p.id.as_str()), Some("b"));
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut ports = ports(&["a"]);
        let again = ports.get(&PortId::from("a")).cloned().unwrap();
        assert!(!ports.add(again));
        assert_eq!(ports.len(), 1);
    }

    #[test]
    fn test_remove_shifts_order() {
        let mut ports = ports(&["a", "b", "c", "d"]);
        assert!(ports.remove(&PortId::from("b")).is_some());
        assert_eq!(order(&ports), vec!["a", "c", "d"]);
        assert_eq!(ports.index_of(&PortId::from("d")), Some(2));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut ports = ports(&["a"]);
        assert!(ports.remove(&PortId::from("zz")).is_none());
        assert_eq!(ports.len(), 1);
    }

    #[test]
    fn test_swap_order_only_moves_slots() {
        let mut ports = ports(&["a", "b", "c"]);
        assert!(ports.swap_order(&PortId::from("a"), &PortId::from("c")));
        assert_eq!(order(&ports), vec!["c", "b", "a"]);
        assert!(ports.get(&PortId::from("a")).is_some());
        assert!(!ports.swap_order(&PortId::from("a"), &PortId::from("missing")));
    }
}
