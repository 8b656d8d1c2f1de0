// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edges and the guid-based references to their endpoint ports.

use crate::element::{Capabilities, ElementInfo, ElementKind, GraphElement, Guid};
use crate::graph::GraphModel;
use crate::port::{Port, PortDirection, PortId};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

/// Weak pointer to a port: owning node guid, port id and direction
///
/// Resolution goes through the graph's node index every time the cached
/// position does not match, so a reference survives its node being
/// redefined or reloaded.
#[derive(Clone, Serialize, Deserialize)]
pub struct PortReference {
    /// Owning node
    pub node: Guid,
    /// Port id on that node
    pub port: PortId,
    /// Side of the node the port is on
    pub direction: PortDirection,
    /// Position of the port in its node's ordered ports at last resolution
    #[serde(skip)]
    cached_index: Cell<Option<usize>>,
}

impl PortReference {
    /// Create a reference
    pub fn new(node: Guid, port: impl Into<PortId>, direction: PortDirection) -> Self {
        Self {
            node,
            port: port.into(),
            direction,
            cached_index: Cell::new(None),
        }
    }

    /// Reference to an output port
    pub fn output(node: Guid, port: impl Into<PortId>) -> Self {
        Self::new(node, port, PortDirection::Output)
    }

    /// Reference to an input port
    pub fn input(node: Guid, port: impl Into<PortId>) -> Self {
        Self::new(node, port, PortDirection::Input)
    }

    /// Resolve to the referenced port
    pub fn resolve<'g>(&self, graph: &'g GraphModel) -> Option<&'g Port> {
        let node = graph.node(self.node)?;
        let ports = node.ports(self.direction);

        if let Some(index) = self.cached_index.get() {
            match ports.get_index(index) {
                Some(port)
                    if port.id == self.port
                        && port.node == self.node
                        && port.direction == self.direction =>
                {
                    return Some(port);
                }
                _ => self.cached_index.set(None),
            }
        }

        let (index, port) = ports.get_full(&self.port)?;
        self.cached_index.set(Some(index));
        Some(port)
    }

    /// Drop the cached resolution
    pub fn invalidate(&self) {
        self.cached_index.set(None);
    }

    /// Point the reference at another port id on the same node
    pub(crate) fn retarget(&mut self, port: PortId) {
        self.port = port;
        self.invalidate();
    }

    /// Point the reference at another node
    pub(crate) fn rebind(&mut self, node: Guid) {
        self.node = node;
        self.invalidate();
    }

    /// Whether this reference designates the given port
    pub fn points_to(&self, node: Guid, port: &PortId, direction: PortDirection) -> bool {
        self.node == node && self.port == *port && self.direction == direction
    }
}

impl PartialEq for PortReference {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.port == other.port && self.direction == other.direction
    }
}

impl Eq for PortReference {}

impl fmt::Debug for PortReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for PortReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.direction {
            PortDirection::Input => "in",
            PortDirection::Output => "out",
        };
        write!(f, "{}:{}:{}", self.node, side, self.port)
    }
}

/// A connection from an output port to an input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeModel {
    pub(crate) info: ElementInfo,
    /// Output end
    pub(crate) output: PortReference,
    /// Input end
    pub(crate) input: PortReference,
    /// Set once the edge has been removed from its graph
    #[serde(skip)]
    pub destroyed: bool,
}

impl EdgeModel {
    /// Create an edge between two references. The references must be an output and an input.
    pub fn new(output: PortReference, input: PortReference) -> Self {
        Self {
            info: ElementInfo::new(Capabilities::for_edge()),
            output,
            input,
            destroyed: false,
        }
    }

    /// Output end
    pub fn output(&self) -> &PortReference {
        &self.output
    }

    /// Input end
    pub fn input(&self) -> &PortReference {
        &self.input
    }

    /// End on the given side
    pub fn end(&self, direction: PortDirection) -> &PortReference {
        match direction {
            PortDirection::Output => &self.output,
            PortDirection::Input => &self.input,
        }
    }

    pub(crate) fn end_mut(&mut self, direction: PortDirection) -> &mut PortReference {
        match direction {
            PortDirection::Output => &mut self.output,
            PortDirection::Input => &mut self.input,
        }
    }

    /// Stable display id built from both endpoint references
    pub fn display_id(&self) -> String {
        format!("{}/{}", self.output, self.input)
    }

    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node: Guid) -> bool {
        self.output.node == node || self.input.node == node
    }

    /// Check if this edge is attached to a specific port
    pub fn involves_port(&self, node: Guid, port: &PortId, direction: PortDirection) -> bool {
        self.end(direction).points_to(node, port, direction)
    }

    /// Whether this edge links exactly these two ports
    pub fn links(&self, output: &PortReference, input: &PortReference) -> bool {
        self.output == *output && self.input == *input
    }
}

impl GraphElement for EdgeModel {
    const KIND: ElementKind = ElementKind::Edge;

    fn info(&self) -> &ElementInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ElementInfo {
        &mut self.info
    }
}

/// How an edge end was resolved by [`GraphModel::repair_edge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRepair {
    /// The port exists
    Resolved,
    /// The node migrated the stale id to a current port
    Migrated,
    /// A placeholder port was created for the stale id
    Placeholder,
    /// The owning node does not exist, or placeholders are disabled
    Unresolved,
}
