// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural integrity checks.
//!
//! The checker never modifies the graph. Loaders run it after repairing
//! edges and log what is left.

use crate::edge::PortReference;
use crate::element::{GraphElement, Guid};
use crate::graph::GraphModel;
use crate::node::NodeDefinition;
use crate::port::{PortDirection, PortId};
use std::collections::HashSet;
use std::fmt;

/// One problem found by [`GraphModel::check_integrity`]
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    /// An edge end does not resolve to a port
    DanglingEdgeEndpoint {
        /// Edge
        edge: Guid,
        /// The unresolved end
        endpoint: PortReference,
    },
    /// An edge's ends are not an output and an input of the same kind
    MismatchedEndpoints {
        /// Edge
        edge: Guid,
    },
    /// A port's owner guid does not match the node holding it
    PortOwnerMismatch {
        /// Node holding the port
        node: Guid,
        /// Port id
        port: PortId,
        /// Side of the node
        direction: PortDirection,
    },
    /// A node refers to a declaration that does not exist
    MissingDeclaration {
        /// Node
        node: Guid,
        /// Missing declaration
        declaration: Guid,
    },
    /// The same guid is registered twice
    DuplicateGuid {
        /// Guid
        guid: Guid,
    },
    /// A collapsed placemat hides an element that no longer exists
    DanglingHiddenElement {
        /// Placemat
        placemat: Guid,
        /// Missing element
        element: Guid,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingEdgeEndpoint { edge, endpoint } => {
                write!(f, "edge {edge} has a dangling end {endpoint}")
            }
            Self::MismatchedEndpoints { edge } => write!(f, "edge {edge} links incompatible ports"),
            Self::PortOwnerMismatch { node, port, direction } => {
                write!(f, "port {port} ({direction:?}) on node {node} names another owner")
            }
            Self::MissingDeclaration { node, declaration } => {
                write!(f, "node {node} refers to missing declaration {declaration}")
            }
            Self::DuplicateGuid { guid } => write!(f, "guid {guid} is registered twice"),
            Self::DanglingHiddenElement { placemat, element } => {
                write!(f, "placemat {placemat} hides missing element {element}")
            }
        }
    }
}

/// Result of an integrity check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    /// Problems found, in discovery order
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// Whether no problem was found
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Log every issue as a warning
    pub fn log(&self, graph_name: &str) {
        for issue in &self.issues {
            tracing::warn!("Graph {}: {}", graph_name, issue);
        }
    }
}

impl GraphModel {
    /// Check structural invariants
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        let guids = self
            .nodes
            .keys()
            .chain(self.edges.keys())
            .chain(self.declarations.keys())
            .chain(self.placemats.keys())
            .chain(self.sticky_notes.keys());
        for guid in guids {
            if !seen.insert(*guid) {
                issues.push(IntegrityIssue::DuplicateGuid { guid: *guid });
            }
        }

        for (guid, node) in &self.nodes {
            for port in node.all_ports() {
                if port.node != *guid {
                    issues.push(IntegrityIssue::PortOwnerMismatch {
                        node: *guid,
                        port: port.id.clone(),
                        direction: port.direction,
                    });
                }
            }
            if let Some(declaration) = node.kind.declaration() {
                if !self.declarations.contains_key(&declaration) {
                    issues.push(IntegrityIssue::MissingDeclaration {
                        node: *guid,
                        declaration,
                    });
                }
            }
        }

        for (guid, edge) in &self.edges {
            let output = edge.output().resolve(self);
            let input = edge.input().resolve(self);
            for (end, resolved) in [(edge.output(), output.is_some()), (edge.input(), input.is_some())] {
                if !resolved {
                    issues.push(IntegrityIssue::DanglingEdgeEndpoint {
                        edge: *guid,
                        endpoint: end.clone(),
                    });
                }
            }
            let directions_ok =
                edge.output().direction == PortDirection::Output && edge.input().direction == PortDirection::Input;
            let kinds_ok = match (output, input) {
                (Some(output), Some(input)) => output.kind == input.kind,
                _ => true,
            };
            if !directions_ok || !kinds_ok {
                issues.push(IntegrityIssue::MismatchedEndpoints { edge: *guid });
            }
        }

        for placemat in self.placemats.values() {
            for element in placemat.hidden_element_ids() {
                if !self.contains(*element) {
                    issues.push(IntegrityIssue::DanglingHiddenElement {
                        placemat: placemat.guid(),
                        element: *element,
                    });
                }
            }
        }

        IntegrityReport { issues }
    }
}
