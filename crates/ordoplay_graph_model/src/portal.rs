// SPDX-License-Identifier: MIT OR Apache-2.0
//! Portals: pairs of nodes that carry a value or flow without a drawn edge.

use crate::element::Guid;
use crate::graph::{GraphError, GraphModel};
use crate::node::NodeModel;
use crate::nodes::{NodeKind, PortalEnd, PortalNode};
use crate::port::PortType;
use crate::variable::VariableDeclaration;

impl GraphModel {
    /// Declare a portal
    pub fn declare_portal(&mut self, name: impl Into<String>, data_type: PortType) -> Guid {
        self.insert_declaration(VariableDeclaration::portal(name, data_type))
    }

    /// Create a portal end for an existing portal declaration
    ///
    /// Any number of ends may share a declaration.
    pub fn create_portal(&mut self, declaration: Guid, end: PortalEnd, position: [f32; 2]) -> Result<Guid, GraphError> {
        let portal = self
            .declarations
            .get(&declaration)
            .ok_or(GraphError::DeclarationNotFound(declaration))?;
        if portal.is_graph_scoped() {
            return Err(GraphError::InvalidArgument(format!(
                "{declaration} is not a portal declaration"
            )));
        }
        let title = portal.name.clone();
        Ok(self.create_node(NodeKind::Portal(PortalNode { declaration, end }), title, position))
    }

    /// Portal ends sharing a declaration
    pub fn portals(&self, declaration: Guid) -> impl Iterator<Item = &NodeModel> {
        self.nodes.values().filter(move |node| {
            node.kind
                .as_portal()
                .is_some_and(|portal| portal.declaration == declaration)
        })
    }

    /// Whether a declaration already has an entry end
    pub fn has_entry_portal(&self, declaration: Guid) -> bool {
        self.portals(declaration)
            .any(|node| node.kind.as_portal().is_some_and(|p| p.end == PortalEnd::Entry))
    }

    /// Create the other end of a portal
    ///
    /// Creating an entry is refused while the declaration already has one;
    /// exits are never refused. Returns `None` if `portal` is not a portal
    /// node or the request is refused.
    pub fn create_opposite_portal(&mut self, portal: Guid, position: [f32; 2]) -> Option<Guid> {
        let config = self.nodes.get(&portal)?.kind.as_portal()?.clone();
        let end = config.end.opposite();
        if end == PortalEnd::Entry && self.has_entry_portal(config.declaration) {
            tracing::debug!("Refused second entry portal for {}", config.declaration);
            return None;
        }
        self.create_portal(config.declaration, end, position).ok()
    }
}
