// SPDX-License-Identifier: MIT OR Apache-2.0
//! Variable and portal declarations.
//!
//! Graph-scoped variables are listed on the blackboard; any change to them
//! flags the change list's blackboard bit. Portal declarations are private to
//! the portal nodes sharing them.

use crate::element::{Capabilities, Capability, ElementInfo, ElementKind, GraphElement, Guid};
use crate::graph::{GraphError, GraphModel};
use crate::node::{NodeDefinition, NodeModel};
use crate::nodes::{NodeKind, VariableNode};
use crate::port::{PortType, PortValue};
use serde::{Deserialize, Serialize};

/// Where a declaration is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VariableScope {
    /// Listed on the graph blackboard
    #[default]
    Graph,
    /// Shared by the ends of a portal
    Portal,
}

/// A named, typed value declared once and referenced by nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub(crate) info: ElementInfo,
    /// Display name
    pub name: String,
    /// Value type
    pub data_type: PortType,
    /// Visible outside the graph
    #[serde(default)]
    pub exposed: bool,
    /// Initial value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<PortValue>,
    /// Visibility
    #[serde(default)]
    pub scope: VariableScope,
    /// Set once the declaration has been removed from its graph
    #[serde(skip)]
    pub destroyed: bool,
}

impl VariableDeclaration {
    fn with_scope(name: impl Into<String>, data_type: PortType, scope: VariableScope) -> Self {
        Self {
            info: ElementInfo::new(Capabilities::for_variable()),
            name: name.into(),
            initializer: PortValue::default_for(&data_type),
            data_type,
            exposed: false,
            scope,
            destroyed: false,
        }
    }

    /// Graph variable
    pub fn graph(name: impl Into<String>, data_type: PortType) -> Self {
        Self::with_scope(name, data_type, VariableScope::Graph)
    }

    /// Portal declaration
    pub fn portal(name: impl Into<String>, data_type: PortType) -> Self {
        Self::with_scope(name, data_type, VariableScope::Portal)
    }

    /// Whether this declaration belongs on the blackboard
    pub fn is_graph_scoped(&self) -> bool {
        self.scope == VariableScope::Graph
    }
}

impl GraphElement for VariableDeclaration {
    const KIND: ElementKind = ElementKind::Variable;

    fn info(&self) -> &ElementInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ElementInfo {
        &mut self.info
    }
}

impl GraphModel {
    /// Register a declaration. Its guid is assigned if needed.
    pub fn add_declaration(&mut self, mut declaration: VariableDeclaration) -> Result<Guid, GraphError> {
        let guid = declaration.info.ensure_guid();
        if self.contains(guid) {
            return Err(GraphError::DuplicateGuid(guid));
        }
        declaration.destroyed = false;
        Ok(self.insert_declaration(declaration))
    }

    pub(crate) fn insert_declaration(&mut self, mut declaration: VariableDeclaration) -> Guid {
        let guid = declaration.info.ensure_guid();
        let graph_scoped = declaration.is_graph_scoped();
        tracing::debug!("Declared {:?} variable {} ({})", declaration.scope, declaration.name, guid);
        self.declarations.insert(guid, declaration);
        self.touch(guid);
        if graph_scoped {
            self.changes.mark_blackboard_changed();
        }
        guid
    }

    /// Declare a graph variable
    pub fn create_variable(&mut self, name: impl Into<String>, data_type: PortType) -> Guid {
        self.insert_declaration(VariableDeclaration::graph(name, data_type))
    }

    /// Create a node reading a variable
    pub fn create_variable_node(&mut self, declaration: Guid, position: [f32; 2]) -> Result<Guid, GraphError> {
        let variable = self
            .declarations
            .get(&declaration)
            .ok_or(GraphError::DeclarationNotFound(declaration))?;
        if !variable.is_graph_scoped() {
            return Err(GraphError::InvalidArgument(format!(
                "{declaration} is a portal declaration"
            )));
        }
        let title = variable.name.clone();
        Ok(self.create_node(NodeKind::Variable(VariableNode { declaration }), title, position))
    }

    /// Nodes referring to a declaration
    pub fn usages(&self, declaration: Guid) -> impl Iterator<Item = &NodeModel> {
        self.nodes
            .values()
            .filter(move |node| node.kind.declaration() == Some(declaration))
    }

    fn usage_ids(&self, declaration: Guid) -> Vec<Guid> {
        self.usages(declaration).map(GraphElement::guid).collect()
    }

    fn declaration_changed(&mut self, guid: Guid, redefine_usages: bool) {
        self.touch(guid);
        if self.declarations.get(&guid).is_some_and(VariableDeclaration::is_graph_scoped) {
            self.changes.mark_blackboard_changed();
        }
        let usages = self.usage_ids(guid);
        for node in usages {
            if redefine_usages {
                self.define_node(node);
            } else {
                self.touch(node);
            }
        }
    }

    /// Rename a renamable declaration; its usages are redefined to pick up the title
    pub fn rename_variable(&mut self, guid: Guid, name: impl Into<String>) -> bool {
        let Some(declaration) = self.declarations.get_mut(&guid) else {
            return false;
        };
        if !declaration.has_capability(Capability::Renamable) {
            return false;
        }
        declaration.name = name.into();
        self.declaration_changed(guid, true);
        true
    }

    /// Change a declaration's type and redefine its usages
    ///
    /// An initializer that no longer fits is replaced by the type's zero value.
    pub fn set_variable_type(&mut self, guid: Guid, data_type: PortType) -> bool {
        let Some(declaration) = self.declarations.get_mut(&guid) else {
            return false;
        };
        if !declaration
            .initializer
            .as_ref()
            .is_some_and(|value| value.is_assignable_to(&data_type))
        {
            declaration.initializer = PortValue::default_for(&data_type);
        }
        declaration.data_type = data_type;
        self.declaration_changed(guid, true);
        true
    }

    /// Expose a variable outside the graph, or hide it
    pub fn set_variable_exposed(&mut self, guid: Guid, exposed: bool) -> bool {
        let Some(declaration) = self.declarations.get_mut(&guid) else {
            return false;
        };
        declaration.exposed = exposed;
        self.declaration_changed(guid, false);
        true
    }

    /// Set the initial value. Refused if the value does not fit the type.
    pub fn set_variable_initializer(&mut self, guid: Guid, initializer: Option<PortValue>) -> bool {
        let Some(declaration) = self.declarations.get_mut(&guid) else {
            return false;
        };
        if initializer
            .as_ref()
            .is_some_and(|value| !value.is_assignable_to(&declaration.data_type))
        {
            return false;
        }
        declaration.initializer = initializer;
        self.declaration_changed(guid, false);
        true
    }

    /// Delete a deletable declaration
    ///
    /// With `delete_usages`, every node referring to it is deleted along with
    /// its edges. Otherwise the nodes stay and lose their declaration.
    pub fn delete_variable(&mut self, guid: Guid, delete_usages: bool) -> Option<VariableDeclaration> {
        if !self
            .declarations
            .get(&guid)
            .is_some_and(|declaration| declaration.has_capability(Capability::Deletable))
        {
            return None;
        }
        let usages = self.usage_ids(guid);
        let declaration = self.remove_declaration(guid)?;
        if delete_usages {
            for node in usages {
                self.remove_node(node, true);
            }
        } else {
            for node in usages {
                self.touch(node);
            }
        }
        Some(declaration)
    }

    pub(crate) fn remove_declaration(&mut self, guid: Guid) -> Option<VariableDeclaration> {
        let mut declaration = self.declarations.shift_remove(&guid)?;
        declaration.destroyed = true;
        self.changes.mark_removed(guid, ElementKind::Variable);
        self.forget_hidden(guid);
        if declaration.is_graph_scoped() {
            self.changes.mark_blackboard_changed();
        }
        tracing::debug!("Deleted declaration {} ({})", declaration.name, guid);
        Some(declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::VALUE_OUT;
    use crate::port::{PortDirection, PortId};

    #[test]
    fn test_create_variable_flags_blackboard() {
        let mut graph = GraphModel::default();
        let guid = graph.create_variable("speed", PortType::Float);
        let changes = graph.take_changes();
        assert!(changes.blackboard_changed());
        assert!(changes.is_changed(guid));
        assert_eq!(graph.declaration(guid).unwrap().initializer, Some(PortValue::Float(0.0)));
    }

    #[test]
    fn test_retype_redefines_usages() {
        let mut graph = GraphModel::default();
        let variable = graph.create_variable("speed", PortType::Float);
        let node = graph.create_variable_node(variable, [0.0, 0.0]).unwrap();

        assert!(graph.set_variable_type(variable, PortType::Int));
        let port = graph
            .node(node)
            .unwrap()
            .port(&PortId::from(VALUE_OUT), PortDirection::Output)
            .unwrap();
        assert_eq!(port.port_type, PortType::Int);
        assert_eq!(graph.declaration(variable).unwrap().initializer, Some(PortValue::Int(0)));
    }

    #[test]
    fn test_initializer_must_fit() {
        let mut graph = GraphModel::default();
        let variable = graph.create_variable("flag", PortType::Bool);
        assert!(!graph.set_variable_initializer(variable, Some(PortValue::Int(3))));
        assert!(graph.set_variable_initializer(variable, Some(PortValue::Bool(true))));
        assert!(graph.set_variable_initializer(variable, None));
    }

    #[test]
    fn test_delete_with_usages() {
        let mut graph = GraphModel::default();
        let variable = graph.create_variable("speed", PortType::Float);
        let a = graph.create_variable_node(variable, [0.0, 0.0]).unwrap();
        let b = graph.create_variable_node(variable, [0.0, 50.0]).unwrap();

        let removed = graph.delete_variable(variable, true).unwrap();
        assert!(removed.destroyed);
        assert!(graph.is_destroyed(a));
        assert!(graph.is_destroyed(b));
    }

    #[test]
    fn test_delete_without_usages_keeps_nodes() {
        let mut graph = GraphModel::default();
        let variable = graph.create_variable("speed", PortType::Float);
        let node = graph.create_variable_node(variable, [0.0, 0.0]).unwrap();
        graph.delete_variable(variable, false).unwrap();
        assert!(graph.contains(node));
    }

    #[test]
    fn test_unknown_declaration_is_an_error() {
        let mut graph = GraphModel::default();
        assert!(matches!(
            graph.create_variable_node(Guid::new(), [0.0, 0.0]),
            Err(GraphError::DeclarationNotFound(_))
        ));
    }
}
