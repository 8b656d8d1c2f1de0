// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node types that can be created by id.

use crate::nodes::{ConstantNode, EventNode, FlowNode, FlowOp, MathNode, MathOp, NodeKind};
use crate::port::{PortType, PortValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Entry points
    Event,
    /// Execution flow control
    Flow,
    /// Math operations
    Math,
    /// Constants and variables
    Value,
    /// Custom/user-defined
    Custom,
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Configuration new nodes of this type start with
    pub prototype: NodeKind,
}

impl NodeType {
    /// Create a node type
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: NodeCategory,
        prototype: NodeKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            description: String::new(),
            prototype,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Registry of available node types
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in types
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_standard_types(&mut registry);
        registry
    }

    /// Register a node type, replacing any type with the same id
    pub fn register(&mut self, node_type: NodeType) {
        if self.types.contains_key(&node_type.id) {
            tracing::warn!("Replacing node type {}", node_type.id);
        }
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Configuration for a new node of a type
    pub fn create(&self, type_id: &str) -> Option<NodeKind> {
        self.get(type_id).map(|t| t.prototype.clone())
    }
}

fn register_standard_types(registry: &mut NodeRegistry) {
    for (id, name, event) in [
        ("event_begin_play", "Begin Play", "begin_play"),
        ("event_tick", "Tick", "tick"),
    ] {
        registry.register(
            NodeType::new(id, name, NodeCategory::Event, NodeKind::Event(EventNode { event: event.into() }))
                .with_description("Starts execution"),
        );
    }

    for (id, name, op) in [
        ("branch", "Branch", FlowOp::Branch),
        ("sequence", "Sequence", FlowOp::Sequence { steps: 2 }),
        ("log", "Log", FlowOp::Log),
    ] {
        registry.register(NodeType::new(id, name, NodeCategory::Flow, NodeKind::Flow(FlowNode { op })));
    }

    for (id, name, op) in [
        ("add", "Add", MathOp::Add),
        ("subtract", "Subtract", MathOp::Subtract),
        ("multiply", "Multiply", MathOp::Multiply),
        ("divide", "Divide", MathOp::Divide),
        ("min", "Min", MathOp::Min),
        ("max", "Max", MathOp::Max),
        ("negate", "Negate", MathOp::Negate),
    ] {
        registry.register(
            NodeType::new(id, name, NodeCategory::Math, NodeKind::Math(MathNode::new(op, PortType::Any)))
                .with_description("Operand type follows the first connection"),
        );
    }

    for (id, name, value) in [
        ("float", "Float", PortValue::Float(0.0)),
        ("int", "Integer", PortValue::Int(0)),
        ("bool", "Boolean", PortValue::Bool(false)),
        ("string", "String", PortValue::String(String::new())),
    ] {
        registry.register(NodeType::new(
            id,
            name,
            NodeCategory::Value,
            NodeKind::Constant(ConstantNode { value }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = NodeRegistry::standard();
        assert!(registry.get("add").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.types_in_category(NodeCategory::Event).count(), 2);
        assert!(matches!(registry.create("branch"), Some(NodeKind::Flow(_))));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = NodeRegistry::new();
        let kind = NodeKind::Constant(ConstantNode {
            value: PortValue::Int(1),
        });
        registry.register(NodeType::new("one", "One", NodeCategory::Value, kind.clone()));
        registry.register(NodeType::new("one", "Uno", NodeCategory::Value, kind));
        assert_eq!(registry.types().count(), 1);
        assert_eq!(registry.get("one").map(|t| t.name.as_str()), Some("Uno"));
    }
}
