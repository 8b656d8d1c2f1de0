// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::edge::PortReference;
use crate::element::Guid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a port, unique among the ports of one node and direction
///
/// Port ids are chosen by the node's port declaration and stay the same
/// across redefinitions, which is what lets edges survive them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub String);

impl PortId {
    /// Create a port id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PortId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

impl PortDirection {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// What flows through a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    /// Values
    Data,
    /// Execution flow
    Execution,
}

/// Maximum number of simultaneous connections of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortCapacity {
    /// At most one edge
    Single,
    /// Any number of edges
    Multi,
}

/// Data type that can flow through ports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    /// Execution flow
    Exec,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector
    Vector4,
    /// Color (RGBA)
    Color,
    /// String value
    String,
    /// Any type (for generic nodes)
    Any,
    /// Custom type
    Custom(String),
}

impl PortType {
    /// Port kind implied by this type
    pub fn kind(&self) -> PortKind {
        match self {
            Self::Exec => PortKind::Execution,
            _ => PortKind::Data,
        }
    }

    /// Whether the type is a number usable by math operators
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Vector2 | Self::Vector3 | Self::Vector4 | Self::Color
        )
    }

    /// Check if a value of this type can flow into a port of `other` type
    pub fn can_connect_to(&self, other: &PortType) -> bool {
        // Execution only connects to execution
        if matches!(self, Self::Exec) != matches!(other, Self::Exec) {
            return false;
        }

        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        if self == other {
            return true;
        }

        match (self, other) {
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => true,
            (Self::Float, Self::Vector2 | Self::Vector3 | Self::Vector4) => true,
            (Self::Vector2, Self::Vector3 | Self::Vector4) => true,
            (Self::Vector3, Self::Vector4) => true,
            (Self::Color, Self::Vector4) | (Self::Vector4, Self::Color) => true,
            _ => false,
        }
    }
}

/// Value that can be stored in an embedded constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
    /// Color
    Color([f32; 4]),
    /// String
    String(String),
}

impl PortValue {
    /// Get the port type for this value
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Bool(_) => PortType::Bool,
            Self::Int(_) => PortType::Int,
            Self::Float(_) => PortType::Float,
            Self::Vector2(_) => PortType::Vector2,
            Self::Vector3(_) => PortType::Vector3,
            Self::Vector4(_) => PortType::Vector4,
            Self::Color(_) => PortType::Color,
            Self::String(_) => PortType::String,
        }
    }

    /// Zero value for a type, if the type has a constant representation
    pub fn default_for(port_type: &PortType) -> Option<Self> {
        Some(match port_type {
            PortType::Bool => Self::Bool(false),
            PortType::Int => Self::Int(0),
            PortType::Float => Self::Float(0.0),
            PortType::Vector2 => Self::Vector2([0.0; 2]),
            PortType::Vector3 => Self::Vector3([0.0; 3]),
            PortType::Vector4 => Self::Vector4([0.0; 4]),
            PortType::Color => Self::Color([0.0, 0.0, 0.0, 1.0]),
            PortType::String => Self::String(String::new()),
            PortType::Exec | PortType::Any | PortType::Custom(_) => return None,
        })
    }

    /// Whether this value can be held by a constant of `port_type`
    pub fn is_assignable_to(&self, port_type: &PortType) -> bool {
        self.port_type() == *port_type
    }
}

/// Declaration of a port, produced by a node's port declaration hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDecl {
    /// Unique id within the node and direction
    pub id: PortId,
    /// Display title
    pub title: String,
    /// Data type
    pub port_type: PortType,
    /// Capacity, or the configured default for the direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<PortCapacity>,
    /// Initial embedded constant value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<PortValue>,
}

impl PortDecl {
    /// Declare a port whose title is its id
    pub fn new(id: impl Into<String>, port_type: PortType) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id: PortId(id),
            port_type,
            capacity: None,
            default_value: None,
        }
    }

    /// Set the display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the capacity
    pub fn with_capacity(mut self, capacity: PortCapacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the initial constant value
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A port on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Unique id within the owning node and direction
    pub id: PortId,
    /// Owning node
    pub node: Guid,
    /// Display title
    pub title: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data or execution
    pub kind: PortKind,
    /// Data type
    pub port_type: PortType,
    /// Maximum simultaneous connections
    pub capacity: PortCapacity,
    /// Initial embedded constant value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<PortValue>,
    /// Stands in for a port id an edge references but the node no longer declares
    #[serde(default)]
    pub placeholder: bool,
}

impl Port {
    /// Create a port from its declaration
    pub fn from_decl(
        node: Guid,
        direction: PortDirection,
        decl: PortDecl,
        default_capacity: PortCapacity,
    ) -> Self {
        Self {
            kind: decl.port_type.kind(),
            id: decl.id,
            node,
            title: decl.title,
            direction,
            port_type: decl.port_type,
            capacity: decl.capacity.unwrap_or(default_capacity),
            default_value: decl.default_value,
            placeholder: false,
        }
    }

    /// Create a placeholder for an id that no longer resolves
    pub fn placeholder(
        node: Guid,
        id: PortId,
        direction: PortDirection,
        port_type: PortType,
    ) -> Self {
        Self {
            title: id.0.clone(),
            id,
            node,
            direction,
            kind: port_type.kind(),
            port_type,
            capacity: PortCapacity::Multi,
            default_value: None,
            placeholder: true,
        }
    }

    /// Refresh the declared parts of a reused port, keeping its identity and title
    pub(crate) fn refresh(&mut self, decl: PortDecl, default_capacity: PortCapacity) {
        self.kind = decl.port_type.kind();
        self.port_type = decl.port_type;
        self.capacity = decl.capacity.unwrap_or(default_capacity);
        self.default_value = decl.default_value;
        self.placeholder = false;
    }

    /// Reference to this port
    pub fn reference(&self) -> PortReference {
        PortReference::new(self.node, self.id.clone(), self.direction)
    }

    /// Check if a connection to another port is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        if self.direction == other.direction {
            return false;
        }
        if self.kind != other.kind {
            return false;
        }

        let (output, input) = match self.direction {
            PortDirection::Output => (self, other),
            PortDirection::Input => (other, self),
        };
        output.port_type.can_connect_to(&input.port_type)
    }
}
