// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node variants and their port declarations.

use crate::element::Guid;
use crate::node::{DefinitionContext, NodeDefinition, PortDeclarer};
use crate::port::{Port, PortCapacity, PortDecl, PortDirection, PortId, PortType, PortValue};
use serde::{Deserialize, Serialize};

/// Execution output of event and flow nodes
pub const EXEC_OUT: &str = "exec_out";
/// Execution input of flow nodes
pub const EXEC_IN: &str = "exec_in";
/// Value output of constant and variable nodes
pub const VALUE_OUT: &str = "value";
/// Result output of math nodes
pub const RESULT_OUT: &str = "result";
/// Main input of an entry portal
pub const PORTAL_IN: &str = "portal_in";
/// Main output of an exit portal
pub const PORTAL_OUT: &str = "portal_out";

/// Node that starts execution, such as "begin play"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventNode {
    /// Event name
    pub event: String,
}

impl NodeDefinition for EventNode {
    fn type_name(&self) -> &str {
        "event"
    }

    fn declare_ports(&self, _ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        ports.add_output_port(PortDecl::new(EXEC_OUT, PortType::Exec).with_title("Exec"));
    }

    fn is_entry_point(&self) -> bool {
        true
    }
}

/// Flow control operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowOp {
    /// If/else branching
    Branch,
    /// Run several outputs in order
    Sequence {
        /// Number of outputs
        steps: usize,
    },
    /// Print a message
    Log,
}

/// Execution flow node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Operation
    pub op: FlowOp,
}

impl NodeDefinition for FlowNode {
    fn type_name(&self) -> &str {
        match self.op {
            FlowOp::Branch => "branch",
            FlowOp::Sequence { .. } => "sequence",
            FlowOp::Log => "log",
        }
    }

    fn declare_ports(&self, _ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        ports.add_input_port(PortDecl::new(EXEC_IN, PortType::Exec).with_title("Exec"));
        match &self.op {
            FlowOp::Branch => {
                ports.add_input_port(
                    PortDecl::new("condition", PortType::Bool).with_title("Condition"),
                );
                ports.add_output_port(PortDecl::new("true", PortType::Exec).with_title("True"));
                ports.add_output_port(PortDecl::new("false", PortType::Exec).with_title("False"));
            }
            FlowOp::Sequence { steps } => {
                for step in 0..*steps {
                    ports.add_output_port(
                        PortDecl::new(format!("then_{step}"), PortType::Exec)
                            .with_title(format!("Then {step}")),
                    );
                }
            }
            FlowOp::Log => {
                ports.add_input_port(
                    PortDecl::new("message", PortType::String)
                        .with_title("Message")
                        .with_default(PortValue::String("Hello".to_string())),
                );
                ports.add_output_port(PortDecl::new(EXEC_OUT, PortType::Exec).with_title("Exec"));
            }
        }
    }
}

/// Math operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathOp {
    /// Sum of all inputs
    Add,
    /// First input minus second
    Subtract,
    /// Product of all inputs
    Multiply,
    /// First input divided by second
    Divide,
    /// Smallest input
    Min,
    /// Largest input
    Max,
    /// Negated input
    Negate,
}

impl MathOp {
    /// Whether the operator takes any number of inputs
    pub fn is_variadic(self) -> bool {
        matches!(self, Self::Add | Self::Multiply | Self::Min | Self::Max)
    }

    /// Number of inputs the operator actually uses for a requested count
    pub fn arity(self, requested: usize) -> usize {
        match self {
            Self::Negate => 1,
            Self::Subtract | Self::Divide => 2,
            _ => requested.max(2),
        }
    }
}

/// Math node with a configurable operator and operand count
///
/// An `Any` operand type is replaced by the type of the first numeric port
/// connected to the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathNode {
    /// Operator
    pub op: MathOp,
    /// Requested operand count, used by variadic operators
    pub input_count: usize,
    /// Operand and result type
    pub operand_type: PortType,
}

impl MathNode {
    /// Create a math node with the minimum operand count
    pub fn new(op: MathOp, operand_type: PortType) -> Self {
        Self {
            op,
            input_count: 2,
            operand_type,
        }
    }

    /// Set the operand count
    pub fn with_input_count(mut self, input_count: usize) -> Self {
        self.input_count = input_count;
        self
    }

    /// Id of the operand port at an index
    pub fn input_id(index: usize) -> PortId {
        PortId(format!("in_{index}"))
    }
}

impl NodeDefinition for MathNode {
    fn type_name(&self) -> &str {
        match self.op {
            MathOp::Add => "add",
            MathOp::Subtract => "subtract",
            MathOp::Multiply => "multiply",
            MathOp::Divide => "divide",
            MathOp::Min => "min",
            MathOp::Max => "max",
            MathOp::Negate => "negate",
        }
    }

    fn declare_ports(&self, _ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        for index in 0..self.op.arity(self.input_count) {
            let id = Self::input_id(index);
            let title = ((b'A' + (index % 26) as u8) as char).to_string();
            ports.add_input_port(PortDecl {
                title,
                ..PortDecl::new(id.0, self.operand_type.clone())
            });
        }
        ports.add_output_port(
            PortDecl::new(RESULT_OUT, self.operand_type.clone()).with_title("Result"),
        );
    }

    /// Operands used to be numbered "0", "1"... or named "a"/"b"
    fn migrate_port_id(&self, stale: &PortId, direction: PortDirection) -> Option<PortId> {
        match direction {
            PortDirection::Input => {
                let index = match stale.as_str() {
                    "a" => 0,
                    "b" => 1,
                    other => other.parse::<usize>().ok()?,
                };
                Some(Self::input_id(index))
            }
            PortDirection::Output => (stale.as_str() == "out").then(|| PortId::from(RESULT_OUT)),
        }
    }

    fn on_connection(&mut self, _port: &Port, other: &Port) -> bool {
        if self.operand_type == PortType::Any && other.port_type.is_numeric() {
            self.operand_type = other.port_type.clone();
            return true;
        }
        false
    }
}

/// Node producing a constant value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    /// The value
    pub value: PortValue,
}

impl NodeDefinition for ConstantNode {
    fn type_name(&self) -> &str {
        "constant"
    }

    fn declare_ports(&self, _ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        ports.add_output_port(PortDecl::new(VALUE_OUT, self.value.port_type()).with_title("Value"));
    }
}

/// Node reading a graph variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableNode {
    /// Variable declaration
    pub declaration: Guid,
}

impl NodeDefinition for VariableNode {
    fn type_name(&self) -> &str {
        "variable"
    }

    fn declare_ports(&self, ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        // A missing declaration leaves the node without ports; integrity checks report it
        if let Some(declaration) = ctx.declaration(self.declaration) {
            ports.add_output_port(
                PortDecl::new(VALUE_OUT, declaration.data_type.clone())
                    .with_title(declaration.name.clone()),
            );
        }
    }

    fn declaration(&self) -> Option<Guid> {
        Some(self.declaration)
    }
}

/// Which side of a portal a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalEnd {
    /// Receives the value or flow
    Entry,
    /// Emits it again elsewhere
    Exit,
}

impl PortalEnd {
    /// The other end
    pub fn opposite(self) -> Self {
        match self {
            Self::Entry => Self::Exit,
            Self::Exit => Self::Entry,
        }
    }
}

/// One end of a portal; all ends sharing a declaration form one wormhole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalNode {
    /// Portal declaration
    pub declaration: Guid,
    /// Entry or exit
    pub end: PortalEnd,
}

impl NodeDefinition for PortalNode {
    fn type_name(&self) -> &str {
        match self.end {
            PortalEnd::Entry => "portal_entry",
            PortalEnd::Exit => "portal_exit",
        }
    }

    fn declare_ports(&self, ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        let Some(declaration) = ctx.declaration(self.declaration) else {
            return;
        };
        let port_type = declaration.data_type.clone();
        match self.end {
            PortalEnd::Entry => {
                let capacity = match port_type {
                    PortType::Exec => PortCapacity::Multi,
                    _ => PortCapacity::Single,
                };
                ports.add_input_port(
                    PortDecl::new(PORTAL_IN, port_type)
                        .with_title(declaration.name.clone())
                        .with_capacity(capacity),
                );
            }
            PortalEnd::Exit => {
                let capacity = match port_type {
                    PortType::Exec => PortCapacity::Single,
                    _ => PortCapacity::Multi,
                };
                ports.add_output_port(
                    PortDecl::new(PORTAL_OUT, port_type)
                        .with_title(declaration.name.clone())
                        .with_capacity(capacity),
                );
            }
        }
    }

    fn declaration(&self) -> Option<Guid> {
        Some(self.declaration)
    }
}

/// Node whose ports come from a data declaration, typically a registry template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredNode {
    /// Registry type id
    pub type_id: String,
    /// Declared inputs
    pub inputs: Vec<PortDecl>,
    /// Declared outputs
    pub outputs: Vec<PortDecl>,
}

impl DeclaredNode {
    /// Create a declared node
    pub fn new(type_id: impl Into<String>, inputs: Vec<PortDecl>, outputs: Vec<PortDecl>) -> Self {
        Self {
            type_id: type_id.into(),
            inputs,
            outputs,
        }
    }
}

impl NodeDefinition for DeclaredNode {
    fn type_name(&self) -> &str {
        &self.type_id
    }

    fn declare_ports(&self, _ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        for decl in &self.inputs {
            ports.add_input_port(decl.clone());
        }
        for decl in &self.outputs {
            ports.add_output_port(decl.clone());
        }
    }
}

/// All node variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Entry point
    Event(EventNode),
    /// Flow control
    Flow(FlowNode),
    /// Math operator
    Math(MathNode),
    /// Constant value
    Constant(ConstantNode),
    /// Variable read
    Variable(VariableNode),
    /// Portal end
    Portal(PortalNode),
    /// Data-declared ports
    Declared(DeclaredNode),
}

impl NodeKind {
    fn definition(&self) -> &dyn NodeDefinition {
        match self {
            Self::Event(node) => node,
            Self::Flow(node) => node,
            Self::Math(node) => node,
            Self::Constant(node) => node,
            Self::Variable(node) => node,
            Self::Portal(node) => node,
            Self::Declared(node) => node,
        }
    }

    fn definition_mut(&mut self) -> &mut dyn NodeDefinition {
        match self {
            Self::Event(node) => node,
            Self::Flow(node) => node,
            Self::Math(node) => node,
            Self::Constant(node) => node,
            Self::Variable(node) => node,
            Self::Portal(node) => node,
            Self::Declared(node) => node,
        }
    }

    /// Portal configuration, if this is a portal
    pub fn as_portal(&self) -> Option<&PortalNode> {
        match self {
            Self::Portal(portal) => Some(portal),
            _ => None,
        }
    }
}

impl NodeDefinition for NodeKind {
    fn type_name(&self) -> &str {
        self.definition().type_name()
    }

    fn declare_ports(&self, ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer) {
        self.definition().declare_ports(ctx, ports);
    }

    fn is_entry_point(&self) -> bool {
        self.definition().is_entry_point()
    }

    fn declaration(&self) -> Option<Guid> {
        self.definition().declaration()
    }

    fn migrate_port_id(&self, stale: &PortId, direction: PortDirection) -> Option<PortId> {
        self.definition().migrate_port_id(stale, direction)
    }

    fn on_connection(&mut self, port: &Port, other: &Port) -> bool {
        self.definition_mut().on_connection(port, other)
    }
}
