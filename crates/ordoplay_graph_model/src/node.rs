// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node model and the node (re)definition protocol.
//!
//! A node's ports and embedded constants are derived data. They are
//! regenerated by [`NodeModel::define`], which asks the node's variant to
//! declare its ports and reconciles the result with the previous
//! generation so that ports whose id survived keep their identity.

use crate::element::{Capabilities, ElementInfo, ElementKind, GraphElement, Guid};
use crate::nodes::NodeKind;
use crate::ordered_ports::OrderedPorts;
use crate::port::{
    Port, PortCapacity, PortDecl, PortDirection, PortId, PortKind, PortType, PortValue,
};
use crate::settings::GraphSettings;
use crate::variable::VariableDeclaration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// User-set state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelState {
    /// Participates normally
    #[default]
    Enabled,
    /// Switched off by the user, along with everything downstream of it
    Disabled,
}

/// Computed state of a node after reachability analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeUsage {
    /// Reachable from an entry point through enabled nodes
    #[default]
    Enabled,
    /// Disabled, or downstream of a disabled node
    Disabled,
    /// Not reachable from any entry point
    Unused,
}

/// What a node's port declaration can look at
pub struct DefinitionContext<'a> {
    /// Variable and portal declarations of the graph
    pub declarations: &'a IndexMap<Guid, VariableDeclaration>,
    /// Graph settings
    pub settings: &'a GraphSettings,
}

impl<'a> DefinitionContext<'a> {
    /// Look up a declaration
    pub fn declaration(&self, guid: Guid) -> Option<&'a VariableDeclaration> {
        self.declarations.get(&guid)
    }
}

/// Collects the ports a node declares during definition
#[derive(Debug, Default)]
pub struct PortDeclarer {
    inputs: Vec<PortDecl>,
    outputs: Vec<PortDecl>,
}

impl PortDeclarer {
    /// Create an empty declarer
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an input port
    pub fn add_input_port(&mut self, decl: PortDecl) {
        self.inputs.push(decl);
    }

    /// Declare an output port
    pub fn add_output_port(&mut self, decl: PortDecl) {
        self.outputs.push(decl);
    }

    /// Declare a port on either side
    pub fn add_port(&mut self, direction: PortDirection, decl: PortDecl) {
        match direction {
            PortDirection::Input => self.add_input_port(decl),
            PortDirection::Output => self.add_output_port(decl),
        }
    }

    /// Declarations collected so far
    pub fn declared(&self, direction: PortDirection) -> &[PortDecl] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }
}

/// Behavior that differs between node variants
///
/// The definition protocol itself lives in [`NodeModel::define`]; variants
/// only say which ports they want given their current configuration.
pub trait NodeDefinition {
    /// Registry type id of the variant
    fn type_name(&self) -> &str;

    /// Declare every port the node should currently have
    ///
    /// Must be a pure function of the node's configuration and the context.
    fn declare_ports(&self, ctx: &DefinitionContext<'_>, ports: &mut PortDeclarer);

    /// Whether reachability analysis starts from this node
    fn is_entry_point(&self) -> bool {
        false
    }

    /// Variable or portal declaration the node refers to
    fn declaration(&self) -> Option<Guid> {
        None
    }

    /// Map a port id from an older naming scheme to its current id
    fn migrate_port_id(&self, _stale: &PortId, _direction: PortDirection) -> Option<PortId> {
        None
    }

    /// React to a new connection on one of the node's ports
    ///
    /// Returns true if the node's configuration changed and it must be
    /// redefined.
    fn on_connection(&mut self, _port: &Port, _other: &Port) -> bool {
        false
    }
}

/// A port removed by a redefinition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedPort {
    /// Port id
    pub id: PortId,
    /// Side of the node
    pub direction: PortDirection,
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeModel {
    pub(crate) info: ElementInfo,
    /// Variant and its configuration
    pub(crate) kind: NodeKind,
    /// Display title
    pub(crate) title: String,
    /// Position in the graph
    pub(crate) position: [f32; 2],
    /// Whether the node is collapsed
    pub(crate) collapsed: bool,
    /// User-set state
    pub(crate) state: ModelState,
    /// State computed by reachability
    #[serde(skip)]
    pub(crate) usage: NodeUsage,
    /// Set once the node has been removed from its graph
    #[serde(skip)]
    pub destroyed: bool,
    inputs: OrderedPorts,
    outputs: OrderedPorts,
    /// Embedded constants keyed by input port id
    constants: IndexMap<PortId, PortValue>,
}

impl NodeModel {
    /// Create an undefined node. Ports appear once [`NodeModel::define`] runs.
    pub fn new(kind: NodeKind, title: impl Into<String>, position: [f32; 2]) -> Self {
        Self {
            info: ElementInfo::new(Capabilities::for_node()),
            kind,
            title: title.into(),
            position,
            collapsed: false,
            state: ModelState::Enabled,
            usage: NodeUsage::Enabled,
            destroyed: false,
            inputs: OrderedPorts::new(),
            outputs: OrderedPorts::new(),
            constants: IndexMap::new(),
        }
    }

    /// Variant and configuration
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Position in the graph
    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    /// Whether the node is collapsed
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// User-set state
    pub fn state(&self) -> ModelState {
        self.state
    }

    /// State computed by the last reachability pass
    pub fn usage(&self) -> NodeUsage {
        self.usage
    }

    /// Input ports
    pub fn inputs(&self) -> &OrderedPorts {
        &self.inputs
    }

    /// Output ports
    pub fn outputs(&self) -> &OrderedPorts {
        &self.outputs
    }

    /// Ports on one side
    pub fn ports(&self, direction: PortDirection) -> &OrderedPorts {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    fn ports_mut(&mut self, direction: PortDirection) -> &mut OrderedPorts {
        match direction {
            PortDirection::Input => &mut self.inputs,
            PortDirection::Output => &mut self.outputs,
        }
    }

    /// Look up a port
    pub fn port(&self, id: &PortId, direction: PortDirection) -> Option<&Port> {
        self.ports(direction).get(id)
    }

    /// All ports, inputs first
    pub fn all_ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Embedded constant of an input port
    pub fn constant(&self, port: &PortId) -> Option<&PortValue> {
        self.constants.get(port)
    }

    /// All embedded constants
    pub fn constants(&self) -> impl Iterator<Item = (&PortId, &PortValue)> {
        self.constants.iter()
    }

    /// Set an embedded constant. Refused if the port has no constant or the type differs.
    pub fn set_constant(&mut self, port: &PortId, value: PortValue) -> bool {
        match self.constants.get_mut(port) {
            Some(slot) if value.port_type() == slot.port_type() => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// Run the definition protocol
    ///
    /// 1. Keep the current ports aside as the previous generation.
    /// 2. Let the variant declare ports into fresh collections.
    /// 3. Reuse previous ports whose id is declared again, refreshing only
    ///    their declared type, kind and capacity.
    ///
    /// Ports of the previous generation that were not declared again are
    /// returned; the caller owns the edges attached to them. Placeholder
    /// ports are carried over until their last edge is removed.
    pub fn define(&mut self, ctx: &DefinitionContext<'_>) -> Vec<RemovedPort> {
        let guid = self.info.guid;
        let mut previous_inputs = std::mem::take(&mut self.inputs);
        let mut previous_outputs = std::mem::take(&mut self.outputs);

        let mut declarer = PortDeclarer::new();
        self.kind.declare_ports(ctx, &mut declarer);
        let PortDeclarer { inputs, outputs } = declarer;

        self.inputs = reconcile(guid, PortDirection::Input, inputs, &mut previous_inputs, ctx.settings);
        self.outputs = reconcile(guid, PortDirection::Output, outputs, &mut previous_outputs, ctx.settings);

        let mut removed = Vec::new();
        for (direction, mut previous) in [
            (PortDirection::Input, previous_inputs),
            (PortDirection::Output, previous_outputs),
        ] {
            for mut port in previous.drain() {
                if port.placeholder {
                    port.node = guid;
                    self.ports_mut(direction).add(port);
                } else {
                    removed.push(RemovedPort { id: port.id, direction });
                }
            }
        }

        self.reconcile_constants();
        removed
    }

    /// Drop constants whose port vanished or changed type, create missing ones
    fn reconcile_constants(&mut self) {
        let mut previous = std::mem::take(&mut self.constants);

        for port in self.inputs.iter() {
            if port.kind != PortKind::Data || port.placeholder {
                continue;
            }
            match previous.shift_remove(&port.id) {
                Some(value) if value.is_assignable_to(&port.port_type) => {
                    self.constants.insert(port.id.clone(), value);
                }
                _ => {
                    let value = port
                        .default_value
                        .clone()
                        .filter(|v| v.is_assignable_to(&port.port_type))
                        .or_else(|| PortValue::default_for(&port.port_type));
                    if let Some(value) = value {
                        self.constants.insert(port.id.clone(), value);
                    }
                }
            }
        }
    }

    /// Add a placeholder port standing in for an id an edge still references
    pub(crate) fn add_placeholder_port(
        &mut self,
        id: PortId,
        direction: PortDirection,
        port_type: PortType,
    ) -> bool {
        let port = Port::placeholder(self.info.guid, id, direction, port_type);
        self.ports_mut(direction).add(port)
    }

    /// Remove a placeholder port, leaving declared ports alone
    pub(crate) fn remove_placeholder_port(&mut self, id: &PortId, direction: PortDirection) -> bool {
        if !self.port(id, direction).is_some_and(|port| port.placeholder) {
            return false;
        }
        self.ports_mut(direction).remove(id).is_some()
    }

    /// Restamp owner guid on every port, used after the guid changed
    pub(crate) fn restamp_ports(&mut self) {
        let guid = self.info.guid;
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.node = guid;
        }
    }
}

fn reconcile(
    node: Guid,
    direction: PortDirection,
    declared: Vec<PortDecl>,
    previous: &mut OrderedPorts,
    settings: &GraphSettings,
) -> OrderedPorts {
    let mut ports = OrderedPorts::new();
    for decl in declared {
        let capacity = default_capacity(&decl, direction, settings);
        let port = match previous.remove(&decl.id) {
            Some(mut port) => {
                port.node = node;
                port.refresh(decl, capacity);
                port
            }
            None => Port::from_decl(node, direction, decl, capacity),
        };
        if !ports.add(port) {
            tracing::warn!("Node {} declared {:?} port twice", node, direction);
        }
    }
    ports
}

/// Execution inputs accept many edges, execution outputs one
fn default_capacity(
    decl: &PortDecl,
    direction: PortDirection,
    settings: &GraphSettings,
) -> PortCapacity {
    match (decl.port_type.kind(), direction) {
        (PortKind::Execution, PortDirection::Input) => PortCapacity::Multi,
        (PortKind::Execution, PortDirection::Output) => PortCapacity::Single,
        (PortKind::Data, _) => settings.default_capacity(direction),
    }
}

impl GraphElement for NodeModel {
    const KIND: ElementKind = ElementKind::Node;

    fn info(&self) -> &ElementInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ElementInfo {
        &mut self.info
    }
}
