// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure owning nodes, edges, declarations and annotations.
//!
//! All mutation goes through [`GraphModel`] so that the guid index, the
//! tombstones and the change list stay consistent. Requests that come from
//! user gestures (missing capability, incompatible connection) fail quietly
//! with `None`/`false`; caller bugs such as an unknown node type are errors.

use crate::annotation::{PlacematModel, StickyNoteModel};
use crate::change::ChangeList;
use crate::edge::{EdgeModel, EndpointRepair, PortReference};
use crate::element::{Capability, ElementInfo, ElementKind, GraphElement, Guid};
use crate::node::{DefinitionContext, ModelState, NodeDefinition, NodeModel, NodeUsage, RemovedPort};
use crate::nodes::NodeKind;
use crate::port::{Port, PortCapacity, PortDirection, PortId, PortType, PortValue};
use crate::registry::NodeRegistry;
use crate::settings::GraphSettings;
use crate::variable::VariableDeclaration;
use indexmap::IndexMap;

/// Borrowed view of any live element
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    /// A node
    Node(&'a NodeModel),
    /// An edge
    Edge(&'a EdgeModel),
    /// A variable or portal declaration
    Variable(&'a VariableDeclaration),
    /// A placemat
    Placemat(&'a PlacematModel),
    /// A sticky note
    StickyNote(&'a StickyNoteModel),
}

impl<'a> ElementRef<'a> {
    /// Identity data of the element
    pub fn info(&self) -> &'a ElementInfo {
        match *self {
            Self::Node(node) => node.info(),
            Self::Edge(edge) => edge.info(),
            Self::Variable(variable) => variable.info(),
            Self::Placemat(placemat) => placemat.info(),
            Self::StickyNote(note) => note.info(),
        }
    }

    /// Kind of the element
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Edge(_) => ElementKind::Edge,
            Self::Variable(_) => ElementKind::Variable,
            Self::Placemat(_) => ElementKind::Placemat,
            Self::StickyNote(_) => ElementKind::StickyNote,
        }
    }

    /// Guid of the element
    pub fn guid(&self) -> Guid {
        self.info().guid()
    }
}

/// A node graph
#[derive(Debug, Clone)]
pub struct GraphModel {
    /// Graph name
    pub name: String,
    pub(crate) nodes: IndexMap<Guid, NodeModel>,
    pub(crate) edges: IndexMap<Guid, EdgeModel>,
    pub(crate) declarations: IndexMap<Guid, VariableDeclaration>,
    pub(crate) placemats: IndexMap<Guid, PlacematModel>,
    pub(crate) sticky_notes: IndexMap<Guid, StickyNoteModel>,
    pub(crate) settings: GraphSettings,
    pub(crate) changes: ChangeList,
    pub(crate) revision: u64,
}

impl GraphModel {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, GraphSettings::default())
    }

    /// Create a new empty graph with explicit settings
    pub fn with_settings(name: impl Into<String>, settings: GraphSettings) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            declarations: IndexMap::new(),
            placemats: IndexMap::new(),
            sticky_notes: IndexMap::new(),
            settings,
            changes: ChangeList::new(),
            revision: 0,
        }
    }

    /// Graph settings
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Get a node by guid
    pub fn node(&self, guid: Guid) -> Option<&NodeModel> {
        self.nodes.get(&guid)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &NodeModel> {
        self.nodes.values()
    }

    /// Get all node guids
    pub fn node_ids(&self) -> impl Iterator<Item = Guid> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get an edge by guid
    pub fn edge(&self, guid: Guid) -> Option<&EdgeModel> {
        self.edges.get(&guid)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &EdgeModel> {
        self.edges.values()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get a variable or portal declaration
    pub fn declaration(&self, guid: Guid) -> Option<&VariableDeclaration> {
        self.declarations.get(&guid)
    }

    /// Get all declarations
    pub fn declarations(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.declarations.values()
    }

    /// Get a placemat
    pub fn placemat(&self, guid: Guid) -> Option<&PlacematModel> {
        self.placemats.get(&guid)
    }

    /// Get all placemats
    pub fn placemats(&self) -> impl Iterator<Item = &PlacematModel> {
        self.placemats.values()
    }

    /// Get a sticky note
    pub fn sticky_note(&self, guid: Guid) -> Option<&StickyNoteModel> {
        self.sticky_notes.get(&guid)
    }

    /// Get all sticky notes
    pub fn sticky_notes(&self) -> impl Iterator<Item = &StickyNoteModel> {
        self.sticky_notes.values()
    }

    /// Look up any live element
    pub fn element(&self, guid: Guid) -> Option<ElementRef<'_>> {
        if let Some(node) = self.nodes.get(&guid) {
            return Some(ElementRef::Node(node));
        }
        if let Some(edge) = self.edges.get(&guid) {
            return Some(ElementRef::Edge(edge));
        }
        if let Some(variable) = self.declarations.get(&guid) {
            return Some(ElementRef::Variable(variable));
        }
        if let Some(placemat) = self.placemats.get(&guid) {
            return Some(ElementRef::Placemat(placemat));
        }
        self.sticky_notes.get(&guid).map(ElementRef::StickyNote)
    }

    /// Kind of a live element
    pub fn element_kind(&self, guid: Guid) -> Option<ElementKind> {
        self.element(guid).map(|element| element.kind())
    }

    /// Whether an element is live in this graph
    pub fn contains(&self, guid: Guid) -> bool {
        self.element(guid).is_some()
    }

    /// Whether an element was removed, or never belonged to this graph
    pub fn is_destroyed(&self, guid: Guid) -> bool {
        !self.contains(guid)
    }

    /// Revision at which a live element last changed
    pub fn element_version(&self, guid: Guid) -> Option<u64> {
        self.element(guid).map(|element| element.info().version())
    }

    /// Current graph revision
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ------------------------------------------------------------------
    // Change tracking
    // ------------------------------------------------------------------

    fn info_mut(&mut self, guid: Guid) -> Option<(&mut ElementInfo, ElementKind)> {
        if let Some(node) = self.nodes.get_mut(&guid) {
            return Some((&mut node.info, ElementKind::Node));
        }
        if let Some(edge) = self.edges.get_mut(&guid) {
            return Some((&mut edge.info, ElementKind::Edge));
        }
        if let Some(variable) = self.declarations.get_mut(&guid) {
            return Some((&mut variable.info, ElementKind::Variable));
        }
        if let Some(placemat) = self.placemats.get_mut(&guid) {
            return Some((&mut placemat.info, ElementKind::Placemat));
        }
        self.sticky_notes
            .get_mut(&guid)
            .map(|note| (&mut note.info, ElementKind::StickyNote))
    }

    /// Record a change of a live element
    pub(crate) fn touch(&mut self, guid: Guid) {
        self.revision += 1;
        let revision = self.revision;
        if let Some((info, kind)) = self.info_mut(guid) {
            info.version = revision;
            self.changes.mark_changed(guid, kind);
        }
    }

    /// Changes recorded since the last [`GraphModel::take_changes`]
    pub fn changes(&self) -> &ChangeList {
        &self.changes
    }

    /// Hand over the recorded changes and start a new list
    pub fn take_changes(&mut self) -> ChangeList {
        std::mem::take(&mut self.changes)
    }

    /// Mark every live element as changed, used after a bulk load
    pub fn touch_all(&mut self) {
        let guids: Vec<Guid> = self
            .nodes
            .keys()
            .chain(self.edges.keys())
            .chain(self.declarations.keys())
            .chain(self.placemats.keys())
            .chain(self.sticky_notes.keys())
            .copied()
            .collect();
        for guid in guids {
            self.touch(guid);
        }
        self.changes.mark_blackboard_changed();
    }

    fn has_capability(&self, guid: Guid, capability: Capability) -> bool {
        self.element(guid)
            .is_some_and(|element| element.info().capabilities.contains(capability))
    }

    /// Grant or revoke a capability of any element
    pub fn set_capability(&mut self, guid: Guid, capability: Capability, granted: bool) -> bool {
        let Some((info, _)) = self.info_mut(guid) else {
            return false;
        };
        if granted {
            info.capabilities.insert(capability);
        } else {
            info.capabilities.remove(capability);
        }
        true
    }

    /// Set the user color override of any colorable element
    pub fn set_element_color(&mut self, guid: Guid, color: Option<[u8; 3]>) -> bool {
        if !self.has_capability(guid, Capability::Colorable) {
            tracing::debug!("Element {} is not colorable", guid);
            return false;
        }
        if let Some((info, _)) = self.info_mut(guid) {
            info.color = color;
        }
        self.touch(guid);
        true
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    fn definition_context(&self) -> DefinitionContext<'_> {
        DefinitionContext {
            declarations: &self.declarations,
            settings: &self.settings,
        }
    }

    /// Create and define a node without registering it, for previews
    pub fn instantiate_node(&self, kind: NodeKind, title: impl Into<String>, position: [f32; 2]) -> NodeModel {
        let mut node = NodeModel::new(kind, title, position);
        node.info.ensure_guid();
        node.define(&self.definition_context());
        node
    }

    /// Instantiate an unregistered node of a registry type
    pub fn instantiate_from_type(
        &self,
        registry: &NodeRegistry,
        type_id: &str,
        position: [f32; 2],
    ) -> Result<NodeModel, GraphError> {
        let node_type = registry
            .get(type_id)
            .ok_or_else(|| GraphError::UnknownNodeType(type_id.to_string()))?;
        Ok(self.instantiate_node(node_type.prototype.clone(), node_type.name.clone(), position))
    }

    /// Register a node built elsewhere, such as a committed preview
    pub fn add_node(&mut self, mut node: NodeModel) -> Result<Guid, GraphError> {
        let guid = node.info.ensure_guid();
        if self.contains(guid) {
            return Err(GraphError::DuplicateGuid(guid));
        }
        node.destroyed = false;
        node.restamp_ports();
        Ok(self.insert_node(node))
    }

    fn insert_node(&mut self, node: NodeModel) -> Guid {
        let guid = node.guid();
        tracing::debug!("Added node {} ({})", guid, node.kind.type_name());
        self.nodes.insert(guid, node);
        self.define_node(guid);
        guid
    }

    /// Create, define and register a node
    pub fn create_node(&mut self, kind: NodeKind, title: impl Into<String>, position: [f32; 2]) -> Guid {
        let node = self.instantiate_node(kind, title, position);
        self.insert_node(node)
    }

    /// Create and register a node of a registry type
    pub fn create_node_from_type(
        &mut self,
        registry: &NodeRegistry,
        type_id: &str,
        position: [f32; 2],
    ) -> Result<Guid, GraphError> {
        let node = self.instantiate_from_type(registry, type_id, position)?;
        Ok(self.insert_node(node))
    }

    /// Rerun the definition protocol of a node
    ///
    /// Edges attached to ports that were not declared again are deleted.
    /// Returns the removed ports, or `None` if the node does not exist.
    pub fn define_node(&mut self, guid: Guid) -> Option<Vec<RemovedPort>> {
        let ctx = DefinitionContext {
            declarations: &self.declarations,
            settings: &self.settings,
        };
        let node = self.nodes.get_mut(&guid)?;
        let removed = node.define(&ctx);

        if !removed.is_empty() {
            let stale: Vec<Guid> = self
                .edges
                .iter()
                .filter(|(_, edge)| {
                    removed
                        .iter()
                        .any(|port| edge.involves_port(guid, &port.id, port.direction))
                })
                .map(|(edge_guid, _)| *edge_guid)
                .collect();
            tracing::debug!(
                "Node {} lost {} port(s), deleting {} edge(s)",
                guid,
                removed.len(),
                stale.len()
            );
            for edge in stale {
                self.remove_edge(edge);
            }
        }

        self.touch(guid);
        Some(removed)
    }

    /// Change a node's configuration and redefine it
    pub fn reconfigure_node(&mut self, guid: Guid, configure: impl FnOnce(&mut NodeKind)) -> bool {
        let Some(node) = self.nodes.get_mut(&guid) else {
            return false;
        };
        configure(&mut node.kind);
        self.define_node(guid);
        true
    }

    /// Delete a node if it is deletable
    ///
    /// With `delete_connections`, every edge touching the node goes too.
    /// Deleting the last portal end of a declaration deletes the declaration.
    pub fn delete_node(&mut self, guid: Guid, delete_connections: bool) -> Option<NodeModel> {
        if !self.has_capability(guid, Capability::Deletable) {
            tracing::debug!("Node {} is not deletable", guid);
            return None;
        }
        self.remove_node(guid, delete_connections)
    }

    pub(crate) fn remove_node(&mut self, guid: Guid, delete_connections: bool) -> Option<NodeModel> {
        if !self.nodes.contains_key(&guid) {
            return None;
        }

        if delete_connections {
            let attached: Vec<Guid> = self.edges_for_node(guid).map(GraphElement::guid).collect();
            for edge in attached {
                self.remove_edge(edge);
            }
        }

        let mut node = self.nodes.shift_remove(&guid)?;
        node.destroyed = true;
        self.changes.mark_removed(guid, ElementKind::Node);
        self.forget_hidden(guid);
        tracing::debug!("Deleted node {}", guid);

        if let Some(portal) = node.kind.as_portal() {
            let declaration = portal.declaration;
            if self.portals(declaration).next().is_none() {
                tracing::debug!("Deleting orphaned portal declaration {}", declaration);
                self.remove_declaration(declaration);
            }
        }

        Some(node)
    }

    /// Duplicate a copiable node with an offset
    pub fn duplicate_node(&mut self, guid: Guid, offset: [f32; 2]) -> Option<Guid> {
        let source = self.nodes.get(&guid)?;
        if !source.has_capability(Capability::Copiable) {
            tracing::debug!("Node {} is not copiable", guid);
            return None;
        }

        let mut copy = source.clone();
        copy.info.guid = Guid::NIL;
        copy.info.legacy_id = None;
        copy.position = [copy.position[0] + offset[0], copy.position[1] + offset[1]];
        copy.info.ensure_guid();
        copy.restamp_ports();
        Some(self.insert_node(copy))
    }

    /// Duplicate a set of nodes and the edges touching them
    ///
    /// Returns the map from original to duplicated node guids.
    pub fn duplicate_nodes(&mut self, nodes: &[Guid], offset: [f32; 2]) -> IndexMap<Guid, Guid> {
        let mut duplicates = IndexMap::new();
        for guid in nodes {
            if let Some(copy) = self.duplicate_node(*guid, offset) {
                duplicates.insert(*guid, copy);
            }
        }

        let edges: Vec<Guid> = self
            .edges
            .values()
            .filter(|edge| {
                duplicates.contains_key(&edge.output.node) || duplicates.contains_key(&edge.input.node)
            })
            .filter(|edge| edge.has_capability(Capability::Copiable))
            .map(GraphElement::guid)
            .collect();
        for edge in edges {
            self.duplicate_edge(edge, &duplicates);
        }
        duplicates
    }

    /// Move a movable node to a position
    pub fn set_node_position(&mut self, guid: Guid, position: [f32; 2]) -> bool {
        if !self.has_capability(guid, Capability::Movable) {
            return false;
        }
        let Some(node) = self.nodes.get_mut(&guid) else {
            return false;
        };
        if node.position != position {
            node.position = position;
            self.touch(guid);
        }
        true
    }

    /// Move a movable node by a delta
    pub fn move_node(&mut self, guid: Guid, delta: [f32; 2]) -> bool {
        let Some(node) = self.nodes.get(&guid) else {
            return false;
        };
        let [x, y] = node.position;
        self.set_node_position(guid, [x + delta[0], y + delta[1]])
    }

    /// Rename a renamable node
    pub fn rename_node(&mut self, guid: Guid, title: impl Into<String>) -> bool {
        if !self.has_capability(guid, Capability::Renamable) {
            return false;
        }
        let Some(node) = self.nodes.get_mut(&guid) else {
            return false;
        };
        node.title = title.into();
        self.touch(guid);
        true
    }

    /// Collapse or expand a collapsible node
    pub fn set_node_collapsed(&mut self, guid: Guid, collapsed: bool) -> bool {
        if !self.has_capability(guid, Capability::Collapsible) {
            return false;
        }
        let Some(node) = self.nodes.get_mut(&guid) else {
            return false;
        };
        node.collapsed = collapsed;
        self.touch(guid);
        true
    }

    /// Enable or disable a node
    pub fn set_node_state(&mut self, guid: Guid, state: ModelState) -> bool {
        let Some(node) = self.nodes.get_mut(&guid) else {
            return false;
        };
        if node.state != state {
            node.state = state;
            self.touch(guid);
        }
        true
    }

    /// Write the computed usage of a node, recording a change if it differs
    pub(crate) fn set_node_usage(&mut self, guid: Guid, usage: NodeUsage) {
        let Some(node) = self.nodes.get_mut(&guid) else {
            return;
        };
        if node.usage != usage {
            node.usage = usage;
            self.touch(guid);
        }
    }

    /// Set an embedded constant of a node input
    pub fn set_constant(&mut self, guid: Guid, port: &PortId, value: PortValue) -> bool {
        let Some(node) = self.nodes.get_mut(&guid) else {
            return false;
        };
        if !node.set_constant(port, value) {
            return false;
        }
        self.touch(guid);
        true
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Get the port a reference designates
    pub fn resolve(&self, reference: &PortReference) -> Option<&Port> {
        reference.resolve(self)
    }

    /// Get edges touching a node
    pub fn edges_for_node(&self, guid: Guid) -> impl Iterator<Item = &EdgeModel> {
        self.edges.values().filter(move |edge| edge.involves_node(guid))
    }

    /// Get edges attached to a port
    pub fn edges_for_port<'a>(&'a self, port: &'a PortReference) -> impl Iterator<Item = &'a EdgeModel> + 'a {
        self.edges
            .values()
            .filter(move |edge| edge.end(port.direction) == port)
    }

    /// Number of edges attached to a port
    pub fn connection_count(&self, port: &PortReference) -> usize {
        self.edges_for_port(port).count()
    }

    /// Find the edge linking exactly these two ports
    pub fn find_edge(&self, output: &PortReference, input: &PortReference) -> Option<Guid> {
        self.edges
            .iter()
            .find(|(_, edge)| edge.links(output, input))
            .map(|(guid, _)| *guid)
    }

    fn is_at_capacity(&self, port: &Port) -> bool {
        port.capacity == PortCapacity::Single && self.connection_count(&port.reference()) > 0
    }

    /// Connect two ports, in either order
    ///
    /// Connecting two ports that are already linked returns the existing
    /// edge. Returns `None` if the ports do not resolve, have the same
    /// direction, have incompatible kinds or types, or if a single-capacity
    /// end is already connected.
    pub fn connect(&mut self, a: &PortReference, b: &PortReference) -> Option<Guid> {
        let (output_ref, input_ref) = match (a.direction, b.direction) {
            (PortDirection::Output, PortDirection::Input) => (a, b),
            (PortDirection::Input, PortDirection::Output) => (b, a),
            _ => {
                tracing::debug!("Rejected connection between two {:?} ports", a.direction);
                return None;
            }
        };

        if let Some(existing) = self.find_edge(output_ref, input_ref) {
            return Some(existing);
        }

        let Some(output) = output_ref.resolve(self).cloned() else {
            tracing::debug!("Rejected connection: {} does not resolve", output_ref);
            return None;
        };
        let Some(input) = input_ref.resolve(self).cloned() else {
            tracing::debug!("Rejected connection: {} does not resolve", input_ref);
            return None;
        };

        if !output.can_connect(&input) {
            tracing::debug!("Rejected connection: {} and {} are incompatible", output_ref, input_ref);
            return None;
        }
        if self.is_at_capacity(&output) || self.is_at_capacity(&input) {
            tracing::debug!("Rejected connection: {} -> {} exceeds capacity", output_ref, input_ref);
            return None;
        }

        let mut edge = EdgeModel::new(output.reference(), input.reference());
        let guid = edge.info.ensure_guid();
        self.edges.insert(guid, edge);
        self.touch(guid);
        tracing::debug!("Connected {} -> {}", output_ref, input_ref);

        self.notify_connection(&output, &input);
        self.notify_connection(&input, &output);
        Some(guid)
    }

    fn notify_connection(&mut self, port: &Port, other: &Port) {
        let Some(node) = self.nodes.get_mut(&port.node) else {
            return;
        };
        if node.kind.on_connection(port, other) {
            self.define_node(port.node);
        } else {
            self.touch(port.node);
        }
    }

    /// Duplicate an edge onto duplicated nodes
    ///
    /// Each end is moved to the duplicate of its node when there is one and
    /// stays on the original node otherwise. Nothing is created if neither
    /// end was duplicated.
    pub fn duplicate_edge(&mut self, guid: Guid, duplicates: &IndexMap<Guid, Guid>) -> Option<Guid> {
        let source = self.edges.get(&guid)?;
        let mut output = source.output.clone();
        let mut input = source.input.clone();

        let output_copy = duplicates.get(&output.node).copied();
        let input_copy = duplicates.get(&input.node).copied();
        if output_copy.is_none() && input_copy.is_none() {
            return None;
        }
        if let Some(node) = output_copy {
            output.rebind(node);
        }
        if let Some(node) = input_copy {
            input.rebind(node);
        }
        self.connect(&output, &input)
    }

    /// Delete a deletable edge
    pub fn delete_edge(&mut self, guid: Guid) -> Option<EdgeModel> {
        if !self.has_capability(guid, Capability::Deletable) {
            return None;
        }
        self.remove_edge(guid)
    }

    pub(crate) fn remove_edge(&mut self, guid: Guid) -> Option<EdgeModel> {
        let mut edge = self.edges.shift_remove(&guid)?;
        edge.destroyed = true;
        self.changes.mark_edge_deleted(guid);
        self.forget_hidden(guid);
        self.prune_placeholder(&edge.output);
        self.prune_placeholder(&edge.input);
        for node in [edge.output.node, edge.input.node] {
            if self.nodes.contains_key(&node) {
                self.touch(node);
            }
        }
        tracing::debug!("Deleted edge {}", edge.display_id());
        Some(edge)
    }

    /// Drop a placeholder port once no edge references it
    fn prune_placeholder(&mut self, end: &PortReference) {
        if self.connection_count(end) > 0 {
            return;
        }
        let pruned = self
            .nodes
            .get_mut(&end.node)
            .is_some_and(|node| node.remove_placeholder_port(&end.port, end.direction));
        if pruned {
            tracing::debug!("Pruned placeholder port {} on {}", end.port, end.node);
            self.touch(end.node);
        }
    }

    /// Resolve both ends of an edge, repairing them where possible
    ///
    /// A stale port id is first offered to the node for migration; if the
    /// node has no current equivalent a placeholder port is created so the
    /// edge stays connected until the user fixes it.
    pub fn repair_edge(&mut self, guid: Guid) -> Option<[EndpointRepair; 2]> {
        if !self.edges.contains_key(&guid) {
            return None;
        }
        Some([
            self.repair_edge_end(guid, PortDirection::Output),
            self.repair_edge_end(guid, PortDirection::Input),
        ])
    }

    fn repair_edge_end(&mut self, guid: Guid, direction: PortDirection) -> EndpointRepair {
        let Some(edge) = self.edges.get(&guid) else {
            return EndpointRepair::Unresolved;
        };
        let reference = edge.end(direction).clone();
        if reference.resolve(self).is_some() {
            return EndpointRepair::Resolved;
        }
        let Some(node) = self.nodes.get(&reference.node) else {
            return EndpointRepair::Unresolved;
        };

        let migrated = node
            .kind
            .migrate_port_id(&reference.port, direction)
            .filter(|id| node.port(id, direction).is_some());
        if let Some(id) = migrated {
            tracing::debug!("Migrated port {} to {} on node {}", reference.port, id, reference.node);
            if let Some(edge) = self.edges.get_mut(&guid) {
                edge.end_mut(direction).retarget(id);
            }
            self.touch(guid);
            return EndpointRepair::Migrated;
        }

        if !self.settings.placeholder_ports {
            return EndpointRepair::Unresolved;
        }

        let port_type = edge
            .end(direction.opposite())
            .resolve(self)
            .map_or(PortType::Any, |port| port.port_type.clone());
        if let Some(node) = self.nodes.get_mut(&reference.node) {
            tracing::warn!("Creating placeholder port {} on node {}", reference.port, reference.node);
            node.add_placeholder_port(reference.port.clone(), direction, port_type);
        }
        self.touch(reference.node);
        EndpointRepair::Placeholder
    }

    /// Repair every edge. Returns the number of ends that needed repair.
    pub fn repair_edges(&mut self) -> usize {
        let guids: Vec<Guid> = self.edges.keys().copied().collect();
        guids
            .into_iter()
            .filter_map(|guid| self.repair_edge(guid))
            .flatten()
            .filter(|repair| *repair != EndpointRepair::Resolved)
            .count()
    }

    // ------------------------------------------------------------------
    // Generic deletion
    // ------------------------------------------------------------------

    /// Delete any deletable element
    pub fn delete_element(&mut self, guid: Guid, delete_connections: bool) -> bool {
        match self.element_kind(guid) {
            Some(ElementKind::Node) => self.delete_node(guid, delete_connections).is_some(),
            Some(ElementKind::Edge) => self.delete_edge(guid).is_some(),
            Some(ElementKind::Variable) => self.delete_variable(guid, delete_connections).is_some(),
            Some(ElementKind::Placemat) => self.delete_placemat(guid).is_some(),
            Some(ElementKind::StickyNote) => self.delete_sticky_note(guid).is_some(),
            None => false,
        }
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error for calls that break the graph's contract
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The registry has no such node type
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// An element with this guid is already registered
    #[error("Duplicate guid: {0}")]
    DuplicateGuid(Guid),

    /// The declaration does not exist
    #[error("Declaration not found: {0}")]
    DeclarationNotFound(Guid),

    /// Argument outside the accepted domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
