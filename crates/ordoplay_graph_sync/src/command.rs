// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph editing commands.
//!
//! A command is one user gesture. It mutates the session's graph and
//! reports what it created. Gestures the graph refuses, such as connecting
//! two outputs, come back as a refused outcome rather than an error.
//! Errors are reserved for requests that name missing elements or break
//! the graph's contract.

use crate::session::GraphSession;
use ordoplay_graph_model::{
    ElementKind, GraphError, Guid, ModelState, NodeKind, PortId, PortReference, PortType, PortValue, PortalEnd,
};
use serde::{Deserialize, Serialize};

/// A graph editing operation
pub trait GraphCommand: Send {
    /// Get a description of this command
    fn description(&self) -> &str;

    /// Apply the command to a session
    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError>;
}

/// What a command did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the graph accepted the gesture
    pub applied: bool,
    /// Elements the command created
    pub created: Vec<Guid>,
}

impl CommandOutcome {
    /// The gesture was applied
    pub fn applied() -> Self {
        Self {
            applied: true,
            created: Vec::new(),
        }
    }

    /// The gesture was refused and nothing changed
    pub fn refused() -> Self {
        Self::default()
    }

    /// The gesture created elements
    pub fn created(created: Vec<Guid>) -> Self {
        Self { applied: true, created }
    }

    fn from_flag(applied: bool) -> Self {
        if applied {
            Self::applied()
        } else {
            Self::refused()
        }
    }

    fn from_option(created: Option<Guid>) -> Self {
        created.map_or_else(Self::refused, |guid| Self::created(vec![guid]))
    }
}

/// Error type for command execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The graph rejected the request
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Element not found
    #[error("Element not found: {0}")]
    ElementNotFound(Guid),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

fn require_node(session: &GraphSession, guid: Guid) -> Result<(), CommandError> {
    if session.graph.node(guid).is_none() {
        return Err(CommandError::ElementNotFound(guid));
    }
    Ok(())
}

/// Command to create a node of a registered type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNodeCommand {
    /// Registry type id
    pub type_id: String,
    /// Canvas position
    pub position: [f32; 2],
    /// Description of the creation
    pub description: String,
}

impl CreateNodeCommand {
    /// Create a new create-node command
    pub fn new(type_id: impl Into<String>, position: [f32; 2]) -> Self {
        let type_id = type_id.into();
        Self {
            description: format!("Create {type_id}"),
            type_id,
            position,
        }
    }
}

impl GraphCommand for CreateNodeCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let guid = session
            .graph
            .create_node_from_type(&session.registry, &self.type_id, self.position)?;
        Ok(CommandOutcome::created(vec![guid]))
    }
}

/// Command to connect two ports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectCommand {
    /// First port, in either direction
    pub from: PortReference,
    /// Second port, in the other direction
    pub to: PortReference,
    /// Description of the connection
    pub description: String,
}

impl ConnectCommand {
    /// Create a new connect command
    pub fn new(from: PortReference, to: PortReference) -> Self {
        Self {
            description: format!("Connect {from} to {to}"),
            from,
            to,
        }
    }
}

impl GraphCommand for ConnectCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        Ok(CommandOutcome::from_option(session.graph.connect(&self.from, &self.to)))
    }
}

/// Command to delete one edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisconnectCommand {
    /// Edge
    pub edge: Guid,
    /// Description of the disconnection
    pub description: String,
}

impl DisconnectCommand {
    /// Create a new disconnect command
    pub fn new(edge: Guid) -> Self {
        Self {
            edge,
            description: "Disconnect".to_string(),
        }
    }
}

impl GraphCommand for DisconnectCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        if session.graph.edge(self.edge).is_none() {
            return Err(CommandError::ElementNotFound(self.edge));
        }
        Ok(CommandOutcome::from_flag(session.graph.delete_edge(self.edge).is_some()))
    }
}

/// Command to delete elements of any kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteElementsCommand {
    /// Elements to delete
    pub elements: Vec<Guid>,
    /// Delete the edges of deleted nodes and the usages of deleted variables
    pub delete_connections: bool,
    /// Description of the deletion
    pub description: String,
}

impl DeleteElementsCommand {
    /// Create a new delete command
    pub fn new(elements: Vec<Guid>, delete_connections: bool) -> Self {
        Self {
            description: format!("Delete {} element(s)", elements.len()),
            elements,
            delete_connections,
        }
    }
}

impl GraphCommand for DeleteElementsCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let mut deleted = 0;
        for guid in &self.elements {
            if session.graph.delete_element(*guid, self.delete_connections) {
                deleted += 1;
            }
        }
        tracing::debug!("Deleted {} of {} element(s)", deleted, self.elements.len());
        Ok(CommandOutcome::from_flag(deleted > 0))
    }
}

/// Command to move nodes along with their dependents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveNodesCommand {
    /// Nodes the user moved
    pub nodes: Vec<Guid>,
    /// Offset
    pub delta: [f32; 2],
    /// Description of the move
    pub description: String,
}

impl MoveNodesCommand {
    /// Create a new move command
    pub fn new(nodes: Vec<Guid>, delta: [f32; 2]) -> Self {
        Self {
            description: format!("Move {} node(s)", nodes.len()),
            nodes,
            delta,
        }
    }
}

impl GraphCommand for MoveNodesCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let moved = session
            .dependencies
            .move_nodes(&mut session.graph, &self.nodes, self.delta);
        Ok(CommandOutcome::from_flag(!moved.is_empty()))
    }
}

/// Step of an interactive move gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveStep {
    /// Start moving these nodes and their dependents
    Begin(Vec<Guid>),
    /// Place the moved nodes at their start positions plus a total offset
    Drag([f32; 2]),
    /// Keep the current positions
    Commit,
    /// Restore the start positions
    Cancel,
}

/// Command driving the session's move gesture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveGestureCommand {
    /// Gesture step
    pub step: MoveStep,
    /// Description of the step
    pub description: String,
}

impl MoveGestureCommand {
    /// Create a new gesture step command
    pub fn new(step: MoveStep) -> Self {
        let description = match &step {
            MoveStep::Begin(nodes) => format!("Begin moving {} node(s)", nodes.len()),
            MoveStep::Drag(_) => "Drag nodes".to_string(),
            MoveStep::Commit => "Finish move".to_string(),
            MoveStep::Cancel => "Cancel move".to_string(),
        };
        Self { step, description }
    }
}

impl GraphCommand for MoveGestureCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let GraphSession {
            graph,
            dependencies,
            gesture,
            ..
        } = session;
        let applied = match &self.step {
            MoveStep::Begin(nodes) => {
                dependencies.begin_move(graph, gesture, nodes);
                gesture.is_active()
            }
            MoveStep::Drag(delta) => {
                if !gesture.is_active() {
                    return Err(CommandError::InvalidOperation("No move gesture in progress".to_string()));
                }
                dependencies.drag(graph, gesture, *delta);
                true
            }
            MoveStep::Commit => !dependencies.commit_move(graph, gesture).is_empty(),
            MoveStep::Cancel => {
                let active = gesture.is_active();
                dependencies.cancel_move(graph, gesture);
                active
            }
        };
        Ok(CommandOutcome::from_flag(applied))
    }
}

/// Command to line up the linked dependents of a selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignNodesCommand {
    /// Selected nodes
    pub selection: Vec<Guid>,
    /// Description of the alignment
    pub description: String,
}

impl AlignNodesCommand {
    /// Create a new align command
    pub fn new(selection: Vec<Guid>) -> Self {
        Self {
            description: format!("Align {} node(s)", selection.len()),
            selection,
        }
    }
}

impl GraphCommand for AlignNodesCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let moved = session
            .dependencies
            .align_dependencies(&mut session.graph, &self.selection);
        Ok(CommandOutcome::from_flag(moved > 0))
    }
}

/// Command to replace a node's configuration and redefine its ports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconfigureNodeCommand {
    /// Node
    pub node: Guid,
    /// New configuration
    pub kind: NodeKind,
    /// Description of the change
    pub description: String,
}

impl ReconfigureNodeCommand {
    /// Create a new reconfigure command
    pub fn new(node: Guid, kind: NodeKind) -> Self {
        Self {
            node,
            kind,
            description: "Reconfigure node".to_string(),
        }
    }
}

impl GraphCommand for ReconfigureNodeCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        require_node(session, self.node)?;
        let kind = self.kind.clone();
        session.graph.reconfigure_node(self.node, |current| *current = kind);
        Ok(CommandOutcome::applied())
    }
}

/// Command to enable or disable a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetNodeStateCommand {
    /// Node
    pub node: Guid,
    /// New state
    pub state: ModelState,
    /// Description of the change
    pub description: String,
}

impl SetNodeStateCommand {
    /// Create a new state command
    pub fn new(node: Guid, state: ModelState) -> Self {
        let verb = match state {
            ModelState::Enabled => "Enable",
            ModelState::Disabled => "Disable",
        };
        Self {
            node,
            state,
            description: format!("{verb} node"),
        }
    }
}

impl GraphCommand for SetNodeStateCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        require_node(session, self.node)?;
        session.graph.set_node_state(self.node, self.state);
        Ok(CommandOutcome::applied())
    }
}

/// Command to set the embedded constant of a node input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetConstantCommand {
    /// Node
    pub node: Guid,
    /// Input port
    pub port: PortId,
    /// New value
    pub value: PortValue,
    /// Description of the change
    pub description: String,
}

impl SetConstantCommand {
    /// Create a new constant command
    pub fn new(node: Guid, port: impl Into<PortId>, value: PortValue) -> Self {
        let port = port.into();
        Self {
            description: format!("Set {port}"),
            node,
            port,
            value,
        }
    }
}

impl GraphCommand for SetConstantCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        require_node(session, self.node)?;
        Ok(CommandOutcome::from_flag(session.graph.set_constant(
            self.node,
            &self.port,
            self.value.clone(),
        )))
    }
}

/// Command to rename a node, variable, placemat or sticky note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameElementCommand {
    /// Element
    pub element: Guid,
    /// New name
    pub name: String,
    /// Description of the rename
    pub description: String,
}

impl RenameElementCommand {
    /// Create a new rename command
    pub fn new(element: Guid, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("Rename to {name}"),
            element,
            name,
        }
    }
}

impl GraphCommand for RenameElementCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let graph = &mut session.graph;
        let name = self.name.clone();
        let renamed = match graph.element_kind(self.element) {
            Some(ElementKind::Node) => graph.rename_node(self.element, name),
            Some(ElementKind::Variable) => graph.rename_variable(self.element, name),
            Some(ElementKind::Placemat) => graph.rename_placemat(self.element, name),
            Some(ElementKind::StickyNote) => {
                let contents = graph
                    .sticky_note(self.element)
                    .map(|note| note.contents.clone())
                    .unwrap_or_default();
                graph.update_sticky_note(self.element, name, contents)
            }
            Some(ElementKind::Edge) => {
                return Err(CommandError::InvalidOperation("Edges have no name".to_string()));
            }
            None => return Err(CommandError::ElementNotFound(self.element)),
        };
        Ok(CommandOutcome::from_flag(renamed))
    }
}

/// Command to declare a graph variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVariableCommand {
    /// Variable name
    pub name: String,
    /// Value type
    pub data_type: PortType,
    /// Description of the declaration
    pub description: String,
}

impl CreateVariableCommand {
    /// Create a new variable command
    pub fn new(name: impl Into<String>, data_type: PortType) -> Self {
        let name = name.into();
        Self {
            description: format!("Create variable {name}"),
            name,
            data_type,
        }
    }
}

impl GraphCommand for CreateVariableCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let guid = session.graph.create_variable(self.name.clone(), self.data_type.clone());
        Ok(CommandOutcome::created(vec![guid]))
    }
}

/// Command to place a node reading a graph variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVariableNodeCommand {
    /// Variable declaration
    pub declaration: Guid,
    /// Canvas position
    pub position: [f32; 2],
    /// Description of the creation
    pub description: String,
}

impl CreateVariableNodeCommand {
    /// Create a new variable node command
    pub fn new(declaration: Guid, position: [f32; 2]) -> Self {
        Self {
            declaration,
            position,
            description: "Create variable node".to_string(),
        }
    }
}

impl GraphCommand for CreateVariableNodeCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let guid = session.graph.create_variable_node(self.declaration, self.position)?;
        Ok(CommandOutcome::created(vec![guid]))
    }
}

/// Command to delete a variable declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteVariableCommand {
    /// Variable declaration
    pub declaration: Guid,
    /// Delete the nodes reading the variable too
    pub delete_usages: bool,
    /// Description of the deletion
    pub description: String,
}

impl DeleteVariableCommand {
    /// Create a new delete variable command
    pub fn new(declaration: Guid, delete_usages: bool) -> Self {
        Self {
            declaration,
            delete_usages,
            description: "Delete variable".to_string(),
        }
    }
}

impl GraphCommand for DeleteVariableCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        if session.graph.declaration(self.declaration).is_none() {
            return Err(CommandError::ElementNotFound(self.declaration));
        }
        let deleted = session
            .graph
            .delete_variable(self.declaration, self.delete_usages)
            .is_some();
        Ok(CommandOutcome::from_flag(deleted))
    }
}

/// Command to declare a portal and place its entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePortalCommand {
    /// Portal name
    pub name: String,
    /// Carried type, `Exec` for flow
    pub data_type: PortType,
    /// Canvas position of the entry
    pub position: [f32; 2],
    /// Description of the creation
    pub description: String,
}

impl CreatePortalCommand {
    /// Create a new portal command
    pub fn new(name: impl Into<String>, data_type: PortType, position: [f32; 2]) -> Self {
        let name = name.into();
        Self {
            description: format!("Create portal {name}"),
            name,
            data_type,
            position,
        }
    }
}

impl GraphCommand for CreatePortalCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let declaration = session.graph.declare_portal(self.name.clone(), self.data_type.clone());
        let entry = session
            .graph
            .create_portal(declaration, PortalEnd::Entry, self.position)?;
        Ok(CommandOutcome::created(vec![declaration, entry]))
    }
}

/// Command to create the other end of a portal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOppositePortalCommand {
    /// Existing portal end
    pub portal: Guid,
    /// Canvas position of the new end
    pub position: [f32; 2],
    /// Description of the creation
    pub description: String,
}

impl CreateOppositePortalCommand {
    /// Create a new opposite portal command
    pub fn new(portal: Guid, position: [f32; 2]) -> Self {
        Self {
            portal,
            position,
            description: "Create opposite portal".to_string(),
        }
    }
}

impl GraphCommand for CreateOppositePortalCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let is_portal = session
            .graph
            .node(self.portal)
            .ok_or(CommandError::ElementNotFound(self.portal))?
            .kind()
            .as_portal()
            .is_some();
        if !is_portal {
            return Err(CommandError::InvalidOperation(format!("{} is not a portal", self.portal)));
        }
        Ok(CommandOutcome::from_option(
            session.graph.create_opposite_portal(self.portal, self.position),
        ))
    }
}

/// Command to duplicate nodes and the edges touching them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateNodesCommand {
    /// Nodes to duplicate
    pub nodes: Vec<Guid>,
    /// Offset of the copies
    pub offset: [f32; 2],
    /// Description of the duplication
    pub description: String,
}

impl DuplicateNodesCommand {
    /// Create a new duplicate command
    pub fn new(nodes: Vec<Guid>, offset: [f32; 2]) -> Self {
        Self {
            description: format!("Duplicate {} node(s)", nodes.len()),
            nodes,
            offset,
        }
    }
}

impl GraphCommand for DuplicateNodesCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let duplicates = session.graph.duplicate_nodes(&self.nodes, self.offset);
        if duplicates.is_empty() {
            return Ok(CommandOutcome::refused());
        }
        let created = duplicates.values().copied().collect();
        session.duplicates = duplicates;
        Ok(CommandOutcome::created(created))
    }
}

/// Command to create a placemat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlacematCommand {
    /// Title
    pub title: String,
    /// Top-left corner
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Description of the creation
    pub description: String,
}

impl CreatePlacematCommand {
    /// Create a new placemat command
    pub fn new(title: impl Into<String>, position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            title: title.into(),
            position,
            size,
            description: "Create placemat".to_string(),
        }
    }
}

impl GraphCommand for CreatePlacematCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        if !(self.size[0] > 0.0 && self.size[1] > 0.0) {
            return Err(CommandError::InvalidOperation("Placemat size must be positive".to_string()));
        }
        let guid = session
            .graph
            .create_placemat(self.title.clone(), self.position, self.size);
        Ok(CommandOutcome::created(vec![guid]))
    }
}

/// Command to collapse or expand a placemat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapsePlacematCommand {
    /// Placemat
    pub placemat: Guid,
    /// Collapse when true, expand when false
    pub collapsed: bool,
    /// Elements hidden while collapsed
    pub hidden: Vec<Guid>,
    /// Description of the change
    pub description: String,
}

impl CollapsePlacematCommand {
    /// Create a new collapse command
    pub fn new(placemat: Guid, collapsed: bool, hidden: Vec<Guid>) -> Self {
        Self {
            placemat,
            collapsed,
            hidden,
            description: if collapsed { "Collapse placemat" } else { "Expand placemat" }.to_string(),
        }
    }
}

impl GraphCommand for CollapsePlacematCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        if session.graph.placemat(self.placemat).is_none() {
            return Err(CommandError::ElementNotFound(self.placemat));
        }
        Ok(CommandOutcome::from_flag(session.graph.collapse_placemat(
            self.placemat,
            self.collapsed,
            self.hidden.clone(),
        )))
    }
}

/// Command to create a sticky note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStickyNoteCommand {
    /// Title
    pub title: String,
    /// Body text
    pub contents: String,
    /// Top-left corner
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Description of the creation
    pub description: String,
}

impl CreateStickyNoteCommand {
    /// Create a new sticky note command
    pub fn new(title: impl Into<String>, contents: impl Into<String>, position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            title: title.into(),
            contents: contents.into(),
            position,
            size,
            description: "Create sticky note".to_string(),
        }
    }
}

impl GraphCommand for CreateStickyNoteCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let guid = session.graph.create_sticky_note(
            self.title.clone(),
            self.contents.clone(),
            self.position,
            self.size,
        );
        Ok(CommandOutcome::created(vec![guid]))
    }
}

/// Command to move and resize a placemat or sticky note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeAnnotationCommand {
    /// Placemat or sticky note
    pub element: Guid,
    /// New top-left corner
    pub position: [f32; 2],
    /// New width and height
    pub size: [f32; 2],
    /// Description of the change
    pub description: String,
}

impl ResizeAnnotationCommand {
    /// Create a new resize command
    pub fn new(element: Guid, position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            element,
            position,
            size,
            description: "Resize".to_string(),
        }
    }
}

impl GraphCommand for ResizeAnnotationCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, session: &mut GraphSession) -> Result<CommandOutcome, CommandError> {
        let graph = &mut session.graph;
        let resized = match graph.element_kind(self.element) {
            Some(ElementKind::Placemat) => graph.resize_placemat(self.element, self.position, self.size),
            Some(ElementKind::StickyNote) => graph.resize_sticky_note(self.element, self.position, self.size),
            Some(_) => {
                return Err(CommandError::InvalidOperation(format!(
                    "{} is not a placemat or sticky note",
                    self.element
                )));
            }
            None => return Err(CommandError::ElementNotFound(self.element)),
        };
        Ok(CommandOutcome::from_flag(resized))
    }
}
