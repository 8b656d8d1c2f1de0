// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph model for `OrdoPlay` Editor.
//!
//! This crate holds the data side of the node graph editor:
//! - Guid-identified elements with capability flags
//! - Typed, ordered ports regenerated by a node (re)definition protocol
//! - Guid-based port references, edges and their repair
//! - Variables, portals, placemats and sticky notes
//! - Change lists consumed by the view synchronization layer
//! - Dependency propagation for moves, alignment and reachability
//!
//! ## Architecture
//!
//! [`GraphModel`] owns every element and is the only place mutation
//! happens. Each mutation records the touched elements in a [`ChangeList`]
//! that the host takes once per dispatch cycle. The [`DependencyManager`]
//! is kept next to the graph and synced after each cycle.

pub mod annotation;
pub mod change;
pub mod dependency;
pub mod edge;
pub mod element;
pub mod graph;
pub mod integrity;
pub mod node;
pub mod nodes;
pub mod ordered_ports;
pub mod port;
pub mod portal;
pub mod registry;
pub mod settings;
pub mod snapshot;
pub mod variable;

pub use annotation::{PlacematModel, StickyNoteModel};
pub use change::ChangeList;
pub use dependency::{DependencyManager, DependencyRecord, MoveGesture};
pub use edge::{EdgeModel, EndpointRepair, PortReference};
pub use element::{Capabilities, Capability, ElementInfo, ElementKind, GraphElement, Guid};
pub use graph::{ElementRef, GraphError, GraphModel};
pub use integrity::{IntegrityIssue, IntegrityReport};
pub use node::{ModelState, NodeDefinition, NodeModel, NodeUsage, RemovedPort};
pub use nodes::{NodeKind, PortalEnd};
pub use ordered_ports::OrderedPorts;
pub use port::{Port, PortCapacity, PortDecl, PortDirection, PortId, PortKind, PortType, PortValue};
pub use registry::{NodeCategory, NodeRegistry, NodeType};
pub use settings::{GraphSettings, PortLayout, SettingsError};
pub use snapshot::{GraphSnapshot, SnapshotError};
pub use variable::{VariableDeclaration, VariableScope};
