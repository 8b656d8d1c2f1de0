// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session state shared by every command.

use indexmap::IndexMap;
use ordoplay_graph_model::{DependencyManager, GraphModel, Guid, MoveGesture, NodeRegistry};

/// A graph together with the state its commands need
#[derive(Debug)]
pub struct GraphSession {
    /// The graph being edited
    pub graph: GraphModel,
    /// Node types available for creation
    pub registry: NodeRegistry,
    /// Dependencies between the graph's nodes, synced after every command
    pub dependencies: DependencyManager,
    /// Move gesture in progress, if any
    pub gesture: MoveGesture,
    /// Originals and their copies from the last duplication
    pub duplicates: IndexMap<Guid, Guid>,
}

impl GraphSession {
    /// Open a session on a graph
    pub fn new(graph: GraphModel, registry: NodeRegistry) -> Self {
        let dependencies = DependencyManager::from_graph(&graph);
        Self {
            graph,
            registry,
            dependencies,
            gesture: MoveGesture::new(),
            duplicates: IndexMap::new(),
        }
    }

    /// Open a session with the standard node types
    pub fn with_standard_nodes(graph: GraphModel) -> Self {
        Self::new(graph, NodeRegistry::standard())
    }
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::with_standard_nodes(GraphModel::default())
    }
}
