// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph persistence.
//!
//! A snapshot stores every element keyed by its guid string. Files written
//! before guids existed use numeric keys instead; loading maps those
//! through [`Guid::from_legacy_id`] and keeps the number as the element's
//! legacy id. Derived port data is stored but regenerated on load.

use crate::annotation::{PlacematModel, StickyNoteModel};
use crate::edge::EdgeModel;
use crate::element::{ElementInfo, Guid};
use crate::graph::GraphModel;
use crate::node::{DefinitionContext, NodeModel};
use crate::settings::GraphSettings;
use crate::variable::VariableDeclaration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

/// Current graph file format version
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Serialized form of a graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Format version
    pub version: u32,
    /// Graph name
    pub name: String,
    /// Variable and portal declarations
    #[serde(default)]
    pub declarations: IndexMap<String, VariableDeclaration>,
    /// Nodes
    #[serde(default)]
    pub nodes: IndexMap<String, NodeModel>,
    /// Edges
    #[serde(default)]
    pub edges: IndexMap<String, EdgeModel>,
    /// Placemats
    #[serde(default)]
    pub placemats: IndexMap<String, PlacematModel>,
    /// Sticky notes
    #[serde(default)]
    pub sticky_notes: IndexMap<String, StickyNoteModel>,
}

impl GraphSnapshot {
    /// Parse a snapshot from RON text
    pub fn from_ron(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: GraphSnapshot = ron::from_str(content)?;
        if snapshot.version > GRAPH_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: GRAPH_FORMAT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Serialize to RON text
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }
}

/// Assigns guids to snapshot keys, migrating legacy numeric ids
#[derive(Default)]
struct KeyAllocator {
    taken: HashSet<Guid>,
}

impl KeyAllocator {
    fn allocate(&mut self, key: &str, info: &mut ElementInfo) -> Result<Guid, SnapshotError> {
        if let Ok(guid) = Guid::from_str(key) {
            if !guid.is_assigned() || !self.taken.insert(guid) {
                return Err(SnapshotError::DuplicateGuid(guid));
            }
            info.guid = guid;
            return Ok(guid);
        }

        let legacy: u64 = key.parse().map_err(|_| SnapshotError::InvalidKey(key.to_string()))?;
        let mut guid = Guid::from_legacy_id(legacy);
        if !self.taken.insert(guid) {
            tracing::warn!("Legacy id {} is used twice, assigning a fresh guid", legacy);
            guid = Guid::new();
            self.taken.insert(guid);
        }
        info.guid = guid;
        info.legacy_id = Some(legacy);
        Ok(guid)
    }
}

fn allocate_all<T>(
    allocator: &mut KeyAllocator,
    elements: IndexMap<String, T>,
    info: impl Fn(&mut T) -> &mut ElementInfo,
) -> Result<IndexMap<Guid, T>, SnapshotError> {
    let mut allocated = IndexMap::with_capacity(elements.len());
    for (key, mut element) in elements {
        let guid = allocator.allocate(&key, info(&mut element))?;
        allocated.insert(guid, element);
    }
    Ok(allocated)
}

impl GraphModel {
    /// Capture the graph in serializable form
    pub fn to_snapshot(&self) -> GraphSnapshot {
        fn keyed<T: Clone>(elements: &IndexMap<Guid, T>) -> IndexMap<String, T> {
            elements
                .iter()
                .map(|(guid, element)| (guid.to_string(), element.clone()))
                .collect()
        }

        GraphSnapshot {
            version: GRAPH_FORMAT_VERSION,
            name: self.name.clone(),
            declarations: keyed(&self.declarations),
            nodes: keyed(&self.nodes),
            edges: keyed(&self.edges),
            placemats: keyed(&self.placemats),
            sticky_notes: keyed(&self.sticky_notes),
        }
    }

    /// Rebuild a graph from a snapshot
    ///
    /// Nodes are redefined against the current node code; edge ends that no
    /// longer resolve are migrated or given placeholder ports. Every element
    /// is marked changed so a view built from the result is complete.
    pub fn from_snapshot(snapshot: GraphSnapshot, settings: GraphSettings) -> Result<Self, SnapshotError> {
        if snapshot.version > GRAPH_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: GRAPH_FORMAT_VERSION,
            });
        }

        // Nodes first so legacy ids referenced by edges keep their node
        let mut allocator = KeyAllocator::default();
        let nodes = allocate_all(&mut allocator, snapshot.nodes, |n| &mut n.info)?;
        let declarations = allocate_all(&mut allocator, snapshot.declarations, |d| &mut d.info)?;
        let edges = allocate_all(&mut allocator, snapshot.edges, |e| &mut e.info)?;
        let placemats = allocate_all(&mut allocator, snapshot.placemats, |p| &mut p.info)?;
        let sticky_notes = allocate_all(&mut allocator, snapshot.sticky_notes, |s| &mut s.info)?;

        let mut graph = GraphModel::with_settings(snapshot.name, settings);
        graph.nodes = nodes;
        graph.declarations = declarations;
        graph.edges = edges;
        graph.placemats = placemats;
        graph.sticky_notes = sticky_notes;

        let ctx = DefinitionContext {
            declarations: &graph.declarations,
            settings: &graph.settings,
        };
        for node in graph.nodes.values_mut() {
            node.restamp_ports();
            // Stale ports are left to edge repair below
            node.define(&ctx);
        }

        let repaired = graph.repair_edges();
        if repaired > 0 {
            tracing::info!("Repaired {} edge end(s) in graph {}", repaired, graph.name);
        }
        graph.check_integrity().log(&graph.name);

        graph.touch_all();
        tracing::debug!(
            "Loaded graph {} ({} nodes, {} edges)",
            graph.name,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Serialize the graph to RON text
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        self.to_snapshot().to_ron()
    }

    /// Parse a graph from RON text
    pub fn from_ron(content: &str, settings: GraphSettings) -> Result<Self, SnapshotError> {
        Self::from_snapshot(GraphSnapshot::from_ron(content)?, settings)
    }

    /// Load a graph from a file
    pub fn load(path: &Path, settings: GraphSettings) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content, settings)
    }

    /// Save the graph to a file
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved graph {} to {:?}", self.name, path);
        Ok(())
    }
}

/// Error loading or saving a graph
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// File could not be read or written
    #[error("Graph I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File content is not a valid graph
    #[error("Invalid graph file: {0}")]
    Decode(#[from] ron::error::SpannedError),

    /// Graph could not be encoded
    #[error("Graph encoding failed: {0}")]
    Encode(#[from] ron::Error),

    /// Graph was written by a newer version
    #[error("Graph version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest supported version
        supported: u32,
    },

    /// An element key is neither a guid nor a legacy id
    #[error("Invalid element key: {0}")]
    InvalidKey(String),

    /// Two elements share a guid
    #[error("Duplicate guid in graph file: {0}")]
    DuplicateGuid(Guid),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::PortReference;
    use crate::element::GraphElement;
    use crate::nodes::{MathNode, MathOp, NodeKind, PortalEnd};
    use crate::port::{PortDirection, PortId, PortType, PortValue};

    fn sample() -> (GraphModel, Guid, Guid) {
        let mut graph = GraphModel::new("Sample");
        let a = graph.create_node(
            NodeKind::Math(MathNode::new(MathOp::Add, PortType::Float)),
            "A",
            [0.0, 0.0],
        );
        let b = graph.create_node(
            NodeKind::Math(MathNode::new(MathOp::Negate, PortType::Float)),
            "B",
            [200.0, 0.0],
        );
        graph
            .connect(&PortReference::output(a, "result"), &PortReference::input(b, "in_0"))
            .unwrap();
        graph.set_constant(a, &PortId::from("in_1"), PortValue::Float(2.5));
        let wire = graph.declare_portal("wire", PortType::Float);
        graph.create_portal(wire, PortalEnd::Entry, [0.0, 100.0]).unwrap();
        graph.create_placemat("Group", [-10.0, -10.0], [400.0, 200.0]);
        graph.create_sticky_note("Note", "hello", [0.0, 300.0], [100.0, 50.0]);
        (graph, a, b)
    }

    #[test]
    fn test_reload_preserves_identity() {
        let (graph, a, b) = sample();
        let text = graph.to_ron().unwrap();
        let loaded = GraphModel::from_ron(&text, GraphSettings::default()).unwrap();

        assert_eq!(loaded.name, "Sample");
        assert_eq!(loaded.node_count(), graph.node_count());
        assert_eq!(loaded.edge_count(), 1);
        assert_eq!(loaded.node(a).unwrap().guid(), a);
        assert_eq!(
            loaded.node(a).unwrap().constant(&PortId::from("in_1")),
            Some(&PortValue::Float(2.5))
        );
        let edge = loaded.edges().next().unwrap();
        assert_eq!(edge.input().node, b);
        assert!(loaded.check_integrity().is_ok());
        assert!(loaded.changes().is_changed(a));
    }

    #[test]
    fn test_legacy_keys_are_migrated() {
        let text = r#"GraphSnapshot(
            version: 1,
            name: "Old",
            nodes: {
                "1": NodeModel(
                    info: ElementInfo(capabilities: [Deletable, Movable]),
                    kind: Math(MathNode(op: Add, input_count: 2, operand_type: Float)),
                    title: "Add",
                    position: (0.0, 0.0),
                    collapsed: false,
                    state: Enabled,
                    inputs: {},
                    outputs: {},
                    constants: {},
                ),
                "2": NodeModel(
                    info: ElementInfo(capabilities: []),
                    kind: Math(MathNode(op: Negate, input_count: 1, operand_type: Float)),
                    title: "Negate",
                    position: (100.0, 0.0),
                    collapsed: false,
                    state: Enabled,
                    inputs: {},
                    outputs: {},
                    constants: {},
                ),
            },
            edges: {
                "1": EdgeModel(
                    info: ElementInfo(capabilities: [Deletable]),
                    output: (node: 1, port: "out", direction: Output),
                    input: (node: 2, port: "a", direction: Input),
                ),
            },
        )"#;
        let graph = GraphModel::from_ron(text, GraphSettings::default()).unwrap();

        let first = Guid::from_legacy_id(1);
        assert_eq!(graph.node(first).unwrap().info().legacy_id, Some(1));
        assert!(graph.node(Guid::from_legacy_id(2)).is_some());

        // The edge's legacy id collides with node 1 and gets a fresh guid
        let edge = graph.edges().next().unwrap();
        assert_ne!(edge.guid(), first);
        assert_eq!(edge.info().legacy_id, Some(1));
        assert_eq!(edge.output().port, PortId::from("result"));
        assert_eq!(edge.input().port, PortId::from("in_0"));
        assert!(graph
            .node(first)
            .unwrap()
            .port(&PortId::from("result"), PortDirection::Output)
            .is_some());
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let mut snapshot = GraphModel::new("Bad").to_snapshot();
        let (graph, _, _) = sample();
        let node = graph.nodes().next().unwrap().clone();
        snapshot.nodes.insert("not-a-key".to_string(), node);
        assert!(matches!(
            GraphModel::from_snapshot(snapshot, GraphSettings::default()),
            Err(SnapshotError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let snapshot = GraphSnapshot {
            version: GRAPH_FORMAT_VERSION + 1,
            ..GraphSnapshot::default()
        };
        assert!(matches!(
            GraphModel::from_snapshot(snapshot, GraphSettings::default()),
            Err(SnapshotError::UnsupportedVersion { .. })
        ));
    }
}
