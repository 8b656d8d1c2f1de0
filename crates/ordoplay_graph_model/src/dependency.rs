// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dependency propagation between nodes.
//!
//! The [`DependencyManager`] keeps an adjacency map from parent to child
//! nodes derived from edges (the output side is the parent) and from portal
//! declarations. Moves, alignment and reachability walk this map with an
//! explicit visited set since portal dependencies form cycles.

use crate::element::{GraphElement, Guid};
use crate::graph::GraphModel;
use crate::node::{ModelState, NodeDefinition, NodeUsage};
use crate::nodes::PortalEnd;
use crate::port::PortDirection;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};

/// Parallel edges from one node to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedNodesDependency {
    /// Number of edges from parent to child
    pub count: usize,
}

/// Two portal ends sharing a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalNodesDependency {
    /// Shared declaration
    pub declaration: Guid,
    /// Which end the child is
    pub child_end: PortalEnd,
}

/// Why a child depends on a parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Edges from parent to child, if any
    pub linked: Option<LinkedNodesDependency>,
    /// Shared portal declaration, if any
    pub portal: Option<PortalNodesDependency>,
}

impl DependencyRecord {
    fn is_empty(&self) -> bool {
        self.linked.is_none() && self.portal.is_none()
    }

    /// Whether execution and data flow from parent to child
    ///
    /// Portals only flow from an entry into its exits.
    pub fn carries_flow(&self) -> bool {
        self.linked.is_some() || self.portal.is_some_and(|p| p.child_end == PortalEnd::Exit)
    }
}

/// State of one move gesture
///
/// Owned by the caller. [`DependencyManager::begin_move`] resets it, so a
/// gesture never sees positions or visits from an earlier one.
#[derive(Debug, Default)]
pub struct MoveGesture {
    primaries: Vec<Guid>,
    start_positions: IndexMap<Guid, [f32; 2]>,
    visited: HashSet<Guid>,
    delta: [f32; 2],
    active: bool,
}

impl MoveGesture {
    /// Create an idle gesture
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Total delta of the last drag
    pub fn delta(&self) -> [f32; 2] {
        self.delta
    }

    /// Nodes the gesture has moved, primaries first
    pub fn moved_nodes(&self) -> impl Iterator<Item = Guid> + '_ {
        self.start_positions.keys().copied()
    }

    /// Position a node had when the gesture reached it
    pub fn start_position(&self, node: Guid) -> Option<[f32; 2]> {
        self.start_positions.get(&node).copied()
    }

    fn reset(&mut self) {
        self.primaries.clear();
        self.start_positions.clear();
        self.visited.clear();
        self.delta = [0.0, 0.0];
        self.active = false;
    }
}

/// Adjacency map of node dependencies
#[derive(Debug, Clone, Default)]
pub struct DependencyManager {
    dependencies: HashMap<Guid, IndexMap<Guid, DependencyRecord>>,
    edge_links: HashMap<Guid, (Guid, Guid)>,
}

impl DependencyManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for a graph from scratch
    pub fn from_graph(graph: &GraphModel) -> Self {
        let mut manager = Self::new();
        manager.sync(graph);
        manager
    }

    /// Record of a parent/child pair
    pub fn dependency(&self, parent: Guid, child: Guid) -> Option<&DependencyRecord> {
        self.dependencies.get(&parent)?.get(&child)
    }

    /// Children of a node
    pub fn dependents(&self, parent: Guid) -> impl Iterator<Item = (Guid, &DependencyRecord)> {
        self.dependencies
            .get(&parent)
            .into_iter()
            .flat_map(|children| children.iter().map(|(child, record)| (*child, record)))
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    fn record_mut(&mut self, parent: Guid, child: Guid) -> &mut DependencyRecord {
        self.dependencies
            .entry(parent)
            .or_default()
            .entry(child)
            .or_default()
    }

    fn prune(&mut self, parent: Guid, child: Guid) {
        if let Some(children) = self.dependencies.get_mut(&parent) {
            if children.get(&child).is_some_and(DependencyRecord::is_empty) {
                children.shift_remove(&child);
            }
            if children.is_empty() {
                self.dependencies.remove(&parent);
            }
        }
    }

    /// Count one more edge from parent to child
    pub fn add_link(&mut self, parent: Guid, child: Guid) {
        let record = self.record_mut(parent, child);
        match &mut record.linked {
            Some(linked) => {
                linked.count = linked.count.checked_add(1).unwrap_or_else(|| {
                    tracing::warn!("Link count overflow between {} and {}", parent, child);
                    usize::MAX
                });
            }
            None => record.linked = Some(LinkedNodesDependency { count: 1 }),
        }
    }

    /// Count one edge less from parent to child, dropping the link at zero
    pub fn remove_link(&mut self, parent: Guid, child: Guid) {
        let Some(record) = self
            .dependencies
            .get_mut(&parent)
            .and_then(|children| children.get_mut(&child))
        else {
            tracing::warn!("Removing unknown link between {} and {}", parent, child);
            return;
        };
        match &mut record.linked {
            Some(linked) if linked.count > 1 => linked.count -= 1,
            Some(_) => record.linked = None,
            None => tracing::warn!("Removing unknown link between {} and {}", parent, child),
        }
        self.prune(parent, child);
    }

    /// Register an edge. Registering the same edge twice has no effect.
    pub fn add_edge(&mut self, edge: Guid, parent: Guid, child: Guid) {
        if self.edge_links.insert(edge, (parent, child)).is_none() {
            self.add_link(parent, child);
        }
    }

    /// Unregister an edge
    pub fn remove_edge(&mut self, edge: Guid) {
        if let Some((parent, child)) = self.edge_links.remove(&edge) {
            self.remove_link(parent, child);
        }
    }

    /// Bring the map up to date with the graph
    ///
    /// Edge links are updated incrementally; portal dependencies are
    /// recomputed.
    pub fn sync(&mut self, graph: &GraphModel) {
        let stale: Vec<Guid> = self
            .edge_links
            .keys()
            .filter(|edge| graph.edge(**edge).is_none())
            .copied()
            .collect();
        for edge in stale {
            self.remove_edge(edge);
        }
        for edge in graph.edges() {
            self.add_edge(edge.guid(), edge.output().node, edge.input().node);
        }

        let mut pairs = Vec::new();
        for children in self.dependencies.values_mut() {
            for record in children.values_mut() {
                record.portal = None;
            }
        }
        for (parent, children) in &self.dependencies {
            for (child, record) in children {
                if record.is_empty() {
                    pairs.push((*parent, *child));
                }
            }
        }
        for (parent, child) in pairs {
            self.prune(parent, child);
        }

        let mut groups: IndexMap<Guid, Vec<(Guid, PortalEnd)>> = IndexMap::new();
        for node in graph.nodes() {
            if let Some(portal) = node.kind().as_portal() {
                groups
                    .entry(portal.declaration)
                    .or_default()
                    .push((node.guid(), portal.end));
            }
        }
        for (declaration, ends) in groups {
            for (parent, _) in &ends {
                for (child, child_end) in &ends {
                    if parent != child {
                        self.record_mut(*parent, *child).portal = Some(PortalNodesDependency {
                            declaration,
                            child_end: *child_end,
                        });
                    }
                }
            }
        }
    }

    /// Depth-first walk from the seeds
    ///
    /// Seeds are marked visited first and are not reported. Every other node
    /// reachable through records accepted by `follow` is reported once, as
    /// `(parent, child, record)`, parent before child.
    pub fn process_dependencies(
        &self,
        seeds: &[Guid],
        visited: &mut HashSet<Guid>,
        follow: impl Fn(&DependencyRecord) -> bool,
        mut visitor: impl FnMut(Guid, Guid, &DependencyRecord),
    ) {
        visited.extend(seeds.iter().copied());
        let mut stack: Vec<Guid> = seeds.iter().rev().copied().collect();
        while let Some(parent) = stack.pop() {
            let children: Vec<(Guid, &DependencyRecord)> = self.dependents(parent).collect();
            for (child, record) in children.into_iter().rev() {
                if !follow(record) || !visited.insert(child) {
                    continue;
                }
                visitor(parent, child, record);
                stack.push(child);
            }
        }
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    /// Start a move gesture for a set of primary nodes
    pub fn begin_move(&self, graph: &mut GraphModel, gesture: &mut MoveGesture, primaries: &[Guid]) {
        gesture.reset();
        gesture.primaries = primaries
            .iter()
            .copied()
            .filter(|guid| graph.node(*guid).is_some())
            .collect();
        gesture.active = !gesture.primaries.is_empty();
        if !gesture.active {
            return;
        }
        self.propagate_move(graph, gesture, Some([0.0, 0.0]));
        tracing::debug!(
            "Move gesture started with {} primary and {} dependent node(s)",
            gesture.primaries.len(),
            gesture.start_positions.len().saturating_sub(gesture.primaries.len())
        );
    }

    /// Move the gesture's nodes to their start positions plus `delta`
    pub fn drag(&self, graph: &mut GraphModel, gesture: &mut MoveGesture, delta: [f32; 2]) -> usize {
        if !gesture.active {
            return 0;
        }
        gesture.delta = delta;
        self.propagate_move(graph, gesture, Some(delta))
    }

    /// Put every node back where the gesture found it and end the gesture
    pub fn cancel_move(&self, graph: &mut GraphModel, gesture: &mut MoveGesture) {
        if gesture.active {
            self.propagate_move(graph, gesture, None);
            tracing::debug!("Move gesture cancelled");
        }
        gesture.reset();
    }

    /// Write the final positions and end the gesture
    ///
    /// Returns the nodes that were moved.
    pub fn commit_move(&self, graph: &mut GraphModel, gesture: &mut MoveGesture) -> Vec<Guid> {
        if !gesture.active {
            return Vec::new();
        }
        let delta = gesture.delta;
        self.propagate_move(graph, gesture, Some(delta));
        let moved = gesture.moved_nodes().collect();
        gesture.reset();
        moved
    }

    /// Move nodes and their dependents in one step
    pub fn move_nodes(&self, graph: &mut GraphModel, primaries: &[Guid], delta: [f32; 2]) -> Vec<Guid> {
        let mut gesture = MoveGesture::new();
        self.begin_move(graph, &mut gesture, primaries);
        self.drag(graph, &mut gesture, delta);
        self.commit_move(graph, &mut gesture)
    }

    /// Place every node reached by the gesture at its start position plus
    /// `delta`, or exactly at its start position when `delta` is `None`
    fn propagate_move(&self, graph: &mut GraphModel, gesture: &mut MoveGesture, delta: Option<[f32; 2]>) -> usize {
        gesture.visited.clear();
        let mut reached = gesture.primaries.clone();
        self.process_dependencies(&gesture.primaries, &mut gesture.visited, |_| true, |_, child, _| {
            reached.push(child);
        });

        let mut moved = 0;
        for guid in reached {
            let Some(node) = graph.node(guid) else {
                continue;
            };
            let start = *gesture.start_positions.entry(guid).or_insert(node.position());
            let target = match delta {
                Some([dx, dy]) => [start[0] + dx, start[1] + dy],
                None => start,
            };
            if graph.set_node_position(guid, target) {
                moved += 1;
            }
        }
        moved
    }

    // ------------------------------------------------------------------
    // Alignment
    // ------------------------------------------------------------------

    fn linked_neighbors(&self) -> HashMap<Guid, Vec<Guid>> {
        let mut neighbors: HashMap<Guid, Vec<Guid>> = HashMap::new();
        for (parent, children) in &self.dependencies {
            for (child, record) in children {
                if record.linked.is_some() {
                    neighbors.entry(*parent).or_default().push(*child);
                    neighbors.entry(*child).or_default().push(*parent);
                }
            }
        }
        neighbors
    }

    /// Vertical position that lines a child's input port up with its parent's output port
    fn aligned_y(graph: &GraphModel, parent: Guid, child: Guid) -> Option<f32> {
        let edge = graph
            .edges()
            .find(|edge| edge.output().node == parent && edge.input().node == child)?;
        let parent_node = graph.node(parent)?;
        let child_node = graph.node(child)?;
        let layout = graph.settings().layout;
        let from = layout.anchor(parent_node, &edge.output().port, PortDirection::Output)?;
        let to = layout.anchor(child_node, &edge.input().port, PortDirection::Input)?;
        Some(parent_node.position()[1] + from[1] - to[1])
    }

    /// Line up the linked dependents of a selection edge-to-edge
    ///
    /// Selected nodes connected through edges, in either direction, form a
    /// component. The top-most selected node of each component stays put and
    /// its downstream dependents are moved vertically so that each connecting
    /// edge is horizontal. Returns the number of nodes moved.
    pub fn align_dependencies(&self, graph: &mut GraphModel, selection: &[Guid]) -> usize {
        let neighbors = self.linked_neighbors();
        let mut assigned = HashSet::new();
        let mut anchors = Vec::new();

        for &start in selection {
            if assigned.contains(&start) || graph.node(start).is_none() {
                continue;
            }
            let mut component = HashSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(guid) = queue.pop_front() {
                for next in neighbors.get(&guid).into_iter().flatten() {
                    if component.insert(*next) {
                        queue.push_back(*next);
                    }
                }
            }

            let top = selection
                .iter()
                .copied()
                .filter(|guid| component.contains(guid))
                .filter_map(|guid| graph.node(guid).map(|node| (guid, node.position()[1])))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(start, |(guid, _)| guid);
            assigned.extend(selection.iter().copied().filter(|guid| component.contains(guid)));
            anchors.push(top);
        }

        let mut visited = HashSet::new();
        let mut aligned = 0;
        for anchor in anchors {
            let mut order = Vec::new();
            self.process_dependencies(
                &[anchor],
                &mut visited,
                |record| record.linked.is_some(),
                |parent, child, _| order.push((parent, child)),
            );
            for (parent, child) in order {
                let Some(y) = Self::aligned_y(graph, parent, child) else {
                    continue;
                };
                let Some(x) = graph.node(child).map(|node| node.position()[0]) else {
                    continue;
                };
                if graph.node(child).is_some_and(|node| node.position()[1] != y)
                    && graph.set_node_position(child, [x, y])
                {
                    aligned += 1;
                }
            }
        }
        tracing::debug!("Aligned {} node(s)", aligned);
        aligned
    }

    // ------------------------------------------------------------------
    // Reachability
    // ------------------------------------------------------------------

    /// Compute every node's usage from the entry points
    ///
    /// A node reached from an entry point is enabled unless it is disabled
    /// or downstream of a disabled node it was reached through. Nodes that
    /// are never reached are unused whatever their state. Returns the number
    /// of nodes whose usage changed.
    pub fn update_node_usage(&self, graph: &mut GraphModel) -> usize {
        let mut reached = HashSet::new();
        let entries: Vec<Guid> = graph
            .nodes()
            .filter(|node| node.kind().is_entry_point())
            .map(GraphElement::guid)
            .collect();
        let mut queue: VecDeque<Guid> = entries.iter().copied().collect();
        reached.extend(entries);
        while let Some(parent) = queue.pop_front() {
            for (child, record) in self.dependents(parent) {
                if record.carries_flow() && reached.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        let mut disabled = HashSet::new();
        let mut queue: VecDeque<Guid> = graph
            .nodes()
            .filter(|node| node.state() == ModelState::Disabled && reached.contains(&node.guid()))
            .map(GraphElement::guid)
            .collect();
        disabled.extend(queue.iter().copied());
        while let Some(parent) = queue.pop_front() {
            for (child, record) in self.dependents(parent) {
                if record.carries_flow() && disabled.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        let usages: Vec<(Guid, NodeUsage)> = graph
            .nodes()
            .map(|node| {
                let guid = node.guid();
                let usage = if disabled.contains(&guid) {
                    NodeUsage::Disabled
                } else if reached.contains(&guid) {
                    NodeUsage::Enabled
                } else {
                    NodeUsage::Unused
                };
                (guid, usage)
            })
            .collect();

        let mut changed = 0;
        for (guid, usage) in usages {
            if graph.node(guid).is_some_and(|node| node.usage() != usage) {
                graph.set_node_usage(guid, usage);
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::PortReference;
    use crate::nodes::{DeclaredNode, EventNode, FlowNode, FlowOp, NodeKind, EXEC_IN, EXEC_OUT};
    use crate::port::{PortCapacity, PortDecl, PortType};
    use proptest::prelude::*;
    use rstest::rstest;

    fn relay(graph: &mut GraphModel, position: [f32; 2]) -> Guid {
        graph.create_node(
            NodeKind::Declared(DeclaredNode::new(
                "relay",
                vec![
                    PortDecl::new("in", PortType::Float).with_capacity(PortCapacity::Single),
                    PortDecl::new("in2", PortType::Float).with_capacity(PortCapacity::Single),
                ],
                vec![PortDecl::new("out", PortType::Float)],
            )),
            "Relay",
            position,
        )
    }

    fn link(graph: &mut GraphModel, from: Guid, to: Guid, port: &str) -> Guid {
        graph
            .connect(&PortReference::output(from, "out"), &PortReference::input(to, port))
            .unwrap()
    }

    #[test]
    fn test_parallel_edges_share_one_record() {
        let mut graph = GraphModel::default();
        let (a, b) = (relay(&mut graph, [0.0, 0.0]), relay(&mut graph, [0.0, 0.0]));
        let first = link(&mut graph, a, b, "in");
        let second = link(&mut graph, a, b, "in2");

        let mut manager = DependencyManager::from_graph(&graph);
        assert_eq!(manager.dependency(a, b).unwrap().linked, Some(LinkedNodesDependency { count: 2 }));

        graph.delete_edge(first);
        manager.sync(&graph);
        assert_eq!(manager.dependency(a, b).unwrap().linked, Some(LinkedNodesDependency { count: 1 }));

        graph.delete_edge(second);
        manager.sync(&graph);
        assert!(manager.dependency(a, b).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_move_chain_and_cancel() {
        let mut graph = GraphModel::default();
        let a = relay(&mut graph, [0.0, 0.0]);
        let b = relay(&mut graph, [200.0, 0.0]);
        let c = relay(&mut graph, [400.0, 0.0]);
        link(&mut graph, a, b, "in");
        link(&mut graph, b, c, "in");
        let manager = DependencyManager::from_graph(&graph);

        let mut gesture = MoveGesture::new();
        manager.begin_move(&mut graph, &mut gesture, &[a]);
        manager.drag(&mut graph, &mut gesture, [10.0, 20.0]);
        assert_eq!(graph.node(b).unwrap().position(), [210.0, 20.0]);
        assert_eq!(graph.node(c).unwrap().position(), [410.0, 20.0]);

        manager.cancel_move(&mut graph, &mut gesture);
        assert!(!gesture.is_active());
        assert_eq!(graph.node(a).unwrap().position(), [0.0, 0.0]);
        assert_eq!(graph.node(b).unwrap().position(), [200.0, 0.0]);
        assert_eq!(graph.node(c).unwrap().position(), [400.0, 0.0]);
    }

    #[test]
    fn test_move_of_missing_nodes_stays_inactive() {
        let mut graph = GraphModel::default();
        let manager = DependencyManager::from_graph(&graph);
        let mut gesture = MoveGesture::new();
        manager.begin_move(&mut graph, &mut gesture, &[Guid::new()]);
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_move_does_not_reach_parents() {
        let mut graph = GraphModel::default();
        let a = relay(&mut graph, [0.0, 0.0]);
        let b = relay(&mut graph, [200.0, 0.0]);
        link(&mut graph, a, b, "in");
        let manager = DependencyManager::from_graph(&graph);

        let moved = manager.move_nodes(&mut graph, &[b], [5.0, 5.0]);
        assert_eq!(moved, vec![b]);
        assert_eq!(graph.node(a).unwrap().position(), [0.0, 0.0]);
    }

    #[test]
    fn test_diamond_visits_once() {
        let mut graph = GraphModel::default();
        let a = relay(&mut graph, [0.0, 0.0]);
        let b = relay(&mut graph, [0.0, 0.0]);
        let c = relay(&mut graph, [0.0, 0.0]);
        let d = relay(&mut graph, [0.0, 0.0]);
        link(&mut graph, a, b, "in");
        link(&mut graph, a, c, "in");
        link(&mut graph, b, d, "in");
        link(&mut graph, c, d, "in2");
        let manager = DependencyManager::from_graph(&graph);

        let mut visits = Vec::new();
        manager.process_dependencies(&[a], &mut HashSet::new(), |_| true, |_, child, _| visits.push(child));
        assert_eq!(visits.iter().filter(|guid| **guid == d).count(), 1);
        assert_eq!(visits.len(), 3);

        manager.move_nodes(&mut graph, &[a], [1.0, 1.0]);
        assert_eq!(graph.node(d).unwrap().position(), [1.0, 1.0]);
    }

    #[test]
    fn test_portal_moves_every_instance() {
        let mut graph = GraphModel::default();
        let wire = graph.declare_portal("wire", PortType::Float);
        let entry = graph.create_portal(wire, PortalEnd::Entry, [0.0, 0.0]).unwrap();
        let exit = graph.create_portal(wire, PortalEnd::Exit, [500.0, 0.0]).unwrap();
        let other = graph.create_portal(wire, PortalEnd::Exit, [500.0, 100.0]).unwrap();
        let manager = DependencyManager::from_graph(&graph);

        manager.move_nodes(&mut graph, &[exit], [0.0, 10.0]);
        assert_eq!(graph.node(entry).unwrap().position(), [0.0, 10.0]);
        assert_eq!(graph.node(other).unwrap().position(), [500.0, 110.0]);
    }

    #[test]
    fn test_align_lines_up_ports() {
        let mut graph = GraphModel::default();
        let a = relay(&mut graph, [0.0, 0.0]);
        let b = relay(&mut graph, [200.0, 80.0]);
        let c = relay(&mut graph, [400.0, -30.0]);
        link(&mut graph, a, b, "in2");
        link(&mut graph, b, c, "in");
        let manager = DependencyManager::from_graph(&graph);

        assert_eq!(manager.align_dependencies(&mut graph, &[b, a]), 2);
        // out is row 0 of the outputs, in2 is row 1 of the inputs
        let port_height = graph.settings().layout.port_height;
        assert_eq!(graph.node(a).unwrap().position(), [0.0, 0.0]);
        assert_eq!(graph.node(b).unwrap().position(), [200.0, -port_height]);
        assert_eq!(graph.node(c).unwrap().position(), [400.0, -port_height]);
    }

    #[rstest]
    #[case(ModelState::Enabled, NodeUsage::Enabled, ModelState::Enabled)]
    #[case(ModelState::Disabled, NodeUsage::Disabled, ModelState::Enabled)]
    #[case(ModelState::Enabled, NodeUsage::Enabled, ModelState::Disabled)]
    fn test_usage_follows_flow(
        #[case] middle_state: ModelState,
        #[case] downstream: NodeUsage,
        #[case] orphan_state: ModelState,
    ) {
        let mut graph = GraphModel::default();
        let event = graph.create_node(NodeKind::Event(EventNode { event: "tick".into() }), "Tick", [0.0, 0.0]);
        let log = || NodeKind::Flow(FlowNode { op: FlowOp::Log });
        let first = graph.create_node(log(), "First", [0.0, 0.0]);
        let second = graph.create_node(log(), "Second", [0.0, 0.0]);
        let orphan = graph.create_node(log(), "Orphan", [0.0, 0.0]);
        graph.connect(&PortReference::output(event, EXEC_OUT), &PortReference::input(first, EXEC_IN));
        graph.connect(&PortReference::output(first, EXEC_OUT), &PortReference::input(second, EXEC_IN));
        graph.set_node_state(first, middle_state);
        graph.set_node_state(orphan, orphan_state);

        let manager = DependencyManager::from_graph(&graph);
        manager.update_node_usage(&mut graph);
        assert_eq!(graph.node(event).unwrap().usage(), NodeUsage::Enabled);
        assert_eq!(graph.node(first).unwrap().usage(), downstream);
        assert_eq!(graph.node(second).unwrap().usage(), downstream);
        assert_eq!(graph.node(orphan).unwrap().usage(), NodeUsage::Unused);

        // A second pass changes nothing
        assert_eq!(manager.update_node_usage(&mut graph), 0);
    }

    #[test]
    fn test_usage_flows_through_portals() {
        let mut graph = GraphModel::default();
        let wire = graph.declare_portal("wire", PortType::Exec);
        let event = graph.create_node(NodeKind::Event(EventNode { event: "tick".into() }), "Tick", [0.0, 0.0]);
        let entry = graph.create_portal(wire, PortalEnd::Entry, [0.0, 0.0]).unwrap();
        let exit = graph.create_portal(wire, PortalEnd::Exit, [0.0, 0.0]).unwrap();
        graph.connect(
            &PortReference::output(event, EXEC_OUT),
            &PortReference::input(entry, crate::nodes::PORTAL_IN),
        );
        graph.set_node_state(exit, ModelState::Disabled);

        let manager = DependencyManager::from_graph(&graph);
        manager.update_node_usage(&mut graph);
        assert_eq!(graph.node(entry).unwrap().usage(), NodeUsage::Enabled);
        assert_eq!(graph.node(exit).unwrap().usage(), NodeUsage::Disabled);
    }

    proptest! {
        #[test]
        fn prop_link_counter_never_underflows(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            let (a, b) = (Guid::new(), Guid::new());
            let mut manager = DependencyManager::new();
            let mut expected: usize = 0;
            for add in ops {
                if add {
                    manager.add_link(a, b);
                    expected += 1;
                } else {
                    manager.remove_link(a, b);
                    expected = expected.saturating_sub(1);
                }
                let count = manager.dependency(a, b).and_then(|r| r.linked).map_or(0, |l| l.count);
                prop_assert_eq!(count, expected);
            }
        }
    }
}
