// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests for incremental view rebuilds.

use ordoplay_graph_model::nodes::{EventNode, FlowNode, FlowOp, EXEC_IN, EXEC_OUT};
use ordoplay_graph_model::{ElementRef, GraphElement, GraphModel, Guid, NodeKind, PortReference};
use ordoplay_graph_sync::{PartialRebuilder, ViewFactory, ViewMapping};
use proptest::prelude::*;

#[derive(Default)]
struct Counting {
    live: usize,
}

impl ViewFactory for Counting {
    type View = Guid;

    fn create_view(&mut self, _graph: &GraphModel, element: ElementRef<'_>, _mapping: &ViewMapping<Guid>) -> Option<Guid> {
        self.live += 1;
        Some(element.guid())
    }

    fn delete_view(&mut self, _view: Guid) {
        self.live -= 1;
    }
}

#[derive(Debug, Clone)]
enum Edit {
    AddLog,
    Connect(usize, usize),
    Delete(usize),
    Rename(usize),
    Move(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        Just(Edit::AddLog),
        (0..8usize, 0..8usize).prop_map(|(a, b)| Edit::Connect(a, b)),
        (0..8usize).prop_map(Edit::Delete),
        (0..8usize).prop_map(Edit::Rename),
        (0..8usize).prop_map(Edit::Move),
    ]
}

fn pick(graph: &GraphModel, index: usize) -> Option<Guid> {
    let count = graph.node_count();
    (count > 0).then(|| graph.node_ids().nth(index % count)).flatten()
}

fn apply(graph: &mut GraphModel, edit: &Edit) {
    match *edit {
        Edit::AddLog => {
            graph.create_node(NodeKind::Flow(FlowNode { op: FlowOp::Log }), "Log", [0.0, 0.0]);
        }
        Edit::Connect(a, b) => {
            if let (Some(a), Some(b)) = (pick(graph, a), pick(graph, b)) {
                graph.connect(&PortReference::output(a, EXEC_OUT), &PortReference::input(b, EXEC_IN));
            }
        }
        Edit::Delete(a) => {
            if let Some(a) = pick(graph, a) {
                graph.delete_node(a, true);
            }
        }
        Edit::Rename(a) => {
            if let Some(a) = pick(graph, a) {
                graph.rename_node(a, "Renamed");
            }
        }
        Edit::Move(a) => {
            if let Some(a) = pick(graph, a) {
                graph.move_node(a, [1.0, 1.0]);
            }
        }
    }
}

proptest! {
    #[test]
    fn rebuild_is_idempotent_and_complete(edits in prop::collection::vec(edit(), 1..40)) {
        let mut graph = GraphModel::default();
        graph.create_node(NodeKind::Event(EventNode { event: "tick".into() }), "Tick", [0.0, 0.0]);

        let rebuilder = PartialRebuilder::new();
        let mut mapping = ViewMapping::new();
        let mut factory = Counting::default();

        for edit in &edits {
            apply(&mut graph, edit);
            let changes = graph.take_changes();
            rebuilder.rebuild(&graph, &changes, &mut mapping, &mut factory);

            let again = rebuilder.rebuild(&graph, &changes, &mut mapping, &mut factory);
            prop_assert!(again.created.is_empty());
            prop_assert!(again.deleted.is_empty());

            for node in graph.nodes() {
                prop_assert!(mapping.contains(node.guid()));
            }
            for edge in graph.edges() {
                prop_assert!(mapping.contains(edge.guid()));
            }
            prop_assert_eq!(mapping.len(), graph.node_count() + graph.edge_count());
            prop_assert_eq!(factory.live, mapping.len());
        }
    }

    #[test]
    fn partial_rebuild_matches_full_rebuild(edits in prop::collection::vec(edit(), 1..30)) {
        let mut graph = GraphModel::default();
        graph.create_node(NodeKind::Event(EventNode { event: "tick".into() }), "Tick", [0.0, 0.0]);

        let rebuilder = PartialRebuilder::new();
        let mut mapping = ViewMapping::new();
        let mut factory = Counting::default();
        for edit in &edits {
            apply(&mut graph, edit);
            let changes = graph.take_changes();
            rebuilder.rebuild(&graph, &changes, &mut mapping, &mut factory);
        }

        let mut fresh = ViewMapping::new();
        rebuilder.full_rebuild(&graph, &mut fresh, &mut Counting::default());
        let mut incremental: Vec<Guid> = mapping.iter().map(|(guid, _)| guid).collect();
        let mut full: Vec<Guid> = fresh.iter().map(|(guid, _)| guid).collect();
        incremental.sort();
        full.sort();
        prop_assert_eq!(incremental, full);
    }
}
