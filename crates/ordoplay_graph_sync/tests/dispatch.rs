// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end dispatch scenarios with an attached view.

use ordoplay_graph_model::nodes::{EXEC_IN, EXEC_OUT};
use ordoplay_graph_model::{ElementKind, ElementRef, GraphModel, Guid, ModelState, NodeUsage, PortReference, PortType};
use ordoplay_graph_sync::command::{
    ConnectCommand, CreateNodeCommand, CreateOppositePortalCommand, CreatePortalCommand, DeleteElementsCommand,
    DisconnectCommand, DuplicateNodesCommand, MoveGestureCommand, SetNodeStateCommand,
};
use ordoplay_graph_sync::{Dispatcher, GraphCommand, GraphSession, GraphView, MoveStep, ViewFactory, ViewMapping};
use rstest::{fixture, rstest};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// View carrying the kind and title of what it draws
#[derive(Debug, Clone, PartialEq)]
struct Label {
    kind: ElementKind,
    text: String,
}

#[derive(Default)]
struct LabelFactory {
    live: usize,
}

impl ViewFactory for LabelFactory {
    type View = Label;

    fn create_view(&mut self, _graph: &GraphModel, element: ElementRef<'_>, mapping: &ViewMapping<Label>) -> Option<Label> {
        let text = match element {
            ElementRef::Node(node) => node.title().to_string(),
            ElementRef::Edge(edge) => {
                let output = mapping.view(edge.output().node)?;
                let input = mapping.view(edge.input().node)?;
                format!("{} -> {}", output.text, input.text)
            }
            ElementRef::Variable(variable) => variable.name.clone(),
            ElementRef::Placemat(placemat) => placemat.title.clone(),
            ElementRef::StickyNote(note) => note.title.clone(),
        };
        self.live += 1;
        Some(Label {
            kind: element.kind(),
            text,
        })
    }

    fn delete_view(&mut self, _view: Label) {
        self.live -= 1;
    }
}

#[fixture]
fn dispatcher() -> Dispatcher<LabelFactory> {
    init_tracing();
    let mut dispatcher = Dispatcher::new(GraphSession::default());
    dispatcher.attach_view(GraphView::new(LabelFactory::default()));
    dispatcher
}

fn create(dispatcher: &mut Dispatcher<LabelFactory>, type_id: &str, position: [f32; 2]) -> Guid {
    dispatcher
        .dispatch(&CreateNodeCommand::new(type_id, position))
        .unwrap()
        .created[0]
}

fn flow(dispatcher: &mut Dispatcher<LabelFactory>, from: Guid, port: &str, to: Guid) -> Option<Guid> {
    let command = ConnectCommand::new(PortReference::output(from, port), PortReference::input(to, EXEC_IN));
    dispatcher.dispatch(&command).unwrap().created.first().copied()
}

fn position(dispatcher: &Dispatcher<LabelFactory>, node: Guid) -> [f32; 2] {
    dispatcher.graph().node(node).unwrap().position()
}

fn usage(dispatcher: &Dispatcher<LabelFactory>, node: Guid) -> NodeUsage {
    dispatcher.graph().node(node).unwrap().usage()
}

fn live_views(dispatcher: &Dispatcher<LabelFactory>) -> usize {
    dispatcher.view().unwrap().factory.live
}

#[rstest]
fn test_connect_twice_then_delete_source(mut dispatcher: Dispatcher<LabelFactory>) {
    let a = create(&mut dispatcher, "event_tick", [0.0, 0.0]);
    let b = create(&mut dispatcher, "log", [200.0, 0.0]);

    let first = flow(&mut dispatcher, a, EXEC_OUT, b).unwrap();
    let second = flow(&mut dispatcher, a, EXEC_OUT, b).unwrap();
    assert_eq!(first, second);
    assert_eq!(dispatcher.graph().edge_count(), 1);

    let view = dispatcher.view().unwrap();
    assert_eq!(view.view(first).unwrap().text, "Tick -> Log");
    assert_eq!(usage(&dispatcher, b), NodeUsage::Enabled);

    let result = dispatcher.dispatch(&DeleteElementsCommand::new(vec![a], true)).unwrap();
    assert!(result.changes.is_edge_deleted(first));
    let rebuild = result.rebuild.unwrap();
    assert!(rebuild.deleted.contains(&a));
    assert!(rebuild.deleted.contains(&first));

    let view = dispatcher.view().unwrap();
    assert!(view.view(a).is_none());
    assert!(view.view(first).is_none());
    assert!(view.view(b).is_some());
    assert_eq!(live_views(&dispatcher), 1);
    assert_eq!(usage(&dispatcher, b), NodeUsage::Unused);
}

#[rstest]
fn test_disconnect_keeps_nodes(mut dispatcher: Dispatcher<LabelFactory>) {
    let a = create(&mut dispatcher, "event_begin_play", [0.0, 0.0]);
    let b = create(&mut dispatcher, "log", [200.0, 0.0]);
    let edge = flow(&mut dispatcher, a, EXEC_OUT, b).unwrap();

    let result = dispatcher.dispatch(&DisconnectCommand::new(edge)).unwrap();
    assert!(result.applied);
    assert_eq!(dispatcher.graph().edge_count(), 0);
    assert_eq!(live_views(&dispatcher), 2);
    assert!(dispatcher.dispatch(&DisconnectCommand::new(edge)).is_err());
}

#[rstest]
fn test_second_entry_portal_is_refused(mut dispatcher: Dispatcher<LabelFactory>) {
    let created = dispatcher
        .dispatch(&CreatePortalCommand::new("wire", PortType::Exec, [0.0, 0.0]))
        .unwrap()
        .created;
    let (declaration, entry) = (created[0], created[1]);

    let exit = dispatcher
        .dispatch(&CreateOppositePortalCommand::new(entry, [400.0, 0.0]))
        .unwrap()
        .created[0];
    let refused = dispatcher
        .dispatch(&CreateOppositePortalCommand::new(exit, [0.0, 200.0]))
        .unwrap();

    assert!(!refused.applied);
    assert!(refused.created.is_empty());
    assert_eq!(dispatcher.graph().portals(declaration).count(), 2);
    assert_eq!(dispatcher.history().len(), 2);
}

#[rstest]
fn test_move_gesture_then_cancel(mut dispatcher: Dispatcher<LabelFactory>) {
    let a = create(&mut dispatcher, "event_tick", [0.0, 0.0]);
    let b = create(&mut dispatcher, "log", [200.0, 0.0]);
    let c = create(&mut dispatcher, "log", [400.0, 0.0]);
    flow(&mut dispatcher, a, EXEC_OUT, b);
    flow(&mut dispatcher, b, EXEC_OUT, c);

    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Begin(vec![a])))
        .unwrap();
    let dragged = dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Drag([10.0, 20.0])))
        .unwrap();
    assert_eq!(position(&dispatcher, a), [10.0, 20.0]);
    assert_eq!(position(&dispatcher, b), [210.0, 20.0]);
    assert_eq!(position(&dispatcher, c), [410.0, 20.0]);
    assert!(dragged.changes.is_changed(c));

    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Cancel))
        .unwrap();
    assert_eq!(position(&dispatcher, a), [0.0, 0.0]);
    assert_eq!(position(&dispatcher, b), [200.0, 0.0]);
    assert_eq!(position(&dispatcher, c), [400.0, 0.0]);
    assert!(!dispatcher.session().gesture.is_active());
}

#[rstest]
fn test_moving_child_leaves_parent(mut dispatcher: Dispatcher<LabelFactory>) {
    let a = create(&mut dispatcher, "event_tick", [0.0, 0.0]);
    let b = create(&mut dispatcher, "log", [200.0, 0.0]);
    flow(&mut dispatcher, a, EXEC_OUT, b);

    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Begin(vec![b])))
        .unwrap();
    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Drag([0.0, 50.0])))
        .unwrap();
    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Commit))
        .unwrap();

    assert_eq!(position(&dispatcher, a), [0.0, 0.0]);
    assert_eq!(position(&dispatcher, b), [200.0, 50.0]);
}

#[rstest]
fn test_disabling_spreads_downstream(mut dispatcher: Dispatcher<LabelFactory>) {
    let start = create(&mut dispatcher, "event_begin_play", [0.0, 0.0]);
    let first = create(&mut dispatcher, "log", [200.0, 0.0]);
    let second = create(&mut dispatcher, "log", [400.0, 0.0]);
    let stray = create(&mut dispatcher, "log", [0.0, 300.0]);
    flow(&mut dispatcher, start, EXEC_OUT, first);
    flow(&mut dispatcher, first, EXEC_OUT, second);

    assert_eq!(usage(&dispatcher, first), NodeUsage::Enabled);
    assert_eq!(usage(&dispatcher, second), NodeUsage::Enabled);
    assert_eq!(usage(&dispatcher, stray), NodeUsage::Unused);

    let result = dispatcher
        .dispatch(&SetNodeStateCommand::new(first, ModelState::Disabled))
        .unwrap();
    assert_eq!(usage(&dispatcher, first), NodeUsage::Disabled);
    assert_eq!(usage(&dispatcher, second), NodeUsage::Disabled);
    assert!(result.changes.is_changed(second));

    dispatcher
        .dispatch(&SetNodeStateCommand::new(first, ModelState::Enabled))
        .unwrap();
    assert_eq!(usage(&dispatcher, second), NodeUsage::Enabled);
}

#[rstest]
fn test_diamond_moves_join_once(mut dispatcher: Dispatcher<LabelFactory>) {
    let start = create(&mut dispatcher, "event_tick", [0.0, 0.0]);
    let split = create(&mut dispatcher, "sequence", [100.0, 0.0]);
    let left = create(&mut dispatcher, "log", [200.0, -50.0]);
    let right = create(&mut dispatcher, "log", [200.0, 50.0]);
    let join = create(&mut dispatcher, "log", [300.0, 0.0]);
    flow(&mut dispatcher, start, EXEC_OUT, split);
    flow(&mut dispatcher, split, "then_0", left);
    flow(&mut dispatcher, split, "then_1", right);
    flow(&mut dispatcher, left, EXEC_OUT, join);
    flow(&mut dispatcher, right, EXEC_OUT, join);

    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Begin(vec![split])))
        .unwrap();
    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Drag([5.0, 5.0])))
        .unwrap();
    dispatcher
        .dispatch(&MoveGestureCommand::new(MoveStep::Commit))
        .unwrap();

    assert_eq!(position(&dispatcher, start), [0.0, 0.0]);
    assert_eq!(position(&dispatcher, join), [305.0, 5.0]);
    assert_eq!(usage(&dispatcher, join), NodeUsage::Enabled);
}

#[rstest]
fn test_duplicate_records_map(mut dispatcher: Dispatcher<LabelFactory>) {
    let a = create(&mut dispatcher, "event_tick", [0.0, 0.0]);
    let b = create(&mut dispatcher, "log", [200.0, 0.0]);
    flow(&mut dispatcher, a, EXEC_OUT, b);

    let result = dispatcher
        .dispatch(&DuplicateNodesCommand::new(vec![a, b], [0.0, 100.0]))
        .unwrap();
    assert_eq!(result.created.len(), 2);
    let duplicates = &dispatcher.session().duplicates;
    let (a2, b2) = (duplicates[&a], duplicates[&b]);
    assert_eq!(position(&dispatcher, b2), [200.0, 100.0]);
    assert_eq!(dispatcher.graph().edge_count(), 2);
    assert_eq!(usage(&dispatcher, b2), NodeUsage::Enabled);
    assert!(dispatcher
        .graph()
        .edges_for_node(a2)
        .any(|edge| edge.input().node == b2));
}

#[rstest]
fn test_failed_command_changes_arrive_next_cycle(mut dispatcher: Dispatcher<LabelFactory>) {
    let result = dispatcher.dispatch(&CreateNodeCommand::new("nope", [0.0, 0.0]));
    assert!(result.is_err());
    assert!(dispatcher.history().is_empty());

    let a = create(&mut dispatcher, "log", [0.0, 0.0]);
    assert!(dispatcher.view().unwrap().view(a).is_some());
}

/// A command that reads the session without changing it
struct Inspect;

impl GraphCommand for Inspect {
    fn description(&self) -> &str {
        "Inspect"
    }

    fn apply(
        &self,
        session: &mut GraphSession,
    ) -> Result<ordoplay_graph_sync::CommandOutcome, ordoplay_graph_sync::CommandError> {
        let _ = session.graph.node_count();
        Ok(ordoplay_graph_sync::CommandOutcome::refused())
    }
}

#[rstest]
fn test_idle_cycle_rebuilds_nothing(mut dispatcher: Dispatcher<LabelFactory>) {
    create(&mut dispatcher, "event_tick", [0.0, 0.0]);
    let result = dispatcher.dispatch(&Inspect).unwrap();
    assert!(result.changes.is_empty());
    assert!(result.rebuild.unwrap().is_empty());
}
