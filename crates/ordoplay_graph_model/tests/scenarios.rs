// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-graph scenarios across creation, persistence and dependencies.

use ordoplay_graph_model::nodes::{EXEC_IN, EXEC_OUT, VALUE_OUT};
use ordoplay_graph_model::{
    DependencyManager, GraphElement, GraphModel, GraphSettings, Guid, NodeRegistry, NodeUsage, PortReference,
    PortType, PortalEnd,
};
use proptest::prelude::*;
use rstest::{fixture, rstest};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Scene {
    graph: GraphModel,
    start: Guid,
    log: Guid,
    speed: Guid,
    reader: Guid,
    mat: Guid,
}

#[fixture]
fn scene() -> Scene {
    init_tracing();
    let registry = NodeRegistry::standard();
    let mut graph = GraphModel::new("Level");
    let start = graph
        .create_node_from_type(&registry, "event_begin_play", [0.0, 0.0])
        .unwrap();
    let log = graph.create_node_from_type(&registry, "log", [240.0, 0.0]).unwrap();
    graph
        .connect(&PortReference::output(start, EXEC_OUT), &PortReference::input(log, EXEC_IN))
        .unwrap();

    let speed = graph.create_variable("greeting", PortType::String);
    let reader = graph.create_variable_node(speed, [0.0, 120.0]).unwrap();
    graph
        .connect(&PortReference::output(reader, VALUE_OUT), &PortReference::input(log, "message"))
        .unwrap();

    let mat = graph.create_placemat("Startup", [-20.0, -40.0], [500.0, 240.0]);
    graph.collapse_placemat(mat, true, vec![reader]);
    graph.take_changes();

    Scene {
        graph,
        start,
        log,
        speed,
        reader,
        mat,
    }
}

#[rstest]
fn test_file_roundtrip(scene: Scene) {
    let path = std::env::temp_dir().join(format!("ordoplay-graph-{}.ron", Guid::new()));
    scene.graph.save(&path).unwrap();
    let mut loaded = GraphModel::load(&path, GraphSettings::default()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.name, "Level");
    assert_eq!(loaded.node_count(), 3);
    assert_eq!(loaded.edge_count(), 2);
    assert_eq!(loaded.node(scene.log).unwrap().position(), [240.0, 0.0]);
    assert_eq!(loaded.hidden_elements(scene.mat), vec![scene.reader]);
    assert!(loaded.find_edge(
        &PortReference::output(scene.start, EXEC_OUT),
        &PortReference::input(scene.log, EXEC_IN)
    )
    .is_some());
    assert!(loaded.check_integrity().is_ok());

    // A freshly loaded graph reports everything as changed
    let changes = loaded.take_changes();
    assert!(changes.blackboard_changed());
    for guid in [scene.start, scene.log, scene.speed, scene.reader, scene.mat] {
        assert!(changes.is_changed(guid));
    }
}

#[rstest]
fn test_deleting_variable_takes_its_readers(mut scene: Scene) {
    scene.graph.delete_variable(scene.speed, true).unwrap();

    assert!(scene.graph.node(scene.reader).is_none());
    assert_eq!(scene.graph.edge_count(), 1);
    assert!(scene.graph.hidden_elements(scene.mat).is_empty());
    assert!(scene.graph.changes().blackboard_changed());
    assert!(scene.graph.check_integrity().is_ok());
}

#[rstest]
fn test_data_reader_is_unused_but_flow_is_enabled(mut scene: Scene) {
    let manager = DependencyManager::from_graph(&scene.graph);
    manager.update_node_usage(&mut scene.graph);

    assert_eq!(scene.graph.node(scene.log).unwrap().usage(), NodeUsage::Enabled);
    assert_eq!(scene.graph.node(scene.reader).unwrap().usage(), NodeUsage::Unused);
}

#[rstest]
fn test_portal_pair_survives_reload(mut scene: Scene) {
    let wire = scene.graph.declare_portal("wire", PortType::Exec);
    let entry = scene.graph.create_portal(wire, PortalEnd::Entry, [400.0, 0.0]).unwrap();
    let exit = scene.graph.create_opposite_portal(entry, [800.0, 0.0]).unwrap();

    let text = scene.graph.to_ron().unwrap();
    let mut loaded = GraphModel::from_ron(&text, GraphSettings::default()).unwrap();

    assert_eq!(loaded.portals(wire).count(), 2);
    assert!(loaded.has_entry_portal(wire));
    assert!(loaded.create_opposite_portal(exit, [0.0, 0.0]).is_none());
}

proptest! {
    #[test]
    fn connect_is_idempotent(pairs in prop::collection::vec((0..6usize, 0..6usize), 1..24)) {
        let registry = NodeRegistry::standard();
        let mut graph = GraphModel::default();
        let mut nodes = vec![graph.create_node_from_type(&registry, "event_tick", [0.0, 0.0]).unwrap()];
        for i in 0..5 {
            nodes.push(graph.create_node_from_type(&registry, "log", [i as f32 * 100.0, 0.0]).unwrap());
        }

        for (a, b) in pairs {
            let output = PortReference::output(nodes[a], EXEC_OUT);
            let input = PortReference::input(nodes[b], EXEC_IN);
            let first = graph.connect(&output, &input);
            let count = graph.edge_count();
            let second = graph.connect(&input, &output);
            prop_assert_eq!(first, second);
            prop_assert_eq!(graph.edge_count(), count);
        }

        let connected: Vec<Guid> = graph.edges().map(GraphElement::guid).collect();
        prop_assert_eq!(connected.len(), graph.edge_count());
        prop_assert!(graph.check_integrity().is_ok());
    }
}
