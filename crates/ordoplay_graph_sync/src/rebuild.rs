// SPDX-License-Identifier: MIT OR Apache-2.0
//! Incremental view synchronization.
//!
//! A rebuild pass turns one [`ChangeList`] into view deletions and
//! creations:
//!
//! 1. Changed elements are sorted into node, edge and other rebuild sets.
//!    Edges pending deletion are skipped.
//! 2. Every mapped view whose model is destroyed or pending deletion is
//!    scheduled for deletion. Deleting a node view that draws its own edges
//!    also schedules those edge views.
//! 3. Edges of every node in the rebuild set join the edge rebuild set.
//! 4. Anything scheduled for deletion leaves the rebuild sets, as does any
//!    view already built from the current model version.
//! 5. Deletions run first, then node and other views are created, then
//!    edge views, so an edge view always finds its endpoint views mapped.
//!
//! A view is stamped with the version of the model it was built from. An
//! edge's version is the newest of the edge and its two nodes, so an edge
//! view follows its endpoints. Running the same pass twice is a no-op.

use crate::view::{MappedView, ViewFactory, ViewMapping};
use indexmap::IndexSet;
use ordoplay_graph_model::{ChangeList, ElementKind, ElementRef, GraphElement, GraphModel, Guid};

/// What a rebuild pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Elements whose views were deleted, including views that were rebuilt
    pub deleted: Vec<Guid>,
    /// Elements whose views were created
    pub created: Vec<Guid>,
    /// Whether the graph-level variable list needs a refresh
    pub blackboard_changed: bool,
}

impl RebuildReport {
    /// Whether the pass touched no view
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.created.is_empty() && !self.blackboard_changed
    }
}

/// Applies change lists to a view mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRebuilder;

impl PartialRebuilder {
    /// Create a rebuilder
    pub fn new() -> Self {
        Self
    }

    /// Bring the views of every changed element up to date
    pub fn rebuild<F: ViewFactory>(
        &self,
        graph: &GraphModel,
        changes: &ChangeList,
        mapping: &mut ViewMapping<F::View>,
        factory: &mut F,
    ) -> RebuildReport {
        let mut report = RebuildReport {
            blackboard_changed: changes.blackboard_changed(),
            ..RebuildReport::default()
        };

        let mut nodes = IndexSet::new();
        let mut edges = IndexSet::new();
        let mut others = IndexSet::new();
        for (guid, kind) in changes.changed() {
            match kind {
                ElementKind::Node => {
                    nodes.insert(guid);
                }
                ElementKind::Edge => {
                    if !changes.is_edge_deleted(guid) {
                        edges.insert(guid);
                    }
                }
                ElementKind::Variable => {
                    // Portal declarations have no view of their own
                    if graph.declaration(guid).is_some_and(|decl| decl.is_graph_scoped()) {
                        report.blackboard_changed = true;
                        others.insert(guid);
                    }
                }
                ElementKind::Placemat | ElementKind::StickyNote => {
                    others.insert(guid);
                }
            }
        }

        let mut doomed = IndexSet::new();
        for (guid, mapped) in mapping.iter() {
            if !graph.is_destroyed(guid) && !changes.is_edge_deleted(guid) {
                continue;
            }
            doomed.insert(guid);
            if mapped.kind == ElementKind::Node && factory.composes_edges(&mapped.view) {
                doomed.extend(mapping.edges_of(guid));
            }
        }

        for node in &nodes {
            edges.extend(graph.edges_for_node(*node).map(GraphElement::guid));
        }

        for set in [&mut nodes, &mut edges, &mut others] {
            set.retain(|guid| !doomed.contains(guid) && is_stale(graph, mapping, *guid));
        }

        for guid in doomed.iter().chain(&nodes).chain(&others).chain(&edges) {
            if let Some(mapped) = mapping.remove(*guid) {
                factory.delete_view(mapped.view);
                report.deleted.push(*guid);
            }
        }

        for guid in nodes.iter().chain(&others).chain(&edges) {
            if build_view(graph, *guid, mapping, factory) {
                report.created.push(*guid);
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                "Rebuilt views for graph '{}': {} deleted, {} created",
                graph.name,
                report.deleted.len(),
                report.created.len()
            );
        }
        report
    }

    /// Drop every view and build the whole graph again
    pub fn full_rebuild<F: ViewFactory>(
        &self,
        graph: &GraphModel,
        mapping: &mut ViewMapping<F::View>,
        factory: &mut F,
    ) -> RebuildReport {
        let mut report = RebuildReport {
            blackboard_changed: true,
            ..RebuildReport::default()
        };
        for (guid, mapped) in mapping.drain().collect::<Vec<_>>() {
            factory.delete_view(mapped.view);
            report.deleted.push(guid);
        }

        let nodes = graph.node_ids();
        let variables = graph
            .declarations()
            .filter(|decl| decl.is_graph_scoped())
            .map(GraphElement::guid);
        let placemats = graph.placemats().map(GraphElement::guid);
        let notes = graph.sticky_notes().map(GraphElement::guid);
        let edges = graph.edges().map(GraphElement::guid);
        let order: Vec<Guid> = nodes.chain(variables).chain(placemats).chain(notes).chain(edges).collect();
        for guid in order {
            if build_view(graph, guid, mapping, factory) {
                report.created.push(guid);
            }
        }

        tracing::debug!(
            "Full rebuild of graph '{}': {} view(s)",
            graph.name,
            report.created.len()
        );
        report
    }
}

/// Version a view of this element must be built from
fn effective_version(graph: &GraphModel, element: ElementRef<'_>) -> u64 {
    let own = element.info().version();
    match element {
        ElementRef::Edge(edge) => [edge.output().node, edge.input().node]
            .into_iter()
            .filter_map(|node| graph.element_version(node))
            .fold(own, u64::max),
        _ => own,
    }
}

fn is_stale<V>(graph: &GraphModel, mapping: &ViewMapping<V>, guid: Guid) -> bool {
    let Some(element) = graph.element(guid) else {
        return false;
    };
    mapping
        .get(guid)
        .map_or(true, |mapped| mapped.built_version < effective_version(graph, element))
}

fn build_view<F: ViewFactory>(
    graph: &GraphModel,
    guid: Guid,
    mapping: &mut ViewMapping<F::View>,
    factory: &mut F,
) -> bool {
    let Some(element) = graph.element(guid) else {
        return false;
    };
    let Some(view) = factory.create_view(graph, element, mapping) else {
        tracing::trace!("No view built for {:?} {}", element.kind(), guid);
        return false;
    };
    let endpoints = match element {
        ElementRef::Edge(edge) => Some([edge.output().node, edge.input().node]),
        _ => None,
    };
    mapping.insert(
        guid,
        MappedView {
            kind: element.kind(),
            view,
            built_version: effective_version(graph, element),
            endpoints,
        },
    );
    true
}
