// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command dispatch cycle.
//!
//! One dispatch applies a command, re-syncs dependencies, recomputes node
//! usage, takes the graph's change list and, when a view is attached, hands
//! it to the [`PartialRebuilder`].

use crate::command::{CommandError, GraphCommand};
use crate::rebuild::{PartialRebuilder, RebuildReport};
use crate::session::GraphSession;
use crate::view::{ViewFactory, ViewMapping};
use ordoplay_graph_model::{ChangeList, GraphModel, Guid};

/// A view factory and the views it built
pub struct GraphView<F: ViewFactory> {
    /// Views by model guid
    pub mapping: ViewMapping<F::View>,
    /// Factory building the views
    pub factory: F,
    rebuilder: PartialRebuilder,
}

impl<F: ViewFactory> GraphView<F> {
    /// Create an empty view
    pub fn new(factory: F) -> Self {
        Self {
            mapping: ViewMapping::new(),
            factory,
            rebuilder: PartialRebuilder::new(),
        }
    }

    /// Build views for the whole graph, dropping any existing ones
    pub fn build(&mut self, graph: &GraphModel) -> RebuildReport {
        self.rebuilder.full_rebuild(graph, &mut self.mapping, &mut self.factory)
    }

    /// Apply one change list
    pub fn sync(&mut self, graph: &GraphModel, changes: &ChangeList) -> RebuildReport {
        self.rebuilder
            .rebuild(graph, changes, &mut self.mapping, &mut self.factory)
    }

    /// View of an element
    pub fn view(&self, guid: Guid) -> Option<&F::View> {
        self.mapping.view(guid)
    }
}

/// Result of one dispatch cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    /// Whether the graph accepted the gesture
    pub applied: bool,
    /// Elements the command created
    pub created: Vec<Guid>,
    /// Everything the cycle changed, usage updates included
    pub changes: ChangeList,
    /// View updates, when a view is attached
    pub rebuild: Option<RebuildReport>,
}

/// Applies commands to a session and keeps an attached view in sync
pub struct Dispatcher<F: ViewFactory> {
    session: GraphSession,
    view: Option<GraphView<F>>,
    history: Vec<String>,
}

impl<F: ViewFactory> Dispatcher<F> {
    /// Create a dispatcher without a view
    pub fn new(mut session: GraphSession) -> Self {
        session.dependencies.sync(&session.graph);
        session.dependencies.update_node_usage(&mut session.graph);
        Self {
            session,
            view: None,
            history: Vec::new(),
        }
    }

    /// The session
    pub fn session(&self) -> &GraphSession {
        &self.session
    }

    /// The graph
    pub fn graph(&self) -> &GraphModel {
        &self.session.graph
    }

    /// The attached view
    pub fn view(&self) -> Option<&GraphView<F>> {
        self.view.as_ref()
    }

    /// Descriptions of the applied commands, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Attach a view and build it from the whole graph
    ///
    /// Changes recorded before attaching are folded into the full build.
    pub fn attach_view(&mut self, mut view: GraphView<F>) -> RebuildReport {
        self.session.graph.take_changes();
        let report = view.build(&self.session.graph);
        self.view = Some(view);
        report
    }

    /// Detach the view, handing it back
    pub fn detach_view(&mut self) -> Option<GraphView<F>> {
        self.view.take()
    }

    /// Run one dispatch cycle
    ///
    /// On error the graph keeps whatever the command changed before
    /// failing. Those changes stay recorded and are delivered by the next
    /// successful cycle.
    pub fn dispatch(&mut self, command: &dyn GraphCommand) -> Result<Dispatched, CommandError> {
        let outcome = match command.apply(&mut self.session) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Command '{}' failed: {}", command.description(), e);
                return Err(e);
            }
        };

        let session = &mut self.session;
        session.dependencies.sync(&session.graph);
        let usage_changes = session.dependencies.update_node_usage(&mut session.graph);
        let changes = session.graph.take_changes();
        let rebuild = self
            .view
            .as_mut()
            .map(|view| view.sync(&self.session.graph, &changes));

        if outcome.applied {
            self.history.push(command.description().to_string());
        }
        tracing::debug!(
            "Dispatched '{}': applied={}, {} created, {} usage change(s)",
            command.description(),
            outcome.applied,
            outcome.created.len(),
            usage_changes
        );

        Ok(Dispatched {
            applied: outcome.applied,
            created: outcome.created,
            changes,
            rebuild,
        })
    }

    /// Hand back the session
    pub fn into_session(self) -> GraphSession {
        self.session
    }
}
