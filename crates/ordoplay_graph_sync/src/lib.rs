// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command dispatch and view synchronization for `OrdoPlay` Editor graphs.
//!
//! The host wraps a [`GraphModel`](ordoplay_graph_model::GraphModel) in a
//! [`GraphSession`] and applies [`GraphCommand`]s through a [`Dispatcher`].
//! Each dispatch yields the cycle's change list, which the
//! [`PartialRebuilder`] turns into the smallest set of view deletions and
//! creations for an attached [`GraphView`].

pub mod command;
pub mod dispatcher;
pub mod rebuild;
pub mod session;
pub mod view;

pub use command::{CommandError, CommandOutcome, GraphCommand, MoveStep};
pub use dispatcher::{Dispatched, Dispatcher, GraphView};
pub use rebuild::{PartialRebuilder, RebuildReport};
pub use session::GraphSession;
pub use view::{MappedView, ViewFactory, ViewMapping};
