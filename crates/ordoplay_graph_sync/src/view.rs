// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model to view mapping and the view factory seam.

use indexmap::IndexMap;
use ordoplay_graph_model::{ElementKind, ElementRef, GraphModel, Guid};

/// A view object built for one model element
#[derive(Debug, Clone, PartialEq)]
pub struct MappedView<V> {
    /// Kind of the model element
    pub kind: ElementKind,
    /// The view object
    pub view: V,
    /// Model version the view was built from
    pub built_version: u64,
    /// Output and input node of an edge view
    pub endpoints: Option<[Guid; 2]>,
}

/// Views indexed by the guid of their model element
#[derive(Debug, Clone)]
pub struct ViewMapping<V> {
    views: IndexMap<Guid, MappedView<V>>,
}

impl<V> Default for ViewMapping<V> {
    fn default() -> Self {
        Self {
            views: IndexMap::new(),
        }
    }
}

impl<V> ViewMapping<V> {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping entry of an element
    pub fn get(&self, guid: Guid) -> Option<&MappedView<V>> {
        self.views.get(&guid)
    }

    /// View of an element
    pub fn view(&self, guid: Guid) -> Option<&V> {
        self.views.get(&guid).map(|mapped| &mapped.view)
    }

    /// Whether an element has a view
    pub fn contains(&self, guid: Guid) -> bool {
        self.views.contains_key(&guid)
    }

    /// Number of views
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether there are no views
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// All entries in creation order
    pub fn iter(&self) -> impl Iterator<Item = (Guid, &MappedView<V>)> {
        self.views.iter().map(|(guid, mapped)| (*guid, mapped))
    }

    /// Edge views attached to a node
    pub fn edges_of(&self, node: Guid) -> impl Iterator<Item = Guid> + '_ {
        self.views
            .iter()
            .filter(move |(_, mapped)| mapped.endpoints.is_some_and(|ends| ends.contains(&node)))
            .map(|(guid, _)| *guid)
    }

    pub(crate) fn insert(&mut self, guid: Guid, mapped: MappedView<V>) -> Option<MappedView<V>> {
        self.views.insert(guid, mapped)
    }

    pub(crate) fn remove(&mut self, guid: Guid) -> Option<MappedView<V>> {
        self.views.shift_remove(&guid)
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (Guid, MappedView<V>)> + '_ {
        self.views.drain(..)
    }
}

/// Creates and destroys the host's view objects
pub trait ViewFactory {
    /// View object type
    type View;

    /// Build a view for a live element
    ///
    /// Edge views are created after every node view of the same pass, so
    /// endpoint views can be looked up in `mapping`. Returning `None` leaves
    /// the element without a view.
    fn create_view(
        &mut self,
        graph: &GraphModel,
        element: ElementRef<'_>,
        mapping: &ViewMapping<Self::View>,
    ) -> Option<Self::View>;

    /// Dispose of a view that is no longer mapped
    fn delete_view(&mut self, view: Self::View);

    /// Whether a node view draws its edges itself, so that deleting the node
    /// view must delete its edge views too
    fn composes_edges(&self, _view: &Self::View) -> bool {
        false
    }
}
