// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change lists produced by one dispatch cycle.

use crate::element::{ElementKind, Guid};
use indexmap::{IndexMap, IndexSet};

/// Elements a dispatch cycle marked dirty
///
/// Removed nodes, declarations and annotations are recorded as tombstones
/// for consumers that want them, but the view layer does not rely on them:
/// it finds removed elements because they are no longer live in the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeList {
    changed: IndexMap<Guid, ElementKind>,
    removed: IndexMap<Guid, ElementKind>,
    deleted_edges: IndexSet<Guid>,
    blackboard_changed: bool,
}

impl ChangeList {
    /// Create an empty change list
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an element as changed
    pub fn mark_changed(&mut self, guid: Guid, kind: ElementKind) {
        self.changed.insert(guid, kind);
    }

    /// Record the removal of a non-edge element
    pub fn mark_removed(&mut self, guid: Guid, kind: ElementKind) {
        self.changed.shift_remove(&guid);
        self.removed.insert(guid, kind);
    }

    /// Mark an edge as pending deletion
    pub fn mark_edge_deleted(&mut self, guid: Guid) {
        self.deleted_edges.insert(guid);
    }

    /// Flag the graph-level variable list as changed
    pub fn mark_blackboard_changed(&mut self) {
        self.blackboard_changed = true;
    }

    /// Changed elements in the order they were first marked
    pub fn changed(&self) -> impl Iterator<Item = (Guid, ElementKind)> + '_ {
        self.changed.iter().map(|(guid, kind)| (*guid, *kind))
    }

    /// Whether an element was marked changed
    pub fn is_changed(&self, guid: Guid) -> bool {
        self.changed.contains_key(&guid)
    }

    /// Elements removed this cycle, edges excluded
    pub fn removed(&self) -> impl Iterator<Item = (Guid, ElementKind)> + '_ {
        self.removed.iter().map(|(guid, kind)| (*guid, *kind))
    }

    /// Edges pending deletion
    pub fn deleted_edges(&self) -> impl Iterator<Item = Guid> + '_ {
        self.deleted_edges.iter().copied()
    }

    /// Whether an edge is pending deletion
    pub fn is_edge_deleted(&self, guid: Guid) -> bool {
        self.deleted_edges.contains(&guid)
    }

    /// Whether the graph-level variable list changed
    pub fn blackboard_changed(&self) -> bool {
        self.blackboard_changed
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
            && self.removed.is_empty()
            && self.deleted_edges.is_empty()
            && !self.blackboard_changed
    }

    /// Fold another change list into this one
    pub fn merge(&mut self, other: ChangeList) {
        for guid in other.removed.keys() {
            self.changed.shift_remove(guid);
        }
        self.changed.extend(other.changed);
        self.removed.extend(other.removed);
        self.deleted_edges.extend(other.deleted_edges);
        self.blackboard_changed |= other.blackboard_changed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_deduplicated() {
        let guid = Guid::new();
        let mut changes = ChangeList::new();
        assert!(changes.is_empty());
        changes.mark_changed(guid, ElementKind::Node);
        changes.mark_changed(guid, ElementKind::Node);
        assert_eq!(changes.changed().count(), 1);
        assert!(changes.is_changed(guid));
    }

    #[test]
    fn test_merge() {
        let mut a = ChangeList::new();
        a.mark_changed(Guid::new(), ElementKind::Node);
        let mut b = ChangeList::new();
        let edge = Guid::new();
        b.mark_edge_deleted(edge);
        b.mark_blackboard_changed();
        a.merge(b);
        assert!(a.is_edge_deleted(edge));
        assert!(a.blackboard_changed());
        assert_eq!(a.changed().count(), 1);
    }

    #[test]
    fn test_removal_clears_change_mark() {
        let guid = Guid::new();
        let mut changes = ChangeList::new();
        changes.mark_changed(guid, ElementKind::Placemat);
        changes.mark_removed(guid, ElementKind::Placemat);
        assert!(!changes.is_changed(guid));
        assert_eq!(changes.removed().count(), 1);
        assert!(!changes.is_empty());
    }
}
