// SPDX-License-Identifier: MIT OR Apache-2.0
//! Placemats and sticky notes.

use crate::element::{Capabilities, Capability, ElementInfo, ElementKind, GraphElement, Guid};
use crate::graph::GraphModel;
use serde::{Deserialize, Serialize};

/// Colored rectangle grouping the elements drawn on top of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacematModel {
    pub(crate) info: ElementInfo,
    /// Title
    pub title: String,
    /// Top-left corner
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Stacking order, higher is drawn on top
    pub z_order: i32,
    /// Whether the placemat is collapsed
    pub collapsed: bool,
    /// Elements hidden while collapsed. These are weak: removed elements are
    /// skipped when the list is read.
    #[serde(default)]
    pub(crate) hidden_elements: Vec<Guid>,
    /// Set once the placemat has been removed from its graph
    #[serde(skip)]
    pub destroyed: bool,
}

impl PlacematModel {
    /// Create a placemat
    pub fn new(title: impl Into<String>, position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            info: ElementInfo::new(Capabilities::for_annotation()),
            title: title.into(),
            position,
            size,
            z_order: 0,
            collapsed: false,
            hidden_elements: Vec::new(),
            destroyed: false,
        }
    }

    /// Whether a point lies on the placemat
    pub fn contains_point(&self, point: [f32; 2]) -> bool {
        point[0] >= self.position[0]
            && point[1] >= self.position[1]
            && point[0] <= self.position[0] + self.size[0]
            && point[1] <= self.position[1] + self.size[1]
    }

    /// Stored hidden element guids, including removed ones
    pub fn hidden_element_ids(&self) -> &[Guid] {
        &self.hidden_elements
    }
}

impl GraphElement for PlacematModel {
    const KIND: ElementKind = ElementKind::Placemat;

    fn info(&self) -> &ElementInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ElementInfo {
        &mut self.info
    }
}

/// Free-floating text note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyNoteModel {
    pub(crate) info: ElementInfo,
    /// Title
    pub title: String,
    /// Body text
    pub contents: String,
    /// Top-left corner
    pub position: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
    /// Set once the note has been removed from its graph
    #[serde(skip)]
    pub destroyed: bool,
}

impl StickyNoteModel {
    /// Create a sticky note
    pub fn new(title: impl Into<String>, contents: impl Into<String>, position: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            info: ElementInfo::new(Capabilities::for_annotation()),
            title: title.into(),
            contents: contents.into(),
            position,
            size,
            destroyed: false,
        }
    }
}

impl GraphElement for StickyNoteModel {
    const KIND: ElementKind = ElementKind::StickyNote;

    fn info(&self) -> &ElementInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ElementInfo {
        &mut self.info
    }
}

fn valid_size(size: [f32; 2]) -> bool {
    size[0] > 0.0 && size[1] > 0.0 && size.iter().all(|v| v.is_finite())
}

impl GraphModel {
    /// Create a placemat on top of all others
    pub fn create_placemat(&mut self, title: impl Into<String>, position: [f32; 2], size: [f32; 2]) -> Guid {
        let mut placemat = PlacematModel::new(title, position, size);
        placemat.z_order = self.top_z_order().map_or(0, |z| z + 1);
        let guid = placemat.info.ensure_guid();
        self.placemats.insert(guid, placemat);
        self.touch(guid);
        guid
    }

    fn top_z_order(&self) -> Option<i32> {
        self.placemats.values().map(|p| p.z_order).max()
    }

    fn bottom_z_order(&self) -> Option<i32> {
        self.placemats.values().map(|p| p.z_order).min()
    }

    fn placemat_with(&mut self, guid: Guid, capability: Capability) -> Option<&mut PlacematModel> {
        self.placemats
            .get_mut(&guid)
            .filter(|placemat| placemat.has_capability(capability))
    }

    /// Move and resize a resizable placemat. Sizes must be positive.
    pub fn resize_placemat(&mut self, guid: Guid, position: [f32; 2], size: [f32; 2]) -> bool {
        if !valid_size(size) {
            return false;
        }
        let Some(placemat) = self.placemat_with(guid, Capability::Resizable) else {
            return false;
        };
        placemat.position = position;
        placemat.size = size;
        self.touch(guid);
        true
    }

    /// Move a movable placemat by a delta
    pub fn move_placemat(&mut self, guid: Guid, delta: [f32; 2]) -> bool {
        let Some(placemat) = self.placemat_with(guid, Capability::Movable) else {
            return false;
        };
        placemat.position = [placemat.position[0] + delta[0], placemat.position[1] + delta[1]];
        self.touch(guid);
        true
    }

    /// Rename a renamable placemat
    pub fn rename_placemat(&mut self, guid: Guid, title: impl Into<String>) -> bool {
        let Some(placemat) = self.placemat_with(guid, Capability::Renamable) else {
            return false;
        };
        placemat.title = title.into();
        self.touch(guid);
        true
    }

    /// Draw a placemat above all others
    pub fn bring_placemat_to_front(&mut self, guid: Guid) -> bool {
        let Some(top) = self.top_z_order() else {
            return false;
        };
        let Some(placemat) = self.placemats.get(&guid) else {
            return false;
        };
        if placemat.z_order < top || self.placemats.values().filter(|p| p.z_order == top).count() > 1 {
            if let Some(placemat) = self.placemats.get_mut(&guid) {
                placemat.z_order = top + 1;
            }
            self.touch(guid);
        }
        true
    }

    /// Draw a placemat below all others
    pub fn send_placemat_to_back(&mut self, guid: Guid) -> bool {
        let Some(bottom) = self.bottom_z_order() else {
            return false;
        };
        let Some(placemat) = self.placemats.get(&guid) else {
            return false;
        };
        if placemat.z_order > bottom || self.placemats.values().filter(|p| p.z_order == bottom).count() > 1 {
            if let Some(placemat) = self.placemats.get_mut(&guid) {
                placemat.z_order = bottom - 1;
            }
            self.touch(guid);
        }
        true
    }

    /// Placemats ordered from bottom to top
    pub fn placemats_by_z_order(&self) -> Vec<&PlacematModel> {
        let mut placemats: Vec<&PlacematModel> = self.placemats.values().collect();
        placemats.sort_by_key(|p| p.z_order);
        placemats
    }

    /// Collapse a collapsible placemat, hiding the given elements, or expand it
    ///
    /// Expanding clears the hidden list.
    pub fn collapse_placemat(&mut self, guid: Guid, collapsed: bool, hidden: Vec<Guid>) -> bool {
        let Some(placemat) = self.placemat_with(guid, Capability::Collapsible) else {
            return false;
        };
        placemat.collapsed = collapsed;
        placemat.hidden_elements = if collapsed { hidden } else { Vec::new() };
        self.touch(guid);
        true
    }

    /// Live elements hidden by a collapsed placemat
    pub fn hidden_elements(&self, guid: Guid) -> Vec<Guid> {
        self.placemats.get(&guid).map_or_else(Vec::new, |placemat| {
            placemat
                .hidden_elements
                .iter()
                .copied()
                .filter(|hidden| self.contains(*hidden))
                .collect()
        })
    }

    /// Delete a deletable placemat
    pub fn delete_placemat(&mut self, guid: Guid) -> Option<PlacematModel> {
        self.placemat_with(guid, Capability::Deletable)?;
        let mut placemat = self.placemats.shift_remove(&guid)?;
        placemat.destroyed = true;
        self.changes.mark_removed(guid, ElementKind::Placemat);
        self.forget_hidden(guid);
        Some(placemat)
    }

    /// Drop a removed element from every placemat hiding it
    pub(crate) fn forget_hidden(&mut self, removed: Guid) {
        let holders: Vec<Guid> = self
            .placemats
            .iter_mut()
            .filter_map(|(guid, placemat)| {
                let before = placemat.hidden_elements.len();
                placemat.hidden_elements.retain(|hidden| *hidden != removed);
                (placemat.hidden_elements.len() != before).then_some(*guid)
            })
            .collect();
        for guid in holders {
            self.touch(guid);
        }
    }

    /// Create a sticky note
    pub fn create_sticky_note(
        &mut self,
        title: impl Into<String>,
        contents: impl Into<String>,
        position: [f32; 2],
        size: [f32; 2],
    ) -> Guid {
        let mut note = StickyNoteModel::new(title, contents, position, size);
        let guid = note.info.ensure_guid();
        self.sticky_notes.insert(guid, note);
        self.touch(guid);
        guid
    }

    fn sticky_note_with(&mut self, guid: Guid, capability: Capability) -> Option<&mut StickyNoteModel> {
        self.sticky_notes
            .get_mut(&guid)
            .filter(|note| note.has_capability(capability))
    }

    /// Edit the text of a renamable sticky note
    pub fn update_sticky_note(&mut self, guid: Guid, title: impl Into<String>, contents: impl Into<String>) -> bool {
        let Some(note) = self.sticky_note_with(guid, Capability::Renamable) else {
            return false;
        };
        note.title = title.into();
        note.contents = contents.into();
        self.touch(guid);
        true
    }

    /// Move and resize a resizable sticky note
    pub fn resize_sticky_note(&mut self, guid: Guid, position: [f32; 2], size: [f32; 2]) -> bool {
        if !valid_size(size) {
            return false;
        }
        let Some(note) = self.sticky_note_with(guid, Capability::Resizable) else {
            return false;
        };
        note.position = position;
        note.size = size;
        self.touch(guid);
        true
    }

    /// Delete a deletable sticky note
    pub fn delete_sticky_note(&mut self, guid: Guid) -> Option<StickyNoteModel> {
        self.sticky_note_with(guid, Capability::Deletable)?;
        let mut note = self.sticky_notes.shift_remove(&guid)?;
        note.destroyed = true;
        self.changes.mark_removed(guid, ElementKind::StickyNote);
        self.forget_hidden(guid);
        Some(note)
    }
}
