// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identity and capabilities shared by every graph element.

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// High half of the uuid used for guids derived from legacy numeric ids
const LEGACY_ID_NAMESPACE: u64 = 0x6f72_646f_706c_6179;

/// Globally unique, stable identifier of a graph element
///
/// The nil guid means "not assigned yet". Elements receive a real guid the
/// first time they are registered with a graph and keep it for their whole
/// lifetime, across redefinition and reload.
///
/// Guids deserialize from a uuid string or, for files written before guids
/// existed, from a bare integer mapped through [`Guid::from_legacy_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Guid(pub Uuid);

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Uuid(Uuid),
            Legacy(u64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Uuid(uuid) => Self(uuid),
            Repr::Legacy(id) => Self::from_legacy_id(id),
        })
    }
}

impl Guid {
    /// The unassigned guid
    pub const NIL: Guid = Guid(Uuid::nil());

    /// Create a new random guid
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic guid for an element saved with a legacy numeric id
    pub fn from_legacy_id(id: u64) -> Self {
        Self(Uuid::from_u64_pair(LEGACY_ID_NAMESPACE, id))
    }

    /// Whether this guid has been assigned
    pub fn is_assigned(&self) -> bool {
        !self.0.is_nil()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The kinds of element a graph holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A node
    Node,
    /// An edge between two ports
    Edge,
    /// A variable or portal declaration
    Variable,
    /// A placemat annotation
    Placemat,
    /// A sticky note annotation
    StickyNote,
}

/// Permission flag gating a mutation of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Can be deleted
    Deletable,
    /// Can be moved
    Movable,
    /// Can be renamed
    Renamable,
    /// Can be duplicated
    Copiable,
    /// Can be collapsed
    Collapsible,
    /// Can be resized
    Resizable,
    /// Can be selected
    Selectable,
    /// Accepts a user color override
    Colorable,
}

/// Ordered set of capabilities
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(IndexSet<Capability>);

impl Capabilities {
    /// No capabilities at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a capability set from a list
    pub fn from_slice(capabilities: &[Capability]) -> Self {
        Self(capabilities.iter().copied().collect())
    }

    /// Default capabilities of a node
    pub fn for_node() -> Self {
        Self::from_slice(&[
            Capability::Deletable,
            Capability::Movable,
            Capability::Renamable,
            Capability::Copiable,
            Capability::Collapsible,
            Capability::Selectable,
            Capability::Colorable,
        ])
    }

    /// Default capabilities of an edge
    pub fn for_edge() -> Self {
        Self::from_slice(&[Capability::Deletable, Capability::Copiable, Capability::Selectable])
    }

    /// Default capabilities of a variable declaration
    pub fn for_variable() -> Self {
        Self::from_slice(&[
            Capability::Deletable,
            Capability::Renamable,
            Capability::Copiable,
            Capability::Selectable,
        ])
    }

    /// Default capabilities of a placemat or sticky note
    pub fn for_annotation() -> Self {
        Self::from_slice(&[
            Capability::Deletable,
            Capability::Movable,
            Capability::Renamable,
            Capability::Copiable,
            Capability::Collapsible,
            Capability::Resizable,
            Capability::Selectable,
            Capability::Colorable,
        ])
    }

    /// Check for a capability
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Grant a capability (idempotent)
    pub fn insert(&mut self, capability: Capability) {
        self.0.insert(capability);
    }

    /// Revoke a capability, keeping the order of the others
    pub fn remove(&mut self, capability: Capability) {
        self.0.shift_remove(&capability);
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

/// Identity and permission data carried by every element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Guid, authoritative copy lives in the graph index key
    #[serde(skip)]
    pub(crate) guid: Guid,
    /// Numeric id from files written before guids existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<u64>,
    /// Permission flags
    pub capabilities: Capabilities,
    /// User color override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
    /// Graph revision at which this element last changed
    #[serde(skip)]
    pub(crate) version: u64,
}

impl ElementInfo {
    /// Create element info with the given capabilities and no guid yet
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Current guid, possibly [`Guid::NIL`]
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Return the guid, assigning a fresh one if it was never set
    pub fn ensure_guid(&mut self) -> Guid {
        if !self.guid.is_assigned() {
            self.guid = Guid::new();
        }
        self.guid
    }

    /// Revision of the last recorded change
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Common contract of all graph elements
pub trait GraphElement {
    /// Kind of this element
    const KIND: ElementKind;

    /// Identity and permission data
    fn info(&self) -> &ElementInfo;

    /// Mutable identity and permission data
    fn info_mut(&mut self) -> &mut ElementInfo;

    /// Element guid
    fn guid(&self) -> Guid {
        self.info().guid
    }

    /// Check a capability
    fn has_capability(&self, capability: Capability) -> bool {
        self.info().capabilities.contains(capability)
    }
}
