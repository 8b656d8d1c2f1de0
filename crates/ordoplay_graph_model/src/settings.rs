// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph model settings.
//!
//! Settings are plain data owned by whoever owns the graph. They are stored
//! as RON next to the project and versioned like project settings.

use crate::node::NodeModel;
use crate::port::{PortCapacity, PortDirection, PortId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const GRAPH_SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const GRAPH_SETTINGS_FILE_NAME: &str = "graph.settings.ron";

/// Geometry of a node's port rows, used to compute port anchors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortLayout {
    /// Node width
    pub node_width: f32,
    /// Height of the title bar above the first port row
    pub header_height: f32,
    /// Height of one port row
    pub port_height: f32,
}

impl Default for PortLayout {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            header_height: 24.0,
            port_height: 22.0,
        }
    }
}

impl PortLayout {
    /// Anchor of a port relative to its node's position
    ///
    /// Inputs sit on the left edge and outputs on the right edge, one row per
    /// port in declaration order.
    pub fn anchor(&self, node: &NodeModel, port: &PortId, direction: PortDirection) -> Option<[f32; 2]> {
        let row = node.ports(direction).index_of(port)?;
        let x = match direction {
            PortDirection::Input => 0.0,
            PortDirection::Output => self.node_width,
        };
        let y = self.header_height + (row as f32 + 0.5) * self.port_height;
        Some([x, y])
    }
}

/// Settings of a graph model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Format version
    pub version: u32,
    /// Create placeholder ports for edge ends that no longer resolve
    pub placeholder_ports: bool,
    /// Port row geometry
    pub layout: PortLayout,
    /// Capacity of data inputs that do not declare one
    pub default_input_capacity: PortCapacity,
    /// Capacity of data outputs that do not declare one
    pub default_output_capacity: PortCapacity,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            version: GRAPH_SETTINGS_VERSION,
            placeholder_ports: true,
            layout: PortLayout::default(),
            default_input_capacity: PortCapacity::Single,
            default_output_capacity: PortCapacity::Multi,
        }
    }
}

impl GraphSettings {
    /// Default capacity for a direction
    pub fn default_capacity(&self, direction: PortDirection) -> PortCapacity {
        match direction {
            PortDirection::Input => self.default_input_capacity,
            PortDirection::Output => self.default_output_capacity,
        }
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: GraphSettings = ron::from_str(content)?;

        if settings.version > GRAPH_SETTINGS_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: GRAPH_SETTINGS_VERSION,
            });
        }

        Ok(settings)
    }

    /// Serialize settings to RON text
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::debug!("Loaded graph settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

/// Error loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File content is not valid settings
    #[error("Invalid settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Settings encoding failed: {0}")]
    Encode(#[from] ron::Error),

    /// Settings were written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest supported version
        supported: u32,
    },
}
