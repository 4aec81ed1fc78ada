//! World configuration
//!
//! Stored as RON, either standalone or embedded in a scene file.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::error::Result;

/// Tunables for a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Deepest transform chain a world-space query will walk.
    pub max_hierarchy_depth: usize,
    /// Object slots to pre-allocate
    pub object_capacity: usize,
    /// Component slots to pre-allocate
    pub component_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: 64,
            object_capacity: 64,
            component_capacity: 256,
        }
    }
}

impl WorldConfig {
    pub fn from_ron_str(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }
}
