//! Game Objects
//!
//! A game object is a named container that exclusively owns an ordered list
//! of components. The list itself is only mutated by [`World`](super::World),
//! which keeps it in lockstep with each component's owner field.
//!
//! Each object also carries an external spatial entity: the engine-facing
//! position/rotation/scale that rendering and physics read. The transform
//! hierarchy writes into it through `World::sync_to_entity`.

use serde::{Serialize, Deserialize};

use super::entity::ComponentId;
use crate::math::Vec2;

/// Engine-facing spatial state of a game object.
///
/// Only supports uniform scale; the transform hierarchy projects its
/// non-uniform scale onto it.
pub trait SpatialEntity {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    /// Degrees
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, degrees: f32);
    fn scale(&self) -> f32;
    fn set_scale(&mut self, scale: f32);
}

/// Plain-data spatial entity used when the host doesn't supply its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialState {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: f32,
}

impl Default for SpatialState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl SpatialEntity for SpatialState {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}

/// An entity owning an ordered set of components.
pub struct GameObject {
    name: String,
    /// Insertion order, no duplicates
    pub(crate) components: Vec<ComponentId>,
    spatial: Box<dyn SpatialEntity>,
}

impl GameObject {
    pub(crate) fn new(name: impl Into<String>, spatial: Box<dyn SpatialEntity>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            spatial,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Owned components in insertion order.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn contains(&self, component: ComponentId) -> bool {
        self.components.contains(&component)
    }

    pub fn spatial(&self) -> &dyn SpatialEntity {
        self.spatial.as_ref()
    }

    pub fn spatial_mut(&mut self) -> &mut dyn SpatialEntity {
        self.spatial.as_mut()
    }

    /// Remove `component` from the list. Returns false if it wasn't there.
    pub(crate) fn unlink(&mut self, component: ComponentId) -> bool {
        match self.components.iter().position(|&c| c == component) {
            Some(pos) => {
                self.components.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("name", &self.name)
            .field("components", &self.components)
            .field("position", &self.spatial.position())
            .field("rotation", &self.spatial.rotation())
            .field("scale", &self.spatial.scale())
            .finish()
    }
}
