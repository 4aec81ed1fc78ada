//! Debug Inspector
//!
//! Read-only view over a world's objects and components for debug tooling.
//! The inspector is constructed explicitly and passed to whoever draws it;
//! there is no global instance.
//!
//! Its selection is a pair of handles, so it never keeps anything alive.
//! When the selected object or component is destroyed the selection is
//! dropped, either eagerly from the world's events or lazily on access.

use super::component::short_type_name;
use super::entity::{ComponentId, ObjectId};
use super::event::Events;
use super::world::World;
use crate::math::Vec2;

/// One component as the inspector shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSummary {
    pub id: ComponentId,
    pub type_name: &'static str,
    pub enabled: bool,
}

/// One object as the inspector shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub id: ObjectId,
    pub name: String,
    pub position: Vec2,
    pub rotation: f32,
    pub scale: f32,
    pub components: Vec<ComponentSummary>,
}

#[derive(Debug, Default)]
pub struct Inspector {
    selected_object: Option<ObjectId>,
    selected_component: Option<ComponentId>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every live object in spawn order.
    pub fn snapshot(&self, world: &World) -> Vec<ObjectSummary> {
        world
            .objects()
            .map(|(id, obj)| {
                let spatial = obj.spatial();
                ObjectSummary {
                    id,
                    name: obj.name().to_string(),
                    position: spatial.position(),
                    rotation: spatial.rotation(),
                    scale: spatial.scale(),
                    components: obj
                        .components()
                        .iter()
                        .filter_map(|&c| {
                            let slot = world.component_slot(c)?;
                            Some(ComponentSummary {
                                id: c,
                                type_name: short_type_name(slot.type_name()),
                                enabled: slot.is_enabled(),
                            })
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Select an object, clearing any component selection.
    pub fn select_object(&mut self, object: Option<ObjectId>) {
        self.selected_object = object;
        self.selected_component = None;
    }

    /// Select a component and its owner.
    pub fn select_component(&mut self, world: &World, component: Option<ComponentId>) {
        self.selected_component = component;
        self.selected_object = component.and_then(|c| world.owner(c));
    }

    pub fn selected_object(&mut self, world: &World) -> Option<ObjectId> {
        if let Some(id) = self.selected_object {
            if !world.is_alive(id) {
                self.select_object(None);
            }
        }
        self.selected_object
    }

    pub fn selected_component(&mut self, world: &World) -> Option<ComponentId> {
        if let Some(id) = self.selected_component {
            if world.component_slot(id).is_none() {
                self.selected_component = None;
            }
        }
        self.selected_component
    }

    /// Drop selections whose targets were destroyed this frame.
    pub fn observe_events(&mut self, events: &Events) {
        if let Some(selected) = self.selected_object {
            if events.object_destroyed.iter().any(|&id| id == selected) {
                self.select_object(None);
            }
        }
        if let Some(selected) = self.selected_component {
            if events.component_destroyed.iter().any(|&id| id == selected) {
                self.selected_component = None;
            }
        }
    }
}
