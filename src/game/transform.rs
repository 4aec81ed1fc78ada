//! Transform Hierarchy
//!
//! `Transform` is a component holding a local offset relative to its parent
//! transform (or to the world if it has none). Parent and children links are
//! plain handles; the world keeps both directions consistent on every change.
//!
//! World-space values are never cached. Each query walks up the parent chain:
//! - rotation: parent world rotation + local rotation
//! - scale: parent world scale * local scale (componentwise)
//! - position: parent world position + rotate(local * parent scale, parent rotation)
//!
//! Scale is applied before rotation, then translation. Swapping the first two
//! gives different results under non-uniform scale.
//!
//! Re-parenting keeps the numeric local offset, not the world pose, so a
//! transform visibly jumps when it changes parent. Cycles are rejected when
//! they are made, so every query terminates.

use log::{debug, warn};

use super::component::Component;
use super::entity::ComponentId;
use super::event::ReparentEvent;
use super::world::{precondition_failed, World};
use crate::error::{CoreError, Result};
use crate::math::Vec2;

/// Local position/rotation/scale plus hierarchy links.
#[derive(Debug)]
pub struct Transform {
    /// Offset from the parent's origin, in the parent's scaled space
    pub local_position: Vec2,
    /// Degrees, counter-clockwise
    pub local_rotation: f32,
    pub scale: Vec2,
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
}

impl Transform {
    /// Parentless, at the origin, unrotated, unit scale.
    pub fn new() -> Self {
        Self {
            local_position: Vec2::ZERO,
            local_rotation: 0.0,
            scale: Vec2::ONE,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            local_position: position,
            ..Self::new()
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.local_rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn children(&self) -> &[ComponentId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Transform {}

impl World {
    // =========================================================================
    // Access
    // =========================================================================

    pub fn transform(&self, id: ComponentId) -> Option<&Transform> {
        self.component::<Transform>(id)
    }

    pub fn transform_mut(&mut self, id: ComponentId) -> Option<&mut Transform> {
        self.component_mut::<Transform>(id)
    }

    /// Like `transform`, but says why it failed.
    fn checked_transform(&self, id: ComponentId) -> Result<&Transform> {
        let slot = self
            .component_slot(id)
            .ok_or(CoreError::InvalidComponent(id))?;
        if !slot.is::<Transform>() {
            return Err(CoreError::NotATransform(id));
        }
        slot.downcast_ref::<Transform>()
            .ok_or(CoreError::ComponentBusy(id))
    }

    fn checked_transform_mut(&mut self, id: ComponentId) -> Result<&mut Transform> {
        self.checked_transform(id)?;
        self.transform_mut(id).ok_or(CoreError::ComponentBusy(id))
    }

    pub fn parent_of(&self, id: ComponentId) -> Option<ComponentId> {
        self.transform(id)?.parent
    }

    pub fn children_of(&self, id: ComponentId) -> &[ComponentId] {
        self.transform(id).map(|t| t.children.as_slice()).unwrap_or(&[])
    }

    // =========================================================================
    // Hierarchy Mutation
    // =========================================================================

    /// Set (or clear) a transform's parent, updating both sides.
    ///
    /// Rejects self-parenting, any parent that is already a descendant, and
    /// any link that would push the child's subtree past
    /// `max_hierarchy_depth`. Local values are left untouched.
    pub fn set_parent(&mut self, child: ComponentId, parent: Option<ComponentId>) -> Result<()> {
        let old_parent = self
            .checked_transform(child)
            .map_err(precondition_failed)?
            .parent;

        if let Some(new_parent) = parent {
            if new_parent == child {
                return Err(precondition_failed(CoreError::SelfParent(child)));
            }
            self.checked_transform(new_parent).map_err(precondition_failed)?;
            if self.is_in_chain(child, new_parent) {
                return Err(precondition_failed(CoreError::HierarchyCycle {
                    child,
                    parent: new_parent,
                }));
            }
            let max = self.config().max_hierarchy_depth;
            if self.ancestor_count(new_parent) + 1 + self.subtree_height(child) > max {
                return Err(precondition_failed(CoreError::HierarchyTooDeep(child, max)));
            }
        }

        if old_parent == parent {
            return Ok(());
        }
        if let Some(old) = old_parent {
            self.checked_transform(old).map_err(precondition_failed)?;
        }

        // Everything is validated; mutate both sides
        if let Some(old) = old_parent {
            if let Some(t) = self.transform_mut(old) {
                t.children.retain(|&c| c != child);
            }
        }
        if let Some(t) = self.transform_mut(child) {
            t.parent = parent;
        }
        if let Some(new_parent) = parent {
            if let Some(t) = self.transform_mut(new_parent) {
                t.children.push(child);
            }
        }

        self.events_mut().reparented.send(ReparentEvent {
            child,
            old_parent,
            new_parent: parent,
        });
        debug!("{} parent {:?} -> {:?}", child, old_parent, parent);
        Ok(())
    }

    /// True if `needle` is `start` or one of its ancestors.
    fn is_in_chain(&self, needle: ComponentId, start: ComponentId) -> bool {
        let mut current = Some(start);
        // Links are acyclic; the bound only guards against corruption
        for _ in 0..=self.component_count() {
            match current {
                Some(id) if id == needle => return true,
                Some(id) => current = self.parent_of(id),
                None => return false,
            }
        }
        true
    }

    /// Number of links from `id` up to its root.
    fn ancestor_count(&self, id: ComponentId) -> usize {
        let mut count = 0;
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            count += 1;
            current = self.parent_of(parent);
        }
        count
    }

    /// Links from `id` down to its deepest descendant.
    fn subtree_height(&self, id: ComponentId) -> usize {
        self.children_of(id)
            .iter()
            .map(|&child| 1 + self.subtree_height(child))
            .max()
            .unwrap_or(0)
    }

    /// Orphan every child. Children keep their local values, which now read
    /// as world values.
    pub fn detach_children(&mut self, id: ComponentId) -> Result<()> {
        let children = self
            .checked_transform(id)
            .map_err(precondition_failed)?
            .children
            .clone();
        for &child in &children {
            self.checked_transform(child).map_err(precondition_failed)?;
        }

        if let Some(t) = self.transform_mut(id) {
            t.children.clear();
        }
        for child in children {
            if let Some(t) = self.transform_mut(child) {
                t.parent = None;
            }
            self.events_mut().reparented.send(ReparentEvent {
                child,
                old_parent: Some(id),
                new_parent: None,
            });
        }
        Ok(())
    }

    /// Cut a transform out of the hierarchy before it is destroyed:
    /// leave the parent, then orphan the children.
    pub(crate) fn unlink_hierarchy(&mut self, id: ComponentId) {
        if let Err(err) = self.set_parent(id, None) {
            warn!("could not detach {} from its parent: {}", id, err);
        }
        if let Err(err) = self.detach_children(id) {
            warn!("could not orphan children of {}: {}", id, err);
        }
    }

    // =========================================================================
    // Local-Space Operations
    // =========================================================================

    pub fn translate(&mut self, id: ComponentId, offset: Vec2) -> Result<()> {
        let t = self.checked_transform_mut(id).map_err(precondition_failed)?;
        t.local_position += offset;
        Ok(())
    }

    pub fn rotate(&mut self, id: ComponentId, degrees: f32) -> Result<()> {
        let t = self.checked_transform_mut(id).map_err(precondition_failed)?;
        t.local_rotation += degrees;
        Ok(())
    }

    /// Point the transform's +X axis at a world-space point. The stored local
    /// rotation compensates for the parent's world rotation.
    pub fn look_at(&mut self, id: ComponentId, target: Vec2) -> Result<()> {
        let parent = self.checked_transform(id).map_err(precondition_failed)?.parent;
        let position = self.world_position_at(id, 0).map_err(precondition_failed)?;

        let mut angle = (target - position).angle_deg();
        if let Some(parent) = parent {
            angle -= self.world_rotation_at(parent, 1).map_err(precondition_failed)?;
        }

        let t = self.checked_transform_mut(id).map_err(precondition_failed)?;
        t.local_rotation = angle;
        Ok(())
    }

    // =========================================================================
    // World-Space Queries
    // =========================================================================

    pub fn world_position(&self, id: ComponentId) -> Option<Vec2> {
        self.world_position_at(id, 0).map_err(precondition_failed).ok()
    }

    /// Degrees. Not wrapped into [0, 360).
    pub fn world_rotation(&self, id: ComponentId) -> Option<f32> {
        self.world_rotation_at(id, 0).map_err(precondition_failed).ok()
    }

    pub fn world_scale(&self, id: ComponentId) -> Option<Vec2> {
        self.world_scale_at(id, 0).map_err(precondition_failed).ok()
    }

    /// Depth after stepping from `id` to its parent.
    fn descend(&self, id: ComponentId, depth: usize) -> Result<usize> {
        let max = self.config().max_hierarchy_depth;
        if depth >= max {
            return Err(CoreError::HierarchyTooDeep(id, max));
        }
        Ok(depth + 1)
    }

    fn world_position_at(&self, id: ComponentId, depth: usize) -> Result<Vec2> {
        let t = self.checked_transform(id)?;
        let Some(parent) = t.parent else {
            return Ok(t.local_position);
        };
        let depth = self.descend(id, depth)?;

        let parent_position = self.world_position_at(parent, depth)?;
        let parent_scale = self.world_scale_at(parent, depth)?;
        let parent_rotation = self.world_rotation_at(parent, depth)?;

        let scaled = t.local_position.mul_elements(parent_scale);
        let rotated = scaled.rotate_deg(parent_rotation);
        Ok(parent_position + rotated)
    }

    fn world_rotation_at(&self, id: ComponentId, depth: usize) -> Result<f32> {
        let t = self.checked_transform(id)?;
        let Some(parent) = t.parent else {
            return Ok(t.local_rotation);
        };
        let depth = self.descend(id, depth)?;
        Ok(self.world_rotation_at(parent, depth)? + t.local_rotation)
    }

    fn world_scale_at(&self, id: ComponentId, depth: usize) -> Result<Vec2> {
        let t = self.checked_transform(id)?;
        let Some(parent) = t.parent else {
            return Ok(t.scale);
        };
        let depth = self.descend(id, depth)?;
        Ok(t.scale.mul_elements(self.world_scale_at(parent, depth)?))
    }

    // =========================================================================
    // Entity Sync
    // =========================================================================

    /// Write the world pose into the owner's spatial entity.
    ///
    /// The entity only has a uniform scale, so it receives the mean of the
    /// world scale's two axes, not of the local `scale` fields, so ancestor
    /// scale reaches the entity. Returns false (and writes nothing) if the
    /// transform has no owner.
    pub fn sync_to_entity(&mut self, id: ComponentId) -> Result<bool> {
        self.checked_transform(id).map_err(precondition_failed)?;
        let Some(owner) = self.owner(id) else {
            return Ok(false);
        };

        let position = self.world_position_at(id, 0).map_err(precondition_failed)?;
        let rotation = self.world_rotation_at(id, 0).map_err(precondition_failed)?;
        let scale = self.world_scale_at(id, 0).map_err(precondition_failed)?;

        let Some(obj) = self.object_mut(owner) else {
            return Err(precondition_failed(CoreError::InvalidObject(owner)));
        };
        let spatial = obj.spatial_mut();
        spatial.set_position(position);
        spatial.set_rotation(rotation);
        spatial.set_scale(scale.average());
        Ok(true)
    }

    /// Sync every attached transform. Returns how many entities were written.
    pub fn sync_all_transforms(&mut self) -> usize {
        let attached: Vec<ComponentId> = self
            .components
            .iter()
            .filter(|(_, slot)| slot.is::<Transform>() && slot.owner().is_some())
            .map(|(id, _)| id)
            .collect();

        attached
            .into_iter()
            .filter(|&id| matches!(self.sync_to_entity(id), Ok(true)))
            .count()
    }
}
