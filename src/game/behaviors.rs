//! Built-in Behaviors
//!
//! Small component kinds that drive a sibling [`Transform`] every frame.
//! Scene files can attach them without any game-specific code.

use log::debug;
use serde::{Serialize, Deserialize};

use super::component::{Component, HookContext};
use super::entity::ObjectId;
use super::transform::Transform;
use crate::math::Vec2;

/// Rotates the owner's transform at a constant rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub degrees_per_second: f32,
}

impl Component for Spin {
    fn on_attached(&mut self, ctx: &mut HookContext<'_>, owner: ObjectId) {
        if ctx.sibling::<Transform>().is_none() {
            debug!("Spin on {} has no transform yet", owner);
        }
    }

    fn on_update(&mut self, ctx: &mut HookContext<'_>, delta: f32) {
        if let Some(transform) = ctx.sibling::<Transform>() {
            let _ = ctx.rotate(transform, self.degrees_per_second * delta);
        }
    }
}

/// Moves the owner's transform at a constant local-space velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub velocity: Vec2,
}

impl Component for Drift {
    fn on_update(&mut self, ctx: &mut HookContext<'_>, delta: f32) {
        if let Some(transform) = ctx.sibling::<Transform>() {
            let _ = ctx.translate(transform, self.velocity * delta);
        }
    }
}
