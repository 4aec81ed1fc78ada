//! Game Composition Module
//!
//! The object/component layer every gameplay feature builds on. Inspired by
//! classic engine component models rather than data-oriented ECS: behavior
//! lives in components, and components hook into their owner's lifecycle.
//!
//! Key concepts:
//! - GameObject: named container owning an ordered list of components
//! - Component: behavior with attach/detach/update hooks
//! - Transform: component with a parent/children hierarchy and world-space queries
//! - World: arena holding all of the above, addressed by generational handles
//! - Event: lifecycle changes for observers such as the inspector
//!
//! Design philosophy:
//! - Relationships are handles, never strong references
//! - Every destruction path unlinks relationships itself
//! - Single-threaded; hooks run inline with full world access

pub mod entity;
pub mod storage;
pub mod component;
pub mod object;
pub mod world;
pub mod event;
pub mod transform;
pub mod behaviors;
pub mod inspector;

// Re-export main types
pub use entity::{ComponentId, Handle, ObjectId};
pub use component::{Component, ComponentSlot, HookContext};
pub use object::{GameObject, SpatialEntity, SpatialState};
pub use world::World;
pub use event::Events;
pub use transform::Transform;
pub use behaviors::{Drift, Spin};
pub use inspector::{Inspector, ObjectSummary};
