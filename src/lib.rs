//! BONNIE-32 composition core
//!
//! Game objects own components; components hook into attach, detach and
//! per-frame update; transforms form a parent/child hierarchy and compose
//! local offsets into world-space position, rotation and scale.
//!
//! Everything lives in a [`World`] and is addressed by generational handles:
//! ```
//! use bonnie_compose::{Transform, Vec2, World};
//!
//! let mut world = World::new();
//! let ship = world.spawn_object("ship");
//! let hull = world.add_new_component(ship, Transform::from_position(Vec2::new(10.0, 10.0))).unwrap();
//!
//! let turret = world.spawn_object("turret");
//! let mount = world.add_new_component(turret, Transform::from_position(Vec2::new(5.0, 0.0))).unwrap();
//! world.set_parent(mount, Some(hull)).unwrap();
//!
//! assert_eq!(world.world_position(mount), Some(Vec2::new(15.0, 10.0)));
//! ```

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod game;
pub mod math;
pub mod scene;

pub use config::WorldConfig;
pub use error::{CoreError, Result};
pub use game::{
    Component, ComponentId, Drift, GameObject, HookContext, Inspector, ObjectId, SpatialEntity,
    SpatialState, Spin, Transform, World,
};
pub use math::Vec2;
pub use scene::{load_scene, load_scene_from_str, SceneDesc};
