//! Scene descriptions
//!
//! A scene file is RON listing objects, their local transforms, their
//! parents (by name) and any built-in behaviors. It is only a way to build a
//! world; nothing is ever written back.
//!
//! ```ron
//! (
//!     config: (max_hierarchy_depth: 16),
//!     objects: [
//!         (name: "sun", behaviors: [Spin(degrees_per_second: 10.0)]),
//!         (name: "earth", parent: Some("sun"), position: (x: 100.0, y: 0.0)),
//!     ],
//! )
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, error};
use serde::{Serialize, Deserialize};

use crate::config::WorldConfig;
use crate::error::{CoreError, Result};
use crate::game::{Drift, ObjectId, Spin, Transform, World};
use crate::math::Vec2;

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of objects in a scene
    pub const MAX_OBJECTS: usize = 4096;
    /// Maximum behaviors on one object
    pub const MAX_BEHAVIORS: usize = 16;
    /// Maximum length of an object name
    pub const MAX_NAME_LEN: usize = 256;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub config: WorldConfig,
    pub objects: Vec<ObjectDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub position: Vec2,
    /// Degrees
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    /// When false, the object's behaviors start disabled
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub behaviors: Vec<BehaviorDesc>,
}

fn unit_scale() -> Vec2 {
    Vec2::ONE
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BehaviorDesc {
    Spin { degrees_per_second: f32 },
    Drift { velocity: Vec2 },
}

impl SceneDesc {
    /// Spawn every object with its transform and behaviors, then link the
    /// hierarchy. Returns the spawned objects by name.
    pub fn instantiate(&self, world: &mut World) -> Result<HashMap<String, ObjectId>> {
        validate_scene(self)?;

        let mut objects = HashMap::with_capacity(self.objects.len());
        let mut transforms = HashMap::with_capacity(self.objects.len());

        for desc in &self.objects {
            let object = world.spawn_object(desc.name.as_str());
            let transform = world.add_new_component(
                object,
                Transform::from_position(desc.position)
                    .with_rotation(desc.rotation)
                    .with_scale(desc.scale),
            )?;

            for behavior in &desc.behaviors {
                let id = match *behavior {
                    BehaviorDesc::Spin { degrees_per_second } => {
                        world.add_new_component(object, Spin { degrees_per_second })?
                    }
                    BehaviorDesc::Drift { velocity } => {
                        world.add_new_component(object, Drift { velocity })?
                    }
                };
                if !desc.active {
                    world.set_enabled(id, false)?;
                }
            }

            objects.insert(desc.name.clone(), object);
            transforms.insert(desc.name.as_str(), transform);
        }

        for desc in &self.objects {
            if let Some(parent) = &desc.parent {
                world.set_parent(transforms[desc.name.as_str()], Some(transforms[parent.as_str()]))?;
            }
        }

        debug!("instantiated scene with {} objects", objects.len());
        Ok(objects)
    }
}

fn check_coord(name: &str, what: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value.abs() > limits::MAX_COORD {
        return Err(CoreError::Scene(format!("{}: {} out of range ({})", name, what, value)));
    }
    Ok(())
}

/// Validate a scene before building anything from it.
pub fn validate_scene(scene: &SceneDesc) -> Result<()> {
    if scene.objects.len() > limits::MAX_OBJECTS {
        return Err(CoreError::Scene(format!(
            "too many objects: {} (max {})",
            scene.objects.len(),
            limits::MAX_OBJECTS
        )));
    }

    let mut parents: HashMap<&str, Option<&str>> = HashMap::with_capacity(scene.objects.len());
    for obj in &scene.objects {
        if obj.name.is_empty() || obj.name.len() > limits::MAX_NAME_LEN {
            return Err(CoreError::Scene(format!("bad object name {:?}", obj.name)));
        }
        if parents.insert(obj.name.as_str(), obj.parent.as_deref()).is_some() {
            return Err(CoreError::Scene(format!("duplicate object name {:?}", obj.name)));
        }
        if obj.behaviors.len() > limits::MAX_BEHAVIORS {
            return Err(CoreError::Scene(format!("{}: too many behaviors", obj.name)));
        }

        check_coord(&obj.name, "position.x", obj.position.x)?;
        check_coord(&obj.name, "position.y", obj.position.y)?;
        check_coord(&obj.name, "rotation", obj.rotation)?;
        check_coord(&obj.name, "scale.x", obj.scale.x)?;
        check_coord(&obj.name, "scale.y", obj.scale.y)?;
        for behavior in &obj.behaviors {
            match *behavior {
                BehaviorDesc::Spin { degrees_per_second } => {
                    check_coord(&obj.name, "spin rate", degrees_per_second)?
                }
                BehaviorDesc::Drift { velocity } => {
                    check_coord(&obj.name, "drift.x", velocity.x)?;
                    check_coord(&obj.name, "drift.y", velocity.y)?;
                }
            }
        }
    }

    // Every parent exists, and every chain ends within the depth limit
    for obj in &scene.objects {
        let mut seen = HashSet::new();
        seen.insert(obj.name.as_str());
        let mut current = obj.parent.as_deref();
        while let Some(parent) = current {
            if !parents.contains_key(parent) {
                return Err(CoreError::Scene(format!("{}: unknown parent {:?}", obj.name, parent)));
            }
            if !seen.insert(parent) {
                return Err(CoreError::Scene(format!("{}: parent cycle through {:?}", obj.name, parent)));
            }
            if seen.len() > scene.config.max_hierarchy_depth + 1 {
                return Err(CoreError::Scene(format!("{}: hierarchy too deep", obj.name)));
            }
            current = parents[parent];
        }
    }

    Ok(())
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneDesc> {
    let scene: SceneDesc = ron::from_str(s)?;
    validate_scene(&scene)?;
    Ok(scene)
}

/// Load a scene file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneDesc> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let scene: SceneDesc = match ron::from_str(&contents) {
        Ok(scene) => scene,
        Err(e) => {
            error!("RON parse error in {}: {}", path.display(), e);
            if let Some(line) = contents.lines().nth(e.position.line.saturating_sub(1)) {
                error!("  Line {}: {}", e.position.line, line.trim());
            }
            return Err(e.into());
        }
    };

    validate_scene(&scene)?;
    Ok(scene)
}
