//! Error types
//!
//! Only precondition violations become errors. Recoverable misuse (adding a
//! component twice, removing one that isn't there) is logged as a warning and
//! the call succeeds as a no-op.

use thiserror::Error;

use crate::game::{ComponentId, ObjectId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid or destroyed game object {0}")]
    InvalidObject(ObjectId),

    #[error("invalid or destroyed component {0}")]
    InvalidComponent(ComponentId),

    /// The component is checked out while one of its own hooks runs.
    #[error("component {0} is busy running a hook")]
    ComponentBusy(ComponentId),

    #[error("component {0} is not a transform")]
    NotATransform(ComponentId),

    #[error("transform {0} cannot be its own parent")]
    SelfParent(ComponentId),

    #[error("parenting {child} under {parent} would create a cycle")]
    HierarchyCycle {
        child: ComponentId,
        parent: ComponentId,
    },

    #[error("transform {0} is nested deeper than {1} levels")]
    HierarchyTooDeep(ComponentId, usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid scene: {0}")]
    Scene(String),
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
