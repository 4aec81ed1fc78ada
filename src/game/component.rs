//! Components
//!
//! A component is an attachable unit of behavior owned by at most one game
//! object at a time. Concrete kinds implement [`Component`] and override the
//! hooks they care about; everything else about a component (its owner, its
//! enabled flag) is bookkeeping the [`World`] keeps in a [`ComponentSlot`].
//!
//! Hook ordering contract:
//! - `on_detached` runs *before* the owner is cleared, so `ctx.owner()` still
//!   reports the object being left.
//! - `on_attached` runs *after* the owner is set, so `ctx.owner()` already
//!   reports the new object.
//!
//! While a hook runs, the component's boxed behavior is checked out of its
//! slot. The hook gets full `&mut World` access through [`HookContext`] and
//! may add, remove or destroy sibling components. Removing or destroying the
//! running component itself is deferred: it leaves its owner's list at once,
//! but `on_detached` (and the free) happen when the hook returns. A busy
//! component cannot be attached anywhere.

use std::any::{Any, TypeId};
use std::ops::{Deref, DerefMut};

use super::entity::{ComponentId, ObjectId};
use super::world::World;

/// Type-erasure helpers, implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// The hook table every component kind participates through.
///
/// All hooks default to no-ops.
pub trait Component: AsAny {
    /// Called once the component belongs to `owner`.
    fn on_attached(&mut self, _ctx: &mut HookContext<'_>, _owner: ObjectId) {}

    /// Called while the component still belongs to its owner, right before
    /// the owner is cleared.
    fn on_detached(&mut self, _ctx: &mut HookContext<'_>) {}

    /// Per-frame work. Only called while the component is enabled.
    fn on_update(&mut self, _ctx: &mut HookContext<'_>, _delta: f32) {}
}

/// Short type name for logs and inspection ("Transform" rather than the
/// full module path).
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// World-side bookkeeping for one component.
pub struct ComponentSlot {
    /// Non-owning back-reference to the owning game object
    pub(crate) owner: Option<ObjectId>,
    /// Gates `on_update`
    pub(crate) enabled: bool,
    /// Cached so type queries work while the behavior is checked out
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    /// `None` while one of this component's hooks is running
    pub(crate) behavior: Option<Box<dyn Component>>,
    /// Removed from this owner's list while busy; `on_detached` runs when
    /// the current hook returns
    pub(crate) pending_detach: Option<ObjectId>,
    /// Destroyed while busy; freed when the current hook returns
    pub(crate) pending_destroy: bool,
}

impl ComponentSlot {
    pub(crate) fn new(behavior: Box<dyn Component>) -> Self {
        let type_id = behavior.as_ref().as_any().type_id();
        let type_name = behavior.as_ref().type_name();
        Self {
            owner: None,
            enabled: true,
            type_id,
            type_name,
            behavior: Some(behavior),
            pending_detach: None,
            pending_destroy: false,
        }
    }

    pub fn owner(&self) -> Option<ObjectId> {
        self.owner
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Full type path of the concrete component kind.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Component>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// True while one of this component's hooks is running.
    pub fn is_busy(&self) -> bool {
        self.behavior.is_none()
    }

    pub(crate) fn downcast_ref<T: Component>(&self) -> Option<&T> {
        let behavior: &dyn Component = self.behavior.as_deref()?;
        behavior.as_any().downcast_ref::<T>()
    }

    pub(crate) fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        let behavior: &mut dyn Component = self.behavior.as_deref_mut()?;
        behavior.as_any_mut().downcast_mut::<T>()
    }
}

/// What a hook sees: the world it lives in and which component it is.
///
/// Derefs to [`World`], so hooks call world operations directly
/// (`ctx.rotate(transform, 10.0)`).
pub struct HookContext<'w> {
    world: &'w mut World,
    component: ComponentId,
}

impl<'w> HookContext<'w> {
    pub(crate) fn new(world: &'w mut World, component: ComponentId) -> Self {
        Self { world, component }
    }

    /// The component whose hook is running.
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// Current owner of the running component.
    pub fn owner(&self) -> Option<ObjectId> {
        self.world.owner(self.component)
    }

    /// First component of type `T` on the running component's owner.
    pub fn sibling<T: Component>(&self) -> Option<ComponentId> {
        let owner = self.owner()?;
        self.world.get_component::<T>(owner)
    }
}

impl Deref for HookContext<'_> {
    type Target = World;

    fn deref(&self) -> &World {
        self.world
    }
}

impl DerefMut for HookContext<'_> {
    fn deref_mut(&mut self) -> &mut World {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Component for Marker {}

    struct Other(u8);
    impl Component for Other {}

    #[test]
    fn test_slot_type_queries() {
        let slot = ComponentSlot::new(Box::new(Marker));
        assert!(slot.is::<Marker>());
        assert!(!slot.is::<Other>());
        assert!(slot.downcast_ref::<Marker>().is_some());
        assert!(slot.downcast_ref::<Other>().is_none());
        assert_eq!(short_type_name(slot.type_name()), "Marker");
    }

    #[test]
    fn test_new_slot_is_standalone_and_enabled() {
        let slot = ComponentSlot::new(Box::new(Other(7)));
        assert_eq!(slot.owner(), None);
        assert!(slot.is_enabled());
        assert!(!slot.is_busy());
    }

    #[test]
    fn test_downcast_mut() {
        let mut slot = ComponentSlot::new(Box::new(Other(1)));
        slot.downcast_mut::<Other>().unwrap().0 = 9;
        assert_eq!(slot.downcast_ref::<Other>().unwrap().0, 9);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Transform"), "Transform");
        assert_eq!(short_type_name("Plain"), "Plain");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper<b::Inner>");
    }
}
