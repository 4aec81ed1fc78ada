//! Game World
//!
//! The World is the arena everything lives in:
//! - Game objects, in spawn order
//! - Components, attached or standalone
//! - Lifecycle events for observers
//!
//! Ownership rules:
//! - A game object exclusively owns the components in its list
//! - A component's owner field is set if and only if exactly one object
//!   lists it; `add_component` and `remove_component` are the only paths
//!   that change either side
//! - Removing a component releases ownership back to the caller: the
//!   component stays alive, standalone, until re-attached or destroyed
//!
//! Any loop over an object's component list that runs hooks walks a
//! snapshot, since hooks may add or remove siblings.

use log::{debug, error, warn};

use super::component::{Component, ComponentSlot, HookContext};
use super::entity::{ComponentId, ObjectId};
use super::event::{AttachEvent, EnabledEvent, Events};
use super::object::{GameObject, SpatialEntity, SpatialState};
use super::storage::Pool;
use super::transform::Transform;
use crate::config::WorldConfig;
use crate::error::{CoreError, Result};

/// Snapshot passes made over a component list during teardown before
/// whatever hooks keep re-adding is dropped without hooks.
const MAX_TEARDOWN_PASSES: usize = 4;

/// Log a precondition violation and hand the error back for returning.
pub(crate) fn precondition_failed(err: CoreError) -> CoreError {
    error!("{}", err);
    err
}

pub struct World {
    config: WorldConfig,
    objects: Pool<ObjectId, GameObject>,
    /// Spawn order, drives `update`
    object_order: Vec<ObjectId>,
    pub(crate) components: Pool<ComponentId, ComponentSlot>,
    events: Events,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            objects: Pool::with_capacity(config.object_capacity),
            object_order: Vec::with_capacity(config.object_capacity),
            components: Pool::with_capacity(config.component_capacity),
            events: Events::new(),
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Lifecycle events recorded since the last `clear_events`.
    pub fn events(&self) -> &Events {
        &self.events
    }

    /// Clear all event queues. Call at end of frame.
    pub fn clear_events(&mut self) {
        self.events.clear_all();
    }

    pub(crate) fn events_mut(&mut self) -> &mut Events {
        &mut self.events
    }

    // =========================================================================
    // Game Objects
    // =========================================================================

    /// Spawn an empty object with default spatial state.
    pub fn spawn_object(&mut self, name: impl Into<String>) -> ObjectId {
        self.spawn_object_with(name, Box::new(SpatialState::default()))
    }

    /// Spawn an empty object backed by a host-supplied spatial entity.
    pub fn spawn_object_with(
        &mut self,
        name: impl Into<String>,
        spatial: Box<dyn SpatialEntity>,
    ) -> ObjectId {
        let id = self.objects.insert(GameObject::new(name, spatial));
        self.object_order.push(id);
        debug!("spawned {}", id);
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Live objects in spawn order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.object_order
            .iter()
            .filter_map(move |&id| self.objects.get(id).map(|obj| (id, obj)))
    }

    /// First object with this name, in spawn order.
    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects()
            .find(|(_, obj)| obj.name() == name)
            .map(|(id, _)| id)
    }

    /// Destroy an object and every component it owns.
    ///
    /// Components are torn down in list order (on a snapshot): transforms
    /// leave the hierarchy first, then `on_detached` fires, then the
    /// component is freed.
    pub fn destroy_object(&mut self, id: ObjectId) -> Result<()> {
        if !self.objects.contains(id) {
            return Err(precondition_failed(CoreError::InvalidObject(id)));
        }

        for _ in 0..MAX_TEARDOWN_PASSES {
            let snapshot = match self.objects.get(id) {
                Some(obj) if !obj.components.is_empty() => obj.components.clone(),
                _ => break,
            };
            for component in snapshot {
                if self.owner(component) == Some(id) {
                    // Already logged; keep tearing down the rest
                    let _ = self.destroy_component(component);
                }
            }
        }
        self.orphan_leftovers(id);

        // A hook may have destroyed the object already
        if self.objects.remove(id).is_some() {
            self.object_order.retain(|&o| o != id);
            self.events.object_destroyed.send(id);
            debug!("destroyed {}", id);
        }
        Ok(())
    }

    fn live_object(&self, id: ObjectId) -> Option<&GameObject> {
        let obj = self.objects.get(id);
        if obj.is_none() {
            error!("{}", CoreError::InvalidObject(id));
        }
        obj
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Create a standalone component (no owner).
    pub fn spawn_component<C: Component>(&mut self, component: C) -> ComponentId {
        self.spawn_boxed(Box::new(component))
    }

    pub fn spawn_boxed(&mut self, component: Box<dyn Component>) -> ComponentId {
        let id = self.components.insert(ComponentSlot::new(component));
        debug!("spawned {} ({})", id, self.components.get(id).map_or("?", |s| s.type_name()));
        id
    }

    /// Bookkeeping for a component, attached or not.
    pub fn component_slot(&self, id: ComponentId) -> Option<&ComponentSlot> {
        self.components.get(id)
    }

    /// Typed access. `None` if the handle is stale, the type doesn't match,
    /// or the component is busy running one of its hooks.
    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.components.get(id)?.downcast_ref::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.components.get_mut(id)?.downcast_mut::<T>()
    }

    /// Number of live components, attached or standalone.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn owner(&self, id: ComponentId) -> Option<ObjectId> {
        self.components.get(id)?.owner
    }

    pub fn is_enabled(&self, id: ComponentId) -> bool {
        self.components.get(id).map_or(false, |slot| slot.enabled)
    }

    /// Toggle update dispatch. Returns whether the flag changed; setting
    /// the current value records no event.
    pub fn set_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<bool> {
        let Some(slot) = self.components.get_mut(id) else {
            return Err(precondition_failed(CoreError::InvalidComponent(id)));
        };
        if slot.enabled == enabled {
            return Ok(false);
        }
        slot.enabled = enabled;
        self.events.enabled_changed.send(EnabledEvent { component: id, enabled });
        debug!("{} enabled = {}", id, enabled);
        Ok(true)
    }

    /// Run `on_update` if the component is enabled.
    pub fn update_component(&mut self, id: ComponentId, delta: f32) -> Result<()> {
        let Some(slot) = self.components.get(id) else {
            return Err(precondition_failed(CoreError::InvalidComponent(id)));
        };
        if !slot.enabled {
            return Ok(());
        }
        self.run_hook(id, |component, ctx| component.on_update(ctx, delta))
            .map_err(precondition_failed)
    }

    /// Free a component. If it is a transform it first leaves the
    /// hierarchy; if it is attached it is then detached from its owner.
    ///
    /// A component destroyed from inside its own hook leaves its owner's
    /// list immediately and is freed once the hook returns.
    pub fn destroy_component(&mut self, id: ComponentId) -> Result<()> {
        let Some(slot) = self.components.get_mut(id) else {
            return Err(precondition_failed(CoreError::InvalidComponent(id)));
        };
        if slot.is_busy() {
            slot.pending_destroy = true;
            let listed_owner = if slot.pending_detach.is_some() { None } else { slot.owner };
            if let Some(owner) = listed_owner {
                self.remove_component(owner, id)?;
            }
            debug!("{} destroyed during its own hook, deferring", id);
            return Ok(());
        }
        if slot.is::<Transform>() {
            self.unlink_hierarchy(id);
        }

        if let Some(owner) = self.owner(id) {
            self.remove_component(owner, id)?;
        }

        // on_detached may already have destroyed it
        if self.components.remove(id).is_some() {
            self.events.component_destroyed.send(id);
            debug!("destroyed {}", id);
        }
        Ok(())
    }

    // =========================================================================
    // Component Registry
    // =========================================================================

    /// Attach `component` to `object`.
    ///
    /// Adding a component the object already owns is a no-op. A component
    /// owned elsewhere is first removed from its current owner, so it
    /// migrates instead of being shared.
    pub fn add_component(&mut self, object: ObjectId, component: ComponentId) -> Result<()> {
        if !self.objects.contains(object) {
            return Err(precondition_failed(CoreError::InvalidObject(object)));
        }
        let Some(slot) = self.components.get(component) else {
            return Err(precondition_failed(CoreError::InvalidComponent(component)));
        };
        let current_owner = slot.owner;
        if slot.is_busy() {
            if current_owner == Some(object) && slot.pending_detach.is_none() {
                warn!("{} is already attached to {}, ignoring add", component, object);
                return Ok(());
            }
            // Its hooks can't run until the current one returns
            return Err(precondition_failed(CoreError::ComponentBusy(component)));
        }

        match current_owner {
            Some(owner) if owner == object => {
                warn!("{} is already attached to {}, ignoring add", component, object);
                return Ok(());
            }
            Some(previous) => {
                warn!("{} is owned by {}, moving it to {}", component, previous, object);
                self.remove_component(previous, component)?;

                // The detach hook ran arbitrary code
                if !self.components.contains(component) {
                    return Err(precondition_failed(CoreError::InvalidComponent(component)));
                }
                if !self.objects.contains(object) {
                    return Err(precondition_failed(CoreError::InvalidObject(object)));
                }
            }
            None => {}
        }

        if let Some(obj) = self.objects.get_mut(object) {
            obj.components.push(component);
        }
        self.attach_owner(component, object);
        Ok(())
    }

    /// Spawn `component` and attach it to `object` in one step.
    pub fn add_new_component<C: Component>(
        &mut self,
        object: ObjectId,
        component: C,
    ) -> Result<ComponentId> {
        if !self.objects.contains(object) {
            return Err(precondition_failed(CoreError::InvalidObject(object)));
        }
        let id = self.spawn_component(component);
        self.add_component(object, id)?;
        Ok(id)
    }

    /// Detach `component` from `object`. The component survives as a
    /// standalone component; the caller owns it from here on and must
    /// re-attach or destroy it.
    pub fn remove_component(&mut self, object: ObjectId, component: ComponentId) -> Result<()> {
        let Some(obj) = self.objects.get_mut(object) else {
            return Err(precondition_failed(CoreError::InvalidObject(object)));
        };
        if !obj.unlink(component) {
            warn!("{} is not attached to {}, ignoring remove", component, object);
            return Ok(());
        }
        self.detach_owner(component);
        Ok(())
    }

    /// First component of type `T`, in insertion order.
    pub fn get_component<T: Component>(&self, object: ObjectId) -> Option<ComponentId> {
        self.live_object(object)?
            .components
            .iter()
            .copied()
            .find(|&c| self.components.get(c).map_or(false, |slot| slot.is::<T>()))
    }

    /// Every component of type `T`, in insertion order.
    pub fn get_components_of_type<T: Component>(&self, object: ObjectId) -> Vec<ComponentId> {
        let Some(obj) = self.live_object(object) else {
            return Vec::new();
        };
        obj.components
            .iter()
            .copied()
            .filter(|&c| self.components.get(c).map_or(false, |slot| slot.is::<T>()))
            .collect()
    }

    pub fn has_component<T: Component>(&self, object: ObjectId) -> bool {
        self.get_component::<T>(object).is_some()
    }

    pub fn get_component_count(&self, object: ObjectId) -> usize {
        self.live_object(object).map_or(0, |obj| obj.component_count())
    }

    /// Detach every component of `object`, returning what was released.
    ///
    /// Walks a snapshot of the list, so `on_detached` hooks may add or remove
    /// siblings. The list is empty afterwards. Released components stay in
    /// the world until re-attached or destroyed.
    #[must_use = "released components stay alive until re-attached or destroyed"]
    pub fn remove_all_components(&mut self, object: ObjectId) -> Result<Vec<ComponentId>> {
        if !self.objects.contains(object) {
            return Err(precondition_failed(CoreError::InvalidObject(object)));
        }

        let mut released = Vec::new();
        for _ in 0..MAX_TEARDOWN_PASSES {
            let snapshot = match self.objects.get(object) {
                Some(obj) if !obj.components.is_empty() => obj.components.clone(),
                _ => break,
            };
            for component in snapshot {
                let unlinked = self
                    .objects
                    .get_mut(object)
                    .map_or(false, |obj| obj.unlink(component));
                if unlinked {
                    self.detach_owner(component);
                    released.push(component);
                }
            }
        }
        self.orphan_leftovers(object);
        Ok(released)
    }

    /// Dispatch `on_update` to each component in insertion order. Each
    /// component gates on its own enabled flag.
    pub fn update_object(&mut self, object: ObjectId, delta: f32) -> Result<()> {
        let Some(obj) = self.live_object(object) else {
            return Err(CoreError::InvalidObject(object));
        };
        let snapshot = obj.components.clone();
        for component in snapshot {
            // Removed or moved by an earlier hook this frame
            if self.owner(component) != Some(object) {
                continue;
            }
            // Already logged
            let _ = self.update_component(component, delta);
        }
        Ok(())
    }

    /// Per-frame entry point: update every live object in spawn order.
    ///
    /// Events accumulate across calls; the frame driver must call
    /// `clear_events` once it has observed them.
    pub fn update(&mut self, delta: f32) {
        let order = self.object_order.clone();
        for object in order {
            if self.objects.contains(object) {
                let _ = self.update_object(object, delta);
            }
        }
    }

    // =========================================================================
    // Owner Transitions
    // =========================================================================

    /// Owner set first, then `on_attached`.
    fn attach_owner(&mut self, component: ComponentId, object: ObjectId) {
        let Some(slot) = self.components.get_mut(component) else {
            return;
        };
        debug_assert!(slot.owner.is_none(), "attach over an existing owner");
        slot.owner = Some(object);
        self.events.attached.send(AttachEvent { component, object });
        debug!("{} attached to {}", component, object);

        self.call_hook(component, "on_attached", |c, ctx| c.on_attached(ctx, object));
    }

    /// `on_detached` first, while the owner is still visible, then the owner
    /// is cleared. A busy component finishes detaching when its running hook
    /// returns.
    fn detach_owner(&mut self, component: ComponentId) {
        let Some(slot) = self.components.get_mut(component) else {
            return;
        };
        let Some(object) = slot.owner else {
            return;
        };
        if slot.is_busy() {
            slot.pending_detach = Some(object);
            debug!("{} left {} during its own hook, deferring detach", component, object);
            return;
        }
        self.complete_detach(component, object);
    }

    fn complete_detach(&mut self, component: ComponentId, object: ObjectId) {
        self.call_hook(component, "on_detached", |c, ctx| c.on_detached(ctx));

        if let Some(slot) = self.components.get_mut(component) {
            slot.owner = None;
        }
        self.events.detached.send(AttachEvent { component, object });
        debug!("{} detached from {}", component, object);
    }

    /// Drop whatever is still listed after the teardown passes, without
    /// running hooks.
    fn orphan_leftovers(&mut self, object: ObjectId) {
        let Some(obj) = self.objects.get_mut(object) else {
            return;
        };
        let leftovers = std::mem::take(&mut obj.components);
        for component in leftovers {
            error!(
                "{} kept re-attaching to {} during teardown, dropping it without hooks",
                component, object
            );
            if let Some(slot) = self.components.get_mut(component) {
                slot.owner = None;
            }
        }
    }

    // =========================================================================
    // Hook Dispatch
    // =========================================================================

    /// Check the component's behavior out of its slot, run `hook` with full
    /// world access, and check it back in.
    pub(crate) fn run_hook<F>(&mut self, id: ComponentId, hook: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Component, &mut HookContext<'_>),
    {
        let Some(slot) = self.components.get_mut(id) else {
            return Err(CoreError::InvalidComponent(id));
        };
        let Some(mut behavior) = slot.behavior.take() else {
            return Err(CoreError::ComponentBusy(id));
        };

        {
            let mut ctx = HookContext::new(self, id);
            hook(&mut *behavior, &mut ctx);
        }

        match self.components.get_mut(id) {
            Some(slot) => slot.behavior = Some(behavior),
            None => {
                debug!("{} was freed while checked out", id);
                return Ok(());
            }
        }
        self.finish_deferred(id);
        Ok(())
    }

    /// Complete a detach or destroy requested while `id` was busy.
    fn finish_deferred(&mut self, id: ComponentId) {
        let Some(slot) = self.components.get_mut(id) else {
            return;
        };
        let detach = slot.pending_detach.take();
        let destroy = std::mem::take(&mut slot.pending_destroy);

        if let Some(object) = detach {
            self.complete_detach(id, object);
        }
        // on_detached may have destroyed it already
        if destroy && self.components.contains(id) {
            let _ = self.destroy_component(id);
        }
    }

    /// Lifecycle hooks are best effort: a vanished component just misses the
    /// call.
    fn call_hook<F>(&mut self, id: ComponentId, name: &str, hook: F)
    where
        F: FnOnce(&mut dyn Component, &mut HookContext<'_>),
    {
        match self.run_hook(id, hook) {
            Ok(()) | Err(CoreError::InvalidComponent(_)) => {}
            Err(err) => warn!("{} skipped for {}: {}", name, id, err),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Verify owner ↔ list consistency across the whole world.
    pub(crate) fn assert_ownership_consistent(world: &World) {
        for (object, obj) in world.objects() {
            let mut seen = Vec::new();
            for &c in obj.components() {
                assert!(!seen.contains(&c), "{} listed twice on {}", c, object);
                seen.push(c);
                assert_eq!(world.owner(c), Some(object), "{} owner mismatch", c);
            }
        }
        for (component, slot) in world.components.iter() {
            if let Some(owner) = slot.owner() {
                let obj = world.object(owner).expect("owner is alive");
                assert!(obj.contains(component), "{} missing from {}", component, owner);
            }
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every hook along with the owner visible at that moment.
    struct Recorder {
        label: &'static str,
        log: Log,
    }

    impl Recorder {
        fn new(label: &'static str, log: &Log) -> Self {
            Self { label, log: log.clone() }
        }
    }

    impl Component for Recorder {
        fn on_attached(&mut self, ctx: &mut HookContext<'_>, owner: ObjectId) {
            assert_eq!(ctx.owner(), Some(owner));
            let name = ctx.object(owner).map(|o| o.name().to_string()).unwrap_or_default();
            self.log.borrow_mut().push(format!("{}:attached:{}", self.label, name));
        }

        fn on_detached(&mut self, ctx: &mut HookContext<'_>) {
            let name = ctx
                .owner()
                .and_then(|o| ctx.object(o))
                .map(|o| o.name().to_string())
                .unwrap_or_else(|| "none".to_string());
            self.log.borrow_mut().push(format!("{}:detached:{}", self.label, name));
        }

        fn on_update(&mut self, _ctx: &mut HookContext<'_>, delta: f32) {
            self.log.borrow_mut().push(format!("{}:update:{}", self.label, delta));
        }
    }

    struct Other;
    impl Component for Other {}

    #[test]
    fn test_spawn_and_destroy_object() {
        let mut world = World::new();
        let a = world.spawn_object("a");
        let b = world.spawn_object("b");
        assert_eq!(world.object_count(), 2);

        world.destroy_object(a).unwrap();
        assert_eq!(world.object_count(), 1);
        assert!(!world.is_alive(a));
        assert!(world.is_alive(b));
        assert_eq!(world.events().object_destroyed.iter().copied().collect::<Vec<_>>(), vec![a]);
        assert!(world.destroy_object(a).is_err());
    }

    #[test]
    fn test_attach_detach_round_trip() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("hero");
        let recorder = world.spawn_component(Recorder::new("p", &log));
        assert_eq!(world.owner(recorder), None);

        world.add_component(obj, recorder).unwrap();
        assert_eq!(world.owner(recorder), Some(obj));
        assert_eq!(world.get_component::<Recorder>(obj), Some(recorder));

        world.remove_component(obj, recorder).unwrap();
        assert_eq!(world.owner(recorder), None);
        assert_eq!(world.get_component::<Recorder>(obj), None);
        assert_eq!(*log.borrow(), vec!["p:attached:hero", "p:detached:hero"]);
        assert_ownership_consistent(&world);
    }

    #[test]
    fn test_double_add_is_noop() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("hero");
        let recorder = world.spawn_component(Recorder::new("p", &log));

        world.add_component(obj, recorder).unwrap();
        world.add_component(obj, recorder).unwrap();
        assert_eq!(world.get_component_count(obj), 1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let log = Log::default();
        let mut world = World::new();
        let a = world.spawn_object("a");
        let b = world.spawn_object("b");
        let recorder = world.add_new_component(a, Recorder::new("p", &log)).unwrap();

        world.remove_component(b, recorder).unwrap();
        assert_eq!(world.owner(recorder), Some(a));
        assert_eq!(log.borrow().len(), 1);
        assert_ownership_consistent(&world);
    }

    #[test]
    fn test_ownership_transfer() {
        let log = Log::default();
        let mut world = World::new();
        let a = world.spawn_object("a");
        let b = world.spawn_object("b");
        let recorder = world.add_new_component(a, Recorder::new("p", &log)).unwrap();

        world.add_component(b, recorder).unwrap();

        assert_eq!(world.owner(recorder), Some(b));
        assert!(!world.has_component::<Recorder>(a));
        assert_eq!(world.get_component::<Recorder>(b), Some(recorder));
        // Detach saw the old owner, attach saw the new one
        assert_eq!(*log.borrow(), vec!["p:attached:a", "p:detached:a", "p:attached:b"]);
        assert_ownership_consistent(&world);
    }

    #[test]
    fn test_get_component_insertion_order() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("obj");
        let first = world.add_new_component(obj, Recorder::new("1", &log)).unwrap();
        let other = world.add_new_component(obj, Other).unwrap();
        let second = world.add_new_component(obj, Recorder::new("2", &log)).unwrap();

        assert_eq!(world.get_component::<Recorder>(obj), Some(first));
        assert_eq!(world.get_components_of_type::<Recorder>(obj), vec![first, second]);
        assert_eq!(world.get_components_of_type::<Other>(obj), vec![other]);
        assert_eq!(world.get_component_count(obj), 3);
        assert!(world.has_component::<Other>(obj));
        assert!(!world.has_component::<Transform>(obj));
    }

    #[test]
    fn test_update_respects_enabled() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("obj");
        let a = world.add_new_component(obj, Recorder::new("a", &log)).unwrap();
        world.add_new_component(obj, Recorder::new("b", &log)).unwrap();
        log.borrow_mut().clear();

        assert!(world.set_enabled(a, false).unwrap());
        world.update(0.5);
        assert_eq!(*log.borrow(), vec!["b:update:0.5"]);

        assert!(world.set_enabled(a, true).unwrap());
        world.update(1.0);
        assert_eq!(log.borrow()[1..], ["a:update:1", "b:update:1"]);
    }

    #[test]
    fn test_set_enabled_same_value_records_nothing() {
        let mut world = World::new();
        let c = world.spawn_component(Other);

        assert!(!world.set_enabled(c, true).unwrap());
        assert!(world.events().enabled_changed.is_empty());

        assert!(world.set_enabled(c, false).unwrap());
        assert!(!world.set_enabled(c, false).unwrap());
        assert_eq!(world.events().enabled_changed.len(), 1);
    }

    /// On detach, removes a sibling that comes later in the list.
    struct Meddler {
        victim: Option<ComponentId>,
    }

    impl Component for Meddler {
        fn on_detached(&mut self, ctx: &mut HookContext<'_>) {
            let owner = ctx.owner().unwrap();
            if let Some(victim) = self.victim.take() {
                ctx.remove_component(owner, victim).unwrap();
            }
        }
    }

    #[test]
    fn test_remove_all_tolerates_sibling_mutation() {
        let mut world = World::new();
        let obj = world.spawn_object("obj");
        let victim = world.spawn_component(Other);
        let meddler = world.add_new_component(obj, Meddler { victim: Some(victim) }).unwrap();
        world.add_component(obj, victim).unwrap();
        let last = world.add_new_component(obj, Other).unwrap();

        let released = world.remove_all_components(obj).unwrap();

        assert_eq!(released, vec![meddler, last]);
        assert_eq!(world.get_component_count(obj), 0);
        for c in [meddler, victim, last] {
            assert_eq!(world.owner(c), None);
        }
        assert_ownership_consistent(&world);
    }

    #[test]
    fn test_destroy_object_detaches_then_frees() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("doomed");
        let a = world.add_new_component(obj, Recorder::new("a", &log)).unwrap();
        let b = world.add_new_component(obj, Recorder::new("b", &log)).unwrap();

        world.destroy_object(obj).unwrap();

        assert_eq!(log.borrow()[2..], ["a:detached:doomed", "b:detached:doomed"]);
        assert!(world.component_slot(a).is_none());
        assert!(world.component_slot(b).is_none());
        assert_eq!(world.component_count(), 0);
        assert_eq!(world.events().component_destroyed.len(), 2);
    }

    /// Destroys its own owner on the first update.
    struct SelfDestruct {
        log: Log,
    }

    impl Component for SelfDestruct {
        fn on_update(&mut self, ctx: &mut HookContext<'_>, _delta: f32) {
            let owner = ctx.owner().unwrap();
            ctx.destroy_object(owner).unwrap();
        }

        fn on_detached(&mut self, ctx: &mut HookContext<'_>) {
            let alive = ctx.owner().map_or(false, |o| ctx.is_alive(o));
            self.log.borrow_mut().push(format!("bomb:detached:alive={}", alive));
        }
    }

    #[test]
    fn test_destroy_owner_from_own_hook() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("bomb");
        let bomb = world.add_new_component(obj, SelfDestruct { log: log.clone() }).unwrap();
        let recorder = world.add_new_component(obj, Recorder::new("p", &log)).unwrap();
        let bystander = world.spawn_object("bystander");

        world.update(0.1);

        assert!(!world.is_alive(obj));
        assert!(world.is_alive(bystander));
        assert!(world.component_slot(bomb).is_none());
        assert!(world.component_slot(recorder).is_none());
        // The recorder was detached, never updated; the bomb detached once its
        // update returned
        assert_eq!(log.borrow()[1..], ["p:detached:bomb", "bomb:detached:alive=false"]);
        let detached: Vec<_> = world.events().detached.iter().map(|e| e.component).collect();
        assert_eq!(detached, vec![recorder, bomb]);
        assert_eq!(world.events().component_destroyed.len(), 2);
    }

    /// Removes itself from its owner on the first update.
    struct Quitter {
        log: Log,
    }

    impl Component for Quitter {
        fn on_update(&mut self, ctx: &mut HookContext<'_>, _delta: f32) {
            let owner = ctx.owner().unwrap();
            let me = ctx.component();
            ctx.remove_component(owner, me).unwrap();
            assert_eq!(ctx.get_component_count(owner), 0);
            // Still reported until this hook returns
            assert_eq!(ctx.owner(), Some(owner));
            self.log.borrow_mut().push("q:update".to_string());
        }

        fn on_detached(&mut self, ctx: &mut HookContext<'_>) {
            let name = ctx
                .owner()
                .and_then(|o| ctx.object(o))
                .map(|o| o.name().to_string())
                .unwrap_or_else(|| "none".to_string());
            self.log.borrow_mut().push(format!("q:detached:{}", name));
        }
    }

    #[test]
    fn test_remove_self_from_own_update() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("desk");
        let quitter = world.add_new_component(obj, Quitter { log: log.clone() }).unwrap();

        world.update(0.1);

        assert_eq!(*log.borrow(), vec!["q:update", "q:detached:desk"]);
        assert_eq!(world.owner(quitter), None);
        assert_eq!(world.get_component_count(obj), 0);
        assert!(world.component_slot(quitter).is_some());
        assert_eq!(world.events().detached.len(), 1);
        assert_ownership_consistent(&world);

        // Standalone again, so it can be re-attached normally
        world.add_component(obj, quitter).unwrap();
        assert_eq!(world.owner(quitter), Some(obj));
    }

    /// Destroys itself from its own update.
    struct Vanish;

    impl Component for Vanish {
        fn on_update(&mut self, ctx: &mut HookContext<'_>, _delta: f32) {
            let me = ctx.component();
            ctx.destroy_component(me).unwrap();
        }
    }

    #[test]
    fn test_destroy_self_from_own_update() {
        let mut world = World::new();
        let obj = world.spawn_object("obj");
        let vanish = world.add_new_component(obj, Vanish).unwrap();

        world.update(0.1);

        assert!(world.component_slot(vanish).is_none());
        assert_eq!(world.get_component_count(obj), 0);
        assert_eq!(world.events().detached.len(), 1);
        assert_eq!(world.events().component_destroyed.len(), 1);
    }

    /// Tries to move itself to `home` when detached.
    struct Homer {
        home: ObjectId,
        log: Log,
    }

    impl Component for Homer {
        fn on_detached(&mut self, ctx: &mut HookContext<'_>) {
            let me = ctx.component();
            let result = ctx.add_component(self.home, me);
            let outcome = match result {
                Err(CoreError::ComponentBusy(_)) => "busy",
                Err(_) => "error",
                Ok(()) => "ok",
            };
            self.log.borrow_mut().push(format!("rehome:{}", outcome));
        }
    }

    #[test]
    fn test_attach_from_own_detach_hook_is_rejected() {
        let log = Log::default();
        let mut world = World::new();
        let a = world.spawn_object("a");
        let b = world.spawn_object("b");
        let home = world.spawn_object("home");
        let homer = world.add_new_component(a, Homer { home, log: log.clone() }).unwrap();

        world.add_component(b, homer).unwrap();

        assert_eq!(*log.borrow(), vec!["rehome:busy"]);
        assert_eq!(world.owner(homer), Some(b));
        assert_eq!(world.get_component_count(a), 0);
        assert_eq!(world.get_component_count(b), 1);
        assert_eq!(world.get_component_count(home), 0);
        assert_ownership_consistent(&world);
    }

    #[test]
    fn test_invalid_handles_are_rejected() {
        let mut world = World::new();
        let obj = world.spawn_object("obj");
        let c = world.spawn_component(Other);
        world.destroy_component(c).unwrap();

        assert!(matches!(world.add_component(obj, c), Err(CoreError::InvalidComponent(_))));
        assert!(matches!(world.set_enabled(c, false), Err(CoreError::InvalidComponent(_))));
        assert_eq!(world.owner(c), None);

        world.destroy_object(obj).unwrap();
        let fresh = world.spawn_component(Other);
        assert!(matches!(world.add_component(obj, fresh), Err(CoreError::InvalidObject(_))));
        assert_eq!(world.get_component::<Other>(obj), None);
        assert_eq!(world.get_component_count(obj), 0);
        assert_eq!(world.owner(fresh), None);
    }

    #[test]
    fn test_destroy_attached_component() {
        let log = Log::default();
        let mut world = World::new();
        let obj = world.spawn_object("obj");
        let recorder = world.add_new_component(obj, Recorder::new("p", &log)).unwrap();

        world.destroy_component(recorder).unwrap();

        assert_eq!(world.get_component_count(obj), 0);
        assert_eq!(log.borrow().last().unwrap(), "p:detached:obj");
        assert_ownership_consistent(&world);
    }

    #[test]
    fn test_find_object_and_spawn_order() {
        let mut world = World::new();
        let a = world.spawn_object("a");
        let b = world.spawn_object("b");
        world.destroy_object(a).unwrap();
        let c = world.spawn_object("c");

        assert_eq!(world.find_object("b"), Some(b));
        assert_eq!(world.find_object("a"), None);
        let order: Vec<_> = world.objects().map(|(id, _)| id).collect();
        assert_eq!(order, vec![b, c]);
    }
}
