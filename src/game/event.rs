//! Event System
//!
//! The world records lifecycle changes as events so observers (inspectors,
//! editors, gameplay glue) can react without holding strong references or
//! being called back synchronously.
//!
//! Example flow:
//! 1. A component's hook destroys its owner → `object_destroyed` event
//! 2. The inspector reads the event → drops its selection
//! 3. The frame driver clears all queues at end of frame

use super::entity::{ComponentId, ObjectId};

/// A queue for events of a single type.
/// Events are collected during the frame and cleared by the frame driver.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all lifecycle events.
#[derive(Debug, Default)]
pub struct Events {
    /// Component joined an object
    pub attached: EventQueue<AttachEvent>,

    /// Component left an object
    pub detached: EventQueue<AttachEvent>,

    /// Enabled flag actually changed
    pub enabled_changed: EventQueue<EnabledEvent>,

    /// Transform got a new parent (or lost one)
    pub reparented: EventQueue<ReparentEvent>,

    /// Game object destroyed; its handle is now stale
    pub object_destroyed: EventQueue<ObjectId>,

    /// Component destroyed; its handle is now stale
    pub component_destroyed: EventQueue<ComponentId>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all event queues. Call at end of frame.
    pub fn clear_all(&mut self) {
        self.attached.clear();
        self.detached.clear();
        self.enabled_changed.clear();
        self.reparented.clear();
        self.object_destroyed.clear();
        self.component_destroyed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
            && self.detached.is_empty()
            && self.enabled_changed.is_empty()
            && self.reparented.is_empty()
            && self.object_destroyed.is_empty()
            && self.component_destroyed.is_empty()
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// A component was attached to, or detached from, an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachEvent {
    pub component: ComponentId,
    pub object: ObjectId,
}

/// A component's enabled flag flipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledEvent {
    pub component: ComponentId,
    pub enabled: bool,
}

/// A transform's parent link changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparentEvent {
    pub child: ComponentId,
    pub old_parent: Option<ComponentId>,
    pub new_parent: Option<ComponentId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Handle;

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();

        queue.send(1);
        queue.send(2);
        queue.send(3);

        assert_eq!(queue.len(), 3);

        let collected: Vec<_> = queue.iter().copied().collect();
        assert_eq!(collected, vec![1, 2, 3]);

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_container() {
        let mut events = Events::new();

        events.object_destroyed.send(ObjectId::from_raw(4, 2));
        events.enabled_changed.send(EnabledEvent {
            component: ComponentId::from_raw(1, 0),
            enabled: false,
        });

        assert_eq!(events.object_destroyed.len(), 1);
        assert!(!events.is_empty());

        events.clear_all();
        assert!(events.is_empty());
    }
}
