//! Handles with Generational Indices
//!
//! Game objects and components are referenced by lightweight handles rather
//! than pointers. Every relationship in the core (component owner, transform
//! parent, transform children) is one of these handles, so none of them keep
//! anything alive.
//!
//! The generational index pattern prevents dangling references:
//! - Each slot has a generation counter
//! - When a slot is freed, its generation is bumped
//! - A handle minted before the free no longer matches the slot

use std::fmt;
use serde::{Serialize, Deserialize};

/// Common surface of the typed handles.
pub trait Handle: Copy + Eq + fmt::Debug {
    /// Build a handle from raw parts. Should only be called by allocators.
    fn from_raw(index: u32, generation: u32) -> Self;
    fn index(&self) -> u32;
    fn generation(&self) -> u32;
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl Handle for $name {
            fn from_raw(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            fn index(&self) -> u32 {
                self.index
            }

            fn generation(&self) -> u32 {
                self.generation
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}v{}", $label, self.index, self.generation)
            }
        }
    };
}

define_handle!(
    /// Identifies a game object in a [`World`](super::World).
    ObjectId,
    "object"
);

define_handle!(
    /// Identifies a component in a [`World`](super::World), attached or not.
    ComponentId,
    "component"
);

/// Allocates and tracks slot lifetimes.
///
/// Manages a pool of slots, reusing freed slots with incremented
/// generations to prevent dangling references.
#[derive(Debug)]
pub struct SlotAllocator {
    /// Generation counter for each slot
    generations: Vec<u32>,
    /// Whether each slot is currently handed out
    occupied: Vec<bool>,
    /// Free slots available for reuse (LIFO for cache friendliness)
    free_indices: Vec<u32>,
    /// Number of currently alive slots
    alive_count: u32,
}

impl SlotAllocator {
    /// Create a new allocator with no slots.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new allocator with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            occupied: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            alive_count: 0,
        }
    }

    /// Allocate a new slot.
    pub fn allocate<H: Handle>(&mut self) -> H {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already bumped on free
            self.occupied[index as usize] = true;
            H::from_raw(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.occupied.push(true);
            H::from_raw(index, 0)
        }
    }

    /// Free a slot, making it available for reuse.
    /// Returns true if the handle was alive and is now freed.
    pub fn free<H: Handle>(&mut self, handle: H) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        let idx = handle.index() as usize;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.occupied[idx] = false;
        self.free_indices.push(handle.index());
        self.alive_count -= 1;
        true
    }

    /// Check if a handle still refers to a live slot.
    pub fn is_alive<H: Handle>(&self, handle: H) -> bool {
        let idx = handle.index() as usize;
        idx < self.generations.len()
            && self.occupied[idx]
            && self.generations[idx] == handle.generation()
    }

    /// The live handle currently occupying `index`, if any.
    pub fn handle_at<H: Handle>(&self, index: u32) -> Option<H> {
        let idx = index as usize;
        if idx < self.occupied.len() && self.occupied[idx] {
            Some(H::from_raw(index, self.generations[idx]))
        } else {
            None
        }
    }

    /// Get the number of currently alive slots.
    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let mut alloc = SlotAllocator::new();

        let a: ObjectId = alloc.allocate();
        let b: ObjectId = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        assert!(alloc.is_alive(a));
        assert!(alloc.is_alive(b));

        assert!(alloc.free(a));
        assert_eq!(alloc.alive_count(), 1);
        assert!(!alloc.is_alive(a));
        assert!(alloc.is_alive(b));
        assert!(!alloc.free(a));
    }

    #[test]
    fn test_generation_prevents_reuse_collision() {
        let mut alloc = SlotAllocator::new();

        let first: ComponentId = alloc.allocate();
        alloc.free(first);

        let second: ComponentId = alloc.allocate();
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());

        assert!(!alloc.is_alive(first));
        assert!(alloc.is_alive(second));
    }

    #[test]
    fn test_freed_slot_is_not_alive_for_next_generation() {
        let mut alloc = SlotAllocator::new();
        let h: ObjectId = alloc.allocate();
        alloc.free(h);

        // Matches the bumped generation, but the slot is empty
        let guess = ObjectId::from_raw(h.index(), h.generation() + 1);
        assert!(!alloc.is_alive(guess));
        assert_eq!(alloc.handle_at::<ObjectId>(h.index()), None);
    }

    #[test]
    fn test_display() {
        let h = ComponentId::from_raw(3, 1);
        assert_eq!(h.to_string(), "component#3v1");
    }
}
