//! Slot Storage
//!
//! `Pool<H, T>` pairs a [`SlotAllocator`] with a sparse array of values,
//! indexed by the handle's slot index. Every access validates the handle's
//! generation first, so a stale handle reads as "not there" instead of
//! aliasing whatever reused the slot.

use std::marker::PhantomData;

use super::entity::{Handle, SlotAllocator};

/// Sparse, generation-checked storage for one kind of value.
pub struct Pool<H, T> {
    allocator: SlotAllocator,
    /// Sparse array indexed by handle.index()
    data: Vec<Option<T>>,
    _handle: PhantomData<H>,
}

impl<H: Handle, T> Pool<H, T> {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create storage with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            allocator: SlotAllocator::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
            _handle: PhantomData,
        }
    }

    /// Store a value in a fresh slot and return its handle.
    pub fn insert(&mut self, value: T) -> H {
        let handle: H = self.allocator.allocate();
        let idx = handle.index() as usize;
        if idx >= self.data.len() {
            self.data.resize_with(idx + 1, || None);
        }
        self.data[idx] = Some(value);
        handle
    }

    /// Remove a value, freeing its slot.
    /// Returns the removed value if the handle was alive.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        if !self.allocator.free(handle) {
            return None;
        }
        self.data[handle.index() as usize].take()
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        if !self.allocator.is_alive(handle) {
            return None;
        }
        self.data.get(handle.index() as usize).and_then(|opt| opt.as_ref())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        if !self.allocator.is_alive(handle) {
            return None;
        }
        self.data.get_mut(handle.index() as usize).and_then(|opt| opt.as_mut())
    }

    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Iterate over all live (handle, value) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.data.iter().enumerate().filter_map(move |(idx, opt)| {
            let value = opt.as_ref()?;
            let handle = self.allocator.handle_at(idx as u32)?;
            Some((handle, value))
        })
    }

    /// Snapshot of every live handle, in slot order.
    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.allocator.alive_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H: Handle, T> Default for Pool<H, T> {
    fn default() -> Self {
        Self::new()
    }
}
