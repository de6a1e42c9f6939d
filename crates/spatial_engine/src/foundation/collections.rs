//! Specialized collection types

use std::cell::{Cell, RefCell};
use std::ops::{Deref, DerefMut};

pub use slotmap::{new_key_type, SlotMap};

/// Pool of reusable scratch vectors.
///
/// Queries run many times per entity per tick, so iterators borrow their
/// working lists from a pool owned by the structure they iterate instead of
/// allocating. A borrowed list goes back to the pool when its
/// [`PooledVec`] guard is dropped, on every exit path.
#[derive(Debug)]
pub struct ScratchPool<T> {
    free: RefCell<Vec<Vec<T>>>,
    outstanding: Cell<usize>,
}

impl<T> ScratchPool<T> {
    /// Create an empty pool
    pub const fn new() -> Self {
        Self {
            free: RefCell::new(Vec::new()),
            outstanding: Cell::new(0),
        }
    }

    /// Borrow an empty list from the pool
    pub fn acquire(&self) -> PooledVec<'_, T> {
        let list = self.free.borrow_mut().pop().unwrap_or_default();
        self.outstanding.set(self.outstanding.get() + 1);
        PooledVec { pool: self, list }
    }

    /// Number of lists currently borrowed
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    /// Number of lists waiting in the pool
    pub fn available(&self) -> usize {
        self.free.borrow().len()
    }

    fn release(&self, mut list: Vec<T>) {
        list.clear();
        self.free.borrow_mut().push(list);
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
    }
}

impl<T> Default for ScratchPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A list on loan from a [`ScratchPool`]
#[derive(Debug)]
pub struct PooledVec<'a, T> {
    pool: &'a ScratchPool<T>,
    list: Vec<T>,
}

impl<T> Deref for PooledVec<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl<T> DerefMut for PooledVec<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.list
    }
}

impl<T> Drop for PooledVec<'_, T> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.list));
    }
}
