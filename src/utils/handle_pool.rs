use std::cmp::Ordering;
use std::collections::binary_heap::BinaryHeap;
use std::marker::PhantomData;

use super::handle::{HandleIndex, HandleLike};

#[derive(PartialEq, Eq)]
struct InverseHandleIndex(HandleIndex);

impl PartialOrd for InverseHandleIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InverseHandleIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

/// `HandlePool` manages the manipulations of a `Handle` collection, which are
/// created with a continuous `index` field. It also have the ability to find
/// out the current status of a specified `Handle`.
///
/// Versions are odd while a handle is alive and even once it has been freed,
/// so a freed handle never compares equal to the one that recycles its index.
pub struct HandlePool<H: HandleLike> {
    versions: Vec<HandleIndex>,
    frees: BinaryHeap<InverseHandleIndex>,
    _phantom: PhantomData<H>,
}

impl<H: HandleLike> Default for HandlePool<H> {
    fn default() -> Self {
        HandlePool::new()
    }
}

impl<H: HandleLike> HandlePool<H> {
    /// Constructs a new, empty `HandlePool`.
    pub fn new() -> Self {
        HandlePool {
            versions: Vec::new(),
            frees: BinaryHeap::new(),
            _phantom: PhantomData,
        }
    }

    /// Creates a unused `Handle`.
    pub fn create(&mut self) -> H {
        if let Some(InverseHandleIndex(index)) = self.frees.pop() {
            // If we have available free slots.
            let v = &mut self.versions[index as usize];
            *v += 1;
            H::new(index, *v)
        } else {
            // Or we just spawn a new index and corresponding version.
            self.versions.push(1);
            H::new(self.versions.len() as HandleIndex - 1, 1)
        }
    }

    /// Returns true if this `Handle` was created by `HandlePool`, and has not been
    /// freed yet.
    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        let index = handle.index() as usize;
        self.is_alive_at(index) && (self.versions[index] == handle.version())
    }

    #[inline]
    fn is_alive_at(&self, index: usize) -> bool {
        (index < self.versions.len()) && ((self.versions[index] & 0x1) == 1)
    }

    /// Recycles the `Handle` index, and mark its version as dead. Returns false
    /// if the handle is not alive.
    pub fn free(&mut self, handle: H) -> bool {
        if !self.contains(handle) {
            return false;
        }

        let index = handle.index() as usize;
        self.versions[index] += 1;

        // A slot whose version counter is about to wrap is retired for good.
        if self.versions[index] < HandleIndex::max_value() - 1 {
            self.frees.push(InverseHandleIndex(handle.index()));
        }

        true
    }

    /// Returns the total number of alive handle in this `HandlePool`.
    #[inline]
    pub fn len(&self) -> usize {
        self.versions.iter().filter(|v| (*v & 0x1) == 1).count()
    }

    /// Checks if the pool is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the alive handles of this `HandlePool`.
    #[inline]
    pub fn iter(&self) -> Iter<H> {
        Iter {
            versions: &self.versions,
            index: 0,
            _phantom: PhantomData,
        }
    }
}

/// Immutable `HandlePool` iterator, this struct is created by `iter` method on `HandlePool`.
pub struct Iter<'a, H: HandleLike> {
    versions: &'a [HandleIndex],
    index: usize,
    _phantom: PhantomData<H>,
}

impl<'a, H: HandleLike> Iterator for Iter<'a, H> {
    type Item = H;

    fn next(&mut self) -> Option<H> {
        while self.index < self.versions.len() {
            let i = self.index;
            self.index += 1;

            let v = self.versions[i];
            if v & 0x1 == 1 {
                return Some(H::new(i as HandleIndex, v));
            }
        }

        None
    }
}

#[cfg(test)]
mod test {
    use super::super::handle::Handle;
    use super::*;

    #[test]
    fn basic() {
        let mut pool: HandlePool<Handle> = HandlePool::new();
        assert!(pool.is_empty());

        let e1 = pool.create();
        assert!(e1.is_valid());
        assert!(pool.contains(e1));
        assert_eq!(pool.len(), 1);

        assert!(pool.free(e1));
        assert!(!pool.contains(e1));
        assert!(!pool.free(e1));
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn index_reuse_bumps_version() {
        let mut pool: HandlePool<Handle> = HandlePool::new();

        let v: Vec<Handle> = (0..10).map(|_| pool.create()).collect();
        for e in &v {
            pool.free(*e);
        }

        for _ in 0..10 {
            let e = pool.create();
            let old = v[e.index() as usize];
            assert!(old.version() != e.version());
            assert!(!pool.contains(old));
            assert!(pool.contains(e));
        }
    }

    #[test]
    fn reuse_lowest_index_first() {
        let mut pool: HandlePool<Handle> = HandlePool::new();
        let v: Vec<Handle> = (0..5).map(|_| pool.create()).collect();

        pool.free(v[3]);
        pool.free(v[1]);

        assert_eq!(pool.create().index(), 1);
        assert_eq!(pool.create().index(), 3);
        assert_eq!(pool.create().index(), 5);
    }

    #[test]
    fn iter() {
        let mut pool: HandlePool<Handle> = HandlePool::new();
        let v: Vec<Handle> = (0..6).map(|_| pool.create()).collect();
        pool.free(v[0]);
        pool.free(v[4]);

        let alive: Vec<Handle> = pool.iter().collect();
        assert_eq!(alive, vec![v[1], v[2], v[3], v[5]]);
    }
}
