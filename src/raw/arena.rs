use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage with a free list. Handles stay valid until their slot is taken.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes room for `additional` more elements so that the next `additional`
    /// calls to [`alloc`](Self::alloc) cannot reallocate.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let fresh = additional.saturating_sub(self.free.len());
        self.slots.try_reserve(fresh)
    }

    /// Makes room for `total` elements counted from an empty arena, i.e. for a
    /// rebuild after [`clear`](Self::clear).
    pub(crate) fn try_reserve_total(&mut self, total: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(total.saturating_sub(self.slots.len()))
    }

    /// Stores `element`, reusing a freed slot when one is available.
    ///
    /// Fails without side effects when a fresh slot cannot be allocated.
    pub(crate) fn try_alloc(&mut self, element: T) -> Result<Handle, TryReserveError> {
        if self.free.is_empty() {
            self.slots.try_reserve(1)?;
        }
        Ok(self.alloc(element))
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            // Strict less-than keeps the live count within Handle::MAX.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Borrows two distinct live slots mutably at once.
    pub(crate) fn get_pair_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        let (ia, ib) = (a.to_index(), b.to_index());
        assert_ne!(ia, ib, "`Arena::get_pair_mut()` - handles alias the same slot!");
        let (low, high) = if ia < ib { (ia, ib) } else { (ib, ia) };
        let (head, tail) = self.slots.split_at_mut(high);
        let first = head[low].as_mut().expect("`Arena::get_pair_mut()` - `handle` is invalid!");
        let second = tail[0].as_mut().expect("`Arena::get_pair_mut()` - `handle` is invalid!");
        if ia < ib { (first, second) } else { (second, first) }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.slots.get(handle.to_index()).is_some_and(Option::is_some)
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    /// Takes an element out without recycling its slot. Only for emptying the
    /// arena ahead of [`clear`](Self::clear); never allocates.
    pub(crate) fn vacate(&mut self, handle: Handle) -> T {
        self.slots[handle.to_index()].take().expect("`Arena::vacate()` - `handle` is invalid!")
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn arena_capacity() {
        let arena: Arena<u32> = Arena::with_capacity(10);
        assert_eq!(arena.capacity(), 10);
    }

    #[test]
    fn reserve_then_alloc_does_not_grow() {
        let mut arena: Arena<u32> = Arena::new();
        arena.try_reserve(8).unwrap();
        let capacity = arena.capacity();
        for value in 0..8 {
            arena.alloc(value);
        }
        assert_eq!(arena.capacity(), capacity);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.try_alloc(1).unwrap();
        let _b = arena.try_alloc(2).unwrap();
        assert_eq!(arena.take(a), 1);
        assert!(!arena.contains(a));
        let c = arena.try_alloc(3).unwrap();
        assert_eq!(a, c);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn vacate_leaves_the_free_list_alone() {
        let mut arena: Arena<u32> = Arena::new();
        let handles: Vec<_> = (0..4).map(|v| arena.alloc(v)).collect();
        let capacity = arena.capacity();
        let values: Vec<_> = handles.into_iter().rev().map(|h| arena.vacate(h)).collect();
        assert_eq!(values, [3, 2, 1, 0]);
        assert!(arena.free.is_empty());
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), capacity);
    }

    #[test]
    fn pair_borrow_is_ordered_by_argument() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(10);
        let b = arena.alloc(20);
        let (x, y) = arena.get_pair_mut(b, a);
        assert_eq!((*x, *y), (20, 10));
        core::mem::swap(x, y);
        assert_eq!(*arena.get(a), 20);
        assert_eq!(*arena.get(b), 10);
    }

    #[test]
    #[should_panic(expected = "handles alias the same slot")]
    fn pair_borrow_rejects_aliasing() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(10);
        let _ = arena.get_pair_mut(a, a);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.try_alloc(value).unwrap();
                        model.push((handle, value));
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        *arena.get_mut(model[index].0) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        let value = arena.take(model[index].0);
                        let (_, expected) = model.swap_remove(index);
                        prop_assert_eq!(value, expected);
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                prop_assert_eq!(arena.is_empty(), model.is_empty());
                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            8 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
