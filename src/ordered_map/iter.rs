use core::iter::FusedIterator;

use crate::raw::{Handle, RawAvlMap};

/// An iterator over the entries of an [`OrderedMap`](super::OrderedMap), in
/// ascending key order.
///
/// Created by [`OrderedMap::iter`](super::OrderedMap::iter).
///
/// ```
/// use indexed_store::OrderedMap;
///
/// let map = OrderedMap::from_sorted(vec![(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &'a')));
/// assert_eq!(iter.next_back(), Some((&3, &'c')));
/// assert_eq!(iter.len(), 1);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C> {
    tree: &'a RawAvlMap<K, V, C>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a, K, V, C> Iter<'a, K, V, C> {
    pub(super) fn new(tree: &'a RawAvlMap<K, V, C>) -> Self {
        Iter {
            tree,
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
        }
    }
}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        self.front = self.tree.successor(handle);
        Some(self.tree.entry(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> DoubleEndedIterator for Iter<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        self.back = self.tree.predecessor(handle);
        Some(self.tree.entry(handle))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

/// An iterator over the keys of an [`OrderedMap`](super::OrderedMap), in ascending order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, C> {
    pub(super) inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Keys<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Keys<'_, K, V, C> {}

/// An iterator over the values of an [`OrderedMap`](super::OrderedMap), in key order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, C> {
    pub(super) inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Values<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::OrderedMap;
    use alloc::vec::Vec;

    #[test]
    fn front_and_back_meet_without_overlap() {
        let map = OrderedMap::from_sorted((0..5).map(|i| (i, i)).collect()).unwrap();
        let mut iter = map.keys();
        let mut seen = Vec::new();
        while let Some(front) = iter.next() {
            seen.push(*front);
            if let Some(back) = iter.next_back() {
                seen.push(*back);
            }
        }
        assert_eq!(seen, [0, 4, 1, 3, 2]);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn empty_map_iterates_nothing() {
        let map: OrderedMap<u8, u8> = OrderedMap::new();
        assert_eq!(map.iter().len(), 0);
        assert_eq!(map.values().next_back(), None);
    }
}
