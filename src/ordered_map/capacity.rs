use super::OrderedMap;
use crate::compare::Natural;
use crate::error::Error;
use crate::raw::RawAvlMap;

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries.
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let map: OrderedMap<i32, i32> = OrderedMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            raw: RawAvlMap::with_capacity(capacity, Natural),
        }
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Returns how many entries the map can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Makes room for `additional` more entries.
    ///
    /// After a successful reserve, that many [`insert`](Self::insert) calls
    /// cannot fail with [`Error::Alloc`].
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the allocation fails; the map is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.raw.try_reserve(additional)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn reserved_inserts_do_not_grow() {
        let mut map = OrderedMap::new();
        map.try_reserve(16).unwrap();
        let capacity = map.capacity();
        for key in 0..16 {
            map.insert(key, ()).unwrap();
        }
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn absurd_reserve_reports_alloc_error() {
        let mut map: OrderedMap<u64, u64> = OrderedMap::new();
        assert!(matches!(map.try_reserve(usize::MAX), Err(Error::Alloc(_))));
        assert!(map.is_empty());
    }
}
