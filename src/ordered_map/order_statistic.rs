use core::ops::{Index, IndexMut};

use super::OrderedMap;
use crate::Rank;
use crate::compare::Compare;

impl<K, V, C> OrderedMap<K, V, C> {
    /// Returns the entry at position `rank` in ascending key order.
    ///
    /// The rank is zero-based. Returns `None` if `rank >= len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert("a", 10).unwrap();
    /// map.insert("c", 30).unwrap();
    /// map.insert("b", 20).unwrap();
    ///
    /// assert_eq!(map.select(1), Some((&"b", &20)));
    /// assert!(map.select(3).is_none());
    /// ```
    #[must_use]
    pub fn select(&self, rank: usize) -> Option<(&K, &V)> {
        self.raw.select(rank).map(|h| self.raw.entry(h))
    }

    /// Returns the key and a mutable reference to the value at position `rank`.
    ///
    /// The key stays shared because changing it could break the ordering.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(10, "a").unwrap();
    /// map.insert(5, "b").unwrap();
    ///
    /// if let Some((key, value)) = map.select_mut(0) {
    ///     assert_eq!(*key, 5);
    ///     *value = "updated";
    /// }
    /// assert_eq!(map.get(&5), Some(&"updated"));
    /// ```
    #[must_use]
    pub fn select_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let handle = self.raw.select(rank)?;
        Some(self.raw.entry_mut(handle))
    }
}

impl<K, V, C: Compare<K>> OrderedMap<K, V, C> {
    /// Returns the zero-based rank of `key`, or `None` if it is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let map = OrderedMap::from_sorted(vec![(10, ()), (20, ())]).unwrap();
    /// assert_eq!(map.rank_of(&20), Some(1));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        self.raw.rank_of(key)
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// ```
/// use indexed_store::{OrderedMap, Rank};
///
/// let map = OrderedMap::from_sorted(vec![("a", 1), ("b", 2)]).unwrap();
/// assert_eq!(map[Rank(1)], 2);
/// ```
impl<K, V, C> Index<Rank> for OrderedMap<K, V, C> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select(rank.0).map(|(_, v)| v).expect("rank out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<K, V, C> IndexMut<Rank> for OrderedMap<K, V, C> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.select_mut(rank.0).map(|(_, v)| v).expect("rank out of bounds")
    }
}
