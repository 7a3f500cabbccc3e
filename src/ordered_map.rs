use core::fmt;
use core::ops::Index;

use alloc::vec::Vec;

use crate::compare::{Compare, Natural};
use crate::error::Error;
use crate::raw::RawAvlMap;

mod capacity;
mod iter;
mod order_statistic;

pub use crate::Rank;
pub use iter::{Iter, Keys, Values};

/// An ordered map based on an [AVL tree] augmented with subtree sizes.
///
/// Keys are unique under the map's comparator `C`, which defaults to the keys'
/// [`Ord`] implementation ([`Natural`]). Supplying a different [`Compare`]
/// strategy lets one map type index the same records under several orderings.
///
/// Besides exact lookup the map answers successor and predecessor queries
/// ([`next`](Self::next), [`previous`](Self::previous),
/// [`eq_or_greater`](Self::eq_or_greater)) and order-statistic queries
/// ([`select`](Self::select), [`rank_of`](Self::rank_of)) in O(log n).
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key changes while it is in the map.
///
/// # Examples
///
/// ```
/// use indexed_store::{Error, OrderedMap};
///
/// let mut map = OrderedMap::new();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     map.insert(key, key * 10).unwrap();
/// }
///
/// assert_eq!(map.get(&4), Some(&40));
/// assert_eq!(map.insert(4, 0), Err(Error::KeyExists));
///
/// // Neighbours in key order.
/// assert_eq!(map.next(&5), Ok(Some((&7, &70))));
/// assert_eq!(map.previous(&1), Ok(None));
/// assert_eq!(map.next(&6), Err(Error::KeyDoesNotExist));
///
/// // Order statistics.
/// assert_eq!(map.select(0), Some((&1, &10)));
/// assert_eq!(map.select(6), Some((&9, &90)));
/// assert_eq!(map.rank_of(&7), Some(4));
///
/// assert_eq!(map.remove(&5), Ok(50));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 7, 8, 9]);
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct OrderedMap<K, V, C = Natural> {
    raw: RawAvlMap<K, V, C>,
}

impl<K, V> OrderedMap<K, V> {
    /// Makes a new, empty map ordered by `K: Ord`.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        OrderedMap {
            raw: RawAvlMap::new(Natural),
        }
    }

    /// Builds a map from entries already sorted in ascending key order.
    ///
    /// The tree is assembled bottom-up by splitting at the midpoint, so it is
    /// balanced without any rotations. O(n).
    ///
    /// # Errors
    ///
    /// [`Error::KeyExists`] if two adjacent keys are equal, [`Error::NotSorted`]
    /// if the entries are out of order, [`Error::Alloc`] if the nodes cannot be
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::{Error, OrderedMap};
    ///
    /// let map = OrderedMap::from_sorted(vec![(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();
    /// assert_eq!(map.height(), 1);
    /// assert_eq!(map.select(1), Some((&2, &'b')));
    ///
    /// assert_eq!(OrderedMap::from_sorted(vec![(2, 'b'), (1, 'a')]).err(), Some(Error::NotSorted));
    /// ```
    pub fn from_sorted(entries: Vec<(K, V)>) -> Result<Self, Error>
    where
        K: Ord,
    {
        Self::from_sorted_with(entries, Natural)
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Makes a new, empty map ordered by `cmp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::{OrderedMap, Reverse};
    ///
    /// let mut map = OrderedMap::with_comparator(Reverse);
    /// map.insert(1, "a").unwrap();
    /// map.insert(2, "b").unwrap();
    /// assert_eq!(map.first(), Some((&2, &"b")));
    /// ```
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        OrderedMap {
            raw: RawAvlMap::new(cmp),
        }
    }

    /// Returns the comparator ordering this map.
    #[must_use]
    pub fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Height of the underlying tree: -1 when empty, 0 for a single entry.
    ///
    /// Always at most `1.44 * log2(len + 2)`.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.raw.height()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Removes every entry and hands them back in ascending key order.
    ///
    /// This is how a map releases ownership of its values to the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(2, 'b').unwrap();
    /// map.insert(1, 'a').unwrap();
    /// assert_eq!(map.drain_to_vec(), [(1, 'a'), (2, 'b')]);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        self.raw.drain_to_vec()
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|h| self.raw.entry(h))
    }

    /// Returns the entry with the largest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.last(), None);
    /// map.insert(3, "c").unwrap();
    /// map.insert(9, "i").unwrap();
    /// assert_eq!(map.last(), Some((&9, &"i")));
    /// ```
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|h| self.raw.entry(h))
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(&self.raw)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in key order.
    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { inner: self.iter() }
    }

    /// Writes clones of the values into `output` in ascending key order and
    /// returns how many were written.
    ///
    /// # Panics
    ///
    /// Panics if `output` is shorter than [`len`](Self::len).
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// for key in [5, 3, 8] {
    ///     map.insert(key, key * 2).unwrap();
    /// }
    /// let mut buffer = [0; 3];
    /// assert_eq!(map.array_in_order(&mut buffer), 3);
    /// assert_eq!(buffer, [6, 10, 16]);
    /// ```
    pub fn array_in_order(&self, output: &mut [V]) -> usize
    where
        V: Clone,
    {
        let len = self.len();
        assert!(output.len() >= len, "`array_in_order()` - buffer holds {} of {len} values", output.len());
        for (slot, value) in output.iter_mut().zip(self.values()) {
            slot.clone_from(value);
        }
        len
    }

    /// Collects clones of the values in ascending key order.
    ///
    /// Fails with [`Error::Alloc`] if the output buffer cannot be allocated.
    pub fn to_sorted_vec(&self) -> Result<Vec<V>, Error>
    where
        V: Clone,
    {
        let mut output = Vec::new();
        output.try_reserve_exact(self.len())?;
        output.extend(self.values().cloned());
        Ok(output)
    }
}

impl<K, V, C: Compare<K>> OrderedMap<K, V, C> {
    /// Like [`from_sorted`](OrderedMap::from_sorted), ordered by `cmp`.
    pub fn from_sorted_with(entries: Vec<(K, V)>, cmp: C) -> Result<Self, Error> {
        let mut raw = RawAvlMap::new(cmp);
        raw.rebuild_from_sorted(entries)?;
        tracing::trace!(len = raw.len(), height = raw.height(), "built ordered map from sorted entries");
        Ok(OrderedMap { raw })
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.raw.search(key).map(|h| self.raw.entry(h).1)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let handle = self.raw.search(key)?;
        Some(self.raw.entry_mut(handle).1)
    }

    /// Returns the stored key and its value.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.raw.search(key).map(|h| self.raw.entry(h))
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.search(key).is_some()
    }

    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// [`Error::KeyExists`] if the key is already present, [`Error::Alloc`] if
    /// no node could be allocated. The map is unchanged on error and the
    /// rejected key and value are dropped.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), Error> {
        self.raw.insert(key, value).map(|_| ())
    }

    /// Removes a key from the map, returning its value.
    ///
    /// # Errors
    ///
    /// [`Error::KeyDoesNotExist`] if the key is absent.
    pub fn remove(&mut self, key: &K) -> Result<V, Error> {
        self.raw.remove(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value.
    ///
    /// # Errors
    ///
    /// [`Error::KeyDoesNotExist`] if the key is absent.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V), Error> {
        self.raw.remove(key)
    }

    /// Returns the entry that follows `key` in key order, or `None` if `key` is
    /// the largest.
    ///
    /// # Errors
    ///
    /// [`Error::KeyDoesNotExist`] if `key` is not in the map.
    pub fn next(&self, key: &K) -> Result<Option<(&K, &V)>, Error> {
        let handle = self.raw.search(key).ok_or(Error::KeyDoesNotExist)?;
        Ok(self.raw.successor(handle).map(|h| self.raw.entry(h)))
    }

    /// Returns the entry that precedes `key` in key order, or `None` if `key`
    /// is the smallest.
    ///
    /// # Errors
    ///
    /// [`Error::KeyDoesNotExist`] if `key` is not in the map.
    pub fn previous(&self, key: &K) -> Result<Option<(&K, &V)>, Error> {
        let handle = self.raw.search(key).ok_or(Error::KeyDoesNotExist)?;
        Ok(self.raw.predecessor(handle).map(|h| self.raw.entry(h)))
    }

    /// Returns the entry for `key` if present, otherwise the entry with the
    /// smallest key greater than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// for key in [10, 20, 30] {
    ///     map.insert(key, ()).unwrap();
    /// }
    /// assert_eq!(map.eq_or_greater(&20).map(|(k, _)| *k), Some(20));
    /// assert_eq!(map.eq_or_greater(&21).map(|(k, _)| *k), Some(30));
    /// assert_eq!(map.eq_or_greater(&31), None);
    /// ```
    #[must_use]
    pub fn eq_or_greater(&self, key: &K) -> Option<(&K, &V)> {
        self.raw.eq_or_greater(key).map(|h| self.raw.entry(h))
    }

    /// Moves all entries of `other` into `self`, leaving `other` empty.
    ///
    /// Both maps are exported in order, merged, and rebuilt bottom-up, so the
    /// cost is O(n + m) regardless of how the keys interleave.
    ///
    /// # Errors
    ///
    /// [`Error::KeyExists`] if the maps share a key, [`Error::Alloc`] if the
    /// merge buffer cannot be allocated. Both maps are unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexed_store::OrderedMap;
    ///
    /// let mut a = OrderedMap::from_sorted(vec![(1, 'a'), (4, 'd')]).unwrap();
    /// let mut b = OrderedMap::from_sorted(vec![(2, 'b'), (3, 'c')]).unwrap();
    /// a.append(&mut b).unwrap();
    /// assert!(b.is_empty());
    /// assert_eq!(a.values().collect::<String>(), "abcd");
    /// ```
    pub fn append(&mut self, other: &mut Self) -> Result<(), Error> {
        let (ours, theirs) = (self.len(), other.len());
        self.raw.append(&mut other.raw)?;
        tracing::debug!(ours, theirs, height = self.raw.height(), "appended ordered maps");
        Ok(())
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Looks up a value by key.
///
/// # Panics
///
/// Panics if the key is not present in the map.
impl<K, V, C: Compare<K>> Index<&K> for OrderedMap<K, V, C> {
    type Output = V;

    fn index(&self, key: &K) -> &Self::Output {
        self.get(key).expect("no entry found for key")
    }
}
