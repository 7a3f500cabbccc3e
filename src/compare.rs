//! Comparison strategies for [`OrderedMap`](crate::OrderedMap).
//!
//! One map type serves any number of orderings over the same key type: the
//! ordering is a value stored in the map, not a property of the key.

use core::cmp::Ordering;

/// A total order over `K`.
///
/// Implementations must be consistent for the lifetime of a map: two calls
/// with the same arguments must return the same [`Ordering`].
pub trait Compare<K: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<K: ?Sized + Ord> Compare<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys by the reverse of their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reverse;

impl<K: ?Sized + Ord> Compare<K> for Reverse {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.cmp(a)
    }
}

/// Orders keys with a function.
///
/// ```
/// use indexed_store::{FnCompare, OrderedMap};
///
/// // Case-insensitive ordering.
/// let by_lowercase = FnCompare(|a: &&str, b: &&str| a.to_lowercase().cmp(&b.to_lowercase()));
/// let mut map = OrderedMap::with_comparator(by_lowercase);
/// map.insert("beta", 2).unwrap();
/// map.insert("Alpha", 1).unwrap();
/// assert!(map.insert("ALPHA", 3).is_err());
/// assert_eq!(map.first(), Some((&"Alpha", &1)));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FnCompare<F>(pub F);

impl<K: ?Sized, F> Compare<K> for FnCompare<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn natural_and_reverse_disagree() {
        assert_eq!(Natural.compare(&1, &2), Ordering::Less);
        assert_eq!(Reverse.compare(&1, &2), Ordering::Greater);
        assert_eq!(Reverse.compare(&"a", &"a"), Ordering::Equal);
    }

    #[test]
    fn fn_compare_delegates() {
        let by_len = FnCompare(|a: &&str, b: &&str| a.len().cmp(&b.len()));
        assert_eq!(by_len.compare(&"abc", &"z"), Ordering::Greater);
    }
}
