/// A zero-based position in the key order of an [`OrderedMap`](crate::OrderedMap).
///
/// # Examples
///
/// ```
/// use indexed_store::{OrderedMap, Rank};
///
/// let mut map = OrderedMap::new();
/// map.insert("b", 20).unwrap();
/// map.insert("a", 10).unwrap();
///
/// assert_eq!(map[Rank(0)], 10);
/// assert_eq!(map.rank_of(&"b"), Some(1));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
