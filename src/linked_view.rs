//! A doubly linked list threaded through the in-order sequence of an
//! [`OrderedMap`].
//!
//! The view owns the records. Maps index them by storing [`Link`]s as values,
//! so one record can be reachable from several maps at once while exactly one
//! structure decides its lifetime. Once a record is linked, its neighbours in
//! the driving map's order are one step away.
//!
//! A record is linked *after* its key enters the driving map and must be
//! unlinked *before* the key leaves it:
//!
//! ```
//! use indexed_store::{LinkedView, OrderedMap};
//!
//! let mut view = LinkedView::new();
//! let mut by_score = OrderedMap::new();
//!
//! for (score, name) in [(30, "carol"), (10, "alice"), (20, "bob")] {
//!     let link = view.insert(name).unwrap();
//!     by_score.insert(score, link).unwrap();
//!     view.link(&by_score, &score).unwrap();
//! }
//!
//! let bob = by_score[&20];
//! assert_eq!(view.previous(bob).map(|l| *view.get(l)), Some("alice"));
//! assert_eq!(view.next(bob).map(|l| *view.get(l)), Some("carol"));
//!
//! view.unlink(bob);
//! by_score.remove(&20).unwrap();
//! assert_eq!(view.remove(bob), "bob");
//! let alice = by_score[&10];
//! assert_eq!(view.next(alice).map(|l| *view.get(l)), Some("carol"));
//! ```

use crate::compare::Compare;
use crate::error::Error;
use crate::ordered_map::OrderedMap;
use crate::raw::{Arena, Handle};

/// Handle to a record stored in a [`LinkedView`].
///
/// Stays valid until the record is [`remove`](LinkedView::remove)d, whatever
/// happens to the maps that index it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Link(Handle);

struct ViewNode<V> {
    value: V,
    previous: Option<Handle>,
    next: Option<Handle>,
    linked: bool,
}

/// Owner of records threaded in the order of an [`OrderedMap`].
pub struct LinkedView<V> {
    nodes: Arena<ViewNode<V>>,
}

impl<V> LinkedView<V> {
    #[must_use]
    pub const fn new() -> Self {
        LinkedView { nodes: Arena::new() }
    }

    /// Number of stored records, linked or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Makes room for `additional` more records.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the allocation fails.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        Ok(self.nodes.try_reserve(additional)?)
    }

    /// Stores `value` as a detached record.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the record cannot be stored.
    pub fn insert(&mut self, value: V) -> Result<Link, Error> {
        let handle = self.nodes.try_alloc(ViewNode {
            value,
            previous: None,
            next: None,
            linked: false,
        })?;
        Ok(Link(handle))
    }

    /// # Panics
    ///
    /// Panics if `link` does not refer to a stored record.
    #[must_use]
    pub fn get(&self, link: Link) -> &V {
        &self.nodes.get(link.0).value
    }

    /// # Panics
    ///
    /// Panics if `link` does not refer to a stored record.
    pub fn get_mut(&mut self, link: Link) -> &mut V {
        &mut self.nodes.get_mut(link.0).value
    }

    /// Whether the record is currently threaded into the list.
    #[must_use]
    pub fn is_linked(&self, link: Link) -> bool {
        self.nodes.get(link.0).linked
    }

    /// The record after `link` in the driving map's order.
    #[must_use]
    pub fn next(&self, link: Link) -> Option<Link> {
        self.nodes.get(link.0).next.map(Link)
    }

    /// The record before `link` in the driving map's order.
    #[must_use]
    pub fn previous(&self, link: Link) -> Option<Link> {
        self.nodes.get(link.0).previous.map(Link)
    }

    /// Threads the record stored under `key` in `map` between its neighbours
    /// in `map`'s order. A record that is already linked is relinked.
    ///
    /// # Errors
    ///
    /// [`Error::KeyDoesNotExist`] if `key` is not in `map`.
    pub fn link<K, C: Compare<K>>(&mut self, map: &OrderedMap<K, Link, C>, key: &K) -> Result<(), Error> {
        let link = *map.get(key).ok_or(Error::KeyDoesNotExist)?;
        let previous = map.previous(key)?.map(|(_, l)| l.0);
        let next = map.next(key)?.map(|(_, l)| l.0);

        if self.is_linked(link) {
            self.unlink(link);
        }
        let node = self.nodes.get_mut(link.0);
        node.previous = previous;
        node.next = next;
        node.linked = true;
        if let Some(previous) = previous {
            self.nodes.get_mut(previous).next = Some(link.0);
        }
        if let Some(next) = next {
            self.nodes.get_mut(next).previous = Some(link.0);
        }
        Ok(())
    }

    /// Detaches the record by joining its neighbours. Does nothing if it is not linked.
    pub fn unlink(&mut self, link: Link) {
        let node = self.nodes.get_mut(link.0);
        let (previous, next) = (node.previous.take(), node.next.take());
        node.linked = false;
        if let Some(previous) = previous {
            self.nodes.get_mut(previous).next = next;
        }
        if let Some(next) = next {
            self.nodes.get_mut(next).previous = previous;
        }
    }

    /// Unlinks the record if needed and hands its value back.
    pub fn remove(&mut self, link: Link) -> V {
        self.unlink(link);
        self.nodes.take(link.0).value
    }
}

impl<V> Default for LinkedView<V> {
    fn default() -> Self {
        Self::new()
    }
}
