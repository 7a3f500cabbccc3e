//! Weighted union-find whose elements carry deferred [`Offset`]s.
//!
//! Every element stores a *local* offset relative to its parent. The
//! *aggregate* of an element is the combination of the local offsets on the
//! path from its root down to it, root first. [`find`](DisjointSet::find)
//! compresses paths and rewrites the local offsets of the compressed nodes so
//! that no aggregate ever changes; only [`unite_with`](DisjointSet::unite_with)
//! and [`apply`](DisjointSet::apply) change aggregates, and they do so for a
//! whole group at once.
//!
//! # Examples
//!
//! ```
//! use indexed_store::DisjointSet;
//!
//! let mut games: DisjointSet<i64> = DisjointSet::new();
//! let team = games.make_set(0).unwrap();
//! let alice = games.make_set(2).unwrap();
//! let bob = games.make_set(5).unwrap();
//!
//! games.unite(team, alice);
//! games.unite(team, bob);
//!
//! // Every member of the group plays one more game.
//! games.apply(team, &1);
//! assert_eq!(games.aggregate(alice), 3);
//! assert_eq!(games.aggregate(bob), 6);
//! assert!(games.same_group(alice, bob));
//! ```

use smallvec::SmallVec;

use crate::error::Error;
use crate::offset::Offset;
use crate::raw::{Arena, Handle};

/// Identifies an element of a [`DisjointSet`].
///
/// Only meaningful for the set that issued it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(Handle);

struct Element<O> {
    // `None` at a root.
    parent: Option<Handle>,
    // Number of elements in the group; only kept current at roots.
    size: usize,
    local: O,
}

/// A union-find over elements carrying offsets of type `O`.
pub struct DisjointSet<O> {
    elements: Arena<Element<O>>,
}

impl<O> DisjointSet<O> {
    #[must_use]
    pub const fn new() -> Self {
        DisjointSet { elements: Arena::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        DisjointSet {
            elements: Arena::with_capacity(capacity),
        }
    }

    /// Number of registered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Makes room for `additional` more calls to [`make_set`](Self::make_set).
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the allocation fails.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        Ok(self.elements.try_reserve(additional)?)
    }

    /// Registers a new singleton group whose element has aggregate `initial`.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the element cannot be stored.
    pub fn make_set(&mut self, initial: O) -> Result<ElementId, Error> {
        let handle = self.elements.try_alloc(Element {
            parent: None,
            size: 1,
            local: initial,
        })?;
        Ok(ElementId(handle))
    }
}

impl<O: Offset> DisjointSet<O> {
    /// Returns the root of `element`'s group, compressing the path to it.
    ///
    /// # Panics
    ///
    /// Panics if `element` was issued by a different set.
    pub fn find(&mut self, element: ElementId) -> ElementId {
        let mut path: SmallVec<[Handle; 16]> = SmallVec::new();
        let mut current = element.0;
        while let Some(parent) = self.elements.get(current).parent {
            path.push(current);
            current = parent;
        }
        let root = current;

        // The child of the root keeps its local offset; every node below it
        // absorbs the locals of the ancestors it is about to skip.
        let Some((&top, rest)) = path.split_last() else {
            return ElementId(root);
        };
        let mut above = self.elements.get(top).local.clone();
        for &handle in rest.iter().rev() {
            let node = self.elements.get_mut(handle);
            above = above.combine(&node.local);
            node.local = above.clone();
            node.parent = Some(root);
        }
        ElementId(root)
    }

    /// Returns `true` if both elements are in the same group.
    pub fn same_group(&mut self, a: ElementId, b: ElementId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Number of elements in `element`'s group.
    pub fn group_size(&mut self, element: ElementId) -> usize {
        let root = self.find(element);
        self.elements.get(root.0).size
    }

    /// Merges the groups of `a` and `b` without changing any aggregate.
    ///
    /// See [`unite_with`](Self::unite_with).
    pub fn unite(&mut self, a: ElementId, b: ElementId) -> ElementId {
        self.unite_with(a, b, &O::identity())
    }

    /// Merges the groups of `a` and `b`, combining `carry` onto the front of
    /// every aggregate in `b`'s group. Aggregates in `a`'s group are unchanged.
    ///
    /// The root of the larger group survives; on a tie `a`'s root survives.
    /// Returns the surviving root. If `a` and `b` are already in one group
    /// nothing changes, including `carry` not being applied.
    ///
    /// ```
    /// use indexed_store::{DisjointSet, Permutation};
    ///
    /// let swap = Permutation::new([1, 0]).unwrap();
    /// let mut set = DisjointSet::new();
    /// let a = set.make_set(Permutation::identity()).unwrap();
    /// let b = set.make_set(Permutation::identity()).unwrap();
    ///
    /// let root = set.unite_with(a, b, &swap);
    /// assert_eq!(root, set.find(a));
    /// assert_eq!(set.aggregate(a), Permutation::identity());
    /// assert_eq!(set.aggregate(b), swap);
    /// ```
    pub fn unite_with(&mut self, a: ElementId, b: ElementId, carry: &O) -> ElementId {
        let (ra, rb) = (self.find(a).0, self.find(b).0);
        if ra == rb {
            return ElementId(ra);
        }
        let (root_a, root_b) = self.elements.get_pair_mut(ra, rb);
        if root_a.size >= root_b.size {
            // New path to b's members runs through ra, so strip ra's local first.
            root_b.local = root_a.local.inverse().combine(carry).combine(&root_b.local);
            root_b.parent = Some(ra);
            root_a.size += root_b.size;
            tracing::trace!(survivor = ?ra, absorbed = ?rb, size = root_a.size, "united groups");
            ElementId(ra)
        } else {
            root_b.local = carry.combine(&root_b.local);
            root_a.local = root_b.local.inverse().combine(&root_a.local);
            root_a.parent = Some(rb);
            root_b.size += root_a.size;
            tracing::trace!(survivor = ?rb, absorbed = ?ra, size = root_b.size, "united groups");
            ElementId(rb)
        }
    }

    /// Combines `delta` onto the front of every aggregate in `element`'s group.
    pub fn apply(&mut self, element: ElementId, delta: &O) {
        let root = self.find(element);
        let node = self.elements.get_mut(root.0);
        node.local = delta.combine(&node.local);
    }

    /// Resolved aggregate of `element`. Compresses the path as a side effect.
    pub fn aggregate(&mut self, element: ElementId) -> O {
        let root = self.find(element);
        let root_local = &self.elements.get(root.0).local;
        if root == element {
            root_local.clone()
        } else {
            root_local.combine(&self.elements.get(element.0).local)
        }
    }

    /// Resolved aggregate of `element` without restructuring the set.
    #[must_use]
    pub fn aggregate_uncompressed(&self, element: ElementId) -> O {
        let mut node = self.elements.get(element.0);
        let mut aggregate = node.local.clone();
        while let Some(parent) = node.parent {
            node = self.elements.get(parent);
            aggregate = node.local.combine(&aggregate);
        }
        aggregate
    }
}

impl<O> Default for DisjointSet<O> {
    fn default() -> Self {
        Self::new()
    }
}
