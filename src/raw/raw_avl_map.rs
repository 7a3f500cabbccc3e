use core::cmp::Ordering;

use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{AvlNode, EMPTY_HEIGHT, Side};
use crate::compare::Compare;
use crate::error::Error;

/// The AVL tree backing `OrderedMap`.
pub(crate) struct RawAvlMap<K, V, C> {
    /// Arena storing all tree nodes.
    nodes: Arena<AvlNode<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Ordering of the keys.
    cmp: C,
}

/// Where a descent for a key ended.
enum Probe {
    /// The key is stored at this node.
    Found(Handle),
    /// The key is absent; it would hang from `parent` on `side`.
    Vacant { parent: Option<Handle>, side: Side },
}

impl<K, V, C> RawAvlMap<K, V, C> {
    /// Creates a new, empty tree ordered by `cmp`.
    pub(crate) const fn new(cmp: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            cmp,
        }
    }

    /// Creates a new tree with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            cmp,
        }
    }

    pub(crate) fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of entries in the tree.
    pub(crate) fn len(&self) -> usize {
        self.size(self.root)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        Ok(self.nodes.try_reserve(additional)?)
    }

    /// Height of the whole tree; -1 when empty.
    pub(crate) fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    #[cfg(test)]
    pub(crate) fn node(&self, handle: Handle) -> &AvlNode<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn entry(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), node.value())
    }

    pub(crate) fn entry_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        self.nodes.get_mut(handle).key_value_mut()
    }

    /// Drops every node and value.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    #[inline]
    fn height_of(&self, handle: Option<Handle>) -> i32 {
        handle.map_or(EMPTY_HEIGHT, |h| self.nodes.get(h).height())
    }

    #[inline]
    fn size(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.nodes.get(h).size())
    }

    /// Left height minus right height.
    fn balance_factor(&self, handle: Handle) -> i32 {
        let node = self.nodes.get(handle);
        self.height_of(node.left()) - self.height_of(node.right())
    }

    /// Recomputes the cached height and size of `handle` from its children.
    fn update(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());
        let height = 1 + self.height_of(left).max(self.height_of(right));
        let size = 1 + self.size(left) + self.size(right);
        let node = self.nodes.get_mut(handle);
        node.set_height(height);
        node.set_size(size);
    }

    /// Recomputes only the cached size of `handle`.
    fn update_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = 1 + self.size(node.left()) + self.size(node.right());
        self.nodes.get_mut(handle).set_size(size);
    }

    /// Points whatever held `old` (its parent's child slot, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let side = self.nodes.get(p).side_of(old).expect("`replace_child()` - `old` is not a child of `parent`");
                self.nodes.get_mut(p).set_child(side, new);
            }
        }
    }

    fn set_parent(&mut self, child: Option<Handle>, parent: Option<Handle>) {
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(parent);
        }
    }

    /// Rotates `a` down to the right, lifting its left child. Returns the new subtree root.
    fn rotate_right(&mut self, a: Handle) -> Handle {
        let b = self.nodes.get(a).left().expect("`rotate_right()` requires a left child");
        let inner = self.nodes.get(b).right();
        let parent = self.nodes.get(a).parent();

        self.nodes.get_mut(a).set_left(inner);
        self.set_parent(inner, Some(a));

        self.nodes.get_mut(b).set_right(Some(a));
        self.nodes.get_mut(a).set_parent(Some(b));
        self.nodes.get_mut(b).set_parent(parent);
        self.replace_child(parent, a, Some(b));

        self.update(a);
        self.update(b);
        b
    }

    /// Rotates `a` down to the left, lifting its right child. Returns the new subtree root.
    fn rotate_left(&mut self, a: Handle) -> Handle {
        let b = self.nodes.get(a).right().expect("`rotate_left()` requires a right child");
        let inner = self.nodes.get(b).left();
        let parent = self.nodes.get(a).parent();

        self.nodes.get_mut(a).set_right(inner);
        self.set_parent(inner, Some(a));

        self.nodes.get_mut(b).set_left(Some(a));
        self.nodes.get_mut(a).set_parent(Some(b));
        self.nodes.get_mut(b).set_parent(parent);
        self.replace_child(parent, a, Some(b));

        self.update(a);
        self.update(b);
        b
    }

    /// Applies at most one rotation shape (LL, LR, RR, RL) at `handle`, whose caches
    /// must be current. Returns the root of the resulting subtree.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        match self.balance_factor(handle) {
            2 => {
                let left = self.nodes.get(handle).left().expect("left-heavy node has a left child");
                if self.balance_factor(left) == -1 {
                    self.rotate_left(left);
                }
                self.rotate_right(handle)
            }
            -2 => {
                let right = self.nodes.get(handle).right().expect("right-heavy node has a right child");
                if self.balance_factor(right) == 1 {
                    self.rotate_right(right);
                }
                self.rotate_left(handle)
            }
            _ => handle,
        }
    }

    /// Walks up from a freshly attached leaf.
    ///
    /// Height work stops at the first ancestor whose height is unchanged or that
    /// needed a rotation; sizes are refreshed all the way to the root.
    fn retrace_insert(&mut self, leaf: Handle) {
        let mut child = leaf;
        let mut settled = false;
        while let Some(parent) = self.nodes.get(child).parent() {
            if settled {
                self.update_size(parent);
                child = parent;
                continue;
            }
            let old_height = self.nodes.get(parent).height();
            self.update(parent);
            if self.balance_factor(parent).abs() == 2 {
                child = self.rebalance(parent);
                settled = true;
                continue;
            }
            settled = self.nodes.get(parent).height() == old_height;
            child = parent;
        }
    }

    /// Walks up from the parent of a spliced-out node, rotating where needed.
    ///
    /// Height work stops once a subtree keeps its height; sizes are refreshed to the root.
    fn retrace_remove(&mut self, start: Option<Handle>) {
        let mut current = start;
        let mut settled = false;
        while let Some(handle) = current {
            if settled {
                self.update_size(handle);
                current = self.nodes.get(handle).parent();
                continue;
            }
            let old_height = self.nodes.get(handle).height();
            self.update(handle);
            let subtree = self.rebalance(handle);
            settled = self.nodes.get(subtree).height() == old_height;
            current = self.nodes.get(subtree).parent();
        }
    }

    /// Leftmost node of the subtree rooted at `handle`.
    pub(crate) fn min_from(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left() {
            handle = left;
        }
        handle
    }

    /// Rightmost node of the subtree rooted at `handle`.
    pub(crate) fn max_from(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes.get(handle).right() {
            handle = right;
        }
        handle
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.min_from(root))
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.max_from(root))
    }

    /// In-order successor of `handle`.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.nodes.get(handle).right() {
            return Some(self.min_from(right));
        }
        let mut current = handle;
        while let Some(parent) = self.nodes.get(current).parent() {
            if self.nodes.get(parent).left() == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// In-order predecessor of `handle`.
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.nodes.get(handle).left() {
            return Some(self.max_from(left));
        }
        let mut current = handle;
        while let Some(parent) = self.nodes.get(current).parent() {
            if self.nodes.get(parent).right() == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Node holding the `rank`-th smallest key (zero-based).
    pub(crate) fn select(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }
        let mut current = self.root?;
        let mut remaining = rank;
        loop {
            let node = self.nodes.get(current);
            let weight = self.size(node.left());
            match weight.cmp(&remaining) {
                Ordering::Greater => current = node.left()?,
                Ordering::Less => {
                    remaining -= weight + 1;
                    current = node.right()?;
                }
                Ordering::Equal => return Some(current),
            }
        }
    }

    /// Handles of every node in ascending key order, in a fallibly reserved buffer.
    fn in_order_handles(&self) -> Result<Vec<Handle>, Error> {
        let mut handles = Vec::new();
        handles.try_reserve_exact(self.len())?;
        let mut current = self.first();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.successor(handle);
        }
        Ok(handles)
    }

    /// Removes every entry, returning them in ascending key order.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut handles = Vec::with_capacity(self.len());
        let mut current = self.first();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.successor(handle);
        }
        let entries = handles.into_iter().map(|h| self.nodes.vacate(h).into_entry()).collect();
        self.clear();
        entries
    }

    /// Builds a balanced subtree from the next `count` entries of `entries`,
    /// splitting at the midpoint. The arena must already have room for them.
    fn build_balanced<I>(&mut self, count: usize, entries: &mut I) -> Option<Handle>
    where
        I: Iterator<Item = (K, V)>,
    {
        if count == 0 {
            return None;
        }
        let left_count = count / 2;
        let left = self.build_balanced(left_count, entries);
        let (key, value) = entries.next()?;
        let handle = self.nodes.alloc(AvlNode::new(key, value, None));
        let right = self.build_balanced(count - left_count - 1, entries);

        let node = self.nodes.get_mut(handle);
        node.set_left(left);
        node.set_right(right);
        self.set_parent(left, Some(handle));
        self.set_parent(right, Some(handle));
        self.update(handle);
        Some(handle)
    }
}

impl<K, V, C: Compare<K>> RawAvlMap<K, V, C> {
    /// Descends from the root comparing `key` at each node.
    fn probe(&self, key: &K) -> Probe {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match self.cmp.compare(key, node.key()) {
                Ordering::Less => {
                    parent = Some(handle);
                    side = Side::Left;
                    current = node.left();
                }
                Ordering::Greater => {
                    parent = Some(handle);
                    side = Side::Right;
                    current = node.right();
                }
                Ordering::Equal => return Probe::Found(handle),
            }
        }
        Probe::Vacant { parent, side }
    }

    /// Searches for a key and returns its node.
    pub(crate) fn search(&self, key: &K) -> Option<Handle> {
        match self.probe(key) {
            Probe::Found(handle) => Some(handle),
            Probe::Vacant { .. } => None,
        }
    }

    /// Inserts a new entry. Fails with `KeyExists` or `Alloc`, leaving the tree unchanged.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<Handle, Error> {
        let (parent, side) = match self.probe(&key) {
            Probe::Found(_) => return Err(Error::KeyExists),
            Probe::Vacant { parent, side } => (parent, side),
        };
        let handle = self.nodes.try_alloc(AvlNode::new(key, value, parent))?;
        match parent {
            None => self.root = Some(handle),
            Some(p) => self.nodes.get_mut(p).set_child(side, Some(handle)),
        }
        self.retrace_insert(handle);
        Ok(handle)
    }

    /// Removes `key`, returning its entry.
    pub(crate) fn remove(&mut self, key: &K) -> Result<(K, V), Error> {
        let target = self.search(key).ok_or(Error::KeyDoesNotExist)?;
        let node = self.nodes.get(target);
        let victim = match (node.left(), node.right()) {
            (Some(_), Some(right)) => {
                // Move the successor's payload up; its node (at most one child) is spliced instead.
                let successor = self.min_from(right);
                let (a, b) = self.nodes.get_pair_mut(target, successor);
                a.swap_payload(b);
                successor
            }
            _ => target,
        };

        let node = self.nodes.get(victim);
        let child = node.left().or(node.right());
        let parent = node.parent();
        self.set_parent(child, parent);
        self.replace_child(parent, victim, child);

        let entry = self.nodes.take(victim).into_entry();
        self.retrace_remove(parent);
        Ok(entry)
    }

    /// First node whose key is equal to or greater than `key`.
    pub(crate) fn eq_or_greater(&self, key: &K) -> Option<Handle> {
        match self.probe(key) {
            Probe::Found(handle) => Some(handle),
            Probe::Vacant { parent, side } => {
                let parent = parent?;
                match side {
                    // `key` sorts before `parent`.
                    Side::Left => Some(parent),
                    Side::Right => self.successor(parent),
                }
            }
        }
    }

    /// Zero-based position of `key` in ascending order.
    pub(crate) fn rank_of(&self, key: &K) -> Option<usize> {
        let mut current = self.root;
        let mut rank = 0;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match self.cmp.compare(key, node.key()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    rank += self.size(node.left()) + 1;
                    current = node.right();
                }
                Ordering::Equal => return Some(rank + self.size(node.left())),
            }
        }
        None
    }

    /// Checks that `entries` is strictly ascending.
    pub(crate) fn check_sorted(&self, entries: &[(K, V)]) -> Result<(), Error> {
        for pair in entries.windows(2) {
            match self.cmp.compare(&pair[0].0, &pair[1].0) {
                Ordering::Less => {}
                Ordering::Equal => return Err(Error::KeyExists),
                Ordering::Greater => return Err(Error::NotSorted),
            }
        }
        Ok(())
    }

    /// Replaces the contents with `entries`, which must be strictly ascending.
    ///
    /// Validation and allocation happen before the current contents are dropped.
    pub(crate) fn rebuild_from_sorted(&mut self, entries: Vec<(K, V)>) -> Result<(), Error> {
        self.check_sorted(&entries)?;
        self.nodes.try_reserve_total(entries.len())?;
        self.clear();
        let count = entries.len();
        let mut entries = entries.into_iter();
        self.root = self.build_balanced(count, &mut entries);
        Ok(())
    }

    /// Returns true when no key of `self` is also a key of `other`.
    pub(crate) fn is_disjoint(&self, other: &Self) -> bool {
        let mut a = self.first();
        let mut b = other.first();
        while let (Some(x), Some(y)) = (a, b) {
            match self.cmp.compare(self.nodes.get(x).key(), other.nodes.get(y).key()) {
                Ordering::Less => a = self.successor(x),
                Ordering::Greater => b = other.successor(y),
                Ordering::Equal => return false,
            }
        }
        true
    }

    /// Moves every entry of `other` into `self` by merging both in-order
    /// sequences and rebuilding. Fails with `KeyExists` if a key is shared;
    /// on any error both trees are unchanged.
    pub(crate) fn append(&mut self, other: &mut Self) -> Result<(), Error> {
        if other.is_empty() {
            return Ok(());
        }
        if !self.is_disjoint(other) {
            return Err(Error::KeyExists);
        }
        let total = self.len() + other.len();
        let mut merged = Vec::new();
        merged.try_reserve_exact(total)?;
        self.nodes.try_reserve_total(total)?;
        let ours = self.in_order_handles()?;
        let theirs = other.in_order_handles()?;

        // Nothing below allocates: entries move into `merged`, slots are vacated.
        let (mut i, mut j) = (0, 0);
        while i < ours.len() || j < theirs.len() {
            let take_ours = match (ours.get(i), theirs.get(j)) {
                (Some(&a), Some(&b)) => {
                    self.cmp.compare(self.nodes.get(a).key(), other.nodes.get(b).key()) == Ordering::Less
                }
                (Some(_), None) => true,
                _ => false,
            };
            if take_ours {
                merged.push(self.nodes.vacate(ours[i]).into_entry());
                i += 1;
            } else {
                merged.push(other.nodes.vacate(theirs[j]).into_entry());
                j += 1;
            }
        }
        self.clear();
        other.clear();

        let count = merged.len();
        let mut entries = merged.into_iter();
        self.root = self.build_balanced(count, &mut entries);
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<K, V, C: Compare<K>> RawAvlMap<K, V, C> {
        /// Validates every AVL and order-statistic invariant. Panics with a list of
        /// violations if any are found.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();
            if let Some(root) = self.root {
                if self.nodes.get(root).parent().is_some() {
                    errors.push("root has a parent".into());
                }
                self.validate_node(root, &mut errors);
            }
            if self.len() != self.nodes.len() {
                errors.push(alloc::format!("len mismatch: root size={}, arena={}", self.len(), self.nodes.len()));
            }

            let mut previous: Option<Handle> = None;
            let mut current = self.first();
            let mut visited = 0;
            while let Some(handle) = current {
                if let Some(previous) = previous
                    && self.cmp.compare(self.nodes.get(previous).key(), self.nodes.get(handle).key()) != Ordering::Less
                {
                    errors.push(alloc::format!("in-order keys not strictly ascending at {handle:?}"));
                }
                visited += 1;
                previous = current;
                current = self.successor(handle);
            }
            if visited != self.len() {
                errors.push(alloc::format!("successor walk visited {visited} of {} nodes", self.len()));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns (height, size) of the subtree, recomputed from scratch.
        fn validate_node(&self, handle: Handle, errors: &mut Vec<String>) -> (i32, usize) {
            let node = self.nodes.get(handle);
            let mut heights = [EMPTY_HEIGHT; 2];
            let mut size = 1;
            for (slot, child) in [node.left(), node.right()].into_iter().enumerate() {
                let Some(child) = child else { continue };
                if self.nodes.get(child).parent() != Some(handle) {
                    errors.push(alloc::format!("child {child:?} of {handle:?} has a stale parent link"));
                }
                let ordering = self.cmp.compare(self.nodes.get(child).key(), node.key());
                let expected = if slot == 0 { Ordering::Less } else { Ordering::Greater };
                if ordering != expected {
                    errors.push(alloc::format!("child {child:?} is on the wrong side of {handle:?}"));
                }
                let (h, s) = self.validate_node(child, errors);
                heights[slot] = h;
                size += s;
            }
            let height = 1 + heights[0].max(heights[1]);
            if node.height() != height {
                errors.push(alloc::format!("height mismatch at {handle:?}: stored={}, actual={height}", node.height()));
            }
            if node.size() != size {
                errors.push(alloc::format!("size mismatch at {handle:?}: stored={}, actual={size}", node.size()));
            }
            if (heights[0] - heights[1]).abs() > 1 {
                errors.push(alloc::format!("unbalanced at {handle:?}: left={}, right={}", heights[0], heights[1]));
            }
            (height, size)
        }

        fn keys(&self) -> Vec<K>
        where
            K: Clone,
        {
            let mut keys = Vec::new();
            let mut current = self.first();
            while let Some(handle) = current {
                keys.push(self.nodes.get(handle).key().clone());
                current = self.successor(handle);
            }
            keys
        }
    }

    fn tree_of(keys: &[i32]) -> RawAvlMap<i32, i32, Natural> {
        let mut tree = RawAvlMap::new(Natural);
        for &key in keys {
            let _ = tree.insert(key, key * 2);
        }
        tree
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    #[test]
    fn each_rotation_shape_restores_balance() {
        // LL, RR, LR, RL respectively.
        for keys in [[3, 2, 1], [1, 2, 3], [3, 1, 2], [1, 3, 2]] {
            let tree = tree_of(&keys);
            tree.validate_invariants();
            assert_eq!(tree.height(), 1);
            assert_eq!(*tree.node(tree.root().unwrap()).key(), 2);
        }
    }

    #[test]
    fn duplicate_insert_is_rejected_without_change() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.insert(2, 0), Err(Error::KeyExists));
        tree.validate_invariants();
        let two = tree.search(&2).unwrap();
        assert_eq!(*tree.node(two).value(), 4);
    }

    #[test]
    fn remove_node_with_two_children_keeps_order() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(tree.remove(&5), Ok((5, 10)));
        tree.validate_invariants();
        assert_eq!(tree.keys(), [1, 3, 4, 7, 8, 9]);
        assert_eq!(tree.remove(&5), Err(Error::KeyDoesNotExist));
    }

    #[test]
    fn removal_can_cascade_rotations() {
        // A Fibonacci-shaped tree where deleting the shallowest leaf rotates twice.
        let mut tree = tree_of(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
        tree.validate_invariants();
        tree.remove(&12).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.keys(), [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn neighbours_at_the_edges() {
        let tree = tree_of(&[10, 20, 30]);
        let first = tree.first().unwrap();
        let last = tree.last().unwrap();
        assert_eq!(tree.predecessor(first), None);
        assert_eq!(tree.successor(last), None);
        assert_eq!(tree.successor(first).map(|h| *tree.node(h).key()), Some(20));
        assert_eq!(tree.predecessor(last).map(|h| *tree.node(h).key()), Some(20));
    }

    #[test]
    fn eq_or_greater_cases() {
        let tree = tree_of(&[10, 20, 30, 40]);
        let key_of = |h: Option<Handle>| h.map(|h| *tree.node(h).key());
        assert_eq!(key_of(tree.eq_or_greater(&20)), Some(20));
        assert_eq!(key_of(tree.eq_or_greater(&21)), Some(30));
        assert_eq!(key_of(tree.eq_or_greater(&0)), Some(10));
        assert_eq!(key_of(tree.eq_or_greater(&41)), None);
        assert_eq!(RawAvlMap::<i32, i32, Natural>::new(Natural).eq_or_greater(&1), None);
    }

    #[test]
    fn rebuild_rejects_bad_input_before_touching_contents() {
        let mut tree = tree_of(&[1, 2]);
        assert_eq!(tree.rebuild_from_sorted(alloc::vec![(3, 0), (3, 0)]), Err(Error::KeyExists));
        assert_eq!(tree.rebuild_from_sorted(alloc::vec![(4, 0), (3, 0)]), Err(Error::NotSorted));
        assert_eq!(tree.keys(), [1, 2]);
    }

    #[test]
    fn append_rejects_shared_keys() {
        let mut a = tree_of(&[1, 3, 5]);
        let mut b = tree_of(&[2, 3]);
        assert_eq!(a.append(&mut b), Err(Error::KeyExists));
        assert_eq!(a.keys(), [1, 3, 5]);
        assert_eq!(b.keys(), [2, 3]);
    }

    #[test]
    fn append_stays_within_reserved_capacity() {
        let mut left = tree_of(&[1, 3, 5, 7]);
        let mut right = tree_of(&[2, 4, 6]);
        left.nodes.try_reserve_total(7).unwrap();
        let (ours, theirs) = (left.nodes.capacity(), right.nodes.capacity());
        left.append(&mut right).unwrap();
        assert_eq!(left.nodes.capacity(), ours);
        assert_eq!(right.nodes.capacity(), theirs);
        assert!(right.is_empty());
        assert_eq!(left.keys(), [1, 2, 3, 4, 5, 6, 7]);
        left.validate_invariants();
    }

    #[test]
    fn drain_empties_the_arena() {
        let mut tree = tree_of(&[4, 2, 6]);
        assert_eq!(tree.drain_to_vec(), [(2, 4), (4, 8), (6, 12)]);
        assert!(tree.is_empty());
        tree.insert(1, 2).unwrap();
        tree.validate_invariants();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = RawAvlMap::new(Natural);
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let expected = if model.contains_key(&key) { Err(Error::KeyExists) } else { Ok(()) };
                        prop_assert_eq!(tree.insert(key, key * 2).map(|_| ()), expected);
                        model.entry(key).or_insert(key * 2);
                    }
                    Op::Remove(key) => {
                        let expected = model.remove(&key).map(|v| (key, v)).ok_or(Error::KeyDoesNotExist);
                        prop_assert_eq!(tree.remove(&key), expected);
                    }
                }
                tree.validate_invariants();
            }
            prop_assert_eq!(tree.keys(), model.keys().copied().collect::<Vec<_>>());
        }

        #[test]
        fn select_and_rank_match_sorted_order(keys in prop::collection::btree_set(-500i32..500, 1..200)) {
            let keys: Vec<i32> = keys.into_iter().collect();
            let mut shuffled = keys.clone();
            shuffled.reverse();
            shuffled.rotate_left(keys.len() / 3);
            let tree = tree_of(&shuffled);

            for (rank, key) in keys.iter().enumerate() {
                let handle = tree.select(rank).unwrap();
                prop_assert_eq!(tree.node(handle).key(), key);
                prop_assert_eq!(tree.rank_of(key), Some(rank));
            }
            prop_assert!(tree.select(keys.len()).is_none());
        }

        #[test]
        fn bulk_build_is_balanced(count in 0usize..300) {
            let mut tree = RawAvlMap::new(Natural);
            tree.rebuild_from_sorted((0..count).map(|i| (i, i)).collect()).unwrap();
            tree.validate_invariants();
            prop_assert_eq!(tree.len(), count);
        }

        #[test]
        fn append_matches_union(
            a in prop::collection::btree_set(0i32..400, 0..100),
            b in prop::collection::btree_set(400i32..800, 0..100),
        ) {
            let a: Vec<i32> = a.into_iter().collect();
            let b: Vec<i32> = b.into_iter().collect();
            let mut left = tree_of(&a);
            let mut right = tree_of(&b);
            left.append(&mut right).unwrap();
            left.validate_invariants();
            right.validate_invariants();
            prop_assert!(right.is_empty());
            let mut expected = a.clone();
            expected.extend(&b);
            prop_assert_eq!(left.keys(), expected);
        }
    }
}
