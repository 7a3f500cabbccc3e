use super::handle::Handle;

/// Height reported for a missing child.
pub(crate) const EMPTY_HEIGHT: i32 = -1;

/// Which slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

// AVL node: children are owned through the arena, `parent` is a back-reference.
pub(crate) struct AvlNode<K, V> {
    key: K,
    value: V,
    left: Option<Handle>,
    right: Option<Handle>,
    parent: Option<Handle>,
    // Leaf height is 0.
    height: i32,
    // Number of nodes in the subtree rooted here, for order-statistic queries.
    size: usize,
}

impl<K, V> AvlNode<K, V> {
    /// Creates a detached leaf.
    pub(crate) fn new(key: K, value: V, parent: Option<Handle>) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
            height: 0,
            size: 1,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    /// Borrows the value mutably while the key stays shared, so ordering cannot be broken.
    #[inline]
    pub(crate) fn key_value_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Exchanges key and value with `other`; links and caches stay in place.
    pub(crate) fn swap_payload(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.key, &mut other.key);
        core::mem::swap(&mut self.value, &mut other.value);
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn set_height(&mut self, height: i32) {
        self.height = height;
    }

    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Returns the side `child` hangs from, or `None` if it is not a child of this node.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}
