//! Offsets carried by [`DisjointSet`](crate::DisjointSet) elements.
//!
//! An offset is an element of a group: it has an identity, an associative
//! [`combine`](Offset::combine) and an [`inverse`](Offset::inverse). The group
//! need not be commutative, so the order of composition is fixed: in
//! `outer.combine(&inner)`, `outer` is the operand closer to the set's root.
//! An element's aggregate is the combination of every local offset on its path,
//! root first.

/// A group element that can be stored as a deferred offset.
///
/// Implementations must satisfy, for all `a`, `b`, `c`:
///
/// - `a.combine(&b).combine(&c) == a.combine(&b.combine(&c))`
/// - `Self::identity().combine(&a) == a == a.combine(&Self::identity())`
/// - `a.combine(&a.inverse()) == Self::identity() == a.inverse().combine(&a)`
///
/// # Examples
///
/// ```
/// use indexed_store::Offset;
///
/// let games: i64 = 3;
/// assert_eq!(games.combine(&4), 7);
/// assert_eq!(games.combine(&games.inverse()), i64::identity());
///
/// // Pairs combine component-wise.
/// let pair = (2i32, 5i64);
/// assert_eq!(pair.combine(&(1, 1)), (3, 6));
/// ```
pub trait Offset: Clone {
    /// The neutral offset.
    fn identity() -> Self;

    /// Composes `self` (outer, closer to the root) with `inner`.
    #[must_use]
    fn combine(&self, inner: &Self) -> Self;

    /// The offset that cancels `self` from either side.
    #[must_use]
    fn inverse(&self) -> Self;
}

macro_rules! additive_offset {
    ($($ty:ty),*) => {
        $(
            /// Addition, wrapping on overflow so that `inverse` is total.
            impl Offset for $ty {
                #[inline]
                fn identity() -> Self {
                    0
                }

                #[inline]
                fn combine(&self, inner: &Self) -> Self {
                    self.wrapping_add(*inner)
                }

                #[inline]
                fn inverse(&self) -> Self {
                    self.wrapping_neg()
                }
            }
        )*
    };
}

additive_offset!(i8, i16, i32, i64, i128, isize);

impl Offset for () {
    fn identity() -> Self {}

    fn combine(&self, (): &Self) -> Self {}

    fn inverse(&self) -> Self {}
}

/// Direct product: each component combines independently.
impl<A: Offset, B: Offset> Offset for (A, B) {
    fn identity() -> Self {
        (A::identity(), B::identity())
    }

    fn combine(&self, inner: &Self) -> Self {
        (self.0.combine(&inner.0), self.1.combine(&inner.1))
    }

    fn inverse(&self) -> Self {
        (self.0.inverse(), self.1.inverse())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn additive_wraps_instead_of_overflowing() {
        assert_eq!(i8::MAX.combine(&1), i8::MIN);
        assert_eq!(i8::MIN.inverse(), i8::MIN);
        assert_eq!(i8::MIN.combine(&i8::MIN.inverse()), 0);
    }

    proptest! {
        #[test]
        fn integer_laws(a in any::<i32>(), b in any::<i32>(), c in any::<i32>()) {
            prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
            prop_assert_eq!(i32::identity().combine(&a), a);
            prop_assert_eq!(a.combine(&a.inverse()), i32::identity());
        }

        #[test]
        fn pair_laws(a in any::<(i16, i64)>(), b in any::<(i16, i64)>()) {
            prop_assert_eq!(a.combine(&b).inverse(), b.inverse().combine(&a.inverse()));
            prop_assert_eq!(a.inverse().combine(&a), <(i16, i64)>::identity());
        }
    }
}
