use core::fmt;
use core::ops::Mul;

use crate::offset::Offset;

/// A permutation of `N` positions, the non-commutative [`Offset`].
///
/// Composition follows function notation: `(p * q)(i) == p(q(i))`, so `q` is
/// applied first. As an offset, `p.combine(&q) == p * q`.
///
/// `N` must not exceed 256.
///
/// # Examples
///
/// ```
/// use indexed_store::{Offset, Permutation};
///
/// let swap = Permutation::new([1, 0, 2]).unwrap();
/// let cycle = Permutation::new([1, 2, 0]).unwrap();
///
/// assert_ne!(swap * cycle, cycle * swap);
/// assert_eq!((swap * cycle).image(0), swap.image(cycle.image(0)));
/// assert_eq!(cycle * cycle.inverse(), Permutation::identity());
/// assert!(Permutation::new([0, 0, 1]).is_none());
/// ```
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Permutation<const N: usize>([u8; N]);

impl<const N: usize> Permutation<N> {
    /// Wraps `images`, where position `i` maps to `images[i]`.
    ///
    /// Returns `None` unless every position in `0..N` appears exactly once.
    #[must_use]
    pub fn new(images: [u8; N]) -> Option<Self> {
        let mut seen = [false; N];
        for &image in &images {
            let slot = seen.get_mut(usize::from(image))?;
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(Permutation(images))
    }

    /// The identity permutation.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn identity() -> Self {
        const { assert!(N <= 256, "`Permutation` supports at most 256 positions") };
        Permutation(core::array::from_fn(|i| i as u8))
    }

    /// Where `position` is sent.
    ///
    /// # Panics
    ///
    /// Panics if `position >= N`.
    #[must_use]
    pub fn image(&self, position: usize) -> usize {
        usize::from(self.0[position])
    }

    /// Images of each position.
    #[must_use]
    pub fn as_array(&self) -> &[u8; N] {
        &self.0
    }

    /// Inverse permutation: `p.inverse().image(p.image(i)) == i`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn inverse(&self) -> Self {
        let mut inverse = [0; N];
        for (position, &image) in self.0.iter().enumerate() {
            inverse[usize::from(image)] = position as u8;
        }
        Permutation(inverse)
    }

    /// Number of positions that are not fixed points.
    #[must_use]
    pub fn moved(&self) -> usize {
        self.0.iter().enumerate().filter(|&(i, &image)| usize::from(image) != i).count()
    }
}

impl<const N: usize> Default for Permutation<N> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<const N: usize> Mul for Permutation<N> {
    type Output = Self;

    fn mul(self, inner: Self) -> Self {
        Permutation(core::array::from_fn(|i| self.0[usize::from(inner.0[i])]))
    }
}

impl<const N: usize> Offset for Permutation<N> {
    fn identity() -> Self {
        Permutation::identity()
    }

    fn combine(&self, inner: &Self) -> Self {
        *self * *inner
    }

    fn inverse(&self) -> Self {
        Permutation::inverse(self)
    }
}

impl<const N: usize> fmt::Debug for Permutation<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Permutation").field(&self.0).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    type P5 = Permutation<5>;

    fn permutation() -> impl Strategy<Value = P5> {
        Just(alloc::vec![0u8, 1, 2, 3, 4])
            .prop_shuffle()
            .prop_map(|images: Vec<u8>| P5::new([images[0], images[1], images[2], images[3], images[4]]).unwrap())
    }

    #[test]
    fn rejects_out_of_range_and_repeats() {
        assert!(P5::new([0, 1, 2, 3, 5]).is_none());
        assert!(P5::new([0, 1, 2, 3, 3]).is_none());
        assert_eq!(P5::new([0, 1, 2, 3, 4]), Some(P5::identity()));
    }

    #[test]
    fn composition_applies_the_right_operand_first() {
        let p = P5::new([1, 2, 3, 4, 0]).unwrap();
        let q = P5::new([4, 3, 2, 1, 0]).unwrap();
        let pq = p * q;
        for i in 0..5 {
            assert_eq!(pq.image(i), p.image(q.image(i)));
        }
        assert_eq!(pq.as_array(), &[0, 4, 3, 2, 1]);
        assert_eq!(pq.moved(), 4);
    }

    proptest! {
        #[test]
        fn combine_is_associative(a in permutation(), b in permutation(), c in permutation()) {
            prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
        }

        #[test]
        fn inverse_cancels_from_both_sides(a in permutation()) {
            prop_assert_eq!(a.combine(&Offset::inverse(&a)), P5::identity());
            prop_assert_eq!(Offset::inverse(&a).combine(&a), P5::identity());
            prop_assert_eq!(P5::identity().combine(&a), a);
        }

        #[test]
        fn inverse_of_product_reverses_order(a in permutation(), b in permutation()) {
            prop_assert_eq!((a * b).inverse(), b.inverse() * a.inverse());
        }
    }
}
