//! Indexed record store: ordered maps with order statistics, and a union-find
//! whose elements carry composable offsets.
//!
//! - [`OrderedMap`] is an AVL tree keyed under a [`Compare`] strategy. Besides
//!   lookup it answers successor, predecessor and equal-or-greater queries, and
//!   k-th selection and ranking in O(log n) through cached subtree sizes.
//! - [`DisjointSet`] is a weighted, path-compressing union-find. Each element
//!   carries an [`Offset`] relative to its group root, so a value can be
//!   applied to a whole group in near-constant time and read back per element.
//! - [`LinkedView`] owns records and threads them in a map's order, so maps can
//!   share records by storing [`Link`]s.
//! - [`tournament`] ties the three together.
//!
//! # Example
//!
//! ```
//! use indexed_store::{DisjointSet, OrderedMap, Rank};
//!
//! let mut scores = OrderedMap::new();
//! for (name, score) in [("carol", 92), ("alice", 100), ("bob", 85)] {
//!     scores.insert(name, score).unwrap();
//! }
//!
//! assert_eq!(scores.get(&"bob"), Some(&85));
//! assert_eq!(scores.select(1), Some((&"bob", &85)));
//! assert_eq!(scores.rank_of(&"carol"), Some(2));
//! assert_eq!(scores[Rank(0)], 100);
//! assert_eq!(scores.next(&"alice"), Ok(Some((&"bob", &85))));
//!
//! let mut goals: DisjointSet<i32> = DisjointSet::new();
//! let a = goals.make_set(1).unwrap();
//! let b = goals.make_set(2).unwrap();
//! goals.unite_with(a, b, &10);
//! assert_eq!((goals.aggregate(a), goals.aggregate(b)), (1, 12));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - only requires `alloc`
//! - **Fallible allocation** - growth goes through `try_reserve`; an allocation
//!   failure is reported as [`Error::Alloc`] and leaves the structure unchanged
//! - **No unsafe code** - nodes live in an arena and link to each other by handle

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod disjoint_set;
mod error;
mod linked_view;
mod offset;
mod order_statistic;
mod permutation;
mod raw;

pub mod ordered_map;
pub mod tournament;

pub use compare::{Compare, FnCompare, Natural, Reverse};
pub use disjoint_set::{DisjointSet, ElementId};
pub use error::Error;
pub use linked_view::{Link, LinkedView};
pub use offset::Offset;
pub use order_statistic::Rank;
pub use ordered_map::OrderedMap;
pub use permutation::Permutation;
