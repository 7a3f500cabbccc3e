use indexed_store::{DisjointSet, ElementId, Permutation};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

type P4 = Permutation<4>;

const ELEMENTS: usize = 64;

fn p4() -> impl Strategy<Value = P4> {
    Just(vec![0u8, 1, 2, 3])
        .prop_shuffle()
        .prop_map(|images| P4::new([images[0], images[1], images[2], images[3]]).unwrap())
}

#[derive(Debug, Clone)]
enum SetOp {
    Unite(usize, usize, i64, P4),
    Apply(usize, i64, P4),
    Find(usize),
    Aggregate(usize),
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    let element = 0..ELEMENTS;
    prop_oneof![
        3 => (element.clone(), element.clone(), -50i64..50, p4()).prop_map(|(a, b, n, p)| SetOp::Unite(a, b, n, p)),
        2 => (element.clone(), -50i64..50, p4()).prop_map(|(e, n, p)| SetOp::Apply(e, n, p)),
        1 => element.clone().prop_map(SetOp::Find),
        2 => element.prop_map(SetOp::Aggregate),
    ]
}

/// Flat reference: a group label and a resolved value per element.
struct Model {
    group: Vec<usize>,
    value: Vec<(i64, P4)>,
}

impl Model {
    fn members(&self, element: usize) -> Vec<usize> {
        let label = self.group[element];
        (0..self.group.len()).filter(|&i| self.group[i] == label).collect()
    }

    fn push_front(&mut self, members: &[usize], delta: (i64, P4)) {
        for &i in members {
            let (n, p) = self.value[i];
            self.value[i] = (delta.0 + n, delta.1 * p);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn aggregates_match_flat_model(
        initial in proptest::collection::vec((-50i64..50, p4()), ELEMENTS),
        ops in proptest::collection::vec(set_op_strategy(), 400),
    ) {
        let mut set: DisjointSet<(i64, P4)> = DisjointSet::new();
        let ids: Vec<ElementId> = initial.iter().map(|&v| set.make_set(v).unwrap()).collect();
        let mut model = Model { group: (0..ELEMENTS).collect(), value: initial };

        for op in ops {
            match op {
                SetOp::Unite(a, b, n, p) => {
                    set.unite_with(ids[a], ids[b], &(n, p));
                    if model.group[a] != model.group[b] {
                        let absorbed = model.members(b);
                        model.push_front(&absorbed, (n, p));
                        let label = model.group[a];
                        for i in absorbed {
                            model.group[i] = label;
                        }
                    }
                }
                SetOp::Apply(e, n, p) => {
                    set.apply(ids[e], &(n, p));
                    let members = model.members(e);
                    model.push_front(&members, (n, p));
                }
                SetOp::Find(e) => {
                    let root = set.find(ids[e]);
                    prop_assert_eq!(set.find(root), root);
                }
                SetOp::Aggregate(e) => {
                    prop_assert_eq!(set.aggregate_uncompressed(ids[e]), model.value[e]);
                    prop_assert_eq!(set.aggregate(ids[e]), model.value[e]);
                    prop_assert_eq!(set.group_size(ids[e]), model.members(e).len());
                }
            }
        }

        for e in 0..ELEMENTS {
            prop_assert_eq!(set.aggregate(ids[e]), model.value[e]);
            for other in 0..ELEMENTS {
                prop_assert_eq!(set.same_group(ids[e], ids[other]), model.group[e] == model.group[other]);
            }
        }
    }
}

#[test]
fn three_singletons_with_interleaved_finds() {
    let mut set: DisjointSet<i64> = DisjointSet::new();
    let a = set.make_set(1).unwrap();
    let b = set.make_set(10).unwrap();
    let c = set.make_set(100).unwrap();

    set.unite_with(a, b, &5);
    assert_eq!(set.aggregate(b), 15);
    set.find(b);
    set.unite_with(c, a, &-1);
    set.find(a);
    set.apply(b, &1000);

    assert_eq!(set.aggregate(a), 1000);
    assert_eq!(set.aggregate(b), 1014);
    assert_eq!(set.aggregate(c), 1100);
    assert_eq!(set.group_size(c), 3);
}

#[test]
fn find_is_idempotent() {
    let mut set: DisjointSet<()> = DisjointSet::with_capacity(8);
    let ids: Vec<_> = (0..8).map(|_| set.make_set(()).unwrap()).collect();
    for pair in ids.windows(2) {
        set.unite(pair[1], pair[0]);
    }
    let root = set.find(ids[7]);
    for &id in &ids {
        assert_eq!(set.find(id), root);
        assert_eq!(set.find(id), root);
    }
    assert_eq!(set.len(), 8);
}
