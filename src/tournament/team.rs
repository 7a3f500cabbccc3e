use crate::disjoint_set::ElementId;
use crate::linked_view::Link;
use crate::ordered_map::OrderedMap;

use super::player::{ByPerformance, Standing};
use super::{PlayerId, Spirit};

pub(super) struct Team {
    pub(super) points: i64,
    // Product of the spirits of every player that joined, in joining order.
    pub(super) spirit: Spirit,
    pub(super) ability: i64,
    pub(super) goalkeepers: usize,
    pub(super) roster: OrderedMap<PlayerId, Link>,
    pub(super) ranking: OrderedMap<Standing, Link, ByPerformance>,
    // Anchor of the team's group: matches are applied here, players join it.
    pub(super) group: ElementId,
}

impl Team {
    pub(super) fn new(points: i64, group: ElementId) -> Self {
        Team {
            points,
            spirit: Spirit::identity(),
            ability: 0,
            goalkeepers: 0,
            roster: OrderedMap::new(),
            ranking: OrderedMap::with_comparator(ByPerformance),
            group,
        }
    }

    pub(super) fn is_eligible(&self, min_roster: usize) -> bool {
        self.goalkeepers > 0 && self.roster.len() >= min_roster
    }
}
