use core::cmp::Ordering;

use crate::compare::Compare;
use crate::disjoint_set::ElementId;

use super::{PlayerId, Spirit, TeamId};

/// Everything needed to register a player.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlayerSpec {
    pub id: PlayerId,
    pub team: TeamId,
    pub games_played: u32,
    pub goals: u32,
    pub cards: u32,
    pub ability: i64,
    pub goalkeeper: bool,
    pub spirit: Spirit,
}

impl PlayerSpec {
    /// A player with no record yet, an ability of zero and a neutral spirit.
    #[must_use]
    pub fn new(id: PlayerId, team: TeamId) -> Self {
        PlayerSpec {
            id,
            team,
            games_played: 0,
            goals: 0,
            cards: 0,
            ability: 0,
            goalkeeper: false,
            spirit: Spirit::identity(),
        }
    }

    // Ids are positive, and a player without games has neither goals nor cards.
    pub(super) fn is_valid(&self) -> bool {
        self.id != 0 && self.team != 0 && (self.games_played > 0 || (self.goals == 0 && self.cards == 0))
    }
}

pub(super) struct Player {
    pub(super) id: PlayerId,
    pub(super) team: TeamId,
    // Games played outside of the team's matches; matches are counted by the group.
    pub(super) own_games: i64,
    pub(super) goals: u32,
    pub(super) cards: u32,
    pub(super) ability: i64,
    pub(super) goalkeeper: bool,
    pub(super) element: ElementId,
}

impl Player {
    pub(super) fn from_spec(spec: &PlayerSpec, element: ElementId) -> Self {
        Player {
            id: spec.id,
            team: spec.team,
            own_games: i64::from(spec.games_played),
            goals: spec.goals,
            cards: spec.cards,
            ability: spec.ability,
            goalkeeper: spec.goalkeeper,
            element,
        }
    }

    pub(super) fn standing(&self) -> Standing {
        Standing {
            goals: self.goals,
            cards: self.cards,
            id: self.id,
        }
    }
}

/// A player's position in the performance order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(super) struct Standing {
    pub(super) goals: u32,
    pub(super) cards: u32,
    pub(super) id: PlayerId,
}

impl Standing {
    /// Per-field distances used to pick the closer of two neighbours.
    fn distance(&self, other: &Standing) -> (u32, u32, u32) {
        (
            self.goals.abs_diff(other.goals),
            self.cards.abs_diff(other.cards),
            self.id.abs_diff(other.id),
        )
    }

    /// The closer of `previous` and `next`; a full tie goes to the larger id.
    pub(super) fn closest(&self, previous: &Standing, next: &Standing) -> PlayerId {
        match self.distance(next).cmp(&self.distance(previous)) {
            Ordering::Less => next.id,
            Ordering::Greater => previous.id,
            Ordering::Equal => next.id.max(previous.id),
        }
    }
}

/// Fewer goals first, then more cards, then lower id. The best player sorts last.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct ByPerformance;

impl Compare<Standing> for ByPerformance {
    fn compare(&self, a: &Standing, b: &Standing) -> Ordering {
        a.goals
            .cmp(&b.goals)
            .then_with(|| b.cards.cmp(&a.cards))
            .then_with(|| a.id.cmp(&b.id))
    }
}
