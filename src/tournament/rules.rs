/// Scoring and eligibility settings of a [`Tournament`](super::Tournament).
///
/// ```
/// use indexed_store::tournament::{Rules, Tournament};
///
/// let five_a_side = Rules { min_roster: 5, ..Rules::default() };
/// let tournament = Tournament::with_rules(five_a_side);
/// assert_eq!(tournament.rules().points_for_win, 3);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rules {
    /// Players a team needs, one of them a goalkeeper, before it may play.
    pub min_roster: usize,
    pub points_for_win: i64,
    pub points_for_draw: i64,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            min_roster: 11,
            points_for_win: 3,
            points_for_draw: 1,
        }
    }
}

/// Result of a match, from the first team's point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    FirstWins,
    SecondWins,
    Draw,
}

impl Rules {
    /// Points awarded to (first, second) for `outcome`.
    #[must_use]
    pub fn points(&self, outcome: Outcome) -> (i64, i64) {
        match outcome {
            Outcome::FirstWins => (self.points_for_win, 0),
            Outcome::SecondWins => (0, self.points_for_win),
            Outcome::Draw => (self.points_for_draw, self.points_for_draw),
        }
    }
}
