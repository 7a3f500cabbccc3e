//! Teams and players kept in several indexes at once.
//!
//! The tournament is a consumer of the crate's structures:
//!
//! - player records live in a [`LinkedView`] threaded in global performance
//!   order, and are indexed by id and by performance, globally and per team;
//! - every team owns a [`DisjointSet`] group: a match applies one game to the
//!   whole group, and each player's partial spirit is the product of the
//!   spirits of the players who joined the team before it, itself included;
//! - teams are indexed by id, by `(ability, id)` for rank queries, and, while
//!   eligible to play, in a linked view ordered by id.
//!
//! # Examples
//!
//! ```
//! use indexed_store::tournament::{Outcome, PlayerSpec, Rules, Tournament};
//!
//! let mut cup = Tournament::with_rules(Rules { min_roster: 2, ..Rules::default() });
//! cup.add_team(1, 0).unwrap();
//! cup.add_team(2, 0).unwrap();
//! for (id, team, goals) in [(10, 1, 3), (11, 1, 0), (20, 2, 1), (21, 2, 5)] {
//!     let spec = PlayerSpec { games_played: 1, goals, goalkeeper: id % 10 == 0, ..PlayerSpec::new(id, team) };
//!     cup.add_player(spec).unwrap();
//! }
//!
//! cup.record_match(1, 2, Outcome::Draw).unwrap();
//! assert_eq!(cup.team_points(1), Ok(1));
//! assert_eq!(cup.games_played(11), Ok(2));
//! assert_eq!(cup.top_scorer(None), Ok(21));
//! assert_eq!(cup.closest_player(20, 2), Ok(11));
//!
//! cup.merge_teams(1, 2).unwrap();
//! assert_eq!(cup.all_players(Some(1)).unwrap(), [11, 20, 10, 21]);
//! ```

use alloc::vec::Vec;

use crate::compare::Compare;
use crate::disjoint_set::DisjointSet;
use crate::error::Error;
use crate::linked_view::{Link, LinkedView};
use crate::offset::Offset;
use crate::ordered_map::OrderedMap;
use crate::permutation::Permutation;

mod error;
mod player;
mod rules;
mod team;

pub use error::TournamentError;
pub use player::PlayerSpec;
pub use rules::{Outcome, Rules};

use player::{ByPerformance, Player, Standing};
use team::Team;

pub type PlayerId = u32;
pub type TeamId = u32;

/// The transform each player contributes to its team's spirit.
pub type Spirit = Permutation<5>;

// Per-player group offset: team matches played since joining, partial spirit.
type Record = (i64, Spirit);

type Result<T> = core::result::Result<T, TournamentError>;

/// Teams, players, and the indexes that tie them together.
pub struct Tournament {
    rules: Rules,
    teams: OrderedMap<TeamId, Team>,
    by_ability: OrderedMap<(i64, TeamId), ()>,
    eligible: OrderedMap<TeamId, Link>,
    eligible_view: LinkedView<TeamId>,
    players: LinkedView<Player>,
    players_by_id: OrderedMap<PlayerId, Link>,
    standings: OrderedMap<Standing, Link, ByPerformance>,
    groups: DisjointSet<Record>,
}

impl Tournament {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        Tournament {
            rules,
            teams: OrderedMap::new(),
            by_ability: OrderedMap::new(),
            eligible: OrderedMap::new(),
            eligible_view: LinkedView::new(),
            players: LinkedView::new(),
            players_by_id: OrderedMap::new(),
            standings: OrderedMap::with_comparator(ByPerformance),
            groups: DisjointSet::new(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    fn team(&self, id: TeamId) -> Result<&Team> {
        if id == 0 {
            return Err(TournamentError::InvalidInput);
        }
        self.teams.get(&id).ok_or(TournamentError::UnknownTeam(id))
    }

    fn player_link(&self, id: PlayerId) -> Result<Link> {
        if id == 0 {
            return Err(TournamentError::InvalidInput);
        }
        self.players_by_id.get(&id).copied().ok_or(TournamentError::UnknownPlayer(id))
    }

    /// Registers a team with no players.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id or negative points, `DuplicateTeam` if the
    /// id is taken.
    pub fn add_team(&mut self, id: TeamId, points: i64) -> Result<()> {
        if id == 0 || points < 0 {
            return Err(TournamentError::InvalidInput);
        }
        if self.teams.contains_key(&id) {
            return Err(TournamentError::DuplicateTeam(id));
        }
        self.teams.try_reserve(1)?;
        self.by_ability.try_reserve(1)?;
        self.groups.try_reserve(1)?;

        let group = self.groups.make_set(Record::identity())?;
        self.teams.insert(id, Team::new(points, group))?;
        self.by_ability.insert((0, id), ())?;
        tracing::trace!(team = id, points, "added team");
        Ok(())
    }

    /// Removes a team whose roster is empty.
    ///
    /// # Errors
    ///
    /// `UnknownTeam`, or `TeamNotEmpty` while players remain.
    pub fn remove_team(&mut self, id: TeamId) -> Result<()> {
        let team = self.team(id)?;
        if !team.roster.is_empty() {
            return Err(TournamentError::TeamNotEmpty(id));
        }
        let team = self.teams.remove(&id)?;
        self.by_ability.remove(&(team.ability, id))?;
        tracing::debug!(team = id, "removed team");
        Ok(())
    }

    /// Adds a player to an existing team.
    ///
    /// The player joins the team's group with the team's current spirit as
    /// carry, so its partial spirit is the team spirit so far times its own.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero ids or goals/cards without games,
    /// `DuplicatePlayer`, `UnknownTeam`, or `Store` if memory runs out.
    pub fn add_player(&mut self, spec: PlayerSpec) -> Result<()> {
        if !spec.is_valid() {
            return Err(TournamentError::InvalidInput);
        }
        if self.players_by_id.contains_key(&spec.id) {
            return Err(TournamentError::DuplicatePlayer(spec.id));
        }
        self.team(spec.team)?;
        self.reserve_for_player(spec.team)?;

        let element = self.groups.make_set((0, spec.spirit))?;
        let link = self.players.insert(Player::from_spec(&spec, element))?;
        let standing = self.players.get(link).standing();
        self.players_by_id.insert(spec.id, link)?;
        self.standings.insert(standing, link)?;
        self.players.link(&self.standings, &standing)?;

        let team = self.teams.get_mut(&spec.team).ok_or(TournamentError::UnknownTeam(spec.team))?;
        self.groups.unite_with(team.group, element, &(0, team.spirit));
        team.spirit = team.spirit * spec.spirit;
        team.roster.insert(spec.id, link)?;
        team.ranking.insert(standing, link)?;
        if spec.goalkeeper {
            team.goalkeepers += 1;
        }
        let old_ability = team.ability;
        team.ability += spec.ability;
        let new_ability = team.ability;

        self.reindex_ability(spec.team, old_ability, new_ability)?;
        self.refresh_eligibility(spec.team)?;
        tracing::trace!(player = spec.id, team = spec.team, "added player");
        Ok(())
    }

    fn reserve_for_player(&mut self, team: TeamId) -> core::result::Result<(), Error> {
        self.groups.try_reserve(1)?;
        self.players.try_reserve(1)?;
        self.players_by_id.try_reserve(1)?;
        self.standings.try_reserve(1)?;
        self.eligible.try_reserve(1)?;
        self.eligible_view.try_reserve(1)?;
        self.by_ability.try_reserve(1)?;
        if let Some(team) = self.teams.get_mut(&team) {
            team.roster.try_reserve(1)?;
            team.ranking.try_reserve(1)?;
        }
        Ok(())
    }

    /// Removes a player from every index.
    ///
    /// The player's group element stays behind, unreachable. The team's
    /// spirit keeps the player's contribution.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownPlayer`.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<()> {
        let link = self.player_link(id)?;
        let player = self.players.get(link);
        let (team_id, standing) = (player.team, player.standing());
        let (ability, goalkeeper) = (player.ability, player.goalkeeper);

        self.players.unlink(link);
        self.standings.remove(&standing)?;
        self.players_by_id.remove(&id)?;

        let team = self.teams.get_mut(&team_id).ok_or(TournamentError::UnknownTeam(team_id))?;
        team.roster.remove(&id)?;
        team.ranking.remove(&standing)?;
        if goalkeeper {
            team.goalkeepers -= 1;
        }
        let old_ability = team.ability;
        team.ability -= ability;
        let new_ability = team.ability;

        self.players.remove(link);
        self.reindex_ability(team_id, old_ability, new_ability)?;
        self.refresh_eligibility(team_id)?;
        tracing::trace!(player = id, team = team_id, "removed player");
        Ok(())
    }

    /// Adds games, goals and cards to a player's record and moves it to its
    /// new place in the performance order.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownPlayer`.
    pub fn update_player_stats(&mut self, id: PlayerId, games: u32, goals: u32, cards: u32) -> Result<()> {
        let link = self.player_link(id)?;
        let player = self.players.get(link);
        let (team_id, old) = (player.team, player.standing());

        self.players.unlink(link);
        self.standings.remove(&old)?;
        let team = self.teams.get_mut(&team_id).ok_or(TournamentError::UnknownTeam(team_id))?;
        team.ranking.remove(&old)?;

        let player = self.players.get_mut(link);
        player.own_games += i64::from(games);
        player.goals = player.goals.saturating_add(goals);
        player.cards = player.cards.saturating_add(cards);
        let new = player.standing();

        // Both inserts reuse the slots the removals freed.
        team.ranking.insert(new, link)?;
        self.standings.insert(new, link)?;
        self.players.link(&self.standings, &new)?;
        tracing::trace!(player = id, goals = new.goals, cards = new.cards, "updated player stats");
        Ok(())
    }

    /// Records a match between two eligible teams: points go to the teams per
    /// the rules, and every player of both teams gains one game.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero or equal ids, `UnknownTeam`, `TeamNotEligible`.
    pub fn record_match(&mut self, first: TeamId, second: TeamId, outcome: Outcome) -> Result<()> {
        if first == second {
            return Err(TournamentError::InvalidInput);
        }
        for id in [first, second] {
            if !self.team(id)?.is_eligible(self.rules.min_roster) {
                return Err(TournamentError::TeamNotEligible(id));
            }
        }
        let game = (1, Spirit::identity());
        for (id, points) in [first, second].into_iter().zip(<[i64; 2]>::from(self.rules.points(outcome))) {
            let team = self.teams.get_mut(&id).ok_or(TournamentError::UnknownTeam(id))?;
            team.points += points;
            self.groups.apply(team.group, &game);
        }
        tracing::trace!(first, second, ?outcome, "recorded match");
        Ok(())
    }

    /// Games the player has played, including its team's matches since it joined.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownPlayer`.
    pub fn games_played(&mut self, id: PlayerId) -> Result<i64> {
        let link = self.player_link(id)?;
        let player = self.players.get(link);
        let (own, element) = (player.own_games, player.element);
        Ok(own + self.groups.aggregate(element).0)
    }

    /// Cards the player has collected so far.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownPlayer`.
    pub fn player_cards(&self, id: PlayerId) -> Result<u32> {
        let link = self.player_link(id)?;
        Ok(self.players.get(link).cards)
    }

    /// Product of the spirits of the player's teammates that joined before it,
    /// then its own.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownPlayer`.
    pub fn partial_spirit(&mut self, id: PlayerId) -> Result<Spirit> {
        let link = self.player_link(id)?;
        let element = self.players.get(link).element;
        Ok(self.groups.aggregate(element).1)
    }

    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownTeam`.
    pub fn team_points(&self, id: TeamId) -> Result<i64> {
        Ok(self.team(id)?.points)
    }

    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownTeam`.
    pub fn team_spirit(&self, id: TeamId) -> Result<Spirit> {
        Ok(self.team(id)?.spirit)
    }

    fn ranking(&self, team: Option<TeamId>) -> Result<&OrderedMap<Standing, Link, ByPerformance>> {
        match team {
            None => Ok(&self.standings),
            Some(id) => Ok(&self.team(id)?.ranking),
        }
    }

    /// Best player of a team, or of the whole tournament for `None`: most
    /// goals, then fewest cards, then highest id.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownTeam`, `NoPlayers`.
    pub fn top_scorer(&self, team: Option<TeamId>) -> Result<PlayerId> {
        let ranking = self.ranking(team)?;
        ranking.last().map(|(standing, _)| standing.id).ok_or(TournamentError::NoPlayers)
    }

    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownTeam`.
    pub fn players_count(&self, team: Option<TeamId>) -> Result<usize> {
        Ok(self.ranking(team)?.len())
    }

    /// Player ids from worst to best performance.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero id, `UnknownTeam`, `NoPlayers`, `Store` if
    /// the output cannot be allocated.
    pub fn all_players(&self, team: Option<TeamId>) -> Result<Vec<PlayerId>> {
        let ranking = self.ranking(team)?;
        if ranking.is_empty() {
            return Err(TournamentError::NoPlayers);
        }
        let mut ids = Vec::new();
        ids.try_reserve_exact(ranking.len()).map_err(Error::from)?;
        ids.extend(ranking.keys().map(|standing| standing.id));
        Ok(ids)
    }

    /// The player next to `id` in the global performance order that is
    /// closest to it: smallest goal difference, then card difference, then id
    /// difference, then the larger id.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero ids, `UnknownTeam`, `UnknownPlayer` if the
    /// player is not on the team, `NoPlayers` if it is the only player.
    pub fn closest_player(&self, id: PlayerId, team: TeamId) -> Result<PlayerId> {
        if id == 0 {
            return Err(TournamentError::InvalidInput);
        }
        let link = *self.team(team)?.roster.get(&id).ok_or(TournamentError::UnknownPlayer(id))?;
        let me = self.players.get(link).standing();
        let neighbour = |l: Link| self.players.get(l).standing();
        match (self.players.previous(link).map(neighbour), self.players.next(link).map(neighbour)) {
            (Some(previous), Some(next)) => Ok(me.closest(&previous, &next)),
            (Some(only), None) | (None, Some(only)) => Ok(only.id),
            (None, None) => Err(TournamentError::NoPlayers),
        }
    }

    /// The team at zero-based `rank` when teams are ordered by total ability,
    /// then id.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `rank` is not below the number of teams.
    pub fn team_by_ability_rank(&self, rank: usize) -> Result<TeamId> {
        self.by_ability.select(rank).map(|(&(_, id), _)| id).ok_or(TournamentError::InvalidInput)
    }

    /// Ids of the eligible teams in `min..=max`, ascending.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `min > max`, `Store` if the output cannot be allocated.
    pub fn eligible_teams_in(&self, min: TeamId, max: TeamId) -> Result<Vec<TeamId>> {
        if min > max {
            return Err(TournamentError::InvalidInput);
        }
        let mut ids = Vec::new();
        let mut current = self.eligible.eq_or_greater(&min).map(|(_, &link)| link);
        while let Some(link) = current {
            let id = *self.eligible_view.get(link);
            if id > max {
                break;
            }
            ids.try_reserve(1).map_err(Error::from)?;
            ids.push(id);
            current = self.eligible_view.next(link);
        }
        Ok(ids)
    }

    /// Moves every player of `bought` into `buyer` and removes `bought`.
    ///
    /// Points, abilities and goalkeepers add up. The bought players' partial
    /// spirits are prefixed with the buyer's spirit, and the buyer's spirit
    /// becomes the buyer's times the bought team's.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero or equal ids, `UnknownTeam`, `Store` if the
    /// merged rosters cannot be built. Nothing changes on error.
    pub fn merge_teams(&mut self, buyer: TeamId, bought: TeamId) -> Result<()> {
        if buyer == bought {
            return Err(TournamentError::InvalidInput);
        }
        let (ours, theirs) = (self.team(buyer)?, self.team(bought)?);
        let roster = merged(&ours.roster, &theirs.roster)?;
        let ranking = merged(&ours.ranking, &theirs.ranking)?;
        self.eligible.try_reserve(1)?;
        self.eligible_view.try_reserve(1)?;

        self.unlist_eligible(bought)?;
        let theirs = self.teams.remove(&bought)?;
        self.by_ability.remove(&(theirs.ability, bought))?;
        for &link in theirs.roster.values() {
            self.players.get_mut(link).team = buyer;
        }

        let ours = self.teams.get_mut(&buyer).ok_or(TournamentError::UnknownTeam(buyer))?;
        self.groups.unite_with(ours.group, theirs.group, &(0, ours.spirit));
        let old_ability = ours.ability;
        ours.roster = roster;
        ours.ranking = ranking;
        ours.points += theirs.points;
        ours.spirit = ours.spirit * theirs.spirit;
        ours.ability += theirs.ability;
        ours.goalkeepers += theirs.goalkeepers;
        let (new_ability, players) = (ours.ability, ours.roster.len());

        self.reindex_ability(buyer, old_ability, new_ability)?;
        self.refresh_eligibility(buyer)?;
        tracing::debug!(buyer, bought, players, "merged teams");
        Ok(())
    }

    /// Merges `first` and `second` into one team registered as `target`,
    /// which must be one of the two or an unused id.
    ///
    /// When `target` is `second`, `second` is the buyer; otherwise `first` is.
    /// The result then behaves as [`merge_teams`](Self::merge_teams) followed
    /// by moving the buyer to `target`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero or equal ids, `DuplicateTeam` if `target` is
    /// another existing team, `UnknownTeam`, `Store`. Nothing changes on error.
    pub fn merge_teams_into(&mut self, first: TeamId, second: TeamId, target: TeamId) -> Result<()> {
        if target == 0 {
            return Err(TournamentError::InvalidInput);
        }
        if target != first && target != second && self.teams.contains_key(&target) {
            return Err(TournamentError::DuplicateTeam(target));
        }
        let (buyer, bought) = if target == second { (second, first) } else { (first, second) };
        self.merge_teams(buyer, bought)?;
        if target != buyer {
            self.rename_team(buyer, target)?;
        }
        Ok(())
    }

    // Every insert reuses the slot its matching removal freed.
    fn rename_team(&mut self, from: TeamId, to: TeamId) -> Result<()> {
        self.unlist_eligible(from)?;
        let team = self.teams.remove(&from)?;
        self.by_ability.remove(&(team.ability, from))?;
        for &link in team.roster.values() {
            self.players.get_mut(link).team = to;
        }
        self.by_ability.insert((team.ability, to), ())?;
        self.teams.insert(to, team)?;
        self.refresh_eligibility(to)?;
        tracing::trace!(from, to, "renamed team");
        Ok(())
    }

    fn reindex_ability(&mut self, id: TeamId, old: i64, new: i64) -> Result<()> {
        if old != new {
            self.by_ability.remove(&(old, id))?;
            self.by_ability.insert((new, id), ())?;
        }
        Ok(())
    }

    fn unlist_eligible(&mut self, id: TeamId) -> Result<()> {
        if let Some(&link) = self.eligible.get(&id) {
            self.eligible_view.unlink(link);
            self.eligible.remove(&id)?;
            self.eligible_view.remove(link);
        }
        Ok(())
    }

    /// Lists or unlists a team in the eligible view to match its roster.
    fn refresh_eligibility(&mut self, id: TeamId) -> Result<()> {
        let eligible = self.teams.get(&id).is_some_and(|team| team.is_eligible(self.rules.min_roster));
        let listed = self.eligible.contains_key(&id);
        if eligible && !listed {
            let link = self.eligible_view.insert(id)?;
            self.eligible.insert(id, link)?;
            self.eligible_view.link(&self.eligible, &id)?;
            tracing::trace!(team = id, "team became eligible");
        } else if !eligible && listed {
            self.unlist_eligible(id)?;
            tracing::trace!(team = id, "team is no longer eligible");
        }
        Ok(())
    }
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}

/// Union of two disjoint indexes, built without touching either.
fn merged<K, C>(a: &OrderedMap<K, Link, C>, b: &OrderedMap<K, Link, C>) -> core::result::Result<OrderedMap<K, Link, C>, Error>
where
    K: Copy,
    C: Compare<K> + Clone,
{
    let cmp = a.comparator().clone();
    let mut entries = Vec::new();
    entries.try_reserve_exact(a.len() + b.len())?;
    let (mut left, mut right) = (a.iter().peekable(), b.iter().peekable());
    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(x), Some(y)) => cmp.compare(x.0, y.0).is_lt(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        entries.extend(next.map(|(&k, &l)| (k, l)));
    }
    OrderedMap::from_sorted_with(entries, cmp)
}
