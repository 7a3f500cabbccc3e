use crate::error::Error;

use super::{PlayerId, TeamId};

/// Failures of [`Tournament`](super::Tournament) operations.
///
/// Every operation checks its inputs and reserves the memory it needs before
/// touching any index, so an error leaves the tournament unchanged.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TournamentError {
    /// An id was zero, two ids that must differ were equal, or a range was empty.
    #[error("invalid input")]
    InvalidInput,
    #[error("no team with id {0}")]
    UnknownTeam(TeamId),
    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),
    #[error("team {0} already exists")]
    DuplicateTeam(TeamId),
    #[error("player {0} already exists")]
    DuplicatePlayer(PlayerId),
    /// Teams can only be removed once their roster is empty.
    #[error("team {0} still has players")]
    TeamNotEmpty(TeamId),
    /// The team lacks the roster size or the goalkeeper needed to play.
    #[error("team {0} is not eligible to play")]
    TeamNotEligible(TeamId),
    /// The query needs at least one (other) player.
    #[error("not enough players")]
    NoPlayers,
    #[error(transparent)]
    Store(#[from] Error),
}
