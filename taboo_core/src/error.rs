use thiserror::Error;

use crate::team::{PlayerIndex, TeamId};

/// Rejected game setup or configuration. Raised before a game starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} has no name")]
    EmptyTeamName(TeamId),
    #[error("{0} has no players")]
    EmptyTeam(TeamId),
    #[error("player {index} of {team} has no name")]
    EmptyPlayerName { team: TeamId, index: PlayerIndex },
    #[error("round duration must be at least one second")]
    ZeroRoundDuration,
    #[error("at least one category must be selected")]
    NoCategories,
    #[error("no card set selected")]
    EmptySet,
    #[error("cannot read configuration: {0}")]
    Unreadable(String),
}

/// Broken engine invariants and out-of-order engine calls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("turn of player {player_index} of {team} in cycle {cycle} is already recorded")]
    AlreadyRecorded {
        team: TeamId,
        player_index: PlayerIndex,
        cycle: u32,
    },
    #[error("no player of {0} is available, even after refilling the pool")]
    NoPlayerAvailable(TeamId),
    #[error("{team} has no player {player_index}")]
    UnknownPlayer {
        team: TeamId,
        player_index: PlayerIndex,
    },
    #[error("game is not finished: {recorded} of {total} turns recorded")]
    GameNotFinished { recorded: usize, total: usize },
    #[error("game has not been started")]
    NotStarted,
    #[error("game has already been started")]
    AlreadyStarted,
    #[error("no turn is waiting to be started")]
    NoTurnPending,
    #[error("no turn is in progress")]
    NoTurnActive,
    #[error("round has not ended yet")]
    RoundNotEnded,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can stop a game from being played to the end.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
