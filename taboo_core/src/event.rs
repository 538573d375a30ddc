use serde::{Deserialize, Serialize};

use crate::{
    card::WordCard,
    ledger::{GameResult, TurnRecord},
    round::RoundEnd,
    team::{TeamId, Turn},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Next player picked; waits for the operator to start the turn.
    TurnPending(Turn),
    TurnStarted { turn: Turn, seconds: u32 },
    Tick(u32),
    CardShown(WordCard),
    NoCardAvailable,
    Correct(u32),
    Skip { used: u32, remaining: u32 },
    RoundEnded { turn: Turn, end: RoundEnd },
    TurnRecorded(TurnRecord),
    PoolRefilled(TeamId),
    ScoreSaveFailed(String),
    GameFinished(GameResult),
}
