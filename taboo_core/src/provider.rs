use async_trait::async_trait;
use itertools::Itertools;
use log::debug;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    card::{CardFilter, WordCard},
    config::{GameConfig, GameSetup},
    error::StoreError,
    ledger::TurnRecord,
};

/// Finished game sessions kept for setup defaults.
pub const SESSION_HISTORY_LEN: usize = 10;

#[async_trait]
pub trait CardProvider: Send + Sync {
    /// A uniformly random card matching the filter, if there is any.
    async fn fetch_card(&self, filter: &CardFilter) -> Option<WordCard>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player: String,
    pub team: String,
    pub score: u32,
    pub skips: u32,
    pub recorded_at: OffsetDateTime,
}

impl ScoreRecord {
    pub fn from_turn(record: &TurnRecord, recorded_at: OffsetDateTime) -> Self {
        ScoreRecord {
            player: record.turn.player_name.clone(),
            team: record.turn.team_name.clone(),
            score: record.score,
            skips: record.skips_used,
            recorded_at,
        }
    }
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn persist_score(&self, record: ScoreRecord) -> Result<(), StoreError>;

    /// Best scores first.
    async fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub recorded_at: OffsetDateTime,
    pub setup: GameSetup,
    pub max_skips_per_round: u32,
    pub round_duration_seconds: u32,
}

impl SessionRecord {
    pub fn new(setup: &GameSetup, config: &GameConfig, recorded_at: OffsetDateTime) -> Self {
        SessionRecord {
            recorded_at,
            setup: setup.clone(),
            max_skips_per_round: config.max_skips_per_round,
            round_duration_seconds: config.round_duration_seconds,
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save_session(&self, record: SessionRecord) -> Result<(), StoreError>;

    /// Newest first.
    async fn sessions(&self) -> Result<Vec<SessionRecord>, StoreError>;

    async fn last_session(&self) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.sessions().await?.into_iter().next())
    }
}

pub(crate) fn best_scores(scores: &[ScoreRecord], limit: usize) -> Vec<ScoreRecord> {
    scores
        .iter()
        .sorted_by(|a, b| b.score.cmp(&a.score))
        .take(limit)
        .cloned()
        .collect()
}

pub(crate) fn push_session(sessions: &mut Vec<SessionRecord>, record: SessionRecord) {
    sessions.insert(0, record);
    sessions.truncate(SESSION_HISTORY_LEN);
}

pub struct MemoryDeck {
    cards: Vec<WordCard>,
}

impl MemoryDeck {
    pub fn new(cards: Vec<WordCard>) -> Self {
        MemoryDeck { cards }
    }

    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(MemoryDeck::new(serde_json::from_str(&json)?))
    }

    pub fn cards(&self) -> &[WordCard] {
        &self.cards
    }

    fn pick(&self, filter: &CardFilter) -> Option<WordCard> {
        let matching = self.cards.iter().filter(|c| c.matches(filter)).collect_vec();
        debug!("{} cards match the selection", matching.len());
        matching.choose(&mut rand::thread_rng()).map(|&c| c.clone())
    }
}

#[async_trait]
impl CardProvider for MemoryDeck {
    async fn fetch_card(&self, filter: &CardFilter) -> Option<WordCard> {
        self.pick(filter)
    }
}

/// Score and session history that lives as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    scores: Mutex<Vec<ScoreRecord>>,
    sessions: Mutex<Vec<SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn persist_score(&self, record: ScoreRecord) -> Result<(), StoreError> {
        self.scores.lock().await.push(record);
        Ok(())
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(best_scores(&self.scores.lock().await, limit))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save_session(&self, record: SessionRecord) -> Result<(), StoreError> {
        push_session(&mut *self.sessions.lock().await, record);
        Ok(())
    }

    async fn sessions(&self) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.sessions.lock().await.clone())
    }
}
