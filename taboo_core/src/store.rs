use async_trait::async_trait;
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};
use std::{io::ErrorKind, path::PathBuf};
use tokio::sync::Mutex;

use crate::{
    error::StoreError,
    provider::{
        best_scores, push_session, ScoreRecord, ScoreStore, SessionRecord, SessionStore,
    },
};

const SCORES_FILE: &str = "scores.json";
const SESSIONS_FILE: &str = "sessions.json";

/// Keeps scores and session history as JSON documents in a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        JsonFileStore {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet", path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save<T: Serialize + Sync>(&self, file: &str, items: &[T]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(items)?;
        tokio::fs::write(self.dir.join(file), json).await?;
        Ok(())
    }
}

#[async_trait]
impl ScoreStore for JsonFileStore {
    async fn persist_score(&self, record: ScoreRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut scores: Vec<ScoreRecord> = self.load(SCORES_FILE).await?;
        info!("Saving score {} for {}", record.score, record.player);
        scores.push(record);
        self.save(SCORES_FILE, &scores).await
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let scores: Vec<ScoreRecord> = self.load(SCORES_FILE).await?;
        Ok(best_scores(&scores, limit))
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn save_session(&self, record: SessionRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.load(SESSIONS_FILE).await?;
        push_session(&mut sessions, record);
        self.save(SESSIONS_FILE, &sessions).await
    }

    async fn sessions(&self) -> Result<Vec<SessionRecord>, StoreError> {
        self.load(SESSIONS_FILE).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::{Duration, OffsetDateTime};

    use super::JsonFileStore;
    use crate::{
        config::{GameConfig, GameSetup},
        error::StoreError,
        provider::{ScoreRecord, ScoreStore, SessionRecord, SessionStore},
        team::TeamRoster,
    };

    fn score(player: &str, score: u32) -> ScoreRecord {
        ScoreRecord {
            player: player.to_string(),
            team: "Foxes".to_string(),
            score,
            skips: 1,
            recorded_at: OffsetDateTime::UNIX_EPOCH + Duration::minutes(score as i64),
        }
    }

    #[tokio::test]
    async fn empty_directory_should_read_as_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing"));

        assert!(store.top_scores(5).await.unwrap().is_empty());
        assert_eq!(store.last_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn scores_should_survive_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.persist_score(score("Ann", 4)).await.unwrap();
        store.persist_score(score("Bo", 7)).await.unwrap();

        let reopened = JsonFileStore::new(dir.path());
        let top = reopened.top_scores(10).await.unwrap();
        assert_eq!(top, vec![score("Bo", 7), score("Ann", 4)]);
    }

    #[tokio::test]
    async fn concurrent_writes_should_all_be_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));

        let writes = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.persist_score(score("Cid", i)).await })
            })
            .collect::<Vec<_>>();
        for write in writes {
            write.await.unwrap().unwrap();
        }

        assert_eq!(store.top_scores(100).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn last_session_should_be_the_newest() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        for set in ["Set One", "Set Two"] {
            let setup = GameSetup {
                team_one: TeamRoster::new("Owls", &["Ann"]),
                team_two: TeamRoster::new("Foxes", &["Bo"]),
                categories: ["Animals".to_string()].into(),
                set: set.to_string(),
            };
            let record = SessionRecord::new(&setup, &GameConfig::default(), OffsetDateTime::UNIX_EPOCH);
            store.save_session(record).await.unwrap();
        }

        let last = store.last_session().await.unwrap().unwrap();
        assert_eq!(last.setup.set, "Set Two");
        assert_eq!(last.max_skips_per_round, 3);
    }

    #[tokio::test]
    async fn corrupt_file_should_surface_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scores.json"), "not json").unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(matches!(
            store.top_scores(3).await,
            Err(StoreError::Json(_))
        ));
    }
}
