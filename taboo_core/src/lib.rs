use std::sync::Arc;

use config::{GameConfig, GameSetup};
use error::GameError;
use event::Event;
use ledger::GameResult;
use provider::{CardProvider, ScoreStore, SessionStore};
use runner::{Command, GameRunner};
use session::GameSession;
use tokio::sync::mpsc::{Receiver, UnboundedSender};

pub mod card;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod provider;
pub mod round;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod team;

/// Plays one game with a fresh random draw of the first team.
pub async fn run_game<S>(
    setup: GameSetup,
    config: GameConfig,
    cards: Arc<dyn CardProvider>,
    store: Arc<S>,
    commands: Receiver<Command>,
    events: UnboundedSender<Event>,
) -> Result<Option<GameResult>, GameError>
where
    S: ScoreStore + SessionStore + 'static,
{
    let session = GameSession::new(setup, config)?;
    let runner = GameRunner::new(session, cards, store.clone(), store);
    Ok(runner.run(commands, events).await?)
}
