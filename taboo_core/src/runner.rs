use log::{debug, info, warn};
use std::{future::Future, pin::Pin, sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::{
    sync::mpsc::{Receiver, UnboundedSender},
    time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep},
};

use crate::{
    card::WordCard,
    error::EngineError,
    event::Event,
    ledger::GameResult,
    provider::{CardProvider, ScoreRecord, ScoreStore, SessionRecord, SessionStore},
    round::{FetchTicket, RoundEnd},
    session::{GameSession, Progress},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartTurn,
    Correct,
    Skip,
    Disqualify,
    Quit,
}

type CardFuture = Pin<Box<dyn Future<Output = Option<WordCard>> + Send>>;

struct PendingFetch {
    ticket: FetchTicket,
    card: CardFuture,
}

/// Fires once per second of a running round. Dropping it stops the countdown.
struct Countdown(Interval);

impl Countdown {
    fn start() -> Self {
        let second = Duration::from_secs(1);
        let mut interval = interval_at(Instant::now() + second, second);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Countdown(interval)
    }
}

async fn next_second(countdown: &mut Option<Countdown>) {
    match countdown {
        Some(Countdown(interval)) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn next_card(fetch: &mut Option<PendingFetch>) -> (FetchTicket, Option<WordCard>) {
    match fetch {
        Some(pending) => (pending.ticket, pending.card.as_mut().await),
        None => std::future::pending().await,
    }
}

async fn pause_over(pause: &mut Option<Pin<Box<Sleep>>>) {
    match pause {
        Some(delay) => delay.as_mut().await,
        None => std::future::pending().await,
    }
}

/// Drives a [`GameSession`] in real time: operator commands, the round
/// countdown, card lookups and the pause between turns.
pub struct GameRunner {
    session: GameSession,
    cards: Arc<dyn CardProvider>,
    scores: Arc<dyn ScoreStore>,
    sessions: Arc<dyn SessionStore>,
}

impl GameRunner {
    pub fn new(
        session: GameSession,
        cards: Arc<dyn CardProvider>,
        scores: Arc<dyn ScoreStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        GameRunner {
            session,
            cards,
            scores,
            sessions,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Plays the game until it finishes, the operator quits or the command
    /// channel closes. Returns the result of a finished game.
    ///
    /// Every timer and outstanding card request is owned by this future, so
    /// returning or dropping it cancels them all.
    pub async fn run(
        mut self,
        mut commands: Receiver<Command>,
        events: UnboundedSender<Event>,
    ) -> Result<Option<GameResult>, EngineError> {
        let mut log = Vec::new();
        let mut countdown: Option<Countdown> = None;
        let mut fetch: Option<PendingFetch> = None;
        let mut pause: Option<Pin<Box<Sleep>>> = None;

        self.session.begin(&mut log)?;
        publish(&mut log, &events);

        loop {
            let ended = tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        info!("Operator went away, abandoning the game");
                        return Ok(None);
                    };
                    debug!("command {:?}", command);
                    match command {
                        Command::Quit => {
                            info!("Game abandoned");
                            return Ok(None);
                        }
                        Command::StartTurn => {
                            if let Some(ticket) = self.session.start_turn(&mut log)? {
                                countdown = Some(Countdown::start());
                                fetch = Some(self.fetch(ticket));
                            }
                            None
                        }
                        Command::Correct => {
                            if let Some(ticket) = self.session.mark_correct(&mut log) {
                                fetch = Some(self.fetch(ticket));
                            }
                            None
                        }
                        Command::Skip => {
                            if let Some(ticket) = self.session.mark_skip(&mut log) {
                                fetch = Some(self.fetch(ticket));
                            }
                            None
                        }
                        Command::Disqualify => self.session.mark_disqualified(&mut log)?,
                    }
                }
                _ = next_second(&mut countdown) => self.session.tick(&mut log)?,
                (ticket, card) = next_card(&mut fetch) => {
                    fetch = None;
                    self.session.card_arrived(ticket, card, &mut log);
                    None
                }
                _ = pause_over(&mut pause) => {
                    pause = None;
                    if let Progress::Finished(result) = self.session.advance(&mut log)? {
                        publish(&mut log, &events);
                        self.save_session().await;
                        return Ok(Some(result));
                    }
                    None
                }
            };

            if let Some(end) = ended {
                countdown = None;
                fetch = None;
                let delay = match end {
                    RoundEnd::Expired => self.session.config().expiry_pause(),
                    RoundEnd::Disqualified => self.session.config().disqualification_pause(),
                };
                debug!("next turn in {:?}", delay);
                pause = Some(Box::pin(sleep(delay)));
                self.persist_last_score(&events);
            }
            publish(&mut log, &events);
        }
    }

    fn fetch(&self, ticket: FetchTicket) -> PendingFetch {
        let cards = Arc::clone(&self.cards);
        let filter = self.session.filter();
        PendingFetch {
            ticket,
            card: Box::pin(async move { cards.fetch_card(&filter).await }),
        }
    }

    fn persist_last_score(&self, events: &UnboundedSender<Event>) {
        let Some(record) = self.session.last_record() else {
            return;
        };
        let record = ScoreRecord::from_turn(record, OffsetDateTime::now_utc());
        let scores = Arc::clone(&self.scores);
        let events = events.clone();
        tokio::spawn(async move {
            if let Err(e) = scores.persist_score(record).await {
                warn!("Could not save score: {}", e);
                _ = events.send(Event::ScoreSaveFailed(e.to_string()));
            }
        });
    }

    async fn save_session(&self) {
        let record = SessionRecord::new(
            self.session.setup(),
            self.session.config(),
            OffsetDateTime::now_utc(),
        );
        if let Err(e) = self.sessions.save_session(record).await {
            warn!("Could not save session: {}", e);
        }
    }
}

fn publish(log: &mut Vec<Event>, events: &UnboundedSender<Event>) {
    for event in log.drain(..) {
        _ = events.send(event);
    }
}
