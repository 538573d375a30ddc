use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    card::{CardFilter, WordCard},
    config::{GameConfig, GameSetup},
    error::{ConfigError, EngineError},
    event::Event,
    ledger::{GameResult, ScoringLedger, TurnRecord},
    round::{FetchTicket, RoundController, RoundEnd, RoundPhase},
    scheduler::{Advance, TurnScheduler},
    team::Turn,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    NextTurn(Turn),
    Finished(GameResult),
}

/// One game on one device: who plays, the running round and the score sheet.
pub struct GameSession {
    setup: GameSetup,
    config: GameConfig,
    scheduler: TurnScheduler,
    round: RoundController,
    ledger: ScoringLedger,
    card: Option<WordCard>,
    result: Option<GameResult>,
}

impl GameSession {
    pub fn new(setup: GameSetup, config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(setup, config, StdRng::from_entropy())
    }

    pub fn with_rng(
        setup: GameSetup,
        config: GameConfig,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        setup.validate()?;
        config.validate()?;
        Ok(GameSession {
            scheduler: TurnScheduler::new(setup.team_one.clone(), setup.team_two.clone(), rng),
            round: RoundController::new(&config),
            ledger: ScoringLedger::new(
                config.disqualification_rule,
                setup.team_one.clone(),
                setup.team_two.clone(),
            ),
            setup,
            config,
            card: None,
            result: None,
        })
    }

    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn filter(&self) -> CardFilter {
        self.setup.filter()
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn round(&self) -> &RoundController {
        &self.round
    }

    pub fn ledger(&self) -> &ScoringLedger {
        &self.ledger
    }

    /// Card on display. Stays put when a replacement cannot be found.
    pub fn card(&self) -> Option<&WordCard> {
        self.card.as_ref()
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn last_record(&self) -> Option<&TurnRecord> {
        self.ledger.records().last()
    }

    pub fn begin(&mut self, log: &mut Vec<Event>) -> Result<Turn, EngineError> {
        let turn = self.scheduler.begin()?;
        log.push(Event::TurnPending(turn.clone()));
        Ok(turn)
    }

    /// Starts the pending turn and asks for its first card. Ignored unless a
    /// turn is waiting and no round is in progress.
    pub fn start_turn(
        &mut self,
        log: &mut Vec<Event>,
    ) -> Result<Option<FetchTicket>, EngineError> {
        if self.scheduler.pending().is_none() || self.round.phase() != RoundPhase::Idle {
            warn!("no turn waiting to be started");
            return Ok(None);
        }
        let turn = self.scheduler.start_pending()?;
        self.round.start();
        self.card = None;
        info!("{} is up", turn);
        log.push(Event::TurnStarted {
            turn,
            seconds: self.round.state().seconds_remaining,
        });
        Ok(self.round.request_card())
    }

    pub fn mark_correct(&mut self, log: &mut Vec<Event>) -> Option<FetchTicket> {
        let ticket = self.round.mark_correct()?;
        log.push(Event::Correct(self.round.state().correct_count));
        Some(ticket)
    }

    pub fn mark_skip(&mut self, log: &mut Vec<Event>) -> Option<FetchTicket> {
        let ticket = self.round.mark_skip()?;
        log.push(Event::Skip {
            used: self.round.state().skips_used,
            remaining: self.round.skips_remaining(),
        });
        Some(ticket)
    }

    /// Ends the round at once and records the turn. The advance to the next
    /// turn is left to the caller.
    pub fn mark_disqualified(
        &mut self,
        log: &mut Vec<Event>,
    ) -> Result<Option<RoundEnd>, EngineError> {
        match self.round.mark_disqualified() {
            Some(end) => {
                self.conclude_round(end, log)?;
                Ok(Some(end))
            }
            None => Ok(None),
        }
    }

    pub fn tick(&mut self, log: &mut Vec<Event>) -> Result<Option<RoundEnd>, EngineError> {
        if !self.round.is_running() {
            return Ok(None);
        }
        let end = self.round.tick();
        log.push(Event::Tick(self.round.state().seconds_remaining));
        if let Some(end) = end {
            self.conclude_round(end, log)?;
        }
        Ok(end)
    }

    pub fn card_arrived(
        &mut self,
        ticket: FetchTicket,
        card: Option<WordCard>,
        log: &mut Vec<Event>,
    ) {
        if !self.round.fetch_settled(ticket) {
            return;
        }
        match card {
            Some(card) => {
                debug!("showing {}", card.word);
                self.card = Some(card.clone());
                log.push(Event::CardShown(card));
            }
            None => {
                warn!("no card matches {:?}", self.setup.filter());
                log.push(Event::NoCardAvailable);
            }
        }
    }

    /// Selects the next turn, or closes the game once everybody has played.
    pub fn advance(&mut self, log: &mut Vec<Event>) -> Result<Progress, EngineError> {
        match self.scheduler.advance()? {
            Advance::Next { turn, refilled } => {
                if refilled {
                    log.push(Event::PoolRefilled(turn.team));
                }
                log.push(Event::TurnPending(turn.clone()));
                Ok(Progress::NextTurn(turn))
            }
            Advance::Finished => {
                let result = self.ledger.compute_winner()?;
                info!("game finished: {:?}", result.winner);
                self.result = Some(result.clone());
                log.push(Event::GameFinished(result.clone()));
                Ok(Progress::Finished(result))
            }
        }
    }

    fn conclude_round(&mut self, end: RoundEnd, log: &mut Vec<Event>) -> Result<(), EngineError> {
        let turn = self.scheduler.complete_current()?;
        let outcome = self.round.report().ok_or(EngineError::RoundNotEnded)?;
        log.push(Event::RoundEnded {
            turn: turn.clone(),
            end,
        });
        let record = self.ledger.record_turn(&turn, &outcome)?.clone();
        log.push(Event::TurnRecorded(record));
        Ok(())
    }
}
