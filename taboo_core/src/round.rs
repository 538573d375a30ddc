use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEnd {
    Expired,
    Disqualified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub seconds_remaining: u32,
    pub is_active: bool,
    pub correct_count: u32,
    pub skips_used: u32,
    pub disqualified: bool,
}

impl RoundState {
    fn fresh(duration: u32) -> Self {
        RoundState {
            seconds_remaining: duration,
            is_active: false,
            correct_count: 0,
            skips_used: 0,
            disqualified: false,
        }
    }
}

/// Tally handed to the ledger once the round is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub correct_count: u32,
    pub skips_used: u32,
    pub disqualified: bool,
    pub end: RoundEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Running,
    Ended(RoundEnd),
}

/// Identifies one card request. A response is only accepted for the ticket the
/// round is still waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

pub struct RoundController {
    max_skips: u32,
    duration: u32,
    phase: RoundPhase,
    state: RoundState,
    awaiting: Option<FetchTicket>,
    next_ticket: u64,
}

impl RoundController {
    pub fn new(config: &GameConfig) -> Self {
        RoundController {
            max_skips: config.max_skips_per_round,
            duration: config.round_duration_seconds,
            phase: RoundPhase::Idle,
            state: RoundState::fresh(config.round_duration_seconds),
            awaiting: None,
            next_ticket: 0,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn skips_remaining(&self) -> u32 {
        self.max_skips.saturating_sub(self.state.skips_used)
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn start(&mut self) -> bool {
        if self.phase != RoundPhase::Idle {
            warn!("cannot start round while {:?}", self.phase);
            return false;
        }
        self.state = RoundState {
            is_active: true,
            ..RoundState::fresh(self.duration)
        };
        self.awaiting = None;
        self.phase = RoundPhase::Running;
        debug!("round started with {}s", self.duration);
        true
    }

    /// Asks for a card outside of correct/skip, e.g. the first card of a turn.
    pub fn request_card(&mut self) -> Option<FetchTicket> {
        if !self.is_running() || self.awaiting.is_some() {
            return None;
        }
        Some(self.issue_ticket())
    }

    pub fn mark_correct(&mut self) -> Option<FetchTicket> {
        if !self.is_running() || self.awaiting.is_some() {
            debug!("correct ignored");
            return None;
        }
        self.state.correct_count += 1;
        Some(self.issue_ticket())
    }

    pub fn mark_skip(&mut self) -> Option<FetchTicket> {
        if !self.is_running() || self.awaiting.is_some() || self.state.skips_used >= self.max_skips
        {
            debug!("skip ignored");
            return None;
        }
        self.state.skips_used += 1;
        Some(self.issue_ticket())
    }

    pub fn mark_disqualified(&mut self) -> Option<RoundEnd> {
        if !self.is_running() {
            return None;
        }
        self.state.disqualified = true;
        self.finish(RoundEnd::Disqualified)
    }

    /// One whole second has passed.
    pub fn tick(&mut self) -> Option<RoundEnd> {
        if !self.is_running() {
            return None;
        }
        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        if self.state.seconds_remaining == 0 {
            return self.finish(RoundEnd::Expired);
        }
        None
    }

    /// Settles a card request. Returns whether the response belongs to this round.
    pub fn fetch_settled(&mut self, ticket: FetchTicket) -> bool {
        if self.awaiting != Some(ticket) {
            debug!("dropping stale card response {:?}", ticket);
            return false;
        }
        self.awaiting = None;
        self.is_running()
    }

    /// Hands out the tally of an ended round and returns to idle. Yields the
    /// outcome exactly once per round.
    pub fn report(&mut self) -> Option<RoundOutcome> {
        let RoundPhase::Ended(end) = self.phase else {
            return None;
        };
        let outcome = RoundOutcome {
            correct_count: self.state.correct_count,
            skips_used: self.state.skips_used,
            disqualified: self.state.disqualified,
            end,
        };
        self.phase = RoundPhase::Idle;
        Some(outcome)
    }

    fn finish(&mut self, end: RoundEnd) -> Option<RoundEnd> {
        self.state.is_active = false;
        self.awaiting = None;
        self.phase = RoundPhase::Ended(end);
        debug!("round ended: {:?}", end);
        Some(end)
    }

    fn issue_ticket(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        let ticket = FetchTicket(self.next_ticket);
        self.awaiting = Some(ticket);
        ticket
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{RoundController, RoundEnd, RoundOutcome, RoundPhase};
    use crate::config::GameConfig;

    fn config(max_skips: u32, duration: u32) -> GameConfig {
        GameConfig {
            max_skips_per_round: max_skips,
            round_duration_seconds: duration,
            ..GameConfig::default()
        }
    }

    fn running(max_skips: u32, duration: u32) -> RoundController {
        let mut round = RoundController::new(&config(max_skips, duration));
        assert!(round.start());
        round
    }

    #[test]
    fn start_should_reset_state_and_activate() {
        let round = running(3, 30);

        assert_eq!(round.phase(), RoundPhase::Running);
        assert!(round.state().is_active);
        assert_eq!(round.state().seconds_remaining, 30);
        assert_eq!(round.skips_remaining(), 3);
    }

    #[test]
    fn start_should_only_work_from_idle() {
        let mut round = running(3, 30);
        assert!(!round.start());

        round.mark_disqualified();
        assert!(!round.start());

        round.report();
        assert!(round.start());
        assert_eq!(round.state().correct_count, 0);
        assert!(!round.state().disqualified);
    }

    #[test]
    fn round_should_expire_after_exactly_duration_ticks() {
        let mut round = running(3, 3);

        assert_eq!(round.tick(), None);
        assert_eq!(round.tick(), None);
        assert_eq!(round.state().seconds_remaining, 1);
        assert_eq!(round.tick(), Some(RoundEnd::Expired));
        assert!(!round.state().is_active);
        assert_eq!(round.tick(), None);
    }

    #[test]
    fn correct_should_be_ignored_while_card_is_in_flight() {
        let mut round = running(3, 30);

        let ticket = round.mark_correct().unwrap();
        assert_eq!(round.mark_correct(), None);
        assert_eq!(round.mark_skip(), None);
        assert_eq!(round.state().correct_count, 1);

        assert!(round.fetch_settled(ticket));
        assert!(round.mark_correct().is_some());
        assert_eq!(round.state().correct_count, 2);
    }

    #[test]
    fn stale_ticket_should_not_release_the_guard() {
        let mut round = running(3, 30);
        let old = round.mark_correct().unwrap();
        round.mark_disqualified();
        round.report();
        round.start();

        let fresh = round.request_card().unwrap();
        assert!(!round.fetch_settled(old));
        assert!(round.fetch_in_flight());
        assert!(round.fetch_settled(fresh));
        assert!(!round.fetch_in_flight());
    }

    #[test]
    fn skip_should_stop_at_budget() {
        let mut round = running(2, 30);
        for _ in 0..2 {
            let ticket = round.mark_skip().unwrap();
            round.fetch_settled(ticket);
        }

        assert_eq!(round.mark_skip(), None);
        assert_eq!(round.state().skips_used, 2);
        assert_eq!(round.skips_remaining(), 0);
    }

    #[test]
    fn actions_should_be_ignored_when_not_running() {
        let mut round = RoundController::new(&config(3, 30));

        assert_eq!(round.mark_correct(), None);
        assert_eq!(round.mark_skip(), None);
        assert_eq!(round.mark_disqualified(), None);
        assert_eq!(round.tick(), None);
        assert_eq!(round.report(), None);
    }

    #[test]
    fn disqualification_should_stop_round_and_keep_tally() {
        let mut round = running(3, 30);
        let ticket = round.mark_correct().unwrap();
        round.fetch_settled(ticket);
        round.tick();

        assert_eq!(round.mark_disqualified(), Some(RoundEnd::Disqualified));
        assert!(!round.state().is_active);
        assert_eq!(round.tick(), None);
        assert_eq!(round.state().seconds_remaining, 29);
        assert_eq!(round.mark_correct(), None);
        assert_eq!(
            round.report(),
            Some(RoundOutcome {
                correct_count: 1,
                skips_used: 0,
                disqualified: true,
                end: RoundEnd::Disqualified,
            })
        );
    }

    #[test]
    fn report_should_yield_outcome_once() {
        let mut round = running(3, 1);
        round.tick();

        assert!(round.report().is_some());
        assert_eq!(round.report(), None);
        assert_eq!(round.phase(), RoundPhase::Idle);
    }

    proptest! {
        #[test]
        fn skips_should_never_exceed_budget(max_skips in 0u32..6, presses in 0usize..20) {
            let mut round = running(max_skips, 30);
            for _ in 0..presses {
                if let Some(ticket) = round.mark_skip() {
                    round.fetch_settled(ticket);
                }
            }
            prop_assert_eq!(round.state().skips_used, (presses as u32).min(max_skips));
        }
    }
}
