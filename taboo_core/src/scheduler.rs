use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

use crate::{
    error::EngineError,
    team::{PlayerIndex, TeamId, TeamRoster, Turn},
};

/// Which players of one team have not played yet in the current rotation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityPool {
    available: Vec<bool>,
    cycle: u32,
}

impl AvailabilityPool {
    pub fn new(player_count: usize) -> Self {
        AvailabilityPool {
            available: vec![true; player_count],
            cycle: 0,
        }
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn available_players(&self) -> Vec<PlayerIndex> {
        self.available
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_exhausted(&self) -> bool {
        !self.available.contains(&true)
    }

    fn mark_played(&mut self, player: PlayerIndex) {
        if let Some(a) = self.available.get_mut(player) {
            *a = false;
        }
    }

    fn refill(&mut self) {
        self.available.iter_mut().for_each(|a| *a = true);
        self.cycle += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerPhase {
    NotStarted,
    /// Selected but not yet confirmed by the operator.
    Pending(Turn),
    Active(Turn),
    /// Round over and recorded, waiting for the next turn to be selected.
    Ending(Turn),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next { turn: Turn, refilled: bool },
    Finished,
}

pub struct TurnScheduler {
    rosters: [TeamRoster; 2],
    pools: [AvailabilityPool; 2],
    phase: SchedulerPhase,
    turns_completed: usize,
    history: Vec<Turn>,
    rng: StdRng,
}

impl TurnScheduler {
    pub fn new(team_one: TeamRoster, team_two: TeamRoster, rng: StdRng) -> Self {
        let pools = [
            AvailabilityPool::new(team_one.len()),
            AvailabilityPool::new(team_two.len()),
        ];
        TurnScheduler {
            rosters: [team_one, team_two],
            pools,
            phase: SchedulerPhase::NotStarted,
            turns_completed: 0,
            history: vec![],
            rng,
        }
    }

    pub fn roster(&self, team: TeamId) -> &TeamRoster {
        &self.rosters[team.index()]
    }

    pub fn pool(&self, team: TeamId) -> &AvailabilityPool {
        &self.pools[team.index()]
    }

    pub fn phase(&self) -> &SchedulerPhase {
        &self.phase
    }

    pub fn total_players(&self) -> usize {
        self.rosters.iter().map(|r| r.len()).sum()
    }

    pub fn turns_completed(&self) -> usize {
        self.turns_completed
    }

    /// Completed turns in the order they were played.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SchedulerPhase::Finished
    }

    pub fn pending(&self) -> Option<&Turn> {
        match &self.phase {
            SchedulerPhase::Pending(turn) => Some(turn),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Turn> {
        match &self.phase {
            SchedulerPhase::Active(turn) | SchedulerPhase::Ending(turn) => Some(turn),
            _ => None,
        }
    }

    /// Picks the opening turn. A "last team" is drawn at random and the first
    /// turn goes to the team after it, so each team opens half of the time.
    pub fn begin(&mut self) -> Result<Turn, EngineError> {
        let last_team = if self.rng.gen_bool(0.5) {
            TeamId::Two
        } else {
            TeamId::One
        };
        self.begin_after(last_team)
    }

    pub(crate) fn begin_after(&mut self, last_team: TeamId) -> Result<Turn, EngineError> {
        if self.phase != SchedulerPhase::NotStarted {
            return Err(EngineError::AlreadyStarted);
        }
        let team = last_team.other();
        if self.roster(team).is_empty() {
            return Err(EngineError::NoPlayerAvailable(team));
        }
        let turn = Turn::new(self.roster(team), team, 0, self.pool(team).cycle());
        info!("first turn goes to {}", turn);
        self.phase = SchedulerPhase::Pending(turn.clone());
        Ok(turn)
    }

    pub fn start_pending(&mut self) -> Result<Turn, EngineError> {
        match &self.phase {
            SchedulerPhase::Pending(turn) => {
                let turn = turn.clone();
                debug!("turn of {} started", turn);
                self.phase = SchedulerPhase::Active(turn.clone());
                Ok(turn)
            }
            SchedulerPhase::NotStarted => Err(EngineError::NotStarted),
            _ => Err(EngineError::NoTurnPending),
        }
    }

    /// Takes the player of the active turn out of their team's pool.
    pub fn complete_current(&mut self) -> Result<Turn, EngineError> {
        match &self.phase {
            SchedulerPhase::Active(turn) => {
                let turn = turn.clone();
                self.pools[turn.team.index()].mark_played(turn.player_index);
                self.turns_completed += 1;
                self.history.push(turn.clone());
                debug!(
                    "turn of {} completed ({}/{})",
                    turn,
                    self.turns_completed,
                    self.total_players()
                );
                self.phase = SchedulerPhase::Ending(turn.clone());
                Ok(turn)
            }
            _ => Err(EngineError::NoTurnActive),
        }
    }

    pub fn advance(&mut self) -> Result<Advance, EngineError> {
        let finished_team = match &self.phase {
            SchedulerPhase::Ending(turn) => turn.team,
            _ => return Err(EngineError::NoTurnActive),
        };

        if self.turns_completed >= self.total_players() {
            info!("all {} turns played", self.turns_completed);
            self.phase = SchedulerPhase::Finished;
            return Ok(Advance::Finished);
        }

        let next_team = finished_team.other();
        let mut refilled = false;
        let turn = match self.select_random_player(next_team) {
            Some(turn) => turn,
            None => {
                debug!("refilling pool of {}", next_team);
                self.pools[next_team.index()].refill();
                refilled = true;
                self.select_random_player(next_team)
                    .ok_or(EngineError::NoPlayerAvailable(next_team))?
            }
        };
        self.phase = SchedulerPhase::Pending(turn.clone());
        Ok(Advance::Next { turn, refilled })
    }

    fn select_random_player(&mut self, team: TeamId) -> Option<Turn> {
        let available = self.pools[team.index()].available_players();
        let &player = available.choose(&mut self.rng)?;
        Some(Turn::new(
            self.roster(team),
            team,
            player,
            self.pool(team).cycle(),
        ))
    }
}
