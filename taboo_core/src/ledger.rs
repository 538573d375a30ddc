use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    config::DisqualificationRule,
    error::EngineError,
    round::RoundOutcome,
    team::{TeamId, TeamRoster, Turn},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: Turn,
    pub correct_count: u32,
    pub skips_used: u32,
    pub disqualified: bool,
    /// Points kept after the disqualification rule was applied.
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Team(TeamId),
    Tie,
    /// Every player of both teams was disqualified.
    AllDisqualified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub score: u32,
    pub turns: u32,
    pub disqualified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team: TeamId,
    pub name: String,
    pub total: u32,
    pub players: Vec<PlayerSummary>,
}

impl TeamSummary {
    pub fn all_disqualified(&self) -> bool {
        self.players.iter().all(|p| p.disqualified)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Winner,
    pub teams: [TeamSummary; 2],
}

impl GameResult {
    pub fn team(&self, team: TeamId) -> &TeamSummary {
        &self.teams[team.index()]
    }

    pub fn total(&self, team: TeamId) -> u32 {
        self.team(team).total
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Winner::Team(team) => writeln!(f, "Winner: {}", self.team(team).name)?,
            Winner::Tie => writeln!(f, "It's a tie!")?,
            Winner::AllDisqualified => writeln!(f, "It's a tie! All players were disqualified")?,
        }
        for team in &self.teams {
            let players = team
                .players
                .iter()
                .map(|p| {
                    if p.disqualified {
                        format!("{} {} (disqualified)", p.name, p.score)
                    } else {
                        format!("{} {}", p.name, p.score)
                    }
                })
                .join(", ");
            writeln!(f, "{}: {} points [{}]", team.name, team.total, players)?;
        }
        Ok(())
    }
}

/// Permanent per-turn scores of one game.
pub struct ScoringLedger {
    rule: DisqualificationRule,
    rosters: [TeamRoster; 2],
    records: Vec<TurnRecord>,
}

impl ScoringLedger {
    pub fn new(rule: DisqualificationRule, team_one: TeamRoster, team_two: TeamRoster) -> Self {
        ScoringLedger {
            rule,
            rosters: [team_one, team_two],
            records: vec![],
        }
    }

    pub fn rule(&self) -> DisqualificationRule {
        self.rule
    }

    /// Recorded turns in play order.
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    pub fn total_players(&self) -> usize {
        self.rosters.iter().map(|r| r.len()).sum()
    }

    pub fn record_turn(
        &mut self,
        turn: &Turn,
        outcome: &RoundOutcome,
    ) -> Result<&TurnRecord, EngineError> {
        if turn.player_index >= self.rosters[turn.team.index()].len() {
            return Err(EngineError::UnknownPlayer {
                team: turn.team,
                player_index: turn.player_index,
            });
        }
        if self.records.iter().any(|r| {
            r.turn.team == turn.team
                && r.turn.player_index == turn.player_index
                && r.turn.cycle == turn.cycle
        }) {
            return Err(EngineError::AlreadyRecorded {
                team: turn.team,
                player_index: turn.player_index,
                cycle: turn.cycle,
            });
        }

        let score = self
            .rule
            .apply(outcome.correct_count, outcome.disqualified);
        info!(
            "{} scored {} ({} correct, {} skips{})",
            turn,
            score,
            outcome.correct_count,
            outcome.skips_used,
            if outcome.disqualified {
                ", disqualified"
            } else {
                ""
            }
        );
        self.records.push(TurnRecord {
            turn: turn.clone(),
            correct_count: outcome.correct_count,
            skips_used: outcome.skips_used,
            disqualified: outcome.disqualified,
            score,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// Scores per roster position, summed over all turns of that player.
    pub fn player_scores(&self, team: TeamId) -> Vec<u32> {
        let mut scores = vec![0; self.rosters[team.index()].len()];
        for r in self.records.iter().filter(|r| r.turn.team == team) {
            scores[r.turn.player_index] += r.score;
        }
        scores
    }

    /// Whether each roster player was disqualified in any of their turns.
    pub fn disqualified_flags(&self, team: TeamId) -> Vec<bool> {
        let mut flags = vec![false; self.rosters[team.index()].len()];
        for r in self.records.iter().filter(|r| r.turn.team == team) {
            flags[r.turn.player_index] |= r.disqualified;
        }
        flags
    }

    pub fn team_total(&self, team: TeamId) -> u32 {
        self.player_scores(team).iter().sum()
    }

    pub fn compute_winner(&self) -> Result<GameResult, EngineError> {
        if self.records.len() < self.total_players() {
            return Err(EngineError::GameNotFinished {
                recorded: self.records.len(),
                total: self.total_players(),
            });
        }

        let teams = TeamId::BOTH.map(|team| self.summary(team));
        let [one, two] = &teams;
        let winner = match (one.all_disqualified(), two.all_disqualified()) {
            (true, true) => Winner::AllDisqualified,
            (true, false) => Winner::Team(TeamId::Two),
            (false, true) => Winner::Team(TeamId::One),
            (false, false) if one.total > two.total => Winner::Team(TeamId::One),
            (false, false) if two.total > one.total => Winner::Team(TeamId::Two),
            (false, false) => Winner::Tie,
        };
        Ok(GameResult { winner, teams })
    }

    fn summary(&self, team: TeamId) -> TeamSummary {
        let roster = &self.rosters[team.index()];
        let scores = self.player_scores(team);
        let flags = self.disqualified_flags(team);
        let players = roster
            .players
            .iter()
            .enumerate()
            .map(|(i, name)| PlayerSummary {
                name: name.clone(),
                score: scores[i],
                turns: self
                    .records
                    .iter()
                    .filter(|r| r.turn.team == team && r.turn.player_index == i)
                    .count() as u32,
                disqualified: flags[i],
            })
            .collect();
        TeamSummary {
            team,
            name: roster.name.clone(),
            total: scores.iter().sum(),
            players,
        }
    }
}
