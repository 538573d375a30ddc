use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, path::Path, time::Duration};
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString};

use crate::{
    card::CardFilter,
    error::ConfigError,
    team::{TeamId, TeamRoster},
};

#[derive(
    Debug,
    PartialEq,
    Eq,
    Copy,
    Clone,
    Default,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DisqualificationRule {
    #[default]
    #[strum(
        serialize = "zero",
        message = "A disqualified player loses every point of the turn and scores zero."
    )]
    Zero,
    #[strum(
        serialize = "total",
        message = "A disqualified player keeps the points earned before the disqualification."
    )]
    Total,
}

impl DisqualificationRule {
    pub fn rules() -> String {
        DisqualificationRule::iter().map(|r| r.rule()).join("\n")
    }

    pub fn rule(&self) -> String {
        format!(
            "{}: {}",
            self,
            self.get_message().unwrap_or("No description")
        )
    }

    /// Score a player keeps for a turn that ended with `correct` guesses.
    pub fn apply(&self, correct: u32, disqualified: bool) -> u32 {
        match (disqualified, self) {
            (false, _) => correct,
            (true, DisqualificationRule::Zero) => 0,
            (true, DisqualificationRule::Total) => correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_skips_per_round: u32,
    pub round_duration_seconds: u32,
    pub disqualification_rule: DisqualificationRule,
    /// Pause between time running out and the next-turn prompt.
    pub expiry_pause_ms: u64,
    /// Pause between a disqualification and the next-turn prompt.
    pub disqualification_pause_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_skips_per_round: 3,
            round_duration_seconds: 120,
            disqualification_rule: DisqualificationRule::Zero,
            expiry_pause_ms: 5000,
            disqualification_pause_ms: 3000,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Unreadable(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await.map_err(|e| {
            ConfigError::Unreadable(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_duration_seconds == 0 {
            return Err(ConfigError::ZeroRoundDuration);
        }
        Ok(())
    }

    pub fn expiry_pause(&self) -> Duration {
        Duration::from_millis(self.expiry_pause_ms)
    }

    pub fn disqualification_pause(&self) -> Duration {
        Duration::from_millis(self.disqualification_pause_ms)
    }
}

/// Teams and card selection for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    pub team_one: TeamRoster,
    pub team_two: TeamRoster,
    pub categories: BTreeSet<String>,
    pub set: String,
}

impl GameSetup {
    pub fn roster(&self, team: TeamId) -> &TeamRoster {
        match team {
            TeamId::One => &self.team_one,
            TeamId::Two => &self.team_two,
        }
    }

    pub fn total_players(&self) -> usize {
        self.team_one.len() + self.team_two.len()
    }

    pub fn filter(&self) -> CardFilter {
        CardFilter {
            categories: self.categories.clone(),
            set: self.set.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for team in TeamId::BOTH {
            let roster = self.roster(team);
            if roster.name.trim().is_empty() {
                return Err(ConfigError::EmptyTeamName(team));
            }
            if roster.is_empty() {
                return Err(ConfigError::EmptyTeam(team));
            }
            if let Some(index) = roster.players.iter().position(|p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyPlayerName { team, index });
            }
        }
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if self.set.trim().is_empty() {
            return Err(ConfigError::EmptySet);
        }
        Ok(())
    }
}
