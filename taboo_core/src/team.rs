use serde::{Deserialize, Serialize};
use std::fmt;

pub type PlayerIndex = usize;

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamId {
    One,
    Two,
}

impl TeamId {
    pub const BOTH: [TeamId; 2] = [TeamId::One, TeamId::Two];

    /// The team that plays after this one. Strict involution over the two teams.
    pub fn other(self) -> TeamId {
        match self {
            TeamId::One => TeamId::Two,
            TeamId::Two => TeamId::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            TeamId::One => 1,
            TeamId::Two => 2,
        }
    }

    pub fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub name: String,
    pub players: Vec<String>,
}

impl TeamRoster {
    pub fn new<S: Into<String>>(name: S, players: &[&str]) -> Self {
        TeamRoster {
            name: name.into(),
            players: players.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player(&self, index: PlayerIndex) -> Option<&String> {
        self.players.get(index)
    }
}

/// One player's turn, as picked by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub team: TeamId,
    pub player_index: PlayerIndex,
    pub player_name: String,
    pub team_name: String,
    /// Rotation cycle of the team when the player was picked. Bumped on every pool refill.
    pub cycle: u32,
}

impl Turn {
    pub fn new(roster: &TeamRoster, team: TeamId, player_index: PlayerIndex, cycle: u32) -> Self {
        Turn {
            team,
            player_index,
            player_name: roster.players[player_index].clone(),
            team_name: roster.name.clone(),
            cycle,
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.player_name, self.team_name)
    }
}
