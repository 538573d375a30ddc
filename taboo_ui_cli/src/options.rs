use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use std::{collections::BTreeSet, path::PathBuf, str::FromStr};
use strum::IntoEnumIterator;

use taboo_core::{
    card::STARTER_SET,
    config::{DisqualificationRule, GameConfig, GameSetup},
    error::ConfigError,
    provider::SessionRecord,
    team::TeamRoster,
};

#[derive(Parser, Debug)]
#[command(name = "taboo")]
#[command(about = "Taboo for two teams sharing one device")]
pub struct Cli {
    /// Directory for score and session history
    #[arg(long, global = true, default_value = ".taboo")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a game
    Play(PlayArgs),
    /// Show the best round scores
    Leaderboard {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the rules
    Rules,
}

#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// First team, written as "Name:Player,Player"
    #[arg(long, value_parser = parse_team)]
    pub team_a: Option<TeamRoster>,

    /// Second team, written as "Name:Player,Player"
    #[arg(long, value_parser = parse_team)]
    pub team_b: Option<TeamRoster>,

    /// Card category to play with, may be repeated
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Card set to play with
    #[arg(long)]
    pub set: Option<String>,

    /// JSON file with the cards, the built-in deck otherwise
    #[arg(long)]
    pub deck: Option<PathBuf>,

    /// JSON file with game settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub max_skips: Option<u32>,

    /// Round length in seconds
    #[arg(long)]
    pub duration: Option<u32>,

    /// What a disqualified player keeps: zero or total
    #[arg(long, value_parser = parse_rule)]
    pub rule: Option<DisqualificationRule>,
}

pub fn parse_team(s: &str) -> Result<TeamRoster, String> {
    let (name, players) = s
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name:Player,Player\", got \"{s}\""))?;
    let players = players
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect_vec();
    Ok(TeamRoster::new(name.trim(), &players))
}

fn parse_rule(s: &str) -> Result<DisqualificationRule, String> {
    DisqualificationRule::from_str(s).map_err(|_| {
        format!(
            "expected one of: {}",
            DisqualificationRule::iter().join(", ")
        )
    })
}

impl PlayArgs {
    /// Teams and cards from the flags, completed from the previous game.
    pub fn setup(
        &self,
        last: Option<&SessionRecord>,
        deck_categories: BTreeSet<String>,
    ) -> Result<GameSetup, String> {
        let last = last.map(|s| &s.setup);
        let team_one = self
            .team_a
            .clone()
            .or_else(|| last.map(|s| s.team_one.clone()))
            .ok_or("no --team-a given and no previous game to take it from")?;
        let team_two = self
            .team_b
            .clone()
            .or_else(|| last.map(|s| s.team_two.clone()))
            .ok_or("no --team-b given and no previous game to take it from")?;
        let categories = if !self.categories.is_empty() {
            self.categories.iter().cloned().collect()
        } else {
            last.map(|s| s.categories.clone())
                .unwrap_or(deck_categories)
        };
        let set = self
            .set
            .clone()
            .or_else(|| last.map(|s| s.set.clone()))
            .unwrap_or_else(|| STARTER_SET.to_string());
        Ok(GameSetup {
            team_one,
            team_two,
            categories,
            set,
        })
    }

    /// Settings by precedence: flags, then the config file, then the
    /// previous game, then defaults.
    pub async fn config(&self, last: Option<&SessionRecord>) -> Result<GameConfig, ConfigError> {
        let mut config = match (&self.config, last) {
            (Some(path), _) => GameConfig::from_json_file(path).await?,
            (None, Some(last)) => GameConfig {
                max_skips_per_round: last.max_skips_per_round,
                round_duration_seconds: last.round_duration_seconds,
                ..GameConfig::default()
            },
            (None, None) => GameConfig::default(),
        };
        if let Some(max_skips) = self.max_skips {
            config.max_skips_per_round = max_skips;
        }
        if let Some(duration) = self.duration {
            config.round_duration_seconds = duration;
        }
        if let Some(rule) = self.rule {
            config.disqualification_rule = rule;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::collections::BTreeSet;
    use time::OffsetDateTime;

    use super::{parse_team, Cli, Commands, PlayArgs};
    use taboo_core::{
        config::{DisqualificationRule, GameConfig, GameSetup},
        error::ConfigError,
        provider::SessionRecord,
        team::TeamRoster,
    };

    fn last_session() -> SessionRecord {
        let setup = GameSetup {
            team_one: TeamRoster::new("Owls", &["Ann", "Amy"]),
            team_two: TeamRoster::new("Foxes", &["Bo"]),
            categories: ["Sports".to_string()].into(),
            set: "Set Two".to_string(),
        };
        let config = GameConfig {
            max_skips_per_round: 1,
            round_duration_seconds: 45,
            ..GameConfig::default()
        };
        SessionRecord::new(&setup, &config, OffsetDateTime::UNIX_EPOCH)
    }

    #[test]
    fn team_should_parse_name_and_players() {
        let team = parse_team("Owls: Ann, Amy,").unwrap();

        assert_eq!(team, TeamRoster::new("Owls", &["Ann", "Amy"]));
        assert!(parse_team("Owls").is_err());
    }

    #[test]
    fn play_should_accept_repeated_categories() {
        let cli = Cli::try_parse_from([
            "taboo",
            "play",
            "--team-a",
            "Owls:Ann",
            "--category",
            "Food",
            "--category",
            "Animals",
            "--rule",
            "total",
        ])
        .unwrap();

        let Commands::Play(args) = cli.command else {
            panic!("expected play")
        };
        assert_eq!(args.categories, vec!["Food", "Animals"]);
        assert_eq!(args.rule, Some(DisqualificationRule::Total));
        assert_eq!(args.team_b, None);
    }

    #[test]
    fn unknown_rule_should_be_rejected() {
        assert!(Cli::try_parse_from(["taboo", "play", "--rule", "half"]).is_err());
    }

    #[tokio::test]
    async fn missing_options_should_come_from_last_session() {
        let args = PlayArgs {
            team_a: Some(TeamRoster::new("Bats", &["Cid"])),
            ..PlayArgs::default()
        };
        let last = last_session();

        let setup = args.setup(Some(&last), BTreeSet::new()).unwrap();
        assert_eq!(setup.team_one.name, "Bats");
        assert_eq!(setup.team_two.name, "Foxes");
        assert_eq!(setup.set, "Set Two");
        assert!(setup.categories.contains("Sports"));

        let config = args.config(Some(&last)).await.unwrap();
        assert_eq!(config.max_skips_per_round, 1);
        assert_eq!(config.round_duration_seconds, 45);
    }

    #[tokio::test]
    async fn config_file_should_win_over_last_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taboo.json");
        std::fs::write(&path, r#"{"max_skips_per_round": 7, "round_duration_seconds": 90}"#)
            .unwrap();
        let args = PlayArgs {
            config: Some(path),
            ..PlayArgs::default()
        };

        let config = args.config(Some(&last_session())).await.unwrap();
        assert_eq!(
            (config.max_skips_per_round, config.round_duration_seconds),
            (7, 90)
        );
    }

    #[tokio::test]
    async fn flags_should_win_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taboo.json");
        std::fs::write(&path, r#"{"max_skips_per_round": 7, "round_duration_seconds": 90}"#)
            .unwrap();
        let args = PlayArgs {
            config: Some(path),
            duration: Some(30),
            rule: Some(DisqualificationRule::Total),
            ..PlayArgs::default()
        };

        let config = args.config(Some(&last_session())).await.unwrap();
        assert_eq!(config.max_skips_per_round, 7);
        assert_eq!(config.round_duration_seconds, 30);
        assert_eq!(config.disqualification_rule, DisqualificationRule::Total);
    }

    #[tokio::test]
    async fn missing_config_file_should_be_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let args = PlayArgs {
            config: Some(dir.path().join("absent.json")),
            ..PlayArgs::default()
        };

        assert!(matches!(
            args.config(None).await,
            Err(ConfigError::Unreadable(_))
        ));
    }

    #[test]
    fn first_game_should_need_both_teams() {
        let args = PlayArgs {
            team_a: Some(TeamRoster::new("Bats", &["Cid"])),
            ..PlayArgs::default()
        };

        assert!(args.setup(None, BTreeSet::new()).is_err());
    }

    #[tokio::test]
    async fn zero_duration_should_be_rejected() {
        let args = PlayArgs {
            duration: Some(0),
            ..PlayArgs::default()
        };

        assert_eq!(args.config(None).await, Err(ConfigError::ZeroRoundDuration));
    }
}
