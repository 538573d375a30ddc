use std::{
    io::{self, BufRead, Write},
    str::FromStr,
    thread::{self, JoinHandle},
};

use log::{debug, warn};
use tokio::sync::mpsc::Sender;

use taboo_core::{
    config::DisqualificationRule,
    event::Event,
    provider::ScoreRecord,
    round::RoundEnd,
    runner::Command,
};

static RULES: &str = "
*** Taboo ***
Two teams take turns. The device is handed to the next player, who starts the turn and describes the word on the
card to their own team without saying the word itself or any of the forbidden words below it. Every word the team
guesses is a point and brings up the next card. A limited number of cards may be skipped per turn. Saying a
forbidden word gets the player disqualified, which ends the turn at once. When time runs out the turn is over as well.
Teams alternate and every player gets one turn. The team with the most points wins.";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum CliAction {
    Start,
    Correct,
    Skip,
    Disqualify,
    Rules,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
struct ParseActionError;

impl CliAction {
    const ALL: [CliAction; 6] = [
        CliAction::Start,
        CliAction::Correct,
        CliAction::Skip,
        CliAction::Disqualify,
        CliAction::Rules,
        CliAction::Quit,
    ];

    fn info(&self) -> &'static str {
        match self {
            CliAction::Start => "start the turn",
            CliAction::Correct => "word guessed",
            CliAction::Skip => "skip the card",
            CliAction::Disqualify => "forbidden word said",
            CliAction::Rules => "display rules",
            CliAction::Quit => "quit",
        }
    }

    fn cmd_str(&self) -> &'static str {
        match self {
            CliAction::Start => "s",
            CliAction::Correct => "c",
            CliAction::Skip => "k",
            CliAction::Disqualify => "d",
            CliAction::Rules => "r",
            CliAction::Quit => "q",
        }
    }

    fn command(&self) -> Option<Command> {
        match self {
            CliAction::Start => Some(Command::StartTurn),
            CliAction::Correct => Some(Command::Correct),
            CliAction::Skip => Some(Command::Skip),
            CliAction::Disqualify => Some(Command::Disqualify),
            CliAction::Quit => Some(Command::Quit),
            CliAction::Rules => None,
        }
    }
}

impl FromStr for CliAction {
    type Err = ParseActionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CliAction::ALL
            .into_iter()
            .find(|a| a.cmd_str() == s.trim())
            .ok_or(ParseActionError)
    }
}

pub fn rules() -> String {
    format!(
        "{}\n\nWhat a disqualified player keeps:\n{}",
        RULES,
        DisqualificationRule::rules()
    )
}

fn print_keys() {
    for action in CliAction::ALL {
        println!("- [{}]: {}", action.cmd_str(), action.info());
    }
}

/// Reads operator keys from stdin on a plain thread, since stdin blocks.
/// Stops after quit, at end of input, or once the game stops listening.
pub fn spawn_operator_input(commands: Sender<Command>) -> JoinHandle<()> {
    thread::spawn(move || {
        print_keys();
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                warn!("Could not read from stdin");
                break;
            };
            let action = match CliAction::from_str(&line) {
                Ok(action) => action,
                Err(_) => {
                    print_keys();
                    continue;
                }
            };
            debug!("operator pressed {:?}", action);
            let Some(command) = action.command() else {
                println!("{}", rules());
                continue;
            };
            if commands.blocking_send(command).is_err() || command == Command::Quit {
                break;
            }
        }
    })
}

pub fn print_event(event: &Event) {
    match event {
        Event::TurnPending(turn) => {
            println!("================================================");
            println!("~ Next up: {turn}. Hand over the device and press [s] to start.");
        }
        Event::TurnStarted { turn, seconds } => {
            println!("~ {turn} has {seconds} seconds. Go!")
        }
        Event::Tick(seconds) => {
            if *seconds > 0 && (*seconds % 10 == 0 || *seconds <= 5) {
                println!("~ {seconds}s left");
            }
        }
        Event::CardShown(card) => println!("\n  >> {} <<\n", card.describe()),
        Event::NoCardAvailable => println!("~ No card available for the selected categories"),
        Event::Correct(count) => println!("~ Correct! {count} so far"),
        Event::Skip { used, remaining } => {
            println!("~ Skipped ({used} used, {remaining} left)")
        }
        Event::RoundEnded { turn, end } => match end {
            RoundEnd::Expired => println!("~ Time's up for {turn}!"),
            RoundEnd::Disqualified => println!("~ {turn} said a forbidden word!"),
        },
        Event::TurnRecorded(record) => {
            println!("~ {} scores {}", record.turn.player_name, record.score)
        }
        Event::PoolRefilled(team) => {
            debug!("every player of {team} has played, starting over")
        }
        Event::ScoreSaveFailed(reason) => println!("~ Score could not be saved: {reason}"),
        Event::GameFinished(result) => {
            println!("================================================");
            println!("{result}");
        }
    }
    _ = io::stdout().flush();
}

pub fn print_leaderboard(scores: &[ScoreRecord]) {
    if scores.is_empty() {
        println!("No scores yet.");
        return;
    }
    for (place, score) in scores.iter().enumerate() {
        println!(
            "{:>2}. {} ({}): {} points, {} skips, {}",
            place + 1,
            score.player,
            score.team,
            score.score,
            score.skips,
            score.recorded_at.date()
        );
    }
}
