use clap::Parser;
use log::info;
use std::{path::Path, process::exit, sync::Arc};
use tokio::sync::mpsc::{channel, unbounded_channel};

use cli_operator::{print_event, print_leaderboard, rules, spawn_operator_input};
use options::{Cli, Commands, PlayArgs};
use taboo_core::{
    card::{categories, starter_deck},
    provider::{MemoryDeck, ScoreStore, SessionStore},
    run_game,
    store::JsonFileStore,
};

mod cli_operator;
mod options;

async fn play(args: PlayArgs, data_dir: &Path) -> Result<(), String> {
    let store = Arc::new(JsonFileStore::new(data_dir));
    let deck = match &args.deck {
        Some(path) => MemoryDeck::from_json_file(path).await.map_err(|e| e.to_string())?,
        None => MemoryDeck::new(starter_deck()),
    };
    let last = store.last_session().await.map_err(|e| e.to_string())?;
    let setup = args.setup(last.as_ref(), categories(deck.cards()))?;
    let config = args.config(last.as_ref()).await.map_err(|e| e.to_string())?;
    info!("Playing {:?} with {:?}", setup, config);

    let (command_tx, command_rx) = channel(16);
    let (event_tx, mut event_rx) = unbounded_channel();
    spawn_operator_input(command_tx);
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event);
        }
    });

    let result = run_game(setup, config, Arc::new(deck), store, command_rx, event_tx).await;
    _ = printer.await;
    match result {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            println!("Game abandoned.");
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

async fn leaderboard(limit: usize, data_dir: &Path) -> Result<(), String> {
    let store = JsonFileStore::new(data_dir);
    let scores = store.top_scores(limit).await.map_err(|e| e.to_string())?;
    print_leaderboard(&scores);
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Play(args) => play(args, &cli.data_dir).await,
        Commands::Leaderboard { limit } => leaderboard(limit, &cli.data_dir).await,
        Commands::Rules => {
            println!("{}", rules());
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{e}");
        exit(1);
    }
}
