use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spacerace_execution::{replay, Actor, Desk};
use spacerace_simulator::{
    load_config, parse_player, parse_seed, render, JackpotView, RaceReport, WagerReport,
};
use spacerace_types::all_ships;
use std::path::PathBuf;
use tracing::{info, Level};

fn init_tracing(level: Level) {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML engine config (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<Level>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Race the catalog roster without a wager.
    Simulate {
        /// Seed material for the race.
        #[arg(long, default_value = "")]
        entropy: String,
    },
    /// Re-run a recorded race from its hex seed.
    Replay {
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 0)]
        race_id: u64,
    },
    /// Place one or more wagers through the desk.
    Wager {
        /// Player as a hex public key or a numeric test seed.
        #[arg(long)]
        player: String,
        #[arg(long)]
        ship: u8,
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value = "")]
        entropy: String,
        /// Number of consecutive wagers (entropy is suffixed with the wager index).
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Print the ship catalog.
    Ships,
    /// Print the starting jackpot accumulators.
    Jackpots,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_tracing(args.log_level.unwrap_or(config.log_level));

    match args.command {
        Command::Simulate { entropy } => {
            let race = spacerace_execution::simulate_debug(entropy.as_bytes());
            println!("{}", render(&RaceReport::new(&race))?);
        }
        Command::Replay { seed, race_id } => {
            let seed = parse_seed(&seed)?;
            let race = replay(seed, race_id);
            println!("{}", render(&RaceReport::new(&race))?);
        }
        Command::Wager {
            player,
            ship,
            amount,
            entropy,
            count,
        } => {
            let player = parse_player(&player)?;
            let (actor, mut mailbox) = Actor::new(Desk::new(&config), config.mailbox_size);
            let handle = tokio::spawn(actor.run());

            for index in 0..count {
                let mut material = entropy.clone().into_bytes();
                if count > 1 {
                    material.extend_from_slice(&index.to_be_bytes());
                }
                let receipt = mailbox
                    .place_wager(player.clone(), ship, amount, material)
                    .await
                    .context("wager failed")?;
                println!("{}", render(&WagerReport::new(&player, &receipt))?);
            }

            let jackpots = mailbox.jackpots().await?;
            drop(mailbox);
            let desk = handle.await.context("desk task failed")?;
            info!(
                races = desk.next_race_id(),
                house_balance = desk.pool().house_balance,
                "desk closed"
            );
            println!("{}", render(&JackpotView::from(&jackpots))?);
        }
        Command::Ships => {
            println!("{}", render(all_ships())?);
        }
        Command::Jackpots => {
            let desk = Desk::new(&config);
            println!("{}", render(&JackpotView::from(&desk.get_jackpot_amounts()))?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wager_command() {
        let args = Args::parse_from([
            "spacerace",
            "--log-level",
            "debug",
            "wager",
            "--player",
            "7",
            "--ship",
            "3",
            "--amount",
            "250",
            "--count",
            "4",
        ]);
        assert_eq!(args.log_level, Some(Level::DEBUG));
        match args.command {
            Command::Wager {
                ship,
                amount,
                count,
                entropy,
                ..
            } => {
                assert_eq!(ship, 3);
                assert_eq!(amount, 250);
                assert_eq!(count, 4);
                assert!(entropy.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_replay_defaults() {
        let args = Args::parse_from(["spacerace", "replay", "--seed", "00ff"]);
        assert!(args.config.is_none());
        match args.command {
            Command::Replay { seed, race_id } => {
                assert_eq!(seed, "00ff");
                assert_eq!(race_id, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_ship() {
        let err = Args::try_parse_from([
            "spacerace", "wager", "--player", "1", "--ship", "300", "--amount", "10",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("300"));
    }
}
