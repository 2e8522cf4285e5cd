//! `swipekit` developer tool.
//!
//! ```text
//! swipekit parse '%B4111111111111111^DOE/JOHN^2512'
//! swipekit simulate --swipe '%B4111111111111111^DOE/JOHN^2512' --legacy-names
//! ```

mod config;
mod simulate;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use swipekit_session::EventNaming;
use swipekit_track::TrackParser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::simulate::Simulation;

#[derive(Parser, Debug)]
#[command(name = "swipekit", version, about = "Magnetic stripe reader toolkit")]
struct Cli {
    /// Session configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a raw track payload and print the card record as JSON
    Parse {
        /// Raw payload; read from stdin when omitted
        payload: Option<String>,
    },
    /// Run a session against a simulated reader and print its events as JSON lines
    Simulate {
        /// Payload to swipe; repeat for several swipes
        #[arg(long = "swipe", value_name = "PAYLOAD")]
        swipes: Vec<String>,

        /// Start without a reader attached
        #[arg(long)]
        no_reader: bool,

        /// Use reader SDK notification names for events
        #[arg(long)]
        legacy_names: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse(payload: Option<String>) -> Result<()> {
    let payload = match payload {
        Some(payload) => payload,
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read payload from stdin")?;
            raw
        }
    };

    let record = TrackParser::parse_str(&payload).context("payload is not a track 1 swipe")?;
    debug!(
        card = %record.masked_card_number(),
        expiry = %record.expiry(),
        "Payload parsed"
    );
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse { payload } => parse(payload)?,
        Command::Simulate {
            swipes,
            no_reader,
            legacy_names,
        } => {
            if legacy_names {
                config.event_naming = EventNaming::Legacy;
            }
            let lines = Simulation { swipes, no_reader }.run(config).await?;
            for line in lines {
                println!("{}", serde_json::to_string(&line)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_simulate_arguments() {
        let cli = Cli::parse_from([
            "swipekit",
            "simulate",
            "--swipe",
            "%B1^A/B^2512",
            "--swipe",
            "second",
            "--legacy-names",
        ]);

        match cli.command {
            Command::Simulate {
                swipes,
                no_reader,
                legacy_names,
            } => {
                assert_eq!(swipes, vec!["%B1^A/B^2512", "second"]);
                assert!(!no_reader);
                assert!(legacy_names);
            }
            other => panic!("Expected Simulate, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse(Some("not a card".to_string())).is_err());
        assert!(parse(Some("%B4111111111111111^DOE/JOHN^2512".to_string())).is_ok());
    }
}
