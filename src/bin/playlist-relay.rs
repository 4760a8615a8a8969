//! Command-line front end: loads a config file and drives the orchestrator.

use clap::{Parser, Subcommand};
use playlist_relay::{Config, EventReceiver, Orchestrator, Severity, run_with_shutdown};
use std::path::PathBuf;
use std::process;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "playlist-relay", version, about)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post a random track every poll interval until interrupted
    Run {
        /// JSON configuration file
        #[arg(short, long, default_value = "playlist-relay.json")]
        config: PathBuf,
    },
    /// Post one random track now and exit
    Once {
        /// JSON configuration file
        #[arg(short, long, default_value = "playlist-relay.json")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args.command).await {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(command: Commands) -> playlist_relay::Result<()> {
    match command {
        Commands::Run { config } => {
            let orchestrator = Orchestrator::new(Config::from_json_file(&config)?).await?;
            spawn_printer(orchestrator.subscribe());

            orchestrator.start().await?;
            info!("Running, press Ctrl+C to stop");
            run_with_shutdown(orchestrator).await
        }
        Commands::Once { config } => {
            let orchestrator = Orchestrator::new(Config::from_json_file(&config)?).await?;
            spawn_printer(orchestrator.subscribe());

            let outcome = orchestrator.run_once().await?;
            if let Some(track) = orchestrator.last_track().await {
                println!("Sent {} as {:?}", track.display_line(), outcome);
            }
            Ok(())
        }
    }
}

/// Print observer events as they arrive
fn spawn_printer(mut events: EventReceiver) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if event.severity == Severity::Debug {
                continue;
            }
            println!(
                "[{}] {:<7} {}",
                event.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
                format!("{:?}", event.severity).to_uppercase(),
                event.message
            );
        }
    });
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
