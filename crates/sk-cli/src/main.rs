//! Command-line front end for Skirmish: roll dice pools, settle opposed
//! tests, and play scripted encounters through the engine.

mod commands;
mod scenario;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "skirmish",
    about = "Skirmish: dice pools and turn-based combat encounters",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a pool of d6 and count hits (5s and 6s)
    Roll {
        /// Number of dice, 1 to 50
        pool: u32,

        /// Spend Edge: sixes explode even with --no-explode
        #[arg(short, long)]
        edge: bool,

        /// Disable the rule of six
        #[arg(long)]
        no_explode: bool,

        /// Hits needed for success
        #[arg(short, long)]
        threshold: Option<u32>,

        /// Seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Roll an attack pool against a defense pool
    Opposed {
        /// Attacker's dice
        attack: u32,

        /// Defender's dice
        defense: u32,

        /// The attacker spends Edge
        #[arg(short, long)]
        edge: bool,

        /// Disable the rule of six
        #[arg(long)]
        no_explode: bool,

        /// Seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Play a scripted encounter from a JSON file
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Output format: table, markdown, text, json
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible dice
        #[arg(short, long)]
        seed: Option<u64>,

        /// Disable the rule of six
        #[arg(long)]
        no_explode: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Roll {
            pool,
            edge,
            no_explode,
            threshold,
            seed,
        } => commands::roll::run(pool, edge, no_explode, threshold, seed),
        Commands::Opposed {
            attack,
            defense,
            edge,
            no_explode,
            seed,
        } => commands::opposed::run(attack, defense, edge, no_explode, seed),
        Commands::Run {
            scenario,
            format,
            output,
            seed,
            no_explode,
        } => commands::run::run(&scenario, &format, output.as_deref(), seed, no_explode),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
