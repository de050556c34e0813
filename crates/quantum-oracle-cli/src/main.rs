//! CLI for quantum-oracle — ask the quantum vacuum, read the majority.

mod commands;
mod render;

use clap::{Parser, Subcommand};

use commands::{ApiArgs, RangeArgs};

#[derive(Parser)]
#[command(name = "quantum-oracle")]
#[command(about = "quantum-oracle — ask the quantum vacuum, read five buckets and a majority")]
#[command(version = quantum_oracle_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch quantum random numbers, classify them and print the majority
    Ask {
        /// Number of samples to request (1-1024)
        #[arg(long, default_value_t = quantum_oracle_core::DEFAULT_COUNT)]
        count: usize,

        #[command(flatten)]
        range: RangeArgs,

        /// Secret that unlocks the fallback API keys if the primary key fails
        #[arg(long, env = "QRNG_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Use the local OS random generator instead of the ANU API
        #[arg(long)]
        offline: bool,

        /// Print the reading as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Classify bytes given on the command line (no network)
    Classify {
        /// Raw samples, each 0-255
        #[arg(required = true)]
        bytes: Vec<u8>,

        #[command(flatten)]
        range: RangeArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP oracle server
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8043")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[command(flatten)]
        api: ApiArgs,
    },
}

fn main() {
    let dotenv = commands::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match dotenv {
        Ok(Some(path)) => log::debug!("loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(err) => log::warn!("{err:#}"),
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask {
            count,
            range,
            secret,
            offline,
            json,
            api,
        } => commands::ask::run(commands::ask::AskCommandConfig {
            request: range.request(count),
            secret: secret.as_deref(),
            offline,
            json,
            api: &api,
        }),
        Commands::Classify { bytes, range, json } => {
            commands::classify::run(&bytes, range.request(bytes.len()), json)
        }
        Commands::Server { port, host, api } => commands::server::run(&host, port, &api),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
