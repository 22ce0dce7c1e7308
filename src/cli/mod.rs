use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod bookings;
pub mod provision;

#[derive(Subcommand)]
enum Command {
    /// Provision door codes on the front door and room locks for all
    /// upcoming bookings
    Provision {
        /// Path to the TOML configuration file
        #[arg(long, default_value = "doorman.toml")]
        config: String,

        /// Directory the CSV report is written to
        #[arg(long, default_value = ".")]
        out_dir: String,

        /// Skip writing the CSV report
        #[arg(long, action, default_value = "false")]
        no_export: bool,
    },
    /// List upcoming bookings and their derived codes without touching
    /// any locks
    Bookings {
        /// Path to the TOML configuration file
        #[arg(long, default_value = "doorman.toml")]
        config: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();

    match args.command {
        Some(Command::Provision {
            config,
            out_dir,
            no_export,
        }) => {
            provision::run(&config, &out_dir, no_export).await?;
        }
        Some(Command::Bookings { config }) => {
            bookings::run(&config).await?;
        }
        None => {}
    }

    Ok(())
}
