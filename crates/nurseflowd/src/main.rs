//! nurseflowd — the nurseflow daemon.
//!
//! Loads a `ward.toml`, builds the balance engine, and either serves it
//! over HTTP or drives it offline.
//!
//! # Usage
//!
//! ```text
//! nurseflowd serve --config ward.toml --port 8080 --auto-tick
//! nurseflowd simulate --config ward.toml --ticks 50 --format json
//! nurseflowd scaffold --out ward.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "nurseflowd",
    about = "Nurse workload balancing daemon",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the REST API over one ward.
    Serve {
        /// Ward file. Uses the built-in demo ward when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Tick automatically every `engine.tick_interval_ms`.
        #[arg(long)]
        auto_tick: bool,
    },
    /// Run ticks offline and print the history.
    Simulate {
        /// Ward file. Uses the built-in demo ward when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Upper bound on ticks; stops early at the fixpoint.
        #[arg(short, long, default_value = "100")]
        ticks: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Write the demo ward to a file.
    Scaffold {
        #[arg(short, long, default_value = "ward.toml")]
        out: PathBuf,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,nurseflowd=debug,nurseflow=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            auto_tick,
        } => commands::serve::run(config.as_deref(), port, auto_tick).await,
        Command::Simulate {
            config,
            ticks,
            format,
        } => commands::simulate::run(config.as_deref(), ticks, &format).await,
        Command::Scaffold { out, force } => commands::scaffold::run(&out, force),
    }
}
