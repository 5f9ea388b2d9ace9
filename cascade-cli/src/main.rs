use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use cascade_core::CascadeError;
use commands::{handle_session_command, SessionCommand};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "cascade")]
#[command(version = VERSION)]
#[command(about = "Cascade - await and inspect workflow sessions")]
#[command(long_about = r#"
Cascade talks to a conductor service that executes composed workflows. Each
run is a session; `cascade session get` resolves which session you mean (an
explicit id, or the most recent [failed] run of a workflow) and waits for it
to finish.

Point it at your conductor with CASCADE_CONDUCTOR_URL or
~/.config/cascade/config.toml.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Await and inspect workflow sessions")]
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            if let Some(hint) = e
                .downcast_ref::<CascadeError>()
                .and_then(CascadeError::user_hint)
            {
                eprintln!("  {}", hint.dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Session { action } => handle_session_command(action).await,
    }
}
