use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod inputs;
mod profile;
mod prompt;
mod reviewer;
mod session;

use commands::configure::handle_configure;
use commands::eval::handle_eval;
use commands::session::build_session;
use commands::version;

#[derive(Parser)]
#[command(author, about, long_about = None)]
struct Cli {
    #[arg(short = 'v', long = "version")]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Configure a named profile (provider, model, credentials)
    Configure {
        #[arg(help = "Profile name to configure")]
        profile_name: Option<String>,
    },
    /// Start an interactive chat session
    Session {
        /// Profile to run the session with
        #[arg(short, long)]
        profile: Option<String>,

        /// Pause each tool call for review before it runs
        #[arg(long)]
        approve: bool,
    },
    /// Ask the evaluation panel for a verdict on a text
    Eval {
        #[arg(help = "Text to evaluate (prompted for when omitted)")]
        text: Option<String>,

        /// Profile to run the panel with
        #[arg(short, long)]
        profile: Option<String>,

        /// Number of judges consulted
        #[arg(short, long)]
        judges: Option<usize>,

        /// Cap concurrent judge calls at this pool size
        #[arg(long)]
        pool: Option<usize>,
    },
    /// Display the version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.version {
        version::execute().await?;
        return Ok(());
    }

    match cli.command {
        Some(Command::Configure { profile_name }) => {
            handle_configure(profile_name).await?;
        }
        Some(Command::Session { profile, approve }) => {
            let mut session = build_session(profile, approve)?;
            session.start().await?;
        }
        Some(Command::Eval {
            text,
            profile,
            judges,
            pool,
        }) => {
            handle_eval(text, profile, judges, pool).await?;
        }
        Some(Command::Version) => {
            version::execute().await?;
        }
        None => {
            // No subcommand defaults to an interactive session
            let mut session = build_session(None, false)?;
            session.start().await?;
        }
    }
    Ok(())
}
