use crate::replay::{self, ReplayArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hire_sync::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Pinpoint to HiBob hire sync",
    about = "Turn Pinpoint hire webhooks into HiBob employee records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the hire sync once for an application, bypassing the webhook
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Replay(args) => replay::run(args).await,
    }
}
