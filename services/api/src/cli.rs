use crate::console::{
    list_saved, remove_saved, run_triage, seed_sample, ListArgs, RemoveArgs, TriageArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use candidate_scout::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Candidate Scout",
    about = "Triage developer profiles one at a time and review the saved shortlist",
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
    /// Accept or reject directory profiles from the terminal
    Triage(TriageArgs),
    /// Inspect or edit the saved candidates
    Saved {
        #[command(subcommand)]
        command: SavedCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SavedCommand {
    /// Print the saved candidates table
    List(ListArgs),
    /// Remove a saved candidate by directory id
    Remove(RemoveArgs),
    /// Save a fixed sample candidate, useful for checking the review table
    SeedSample,
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
        Command::Triage(args) => run_triage(args).await,
        Command::Saved { command } => match command {
            SavedCommand::List(args) => list_saved(args),
            SavedCommand::Remove(args) => remove_saved(args),
            SavedCommand::SeedSample => seed_sample(),
        },
    }
}
