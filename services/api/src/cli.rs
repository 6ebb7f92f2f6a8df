use crate::commands::{run_assess, run_batch, run_predict, AssessArgs, BatchArgs, PredictArgs};
use crate::server;
use cardio_risk::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Cardio Risk",
    about = "Score heart-disease risk from the command line or serve the assessment API",
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
    /// Score a lifestyle survey with the local heuristic
    Assess(AssessArgs),
    /// Score clinical measurements with the remote prediction service
    Predict(PredictArgs),
    /// Score every lifestyle survey in a CSV export
    Batch(BatchArgs),
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
        Command::Assess(args) => run_assess(args).await,
        Command::Predict(args) => run_predict(args).await,
        Command::Batch(args) => run_batch(args),
    }
}
