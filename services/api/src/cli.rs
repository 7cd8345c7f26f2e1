use crate::demo::{run_demo, run_sweep, DemoArgs, SweepArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rentease::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "RentEase API",
    about = "Run the RentEase rental management service from the command line",
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
    /// Run an end-to-end CLI demo covering the rent, messaging, document,
    /// and notification workflows
    Demo(DemoArgs),
    /// Run one overdue sweep against seeded demo data and print the
    /// per-payment outcomes
    Sweep(SweepArgs),
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
        Command::Demo(args) => run_demo(args).await,
        Command::Sweep(args) => run_sweep(args).await,
    }
}
