use clap::Parser;
use error_stack::{Result, ResultExt};
use thiserror::Error;

mod migrate;
mod reset;
mod server;

#[derive(Debug, Error)]
#[error("Failed to run doggo")]
pub struct CliError;

/// Command line options for doggo.
#[derive(Debug, Parser)]
#[command(about = "User account service of doggo", version, long_about)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        match self.subcommand {
            Subcommand::Server(args) => self::server::run(args).change_context(CliError),
            Subcommand::Migrate(args) => self::migrate::run(&args).change_context(CliError),
            Subcommand::Reset(args) => self::reset::run(args).change_context(CliError),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Server(self::server::ServerCommand),
    Migrate(self::migrate::MigrateCommand),
    Reset(self::reset::ResetCommand),
}

/// Loads the configuration and sets up logging, in that order.
fn load_config() -> Result<doggo::config::Server, CliError> {
    let config = doggo::config::Server::load().change_context(CliError)?;
    doggo::logging::init(&config.logging).change_context(CliError)?;
    Ok(config)
}

fn runtime(workers: usize) -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(workers)
        .build()
        .change_context(CliError)
        .attach_printable("could not build tokio runtime")
}
