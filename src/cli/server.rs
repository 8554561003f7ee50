use clap::Parser;
use doggo::config::Server as Config;
use doggo::database::MemoryStore;
use doggo::http::server::StartServerError;
use doggo::App;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;

/// Expose the doggo HTTP API
#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
    /// Keep users in memory instead of Postgres. Everything is lost
    /// when the server stops.
    #[clap(long)]
    pub in_memory: bool,
}

pub fn run(args: ServerCommand) -> Result<(), StartServerError> {
    let mut config = super::load_config().change_context(StartServerError)?;
    args.override_config(&mut config);

    super::runtime(config.workers())
        .change_context(StartServerError)?
        .block_on(async move {
            let app = if args.in_memory {
                tracing::warn!("using the in-memory store, nothing will be persisted");
                App::with_store(config, MemoryStore::new())
            } else {
                App::new(config).await.change_context(StartServerError)?
            };
            doggo::http::server::run(app).await
        })
}

impl ServerCommand {
    fn override_config(&self, config: &mut Config) {
        // override server configurations if set by the cli
        if let Some(address) = self.address {
            config.ip = address;
        }

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
    }
}
