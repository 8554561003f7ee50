use clap::Parser;
use doggo::database::{self, Pool};
use error_stack::{Result, ResultExt};

/// Apply pending database migrations
#[derive(Debug, Parser)]
pub struct MigrateCommand {}

pub fn run(_args: &MigrateCommand) -> Result<(), database::Error> {
    let config = super::load_config().change_context(database::Error::Migration)?;
    super::runtime(1)
        .change_context(database::Error::Migration)?
        .block_on(async move {
            let pool = Pool::new(&config.db).await?;
            pool.migrate().await
        })
}
