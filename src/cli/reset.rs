use clap::Parser;
use doggo::{auth::AuthError, services, util::Sensitive, App};
use error_stack::{Result, ResultExt};

/// Delete every user and role, then create an admin account
#[derive(Debug, Parser)]
pub struct ResetCommand {
    #[clap(long, default_value = "admin")]
    pub admin_name: String,
    #[clap(long, env = "DOGGO_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,
}

pub fn run(args: ResetCommand) -> Result<(), AuthError> {
    let config = super::load_config().change_context(AuthError::Internal)?;
    super::runtime(1)
        .change_context(AuthError::Internal)?
        .block_on(async move {
            let app = App::new(config).await.change_context(AuthError::Internal)?;
            let admin =
                services::users::reset(&app, &args.admin_name, Sensitive::new(args.admin_password))
                    .await?;

            println!("Created admin user {:?} with id {}", admin.name, admin.id);
            Ok(())
        })
}
