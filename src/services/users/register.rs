use error_stack::ResultExt;

use crate::auth::{password, AuthError, IntoAuthError, Result};
use crate::schema::{NewUser, UserView};
use crate::types::form::users::register::Request;
use crate::App;

/// Creates a user. Requested roles are matched against the stored ones
/// and values that don't exist are left out.
#[tracing::instrument(skip_all, name = "services.users.register")]
pub async fn register(app: &App, form: Request) -> Result<UserView> {
    form.validate().map_err(AuthError::Validation)?;

    super::check_conflicts(app.store.as_ref(), None, Some(&form.name), form.email.as_deref())
        .await?;

    let password_hash = password::hash_blocking(form.password)
        .await
        .change_context(AuthError::Internal)?;

    let roles = app.store.find_roles(&form.roles).await.into_auth_error()?;
    let user = app
        .store
        .insert_user(NewUser {
            name: form.name,
            email: form.email,
            password_hash,
            roles,
        })
        .await
        .into_save_error()?;

    tracing::info!(user.id = %user.id, "registered new user");
    Ok(user.view())
}
