use error_stack::{Report, ResultExt};

use crate::auth::{password, policy, AuthError, IntoAuthError, Result};
use crate::schema::{User, UserView};
use crate::types::form::users::update::Request;
use crate::App;

/// Applies the fields present in `form` to the user `id`.
///
/// A missing target is reported before the caller's permissions are
/// checked. Changing roles additionally requires the admin role.
#[tracing::instrument(skip(app, actor, form), fields(actor.id = %actor.id), name = "services.users.update")]
pub async fn update(app: &App, actor: &User, id: &str, form: Request) -> Result<UserView> {
    form.validate().map_err(AuthError::Validation)?;

    let mut target = super::find_target(app.store.as_ref(), id).await?;
    if !policy::can_update(actor, &target) {
        return Err(Report::new(AuthError::Forbidden));
    }
    if form.roles.is_some() && !policy::can_change_roles(actor) {
        return Err(Report::new(AuthError::Forbidden)
            .attach_printable("only admins may change roles"));
    }

    super::check_conflicts(
        app.store.as_ref(),
        Some(target.id),
        form.name.as_deref(),
        form.email.as_deref(),
    )
    .await?;

    if let Some(name) = form.name {
        target.name = name;
    }
    if let Some(email) = form.email {
        target.email = Some(email);
    }
    if let Some(password) = form.password {
        target.password_hash = password::hash_blocking(password)
            .await
            .change_context(AuthError::Internal)?;
    }
    if let Some(roles) = form.roles {
        target.roles = app.store.find_roles(&roles).await.into_auth_error()?;
    }

    let user = app.store.save_user(&target).await.into_save_error()?;
    tracing::info!(user.id = %user.id, "updated user");

    Ok(user.view())
}
