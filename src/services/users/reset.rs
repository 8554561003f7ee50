use error_stack::{Report, ResultExt};

use crate::auth::{password, AuthError, IntoAuthError, Result};
use crate::schema::{NewUser, Role, User};
use crate::types::validation::{self, ValidationError};
use crate::util::Sensitive;
use crate::App;

/// Wipes every user and role, then seeds the `admin` role and a single
/// admin account holding it.
#[tracing::instrument(skip(app, admin_password), name = "services.users.reset")]
pub async fn reset(app: &App, admin_name: &str, admin_password: Sensitive<String>) -> Result<User> {
    let mut errors = ValidationError::builder();
    validation::validate_name(&mut errors, "name", admin_name);
    if admin_password.is_empty() {
        errors.insert("password", validation::REQUIRED);
    }
    let errors = errors.build();
    if !errors.is_empty() {
        return Err(Report::new(AuthError::Validation(errors)));
    }

    let password_hash = password::hash_blocking(admin_password)
        .await
        .change_context(AuthError::Internal)?;

    app.store.clear().await.into_auth_error()?;
    let admin = app.store.ensure_role(Role::ADMIN).await.into_auth_error()?;
    let user = app
        .store
        .insert_user(NewUser {
            name: admin_name.to_string(),
            email: None,
            password_hash,
            roles: vec![admin],
        })
        .await
        .into_save_error()?;

    tracing::info!(user.id = %user.id, "database reset, seeded admin user");
    Ok(user)
}
