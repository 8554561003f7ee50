use crate::auth::{IntoAuthError, Result};
use crate::schema::{User, UserView};
use crate::App;

pub fn profile(actor: &User) -> UserView {
    actor.view()
}

#[tracing::instrument(skip_all, name = "services.users.list")]
pub async fn list(app: &App) -> Result<Vec<UserView>> {
    let users = app.store.list_users().await.into_auth_error()?;
    Ok(users.iter().map(User::view).collect())
}

#[tracing::instrument(skip(app), name = "services.users.get")]
pub async fn get(app: &App, id: &str) -> Result<UserView> {
    let user = super::find_target(app.store.as_ref(), id).await?;
    Ok(user.view())
}
