use error_stack::Report;

use crate::auth::{policy, AuthError, IntoAuthError, Result};
use crate::schema::User;
use crate::App;

/// Emails of accounts created by automated test runs end with this.
pub const TEST_EMAIL_SUFFIX: &str = "@citest.com";

/// Deletes the user `id` if `actor` is that user or an admin.
#[tracing::instrument(skip(app, actor), fields(actor.id = %actor.id), name = "services.users.delete")]
pub async fn delete(app: &App, actor: &User, id: &str) -> Result<()> {
    let target = super::find_target(app.store.as_ref(), id).await?;
    if !policy::can_delete(actor, &target) {
        return Err(Report::new(AuthError::Forbidden));
    }

    // someone else may have removed it in the meantime
    if !app.store.delete_user(target.id).await.into_auth_error()? {
        return Err(Report::new(AuthError::NotFound));
    }

    tracing::info!(user.id = %target.id, "deleted user");
    Ok(())
}

/// Removes every account whose email ends with [`TEST_EMAIL_SUFFIX`].
#[tracing::instrument(skip_all, name = "services.users.purge_test_users")]
pub async fn purge_test_users(app: &App) -> Result<u64> {
    let deleted = app
        .store
        .delete_users_by_email_suffix(TEST_EMAIL_SUFFIX)
        .await
        .into_auth_error()?;

    tracing::info!(deleted, "purged test users");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NewUser;
    use crate::services::users::testing::create_user;

    #[tokio::test]
    async fn test_self_and_admin_delete() {
        let app = App::for_tests();
        let alice = create_user(&app, "alice", "Secret123!", &[]).await;
        let bob = create_user(&app, "bob", "hunter22", &[]).await;
        let admin = create_user(&app, "root", "r00tr00t", &["admin"]).await;

        let report = delete(&app, &alice, &bob.id.to_string()).await.unwrap_err();
        assert_eq!(report.current_context(), &AuthError::Forbidden);

        delete(&app, &alice, &alice.id.to_string()).await.unwrap();
        delete(&app, &admin, &bob.id.to_string()).await.unwrap();
        assert_eq!(app.store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_wins_over_forbidden() {
        let app = App::for_tests();
        let alice = create_user(&app, "alice", "Secret123!", &[]).await;

        let report = delete(&app, &alice, "9999").await.unwrap_err();
        assert_eq!(report.current_context(), &AuthError::NotFound);
    }

    #[tokio::test]
    async fn test_purge_test_users() {
        let app = App::for_tests();
        create_user(&app, "alice", "Secret123!", &[]).await;
        for name in ["ci1", "ci2"] {
            app.store
                .insert_user(NewUser {
                    name: name.into(),
                    email: Some(format!("{name}{TEST_EMAIL_SUFFIX}")),
                    password_hash: "$argon2id$fake".into(),
                    roles: Vec::new(),
                })
                .await
                .unwrap();
        }

        assert_eq!(purge_test_users(&app).await.unwrap(), 2);
        assert_eq!(app.store.list_users().await.unwrap().len(), 1);
    }
}
