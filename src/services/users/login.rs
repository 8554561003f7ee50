use error_stack::ResultExt;

use crate::auth::{credentials, Result};
use crate::types::form::users::login::{Request, Response};
use crate::App;

/// Verifies the credentials and issues a token for the matched user.
#[tracing::instrument(skip_all, name = "services.users.login")]
pub async fn login(app: &App, form: Request) -> Result<Response> {
    let identity = credentials::verify(app.store.as_ref(), &form.username_or_email, &form.password)
        .await
        .attach_printable("could not verify credentials")?;

    let jwt = app.jwt.issue(identity)?;
    tracing::info!(user.id = %identity.uid, "user logged in");

    Ok(Response { jwt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::services::users::testing::create_user;

    #[tokio::test]
    async fn test_login_issues_valid_token() {
        let app = App::for_tests();
        let alice = create_user(&app, "alice", "Secret123!", &[]).await;

        let response = login(
            &app,
            Request {
                username_or_email: "alice".into(),
                password: "Secret123!".into(),
            },
        )
        .await
        .unwrap();

        let identity = app.jwt.validate(response.jwt.as_str()).unwrap();
        assert_eq!(identity.uid, alice.id);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let app = App::for_tests();
        create_user(&app, "alice", "Secret123!", &[]).await;

        let report = login(
            &app,
            Request {
                username_or_email: "alice@example.com".into(),
                password: "nope".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(report.current_context(), &AuthError::InvalidCredentials);
    }
}
