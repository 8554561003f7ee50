use actix_web::{http::header, web, FromRequest, HttpRequest};
use error_stack::{Report, ResultExt};
use futures::future::LocalBoxFuture;

use super::Error;
use crate::auth::{AuthError, IntoAuthError};
use crate::schema::User;
use crate::App;

/// The authenticated caller of a protected route.
///
/// Extracting it validates the `Authorization: Bearer <token>` header and
/// then loads the user from the store, so roles are always fresh. A
/// missing header, a bad token and a deleted account all fail with
/// [`AuthError::Unauthenticated`].
#[derive(Debug)]
pub struct Actor(pub User);

impl std::ops::Deref for Actor {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// auth schemes are case-insensitive (RFC 9110 section 11.1)
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let token = bearer_token(req);
        let app = req.app_data::<web::Data<App>>().cloned();

        Box::pin(async move {
            let Some(app) = app else {
                return Err(Report::new(AuthError::Internal)
                    .attach_printable("the web app has no App data")
                    .into());
            };
            let Some(token) = token else {
                return Err(Report::new(AuthError::Unauthenticated)
                    .attach_printable("missing bearer token")
                    .into());
            };

            let identity = app.jwt.validate(&token)?;
            let user = app
                .store
                .find_user_by_id(identity.uid)
                .await
                .into_auth_error()
                .attach_printable("could not load the authenticated user")?;

            match user {
                Some(user) => Ok(Actor(user)),
                None => Err(Report::new(AuthError::Unauthenticated)
                    .attach_printable("token belongs to a deleted user")
                    .into()),
            }
        })
    }
}
