use chrono::Utc;
use error_stack::{Report, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::{AuthError, Result, UserIdentity};
use crate::config;
use crate::types::id::UserId;
use crate::util::Sensitive;

/// Claims carried by a login token. Roles are deliberately absent: they
/// are read from the store on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Claims {
    pub uid: UserId,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

/// Signs and validates login tokens with HS256 and a process-wide secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtKeys {
    #[must_use]
    pub fn new(config: &config::Auth) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(config.jwt_expiration_secs.get()).unwrap_or(i64::MAX),
        }
    }

    /// Mints a token for `identity` that expires after the configured TTL.
    pub fn issue(&self, identity: UserIdentity) -> Result<Sensitive<String>> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Same as [`JwtKeys::issue`] but as if the current time was `now`
    /// (seconds since the Unix epoch).
    #[tracing::instrument(skip(self), name = "auth.jwt.issue")]
    pub fn issue_at(&self, identity: UserIdentity, now: i64) -> Result<Sensitive<String>> {
        let claims = Claims {
            uid: identity.uid,
            exp: now.saturating_add(self.ttl_secs),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(Sensitive::new)
            .change_context(AuthError::Internal)
            .attach_printable("could not sign token")
    }

    /// Checks the signature and expiry of `token`, yielding who it was
    /// issued to. Every failure is [`AuthError::Unauthenticated`].
    #[tracing::instrument(skip_all, name = "auth.jwt.validate")]
    pub fn validate(&self, token: &str) -> Result<UserIdentity> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(UserIdentity {
                uid: data.claims.uid,
            }),
            Err(error) => {
                tracing::debug!(?error, "rejected token");
                Err(Report::new(AuthError::Unauthenticated).attach_printable(error.to_string()))
            }
        }
    }
}

impl Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
