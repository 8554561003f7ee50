use serde::Deserialize;
use std::num::NonZeroU64;

use crate::types::validation::ValidationErrorBuilder;
use crate::util::Sensitive;

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    /// Secret used to sign and verify login tokens (HS256).
    ///
    /// **Environment variables**:
    /// - `DOGGO_AUTH_JWT_SECRET` or `JWT_SECRET`
    pub jwt_secret: Sensitive<String>,
    /// How many seconds a login token stays valid after it was issued.
    /// Defaults to 7 days.
    ///
    /// **Environment variables**:
    /// - `DOGGO_AUTH_JWT_EXPIRATION_SECS` or `JWT_EXPIRATION`
    #[serde(default = "Auth::default_jwt_expiration_secs")]
    pub jwt_expiration_secs: NonZeroU64,
}

impl Auth {
    const DEFAULT_JWT_EXPIRATION_SECS: u64 = 60 * 60 * 24 * 7;
    const JWT_SECRET_MIN: usize = 12;
    const JWT_SECRET_MAX: usize = 1024;

    pub(super) fn validate(&self, errors: &mut ValidationErrorBuilder) {
        let len = self.jwt_secret.len();
        if !(Self::JWT_SECRET_MIN..=Self::JWT_SECRET_MAX).contains(&len) {
            errors.insert(
                "auth.jwt_secret",
                format!(
                    "JWT secret must be between {} and {} bytes long",
                    Self::JWT_SECRET_MIN,
                    Self::JWT_SECRET_MAX
                ),
            );
        }
    }

    // Required by serde
    const fn default_jwt_expiration_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_JWT_EXPIRATION_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_JWT_EXPIRATION_SECS is accidentally set to 0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationError;

    #[test]
    fn test_default_ttl_is_seven_days() {
        let auth: Auth = serde_json::from_value(serde_json::json!({
            "jwt_secret": "your-secret-whatever",
        }))
        .unwrap();

        assert_eq!(auth.jwt_expiration_secs.get(), 604_800);
    }

    #[test]
    fn test_rejects_short_secret() {
        let auth = Auth {
            jwt_secret: "short".into(),
            jwt_expiration_secs: Auth::default_jwt_expiration_secs(),
        };

        let mut errors = ValidationError::builder();
        auth.validate(&mut errors);
        assert!(errors.build().has_field("auth.jwt_secret"));
    }
}
