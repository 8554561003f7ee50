use error_stack::{Report, ResultExt};
use tokio::sync::OnceCell;

use super::{password, AuthError, IntoAuthError, Result, UserIdentity};
use crate::database::Store;
use crate::types::validation::REQUIRED;
use crate::types::ValidationError;
use crate::util::Sensitive;

/// Hash compared against when no user matched, so a missing account
/// takes about as long to reject as a wrong password.
static DUMMY_HASH: OnceCell<Sensitive<String>> = OnceCell::const_new();

async fn dummy_hash() -> Result<Sensitive<String>> {
    DUMMY_HASH
        .get_or_try_init(|| async {
            password::hash_blocking("doggo-dummy-password".into())
                .await
                .change_context(AuthError::Internal)
        })
        .await
        .cloned()
}

/// Checks `identifier` (a user name or an email) and `password` against
/// the stored users.
///
/// An unknown identifier and a wrong password are both reported as
/// [`AuthError::InvalidCredentials`].
#[tracing::instrument(skip_all, name = "auth.credentials.verify")]
pub async fn verify(
    store: &dyn Store,
    identifier: &Sensitive<String>,
    password: &Sensitive<String>,
) -> Result<UserIdentity> {
    let mut errors = ValidationError::builder();
    if identifier.is_empty() {
        errors.insert("usernameOrEmail", REQUIRED);
    }
    if password.is_empty() {
        errors.insert("password", REQUIRED);
    }
    let errors = errors.build();
    if !errors.is_empty() {
        return Err(Report::new(AuthError::Validation(errors)));
    }

    let user = store
        .find_user_by_name_or_email(identifier.as_str())
        .await
        .into_auth_error()?;

    let (hash, identity) = match user {
        Some(user) => (user.password_hash, Some(UserIdentity { uid: user.id })),
        None => (dummy_hash().await?, None),
    };

    let matches = password::verify_blocking(password.clone(), hash)
        .await
        .change_context(AuthError::Internal)?;

    match identity {
        Some(identity) if matches => Ok(identity),
        _ => {
            tracing::debug!("rejected login attempt");
            Err(Report::new(AuthError::InvalidCredentials))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{self, MemoryStore};
    use crate::schema::NewUser;

    async fn store_with_alice() -> (MemoryStore, UserIdentity) {
        let store = MemoryStore::new();
        let user = store
            .insert_user(NewUser {
                name: "alice".into(),
                email: Some("alice@example.com".into()),
                password_hash: password::hash(b"Secret123!").unwrap().into(),
                roles: Vec::new(),
            })
            .await
            .unwrap();

        (store, UserIdentity { uid: user.id })
    }

    #[tokio::test]
    async fn test_name_or_email() {
        let (store, alice) = store_with_alice().await;
        let password = Sensitive::from("Secret123!");

        let by_name = verify(&store, &"alice".into(), &password).await.unwrap();
        let by_email = verify(&store, &"alice@example.com".into(), &password)
            .await
            .unwrap();

        assert_eq!(by_name, alice);
        assert_eq!(by_email, alice);
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let (store, _) = store_with_alice().await;

        let wrong_password = verify(&store, &"alice".into(), &"secret123!".into())
            .await
            .unwrap_err();
        let unknown_user = verify(&store, &"bob".into(), &"Secret123!".into())
            .await
            .unwrap_err();

        assert_eq!(wrong_password.current_context(), &AuthError::InvalidCredentials);
        assert_eq!(unknown_user.current_context(), &AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_empty_inputs() {
        let (store, _) = store_with_alice().await;

        let report = verify(&store, &"".into(), &"".into()).await.unwrap_err();
        let AuthError::Validation(errors) = report.current_context() else {
            panic!("expected validation error, got {report:?}");
        };
        assert!(errors.has_field("usernameOrEmail"));
        assert!(errors.has_field("password"));
        assert_eq!(errors.iter().count(), 2);

        let report = verify(&store, &"alice".into(), &"".into()).await.unwrap_err();
        let AuthError::Validation(errors) = report.current_context() else {
            panic!("expected validation error, got {report:?}");
        };
        assert!(!errors.has_field("usernameOrEmail"));
        assert!(errors.has_field("password"));
    }

    #[tokio::test]
    async fn test_name_cannot_shadow_another_email() {
        let store = MemoryStore::new();
        let bob = store
            .insert_user(NewUser {
                name: "bob".into(),
                email: Some("bob@example.com".into()),
                password_hash: password::hash(b"hunter22").unwrap().into(),
                roles: Vec::new(),
            })
            .await
            .unwrap();

        let report = store
            .insert_user(NewUser {
                name: "bob@example.com".into(),
                email: None,
                password_hash: password::hash(b"attacker!").unwrap().into(),
                roles: Vec::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            report.current_context(),
            &database::Error::UniqueViolation("name")
        );

        let by_email = verify(&store, &"bob@example.com".into(), &"hunter22".into())
            .await
            .unwrap();
        assert_eq!(by_email.uid, bob.id);

        let report = verify(&store, &"bob@example.com".into(), &"attacker!".into())
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_email_cannot_shadow_another_name() {
        let store = MemoryStore::new();
        store
            .insert_user(NewUser {
                name: "carol@example.org".into(),
                email: None,
                password_hash: password::hash(b"Secret123!").unwrap().into(),
                roles: Vec::new(),
            })
            .await
            .unwrap();

        let report = store
            .insert_user(NewUser {
                name: "dave".into(),
                email: Some("carol@example.org".into()),
                password_hash: password::hash(b"attacker!").unwrap().into(),
                roles: Vec::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            report.current_context(),
            &database::Error::UniqueViolation("email")
        );
    }
}
