use error_stack::Report;

use crate::auth::{AuthError, IntoAuthError, Result};
use crate::database::Store;
use crate::schema::User;
use crate::types::id::UserId;
use crate::types::ValidationError;

mod delete;
mod login;
mod read;
mod register;
mod reset;
mod update;

pub use delete::{delete, purge_test_users, TEST_EMAIL_SUFFIX};
pub use login::login;
pub use read::{get, list, profile};
pub use register::register;
pub use reset::reset;
pub use update::update;

/// Fetches the user with the raw path parameter `id`. Ids that can't be
/// parsed can't exist either, so both cases are [`AuthError::NotFound`].
async fn find_target(store: &dyn Store, id: &str) -> Result<User> {
    let Ok(id) = id.parse::<UserId>() else {
        return Err(Report::new(AuthError::NotFound).attach_printable(format!("invalid id {id:?}")));
    };

    store
        .find_user_by_id(id)
        .await
        .into_auth_error()?
        .ok_or_else(|| Report::new(AuthError::NotFound))
}

/// Rejects a `name` or `email` already held by a user other than
/// `except`. Names and emails share one namespace so a login identifier
/// always resolves to a single user.
async fn check_conflicts(
    store: &dyn Store,
    except: Option<UserId>,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<()> {
    let mut conflicts = ValidationError::builder();
    if let Some(name) = name {
        if store.identifier_taken(name, except).await.into_auth_error()? {
            conflicts.insert("name", "User with same name already exists");
        }
    }
    if let Some(email) = email {
        if store.identifier_taken(email, except).await.into_auth_error()? {
            conflicts.insert("email", "User with same email already exists");
        }
    }

    let conflicts = conflicts.build();
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(Report::new(AuthError::Conflict(conflicts)))
    }
}
