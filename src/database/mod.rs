use async_trait::async_trait;
use std::fmt::Debug;

use crate::schema::{NewUser, Role, User};
use crate::types::id::UserId;

mod error;
pub mod memory;
pub mod postgres;

pub use error::*;
pub use memory::MemoryStore;
pub use postgres::{PgStore, Pool};

/// Persistence collaborator of the server. Everything that reads or
/// writes users and roles goes through this trait, so the services never
/// issue queries themselves.
///
/// Implementations must enforce the uniqueness of user names, user emails
/// and role values, reporting a collision as [`Error::UniqueViolation`].
/// Names and emails share one namespace: a name may not equal the email
/// of another user and vice versa, so a login identifier matches at most
/// one user.
#[async_trait]
pub trait Store: Debug + Send + Sync + 'static {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Looks up a user whose name *or* email equals `identifier`.
    async fn find_user_by_name_or_email(&self, identifier: &str) -> Result<Option<User>>;

    /// Whether `identifier` is already used as the name *or* the email of
    /// a user other than `except`.
    async fn identifier_taken(&self, identifier: &str, except: Option<UserId>) -> Result<bool>;

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn insert_user(&self, user: NewUser) -> Result<User>;

    /// Overwrites the stored name, email, password hash and roles of
    /// `user.id`, returning the stored result.
    async fn save_user(&self, user: &User) -> Result<User>;

    /// Returns `false` if there was nothing to delete.
    async fn delete_user(&self, id: UserId) -> Result<bool>;

    /// Deletes every user whose email ends with `suffix` and returns how
    /// many were removed.
    async fn delete_users_by_email_suffix(&self, suffix: &str) -> Result<u64>;

    /// Returns the stored roles matching `values`. Unknown values are skipped.
    async fn find_roles(&self, values: &[String]) -> Result<Vec<Role>>;

    /// Gets the role with `value`, creating it if it doesn't exist yet.
    async fn ensure_role(&self, value: &str) -> Result<Role>;

    /// Removes every user and role.
    async fn clear(&self) -> Result<()>;
}
