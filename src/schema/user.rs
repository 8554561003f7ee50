use serde::{Deserialize, Serialize};

use super::Role;
use crate::types::id::UserId;
use crate::util::Sensitive;

/// A stored user account together with its roles.
///
/// This type is never serialized; handlers respond with [`UserView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Sensitive<String>,
    pub roles: Vec<Role>,
}

impl User {
    pub fn role_values(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|v| v.value.as_str())
    }

    #[must_use]
    pub fn has_role(&self, value: &str) -> bool {
        self.role_values().any(|v| v == value)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::ADMIN)
    }

    #[must_use]
    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

/// Outward representation of a [`User`]. It has no password field at all.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.role_values().map(str::to_string).collect(),
        }
    }
}

/// A user that has not been stored yet. `password_hash` must already be
/// hashed by the time it gets here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Sensitive<String>,
    pub roles: Vec<Role>,
}
