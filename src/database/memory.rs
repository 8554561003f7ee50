use async_trait::async_trait;
use error_stack::Report;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Error, Result, Store};
use crate::schema::{NewUser, Role, User};
use crate::types::id::{RoleId, UserId};
use crate::util::Sensitive;

/// Process-local [`Store`] used by tests and by `doggo server --in-memory`.
///
/// It enforces the same uniqueness rules as the Postgres schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, UserRow>,
    roles: BTreeMap<RoleId, Role>,
    next_user_id: u64,
    next_role_id: u64,
}

#[derive(Debug, Clone)]
struct UserRow {
    name: String,
    email: Option<String>,
    password_hash: Sensitive<String>,
    roles: Vec<RoleId>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn user(&self, id: UserId) -> Option<User> {
        let row = self.users.get(&id)?;
        Some(User {
            id,
            name: row.name.clone(),
            email: row.email.clone(),
            password_hash: row.password_hash.clone(),
            roles: row
                .roles
                .iter()
                .filter_map(|id| self.roles.get(id).cloned())
                .collect(),
        })
    }

    fn find_user(&self, predicate: impl Fn(&UserRow) -> bool) -> Option<User> {
        let id = self
            .users
            .iter()
            .find(|(_, row)| predicate(row))
            .map(|(id, _)| *id)?;
        self.user(id)
    }

    /// Whether another user than `except` has `identifier` as its name
    /// or its email.
    fn is_taken(&self, identifier: &str, except: Option<UserId>) -> bool {
        self.users.iter().any(|(id, row)| {
            Some(*id) != except
                && (row.name == identifier || row.email.as_deref() == Some(identifier))
        })
    }

    fn check_unique(&self, except: Option<UserId>, name: &str, email: Option<&str>) -> Result<()> {
        if self.is_taken(name, except) {
            return Err(Report::new(Error::UniqueViolation("name")));
        }
        if email.is_some_and(|email| self.is_taken(email, except)) {
            return Err(Report::new(Error::UniqueViolation("email")));
        }
        Ok(())
    }

    fn next_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId::new(self.next_user_id)
    }

    fn next_role_id(&mut self) -> RoleId {
        self.next_role_id += 1;
        RoleId::new(self.next_role_id)
    }
}

fn role_ids(roles: &[Role]) -> Vec<RoleId> {
    let mut ids = roles.iter().map(|v| v.id).collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.inner.read().await.user(id))
    }

    async fn find_user_by_name_or_email(&self, identifier: &str) -> Result<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.find_user(|row| {
            row.name == identifier || row.email.as_deref() == Some(identifier)
        }))
    }

    async fn identifier_taken(&self, identifier: &str, except: Option<UserId>) -> Result<bool> {
        Ok(self.inner.read().await.is_taken(identifier, except))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.inner.read().await;
        Ok(tables
            .users
            .keys()
            .filter_map(|id| tables.user(*id))
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.inner.write().await;
        tables.check_unique(None, &user.name, user.email.as_deref())?;

        let id = tables.next_user_id();
        tables.users.insert(
            id,
            UserRow {
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                roles: role_ids(&user.roles),
            },
        );

        tables
            .user(id)
            .ok_or_else(|| Report::new(Error::Internal))
    }

    async fn save_user(&self, user: &User) -> Result<User> {
        let mut tables = self.inner.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(Report::new(Error::Internal)
                .attach_printable(format!("user {} does not exist", user.id)));
        }
        tables.check_unique(Some(user.id), &user.name, user.email.as_deref())?;

        tables.users.insert(
            user.id,
            UserRow {
                name: user.name.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                roles: role_ids(&user.roles),
            },
        );

        tables
            .user(user.id)
            .ok_or_else(|| Report::new(Error::Internal))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    async fn delete_users_by_email_suffix(&self, suffix: &str) -> Result<u64> {
        let mut tables = self.inner.write().await;
        let before = tables.users.len();
        tables
            .users
            .retain(|_, row| !row.email.as_deref().is_some_and(|v| v.ends_with(suffix)));

        Ok((before - tables.users.len()) as u64)
    }

    async fn find_roles(&self, values: &[String]) -> Result<Vec<Role>> {
        let tables = self.inner.read().await;
        Ok(tables
            .roles
            .values()
            .filter(|role| values.contains(&role.value))
            .cloned()
            .collect())
    }

    async fn ensure_role(&self, value: &str) -> Result<Role> {
        let mut tables = self.inner.write().await;
        if let Some(role) = tables.roles.values().find(|v| v.value == value) {
            return Ok(role.clone());
        }

        let role = Role {
            id: tables.next_role_id(),
            value: value.to_string(),
        };
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write().await = Tables::default();
        Ok(())
    }
}
