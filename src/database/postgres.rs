use async_trait::async_trait;
use error_stack::{Report, ResultExt};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use super::{Error, ErrorExt, ErrorExt2, Result, Store};
use crate::config;
use crate::schema::{NewUser, Role, User};
use crate::types::id::{RoleId, UserId};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub type Transaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
pub type PoolConnection = sqlx::pool::PoolConnection<sqlx::Postgres>;

#[derive(Clone)]
pub struct Pool {
    pool: sqlx::PgPool,
}

impl Pool {
    pub async fn new(cfg: &config::Database) -> Result<Self> {
        let mut pool_opts = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(cfg.timeout_secs.get()))
            .max_connections(cfg.pool_size.get());

        if let Some(min_idle) = cfg.min_idle {
            pool_opts = pool_opts.min_connections(min_idle.get());
        }

        let mut connect_opts =
            PgConnectOptions::from_str(cfg.url.as_str()).change_context(Error::InvalidUrl)?;

        if cfg.enforce_tls {
            connect_opts = connect_opts.ssl_mode(PgSslMode::Require);
        }

        let pool = Self {
            pool: pool_opts.connect_lazy_with(connect_opts),
        };

        // The server may start before the database is reachable.
        match pool.wait_until_healthy().await {
            Ok(..) => {}
            Err(error) if error.is_unhealthy() => {
                tracing::warn!("database is not reachable yet, connecting lazily");
            }
            Err(error) => return Err(error),
        }

        Ok(pool)
    }

    #[must_use]
    pub fn connections(&self) -> u32 {
        self.pool.size()
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.connections() > 0
    }

    #[tracing::instrument(name = "db.transaction", skip(self))]
    pub async fn begin(&self) -> Result<Transaction<'static>> {
        if let Some(inner) = self.pool.try_begin().await.into_db_error()? {
            Ok(inner)
        } else if !self.is_healthy() {
            Err(Error::UnhealthyPool.into())
        } else {
            self.pool.begin().await.into_db_error()
        }
    }

    #[tracing::instrument(name = "db.connect", skip(self))]
    pub async fn get(&self) -> Result<PoolConnection> {
        if let Some(inner) = self.pool.try_acquire() {
            Ok(inner)
        } else if !self.is_healthy() {
            Err(Error::UnhealthyPool.into())
        } else {
            self.pool.acquire().await.into_db_error()
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn wait_until_healthy(&self) -> Result<()> {
        match self.pool.acquire().await {
            Ok(..) => Ok(()),
            Err(e) if !self.is_healthy() => Err(e).change_context(Error::UnhealthyPool),
            Err(e) => Err(e).into_db_error(),
        }
    }

    /// Applies every pending migration under `migrations/`.
    #[tracing::instrument(skip(self), name = "db.migrate")]
    pub async fn migrate(&self) -> Result<()> {
        let now = tokio::time::Instant::now();
        tracing::info!("Performing database migrations... (this may take a while)");

        MIGRATOR
            .run(&self.pool)
            .await
            .change_context(Error::Migration)?;

        let elapsed = now.elapsed();
        tracing::info!("Successfully performed database migrations! took {elapsed:.2?}");
        Ok(())
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pool.fmt(f)
    }
}

/// [`Store`] backed by the Postgres schema in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Option<String>,
    password_hash: String,
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    user_id: UserId,
    id: RoleId,
    value: String,
}

const USER_COLUMNS: &str = "SELECT id, name, email, password_hash FROM users";

/// Attaches the roles of every row with a single query.
async fn with_roles(conn: &mut PgConnection, rows: Vec<UserRow>) -> Result<Vec<User>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids = rows.iter().map(|v| v.id).collect::<Vec<_>>();
    let links = sqlx::query_as::<_, UserRoleRow>(
        r"SELECT ur.user_id, r.id, r.value FROM user_roles ur
        JOIN roles r ON r.id = ur.role_id
        WHERE ur.user_id = ANY($1)
        ORDER BY r.id",
    )
    .bind(ids)
    .fetch_all(&mut *conn)
    .await
    .into_db_error()?;

    let mut roles: HashMap<UserId, Vec<Role>> = HashMap::new();
    for link in links {
        roles.entry(link.user_id).or_default().push(Role {
            id: link.id,
            value: link.value,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| User {
            roles: roles.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash.into(),
        })
        .collect())
}

async fn find_one(conn: &mut PgConnection, row: Option<UserRow>) -> Result<Option<User>> {
    let Some(row) = row else {
        return Ok(None);
    };
    Ok(with_roles(conn, vec![row]).await?.pop())
}

async fn set_roles(conn: &mut PgConnection, user: UserId, roles: &[Role]) -> Result<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user)
        .execute(&mut *conn)
        .await
        .into_db_error()?;

    let ids = roles.iter().map(|v| v.id).collect::<Vec<_>>();
    sqlx::query(
        r"INSERT INTO user_roles (user_id, role_id)
        SELECT $1, role_id FROM UNNEST($2::BIGINT[]) AS t(role_id)
        ON CONFLICT DO NOTHING",
    )
    .bind(user)
    .bind(ids)
    .execute(&mut *conn)
    .await
    .into_db_error()?;

    Ok(())
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(skip(self), name = "query.users.find")]
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let mut conn = self.pool.get().await?;
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()?;

        find_one(&mut *conn, row).await
    }

    #[tracing::instrument(skip_all, name = "query.users.find_by_login")]
    async fn find_user_by_name_or_email(&self, identifier: &str) -> Result<Option<User>> {
        let mut conn = self.pool.get().await?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{USER_COLUMNS} WHERE name = $1 OR email = $1"
        ))
        .bind(identifier)
        .fetch_optional(&mut *conn)
        .await
        .into_db_error()?;

        find_one(&mut *conn, row).await
    }

    #[tracing::instrument(skip(self), name = "query.users.identifier_taken")]
    async fn identifier_taken(&self, identifier: &str, except: Option<UserId>) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        sqlx::query_scalar::<_, bool>(
            r"SELECT EXISTS (
                SELECT 1 FROM users
                WHERE (name = $1 OR email = $1) AND ($2::BIGINT IS NULL OR id <> $2)
            )",
        )
        .bind(identifier)
        .bind(except)
        .fetch_one(&mut *conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "query.users.list")]
    async fn list_users(&self) -> Result<Vec<User>> {
        let mut conn = self.pool.get().await?;
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_COLUMNS} ORDER BY id"))
            .fetch_all(&mut *conn)
            .await
            .into_db_error()?;

        with_roles(&mut *conn, rows).await
    }

    #[tracing::instrument(skip_all, name = "query.users.insert")]
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, UserRow>(
            r"INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .fetch_one(&mut *tx)
        .await
        .into_db_error()?;

        set_roles(&mut *tx, row.id, &user.roles).await?;
        let user = find_one(&mut *tx, Some(row))
            .await?
            .ok_or_else(|| Report::new(Error::Internal))?;

        tx.commit().await.into_db_error()?;
        Ok(user)
    }

    #[tracing::instrument(skip_all, fields(user.id = %user.id), name = "query.users.save")]
    async fn save_user(&self, user: &User) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, UserRow>(
            r"UPDATE users SET name = $2, email = $3, password_hash = $4
            WHERE id = $1
            RETURNING id, name, email, password_hash",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .fetch_optional(&mut *tx)
        .await
        .into_db_error()?
        .ok_or_else(|| {
            Report::new(Error::Internal)
                .attach_printable(format!("user {} does not exist", user.id))
        })?;

        set_roles(&mut *tx, row.id, &user.roles).await?;
        let user = find_one(&mut *tx, Some(row))
            .await?
            .ok_or_else(|| Report::new(Error::Internal))?;

        tx.commit().await.into_db_error()?;
        Ok(user)
    }

    #[tracing::instrument(skip(self), name = "query.users.delete")]
    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .into_db_error()?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), name = "query.users.delete_by_email_suffix")]
    async fn delete_users_by_email_suffix(&self, suffix: &str) -> Result<u64> {
        let mut conn = self.pool.get().await?;
        let result = sqlx::query("DELETE FROM users WHERE RIGHT(email, LENGTH($1)) = $1")
            .bind(suffix)
            .execute(&mut *conn)
            .await
            .into_db_error()?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), name = "query.roles.find")]
    async fn find_roles(&self, values: &[String]) -> Result<Vec<Role>> {
        let mut conn = self.pool.get().await?;
        sqlx::query_as::<_, Role>("SELECT id, value FROM roles WHERE value = ANY($1) ORDER BY id")
            .bind(values)
            .fetch_all(&mut *conn)
            .await
            .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "query.roles.ensure")]
    async fn ensure_role(&self, value: &str) -> Result<Role> {
        let mut conn = self.pool.get().await?;
        // the no-op update makes RETURNING yield the existing row too
        sqlx::query_as::<_, Role>(
            r"INSERT INTO roles (value) VALUES ($1)
            ON CONFLICT (value) DO UPDATE SET value = EXCLUDED.value
            RETURNING id, value",
        )
        .bind(value)
        .fetch_one(&mut *conn)
        .await
        .into_db_error()
    }

    #[tracing::instrument(skip(self), name = "query.clear")]
    async fn clear(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        sqlx::query("TRUNCATE user_roles, users, roles RESTART IDENTITY")
            .execute(&mut *conn)
            .await
            .into_db_error()?;
        Ok(())
    }
}
