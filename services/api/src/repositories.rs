//! Repositories for database operations

use async_trait::async_trait;
use common::{
    error::{DatabaseError, DatabaseResult},
    models::{Role, User},
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::{debug, info};
use uuid::Uuid;

pub mod memory;

pub use memory::InMemoryUserRepository;

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

/// Values for a user about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Column changes for an update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

/// Persistence operations on the `users` relation
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, newest first
    async fn find_all(&self) -> DatabaseResult<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Look up a user by exact email, optionally ignoring one id
    async fn find_by_email(&self, email: &str, exclude: Option<Uuid>)
    -> DatabaseResult<Option<User>>;

    /// Insert a user; the repository assigns the id and both timestamps
    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Apply `changes` and re-stamp `updated_at`; `None` if the row is gone
    async fn update(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>>;

    /// Delete a user, returning the number of rows removed
    async fn delete(&self, id: Uuid) -> DatabaseResult<u64>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: Box::new(e),
    })?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Build `UPDATE users SET ... WHERE id = $n RETURNING ...` for the supplied
/// changes. Only columns present in `changes` appear in the SET list.
pub fn update_query(id: Uuid, changes: &UserChanges) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE users SET ");
    let mut assignments = builder.separated(", ");

    if let Some(name) = &changes.name {
        assignments.push("name = ");
        assignments.push_bind_unseparated(name.clone());
    }
    if let Some(email) = &changes.email {
        assignments.push("email = ");
        assignments.push_bind_unseparated(email.clone());
    }
    if let Some(role) = changes.role {
        assignments.push("role = ");
        assignments.push_bind_unseparated(role.as_str());
    }
    assignments.push("updated_at = NOW()");

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING ");
    builder.push(USER_COLUMNS);
    builder
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(map_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::Query)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        debug!("Finding user by ID: {}", id);

        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(map_user)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> DatabaseResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            LIMIT 1
            "#
        ))
        .bind(email)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(map_user)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.email);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, name, email, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        map_user(&row).map_err(DatabaseError::Query)
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>> {
        info!("Updating user: {}", id);

        let mut builder = update_query(id, changes);
        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(map_user)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<u64> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected())
    }
}
