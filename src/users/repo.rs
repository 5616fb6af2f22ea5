use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::users::dto::UpdateUser;

const USER_COLUMNS: &str = "id, email, hashed_password, first_name, last_name, \
     is_active, is_superuser, created_at, updated_at";

/// User row. Deliberately not `Serialize`; clients only ever see the
/// `UserRead` projection.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Creation payload for the data layer; the password is still plaintext
/// here and is hashed inside `create`.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Ordered by (created_at, id) so pagination is deterministic.
    pub async fn list(db: &PgPool, offset: i64, limit: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Insert a new user. Hashes the plaintext password and stamps both
    /// timestamps with the same instant. A duplicate email surfaces as a
    /// unique-violation database error.
    pub async fn create(db: &PgPool, new: &NewUser) -> Result<User, AppError> {
        let hashed = hash_password(&new.password)?;
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users \
                 (id, email, hashed_password, first_name, last_name, \
                  is_active, is_superuser, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, TRUE, FALSE, $6, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&hashed)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(now)
        .fetch_one(db)
        .await?;
        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Partial update: only fields present in `changes` are applied, a
    /// provided password is re-hashed, and `updated_at` is always
    /// refreshed.
    pub async fn update(&self, db: &PgPool, changes: &UpdateUser) -> Result<User, AppError> {
        let email = changes.email.as_deref().unwrap_or(&self.email);
        let hashed = match &changes.password {
            Some(plain) => hash_password(plain)?,
            None => self.hashed_password.clone(),
        };
        let first_name = match &changes.first_name {
            Some(value) => value.clone(),
            None => self.first_name.clone(),
        };
        let last_name = match &changes.last_name {
            Some(value) => value.clone(),
            None => self.last_name.clone(),
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET email = $2, hashed_password = $3, first_name = $4, last_name = $5, \
                 updated_at = $6 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(self.id)
        .bind(email)
        .bind(&hashed)
        .bind(&first_name)
        .bind(&last_name)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Delete a user, returning the removed row. Used by the data layer
    /// only; no route exposes it.
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user with id={id}")))?;
        info!(user_id = %user.id, email = %user.email, "user deleted");
        Ok(user)
    }

    /// Idempotent bootstrap of the configured first superuser.
    pub async fn ensure_superuser(db: &PgPool, email: &str, password: &str) -> Result<(), AppError> {
        if User::find_by_email(db, email).await?.is_some() {
            return Ok(());
        }
        let hashed = hash_password(password)?;
        let now = OffsetDateTime::now_utc();
        sqlx::query(
            "INSERT INTO users \
                 (id, email, hashed_password, is_active, is_superuser, created_at, updated_at) \
             VALUES ($1, $2, $3, TRUE, TRUE, $4, $4) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&hashed)
        .bind(now)
        .execute(db)
        .await?;
        info!(email = %email, "superuser ensured");
        Ok(())
    }
}
