//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use plateful_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Columns shared by every user query.
const USER_COLUMNS: &str = "id, first_name, last_name, username, email, phone_number, role, \
     password_hash, is_active, is_staff, is_superadmin, date_joined, last_login, \
     created_at, modified_at";

/// Raw user row as stored.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    username: String,
    email: String,
    phone_number: Option<String>,
    role: Option<i16>,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superadmin: bool,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert into the validated domain type.
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let role = match self.role {
            None => None,
            Some(n) => Some(Role::from_number(n).ok_or_else(|| {
                RepositoryError::DataCorruption(format!("unknown role in database: {n}"))
            })?),
        };

        Ok(User {
            id: UserId::new(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email,
            phone_number: self.phone_number,
            role,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superadmin: self.is_superadmin,
            date_joined: self.date_joined,
            last_login: self.last_login,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

/// Fields for a new account.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub role: Option<Role>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new account. Accounts start inactive until activated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username is
    /// already taken, `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewUser<'_>) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users \
             (first_name, last_name, username, email, phone_number, role, password_hash) \
             VALUES ($1, $2, $3, $4, NULL, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );

        let row: UserRow = sqlx::query_as(&sql)
            .bind(new.first_name)
            .bind(new.last_name)
            .bind(new.username)
            .bind(new.email)
            .bind(new.role.map(Role::as_number))
            .bind(new.password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_unique_violation(e, "email or username already taken")
            })?;

        row.into_domain()
    }

    /// Create an active superadmin account (no marketplace role).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username is
    /// already taken, `RepositoryError::Database` for other failures.
    pub async fn create_superadmin(
        &self,
        new: &NewUser<'_>,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users \
             (first_name, last_name, username, email, role, password_hash, \
              is_active, is_staff, is_superadmin) \
             VALUES ($1, $2, $3, $4, NULL, $5, TRUE, TRUE, TRUE) \
             RETURNING {USER_COLUMNS}"
        );

        let row: UserRow = sqlx::query_as(&sql)
            .bind(new.first_name)
            .bind(new.last_name)
            .bind(new.username)
            .bind(new.email)
            .bind(new.password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_unique_violation(e, "email or username already taken")
            })?;

        row.into_domain()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user together with their password hash, by email.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails,
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash = row.password_hash.clone();
        Ok(Some((row.into_domain()?, password_hash)))
    }

    /// Activate an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn activate(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn record_login(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
