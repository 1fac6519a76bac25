use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::{
    error::{AppError, Result},
    models::user::User,
    services::auth::{hash_password, verify_password},
};

/// The unique constraint guarding `users.email`.
const EMAIL_CONSTRAINT: &str = "users_uc_email";

/// Storage for accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates an account. Fails with `AppError::DuplicateEmail` if the
    /// address is taken.
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<()>;

    /// Returns the user ID for a matching email/password pair, or
    /// `AppError::InvalidCredentials`.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64>;

    /// Whether an account with this ID exists.
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Fetches an account, or `AppError::NotFound`.
    async fn get(&self, id: i64) -> Result<User>;
}

/// A `UserRepository` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    /// Creates a new `PgUserRepository`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let password_hash = hash_password(password)?;

        let client = self.pool.get().await?;
        let result = client
            .execute(
                r#"
                INSERT INTO users (name, email, hashed_password, created)
                VALUES ($1, $2, $3, NOW())
                "#,
                &[&name, &email, &password_hash],
            )
            .await;

        match result {
            Ok(_) => {
                tracing::info!("✅ User created: {}", email);
                Ok(())
            }
            Err(e) => {
                let duplicate = e.as_db_error().is_some_and(|db| {
                    *db.code() == SqlState::UNIQUE_VIOLATION
                        && db.constraint() == Some(EMAIL_CONSTRAINT)
                });
                if duplicate {
                    Err(AppError::DuplicateEmail)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, hashed_password
                FROM users
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let hashed_password: String = row.get("hashed_password");
        if !verify_password(password, &hashed_password)? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(row.get("id"))
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_one("SELECT EXISTS(SELECT true FROM users WHERE id = $1)", &[&id])
            .await?;
        Ok(row.get(0))
    }

    async fn get(&self, id: i64) -> Result<User> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, name, email, created
                FROM users
                WHERE id = $1
                "#,
                &[&id],
            )
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(User::from(&row))
    }
}
