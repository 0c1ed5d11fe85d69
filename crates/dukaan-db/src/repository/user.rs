//! # User Repository
//!
//! Database operations for application users.
//!
//! Password hashing happens in the auth service; this repository only
//! stores and retrieves the finished hash. Email uniqueness is enforced by
//! the UNIQUE index and surfaces as [`DbError::UniqueViolation`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeKind, Collection};
use dukaan_core::{Role, User};

/// Field set for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub password_hash: String,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        UserRepository { pool, bus }
    }

    /// Inserts a new user.
    pub async fn insert(&self, new: NewUser) -> DbResult<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, email = %new.email, "Inserting user");

        let user = User {
            id: id.clone(),
            username: new.username,
            email: new.email,
            phone_number: new.phone_number,
            role: new.role,
            password_hash: new.password_hash,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, phone_number, role, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        self.bus.publish(Collection::Users, ChangeKind::Created, &id);
        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lower(email) = lower(trim(?1)) LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Counts registered users. Zero means first-run (initial admin setup).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Changes a user's role.
    pub async fn set_role(&self, id: &str, role: Role) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET role = ?2 WHERE id = ?1")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.bus.publish(Collection::Users, ChangeKind::Updated, id);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn ali() -> NewUser {
        NewUser {
            username: "ali".to_string(),
            email: "ali@example.com".to_string(),
            phone_number: "0300".to_string(),
            role: Role::User,
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_email() {
        let db = test_db().await;
        let repo = db.users();

        let user = repo.insert(ali()).await.unwrap();
        let found = repo.find_by_email("  ALI@EXAMPLE.COM ").await.unwrap();

        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let repo = db.users();

        repo.insert(ali()).await.unwrap();
        let err = repo.insert(ali()).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_count_and_set_role() {
        let db = test_db().await;
        let repo = db.users();

        assert_eq!(repo.count().await.unwrap(), 0);
        let user = repo.insert(ali()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        repo.set_role(&user.id, Role::Biller).await.unwrap();
        assert_eq!(repo.get(&user.id).await.unwrap().unwrap().role, Role::Biller);
    }
}
