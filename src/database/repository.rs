use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Address, NewUser, Post, User, UserChanges, UserDetail};
use crate::types::UserId;

const USER_COLUMNS: &str = "id, email, user_name, active, created_at, updated_at";

/// Persistence operations the HTTP handlers depend on
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user with its address and seed posts as one unit
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError>;

    /// All users in store order
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError>;

    /// User plus owned addresses and posts
    async fn find_user_detail(&self, id: UserId) -> Result<Option<UserDetail>, DatabaseError>;

    /// Overwrite the active flag. Errors with `NotFound` when no row matches.
    async fn set_active(&self, id: UserId, active: bool) -> Result<User, DatabaseError>;

    /// Apply the provided field changes. Errors with `NotFound` when no row matches.
    async fn update_fields(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError>;

    /// Remove a user and everything it owns atomically, returning the removed user row.
    /// `Ok(None)` when no such user exists.
    async fn delete_user(&self, id: UserId) -> Result<Option<User>, DatabaseError>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// sqlx-backed repository over the `users`, `addresses` and `posts` tables
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let user: User = sqlx::query_as(&format!(
            "INSERT INTO users (email, user_name) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.user_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let address = &new_user.address;
        sqlx::query(
            "INSERT INTO addresses (street, city, state, zip_code, user_id) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(user.id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        for post in &new_user.posts {
            sqlx::query("INSERT INTO posts (slug, title, description, user_id) VALUES ($1, $2, $3, $4)")
                .bind(&post.slug)
                .bind(&post.title)
                .bind(&post.description)
                .bind(user.id)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::from_sqlx)?;
        }

        tx.commit().await?;
        debug!("Inserted user {} with {} seed posts", user.id, new_user.posts.len());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users"))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_detail(&self, id: UserId) -> Result<Option<UserDetail>, DatabaseError> {
        let Some(user) = self.find_user(id).await? else {
            return Ok(None);
        };

        let address: Vec<Address> = sqlx::query_as(
            "SELECT id, street, city, state, zip_code, user_id FROM addresses WHERE user_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let posts: Vec<Post> = sqlx::query_as(
            "SELECT id, slug, title, description, user_id FROM posts WHERE user_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(UserDetail { user, address, posts }))
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<User, DatabaseError> {
        sqlx::query_as(&format!(
            "UPDATE users SET active = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(active)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn update_fields(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        sqlx::query_as(&format!(
            "UPDATE users SET user_name = COALESCE($2, user_name), email = COALESCE($3, email), updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.user_name)
        .bind(changes.email)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn delete_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Lock the parent row so no children are attached mid-delete
        let existing: Option<User> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if existing.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let posts = sqlx::query("DELETE FROM posts WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let addresses = sqlx::query("DELETE FROM addresses WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted: User = sqlx::query_as(&format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Deleted user {} ({} posts, {} addresses)", id, posts, addresses);
        Ok(Some(deleted))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
