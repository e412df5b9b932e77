use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Address, NewUser, Post, User, UserChanges, UserDetail};
use crate::database::repository::UserRepository;
use crate::types::UserId;

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    addresses: Vec<Address>,
    posts: Vec<Post>,
    next_user_id: i32,
    next_address_id: i32,
    next_post_id: i32,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// In-process store with the same contract as the Postgres repository.
/// Every operation runs under a single lock, so multi-row writes are atomic.
#[derive(Default)]
pub struct MemoryUserRepository {
    tables: RwLock<Tables>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts currently owned by a user
    pub async fn posts_for(&self, id: UserId) -> Vec<Post> {
        let tables = self.tables.read().await;
        tables.posts.iter().filter(|p| p.user_id == id).cloned().collect()
    }

    /// Addresses currently owned by a user
    pub async fn addresses_for(&self, id: UserId) -> Vec<Address> {
        let tables = self.tables.read().await;
        tables.addresses.iter().filter(|a| a.user_id == id).cloned().collect()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;

        if tables.email_taken(&new_user.email, None) {
            return Err(DatabaseError::UniqueViolation(format!(
                "duplicate key value violates unique constraint \"users_email_key\" ({})",
                new_user.email
            )));
        }

        tables.next_user_id += 1;
        let id = UserId(tables.next_user_id);
        let now = Utc::now();
        let user = User {
            id,
            email: new_user.email,
            user_name: new_user.user_name,
            active: false,
            created_at: now,
            updated_at: now,
        };

        tables.next_address_id += 1;
        let address = Address {
            id: tables.next_address_id,
            street: new_user.address.street,
            city: new_user.address.city,
            state: new_user.address.state,
            zip_code: new_user.address.zip_code,
            user_id: id,
        };
        tables.addresses.push(address);

        for seed in new_user.posts {
            tables.next_post_id += 1;
            let post = Post {
                id: tables.next_post_id,
                slug: seed.slug,
                title: seed.title,
                description: seed.description,
                user_id: id,
            };
            tables.posts.push(post);
        }

        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_detail(&self, id: UserId) -> Result<Option<UserDetail>, DatabaseError> {
        let tables = self.tables.read().await;
        let Some(user) = tables.users.get(&id).cloned() else {
            return Ok(None);
        };
        Ok(Some(UserDetail {
            user,
            address: tables.addresses.iter().filter(|a| a.user_id == id).cloned().collect(),
            posts: tables.posts.iter().filter(|p| p.user_id == id).cloned().collect(),
        }))
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))?;
        user.active = active;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_fields(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;

        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(DatabaseError::UniqueViolation(format!(
                    "duplicate key value violates unique constraint \"users_email_key\" ({email})"
                )));
            }
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))?;
        if let Some(user_name) = changes.user_name {
            user.user_name = user_name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.remove(&id) else {
            return Ok(None);
        };
        tables.posts.retain(|p| p.user_id != id);
        tables.addresses.retain(|a| a.user_id != id);
        Ok(Some(user))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
