use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
