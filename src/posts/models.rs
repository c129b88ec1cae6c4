use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PostStatus {
    Active,
    Disabled,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Disabled => "disabled",
            PostStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub business_id: String,
    pub title: String,
    pub description: String,
    pub pay: f64,
    pub time_est: i64, // minutes
    pub status: PostStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Title, description, pay and time estimate; shared by create and update
#[derive(Debug, Clone, Deserialize)]
pub struct PostContent {
    pub title: String,
    pub description: String,
    pub pay: f64,
    pub time_est: i64,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub business_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetPostStatusRequest {
    pub status: PostStatus,
}
