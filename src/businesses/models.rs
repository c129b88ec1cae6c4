use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BusinessStatus {
    Pending,
    Active,
    Disabled,
}

impl BusinessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessStatus::Pending => "pending",
            BusinessStatus::Active => "active",
            BusinessStatus::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Business {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub website: String,
    pub description: String,
    pub status: BusinessStatus,
    pub logo: Option<String>, // opaque reference, never dereferenced here
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBusinessRequest {
    pub name: String,
    pub website: String,
    pub description: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBusinessRequest {
    pub name: String,
    pub website: String,
    pub description: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct BusinessQuery {
    pub status: Option<BusinessStatus>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetBusinessStatusRequest {
    pub status: BusinessStatus,
}
