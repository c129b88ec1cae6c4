use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::models::UserOverview;
use crate::businesses::models::BusinessStatus;
use crate::posts::models::PostStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
    Completed,
    Incomplete,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
        ApplicationStatus::Completed,
        ApplicationStatus::Incomplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Incomplete => "incomplete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Raw `post_applications` row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub business_id: String,
    pub post_id: i64,
    pub user_id: String,
    pub status: ApplicationStatus,
    pub notes: String,
    pub created_at: String,
}

/// One applicant as seen by the business reviewing a post
#[derive(Debug, Clone, Serialize)]
pub struct PostApplicationData {
    pub user: UserOverview,
    pub notes: String,
    pub status: ApplicationStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostApplications {
    pub business_id: String,
    pub post_id: i64,
    pub applications: Vec<PostApplicationData>,
}

/// One application as seen by the applicant, with post and business summaries
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserApplication {
    pub business_id: String,
    pub business_name: String,
    pub business_status: BusinessStatus,
    pub post_id: i64,
    pub post_title: String,
    pub post_status: PostStatus,
    pub pay: f64,
    pub time_est: i64,
    pub status: ApplicationStatus,
    pub created_at: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserApplicationQuery {
    pub user_id: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub post_status: Option<PostStatus>,
}

/// Requested status arrives as free text so that unknown values are a
/// `BadRequest` from the lifecycle, not a body deserialization failure
#[derive(Debug, Clone, Deserialize)]
pub struct SetApplicationStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationNotesRequest {
    pub notes: String,
}
