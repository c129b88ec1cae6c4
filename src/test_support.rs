//! Shared fixtures for storage-backed tests

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::mpsc;

use crate::auth::models::{OpenIdClaims, UserRole};
use crate::businesses::models::{BusinessStatus, CreateBusinessRequest};
use crate::common::config::test_config;
use crate::common::migrations::run_migrations;
use crate::common::{generate_session_id, AppState};
use crate::notifications::transport::OutgoingMail;
use crate::notifications::{MailTransport, Notification, NotificationError, NotificationService};
use crate::posts::models::PostContent;
use crate::storage::{Store, UnitOfWork};

/// In-memory store with the real schema. One connection, so every handle
/// sees the same database.
pub async fn setup_test_store() -> Store {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    run_migrations(&pool, false)
        .await
        .expect("Failed to run migrations");

    Store::new(pool)
}

/// A database file in the temp dir, removed again on drop
pub struct TempDatabase {
    pub store: Store,
    path: PathBuf,
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-journal", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// File-backed store with several connections, so transactions really run
/// side by side and contend for the write lock
pub async fn setup_file_store() -> TempDatabase {
    let path = std::env::temp_dir().join(format!("marketplace-{}.db", generate_session_id()));
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .expect("Failed to create test database file");

    run_migrations(&pool, false)
        .await
        .expect("Failed to run migrations");

    TempDatabase {
        store: Store::new(pool),
        path,
    }
}

/// State plus the receiving end of its notification queue, so tests can
/// inspect what was enqueued without running a worker
pub async fn setup_test_state() -> (AppState, mpsc::Receiver<Box<dyn Notification>>) {
    let store = setup_test_store().await;
    let (notifications, receiver) = NotificationService::new(crate::notifications::QUEUE_CAPACITY);
    let state = AppState {
        store,
        config: test_config(),
        http: reqwest::Client::new(),
        notifications,
    };
    (state, receiver)
}

/// Drains everything currently queued
pub fn drain(receiver: &mut mpsc::Receiver<Box<dyn Notification>>) -> Vec<Box<dyn Notification>> {
    let mut queued = Vec::new();
    while let Ok(notification) = receiver.try_recv() {
        queued.push(notification);
    }
    queued
}

pub fn business_request(name: &str) -> CreateBusinessRequest {
    CreateBusinessRequest {
        name: name.to_string(),
        website: "https://business.example".to_string(),
        description: "We need people to try our product".to_string(),
        logo: None,
    }
}

pub fn post_content(title: &str) -> PostContent {
    PostContent {
        title: title.to_string(),
        description: "Spend an hour with our new app".to_string(),
        pay: 25.0,
        time_est: 60,
    }
}

/// Creates a user with one primary Google account
pub async fn create_account_user(uow: &mut UnitOfWork, email: &str, name: &str) -> String {
    let claims = OpenIdClaims {
        sub: format!("google-{}", email),
        email: email.to_string(),
        name: name.to_string(),
        email_verified: true,
    };
    let user_id = uow.create_user().await.unwrap();
    uow.save_openid_account("google", &claims).await.unwrap();
    uow.link_openid_account("google", &claims.sub, &user_id, true)
        .await
        .unwrap();
    user_id
}

#[derive(Debug, Clone)]
pub struct Seed {
    pub admin_id: String,
    pub owner_id: String,
    pub student_id: String,
    pub outsider_id: String,
    pub business_id: String,
    pub post_id: i64,
}

/// An admin, a business owner with an active business and one active post,
/// a student (`.edu`) and a non-student outsider
pub async fn seed_marketplace(store: &Store) -> Seed {
    let mut uow = store.begin().await.unwrap();

    let admin_id = create_account_user(&mut uow, "admin@example.com", "Ada Admin").await;
    uow.add_user_role(&admin_id, UserRole::Admin).await.unwrap();
    let owner_id = create_account_user(&mut uow, "owner@example.com", "Olivia Owner").await;
    let student_id = create_account_user(&mut uow, "student@state.edu", "Sam Student").await;
    let outsider_id = create_account_user(&mut uow, "outsider@example.com", "Oscar Outsider").await;

    let business = uow
        .create_business(&owner_id, &business_request("Acme Testing"))
        .await
        .unwrap();
    uow.set_business_status(&business.id, BusinessStatus::Active, None)
        .await
        .unwrap();
    let post = uow
        .create_post(&business.id, &post_content("Usability test"))
        .await
        .unwrap();

    uow.commit().await.unwrap();

    Seed {
        admin_id,
        owner_id,
        student_id,
        outsider_id,
        business_id: business.id,
        post_id: post.id,
    }
}

/// Mail transport that records instead of sending
#[derive(Default, Clone)]
pub struct RecordingTransport {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
    pub fail: bool,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail {
            Err(NotificationError::Transport("recording transport set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}
