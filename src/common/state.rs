// Application state shared across all modules

use reqwest::Client;

use super::config::AppConfig;
use crate::notifications::NotificationService;
use crate::storage::Store;

/// Application state containing the store, configuration and shared clients
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: AppConfig,
    pub http: Client,
    pub notifications: NotificationService,
}
