// src/common/config.rs
//! Environment configuration

use std::collections::HashSet;
use std::env;

use super::helpers::parse_csv_lowercase;

/// Which mail transport the notification worker uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransportKind {
    /// AWS SES v2
    Ses,
    /// Logs messages instead of sending them
    Log,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub google_client_id: Option<String>,
    pub admin_emails: HashSet<String>,
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub mail_transport: MailTransportKind,
    pub ses_from_email: Option<String>,
    pub ses_region: Option<String>,
    pub sentry_dsn: Option<String>,
    pub reset_db: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://marketplace.db".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());

        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(24);

        let admin_emails = parse_csv_lowercase(&env::var("ADMIN_EMAILS").unwrap_or_default())
            .into_iter()
            .collect();

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let mail_transport = match env::var("MAIL_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "ses" => MailTransportKind::Ses,
            _ => MailTransportKind::Log,
        };

        Self {
            database_url,
            port,
            jwt_secret,
            session_ttl_hours,
            google_client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            admin_emails,
            frontend_url,
            cors_origins,
            mail_transport,
            ses_from_email: non_empty_var("SES_FROM_EMAIL"),
            ses_region: non_empty_var("SES_REGION"),
            sentry_dsn: non_empty_var("SENTRY_DSN"),
            reset_db: env::var("RESET_DB")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.trim().to_lowercase())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        jwt_secret: "test_secret_key".to_string(),
        session_ttl_hours: 24,
        google_client_id: None,
        admin_emails: ["admin@example.com".to_string()].into_iter().collect(),
        frontend_url: "http://localhost:5173".to_string(),
        cors_origins: Vec::new(),
        mail_transport: MailTransportKind::Log,
        ses_from_email: None,
        ses_region: None,
        sentry_dsn: None,
        reset_db: false,
    }
}
