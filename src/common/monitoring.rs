//! Optional Sentry error reporting

use tracing::info;

use super::AppConfig;

/// Starts the Sentry client when `SENTRY_DSN` is set. The guard must live as
/// long as the process; dropping it flushes pending events.
pub fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(
                std::env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string())
                    .into(),
            ),
            traces_sample_rate: 0.0,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        info!("Sentry initialized successfully");
        Some(guard)
    } else {
        info!("Sentry DSN rejected, error reporting disabled");
        None
    }
}
